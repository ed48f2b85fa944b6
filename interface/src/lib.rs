//! Public interface of the meme coin program: program id, seeds, discriminators, the bundled IDL,
//! instruction data and the on-chain record schema.

pub mod discriminator;
pub mod error;
pub mod idl;
pub mod instructions;
pub mod record;
pub mod seeds;

pub mod program {
    use solana_address::Address;

    pub const ID: Address = Address::from_str_const("5ZCsDZAV9oH7Souj6UWtX3Q94ZrmPkVF5MVQuzmDd66X");
}

use solana_address::Address;

pub const SYSTEM_PROGRAM_ID: Address = Address::from_str_const("11111111111111111111111111111111");
pub const TOKEN_PROGRAM_ID: Address =
    Address::from_str_const("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");
pub const RENT_SYSVAR_ID: Address =
    Address::from_str_const("SysvarRent111111111111111111111111111111111");

/// Lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;
