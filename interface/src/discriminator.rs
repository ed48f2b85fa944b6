//! Eight-byte discriminators prefixed to instruction data and account data.

use sha2::{
    Digest,
    Sha256,
};

pub const DISCRIMINATOR_LEN: usize = 8;

pub type Discriminator = [u8; DISCRIMINATOR_LEN];

/// `sha256("global:<name>")[..8]`, where `name` is the snake_case instruction name.
pub fn instruction_discriminator(name: &str) -> Discriminator {
    sighash("global", name)
}

/// `sha256("account:<name>")[..8]`, where `name` is the account type name.
pub fn account_discriminator(name: &str) -> Discriminator {
    sighash("account", name)
}

fn sighash(namespace: &str, name: &str) -> Discriminator {
    let digest = Sha256::digest(format!("{namespace}:{name}").as_bytes());
    let mut discriminator = [0u8; DISCRIMINATOR_LEN];
    discriminator.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
    discriminator
}
