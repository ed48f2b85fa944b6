//! Token-level context for a record's backing mint: holding (associated token account) addresses,
//! their creation, and balance reads.

use meme_coin_interface::TOKEN_PROGRAM_ID;
use solana_address::Address;
use solana_instruction::Instruction;
use solana_sdk::program_pack::Pack;
use spl_associated_token_account_interface::{
    address::get_associated_token_address,
    instruction::create_associated_token_account_idempotent,
};
use spl_token_interface::state::Account;

use crate::{
    error::{
        ClientError,
        ClientResult,
    },
    transactions::LedgerRpc,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenContext {
    pub mint_address: Address,
    pub token_program: Address,
}

impl TokenContext {
    pub fn new(mint_address: Address) -> Self {
        Self {
            mint_address,
            token_program: TOKEN_PROGRAM_ID,
        }
    }

    pub fn get_ata_for(&self, owner: &Address) -> Address {
        get_associated_token_address(owner, &self.mint_address)
    }

    /// Creates `owner`'s holding account if it doesn't exist yet, paid for by `owner`.
    pub fn create_ata_for(&self, owner: &Address) -> Instruction {
        create_associated_token_account_idempotent(
            owner,
            owner,
            &self.mint_address,
            &self.token_program,
        )
    }

    /// `None` when `owner` has no holding account for this mint.
    pub async fn get_balance_for(
        &self,
        rpc: &impl LedgerRpc,
        owner: &Address,
    ) -> ClientResult<Option<u64>> {
        fetch_token_amount(rpc, &self.get_ata_for(owner)).await
    }
}

/// Reads the amount in the token account at `address`, `None` if the account doesn't exist.
pub async fn fetch_token_amount(
    rpc: &impl LedgerRpc,
    address: &Address,
) -> ClientResult<Option<u64>> {
    let Some(account) = rpc.get_account(address).await? else {
        return Ok(None);
    };
    let token_account = Account::unpack(&account.data).map_err(|e| {
        ClientError::Network(format!("Account {address} isn't a token account: {e}"))
    })?;

    Ok(Some(token_account.amount))
}
