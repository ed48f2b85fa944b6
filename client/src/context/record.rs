//! Record-level context for building meme coin program instructions from a record's derived
//! address.

use meme_coin_interface::{
    instructions::{
        BuyTokensInstructionData,
        CreateMemeCoinInstructionData,
        InstructionData,
        SellTokensInstructionData,
    },
    program,
    record::MemeCoin,
    seeds::{
        find_record_address,
        normalize_name,
    },
    RENT_SYSVAR_ID,
    SYSTEM_PROGRAM_ID,
    TOKEN_PROGRAM_ID,
};
use solana_address::Address;
use solana_instruction::{
    AccountMeta,
    Instruction,
};

use crate::{
    context::token::TokenContext,
    error::{
        ClientError,
        ClientResult,
    },
    transactions::LedgerRpc,
};

/// A record's normalized name and derived address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordContext {
    pub name: String,
    pub address: Address,
    pub bump: u8,
}

impl RecordContext {
    pub fn new(name: &str) -> ClientResult<Self> {
        let name = normalize_name(name);
        let (address, bump) = find_record_address(name)?;

        Ok(Self {
            name: name.to_string(),
            address,
            bump,
        })
    }

    /// Fetches and decodes the record, failing with [`ClientError::RecordNotFound`] if nothing
    /// exists at the derived address.
    pub async fn fetch(&self, rpc: &impl LedgerRpc) -> ClientResult<MemeCoin> {
        let account = rpc
            .get_account(&self.address)
            .await?
            .ok_or_else(|| ClientError::RecordNotFound(self.name.clone()))?;
        if account.owner != program::ID {
            return Err(ClientError::Network(format!(
                "Account {} isn't owned by the meme coin program",
                self.address
            )));
        }

        MemeCoin::try_from_account_data(&account.data)
            .map_err(|e| ClientError::schema_mismatch(&self.address, e))
    }

    pub fn create_meme_coin(
        &self,
        creator: Address,
        mint: Address,
        data: &CreateMemeCoinInstructionData,
    ) -> Instruction {
        Instruction::new_with_bytes(
            program::ID,
            &data.pack(),
            vec![
                AccountMeta::new(self.address, false),
                AccountMeta::new(mint, true),
                AccountMeta::new(creator, true),
                AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
                AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
                AccountMeta::new_readonly(RENT_SYSVAR_ID, false),
            ],
        )
    }

    pub fn buy_tokens(&self, record: &MemeCoin, buyer: Address, amount: u64) -> Instruction {
        let buyer_holding = TokenContext::new(record.mint).get_ata_for(&buyer);
        Instruction::new_with_bytes(
            program::ID,
            &BuyTokensInstructionData { amount }.pack(),
            vec![
                AccountMeta::new(self.address, false),
                AccountMeta::new(record.mint, false),
                AccountMeta::new(buyer, true),
                AccountMeta::new(record.creator, false),
                AccountMeta::new(buyer_holding, false),
                AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
                AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            ],
        )
    }

    pub fn sell_tokens(&self, record: &MemeCoin, seller: Address, amount: u64) -> Instruction {
        let seller_holding = TokenContext::new(record.mint).get_ata_for(&seller);
        Instruction::new_with_bytes(
            program::ID,
            &SellTokensInstructionData { amount }.pack(),
            vec![
                AccountMeta::new(self.address, false),
                AccountMeta::new(record.mint, false),
                AccountMeta::new(seller, true),
                AccountMeta::new(record.creator, false),
                AccountMeta::new(seller_holding, false),
                AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
            ],
        )
    }
}
