//! Validation, preflight checks and instruction assembly for create, buy and sell.
//!
//! Every check here runs before anything is signed or relayed, so a failure leaves the ledger
//! untouched.

use meme_coin_interface::{
    instructions::CreateMemeCoinInstructionData,
    record::MemeCoin,
    LAMPORTS_PER_SOL,
};
use solana_address::Address;
use solana_compute_budget_interface::ComputeBudgetInstruction;
use solana_instruction::Instruction;
use solana_keypair::Keypair;
use solana_sdk::signer::Signer;

use crate::{
    context::{
        record::RecordContext,
        token::TokenContext,
    },
    error::{
        ClientError,
        ClientResult,
    },
    transactions::{
        account_exists,
        LedgerRpc,
    },
};

/// Balance a creator must hold to cover network fees and rent for a new record.
pub const CREATE_MIN_RESERVE_LAMPORTS: u64 = LAMPORTS_PER_SOL / 10;

/// Headroom a buyer must hold beyond the purchase cost for fees.
pub const BUY_FEE_RESERVE_LAMPORTS: u64 = LAMPORTS_PER_SOL / 100;

/// Compute unit limit requested for buys; the program's supply and holder accounting exceeds the
/// default per-instruction budget.
pub const BUY_COMPUTE_UNIT_LIMIT: u32 = 1_000_000;

/// Mint decimals the program accepts.
pub const MAX_DECIMALS: u8 = 9;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
pub enum Operation {
    Create,
    Buy,
    Sell,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateArgs {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub decimals: u8,
    pub initial_supply: u64,
    /// Lamports per raw token unit.
    pub price_per_token: u64,
}

impl CreateArgs {
    pub fn validate(&self) -> ClientResult<()> {
        for (field, value) in [
            ("name", &self.name),
            ("symbol", &self.symbol),
            ("metadata URI", &self.uri),
        ] {
            if value.trim().is_empty() {
                return Err(ClientError::Validation(format!("The {field} is required")));
            }
        }
        if self.decimals > MAX_DECIMALS {
            return Err(ClientError::Validation(format!(
                "Decimals must be at most {MAX_DECIMALS}"
            )));
        }
        if self.initial_supply == 0 {
            return Err(ClientError::Validation(
                "Initial supply must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

/// Arguments for buy and sell: a record name and a raw token quantity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TradeArgs {
    pub name: String,
    pub quantity: u64,
}

impl TradeArgs {
    pub fn validate(&self) -> ClientResult<()> {
        if self.name.trim().is_empty() {
            return Err(ClientError::Validation("The meme coin name is required".into()));
        }
        if self.quantity == 0 {
            return Err(ClientError::Validation(
                "Quantity must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

/// `quantity * price_per_token` in lamports.
pub fn total_cost(quantity: u64, price_per_token: u64) -> ClientResult<u64> {
    quantity.checked_mul(price_per_token).ok_or_else(|| {
        ClientError::Validation(format!(
            "Cost of {quantity} tokens at {price_per_token} lamports each overflows"
        ))
    })
}

/// Everything the submission pipeline needs for one operation.
pub struct PreparedTransaction {
    pub operation: Operation,
    pub record: RecordContext,
    /// Instructions for a separate submission that must confirm first.
    pub prerequisite: Option<Vec<Instruction>>,
    pub instructions: Vec<Instruction>,
    /// Signers other than the wallet, e.g. a freshly generated mint.
    pub extra_signers: Vec<Keypair>,
}

impl PreparedTransaction {
    pub fn extra_signer_refs(&self) -> Vec<&Keypair> {
        self.extra_signers.iter().collect()
    }
}

pub struct TransactionBuilder<'a, R> {
    rpc: &'a R,
    payer: Address,
}

impl<'a, R: LedgerRpc> TransactionBuilder<'a, R> {
    pub fn new(rpc: &'a R, payer: Address) -> Self {
        Self { rpc, payer }
    }

    pub async fn create(&self, args: &CreateArgs) -> ClientResult<PreparedTransaction> {
        args.validate()?;
        let record = RecordContext::new(&args.name)?;

        let available = self.rpc.get_balance(&self.payer).await?;
        if available < CREATE_MIN_RESERVE_LAMPORTS {
            return Err(ClientError::InsufficientFunds {
                required: CREATE_MIN_RESERVE_LAMPORTS,
                available,
            });
        }
        if account_exists(self.rpc, &record.address).await? {
            return Err(ClientError::Validation(format!(
                "A meme coin named \"{}\" already exists",
                record.name
            )));
        }

        let mint = Keypair::new();
        let data = CreateMemeCoinInstructionData {
            name: record.name.clone(),
            symbol: args.symbol.trim().to_string(),
            uri: args.uri.trim().to_string(),
            decimals: args.decimals,
            initial_supply: args.initial_supply,
            price_per_token: args.price_per_token,
        };
        let instruction = record.create_meme_coin(self.payer, mint.pubkey(), &data);

        Ok(PreparedTransaction {
            operation: Operation::Create,
            record,
            prerequisite: None,
            instructions: vec![instruction],
            extra_signers: vec![mint],
        })
    }

    pub async fn buy(&self, args: &TradeArgs) -> ClientResult<PreparedTransaction> {
        args.validate()?;
        let (record, meme_coin) = self.fetch_active(&args.name).await?;

        let cost = total_cost(args.quantity, meme_coin.price_per_token)?;
        let required = cost.saturating_add(BUY_FEE_RESERVE_LAMPORTS);
        let available = self.rpc.get_balance(&self.payer).await?;
        if available < required {
            return Err(ClientError::InsufficientFunds {
                required,
                available,
            });
        }

        let token = TokenContext::new(meme_coin.mint);
        let prerequisite = match account_exists(self.rpc, &token.get_ata_for(&self.payer)).await? {
            true => None,
            false => Some(vec![token.create_ata_for(&self.payer)]),
        };

        let instructions = vec![
            ComputeBudgetInstruction::set_compute_unit_limit(BUY_COMPUTE_UNIT_LIMIT),
            record.buy_tokens(&meme_coin, self.payer, args.quantity),
        ];

        Ok(PreparedTransaction {
            operation: Operation::Buy,
            record,
            prerequisite,
            instructions,
            extra_signers: vec![],
        })
    }

    pub async fn sell(&self, args: &TradeArgs) -> ClientResult<PreparedTransaction> {
        args.validate()?;
        let (record, meme_coin) = self.fetch_active(&args.name).await?;

        let held = TokenContext::new(meme_coin.mint)
            .get_balance_for(self.rpc, &self.payer)
            .await?
            .unwrap_or(0);
        if held < args.quantity {
            return Err(ClientError::InsufficientBalance {
                requested: args.quantity,
                held,
            });
        }

        Ok(PreparedTransaction {
            operation: Operation::Sell,
            instructions: vec![record.sell_tokens(&meme_coin, self.payer, args.quantity)],
            record,
            prerequisite: None,
            extra_signers: vec![],
        })
    }

    async fn fetch_active(&self, name: &str) -> ClientResult<(RecordContext, MemeCoin)> {
        let record = RecordContext::new(name)?;
        let meme_coin = record.fetch(self.rpc).await?;
        if !meme_coin.is_active {
            return Err(ClientError::InactiveRecord(record.name));
        }

        Ok((record, meme_coin))
    }
}
