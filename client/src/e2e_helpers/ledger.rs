//! An in-memory [`LedgerRpc`] that executes meme coin program instructions locally.
//!
//! It models the program closely enough for client-side tests: record creation, buys that mint
//! into the buyer's holding and pay into the record account, and sells that burn and pay out. Fee
//! accounting, rent and signature verification are simplified.

use std::{
    cell::{
        Cell,
        RefCell,
    },
    collections::HashMap,
};

use meme_coin_interface::{
    instructions::{
        BuyTokensInstructionData,
        CreateMemeCoinInstructionData,
        InstructionData,
        MemeCoinInstruction,
        SellTokensInstructionData,
    },
    program,
    record::MemeCoin,
    seeds::find_record_address,
    SYSTEM_PROGRAM_ID,
    TOKEN_PROGRAM_ID,
};
use solana_account::Account;
use solana_address::Address;
use solana_instruction_error::InstructionError;
use solana_sdk::{
    hash::Hash,
    program_pack::Pack,
    signature::Signature,
    transaction::Transaction,
};
use solana_transaction_error::TransactionError;
use spl_token_interface::state::{
    Account as TokenAccount,
    AccountState,
};

use crate::{
    context::token::TokenContext,
    error::{
        ClientError,
        ClientResult,
    },
    transactions::{
        LedgerRpc,
        SendTransactionConfig,
    },
};

/// Lamports charged to the fee payer per signature.
pub const SIGNATURE_FEE: u64 = 5_000;
/// Lamports moved into each account the simulated programs create.
pub const ACCOUNT_RENT: u64 = 2_000_000;

/// Custom error codes returned by the simulated program.
pub mod program_error {
    pub const RECORD_INACTIVE: u32 = 6000;
    pub const SUPPLY_EXCEEDED: u32 = 6001;
    pub const INSUFFICIENT_TOKENS: u32 = 6002;
    pub const INSUFFICIENT_POOL: u32 = 6003;
    pub const INVALID_AMOUNT: u32 = 6004;
    pub const SEEDS_MISMATCH: u32 = 2006;
    pub const ACCOUNT_NOT_INITIALIZED: u32 = 3012;
}

type Accounts = HashMap<Address, Account>;

pub struct InMemoryLedger {
    account_store: RefCell<Accounts>,
    statuses: RefCell<HashMap<Signature, Result<(), TransactionError>>>,
    config: SendTransactionConfig,
    blockhash_seed: Cell<u8>,
    /// Status polls that return `None` before a landed transaction reports its result.
    confirmation_delay: Cell<u32>,
    polls: RefCell<HashMap<Signature, u32>>,
    offline: Cell<bool>,
    sent: Cell<usize>,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self {
            account_store: Default::default(),
            statuses: Default::default(),
            config: SendTransactionConfig {
                poll_interval_ms: 0,
                max_polls: 10,
                debug_logs: false,
            },
            blockhash_seed: Cell::new(1),
            confirmation_delay: Cell::new(0),
            polls: Default::default(),
            offline: Cell::new(false),
            sent: Cell::new(0),
        }
    }
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_confirmation_delay(self, polls: u32) -> Self {
        self.confirmation_delay.set(polls);
        self
    }

    pub fn with_config(mut self, config: SendTransactionConfig) -> Self {
        self.config = config;
        self
    }

    /// While offline every RPC call fails with a network error.
    pub fn set_offline(&self, offline: bool) {
        self.offline.set(offline);
    }

    pub fn airdrop(&self, address: &Address, lamports: u64) {
        self.account_store
            .borrow_mut()
            .entry(*address)
            .or_insert_with(|| Account::new(0, 0, &SYSTEM_PROGRAM_ID))
            .lamports += lamports;
    }

    pub fn lamports(&self, address: &Address) -> u64 {
        self.account(address).map_or(0, |account| account.lamports)
    }

    pub fn account(&self, address: &Address) -> Option<Account> {
        self.account_store.borrow().get(address).cloned()
    }

    pub fn set_account(&self, address: Address, account: Account) {
        self.account_store.borrow_mut().insert(address, account);
    }

    pub fn record(&self, name: &str) -> Option<MemeCoin> {
        let (address, _) = find_record_address(name).ok()?;
        let account = self.account(&address)?;
        MemeCoin::try_from_account_data(&account.data).ok()
    }

    /// Overwrites a record's active flag, as the program's authority would.
    pub fn set_active(&self, name: &str, is_active: bool) {
        let Some(mut record) = self.record(name) else {
            return;
        };
        record.is_active = is_active;
        if let Ok((address, _)) = find_record_address(name) {
            if let Some(account) = self.account_store.borrow_mut().get_mut(&address) {
                account.data = record.to_account_data();
            }
        }
    }

    pub fn token_balance(&self, owner: &Address, mint: &Address) -> Option<u64> {
        let ata = TokenContext::new(*mint).get_ata_for(owner);
        let account = self.account(&ata)?;
        TokenAccount::unpack(&account.data).ok().map(|a| a.amount)
    }

    /// Transactions accepted by [`LedgerRpc::send_transaction`] so far.
    pub fn sent_transactions(&self) -> usize {
        self.sent.get()
    }

    fn check_online(&self) -> ClientResult<()> {
        match self.offline.get() {
            true => Err(ClientError::Network("RPC request failed: connection refused".into())),
            false => Ok(()),
        }
    }

    /// Executes every instruction against a copy of the account store and commits it only if all
    /// of them succeed. The fee is charged either way.
    fn process(&self, transaction: &Transaction) -> Result<(), TransactionError> {
        let message = &transaction.message;
        let payer = message.account_keys[0];
        let fee = SIGNATURE_FEE * transaction.signatures.len() as u64;

        let mut store = self.account_store.borrow_mut();
        let payer_account = store
            .get_mut(&payer)
            .filter(|account| account.lamports >= fee)
            .ok_or(TransactionError::InsufficientFundsForFee)?;
        payer_account.lamports -= fee;

        let mut working = store.clone();
        for (index, ix) in message.instructions.iter().enumerate() {
            let program_id = message.account_keys[ix.program_id_index as usize];
            let accounts: Vec<(Address, bool)> = ix
                .accounts
                .iter()
                .map(|i| (message.account_keys[*i as usize], message.is_signer(*i as usize)))
                .collect();

            execute(&mut working, &program_id, &accounts, &ix.data)
                .map_err(|e| TransactionError::InstructionError(index as u8, e))?;
        }

        *store = working;
        Ok(())
    }
}

fn execute(
    store: &mut Accounts,
    program_id: &Address,
    accounts: &[(Address, bool)],
    data: &[u8],
) -> Result<(), InstructionError> {
    if *program_id == solana_compute_budget_interface::ID {
        return Ok(());
    }
    if *program_id == spl_associated_token_account_interface::program::ID {
        return create_holding(store, accounts);
    }
    if *program_id != program::ID {
        return Err(InstructionError::IncorrectProgramId);
    }

    let key = |i: usize| {
        accounts
            .get(i)
            .map(|(address, _)| *address)
            .ok_or(InstructionError::NotEnoughAccountKeys)
    };
    let is_signer = |i: usize| accounts.get(i).is_some_and(|(_, signer)| *signer);
    let invalid = |_| InstructionError::InvalidInstructionData;

    match MemeCoinInstruction::from_data(data).map_err(invalid)? {
        MemeCoinInstruction::CreateMemeCoin => {
            let args = CreateMemeCoinInstructionData::unpack(data).map_err(invalid)?;
            let (record_address, mint, creator) = (key(0)?, key(1)?, key(2)?);
            if !is_signer(1) || !is_signer(2) {
                return Err(InstructionError::MissingRequiredSignature);
            }
            let (expected, bump) =
                find_record_address(&args.name).map_err(|_| custom(program_error::SEEDS_MISMATCH))?;
            if expected != record_address || args.name != args.name.trim() {
                return Err(custom(program_error::SEEDS_MISMATCH));
            }
            if store.contains_key(&record_address) || store.contains_key(&mint) {
                return Err(InstructionError::AccountAlreadyInitialized);
            }
            debit(store, &creator, 2 * ACCOUNT_RENT)?;

            let record = MemeCoin {
                name: args.name,
                symbol: args.symbol,
                uri: args.uri,
                decimals: args.decimals,
                mint,
                creator,
                price_per_token: args.price_per_token,
                total_supply: args.initial_supply,
                circulating_supply: 0,
                total_volume: 0,
                holder_count: 0,
                is_active: true,
                bump,
            };
            let mut record_account = Account::new(ACCOUNT_RENT, 0, &program::ID);
            record_account.data = record.to_account_data();
            store.insert(record_address, record_account);
            store.insert(
                mint,
                Account::new(ACCOUNT_RENT, spl_token_interface::state::Mint::LEN, &TOKEN_PROGRAM_ID),
            );
            Ok(())
        }
        MemeCoinInstruction::BuyTokens => {
            let BuyTokensInstructionData { amount } =
                BuyTokensInstructionData::unpack(data).map_err(invalid)?;
            let (record_address, buyer, holding) = (key(0)?, key(2)?, key(4)?);
            if !is_signer(2) {
                return Err(InstructionError::MissingRequiredSignature);
            }
            let mut record = load_record(store, &record_address)?;
            if !record.is_active {
                return Err(custom(program_error::RECORD_INACTIVE));
            }
            if amount == 0 {
                return Err(custom(program_error::INVALID_AMOUNT));
            }
            let circulating = record
                .circulating_supply
                .checked_add(amount)
                .filter(|c| *c <= record.total_supply)
                .ok_or(custom(program_error::SUPPLY_EXCEEDED))?;
            let cost = amount
                .checked_mul(record.price_per_token)
                .ok_or(InstructionError::ArithmeticOverflow)?;

            let mut token = load_holding(store, &holding)?;
            debit(store, &buyer, cost)?;
            credit(store, &record_address, cost);

            if token.amount == 0 {
                record.holder_count += 1;
            }
            token.amount += amount;
            record.circulating_supply = circulating;
            record.total_volume = record.total_volume.saturating_add(cost);
            store_holding(store, &holding, &token);
            store_record(store, &record_address, &record);
            Ok(())
        }
        MemeCoinInstruction::SellTokens => {
            let SellTokensInstructionData { amount } =
                SellTokensInstructionData::unpack(data).map_err(invalid)?;
            let (record_address, seller, holding) = (key(0)?, key(2)?, key(4)?);
            if !is_signer(2) {
                return Err(InstructionError::MissingRequiredSignature);
            }
            let mut record = load_record(store, &record_address)?;
            if !record.is_active {
                return Err(custom(program_error::RECORD_INACTIVE));
            }
            if amount == 0 {
                return Err(custom(program_error::INVALID_AMOUNT));
            }
            let mut token = load_holding(store, &holding)?;
            if token.amount < amount {
                return Err(custom(program_error::INSUFFICIENT_TOKENS));
            }
            let proceeds = amount
                .checked_mul(record.price_per_token)
                .ok_or(InstructionError::ArithmeticOverflow)?;
            debit(store, &record_address, proceeds)
                .map_err(|_| custom(program_error::INSUFFICIENT_POOL))?;
            credit(store, &seller, proceeds);

            token.amount -= amount;
            if token.amount == 0 {
                record.holder_count = record.holder_count.saturating_sub(1);
            }
            record.circulating_supply -= amount;
            record.total_volume = record.total_volume.saturating_add(proceeds);
            store_holding(store, &holding, &token);
            store_record(store, &record_address, &record);
            Ok(())
        }
    }
}

/// Idempotent associated token account creation: `[payer, ata, owner, mint, system, token]`.
fn create_holding(store: &mut Accounts, accounts: &[(Address, bool)]) -> Result<(), InstructionError> {
    let [(payer, payer_signed), (ata, _), (owner, _), (mint, _), ..] = accounts else {
        return Err(InstructionError::NotEnoughAccountKeys);
    };
    if !payer_signed {
        return Err(InstructionError::MissingRequiredSignature);
    }
    if TokenContext::new(*mint).get_ata_for(owner) != *ata {
        return Err(InstructionError::InvalidSeeds);
    }
    if store.contains_key(ata) {
        return Ok(());
    }
    if !store.contains_key(mint) {
        return Err(InstructionError::InvalidAccountData);
    }

    debit(store, payer, ACCOUNT_RENT)?;
    let mut token = TokenAccount::default();
    token.mint = *mint;
    token.owner = *owner;
    token.state = AccountState::Initialized;
    store.insert(*ata, Account::new(ACCOUNT_RENT, TokenAccount::LEN, &TOKEN_PROGRAM_ID));
    store_holding(store, ata, &token);
    Ok(())
}

fn custom(code: u32) -> InstructionError {
    InstructionError::Custom(code)
}

fn debit(store: &mut Accounts, address: &Address, lamports: u64) -> Result<(), InstructionError> {
    let account = store
        .get_mut(address)
        .filter(|account| account.lamports >= lamports)
        .ok_or(InstructionError::InsufficientFunds)?;
    account.lamports -= lamports;
    Ok(())
}

fn credit(store: &mut Accounts, address: &Address, lamports: u64) {
    store
        .entry(*address)
        .or_insert_with(|| Account::new(0, 0, &SYSTEM_PROGRAM_ID))
        .lamports += lamports;
}

fn load_record(store: &Accounts, address: &Address) -> Result<MemeCoin, InstructionError> {
    store
        .get(address)
        .filter(|account| account.owner == program::ID)
        .and_then(|account| MemeCoin::try_from_account_data(&account.data).ok())
        .ok_or(custom(program_error::ACCOUNT_NOT_INITIALIZED))
}

fn store_record(store: &mut Accounts, address: &Address, record: &MemeCoin) {
    if let Some(account) = store.get_mut(address) {
        account.data = record.to_account_data();
    }
}

fn load_holding(store: &Accounts, address: &Address) -> Result<TokenAccount, InstructionError> {
    store
        .get(address)
        .and_then(|account| TokenAccount::unpack(&account.data).ok())
        .ok_or(custom(program_error::ACCOUNT_NOT_INITIALIZED))
}

fn store_holding(store: &mut Accounts, address: &Address, token: &TokenAccount) {
    if let Some(account) = store.get_mut(address) {
        TokenAccount::pack(*token, &mut account.data)
            .expect("Holding account has the packed length");
    }
}

impl LedgerRpc for InMemoryLedger {
    fn send_config(&self) -> &SendTransactionConfig {
        &self.config
    }

    async fn get_balance(&self, address: &Address) -> ClientResult<u64> {
        self.check_online()?;
        Ok(self.lamports(address))
    }

    async fn get_account(&self, address: &Address) -> ClientResult<Option<Account>> {
        self.check_online()?;
        Ok(self.account(address))
    }

    async fn get_program_accounts_by_discriminator(
        &self,
        program_id: &Address,
        discriminator: &[u8],
    ) -> ClientResult<Vec<(Address, Account)>> {
        self.check_online()?;
        Ok(self
            .account_store
            .borrow()
            .iter()
            .filter(|(_, account)| {
                account.owner == *program_id && account.data.starts_with(discriminator)
            })
            .map(|(address, account)| (*address, account.clone()))
            .collect())
    }

    async fn get_latest_blockhash(&self) -> ClientResult<Hash> {
        self.check_online()?;
        let seed = self.blockhash_seed.get();
        self.blockhash_seed.set(seed.wrapping_add(1));
        Ok(Hash::new_from_array([seed; 32]))
    }

    async fn send_transaction(&self, transaction: &Transaction) -> ClientResult<Signature> {
        self.check_online()?;
        if !transaction.is_signed() {
            return Err(ClientError::OnChainExecution(
                TransactionError::SignatureFailure.to_string(),
            ));
        }

        let signature = transaction.signatures[0];
        let result = self.process(transaction);
        self.statuses.borrow_mut().insert(signature, result);
        self.sent.set(self.sent.get() + 1);

        Ok(signature)
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> ClientResult<Option<Result<(), TransactionError>>> {
        self.check_online()?;
        let mut polls = self.polls.borrow_mut();
        let count = polls.entry(*signature).or_default();
        *count += 1;
        if *count <= self.confirmation_delay.get() {
            return Ok(None);
        }

        Ok(self.statuses.borrow().get(signature).cloned())
    }
}

#[cfg(test)]
mod tests {
    use solana_keypair::Keypair;
    use solana_sdk::{
        message::Message,
        signer::Signer,
    };

    use super::*;
    use crate::context::record::RecordContext;

    fn signed(payer: &Keypair, extra: &[&Keypair], ixs: &[solana_instruction::Instruction]) -> Transaction {
        let mut message = Message::new(ixs, Some(&payer.pubkey()));
        message.recent_blockhash = Hash::new_from_array([1; 32]);
        let mut tx = Transaction::new_unsigned(message);
        let mut signers = vec![payer];
        signers.extend_from_slice(extra);
        tx.try_sign(&signers, Hash::new_from_array([1; 32])).unwrap();
        tx
    }

    #[tokio::test]
    async fn failed_instruction_rolls_back_but_charges_fee() {
        let ledger = InMemoryLedger::new();
        let payer = Keypair::new();
        ledger.airdrop(&payer.pubkey(), 1_000_000_000);

        let ctx = RecordContext::new("Ghost").unwrap();
        let ghost = MemeCoin {
            name: "Ghost".into(),
            symbol: "BOO".into(),
            uri: String::new(),
            decimals: 0,
            mint: Address::new_from_array([1; 32]),
            creator: Address::new_from_array([2; 32]),
            price_per_token: 1,
            total_supply: 1,
            circulating_supply: 0,
            total_volume: 0,
            holder_count: 0,
            is_active: true,
            bump: ctx.bump,
        };
        let tx = signed(&payer, &[], &[ctx.buy_tokens(&ghost, payer.pubkey(), 1)]);
        let signature = ledger.send_transaction(&tx).await.unwrap();

        assert_eq!(
            ledger.get_signature_status(&signature).await.unwrap(),
            Some(Err(TransactionError::InstructionError(
                0,
                InstructionError::Custom(program_error::ACCOUNT_NOT_INITIALIZED)
            )))
        );
        assert_eq!(ledger.lamports(&payer.pubkey()), 1_000_000_000 - SIGNATURE_FEE);
    }

    #[tokio::test]
    async fn confirmation_delay_and_offline() {
        let ledger = InMemoryLedger::new().with_confirmation_delay(2);
        let payer = Keypair::new();
        ledger.airdrop(&payer.pubkey(), 1_000_000_000);

        let tx = signed(
            &payer,
            &[],
            &[solana_compute_budget_interface::ComputeBudgetInstruction::set_compute_unit_limit(1)],
        );
        let signature = ledger.send_transaction(&tx).await.unwrap();
        assert_eq!(ledger.get_signature_status(&signature).await.unwrap(), None);
        assert_eq!(ledger.get_signature_status(&signature).await.unwrap(), None);
        assert_eq!(
            ledger.get_signature_status(&signature).await.unwrap(),
            Some(Ok(()))
        );

        ledger.set_offline(true);
        assert!(matches!(
            ledger.get_balance(&payer.pubkey()).await,
            Err(ClientError::Network(_))
        ));
    }
}
