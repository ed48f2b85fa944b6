//! Read-only projections of on-chain state into display-ready views: every record, the caller's
//! holdings, and the caller's SOL balance.

use futures::{
    stream,
    StreamExt,
    TryStreamExt,
};
use itertools::Itertools;
use meme_coin_interface::{
    program,
    record::MemeCoin,
    LAMPORTS_PER_SOL,
};
use solana_address::Address;

use crate::{
    context::token::{
        fetch_token_amount,
        TokenContext,
    },
    error::{
        ClientError,
        ClientResult,
    },
    transactions::LedgerRpc,
};

/// Upper bound on holding-account lookups in flight at once, to stay under RPC rate limits.
pub const MAX_CONCURRENT_HOLDING_CHECKS: usize = 8;

pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordView {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub decimals: u8,
    pub mint: Address,
    pub creator: Address,
    pub price_per_token: u64,
    pub price_in_sol: f64,
    pub total_supply: u64,
    pub circulating_supply: u64,
    pub total_volume: u64,
    pub holder_count: u64,
    pub is_active: bool,
}

impl RecordView {
    pub fn new(address: Address, record: MemeCoin) -> Self {
        Self {
            address,
            price_in_sol: lamports_to_sol(record.price_per_token),
            name: record.name,
            symbol: record.symbol,
            uri: record.uri,
            decimals: record.decimals,
            mint: record.mint,
            creator: record.creator,
            price_per_token: record.price_per_token,
            total_supply: record.total_supply,
            circulating_supply: record.circulating_supply,
            total_volume: record.total_volume,
            holder_count: record.holder_count,
            is_active: record.is_active,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HoldingView {
    pub record: Address,
    pub name: String,
    pub symbol: String,
    pub mint: Address,
    pub holding_address: Address,
    pub amount: u64,
    /// `amount * price_per_token`, saturating.
    pub value_lamports: u64,
    pub value_in_sol: f64,
}

impl HoldingView {
    pub fn new(record: &RecordView, holding_address: Address, amount: u64) -> Self {
        let value_lamports = amount.saturating_mul(record.price_per_token);
        Self {
            record: record.address,
            name: record.name.clone(),
            symbol: record.symbol.clone(),
            mint: record.mint,
            holding_address,
            amount,
            value_lamports,
            value_in_sol: lamports_to_sol(value_lamports),
        }
    }
}

/// Full scan of every record account owned by the program. No pagination; order is whatever the
/// endpoint returns.
pub async fn list_records(rpc: &impl LedgerRpc) -> ClientResult<Vec<RecordView>> {
    rpc.get_program_accounts_by_discriminator(&program::ID, &MemeCoin::discriminator())
        .await?
        .into_iter()
        .map(|(address, account)| {
            MemeCoin::try_from_account_data(&account.data)
                .map(|record| RecordView::new(address, record))
                .map_err(|e| ClientError::schema_mismatch(&address, e))
        })
        .collect()
}

/// The caller's non-zero holdings across every record, sorted by record name.
pub async fn list_holdings(rpc: &impl LedgerRpc, owner: &Address) -> ClientResult<Vec<HoldingView>> {
    let records = list_records(rpc).await?;
    list_holdings_for(rpc, &records, owner).await
}

/// The caller's non-zero holdings among `records`, sorted by record name. Checks one holding
/// account per record with at most [`MAX_CONCURRENT_HOLDING_CHECKS`] lookups in flight.
pub async fn list_holdings_for(
    rpc: &impl LedgerRpc,
    records: &[RecordView],
    owner: &Address,
) -> ClientResult<Vec<HoldingView>> {
    let holdings: Vec<Option<HoldingView>> = stream::iter(records)
        .map(|record| async move {
            let holding_address = TokenContext::new(record.mint).get_ata_for(owner);
            let amount = fetch_token_amount(rpc, &holding_address).await?;
            Ok::<_, ClientError>(
                amount
                    .filter(|amount| *amount > 0)
                    .map(|amount| HoldingView::new(record, holding_address, amount)),
            )
        })
        .buffer_unordered(MAX_CONCURRENT_HOLDING_CHECKS)
        .try_collect()
        .await?;

    Ok(holdings
        .into_iter()
        .flatten()
        .sorted_by(|a, b| a.name.cmp(&b.name))
        .collect())
}

pub async fn fetch_balance(rpc: &impl LedgerRpc, owner: &Address) -> ClientResult<u64> {
    rpc.get_balance(owner).await
}

/// Results of one refresh, kept per path so a failure in one doesn't discard the others.
#[derive(Debug)]
pub struct Snapshot {
    pub records: ClientResult<Vec<RecordView>>,
    pub holdings: ClientResult<Vec<HoldingView>>,
    pub balance: ClientResult<u64>,
}

/// Fetches the balance alongside one record scan, then derives holdings from that same scan so
/// both lists describe the same set of records.
pub async fn refresh(rpc: &impl LedgerRpc, owner: &Address) -> Snapshot {
    let scan = async {
        let records = list_records(rpc).await;
        let holdings = match &records {
            Ok(records) => list_holdings_for(rpc, records, owner).await,
            Err(error) => Err(error.clone()),
        };
        (records, holdings)
    };
    let ((records, holdings), balance) = futures::join!(scan, fetch_balance(rpc, owner));

    Snapshot {
        records,
        holdings,
        balance,
    }
}
