use solana_address::Address;
use solana_keypair::Keypair;
use solana_sdk::{
    signature::Signature,
    signer::Signer,
    transaction::Transaction,
};

use crate::{
    error::{
        ClientError,
        ClientResult,
    },
    session::Session,
    state::{
        CreateForm,
        TradeForm,
    },
    submission::SubmissionState,
    wallet::{
        KeypairWallet,
        WalletCapability,
    },
};

pub mod ledger;

pub use ledger::InMemoryLedger;

/// Lamports airdropped to the harness wallet unless a test asks for a different amount.
pub const DEFAULT_FUND_AMOUNT: u64 = 10_000_000_000;

/// Convenience harness for end-to-end tests and demos.
///
/// Upon instantiation it:
/// - Creates a fresh [`InMemoryLedger`] and a connected [`KeypairWallet`].
/// - Airdrops the requested lamports to the wallet.
/// - Loads the session so records, holdings and balance are populated.
pub struct E2e<W = KeypairWallet> {
    pub session: Session<InMemoryLedger, W>,
}

impl E2e<KeypairWallet> {
    pub async fn new() -> Self {
        Self::funded(DEFAULT_FUND_AMOUNT).await
    }

    pub async fn funded(lamports: u64) -> Self {
        let keypair = Keypair::new();
        let ledger = InMemoryLedger::new();
        ledger.airdrop(&keypair.pubkey(), lamports);
        Self::with_parts(ledger, KeypairWallet::connected(keypair)).await
    }
}

impl<W: WalletCapability> E2e<W> {
    pub async fn with_parts(ledger: InMemoryLedger, wallet: W) -> Self {
        let mut session = Session::new(ledger, wallet);
        session.load().await;
        Self { session }
    }

    pub fn ledger(&self) -> &InMemoryLedger {
        &self.session.rpc
    }

    pub fn owner(&self) -> Address {
        self.session
            .wallet
            .pubkey()
            .unwrap_or_else(|_| Address::new_from_array([0; 32]))
    }

    pub fn balance(&self) -> u64 {
        self.ledger().lamports(&self.owner())
    }

    /// The wallet's raw token amount for the named record, if it has a holding account.
    pub fn holding(&self, name: &str) -> Option<u64> {
        let record = self.ledger().record(name)?;
        self.ledger().token_balance(&self.owner(), &record.mint)
    }

    /// Creates a record with the form defaults for decimals, supply and price.
    pub async fn create_coin(&mut self, name: &str, symbol: &str) -> ClientResult<Signature> {
        let form = CreateForm {
            name: name.into(),
            symbol: symbol.into(),
            uri: format!("https://example.com/{symbol}.json"),
            ..Default::default()
        };
        self.session.create(form, |_| ()).await
    }

    pub async fn create_coin_with(
        &mut self,
        form: CreateForm,
        states: &mut Vec<SubmissionState>,
    ) -> ClientResult<Signature> {
        self.session.create(form, |s| states.push(s.clone())).await
    }

    pub async fn buy(&mut self, name: &str, quantity: u64) -> ClientResult<Signature> {
        self.session.buy(trade_form(name, quantity), |_| ()).await
    }

    pub async fn sell(&mut self, name: &str, quantity: u64) -> ClientResult<Signature> {
        self.session.sell(trade_form(name, quantity), |_| ()).await
    }
}

pub fn trade_form(name: &str, quantity: u64) -> TradeForm {
    TradeForm {
        name: name.into(),
        quantity: quantity.to_string(),
    }
}

/// A connected wallet whose user declines every signature request.
pub struct RejectingWallet {
    pub address: Address,
}

impl WalletCapability for RejectingWallet {
    fn is_connected(&self) -> bool {
        true
    }

    fn pubkey(&self) -> ClientResult<Address> {
        Ok(self.address)
    }

    async fn sign_transaction(&self, _transaction: Transaction) -> ClientResult<Transaction> {
        Err(ClientError::Wallet("User rejected the request".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_loads_funded_wallet() {
        let e2e = E2e::funded(1_000_000_000).await;
        let state = e2e.session.state();
        assert_eq!(state.wallet, Some(e2e.owner()));
        assert_eq!(state.balance, Some(1_000_000_000));
        assert!(state.records.is_empty());
        assert!(state.holdings.is_empty());
    }
}
