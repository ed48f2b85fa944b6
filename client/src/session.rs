//! Drives the builder, submission pipeline and projector on behalf of a front end, folding every
//! outcome into an [`AppState`].

use solana_sdk::signature::Signature;

use crate::{
    builder::{
        Operation,
        PreparedTransaction,
        TransactionBuilder,
    },
    error::{
        ClientError,
        ClientResult,
    },
    state::{
        AppEvent,
        AppState,
        CreateForm,
        TradeForm,
    },
    submission::{
        Submission,
        SubmissionState,
    },
    transactions::LedgerRpc,
    views::refresh,
    wallet::{
        WalletCapability,
        NOT_CONNECTED,
    },
};

pub struct Session<R, W> {
    pub rpc: R,
    pub wallet: W,
    state: AppState,
}

fn apply(state: &mut AppState, event: AppEvent) {
    *state = std::mem::take(state).reduce(event);
}

impl<R: LedgerRpc, W: WalletCapability> Session<R, W> {
    pub fn new(rpc: R, wallet: W) -> Self {
        Self {
            rpc,
            wallet,
            state: AppState::default(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn dispatch(&mut self, event: AppEvent) {
        apply(&mut self.state, event);
    }

    /// Initial load. Without a connected wallet every cache is cleared.
    pub async fn load(&mut self) {
        match self.wallet.pubkey() {
            Ok(address) => {
                self.dispatch(AppEvent::WalletConnected(address));
                self.refresh().await;
            }
            Err(_) => self.dispatch(AppEvent::WalletDisconnected),
        }
    }

    /// Re-fetches records, holdings and balance. A failed path reports into the status slot and
    /// leaves its previously loaded data in place.
    pub async fn refresh(&mut self) {
        let Ok(owner) = self.wallet.pubkey() else {
            self.dispatch(AppEvent::WalletDisconnected);
            return;
        };

        let snapshot = refresh(&self.rpc, &owner).await;
        self.dispatch(match snapshot.records {
            Ok(records) => AppEvent::RecordsFetched(records),
            Err(error) => AppEvent::FetchFailed(error),
        });
        self.dispatch(match snapshot.holdings {
            Ok(holdings) => AppEvent::HoldingsFetched(holdings),
            Err(error) => AppEvent::FetchFailed(error),
        });
        self.dispatch(match snapshot.balance {
            Ok(balance) => AppEvent::BalanceFetched(balance),
            Err(error) => AppEvent::FetchFailed(error),
        });
    }

    pub async fn create(
        &mut self,
        form: CreateForm,
        observe: impl FnMut(&SubmissionState),
    ) -> ClientResult<Signature> {
        self.state.create_form = form;
        self.run(Operation::Create, observe).await
    }

    pub async fn buy(
        &mut self,
        form: TradeForm,
        observe: impl FnMut(&SubmissionState),
    ) -> ClientResult<Signature> {
        self.state.buy_form = form;
        self.run(Operation::Buy, observe).await
    }

    pub async fn sell(
        &mut self,
        form: TradeForm,
        observe: impl FnMut(&SubmissionState),
    ) -> ClientResult<Signature> {
        self.state.sell_form = form;
        self.run(Operation::Sell, observe).await
    }

    async fn run(
        &mut self,
        operation: Operation,
        mut observe: impl FnMut(&SubmissionState),
    ) -> ClientResult<Signature> {
        if !self.state.can_submit() {
            let error = match self.state.wallet {
                None => ClientError::Wallet(NOT_CONNECTED.into()),
                Some(_) => ClientError::Validation("Another transaction is still in flight".into()),
            };
            self.dispatch(AppEvent::SubmissionStarted(operation));
            return Err(error);
        }

        self.dispatch(AppEvent::SubmissionStarted(operation));
        let result = self.build_and_submit(operation, &mut observe).await;
        match &result {
            Ok(signature) => {
                self.dispatch(AppEvent::SubmissionConfirmed {
                    operation,
                    signature: *signature,
                });
                self.refresh().await;
            }
            Err(error) => self.dispatch(AppEvent::SubmissionFailed(error.clone())),
        }

        result
    }

    /// Preflight runs inside `Building`, so its failures end the submission like any other.
    async fn build_and_submit(
        &mut self,
        operation: Operation,
        observe: &mut impl FnMut(&SubmissionState),
    ) -> ClientResult<Signature> {
        let forms = (
            self.state.create_form.clone(),
            self.state.buy_form.clone(),
            self.state.sell_form.clone(),
        );
        let state = &mut self.state;
        let mut submission = Submission::new(|next: &SubmissionState| {
            observe(next);
            apply(state, AppEvent::SubmissionProgressed(next.clone()));
        });
        submission.begin();

        match prepare(&self.rpc, &self.wallet, operation, forms).await {
            Ok(prepared) => submission.submit(&self.rpc, &self.wallet, &prepared).await,
            Err(error) => {
                submission.fail(error.clone());
                Err(error)
            }
        }
    }
}

async fn prepare(
    rpc: &impl LedgerRpc,
    wallet: &impl WalletCapability,
    operation: Operation,
    (create_form, buy_form, sell_form): (CreateForm, TradeForm, TradeForm),
) -> ClientResult<PreparedTransaction> {
    let builder = TransactionBuilder::new(rpc, wallet.pubkey()?);
    match operation {
        Operation::Create => builder.create(&create_form.validate()?).await,
        Operation::Buy => builder.buy(&buy_form.validate()?).await,
        Operation::Sell => builder.sell(&sell_form.validate()?).await,
    }
}
