//! Application state owned by the front end, with a pure reducer over [`AppEvent`]s.

use solana_address::Address;
use solana_sdk::signature::Signature;

use crate::{
    builder::{
        CreateArgs,
        Operation,
        TradeArgs,
    },
    error::{
        ClientError,
        ClientResult,
    },
    submission::SubmissionState,
    views::{
        HoldingView,
        RecordView,
    },
    wallet::NOT_CONNECTED,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum_macros::Display)]
pub enum Tab {
    #[default]
    Trade,
    Create,
    Portfolio,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusLevel {
    Pending,
    Success,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub level: StatusLevel,
    pub message: String,
}

impl Status {
    fn pending(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Pending,
            message: message.into(),
        }
    }

    fn success(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            message: message.into(),
        }
    }
}

/// Raw create-form input, as typed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateForm {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub decimals: String,
    pub initial_supply: String,
    pub price_per_token: String,
}

impl Default for CreateForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            symbol: String::new(),
            uri: String::new(),
            decimals: "9".into(),
            initial_supply: "1000000".into(),
            // 0.001 SOL.
            price_per_token: "1000000".into(),
        }
    }
}

impl CreateForm {
    pub fn validate(&self) -> ClientResult<CreateArgs> {
        let args = CreateArgs {
            name: self.name.trim().to_string(),
            symbol: self.symbol.trim().to_string(),
            uri: self.uri.trim().to_string(),
            decimals: parse_field("decimals", &self.decimals)?,
            initial_supply: parse_field("initial supply", &self.initial_supply)?,
            price_per_token: parse_field("price per token", &self.price_per_token)?,
        };
        args.validate()?;

        Ok(args)
    }
}

/// Raw buy/sell form input, as typed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TradeForm {
    pub name: String,
    pub quantity: String,
}

impl TradeForm {
    pub fn validate(&self) -> ClientResult<TradeArgs> {
        let args = TradeArgs {
            name: self.name.trim().to_string(),
            quantity: parse_field("quantity", &self.quantity)?,
        };
        args.validate()?;

        Ok(args)
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, value: &str) -> ClientResult<T> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ClientError::Validation(format!("The {field} is required")));
    }
    value
        .parse()
        .map_err(|_| ClientError::Validation(format!("The {field} must be a whole number")))
}

#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    WalletConnected(Address),
    WalletDisconnected,
    TabSelected(Tab),
    SubmissionStarted(Operation),
    SubmissionProgressed(SubmissionState),
    SubmissionConfirmed {
        operation: Operation,
        signature: Signature,
    },
    SubmissionFailed(ClientError),
    RecordsFetched(Vec<RecordView>),
    HoldingsFetched(Vec<HoldingView>),
    BalanceFetched(u64),
    FetchFailed(ClientError),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    pub wallet: Option<Address>,
    pub tab: Tab,
    pub records: Vec<RecordView>,
    pub holdings: Vec<HoldingView>,
    pub balance: Option<u64>,
    pub status: Option<Status>,
    pub operation: Option<Operation>,
    pub submission: Option<SubmissionState>,
    pub create_form: CreateForm,
    pub buy_form: TradeForm,
    pub sell_form: TradeForm,
}

impl AppState {
    /// Controls that start a submission are enabled only when this holds. A submission counts as
    /// in flight from `SubmissionStarted` until it reaches a terminal state, including the `Idle`
    /// step between a prerequisite and the main transaction.
    pub fn can_submit(&self) -> bool {
        self.wallet.is_some()
            && self
                .submission
                .as_ref()
                .is_none_or(SubmissionState::is_terminal)
    }

    /// Follows `next` only along an edge [`SubmissionState::advance`] allows. Repeats and
    /// illegal edges leave the current state in place.
    fn step_submission(&mut self, next: SubmissionState) {
        let Some(current) = self.submission.take() else {
            return;
        };
        self.submission = Some(match current == next {
            true => current,
            false => current.clone().advance(next).unwrap_or(current),
        });
    }

    pub fn reduce(mut self, event: AppEvent) -> Self {
        match event {
            AppEvent::WalletConnected(address) => {
                self.wallet = Some(address);
            }
            AppEvent::WalletDisconnected => {
                self.wallet = None;
                self.records.clear();
                self.holdings.clear();
                self.balance = None;
                self.status = Some(Status::error(NOT_CONNECTED));
            }
            AppEvent::TabSelected(tab) => {
                self.tab = tab;
            }
            AppEvent::SubmissionStarted(operation) => {
                if !self.can_submit() {
                    self.status = Some(Status::error(match self.wallet {
                        None => NOT_CONNECTED,
                        Some(_) => "Another transaction is still in flight",
                    }));
                    return self;
                }
                self.operation = Some(operation);
                self.submission = Some(SubmissionState::Building);
                self.status = Some(Status::pending(pending_message(operation)));
            }
            AppEvent::SubmissionProgressed(state) => {
                self.step_submission(state);
            }
            AppEvent::SubmissionConfirmed {
                operation,
                signature,
            } => {
                self.submission = Some(SubmissionState::Confirmed { signature });
                self.status = Some(Status::success(format!(
                    "✅ {} confirmed! TX: {signature}",
                    operation
                )));
                match operation {
                    Operation::Create => self.create_form = CreateForm::default(),
                    Operation::Buy => self.buy_form = TradeForm::default(),
                    Operation::Sell => self.sell_form = TradeForm::default(),
                }
            }
            AppEvent::SubmissionFailed(error) => {
                self.status = Some(Status::error(format!("❌ Error: {error}")));
                self.submission = Some(SubmissionState::Failed { error });
            }
            AppEvent::RecordsFetched(records) => {
                self.records = records;
            }
            AppEvent::HoldingsFetched(holdings) => {
                self.holdings = holdings;
            }
            AppEvent::BalanceFetched(balance) => {
                self.balance = Some(balance);
            }
            AppEvent::FetchFailed(error) => {
                self.status = Some(Status::error(format!("❌ Error: {error}")));
            }
        }

        self
    }
}

fn pending_message(operation: Operation) -> &'static str {
    match operation {
        Operation::Create => "Creating meme coin...",
        Operation::Buy => "Buying tokens...",
        Operation::Sell => "Selling tokens...",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected() -> AppState {
        AppState::default().reduce(AppEvent::WalletConnected(Address::new_from_array([1; 32])))
    }

    #[test]
    fn create_form_defaults_validate_once_filled() {
        let form = CreateForm {
            name: " Doge ".into(),
            symbol: "MOON".into(),
            uri: "ipfs://doge".into(),
            ..Default::default()
        };
        let args = form.validate().unwrap();
        assert_eq!(args.name, "Doge");
        assert_eq!(args.decimals, 9);
        assert_eq!(args.initial_supply, 1_000_000);
        assert_eq!(args.price_per_token, 1_000_000);
    }

    #[test]
    fn non_numeric_fields_are_rejected() {
        let form = CreateForm {
            name: "Doge".into(),
            symbol: "MOON".into(),
            uri: "ipfs://doge".into(),
            initial_supply: "lots".into(),
            ..Default::default()
        };
        assert_eq!(
            form.validate(),
            Err(ClientError::Validation(
                "The initial supply must be a whole number".into()
            ))
        );

        let trade = TradeForm {
            name: "Doge".into(),
            quantity: "-3".into(),
        };
        assert!(matches!(trade.validate(), Err(ClientError::Validation(_))));

        let empty = TradeForm {
            name: "Doge".into(),
            quantity: " ".into(),
        };
        assert_eq!(
            empty.validate(),
            Err(ClientError::Validation("The quantity is required".into()))
        );
    }

    #[test]
    fn disconnect_clears_caches() {
        let state = connected()
            .reduce(AppEvent::BalanceFetched(42))
            .reduce(AppEvent::HoldingsFetched(vec![]))
            .reduce(AppEvent::WalletDisconnected);
        assert_eq!(state.balance, None);
        assert!(state.records.is_empty());
        assert_eq!(state.status.unwrap().message, NOT_CONNECTED);
    }

    #[test]
    fn fetch_failure_keeps_previous_data() {
        let state = connected()
            .reduce(AppEvent::BalanceFetched(42))
            .reduce(AppEvent::FetchFailed(ClientError::Network("offline".into())));
        assert_eq!(state.balance, Some(42));
        assert_eq!(state.status.unwrap().level, StatusLevel::Error);
    }

    #[test]
    fn only_one_submission_in_flight() {
        let state = connected()
            .reduce(AppEvent::SubmissionStarted(Operation::Buy))
            .reduce(AppEvent::SubmissionProgressed(SubmissionState::Building));
        assert!(!state.can_submit());

        let refused = state.clone().reduce(AppEvent::SubmissionStarted(Operation::Sell));
        assert_eq!(refused.operation, Some(Operation::Buy));
        assert_eq!(refused.submission, Some(SubmissionState::Building));
        assert_eq!(refused.status.unwrap().level, StatusLevel::Error);
    }

    #[test]
    fn second_start_keeps_the_first_operation() {
        let state = connected().reduce(AppEvent::SubmissionStarted(Operation::Buy));
        assert_eq!(state.submission, Some(SubmissionState::Building));
        assert!(!state.can_submit());

        let state = state.reduce(AppEvent::SubmissionStarted(Operation::Sell));
        assert_eq!(state.operation, Some(Operation::Buy));
        assert_eq!(state.submission, Some(SubmissionState::Building));
        assert_eq!(
            state.status.unwrap().message,
            "Another transaction is still in flight"
        );
    }

    #[test]
    fn guard_stays_closed_between_prerequisite_and_main() {
        let signature = Signature::from([3; 64]);
        let state = [
            SubmissionState::AwaitingSignature,
            SubmissionState::Submitted { signature },
            SubmissionState::Confirming { signature },
            SubmissionState::Confirmed { signature },
            SubmissionState::Idle,
        ]
        .into_iter()
        .fold(
            connected().reduce(AppEvent::SubmissionStarted(Operation::Buy)),
            |state, next| state.reduce(AppEvent::SubmissionProgressed(next)),
        );

        assert_eq!(state.submission, Some(SubmissionState::Idle));
        assert!(!state.can_submit());
    }

    #[test]
    fn progress_follows_only_legal_edges() {
        let state = connected()
            .reduce(AppEvent::SubmissionStarted(Operation::Create))
            .reduce(AppEvent::SubmissionProgressed(SubmissionState::Confirmed {
                signature: Signature::default(),
            }));
        assert_eq!(state.submission, Some(SubmissionState::Building));

        let preflight_failure = state.reduce(AppEvent::SubmissionProgressed(
            SubmissionState::Failed {
                error: ClientError::RecordNotFound("Doge".into()),
            },
        ));
        assert!(matches!(
            preflight_failure.submission,
            Some(SubmissionState::Failed { .. })
        ));
        assert!(preflight_failure.can_submit());
    }

    #[test]
    fn progress_without_a_started_submission_is_ignored() {
        let state = connected().reduce(AppEvent::SubmissionProgressed(SubmissionState::Building));
        assert_eq!(state.submission, None);
        assert!(state.can_submit());
    }

    #[test]
    fn confirmation_resets_only_that_form() {
        let mut state = connected();
        state.buy_form.name = "Doge".into();
        state.sell_form.name = "Pepe".into();
        let state = state
            .reduce(AppEvent::SubmissionStarted(Operation::Buy))
            .reduce(AppEvent::SubmissionConfirmed {
                operation: Operation::Buy,
                signature: Signature::default(),
            });
        assert!(state.can_submit());
        assert_eq!(state.buy_form, TradeForm::default());
        assert_eq!(state.sell_form.name, "Pepe");
        assert_eq!(state.status.unwrap().level, StatusLevel::Success);
    }

    #[test]
    fn failure_keeps_form_and_reports() {
        let mut state = connected();
        state.sell_form.quantity = "10".into();
        let state = state
            .reduce(AppEvent::SubmissionStarted(Operation::Sell))
            .reduce(AppEvent::SubmissionFailed(ClientError::InsufficientBalance {
                requested: 10,
                held: 3,
            }));
        assert_eq!(state.sell_form.quantity, "10");
        assert!(state.can_submit());
        assert!(state.status.unwrap().message.contains("requested 10, holding 3"));
    }
}
