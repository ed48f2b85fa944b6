//! Client error taxonomy. Every variant renders into a one-line status message.

use meme_coin_interface::error::InterfaceError;
use solana_address::Address;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Clone, Debug, Error, PartialEq, Eq, strum_macros::IntoStaticStr)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Wallet(String),

    #[error("Insufficient SOL: {required} lamports required, {available} available")]
    InsufficientFunds { required: u64, available: u64 },

    #[error("Insufficient token balance: requested {requested}, holding {held}")]
    InsufficientBalance { requested: u64, held: u64 },

    #[error("Meme coin \"{0}\" is not active")]
    InactiveRecord(String),

    #[error("Meme coin \"{0}\" not found")]
    RecordNotFound(String),

    #[error("Address derivation failed: {0}")]
    AddressDerivation(InterfaceError),

    #[error("{0}")]
    Network(String),

    #[error("Transaction failed: {0}")]
    OnChainExecution(String),
}

impl ClientError {
    /// Account data at `address` that doesn't decode as the expected type.
    pub fn schema_mismatch(address: &Address, error: InterfaceError) -> Self {
        ClientError::Network(format!("Schema mismatch for account {address}: {error}"))
    }

    /// A short name for the error class, e.g. `InsufficientFunds`.
    pub fn kind(&self) -> &'static str {
        self.into()
    }
}

impl From<solana_client::client_error::ClientError> for ClientError {
    fn from(error: solana_client::client_error::ClientError) -> Self {
        ClientError::Network(format!("RPC request failed: {error}"))
    }
}

impl From<InterfaceError> for ClientError {
    fn from(error: InterfaceError) -> Self {
        match error {
            InterfaceError::AddressDerivationFailed | InterfaceError::SeedTooLong => {
                ClientError::AddressDerivation(error)
            }
            _ => ClientError::Network(error.to_string()),
        }
    }
}
