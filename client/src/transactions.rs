//! Nonblocking RPC access: the [`LedgerRpc`] seam used by every client operation and its
//! [`CustomRpcClient`] implementation over `solana-client`.

use solana_account::Account;
use solana_address::Address;
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_config::{
        CommitmentConfig,
        RpcAccountInfoConfig,
        RpcProgramAccountsConfig,
        UiAccountEncoding,
    },
    rpc_filter::{
        Memcmp,
        RpcFilterType,
    },
};
use solana_sdk::{
    hash::Hash,
    signature::Signature,
    transaction::Transaction,
};
use solana_transaction_error::TransactionError;

use crate::error::{
    ClientError,
    ClientResult,
};

pub const DEVNET_URL: &str = "https://api.devnet.solana.com";

/// Read and relay operations the client needs from an RPC endpoint. All reads are at the
/// `confirmed` commitment level.
pub trait LedgerRpc {
    fn send_config(&self) -> &SendTransactionConfig;

    async fn get_balance(&self, address: &Address) -> ClientResult<u64>;

    /// `None` when no account exists at `address`.
    async fn get_account(&self, address: &Address) -> ClientResult<Option<Account>>;

    /// Every account owned by `program_id` whose data starts with `discriminator`.
    async fn get_program_accounts_by_discriminator(
        &self,
        program_id: &Address,
        discriminator: &[u8],
    ) -> ClientResult<Vec<(Address, Account)>>;

    async fn get_latest_blockhash(&self) -> ClientResult<Hash>;

    async fn send_transaction(&self, transaction: &Transaction) -> ClientResult<Signature>;

    /// `None` until the transaction reaches the confirmation level.
    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> ClientResult<Option<Result<(), TransactionError>>>;
}

/// Checks if an account at the given address exists on-chain.
pub async fn account_exists(rpc: &impl LedgerRpc, address: &Address) -> ClientResult<bool> {
    Ok(rpc.get_account(address).await?.is_some())
}

#[derive(Clone, Debug)]
pub struct SendTransactionConfig {
    /// Delay between signature status checks.
    pub poll_interval_ms: u64,
    /// Status checks before a submission is reported as timed out.
    pub max_polls: u32,
    pub debug_logs: bool,
}

impl Default for SendTransactionConfig {
    fn default() -> Self {
        SendTransactionConfig {
            poll_interval_ms: 500,
            max_polls: 60,
            debug_logs: false,
        }
    }
}

pub struct CustomRpcClient {
    pub client: RpcClient,
    pub config: SendTransactionConfig,
}

impl Default for CustomRpcClient {
    fn default() -> Self {
        CustomRpcClient::new_from_url(DEVNET_URL, Default::default())
    }
}

impl CustomRpcClient {
    pub fn new_from_url(url: &str, config: SendTransactionConfig) -> Self {
        CustomRpcClient {
            client: RpcClient::new_with_commitment(url.into(), CommitmentConfig::confirmed()),
            config,
        }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }
}

impl LedgerRpc for CustomRpcClient {
    fn send_config(&self) -> &SendTransactionConfig {
        &self.config
    }

    async fn get_balance(&self, address: &Address) -> ClientResult<u64> {
        Ok(self
            .client
            .get_balance_with_commitment(address, CommitmentConfig::confirmed())
            .await?
            .value)
    }

    async fn get_account(&self, address: &Address) -> ClientResult<Option<Account>> {
        Ok(self
            .client
            .get_account_with_commitment(address, CommitmentConfig::confirmed())
            .await?
            .value)
    }

    async fn get_program_accounts_by_discriminator(
        &self,
        program_id: &Address,
        discriminator: &[u8],
    ) -> ClientResult<Vec<(Address, Account)>> {
        let config = RpcProgramAccountsConfig {
            filters: Some(vec![RpcFilterType::Memcmp(Memcmp::new_raw_bytes(
                0,
                discriminator.to_vec(),
            ))]),
            account_config: RpcAccountInfoConfig {
                commitment: Some(CommitmentConfig::confirmed()),
                encoding: Some(UiAccountEncoding::Base64),
                data_slice: None,
                min_context_slot: None,
            },
            with_context: None,
            sort_results: None,
        };

        Ok(self
            .client
            .get_program_accounts_with_config(program_id, config)
            .await?)
    }

    async fn get_latest_blockhash(&self) -> ClientResult<Hash> {
        Ok(self.client.get_latest_blockhash().await?)
    }

    async fn send_transaction(&self, transaction: &Transaction) -> ClientResult<Signature> {
        self.client
            .send_transaction(transaction)
            .await
            .map_err(|error| match error.get_transaction_error() {
                // Preflight simulation already executed the program and it rejected the
                // transaction.
                Some(transaction_error) => {
                    ClientError::OnChainExecution(transaction_error.to_string())
                }
                None => error.into(),
            })
    }

    async fn get_signature_status(
        &self,
        signature: &Signature,
    ) -> ClientResult<Option<Result<(), TransactionError>>> {
        Ok(self
            .client
            .get_signature_status_with_commitment(signature, CommitmentConfig::confirmed())
            .await?)
    }
}
