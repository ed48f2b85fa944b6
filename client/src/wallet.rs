//! The wallet capability: the only source of signatures for the fee payer.

use solana_address::Address;
use solana_keypair::Keypair;
use solana_sdk::{
    signer::Signer,
    transaction::Transaction,
};

use crate::error::{
    ClientError,
    ClientResult,
};

pub const NOT_CONNECTED: &str = "Please connect your wallet first";

pub trait WalletCapability {
    fn is_connected(&self) -> bool;

    /// The connected account, or a [`ClientError::Wallet`] when disconnected.
    fn pubkey(&self) -> ClientResult<Address>;

    /// Adds the wallet's signature to a transaction whose blockhash is already set. Other
    /// signatures already present are kept.
    async fn sign_transaction(&self, transaction: Transaction) -> ClientResult<Transaction>;

    async fn sign_all_transactions(
        &self,
        transactions: Vec<Transaction>,
    ) -> ClientResult<Vec<Transaction>> {
        let mut signed = Vec::with_capacity(transactions.len());
        for transaction in transactions {
            signed.push(self.sign_transaction(transaction).await?);
        }
        Ok(signed)
    }
}

/// A wallet backed by a local keypair, or disconnected when none was configured.
#[derive(Default)]
pub struct KeypairWallet {
    keypair: Option<Keypair>,
}

impl KeypairWallet {
    pub fn connected(keypair: Keypair) -> Self {
        Self {
            keypair: Some(keypair),
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    fn keypair(&self) -> ClientResult<&Keypair> {
        self.keypair
            .as_ref()
            .ok_or_else(|| ClientError::Wallet(NOT_CONNECTED.into()))
    }
}

impl WalletCapability for KeypairWallet {
    fn is_connected(&self) -> bool {
        self.keypair.is_some()
    }

    fn pubkey(&self) -> ClientResult<Address> {
        Ok(self.keypair()?.pubkey())
    }

    async fn sign_transaction(&self, mut transaction: Transaction) -> ClientResult<Transaction> {
        let keypair = self.keypair()?;
        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_partial_sign(&[keypair], blockhash)
            .map_err(|e| ClientError::Wallet(format!("Signing failed: {e}")))?;

        Ok(transaction)
    }
}
