//! Environment configuration for the terminal front end.
//!
//! - `MEME_COIN_RPC_URL`: RPC endpoint, devnet when unset.
//! - `MEME_COIN_KEYPAIR`: the wallet's secret key as a JSON byte array or base58. When unset the
//!   session runs with a disconnected wallet.

use anyhow::Context;
use client::transactions::DEVNET_URL;
use solana_sdk::{
    bs58,
    signature::Keypair,
};

pub const RPC_URL_VAR: &str = "MEME_COIN_RPC_URL";
pub const KEYPAIR_VAR: &str = "MEME_COIN_KEYPAIR";

pub fn rpc_url() -> String {
    std::env::var(RPC_URL_VAR).unwrap_or_else(|_| DEVNET_URL.to_string())
}

pub fn wallet_keypair() -> anyhow::Result<Option<Keypair>> {
    match std::env::var(KEYPAIR_VAR) {
        Ok(kp_str) => parse_keypair(kp_str.trim())
            .with_context(|| format!("Environment variable {KEYPAIR_VAR} isn't a valid keypair"))
            .map(Some),
        Err(_) => Ok(None),
    }
}

pub fn parse_keypair(kp_str: &str) -> anyhow::Result<Keypair> {
    let byte_vec: Vec<u8> = if kp_str.starts_with('[') {
        serde_json::from_str(kp_str).context("Invalid JSON keypair")?
    } else {
        bs58::decode(kp_str)
            .into_vec()
            .context("Invalid base58 keypair")?
    };

    Keypair::try_from(byte_vec.as_slice()).context("Invalid keypair bytes")
}
