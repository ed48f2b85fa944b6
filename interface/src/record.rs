//! The `MemeCoin` record account: one per created token.

use borsh::{
    BorshDeserialize,
    BorshSerialize,
};
use solana_address::Address;

use crate::{
    discriminator::{
        account_discriminator,
        Discriminator,
        DISCRIMINATOR_LEN,
    },
    error::InterfaceError,
};

pub const MEME_COIN_ACCOUNT_NAME: &str = "MemeCoin";

/// Field names in layout order. Must match the record type in the bundled IDL.
pub const MEME_COIN_FIELDS: [&str; 13] = [
    "name",
    "symbol",
    "uri",
    "decimals",
    "mint",
    "creator",
    "price_per_token",
    "total_supply",
    "circulating_supply",
    "total_volume",
    "holder_count",
    "is_active",
    "bump",
];

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct MemeCoin {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub decimals: u8,
    pub mint: Address,
    pub creator: Address,
    /// Lamports per raw token unit.
    pub price_per_token: u64,
    pub total_supply: u64,
    pub circulating_supply: u64,
    /// Cumulative lamports traded.
    pub total_volume: u64,
    pub holder_count: u64,
    pub is_active: bool,
    pub bump: u8,
}

impl MemeCoin {
    pub fn discriminator() -> Discriminator {
        account_discriminator(MEME_COIN_ACCOUNT_NAME)
    }

    /// Decodes raw account data. Trailing bytes past the encoded record are allowed since the
    /// program allocates for the maximum string lengths.
    pub fn try_from_account_data(data: &[u8]) -> Result<Self, InterfaceError> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(InterfaceError::InsufficientByteLength);
        }
        if data[..DISCRIMINATOR_LEN] != Self::discriminator() {
            return Err(InterfaceError::InvalidAccountDiscriminant);
        }

        let mut payload = &data[DISCRIMINATOR_LEN..];
        Self::deserialize(&mut payload).map_err(|_| InterfaceError::InvalidAccountData)
    }

    pub fn to_account_data(&self) -> Vec<u8> {
        let mut data = Self::discriminator().to_vec();
        borsh::to_writer(&mut data, self).expect("Writing to a Vec is infallible");
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MemeCoin {
        MemeCoin {
            name: "Doge".into(),
            symbol: "MOON".into(),
            uri: "https://example.com/doge.json".into(),
            decimals: 9,
            mint: Address::new_from_array([1; 32]),
            creator: Address::new_from_array([2; 32]),
            price_per_token: 1_000_000,
            total_supply: 1_000_000,
            circulating_supply: 0,
            total_volume: 0,
            holder_count: 0,
            is_active: true,
            bump: 254,
        }
    }

    #[test]
    fn decodes_with_trailing_padding() {
        let mut data = sample().to_account_data();
        data.extend_from_slice(&[0; 64]);
        assert_eq!(MemeCoin::try_from_account_data(&data), Ok(sample()));
    }

    #[test]
    fn rejects_wrong_discriminator() {
        let mut data = sample().to_account_data();
        data[0] ^= 0xff;
        assert_eq!(
            MemeCoin::try_from_account_data(&data),
            Err(InterfaceError::InvalidAccountDiscriminant)
        );
    }

    #[test]
    fn rejects_truncated_data() {
        let data = sample().to_account_data();
        assert_eq!(
            MemeCoin::try_from_account_data(&data[..data.len() - 3]),
            Err(InterfaceError::InvalidAccountData)
        );
        assert_eq!(
            MemeCoin::try_from_account_data(&data[..4]),
            Err(InterfaceError::InsufficientByteLength)
        );
    }
}
