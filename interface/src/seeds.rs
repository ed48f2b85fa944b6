//! Seeds and derivation helpers for the program's PDAs.

use solana_address::Address;

use crate::{
    error::InterfaceError,
    program,
};

/// Namespace tag for meme coin record PDAs.
pub const MEME_COIN_SEED: &[u8] = b"meme_coin";

/// The runtime rejects any single seed longer than this.
pub const MAX_SEED_LEN: usize = 32;

/// The canonical form of a record name. Leading and trailing whitespace is dropped; everything in
/// between is kept as typed.
pub fn normalize_name(name: &str) -> &str {
    name.trim()
}

/// Derives the record address for `name` under the deployed program id.
pub fn find_record_address(name: &str) -> Result<(Address, u8), InterfaceError> {
    derive_address(&program::ID, MEME_COIN_SEED, name)
}

/// Derives `(address, bump)` from `[tag, normalize_name(name)]` and `program_id`.
///
/// Fails rather than truncating when the name is longer than [`MAX_SEED_LEN`] bytes or when no
/// bump in `255..=0` yields an off-curve address.
pub fn derive_address(
    program_id: &Address,
    tag: &[u8],
    name: &str,
) -> Result<(Address, u8), InterfaceError> {
    let name = normalize_name(name);
    if name.len() > MAX_SEED_LEN || tag.len() > MAX_SEED_LEN {
        return Err(InterfaceError::SeedTooLong);
    }

    Address::try_find_program_address(&[tag, name.as_bytes()], program_id)
        .ok_or(InterfaceError::AddressDerivationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let first = find_record_address("Doge").unwrap();
        for _ in 0..4 {
            assert_eq!(find_record_address("Doge").unwrap(), first);
        }
    }

    #[test]
    fn distinct_names_derive_distinct_addresses() {
        let names = ["Doge", "doge", "Doge2", "Dog", "Do ge", "Pepe"];
        let addresses: Vec<_> = names
            .iter()
            .map(|name| find_record_address(name).unwrap().0)
            .collect();
        for (i, a) in addresses.iter().enumerate() {
            for b in addresses.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn outer_whitespace_is_normalized() {
        assert_eq!(
            find_record_address("  Doge\t").unwrap(),
            find_record_address("Doge").unwrap()
        );
    }

    #[test]
    fn program_id_is_part_of_the_derivation() {
        let other_program = Address::new_from_array([7; 32]);
        let (a, _) = derive_address(&program::ID, MEME_COIN_SEED, "Doge").unwrap();
        let (b, _) = derive_address(&other_program, MEME_COIN_SEED, "Doge").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn overlong_name_fails() {
        let name = "x".repeat(MAX_SEED_LEN + 1);
        assert_eq!(
            find_record_address(&name),
            Err(InterfaceError::SeedTooLong)
        );
        assert!(find_record_address(&"x".repeat(MAX_SEED_LEN)).is_ok());
    }
}
