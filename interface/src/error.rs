//! Interface error type and conversion helpers to represent them as error message strings.

#[derive(Clone, Copy, Debug, Eq, PartialEq, strum_macros::FromRepr)]
#[repr(u8)]
pub enum InterfaceError {
    AddressDerivationFailed,
    SeedTooLong,
    InsufficientByteLength,
    InvalidAccountDiscriminant,
    InvalidAccountData,
    InvalidInstructionData,
    UnknownInstruction,
    IdlMismatch,
}

impl From<InterfaceError> for &'static str {
    fn from(value: InterfaceError) -> Self {
        match value {
            InterfaceError::AddressDerivationFailed => "No valid program address exists for the seeds",
            InterfaceError::SeedTooLong => "Seed exceeds the maximum seed length",
            InterfaceError::InsufficientByteLength => "Not enough bytes passed",
            InterfaceError::InvalidAccountDiscriminant => "Invalid account discriminant",
            InterfaceError::InvalidAccountData => "Account data doesn't match the record schema",
            InterfaceError::InvalidInstructionData => "Invalid instruction data",
            InterfaceError::UnknownInstruction => "Unknown instruction discriminator",
            InterfaceError::IdlMismatch => "Bundled IDL doesn't match the client interface",
        }
    }
}

impl core::fmt::Display for InterfaceError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str((*self).into())
    }
}

impl std::error::Error for InterfaceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_repr_round_trips_every_variant() {
        let mut tag = 0u8;
        while let Some(error) = InterfaceError::from_repr(tag) {
            assert_eq!(error as u8, tag);
            assert!(!<&'static str>::from(error).is_empty());
            tag += 1;
        }
        assert_eq!(tag, InterfaceError::IdlMismatch as u8 + 1);
    }
}
