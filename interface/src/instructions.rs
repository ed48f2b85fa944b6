//! Instruction tags, account orderings and Borsh-encoded argument payloads for the three program
//! instructions.

use borsh::{
    BorshDeserialize,
    BorshSerialize,
};

use crate::{
    discriminator::{
        instruction_discriminator,
        Discriminator,
        DISCRIMINATOR_LEN,
    },
    error::InterfaceError,
};

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    strum_macros::Display,
    strum_macros::EnumIter,
    strum_macros::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum MemeCoinInstruction {
    CreateMemeCoin,
    BuyTokens,
    SellTokens,
}

impl MemeCoinInstruction {
    pub fn name(&self) -> &'static str {
        (*self).into()
    }

    pub fn discriminator(&self) -> Discriminator {
        instruction_discriminator(self.name())
    }

    /// The account list in the order the program expects it.
    #[rustfmt::skip]
    pub fn account_names(&self) -> &'static [&'static str] {
        match self {
            MemeCoinInstruction::CreateMemeCoin => &[
                "meme_coin", "mint", "creator", "token_program", "system_program", "rent",
            ],
            MemeCoinInstruction::BuyTokens => &[
                "meme_coin", "mint", "buyer", "creator", "buyer_token_account", "token_program",
                "system_program",
            ],
            MemeCoinInstruction::SellTokens => &[
                "meme_coin", "mint", "seller", "creator", "seller_token_account", "token_program",
            ],
        }
    }

    /// Argument names in encoding order.
    pub fn arg_names(&self) -> &'static [&'static str] {
        match self {
            MemeCoinInstruction::CreateMemeCoin => &[
                "name",
                "symbol",
                "uri",
                "decimals",
                "initial_supply",
                "price_per_token",
            ],
            MemeCoinInstruction::BuyTokens | MemeCoinInstruction::SellTokens => &["amount"],
        }
    }

    pub fn from_data(data: &[u8]) -> Result<Self, InterfaceError> {
        if data.len() < DISCRIMINATOR_LEN {
            return Err(InterfaceError::InsufficientByteLength);
        }
        let tag = &data[..DISCRIMINATOR_LEN];
        <Self as strum::IntoEnumIterator>::iter()
            .find(|ix| ix.discriminator() == tag)
            .ok_or(InterfaceError::UnknownInstruction)
    }
}

/// Argument payloads. Packed data is the instruction discriminator followed by the Borsh encoding
/// of the implementing struct.
pub trait InstructionData: BorshSerialize + BorshDeserialize {
    const INSTRUCTION: MemeCoinInstruction;

    fn pack(&self) -> Vec<u8> {
        let mut data = Self::INSTRUCTION.discriminator().to_vec();
        borsh::to_writer(&mut data, self).expect("Writing to a Vec is infallible");
        data
    }

    fn unpack(data: &[u8]) -> Result<Self, InterfaceError> {
        if MemeCoinInstruction::from_data(data)? != Self::INSTRUCTION {
            return Err(InterfaceError::InvalidInstructionData);
        }
        Self::try_from_slice(&data[DISCRIMINATOR_LEN..])
            .map_err(|_| InterfaceError::InvalidInstructionData)
    }
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct CreateMemeCoinInstructionData {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub decimals: u8,
    pub initial_supply: u64,
    pub price_per_token: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct BuyTokensInstructionData {
    pub amount: u64,
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SellTokensInstructionData {
    pub amount: u64,
}

impl InstructionData for CreateMemeCoinInstructionData {
    const INSTRUCTION: MemeCoinInstruction = MemeCoinInstruction::CreateMemeCoin;
}

impl InstructionData for BuyTokensInstructionData {
    const INSTRUCTION: MemeCoinInstruction = MemeCoinInstruction::BuyTokens;
}

impl InstructionData for SellTokensInstructionData {
    const INSTRUCTION: MemeCoinInstruction = MemeCoinInstruction::SellTokens;
}
