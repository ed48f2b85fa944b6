//! The bundled interface description document and a check that it agrees with the instruction
//! and record layouts in this crate.
//!
//! The IDL uses camelCase names; discriminators and this crate use snake_case.

use serde::Deserialize;
use strum::IntoEnumIterator;

use crate::{
    error::InterfaceError,
    instructions::MemeCoinInstruction,
    program,
    record::{
        MEME_COIN_ACCOUNT_NAME,
        MEME_COIN_FIELDS,
    },
};

pub const BUNDLED_IDL: &str = include_str!("../idl/meme_coin_program.json");

#[derive(Debug, Deserialize)]
pub struct Idl {
    pub version: String,
    pub name: String,
    pub instructions: Vec<IdlInstruction>,
    pub accounts: Vec<IdlAccountDef>,
    pub metadata: Option<IdlMetadata>,
}

#[derive(Debug, Deserialize)]
pub struct IdlInstruction {
    pub name: String,
    pub accounts: Vec<IdlAccountItem>,
    pub args: Vec<IdlField>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdlAccountItem {
    pub name: String,
    pub is_mut: bool,
    pub is_signer: bool,
}

#[derive(Debug, Deserialize)]
pub struct IdlField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct IdlAccountDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: IdlTypeDef,
}

#[derive(Debug, Deserialize)]
pub struct IdlTypeDef {
    pub kind: String,
    pub fields: Vec<IdlField>,
}

#[derive(Debug, Deserialize)]
pub struct IdlMetadata {
    pub address: String,
}

impl Idl {
    pub fn bundled() -> Result<Self, InterfaceError> {
        serde_json::from_str(BUNDLED_IDL).map_err(|_| InterfaceError::IdlMismatch)
    }

    pub fn instruction(&self, ix: MemeCoinInstruction) -> Option<&IdlInstruction> {
        self.instructions
            .iter()
            .find(|idl_ix| to_snake_case(&idl_ix.name) == ix.name())
    }

    /// Verifies the program address, every instruction's account order and argument list, and
    /// the record field layout.
    pub fn check_compatibility(&self) -> Result<(), InterfaceError> {
        if let Some(metadata) = &self.metadata {
            if metadata.address != program::ID.to_string() {
                return Err(InterfaceError::IdlMismatch);
            }
        }

        for ix in MemeCoinInstruction::iter() {
            let idl_ix = self.instruction(ix).ok_or(InterfaceError::IdlMismatch)?;
            let accounts = idl_ix.accounts.iter().map(|a| a.name.as_str());
            let args = idl_ix.args.iter().map(|a| a.name.as_str());
            if !same_names(accounts, ix.account_names()) || !same_names(args, ix.arg_names()) {
                return Err(InterfaceError::IdlMismatch);
            }
        }

        let record = self
            .accounts
            .iter()
            .find(|def| def.name == MEME_COIN_ACCOUNT_NAME)
            .ok_or(InterfaceError::IdlMismatch)?;
        let fields = record.ty.fields.iter().map(|f| f.name.as_str());
        if record.ty.kind != "struct" || !same_names(fields, &MEME_COIN_FIELDS) {
            return Err(InterfaceError::IdlMismatch);
        }

        Ok(())
    }
}

fn same_names<'a>(idl_names: impl ExactSizeIterator<Item = &'a str>, expected: &[&str]) -> bool {
    idl_names.len() == expected.len()
        && idl_names
            .zip(expected)
            .all(|(idl, expected)| to_snake_case(idl) == *expected)
}

fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if !out.is_empty() {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_idl_matches_interface() {
        let idl = Idl::bundled().unwrap();
        assert_eq!(idl.name, "meme_coin_program");
        assert_eq!(idl.instructions.len(), 3);
        idl.check_compatibility().unwrap();
    }

    #[test]
    fn signer_flags() {
        let idl = Idl::bundled().unwrap();
        let create = idl.instruction(MemeCoinInstruction::CreateMemeCoin).unwrap();
        let signers: Vec<_> = create
            .accounts
            .iter()
            .filter(|a| a.is_signer)
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(signers, ["mint", "creator"]);
    }

    #[test]
    fn reordered_accounts_are_a_mismatch() {
        let mut idl = Idl::bundled().unwrap();
        idl.instructions[1].accounts.swap(0, 1);
        assert_eq!(idl.check_compatibility(), Err(InterfaceError::IdlMismatch));
    }

    #[test]
    fn snake_case_conversion() {
        assert_eq!(to_snake_case("buyerTokenAccount"), "buyer_token_account");
        assert_eq!(to_snake_case("MemeCoin"), "meme_coin");
        assert_eq!(to_snake_case("rent"), "rent");
    }
}
