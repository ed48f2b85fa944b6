//! The submission pipeline: blockhash, wallet signature, relay, and confirmation polling, driven
//! through an explicit state machine.
//!
//! ```text
//! Idle -> Building -> AwaitingSignature -> Submitted -> Confirming -> Confirmed
//!            |               |                 |            |
//!            +---------------+-----------------+------------+------> Failed
//! ```

use std::time::Duration;

use colored::Colorize;
use solana_address::Address;
use solana_instruction::Instruction;
use solana_keypair::Keypair;
use solana_sdk::{
    message::Message,
    signature::Signature,
    transaction::Transaction,
};

use crate::{
    builder::PreparedTransaction,
    error::{
        ClientError,
        ClientResult,
    },
    transactions::LedgerRpc,
    wallet::WalletCapability,
    print_kv,
    LogColor,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Building,
    AwaitingSignature,
    Submitted { signature: Signature },
    Confirming { signature: Signature },
    Confirmed { signature: Signature },
    Failed { error: ClientError },
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Invalid submission transition from {from} to {to}")]
pub struct InvalidTransition {
    pub from: &'static str,
    pub to: &'static str,
}

impl SubmissionState {
    pub fn name(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "Idle",
            SubmissionState::Building => "Building",
            SubmissionState::AwaitingSignature => "AwaitingSignature",
            SubmissionState::Submitted { .. } => "Submitted",
            SubmissionState::Confirming { .. } => "Confirming",
            SubmissionState::Confirmed { .. } => "Confirmed",
            SubmissionState::Failed { .. } => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SubmissionState::Confirmed { .. } | SubmissionState::Failed { .. }
        )
    }

    /// Moves to `next` if the edge exists. Terminal states only lead back to `Idle`.
    pub fn advance(self, next: SubmissionState) -> Result<SubmissionState, InvalidTransition> {
        use SubmissionState::*;

        let allowed = match (&self, &next) {
            (Idle, Building) => true,
            (Building, AwaitingSignature) => true,
            (AwaitingSignature, Submitted { .. }) => true,
            (Submitted { signature: a }, Confirming { signature: b }) => a == b,
            (Confirming { signature: a }, Confirmed { signature: b }) => a == b,
            (Building | AwaitingSignature | Submitted { .. } | Confirming { .. }, Failed { .. }) => {
                true
            }
            (Confirmed { .. } | Failed { .. }, Idle) => true,
            _ => false,
        };

        match allowed {
            true => Ok(next),
            false => Err(InvalidTransition {
                from: self.name(),
                to: next.name(),
            }),
        }
    }
}

/// Tracks one submission's state and reports every transition to an observer.
pub struct Submission<F: FnMut(&SubmissionState)> {
    state: SubmissionState,
    on_transition: F,
}

impl<F: FnMut(&SubmissionState)> Submission<F> {
    pub fn new(on_transition: F) -> Self {
        Self {
            state: SubmissionState::Idle,
            on_transition,
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Enters `Building`, passing through `Idle` when the previous cycle finished. Preflight
    /// checks run between this and [`Submission::run`].
    pub fn begin(&mut self) {
        if self.state.is_terminal() {
            self.transition(SubmissionState::Idle);
        }
        self.transition(SubmissionState::Building);
    }

    /// Ends the current cycle with `error`, e.g. when a preflight check fails during `Building`.
    pub fn fail(&mut self, error: ClientError) {
        self.transition(SubmissionState::Failed { error });
    }

    /// Runs one full `Building -> Confirmed | Failed` cycle, entering `Building` first unless a
    /// preflight already did. `extra_signers` sign before the wallet.
    pub async fn run(
        &mut self,
        rpc: &impl LedgerRpc,
        wallet: &impl WalletCapability,
        instructions: &[Instruction],
        extra_signers: &[&Keypair],
    ) -> ClientResult<Signature> {
        if self.state != SubmissionState::Building {
            self.begin();
        }

        let result = self.drive(rpc, wallet, instructions, extra_signers).await;
        match &result {
            Ok(signature) => self.transition(SubmissionState::Confirmed {
                signature: *signature,
            }),
            Err(error) => self.fail(error.clone()),
        }

        result
    }

    /// Runs `prepared.prerequisite` to confirmation first when present, then the main
    /// instructions. A failed prerequisite ends the submission.
    pub async fn submit(
        &mut self,
        rpc: &impl LedgerRpc,
        wallet: &impl WalletCapability,
        prepared: &PreparedTransaction,
    ) -> ClientResult<Signature> {
        if let Some(prerequisite) = &prepared.prerequisite {
            self.run(rpc, wallet, prerequisite, &[]).await?;
        }

        self.run(
            rpc,
            wallet,
            &prepared.instructions,
            &prepared.extra_signer_refs(),
        )
        .await
    }

    async fn drive(
        &mut self,
        rpc: &impl LedgerRpc,
        wallet: &impl WalletCapability,
        instructions: &[Instruction],
        extra_signers: &[&Keypair],
    ) -> ClientResult<Signature> {
        let payer = wallet.pubkey()?;
        let transaction = build_transaction(rpc, &payer, instructions, extra_signers).await?;

        self.transition(SubmissionState::AwaitingSignature);
        let signed = wallet.sign_transaction(transaction).await?;
        if !signed.is_signed() {
            return Err(ClientError::Wallet(
                "The wallet returned a transaction with missing signatures".into(),
            ));
        }

        let signature = rpc.send_transaction(&signed).await?;
        if rpc.send_config().debug_logs {
            print_kv!("Submitted", signature, LogColor::Debug);
        }
        self.transition(SubmissionState::Submitted { signature });

        self.transition(SubmissionState::Confirming { signature });
        confirm(rpc, &signature).await?;

        Ok(signature)
    }

    fn transition(&mut self, next: SubmissionState) {
        // Every call site follows an edge in `advance`.
        self.state = self
            .state
            .clone()
            .advance(next)
            .expect("Should be a valid submission transition");
        (self.on_transition)(&self.state);
    }
}

async fn build_transaction(
    rpc: &impl LedgerRpc,
    payer: &Address,
    instructions: &[Instruction],
    extra_signers: &[&Keypair],
) -> ClientResult<Transaction> {
    let blockhash = rpc.get_latest_blockhash().await?;
    let mut message = Message::new(instructions, Some(payer));
    message.recent_blockhash = blockhash;

    let mut transaction = Transaction::new_unsigned(message);
    if !extra_signers.is_empty() {
        transaction
            .try_partial_sign(extra_signers, blockhash)
            .map_err(|e| ClientError::Validation(format!("Couldn't sign transaction: {e}")))?;
    }

    Ok(transaction)
}

async fn confirm(rpc: &impl LedgerRpc, signature: &Signature) -> ClientResult<()> {
    let config = rpc.send_config();
    for _ in 0..config.max_polls {
        match rpc.get_signature_status(signature).await? {
            Some(Ok(())) => return Ok(()),
            Some(Err(error)) => return Err(ClientError::OnChainExecution(error.to_string())),
            None => tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)).await,
        }
    }

    Err(ClientError::Network(format!(
        "Transaction {signature} wasn't confirmed after {} status checks",
        config.max_polls
    )))
}
