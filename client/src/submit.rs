//! The submission seam and rejection classification.
//!
//! Signing, fee configuration, and transport belong to the caller, so the
//! client only hands a finished instruction to a [`TransitionSubmitter`] and
//! interprets what comes back. Classification works off the remote
//! diagnostic logs and keeps them attached: a caller must always be able to
//! tell "my proof was stale" from "my payload was invalid" from "the remote
//! business rule said no".

use {
    crate::error::ClientError,
    async_trait::async_trait,
    solana_sdk::{instruction::Instruction, pubkey::Pubkey, signature::Signature},
};

/// A structured rejection from the ledger: the transport-level message plus
/// the remote program's log trail.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rejection {
    pub message: String,
    pub logs: Vec<String>,
}

/// Submits an assembled state transition to the ledger.
///
/// Implementations wrap the instruction in a transaction, attach fees and
/// signatures, and send it. They must return [`Rejection`] with the remote
/// logs on failure rather than erasing them.
#[async_trait]
pub trait TransitionSubmitter {
    async fn submit_transition(&self, instruction: Instruction)
        -> Result<Signature, Rejection>;
}

const STALE_PROOF_MARKERS: &[&str] = &["proofverificationfailed", "invalid root", "stale root"];
const COLLISION_MARKERS: &[&str] = &["alreadyexists", "address already"];

/// Map a remote rejection into the error taxonomy.
///
/// `address` is the derived address the transition targeted, attached to
/// collision errors for the caller's benefit.
pub fn classify_rejection(address: &Pubkey, rejection: Rejection) -> ClientError {
    let haystack = rejection
        .logs
        .iter()
        .chain(std::iter::once(&rejection.message))
        .map(|line| line.to_lowercase())
        .collect::<Vec<_>>();
    let mentions = |markers: &[&str]| {
        haystack
            .iter()
            .any(|line| markers.iter().any(|marker| line.contains(marker)))
    };

    if mentions(COLLISION_MARKERS) {
        log::warn!("transition rejected: address {address} already occupied");
        ClientError::AddressCollision {
            address: *address,
            logs: rejection.logs,
        }
    } else if mentions(STALE_PROOF_MARKERS) {
        log::debug!("transition rejected: stale proof root");
        ClientError::StaleProof {
            logs: rejection.logs,
        }
    } else {
        log::warn!("transition rejected by remote program: {}", rejection.message);
        ClientError::RemoteValidationFailure {
            message: rejection.message,
            logs: rejection.logs,
        }
    }
}
