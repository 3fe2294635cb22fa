//! Validity proof types shared between the proof client and the mutation
//! assembler.

use {
    borsh::{BorshDeserialize, BorshSerialize},
    solana_sdk::pubkey::Pubkey,
};

/// A target address paired with the tree and queue it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressWithTree {
    pub address: Pubkey,
    pub tree: Pubkey,
    pub queue: Pubkey,
}

/// The succinct proof as the remote program consumes it.
///
/// Opaque to this client: the bytes come from the prover and are forwarded
/// into instruction data unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct CompressedProof {
    pub a: [u8; 32],
    pub b: [u8; 64],
    pub c: [u8; 32],
}

impl Default for CompressedProof {
    fn default() -> Self {
        Self {
            a: [0; 32],
            b: [0; 64],
            c: [0; 32],
        }
    }
}

/// Per-address anchoring data returned alongside a proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofContext {
    /// Index of the tree root the proof is anchored to. Valid only for as
    /// long as the tree's root history retains that root.
    pub root_index: u16,
    /// The address tree the prover resolved for this address.
    pub merkle_tree: Pubkey,
    /// The address queue the prover resolved for this address.
    pub queue: Pubkey,
}

/// A validity proof plus one [`ProofContext`] per requested address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidityProofBundle {
    pub proof: CompressedProof,
    pub contexts: Vec<ProofContext>,
}
