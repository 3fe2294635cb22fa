//! Instruction argument payloads for entity creation.
//!
//! These are borsh-encoded exactly as declared and travel inside the create
//! instruction's data, after the proof, root index, and randomness.

use {
    crate::entity::{Creator, Property},
    borsh::{BorshDeserialize, BorshSerialize},
    solana_program::pubkey::Pubkey,
};

/// Arguments for creating a node.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct NodeArgs {
    /// The label of the node.
    pub label: String,
    pub properties: Vec<Property>,
    /// Whether the created node may be mutated later. Defaults closed.
    pub is_mutable: bool,
    pub creators: Vec<Creator>,
}

/// Arguments for creating an edge.
///
/// Endpoints are the 32-byte derived addresses of existing node leaves. The
/// remote program rejects self-referencing edges; this crate does not.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct EdgeArgs {
    pub source_node: Pubkey,
    pub target_node: Pubkey,
    pub edge_type: String,
    pub properties: Vec<Property>,
    pub is_mutable: bool,
}
