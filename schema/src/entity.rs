//! Canonical, fully-typed graph entities.
//!
//! These are the values the rest of the client works with. The historical
//! byte layouts in this crate all decode into (and encode from) the types
//! here, so downstream code never touches layout differences directly.

use {
    borsh::{BorshDeserialize, BorshSerialize},
    solana_program::pubkey::Pubkey,
};

/// One-byte kind tags of the graph record generation.
///
/// Borsh serializes these as the bare declaration-order tag: `Node` is `0`,
/// `Edge` is `1`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum EntityKind {
    #[default]
    Node,
    Edge,
}

impl EntityKind {
    /// The leading discriminant byte of records in this kind space.
    pub const fn tag(self) -> u8 {
        self as u8
    }
}

/// One-byte kind tags of the collectible record generation.
///
/// This is a *different* tag space from [`EntityKind`]: byte `1` means
/// `Asset` here and `Edge` there. Records from the two spaces can only be
/// told apart by which schema variant the caller selects, which is why
/// decoding is explicit-variant and fail-closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum AccountKey {
    Uninitialized(u16),
    Asset,
    Metadata,
    TransferDelegate,
    FreezeDelegate,
    Node,
    Edge,
}

/// A key/value pair attached to a node or edge.
///
/// Property lists are order-preserving and not deduplicated.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Property {
    pub key: String,
    pub value: String,
}

/// A creator entry on a node. Shares are expected to sum to 100 across a
/// node's creator list; the remote program enforces that, not this crate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Creator {
    pub address: Pubkey,
    pub verified: bool,
    pub share: u8,
}

/// Authority allowed to mutate an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum UpdateAuthority {
    #[default]
    None,
    Address(Pubkey),
}

/// A graph node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Node {
    pub owner: Pubkey,
    pub update_authority: UpdateAuthority,
    pub label: String,
    pub properties: Vec<Property>,
    pub creators: Vec<Creator>,
    pub is_mutable: bool,
    pub initialized_plugins: u16,
}

/// A directed graph edge between two node addresses.
///
/// `edge_type` exists only in layouts that carry it; encoding an edge into a
/// layout that cannot represent its `edge_type` is an error, never silent
/// loss.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Edge {
    pub owner: Pubkey,
    pub update_authority: UpdateAuthority,
    pub source_node: Pubkey,
    pub target_node: Pubkey,
    pub edge_type: Option<String>,
    pub properties: Vec<Property>,
    pub is_mutable: bool,
    pub initialized_plugins: u16,
}

/// A collectible asset record (non-graph variant of the same substrate).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Asset {
    pub owner: Pubkey,
    pub update_authority_type: u8,
    pub update_authority: Pubkey,
    pub initialized_plugins: u16,
}

/// Off-entity metadata for a collectible asset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    pub metadata_uri_type: u8,
    pub uri: String,
    pub asset_id: Pubkey,
}

/// A freeze delegate record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FreezeDelegate {
    pub authority: Pubkey,
}

/// Any decoded compressed record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entity {
    Node(Node),
    Edge(Edge),
    Asset(Asset),
    Metadata(Metadata),
    FreezeDelegate(FreezeDelegate),
}

impl Entity {
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Entity::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_edge(&self) -> Option<&Edge> {
        match self {
            Entity::Edge(edge) => Some(edge),
            _ => None,
        }
    }

    pub fn as_asset(&self) -> Option<&Asset> {
        match self {
            Entity::Asset(asset) => Some(asset),
            _ => None,
        }
    }
}
