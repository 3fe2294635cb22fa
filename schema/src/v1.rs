//! Structured-generation wire layouts.
//!
//! The current generation of record layouts: 32-byte identifiers are
//! fixed-width binary and the update authority is a true optional. Node
//! property and creator lists are stored as independently length-prefixed
//! nested documents (`NodeData`), which must be parsed as documents in their
//! own right; a malformed inner document fails the whole decode.

use {
    crate::{
        entity::{
            AccountKey, Asset, Creator, Edge, EntityKind, FreezeDelegate, Metadata, Node,
            Property, UpdateAuthority,
        },
        error::MismatchDetail,
    },
    borsh::{BorshDeserialize, BorshSerialize},
    solana_program::pubkey::Pubkey,
};

/// Parse a nested borsh document out of a length-prefixed blob, requiring
/// full consumption.
pub(crate) fn read_nested<T: BorshDeserialize>(
    bytes: &[u8],
    field: &'static str,
) -> Result<T, MismatchDetail> {
    let mut rest = bytes;
    let value = T::deserialize(&mut rest).map_err(|_| MismatchDetail::Field { field })?;
    if rest.is_empty() {
        Ok(value)
    } else {
        Err(MismatchDetail::Field { field })
    }
}

fn to_vec<T: BorshSerialize>(value: &T) -> Vec<u8> {
    // Writing borsh into a Vec cannot fail.
    borsh::to_vec(value).unwrap()
}

/// Node property and creator lists, each serialized as its own document.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub(crate) struct NodeData {
    pub properties_bytes: Vec<u8>,
    pub creators_bytes: Vec<u8>,
}

impl NodeData {
    pub(crate) fn pack(properties: &[Property], creators: &[Creator]) -> Self {
        Self {
            properties_bytes: to_vec(&properties),
            creators_bytes: to_vec(&creators),
        }
    }

    pub(crate) fn unpack(&self) -> Result<(Vec<Property>, Vec<Creator>), MismatchDetail> {
        let properties = read_nested(&self.properties_bytes, "node_data.properties")?;
        let creators = read_nested(&self.creators_bytes, "node_data.creators")?;
        Ok((properties, creators))
    }
}

/// Edge property list, serialized as its own document.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub(crate) struct EdgeData {
    pub properties_bytes: Vec<u8>,
}

impl EdgeData {
    pub(crate) fn pack(properties: &[Property]) -> Self {
        Self {
            properties_bytes: to_vec(&properties),
        }
    }

    pub(crate) fn unpack(&self) -> Result<Vec<Property>, MismatchDetail> {
        read_nested(&self.properties_bytes, "edge_data.properties")
    }
}

#[derive(BorshSerialize, BorshDeserialize)]
pub(crate) struct NodeV1 {
    pub key: EntityKind,
    pub owner: Pubkey,
    pub update_authority: UpdateAuthority,
    pub label: String,
    pub node_data: NodeData,
    pub is_mutable: bool,
    pub initialized_plugins: u16,
}

impl NodeV1 {
    pub(crate) fn from_node(node: &Node) -> Self {
        Self {
            key: EntityKind::Node,
            owner: node.owner,
            update_authority: node.update_authority,
            label: node.label.clone(),
            node_data: NodeData::pack(&node.properties, &node.creators),
            is_mutable: node.is_mutable,
            initialized_plugins: node.initialized_plugins,
        }
    }

    pub(crate) fn into_node(self) -> Result<Node, MismatchDetail> {
        let (properties, creators) = self.node_data.unpack()?;
        Ok(Node {
            owner: self.owner,
            update_authority: self.update_authority,
            label: self.label,
            properties,
            creators,
            is_mutable: self.is_mutable,
            initialized_plugins: self.initialized_plugins,
        })
    }
}

#[derive(BorshSerialize, BorshDeserialize)]
pub(crate) struct EdgeV1 {
    pub key: EntityKind,
    pub owner: Pubkey,
    pub update_authority: UpdateAuthority,
    pub source_node: Pubkey,
    pub target_node: Pubkey,
    pub edge_type: String,
    pub properties: Vec<Property>,
    pub is_mutable: bool,
    pub initialized_plugins: u16,
}

impl EdgeV1 {
    pub(crate) fn from_edge(edge: &Edge) -> Result<Self, &'static str> {
        // Mandatory slot in this layout; an absent value is unrepresentable.
        let edge_type = edge.edge_type.clone().ok_or("edge_type")?;
        Ok(Self {
            key: EntityKind::Edge,
            owner: edge.owner,
            update_authority: edge.update_authority,
            source_node: edge.source_node,
            target_node: edge.target_node,
            edge_type,
            properties: edge.properties.clone(),
            is_mutable: edge.is_mutable,
            initialized_plugins: edge.initialized_plugins,
        })
    }

    pub(crate) fn into_edge(self) -> Edge {
        Edge {
            owner: self.owner,
            update_authority: self.update_authority,
            source_node: self.source_node,
            target_node: self.target_node,
            edge_type: Some(self.edge_type),
            properties: self.properties,
            is_mutable: self.is_mutable,
            initialized_plugins: self.initialized_plugins,
        }
    }
}

#[derive(BorshSerialize, BorshDeserialize)]
pub(crate) struct AssetV1 {
    pub key: AccountKey,
    pub owner: Pubkey,
    pub update_authority_type: u8,
    pub update_authority: Pubkey,
    pub initialized_plugins: u16,
}

impl AssetV1 {
    pub(crate) fn from_asset(asset: &Asset) -> Self {
        Self {
            key: AccountKey::Asset,
            owner: asset.owner,
            update_authority_type: asset.update_authority_type,
            update_authority: asset.update_authority,
            initialized_plugins: asset.initialized_plugins,
        }
    }

    pub(crate) fn into_asset(self) -> Asset {
        Asset {
            owner: self.owner,
            update_authority_type: self.update_authority_type,
            update_authority: self.update_authority,
            initialized_plugins: self.initialized_plugins,
        }
    }
}

// Metadata records carry their key as a bare byte rather than the tagged
// enum; one of the substrate's historical quirks.
#[derive(BorshSerialize, BorshDeserialize)]
pub(crate) struct MetadataV1 {
    pub key: u8,
    pub metadata_uri_type: u8,
    pub uri: String,
    pub asset_id: Pubkey,
}

impl MetadataV1 {
    pub(crate) fn from_metadata(metadata: &Metadata) -> Self {
        Self {
            key: crate::registry::SchemaVariant::MetadataV1.tag(),
            metadata_uri_type: metadata.metadata_uri_type,
            uri: metadata.uri.clone(),
            asset_id: metadata.asset_id,
        }
    }

    pub(crate) fn into_metadata(self) -> Metadata {
        Metadata {
            metadata_uri_type: self.metadata_uri_type,
            uri: self.uri,
            asset_id: self.asset_id,
        }
    }
}

#[derive(BorshSerialize, BorshDeserialize)]
pub(crate) struct FreezeDelegateV1 {
    pub key: AccountKey,
    pub authority: Pubkey,
}

impl FreezeDelegateV1 {
    pub(crate) fn from_freeze_delegate(delegate: &FreezeDelegate) -> Self {
        Self {
            key: AccountKey::FreezeDelegate,
            authority: delegate.authority,
        }
    }

    pub(crate) fn into_freeze_delegate(self) -> FreezeDelegate {
        FreezeDelegate {
            authority: self.authority,
        }
    }
}
