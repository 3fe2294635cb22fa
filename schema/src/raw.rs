//! Raw-generation wire layouts.
//!
//! The earlier generation of `Node` and `Edge` records, reconstructed from
//! captured buffers. The update authority is flattened into a tag byte plus
//! an always-present 32-byte field, edge endpoints are base58 text rather
//! than binary keys, and edges carry no `edge_type` at all. Decoding
//! canonicalizes: authority tag `0` maps to `None` (the payload bytes are
//! padding), tag `1` to `Address`, anything else is rejected.

use {
    crate::{
        entity::{Edge, Node, UpdateAuthority},
        error::MismatchDetail,
        v1::{EdgeData, NodeData},
    },
    borsh::{BorshDeserialize, BorshSerialize},
    solana_program::pubkey::Pubkey,
};

fn flatten_authority(authority: &UpdateAuthority) -> (u8, [u8; 32]) {
    match authority {
        UpdateAuthority::None => (0, [0u8; 32]),
        UpdateAuthority::Address(address) => (1, address.to_bytes()),
    }
}

fn lift_authority(tag: u8, data: [u8; 32]) -> Result<UpdateAuthority, MismatchDetail> {
    match tag {
        0 => Ok(UpdateAuthority::None),
        1 => Ok(UpdateAuthority::Address(Pubkey::new_from_array(data))),
        _ => Err(MismatchDetail::Field {
            field: "update_authority",
        }),
    }
}

fn endpoint_text(address: &Pubkey) -> String {
    address.to_string()
}

fn endpoint_key(text: &str, field: &'static str) -> Result<Pubkey, MismatchDetail> {
    let mut bytes = [0u8; 32];
    let written = bs58::decode(text)
        .onto(&mut bytes[..])
        .map_err(|_| MismatchDetail::Field { field })?;
    if written != bytes.len() {
        return Err(MismatchDetail::Field { field });
    }
    Ok(Pubkey::new_from_array(bytes))
}

#[derive(BorshSerialize, BorshDeserialize)]
pub(crate) struct NodeRaw {
    pub key: u8,
    pub owner: Pubkey,
    pub update_authority_tag: u8,
    pub update_authority: [u8; 32],
    pub label: String,
    pub node_data: NodeData,
    pub is_mutable: bool,
    pub initialized_plugins: u16,
}

impl NodeRaw {
    pub(crate) fn from_node(node: &Node) -> Self {
        let (update_authority_tag, update_authority) = flatten_authority(&node.update_authority);
        Self {
            key: crate::registry::SchemaVariant::NodeRaw.tag(),
            owner: node.owner,
            update_authority_tag,
            update_authority,
            label: node.label.clone(),
            node_data: NodeData::pack(&node.properties, &node.creators),
            is_mutable: node.is_mutable,
            initialized_plugins: node.initialized_plugins,
        }
    }

    pub(crate) fn into_node(self) -> Result<Node, MismatchDetail> {
        let update_authority = lift_authority(self.update_authority_tag, self.update_authority)?;
        let (properties, creators) = self.node_data.unpack()?;
        Ok(Node {
            owner: self.owner,
            update_authority,
            label: self.label,
            properties,
            creators,
            is_mutable: self.is_mutable,
            initialized_plugins: self.initialized_plugins,
        })
    }
}

// Field order follows the captured buffers: the owner and authority trail
// the payload instead of leading it.
#[derive(BorshSerialize, BorshDeserialize)]
pub(crate) struct EdgeRaw {
    pub key: u8,
    pub source_node: String,
    pub target_node: String,
    pub edge_data: EdgeData,
    pub is_mutable: bool,
    pub owner: Pubkey,
    pub update_authority_tag: u8,
    pub update_authority: [u8; 32],
    pub initialized_plugins: u16,
}

impl EdgeRaw {
    pub(crate) fn from_edge(edge: &Edge) -> Result<Self, &'static str> {
        if edge.edge_type.is_some() {
            // This layout has no slot for it.
            return Err("edge_type");
        }
        let (update_authority_tag, update_authority) = flatten_authority(&edge.update_authority);
        Ok(Self {
            key: crate::registry::SchemaVariant::EdgeRaw.tag(),
            source_node: endpoint_text(&edge.source_node),
            target_node: endpoint_text(&edge.target_node),
            edge_data: EdgeData::pack(&edge.properties),
            is_mutable: edge.is_mutable,
            owner: edge.owner,
            update_authority_tag,
            update_authority,
            initialized_plugins: edge.initialized_plugins,
        })
    }

    pub(crate) fn into_edge(self) -> Result<Edge, MismatchDetail> {
        let source_node = endpoint_key(&self.source_node, "source_node")?;
        let target_node = endpoint_key(&self.target_node, "target_node")?;
        let update_authority = lift_authority(self.update_authority_tag, self.update_authority)?;
        let properties = self.edge_data.unpack()?;
        Ok(Edge {
            owner: self.owner,
            update_authority,
            source_node,
            target_node,
            edge_type: None,
            properties,
            is_mutable: self.is_mutable,
            initialized_plugins: self.initialized_plugins,
        })
    }
}
