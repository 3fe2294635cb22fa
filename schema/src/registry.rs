//! The schema registry: a closed set of record layouts and the encode and
//! decode operations over them.
//!
//! Decode never guesses. The caller either names the exact layout or hands
//! [`decode_any`] an ordered candidate list; the first layout the bytes
//! fully satisfy wins and is surfaced in the result. Bytes that satisfy no
//! candidate are an error, not a best-effort value.

use {
    crate::{
        entity::Entity,
        error::{MismatchDetail, SchemaError},
        raw, v1,
    },
    borsh::{BorshDeserialize, BorshSerialize},
};

/// One historical byte layout for one entity kind.
///
/// `NodeV1`/`NodeRaw` and `EdgeV1`/`EdgeRaw` share their leading tag byte
/// within the graph generation (`0` and `1`), and the collectible space
/// reuses byte `1` for `AssetV1`. Selecting the variant is what
/// disambiguates; the tag byte alone never can.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchemaVariant {
    NodeV1,
    NodeRaw,
    EdgeV1,
    EdgeRaw,
    AssetV1,
    MetadataV1,
    FreezeDelegateV1,
}

impl SchemaVariant {
    /// The leading discriminant byte this layout declares.
    pub const fn tag(self) -> u8 {
        match self {
            Self::NodeV1 | Self::NodeRaw => 0,
            Self::EdgeV1 | Self::EdgeRaw => 1,
            Self::AssetV1 => 1,
            Self::MetadataV1 => 2,
            Self::FreezeDelegateV1 => 4,
        }
    }
}

/// A decode result that remembers which layout matched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoded {
    pub variant: SchemaVariant,
    pub entity: Entity,
}

fn to_bytes<T: BorshSerialize>(wire: &T) -> Vec<u8> {
    // Writing borsh into a Vec cannot fail.
    borsh::to_vec(wire).unwrap()
}

/// Deserialize requiring full consumption of `bytes`.
fn read<T: BorshDeserialize>(variant: SchemaVariant, bytes: &[u8]) -> Result<T, SchemaError> {
    let mut rest = bytes;
    let value = T::deserialize(&mut rest).map_err(|_| SchemaError::Mismatch {
        variant,
        detail: MismatchDetail::Layout,
    })?;
    if rest.is_empty() {
        Ok(value)
    } else {
        Err(SchemaError::Mismatch {
            variant,
            detail: MismatchDetail::TrailingBytes { extra: rest.len() },
        })
    }
}

/// Encode an entity into the exact byte layout of `variant`.
///
/// Deterministic byte-for-byte; nested containers are length-prefixed. Fails
/// with [`SchemaError::Unencodable`] when the value has no faithful
/// representation in the layout.
pub fn encode(variant: SchemaVariant, entity: &Entity) -> Result<Vec<u8>, SchemaError> {
    match (variant, entity) {
        (SchemaVariant::NodeV1, Entity::Node(node)) => Ok(to_bytes(&v1::NodeV1::from_node(node))),
        (SchemaVariant::NodeRaw, Entity::Node(node)) => {
            Ok(to_bytes(&raw::NodeRaw::from_node(node)))
        }
        (SchemaVariant::EdgeV1, Entity::Edge(edge)) => v1::EdgeV1::from_edge(edge)
            .map(|wire| to_bytes(&wire))
            .map_err(|field| SchemaError::Unencodable { variant, field }),
        (SchemaVariant::EdgeRaw, Entity::Edge(edge)) => raw::EdgeRaw::from_edge(edge)
            .map(|wire| to_bytes(&wire))
            .map_err(|field| SchemaError::Unencodable { variant, field }),
        (SchemaVariant::AssetV1, Entity::Asset(asset)) => {
            Ok(to_bytes(&v1::AssetV1::from_asset(asset)))
        }
        (SchemaVariant::MetadataV1, Entity::Metadata(metadata)) => {
            Ok(to_bytes(&v1::MetadataV1::from_metadata(metadata)))
        }
        (SchemaVariant::FreezeDelegateV1, Entity::FreezeDelegate(delegate)) => {
            Ok(to_bytes(&v1::FreezeDelegateV1::from_freeze_delegate(delegate)))
        }
        _ => Err(SchemaError::Unencodable {
            variant,
            field: "entity",
        }),
    }
}

/// Decode `bytes` against exactly one layout.
///
/// Fails closed with [`SchemaError::Mismatch`] when the leading byte is not
/// the layout's tag, when the bytes are short or malformed for the layout,
/// or when bytes remain after the layout is consumed.
pub fn decode(variant: SchemaVariant, bytes: &[u8]) -> Result<Entity, SchemaError> {
    let found = bytes.first().copied();
    if found != Some(variant.tag()) {
        return Err(SchemaError::Mismatch {
            variant,
            detail: MismatchDetail::Discriminant {
                expected: variant.tag(),
                found,
            },
        });
    }
    let lift = |detail| SchemaError::Mismatch { variant, detail };
    match variant {
        SchemaVariant::NodeV1 => read::<v1::NodeV1>(variant, bytes)?
            .into_node()
            .map(Entity::Node)
            .map_err(lift),
        SchemaVariant::NodeRaw => read::<raw::NodeRaw>(variant, bytes)?
            .into_node()
            .map(Entity::Node)
            .map_err(lift),
        SchemaVariant::EdgeV1 => {
            Ok(Entity::Edge(read::<v1::EdgeV1>(variant, bytes)?.into_edge()))
        }
        SchemaVariant::EdgeRaw => read::<raw::EdgeRaw>(variant, bytes)?
            .into_edge()
            .map(Entity::Edge)
            .map_err(lift),
        SchemaVariant::AssetV1 => {
            Ok(Entity::Asset(read::<v1::AssetV1>(variant, bytes)?.into_asset()))
        }
        SchemaVariant::MetadataV1 => Ok(Entity::Metadata(
            read::<v1::MetadataV1>(variant, bytes)?.into_metadata(),
        )),
        SchemaVariant::FreezeDelegateV1 => Ok(Entity::FreezeDelegate(
            read::<v1::FreezeDelegateV1>(variant, bytes)?.into_freeze_delegate(),
        )),
    }
}

/// Decode `bytes` against an ordered candidate list, stopping at the first
/// layout the bytes fully satisfy.
///
/// The candidate order is the caller's priority statement; a mismatch on one
/// candidate moves to the next and is never reported as a match.
pub fn decode_any(candidates: &[SchemaVariant], bytes: &[u8]) -> Result<Decoded, SchemaError> {
    for &variant in candidates {
        match decode(variant, bytes) {
            Ok(entity) => return Ok(Decoded { variant, entity }),
            Err(SchemaError::Mismatch { .. }) => continue,
            Err(other) => return Err(other),
        }
    }
    Err(SchemaError::NoMatchingVariant {
        candidates: candidates.to_vec(),
    })
}
