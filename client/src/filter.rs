//! Byte-offset equality filters over opaque record blobs.
//!
//! The same filter is both the wire form sent to the indexer and a local
//! predicate, so callers can re-check service results instead of trusting
//! them.

use {solana_sdk::pubkey::Pubkey, weave_schema::entity::EntityKind};

/// Match records whose bytes at `offset` equal `bytes` exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemcmpFilter {
    pub offset: usize,
    pub bytes: Vec<u8>,
}

impl MemcmpFilter {
    pub fn new(offset: usize, bytes: Vec<u8>) -> Self {
        Self { offset, bytes }
    }

    /// Filter on the leading kind tag of the graph generation.
    pub fn entity_kind(kind: EntityKind) -> Self {
        Self::new(0, vec![kind.tag()])
    }

    /// Filter on the owner field of structured-generation records, which
    /// sits directly after the tag byte. Raw-generation edges store their
    /// owner elsewhere and are not matched by this filter.
    pub fn owner(owner: &Pubkey) -> Self {
        Self::new(1, owner.to_bytes().to_vec())
    }

    /// Whether `data` matches. Records shorter than `offset + bytes` never
    /// match.
    pub fn matches(&self, data: &[u8]) -> bool {
        data.get(self.offset..self.offset + self.bytes.len())
            .is_some_and(|window| window == self.bytes)
    }
}
