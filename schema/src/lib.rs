//! Record layouts for Weave compressed graph state.
//!
//! Graph entities are not materialized accounts. Each one lives as a leaf in
//! a sparse Merkle state tree, and what the ledger hands back is an opaque
//! byte blob that must be interpreted against one of a closed set of
//! historical layouts. Two incompatible generations of the `Node` and `Edge`
//! layouts exist side by side on chain:
//!
//! * a *structured* generation, where 32-byte identifiers are fixed-width
//!   binary and the update authority is a real optional, and
//! * a *raw* generation, where the update authority is a flattened tag plus
//!   an always-present 32-byte field and edge endpoints are base58 text.
//!
//! Callers always pick the layout explicitly (or supply an ordered candidate
//! list); nothing in this crate guesses a layout from the bytes. Decoding a
//! record against the wrong layout returns [`error::SchemaError::Mismatch`],
//! never a silently coerced value.
//!
//! The wire format throughout is borsh: little-endian integers, `u32`
//! length-prefixed strings and sequences, fixed arrays as raw bytes, enums
//! as a one-byte tag followed by the variant payload.

pub mod args;
pub mod entity;
pub mod error;
pub mod registry;

mod raw;
mod v1;
