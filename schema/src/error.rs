//! Decode and encode errors for the schema registry.

use {crate::registry::SchemaVariant, thiserror::Error};

/// Why a record's bytes do not fit a schema variant.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MismatchDetail {
    /// The leading discriminant byte is not the one the variant declares.
    #[error("leading byte is {found:?}, variant declares {expected}")]
    Discriminant { expected: u8, found: Option<u8> },
    /// The bytes are short or otherwise malformed relative to the declared
    /// layout.
    #[error("bytes do not parse as the declared layout")]
    Layout,
    /// The declared layout was consumed but bytes remain.
    #[error("{extra} trailing bytes after the declared layout")]
    TrailingBytes { extra: usize },
    /// A field parsed structurally but holds an uninterpretable value, such
    /// as an unknown authority tag or endpoint text that is not a 32-byte
    /// base58 key.
    #[error("field `{field}` holds an uninterpretable value")]
    Field { field: &'static str },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// The bytes do not match the selected schema variant. Recoverable by
    /// trying the next candidate variant; never by accepting the value.
    #[error("record does not match schema variant {variant:?}: {detail}")]
    Mismatch {
        variant: SchemaVariant,
        detail: MismatchDetail,
    },
    /// Ordered trial decode exhausted every candidate.
    #[error("record matches none of the candidate schema variants {candidates:?}")]
    NoMatchingVariant { candidates: Vec<SchemaVariant> },
    /// The value cannot be represented in the selected schema variant, for
    /// example an `edge_type` under a layout with no such field.
    #[error("schema variant {variant:?} cannot represent `{field}`")]
    Unencodable {
        variant: SchemaVariant,
        field: &'static str,
    },
}
