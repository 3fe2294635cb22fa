//! The client error taxonomy.
//!
//! Local schema and derivation failures are pure and synchronous; network
//! and remote failures carry the underlying service diagnostics so a caller
//! can tell a stale proof from an invalid payload from a rejected business
//! rule without re-running anything.

use {solana_sdk::pubkey::Pubkey, thiserror::Error, weave_schema::error::SchemaError};

#[derive(Debug, Error)]
pub enum ClientError {
    /// A record failed to encode or decode. Local and pure.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// The remote program rejected the transition because the proof's root
    /// had already been superseded. Recoverable: fetch a fresh proof and
    /// resubmit.
    #[error("proof was anchored to a stale root")]
    StaleProof { logs: Vec<String> },

    /// The derived address is already occupied where a creation expected it
    /// free. A caller logic error; never retried.
    #[error("derived address {address} is already occupied")]
    AddressCollision { address: Pubkey, logs: Vec<String> },

    /// The remote program rejected the transition for a domain reason.
    /// Surfaced verbatim with the remote diagnostic trail; never retried.
    #[error("remote program rejected the transition: {message}")]
    RemoteValidationFailure { message: String, logs: Vec<String> },

    /// An edge referenced an endpoint that is not (yet) indexed as a node.
    /// A caller ordering error, surfaced before any proof is requested.
    #[error("edge endpoint {address} is not indexed as a node")]
    EdgeEndpointNotIndexed { address: Pubkey },

    /// The prover/indexer returned a structured error.
    #[error("indexer rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The prover/indexer returned bytes this client cannot interpret.
    #[error("malformed indexer response: {0}")]
    MalformedResponse(String),

    /// The request never produced a response (includes timeouts; a timed-out
    /// proof request must be reissued, never reused).
    #[error("indexer transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// Whether resubmitting with a freshly fetched proof can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::StaleProof { .. })
    }

    /// The remote diagnostic trail, if this error carries one.
    pub fn logs(&self) -> &[String] {
        match self {
            ClientError::StaleProof { logs }
            | ClientError::AddressCollision { logs, .. }
            | ClientError::RemoteValidationFailure { logs, .. } => logs,
            _ => &[],
        }
    }
}
