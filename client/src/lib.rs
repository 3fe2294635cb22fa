//! Client for Weave compressed graph state.
//!
//! Graph entities live as leaves in a sparse Merkle state tree rather than
//! as materialized accounts, so every mutation is gated on a validity proof
//! from an external prover/indexer, and every read decodes an opaque byte
//! blob against the layouts in `weave-schema`.
//!
//! The pipeline, in the order a caller walks it:
//!
//! 1. [`address`] derives the deterministic 32-byte address an entity will
//!    occupy, from its kind tag, caller randomness, and the owning program.
//! 2. [`indexer`] asks the prover/indexer for a validity proof that the
//!    address is currently free (or holds specific state), anchored to a
//!    tree root.
//! 3. [`pack`] and [`instruction`] flatten the proof's tree references into
//!    an index table and assemble the exact instruction the remote program
//!    expects.
//! 4. [`submit`] hands the instruction to a caller-provided submitter and
//!    classifies rejections into the error taxonomy in [`error`].
//! 5. [`graph`] drives the whole loop and offers filtered queries over the
//!    resulting records via [`filter`] and the schema registry.
//!
//! Proofs go stale: the prover may anchor to a root that has moved on by
//! submission time. That race is expected, since the remote program is
//! the arbiter, so proofs are fetched as late as possible and a stale-root
//! rejection is retried a bounded number of times with a fresh proof. See
//! the integration tests for the full flow against in-memory services.

pub mod address;
pub mod constants;
pub mod error;
pub mod filter;
pub mod graph;
pub mod indexer;
pub mod instruction;
pub mod pack;
pub mod proof;
pub mod submit;
