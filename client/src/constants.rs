//! Well-known program ids, derived authorities, and the default tree set.
//!
//! Everything tree- or queue-shaped is carried as explicit parameters
//! through the client (see [`TreeContext`]); the constants here are only the
//! published defaults of the public deployment.

use solana_sdk::{pubkey, pubkey::Pubkey};

/// The Weave graph program.
pub const WEAVE_PROGRAM_ID: Pubkey = pubkey!("GraphUyqhPmEAckWzi7zAvbvUTXf8kqX7JtuvdGYRDRh");

/// The compressed-state system program the graph program CPIs into.
pub const LIGHT_SYSTEM_PROGRAM_ID: Pubkey =
    pubkey!("SySTEM1eSU2p4BGQfQpimFEWWSC1XDFeun3Nqzz3rT7");

/// The account compression program maintaining the state trees.
pub const ACCOUNT_COMPRESSION_PROGRAM_ID: Pubkey =
    pubkey!("compr6CUsB5m2jS4Y3831ztGSTnDpnKJTKS95d64XVq");

/// The no-op program used as the compression log wrapper.
pub const NOOP_PROGRAM_ID: Pubkey = pubkey!("noopb9bkMVfRPU8AsbpTUg8AQkHtKwMYZiFUjNRtMmV");

/// Seed of the graph program's CPI signing authority.
pub const CPI_AUTHORITY_SEED: &[u8] = b"cpi_authority";

/// The CPI signing authority PDA of `program_id`.
pub fn cpi_authority_pda(program_id: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[CPI_AUTHORITY_SEED], program_id).0
}

/// The compression authority the compressed-state system program signs with.
pub fn account_compression_authority() -> Pubkey {
    cpi_authority_pda(&LIGHT_SYSTEM_PROGRAM_ID)
}

/// The registration PDA of the compressed-state system program under the
/// account compression program.
pub fn registered_program_pda() -> Pubkey {
    Pubkey::find_program_address(
        &[LIGHT_SYSTEM_PROGRAM_ID.as_ref()],
        &ACCOUNT_COMPRESSION_PROGRAM_ID,
    )
    .0
}

/// The state tree, address tree, and address queue a mutation operates
/// against.
///
/// Always threaded through calls explicitly so concurrent operations against
/// different trees cannot interfere.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeContext {
    /// Output state tree new leaves are appended to.
    pub state_tree: Pubkey,
    /// Sparse Merkle tree defining the compressed address space.
    pub address_tree: Pubkey,
    /// Pending-insertion queue of the address tree.
    pub address_queue: Pubkey,
}

/// Tree set of the public deployment.
pub const DEFAULT_TREES: TreeContext = TreeContext {
    state_tree: pubkey!("smt1NamzXdq4AMqS2fS2F1i5KTYPZRhoHgWx38d8WsT"),
    address_tree: pubkey!("amt1Ayt45jfbdw5YSo7iz6WZxUmnZsQTYXy82hVwyC2"),
    address_queue: pubkey!("aq1S9z4reTSQAdgWHGD2zDaS39sjGrAxbR31vxJ2F4F"),
};
