//! Deterministic compressed address derivation.
//!
//! Public module so independent parties (wallets, indexers, the remote
//! program) agree byte-for-byte on where an entity lives before anything is
//! submitted. Everything here is a pure function of its inputs.

use solana_sdk::{keccak, pubkey::Pubkey};

/// Hash a sequence of byte slices into the proving system's field.
///
/// Keccak-256 over the inputs followed by a `0xFF` bump byte; the leading
/// output byte is zeroed so the result is always smaller than the field
/// modulus.
pub fn hashv_to_field_size_be(inputs: &[&[u8]]) -> [u8; 32] {
    let mut hasher = keccak::Hasher::default();
    for input in inputs {
        hasher.hash(input);
    }
    hasher.hash(&[u8::MAX]);
    let mut out = hasher.result().to_bytes();
    out[0] = 0;
    out
}

/// How the address seed binds the entity kind, caller randomness, and the
/// owning program together.
///
/// Records exist on chain under both orderings, so both stay supported;
/// [`SeedStrategy::ProgramFirst`] is what the current program generation
/// derives internally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SeedStrategy {
    /// seed = H(program_id || kind_tag || randomness)
    #[default]
    ProgramFirst,
    /// seed = H(kind_tag || program_id || randomness)
    KindFirst,
}

/// Derive the 32-byte address seed for an entity.
pub fn derive_address_seed(
    strategy: SeedStrategy,
    kind_tag: u8,
    randomness: &[u8; 32],
    program_id: &Pubkey,
) -> [u8; 32] {
    match strategy {
        SeedStrategy::ProgramFirst => {
            hashv_to_field_size_be(&[program_id.as_ref(), &[kind_tag], randomness])
        }
        SeedStrategy::KindFirst => {
            hashv_to_field_size_be(&[&[kind_tag], program_id.as_ref(), randomness])
        }
    }
}

/// Map a seed into a specific address tree's address space.
pub fn derive_address(seed: &[u8; 32], address_tree: &Pubkey) -> Pubkey {
    Pubkey::new_from_array(hashv_to_field_size_be(&[address_tree.as_ref(), seed]))
}

/// Seed derivation and tree mapping in one step.
pub fn derive_entity_address(
    strategy: SeedStrategy,
    kind_tag: u8,
    randomness: &[u8; 32],
    program_id: &Pubkey,
    address_tree: &Pubkey,
) -> Pubkey {
    derive_address(
        &derive_address_seed(strategy, kind_tag, randomness, program_id),
        address_tree,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let program_id = Pubkey::new_unique();
        let tree = Pubkey::new_unique();
        let randomness = [0u8; 32];

        let first =
            derive_entity_address(SeedStrategy::ProgramFirst, 0, &randomness, &program_id, &tree);
        let second =
            derive_entity_address(SeedStrategy::ProgramFirst, 0, &randomness, &program_id, &tree);
        assert_eq!(first, second);
    }

    #[test]
    fn every_input_is_load_bearing() {
        let program_id = Pubkey::new_unique();
        let tree = Pubkey::new_unique();
        let base =
            derive_entity_address(SeedStrategy::ProgramFirst, 0, &[7u8; 32], &program_id, &tree);

        assert_ne!(
            base,
            derive_entity_address(SeedStrategy::ProgramFirst, 0, &[8u8; 32], &program_id, &tree),
        );
        assert_ne!(
            base,
            derive_entity_address(SeedStrategy::ProgramFirst, 1, &[7u8; 32], &program_id, &tree),
        );
        assert_ne!(
            base,
            derive_entity_address(
                SeedStrategy::ProgramFirst,
                0,
                &[7u8; 32],
                &Pubkey::new_unique(),
                &tree,
            ),
        );
        assert_ne!(
            base,
            derive_entity_address(
                SeedStrategy::ProgramFirst,
                0,
                &[7u8; 32],
                &program_id,
                &Pubkey::new_unique(),
            ),
        );
    }

    #[test]
    fn strategies_produce_distinct_addresses() {
        let program_id = Pubkey::new_unique();
        let tree = Pubkey::new_unique();
        let randomness = [3u8; 32];

        let current =
            derive_entity_address(SeedStrategy::ProgramFirst, 0, &randomness, &program_id, &tree);
        let historical =
            derive_entity_address(SeedStrategy::KindFirst, 0, &randomness, &program_id, &tree);
        assert_ne!(current, historical);
    }

    #[test]
    fn derived_addresses_fit_the_field() {
        let seed = derive_address_seed(
            SeedStrategy::ProgramFirst,
            1,
            &[9u8; 32],
            &Pubkey::new_unique(),
        );
        assert_eq!(seed[0], 0);
        let address = derive_address(&seed, &Pubkey::new_unique());
        assert_eq!(address.to_bytes()[0], 0);
    }
}
