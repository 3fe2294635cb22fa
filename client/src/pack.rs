//! Packing of auxiliary account references.
//!
//! The remote program receives tree and queue references as indices into one
//! flat, de-duplicated, order-preserving account list rather than as inline
//! keys. Packing is a symbol-table build: every distinct key gets exactly
//! one slot, repeated keys reuse their slot, and slots never move once
//! assigned, because downstream instruction building depends on the
//! positions.

use {
    crate::{constants::TreeContext, proof::ProofContext},
    solana_sdk::{instruction::AccountMeta, pubkey::Pubkey},
};

/// Flat, order-preserving, de-duplicated auxiliary account list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountRefs {
    accounts: Vec<Pubkey>,
}

impl AccountRefs {
    /// Slot for `pubkey`, allocating the next one on first sight.
    pub fn insert_or_get(&mut self, pubkey: Pubkey) -> u8 {
        let index = self
            .accounts
            .iter()
            .position(|existing| *existing == pubkey)
            .unwrap_or_else(|| {
                self.accounts.push(pubkey);
                self.accounts.len() - 1
            });
        index as u8
    }

    pub fn accounts(&self) -> &[Pubkey] {
        &self.accounts
    }

    /// Render the flat list for the instruction's trailing accounts. The
    /// trees and queues are all mutated by the transition, so every slot is
    /// writable.
    pub fn to_account_metas(&self) -> Vec<AccountMeta> {
        self.accounts
            .iter()
            .map(|pubkey| AccountMeta::new(*pubkey, false))
            .collect()
    }
}

/// Unpacked parameters for creating an entity at a new address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NewAddressParams {
    pub seed: [u8; 32],
    pub root_index: u16,
    pub address_tree: Pubkey,
    pub address_queue: Pubkey,
}

impl NewAddressParams {
    /// Anchor a derived seed to the tree data a proof came back with.
    pub fn from_proof_context(seed: [u8; 32], context: &ProofContext) -> Self {
        Self {
            seed,
            root_index: context.root_index,
            address_tree: context.merkle_tree,
            address_queue: context.queue,
        }
    }
}

/// [`NewAddressParams`] with its tree references rewritten into slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PackedNewAddressParams {
    pub seed: [u8; 32],
    pub root_index: u16,
    pub address_tree_index: u8,
    pub address_queue_index: u8,
}

/// Reserve slot 0 for the output state tree.
///
/// The remote program reads the output tree from the first slot, so this
/// must run before [`pack_new_address_params`] on a fresh [`AccountRefs`].
pub fn pack_state_tree(trees: &TreeContext, refs: &mut AccountRefs) -> u8 {
    refs.insert_or_get(trees.state_tree)
}

/// Rewrite each param's tree references into slots in `refs`.
pub fn pack_new_address_params(
    params: &[NewAddressParams],
    refs: &mut AccountRefs,
) -> Vec<PackedNewAddressParams> {
    params
        .iter()
        .map(|param| PackedNewAddressParams {
            seed: param.seed,
            root_index: param.root_index,
            address_tree_index: refs.insert_or_get(param.address_tree),
            address_queue_index: refs.insert_or_get(param.address_queue),
        })
        .collect()
}
