//! Assembly of create-entity instructions.
//!
//! Instruction data is an 8-byte discriminator, `sha256("global:" + name)`
//! truncated, followed by the borsh serialization of the proof, the root
//! index, the caller randomness, and the entity arguments, in that order.
//! The account list is fixed and position-sensitive; packed tree references
//! from [`crate::pack`] trail the static accounts.

use {
    crate::{
        constants::{
            account_compression_authority, cpi_authority_pda, registered_program_pda,
            ACCOUNT_COMPRESSION_PROGRAM_ID, LIGHT_SYSTEM_PROGRAM_ID, NOOP_PROGRAM_ID,
        },
        pack::AccountRefs,
        proof::CompressedProof,
    },
    borsh::BorshSerialize,
    solana_sdk::{
        hash::hashv,
        instruction::{AccountMeta, Instruction},
        pubkey::Pubkey,
        system_program,
    },
    weave_schema::args::{EdgeArgs, NodeArgs},
};

/// Keys of the caller-side accounts of a create instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreateEntityAccounts {
    /// Fee payer; signs.
    pub payer: Pubkey,
    /// Update authority recorded on the entity; signs when present. When
    /// absent the program id stands in at the account's position.
    pub update_authority: Option<Pubkey>,
    /// Owner recorded on the entity; any key, does not sign.
    pub owner: Pubkey,
}

/// The 8-byte instruction discriminator for `name`.
pub fn instruction_discriminator(name: &str) -> [u8; 8] {
    let digest = hashv(&[b"global:", name.as_bytes()]);
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(&digest.as_ref()[..8]);
    discriminator
}

fn instruction_data<T: BorshSerialize>(
    name: &str,
    proof: &CompressedProof,
    root_index: u16,
    randomness: &[u8; 32],
    args: &T,
) -> Vec<u8> {
    let mut data = instruction_discriminator(name).to_vec();
    // Writing borsh into a Vec cannot fail.
    proof.serialize(&mut data).unwrap();
    root_index.serialize(&mut data).unwrap();
    randomness.serialize(&mut data).unwrap();
    args.serialize(&mut data).unwrap();
    data
}

fn create_entity(
    program_id: &Pubkey,
    accounts: &CreateEntityAccounts,
    data: Vec<u8>,
    refs: &AccountRefs,
) -> Instruction {
    let update_authority = match accounts.update_authority {
        Some(update_authority) => AccountMeta::new_readonly(update_authority, true),
        None => AccountMeta::new_readonly(*program_id, false),
    };
    let mut metas = vec![
        AccountMeta::new(accounts.payer, true),
        update_authority,
        AccountMeta::new_readonly(accounts.owner, false),
        AccountMeta::new_readonly(cpi_authority_pda(program_id), false),
        AccountMeta::new_readonly(*program_id, false),
        AccountMeta::new_readonly(LIGHT_SYSTEM_PROGRAM_ID, false),
        AccountMeta::new_readonly(registered_program_pda(), false),
        AccountMeta::new_readonly(NOOP_PROGRAM_ID, false),
        AccountMeta::new_readonly(account_compression_authority(), false),
        AccountMeta::new_readonly(ACCOUNT_COMPRESSION_PROGRAM_ID, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    metas.extend(refs.to_account_metas());
    Instruction {
        program_id: *program_id,
        accounts: metas,
        data,
    }
}

/// Number of accounts preceding the packed references.
pub const STATIC_ACCOUNTS: usize = 11;

/// Byte offset of the entity args inside the instruction data: the
/// discriminator, proof, root index, and randomness come first.
pub const ARGS_OFFSET: usize = 8 + 128 + 2 + 32;

/// Build a `create_node` instruction.
pub fn create_node(
    program_id: &Pubkey,
    accounts: &CreateEntityAccounts,
    proof: &CompressedProof,
    root_index: u16,
    randomness: &[u8; 32],
    args: &NodeArgs,
    refs: &AccountRefs,
) -> Instruction {
    let data = instruction_data("create_node", proof, root_index, randomness, args);
    create_entity(program_id, accounts, data, refs)
}

/// Build a `create_edge` instruction.
pub fn create_edge(
    program_id: &Pubkey,
    accounts: &CreateEntityAccounts,
    proof: &CompressedProof,
    root_index: u16,
    randomness: &[u8; 32],
    args: &EdgeArgs,
    refs: &AccountRefs,
) -> Instruction {
    let data = instruction_data("create_edge", proof, root_index, randomness, args);
    create_entity(program_id, accounts, data, refs)
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{constants::TreeContext, pack},
        borsh::BorshDeserialize,
        weave_schema::entity::Property,
    };

    fn build() -> (Instruction, CreateEntityAccounts, TreeContext, NodeArgs) {
        let program_id = Pubkey::new_unique();
        let accounts = CreateEntityAccounts {
            payer: Pubkey::new_unique(),
            update_authority: Some(Pubkey::new_unique()),
            owner: Pubkey::new_unique(),
        };
        let trees = TreeContext {
            state_tree: Pubkey::new_unique(),
            address_tree: Pubkey::new_unique(),
            address_queue: Pubkey::new_unique(),
        };
        let args = NodeArgs {
            label: "n".to_string(),
            properties: vec![Property {
                key: "k".to_string(),
                value: "v".to_string(),
            }],
            is_mutable: true,
            creators: vec![],
        };

        let mut refs = AccountRefs::default();
        pack::pack_state_tree(&trees, &mut refs);
        pack::pack_new_address_params(
            &[pack::NewAddressParams {
                seed: [1; 32],
                root_index: 7,
                address_tree: trees.address_tree,
                address_queue: trees.address_queue,
            }],
            &mut refs,
        );
        let instruction = create_node(
            &program_id,
            &accounts,
            &CompressedProof::default(),
            7,
            &[9; 32],
            &args,
            &refs,
        );
        (instruction, accounts, trees, args)
    }

    #[test]
    fn data_layout_is_discriminator_proof_root_randomness_args() {
        let (instruction, _, _, args) = build();

        assert_eq!(
            &instruction.data[..8],
            &instruction_discriminator("create_node")
        );
        assert_ne!(
            instruction_discriminator("create_node"),
            instruction_discriminator("create_edge")
        );
        // Root index and randomness at their documented offsets.
        assert_eq!(&instruction.data[136..138], &7u16.to_le_bytes());
        assert_eq!(&instruction.data[138..170], &[9u8; 32]);
        assert_eq!(ARGS_OFFSET, 170);

        let decoded = NodeArgs::try_from_slice(&instruction.data[ARGS_OFFSET..]).unwrap();
        assert_eq!(decoded, args);
    }

    #[test]
    fn account_order_is_stable() {
        let (instruction, accounts, trees, _) = build();

        assert_eq!(instruction.accounts.len(), STATIC_ACCOUNTS + 3);
        assert_eq!(instruction.accounts[0].pubkey, accounts.payer);
        assert!(instruction.accounts[0].is_signer);
        assert!(instruction.accounts[0].is_writable);
        assert_eq!(
            instruction.accounts[1].pubkey,
            accounts.update_authority.unwrap()
        );
        assert!(instruction.accounts[1].is_signer);
        assert_eq!(instruction.accounts[2].pubkey, accounts.owner);
        assert_eq!(instruction.accounts[5].pubkey, LIGHT_SYSTEM_PROGRAM_ID);
        assert_eq!(instruction.accounts[10].pubkey, system_program::id());
        // Packed refs trail in slot order.
        assert_eq!(instruction.accounts[STATIC_ACCOUNTS].pubkey, trees.state_tree);
        assert_eq!(
            instruction.accounts[STATIC_ACCOUNTS + 1].pubkey,
            trees.address_tree
        );
        assert_eq!(
            instruction.accounts[STATIC_ACCOUNTS + 2].pubkey,
            trees.address_queue
        );
    }

    #[test]
    fn absent_update_authority_is_the_program_id_placeholder() {
        let program_id = Pubkey::new_unique();
        let accounts = CreateEntityAccounts {
            payer: Pubkey::new_unique(),
            update_authority: None,
            owner: Pubkey::new_unique(),
        };
        let instruction = create_node(
            &program_id,
            &accounts,
            &CompressedProof::default(),
            0,
            &[0; 32],
            &NodeArgs::default(),
            &AccountRefs::default(),
        );
        assert_eq!(instruction.accounts[1].pubkey, program_id);
        assert!(!instruction.accounts[1].is_signer);
    }
}
