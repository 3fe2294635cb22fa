//! End-to-end flows against in-memory services.
//!
//! The fake ledger below stands in for both external collaborators: the
//! submitter actually "executes" create instructions by parsing the
//! assembled data and account list exactly the way the remote program
//! would, then materializing the record the indexer serves back. If the
//! client mis-packs accounts, mis-orders instruction data, or derives a
//! different address than the program, these tests fail.

use {
    assert_matches::assert_matches,
    async_trait::async_trait,
    solana_sdk::{instruction::Instruction, pubkey::Pubkey, signature::Signature},
    std::{
        collections::{BTreeMap, HashMap},
        sync::{
            atomic::{AtomicU16, AtomicUsize, Ordering},
            Arc, Mutex,
        },
    },
    weave_client::{
        address::{derive_entity_address, SeedStrategy},
        constants::TreeContext,
        error::ClientError,
        filter::MemcmpFilter,
        graph::{GraphClient, GraphRecord},
        indexer::{CompressedRecord, Indexer},
        instruction::{instruction_discriminator, CreateEntityAccounts, ARGS_OFFSET, STATIC_ACCOUNTS},
        proof::{AddressWithTree, CompressedProof, ProofContext, ValidityProofBundle},
        submit::{Rejection, TransitionSubmitter},
    },
    weave_schema::{
        args::{EdgeArgs, NodeArgs},
        entity::{Creator, Edge, Entity, EntityKind, Node, Property, UpdateAuthority},
        registry::{encode, SchemaVariant},
    },
};

#[derive(Default)]
struct LedgerState {
    records: Mutex<BTreeMap<Pubkey, CompressedRecord>>,
    signatures: Mutex<HashMap<Pubkey, Vec<Signature>>>,
    root_epoch: AtomicU16,
    proof_requests: AtomicUsize,
    submissions: AtomicUsize,
    /// Submissions to reject with a stale-root log before accepting.
    stale_failures: AtomicUsize,
}

#[derive(Clone, Default)]
struct FakeIndexer(Arc<LedgerState>);

#[derive(Clone, Default)]
struct FakeSubmitter(Arc<LedgerState>);

#[async_trait]
impl Indexer for FakeIndexer {
    async fn get_validity_proof(
        &self,
        new_addresses: &[AddressWithTree],
    ) -> Result<ValidityProofBundle, ClientError> {
        self.0.proof_requests.fetch_add(1, Ordering::SeqCst);
        // Every proof anchors to the next root, like a live tree would.
        let root_index = self.0.root_epoch.fetch_add(1, Ordering::SeqCst);
        Ok(ValidityProofBundle {
            proof: CompressedProof::default(),
            contexts: new_addresses
                .iter()
                .map(|entry| ProofContext {
                    root_index,
                    merkle_tree: entry.tree,
                    queue: entry.queue,
                })
                .collect(),
        })
    }

    async fn get_compressed_accounts_by_owner(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<CompressedRecord>, ClientError> {
        let records = self.0.records.lock().unwrap();
        Ok(records
            .values()
            .filter(|record| record.owner == *program_id)
            .filter(|record| filters.iter().all(|filter| filter.matches(&record.data)))
            .cloned()
            .collect())
    }

    async fn get_compressed_account(
        &self,
        address: &Pubkey,
    ) -> Result<Option<CompressedRecord>, ClientError> {
        Ok(self.0.records.lock().unwrap().get(address).cloned())
    }

    async fn get_compression_signatures_for_address(
        &self,
        address: &Pubkey,
    ) -> Result<Vec<Signature>, ClientError> {
        Ok(self
            .0
            .signatures
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl TransitionSubmitter for FakeSubmitter {
    async fn submit_transition(
        &self,
        instruction: Instruction,
    ) -> Result<Signature, Rejection> {
        self.0.submissions.fetch_add(1, Ordering::SeqCst);
        if self
            .0
            .stale_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(Rejection {
                message: "transaction simulation failed".to_string(),
                logs: vec!["Program log: ProofVerificationFailed.".to_string()],
            });
        }

        // Re-derive the address the way the remote program does, from the
        // randomness in the data and the address tree in the packed refs.
        let randomness: [u8; 32] = instruction.data[138..ARGS_OFFSET].try_into().unwrap();
        let address_tree = instruction.accounts[STATIC_ACCOUNTS + 1].pubkey;
        let owner = instruction.accounts[2].pubkey;
        let authority_meta = &instruction.accounts[1];
        let update_authority = if authority_meta.is_signer {
            UpdateAuthority::Address(authority_meta.pubkey)
        } else {
            UpdateAuthority::None
        };

        let discriminator = &instruction.data[..8];
        let (kind, entity) = if discriminator == &instruction_discriminator("create_node")[..] {
            let args: NodeArgs = borsh::from_slice(&instruction.data[ARGS_OFFSET..]).unwrap();
            let node = Node {
                owner,
                update_authority,
                label: args.label,
                properties: args.properties,
                creators: args.creators,
                is_mutable: args.is_mutable,
                initialized_plugins: 0,
            };
            (EntityKind::Node, Entity::Node(node))
        } else {
            assert_eq!(discriminator, &instruction_discriminator("create_edge")[..]);
            let args: EdgeArgs = borsh::from_slice(&instruction.data[ARGS_OFFSET..]).unwrap();
            if args.source_node == args.target_node {
                return Err(Rejection {
                    message: "transaction simulation failed".to_string(),
                    logs: vec!["Program log: Error: SelfReferenceNotAllowed.".to_string()],
                });
            }
            let edge = Edge {
                owner,
                update_authority,
                source_node: args.source_node,
                target_node: args.target_node,
                edge_type: Some(args.edge_type),
                properties: args.properties,
                is_mutable: args.is_mutable,
                initialized_plugins: 0,
            };
            (EntityKind::Edge, Entity::Edge(edge))
        };

        let address = derive_entity_address(
            SeedStrategy::ProgramFirst,
            kind.tag(),
            &randomness,
            &instruction.program_id,
            &address_tree,
        );
        let variant = match kind {
            EntityKind::Node => SchemaVariant::NodeV1,
            EntityKind::Edge => SchemaVariant::EdgeV1,
        };
        let data = encode(variant, &entity).unwrap();
        self.0.records.lock().unwrap().insert(
            address,
            CompressedRecord {
                address,
                owner: instruction.program_id,
                data,
            },
        );

        let signature = Signature::new_unique();
        self.0
            .signatures
            .lock()
            .unwrap()
            .entry(address)
            .or_default()
            .push(signature);
        Ok(signature)
    }
}

fn test_trees() -> TreeContext {
    TreeContext {
        state_tree: Pubkey::new_unique(),
        address_tree: Pubkey::new_unique(),
        address_queue: Pubkey::new_unique(),
    }
}

fn test_client() -> (GraphClient<FakeIndexer, FakeSubmitter>, Arc<LedgerState>) {
    let state = Arc::new(LedgerState::default());
    let client = GraphClient::new(
        FakeIndexer(state.clone()),
        FakeSubmitter(state.clone()),
        Pubkey::new_unique(),
        test_trees(),
    );
    (client, state)
}

fn test_accounts() -> CreateEntityAccounts {
    CreateEntityAccounts {
        payer: Pubkey::new_unique(),
        update_authority: Some(Pubkey::new_unique()),
        owner: Pubkey::new_unique(),
    }
}

fn node_args(label: &str) -> NodeArgs {
    NodeArgs {
        label: label.to_string(),
        properties: vec![
            Property {
                key: "description".to_string(),
                value: "d".to_string(),
            },
            Property {
                key: "type".to_string(),
                value: "test".to_string(),
            },
        ],
        is_mutable: true,
        creators: vec![Creator {
            address: Pubkey::new_unique(),
            verified: true,
            share: 100,
        }],
    }
}

#[tokio::test]
async fn create_node_then_fetch_and_query() {
    let (client, state) = test_client();
    let accounts = test_accounts();

    let created = client
        .create_node(&accounts, [1; 32], node_args("test-node"))
        .await
        .unwrap();
    assert_eq!(
        created.address,
        client.entity_address(EntityKind::Node, &[1; 32])
    );

    let decoded = client.node(&created.address).await.unwrap().unwrap();
    assert_eq!(decoded.variant, SchemaVariant::NodeV1);
    let node = decoded.entity.as_node().unwrap();
    assert_eq!(node.label, "test-node");
    assert_eq!(node.owner, accounts.owner);
    assert_eq!(node.properties.len(), 2);
    assert_eq!(node.creators[0].share, 100);
    assert_eq!(
        node.update_authority,
        UpdateAuthority::Address(accounts.update_authority.unwrap())
    );

    let by_owner = client.nodes_by_owner(&accounts.owner).await.unwrap();
    assert_matches!(&by_owner[..], [GraphRecord { address, .. }] if *address == created.address);

    let signatures = FakeIndexer(state)
        .get_compression_signatures_for_address(&created.address)
        .await
        .unwrap();
    assert_eq!(signatures, vec![created.signature]);
}

#[tokio::test]
async fn repeated_randomness_is_an_address_collision() {
    let (client, state) = test_client();
    let accounts = test_accounts();

    client
        .create_node(&accounts, [1; 32], node_args("first"))
        .await
        .unwrap();
    let error = client
        .create_node(&accounts, [1; 32], node_args("second"))
        .await
        .unwrap_err();

    assert_matches!(error, ClientError::AddressCollision { .. });
    assert!(!error.is_retryable());
    // Rejected by the local pre-check: exactly the one earlier submission.
    assert_eq!(state.submissions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn premature_edges_fail_before_any_proof_is_requested() {
    let (client, state) = test_client();

    let missing = Pubkey::new_unique();
    let error = client
        .create_edge(
            &test_accounts(),
            [3; 32],
            EdgeArgs {
                source_node: missing,
                target_node: Pubkey::new_unique(),
                edge_type: "follows".to_string(),
                properties: vec![],
                is_mutable: true,
            },
        )
        .await
        .unwrap_err();

    assert_matches!(
        error,
        ClientError::EdgeEndpointNotIndexed { address } if address == missing
    );
    assert_eq!(state.proof_requests.load(Ordering::SeqCst), 0);
    assert_eq!(state.submissions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn edges_connect_created_nodes_and_filters_split_kinds() {
    let (client, _state) = test_client();
    let accounts = test_accounts();

    let source = client
        .create_node(&accounts, [1; 32], node_args("source"))
        .await
        .unwrap();
    let target = client
        .create_node(&accounts, [2; 32], node_args("target"))
        .await
        .unwrap();

    let created = client
        .create_edge(
            &accounts,
            [3; 32],
            EdgeArgs {
                source_node: source.address,
                target_node: target.address,
                edge_type: "follows".to_string(),
                properties: vec![Property {
                    key: "weight".to_string(),
                    value: "10".to_string(),
                }],
                is_mutable: true,
            },
        )
        .await
        .unwrap();

    let decoded = client.edge(&created.address).await.unwrap().unwrap();
    let edge = decoded.entity.as_edge().unwrap();
    assert_eq!(edge.source_node, source.address);
    assert_eq!(edge.target_node, target.address);
    assert_eq!(edge.edge_type.as_deref(), Some("follows"));

    // Three records exist; the kind filter keeps only the tag-1 ones.
    let all = client.records(&[]).await.unwrap();
    assert_eq!(all.len(), 3);
    let edges_only = client
        .records(&[MemcmpFilter::entity_kind(EntityKind::Edge)])
        .await
        .unwrap();
    assert_matches!(&edges_only[..], [record] if record.data[0] == 1);
    assert_eq!(client.edges().await.unwrap().len(), 1);
}

#[tokio::test]
async fn self_referencing_edges_surface_the_remote_rejection() {
    let (client, _state) = test_client();
    let accounts = test_accounts();

    let node = client
        .create_node(&accounts, [1; 32], node_args("loop"))
        .await
        .unwrap();
    let error = client
        .create_edge(
            &accounts,
            [4; 32],
            EdgeArgs {
                source_node: node.address,
                target_node: node.address,
                edge_type: "self".to_string(),
                properties: vec![],
                is_mutable: true,
            },
        )
        .await
        .unwrap_err();

    assert_matches!(error, ClientError::RemoteValidationFailure { .. });
    assert!(error
        .logs()
        .iter()
        .any(|line| line.contains("SelfReferenceNotAllowed")));
}

#[tokio::test]
async fn stale_proofs_are_refetched_then_succeed() {
    let (client, state) = test_client();
    state.stale_failures.store(1, Ordering::SeqCst);

    let created = client
        .create_node(&test_accounts(), [5; 32], node_args("eventually"))
        .await
        .unwrap();

    assert_eq!(state.submissions.load(Ordering::SeqCst), 2);
    // One proof per attempt: a rejected proof is never reused.
    assert_eq!(state.proof_requests.load(Ordering::SeqCst), 2);
    assert!(client.node(&created.address).await.unwrap().is_some());
}

#[tokio::test]
async fn stale_proofs_surface_when_retries_are_exhausted() {
    let (client, state) = test_client();
    let client = client.with_max_stale_retries(0);
    state.stale_failures.store(1, Ordering::SeqCst);

    let error = client
        .create_node(&test_accounts(), [6; 32], node_args("never"))
        .await
        .unwrap_err();

    assert_matches!(error, ClientError::StaleProof { .. });
    assert!(error.is_retryable());
    assert_eq!(state.submissions.load(Ordering::SeqCst), 1);
}
