//! High-level create and query flows.
//!
//! [`GraphClient`] owns its two service seams, an [`Indexer`] and a
//! [`TransitionSubmitter`], plus the explicit program id and tree context
//! every call operates against. Nothing here is process-global; two clients
//! pointed at different trees can run concurrently without interfering.

use {
    crate::{
        address::{derive_address, derive_address_seed, SeedStrategy},
        constants::TreeContext,
        error::ClientError,
        filter::MemcmpFilter,
        indexer::{CompressedRecord, Indexer},
        instruction::{self, CreateEntityAccounts},
        pack::{self, AccountRefs, NewAddressParams},
        proof::AddressWithTree,
        submit::{classify_rejection, TransitionSubmitter},
    },
    log::{debug, warn},
    solana_sdk::{pubkey::Pubkey, signature::Signature},
    weave_schema::{
        args::{EdgeArgs, NodeArgs},
        entity::EntityKind,
        registry::{decode_any, Decoded, SchemaVariant},
    },
};

/// Candidate layouts for node records, newest generation first.
pub const NODE_SCHEMAS: &[SchemaVariant] = &[SchemaVariant::NodeV1, SchemaVariant::NodeRaw];

/// Candidate layouts for edge records, newest generation first.
pub const EDGE_SCHEMAS: &[SchemaVariant] = &[SchemaVariant::EdgeV1, SchemaVariant::EdgeRaw];

/// Outcome of an accepted creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreatedEntity {
    pub address: Pubkey,
    pub signature: Signature,
}

/// A fetched record together with the layout it decoded under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphRecord {
    pub address: Pubkey,
    pub decoded: Decoded,
}

enum CreatePayload {
    Node(NodeArgs),
    Edge(EdgeArgs),
}

impl CreatePayload {
    fn kind(&self) -> EntityKind {
        match self {
            CreatePayload::Node(_) => EntityKind::Node,
            CreatePayload::Edge(_) => EntityKind::Edge,
        }
    }
}

/// Client for one graph program on one tree set.
pub struct GraphClient<I, S> {
    indexer: I,
    submitter: S,
    program_id: Pubkey,
    trees: TreeContext,
    seed_strategy: SeedStrategy,
    max_stale_retries: usize,
}

impl<I: Indexer, S: TransitionSubmitter> GraphClient<I, S> {
    pub fn new(indexer: I, submitter: S, program_id: Pubkey, trees: TreeContext) -> Self {
        Self {
            indexer,
            submitter,
            program_id,
            trees,
            seed_strategy: SeedStrategy::default(),
            max_stale_retries: 2,
        }
    }

    /// Derive addresses under a historical seed strategy instead of the
    /// current one.
    pub fn with_seed_strategy(mut self, seed_strategy: SeedStrategy) -> Self {
        self.seed_strategy = seed_strategy;
        self
    }

    /// How many times a stale-proof rejection is retried with a fresh
    /// proof before surfacing. Zero disables retrying.
    pub fn with_max_stale_retries(mut self, max_stale_retries: usize) -> Self {
        self.max_stale_retries = max_stale_retries;
        self
    }

    /// The address an entity of `kind` created with `randomness` will
    /// occupy under this client's program and address tree.
    pub fn entity_address(&self, kind: EntityKind, randomness: &[u8; 32]) -> Pubkey {
        let seed =
            derive_address_seed(self.seed_strategy, kind.tag(), randomness, &self.program_id);
        derive_address(&seed, &self.trees.address_tree)
    }

    /// Create a node.
    pub async fn create_node(
        &self,
        accounts: &CreateEntityAccounts,
        randomness: [u8; 32],
        args: NodeArgs,
    ) -> Result<CreatedEntity, ClientError> {
        self.create_entity(accounts, randomness, CreatePayload::Node(args))
            .await
    }

    /// Create an edge between two existing nodes.
    ///
    /// Both endpoints must already be indexed as nodes; submitting an edge
    /// against endpoints the indexer cannot see yet is a caller ordering
    /// error and surfaces as [`ClientError::EdgeEndpointNotIndexed`] before
    /// any proof is requested.
    pub async fn create_edge(
        &self,
        accounts: &CreateEntityAccounts,
        randomness: [u8; 32],
        args: EdgeArgs,
    ) -> Result<CreatedEntity, ClientError> {
        for endpoint in [args.source_node, args.target_node] {
            let indexed_node = self
                .indexer
                .get_compressed_account(&endpoint)
                .await?
                .filter(|record| record.owner == self.program_id)
                .filter(|record| decode_any(NODE_SCHEMAS, &record.data).is_ok());
            if indexed_node.is_none() {
                return Err(ClientError::EdgeEndpointNotIndexed { address: endpoint });
            }
        }
        self.create_entity(accounts, randomness, CreatePayload::Edge(args))
            .await
    }

    async fn create_entity(
        &self,
        accounts: &CreateEntityAccounts,
        randomness: [u8; 32],
        payload: CreatePayload,
    ) -> Result<CreatedEntity, ClientError> {
        let kind = payload.kind();
        let seed =
            derive_address_seed(self.seed_strategy, kind.tag(), &randomness, &self.program_id);
        let address = derive_address(&seed, &self.trees.address_tree);
        debug!("creating {kind:?} at {address}");

        // Creation expects the address free; an occupied one is a caller
        // logic error, not something to retry.
        if self.indexer.get_compressed_account(&address).await?.is_some() {
            return Err(ClientError::AddressCollision {
                address,
                logs: Vec::new(),
            });
        }

        let mut attempt = 0;
        loop {
            // Fetch the proof as late as possible relative to submission;
            // its root can go stale at any moment.
            let bundle = self
                .indexer
                .get_validity_proof(&[AddressWithTree {
                    address,
                    tree: self.trees.address_tree,
                    queue: self.trees.address_queue,
                }])
                .await?;
            let context = bundle.contexts.first().ok_or_else(|| {
                ClientError::MalformedResponse("proof bundle with no context".to_string())
            })?;

            let mut refs = AccountRefs::default();
            pack::pack_state_tree(&self.trees, &mut refs);
            let packed = pack::pack_new_address_params(
                &[NewAddressParams::from_proof_context(seed, context)],
                &mut refs,
            );
            let root_index = packed[0].root_index;

            let instruction = match &payload {
                CreatePayload::Node(args) => instruction::create_node(
                    &self.program_id,
                    accounts,
                    &bundle.proof,
                    root_index,
                    &randomness,
                    args,
                    &refs,
                ),
                CreatePayload::Edge(args) => instruction::create_edge(
                    &self.program_id,
                    accounts,
                    &bundle.proof,
                    root_index,
                    &randomness,
                    args,
                    &refs,
                ),
            };

            match self.submitter.submit_transition(instruction).await {
                Ok(signature) => return Ok(CreatedEntity { address, signature }),
                Err(rejection) => {
                    let error = classify_rejection(&address, rejection);
                    if error.is_retryable() && attempt < self.max_stale_retries {
                        attempt += 1;
                        warn!(
                            "stale proof for {address}, refetching \
                             (attempt {attempt}/{})",
                            self.max_stale_retries
                        );
                        continue;
                    }
                    return Err(error);
                }
            }
        }
    }

    /// Fetch and decode the node at `address`.
    pub async fn node(&self, address: &Pubkey) -> Result<Option<Decoded>, ClientError> {
        self.record_as(address, NODE_SCHEMAS).await
    }

    /// Fetch and decode the edge at `address`.
    pub async fn edge(&self, address: &Pubkey) -> Result<Option<Decoded>, ClientError> {
        self.record_as(address, EDGE_SCHEMAS).await
    }

    async fn record_as(
        &self,
        address: &Pubkey,
        candidates: &[SchemaVariant],
    ) -> Result<Option<Decoded>, ClientError> {
        match self.indexer.get_compressed_account(address).await? {
            Some(record) => Ok(Some(decode_any(candidates, &record.data)?)),
            None => Ok(None),
        }
    }

    /// All nodes recorded for `owner` under this client's program.
    ///
    /// Uses the structured-generation owner offset; raw-generation records
    /// that keep their owner elsewhere are not returned by this query.
    pub async fn nodes_by_owner(&self, owner: &Pubkey) -> Result<Vec<GraphRecord>, ClientError> {
        let filters = [
            MemcmpFilter::entity_kind(EntityKind::Node),
            MemcmpFilter::owner(owner),
        ];
        self.query_decoded(&filters, NODE_SCHEMAS).await
    }

    /// All edges under this client's program.
    pub async fn edges(&self) -> Result<Vec<GraphRecord>, ClientError> {
        let filters = [MemcmpFilter::entity_kind(EntityKind::Edge)];
        self.query_decoded(&filters, EDGE_SCHEMAS).await
    }

    /// Raw filtered retrieval for heterogeneous result sets; callers bring
    /// their own candidate order for decoding.
    pub async fn records(
        &self,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<CompressedRecord>, ClientError> {
        self.indexer
            .get_compressed_accounts_by_owner(&self.program_id, filters)
            .await
    }

    async fn query_decoded(
        &self,
        filters: &[MemcmpFilter],
        candidates: &[SchemaVariant],
    ) -> Result<Vec<GraphRecord>, ClientError> {
        let records = self
            .indexer
            .get_compressed_accounts_by_owner(&self.program_id, filters)
            .await?;
        records
            .into_iter()
            .map(|record| {
                let decoded = decode_any(candidates, &record.data)?;
                Ok(GraphRecord {
                    address: record.address,
                    decoded,
                })
            })
            .collect()
    }
}
