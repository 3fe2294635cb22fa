//! The prover/indexer service contract and its JSON-RPC client.
//!
//! The service is an external collaborator reached over JSON-RPC 2.0; this
//! module defines the trait the rest of the client programs against, plus
//! the HTTP implementation. Tests (and embedded deployments) substitute
//! their own [`Indexer`] impl.
//!
//! Keys and addresses travel as base58 strings, record data and proof
//! components as base64. Every request is bounded by the client's timeout;
//! a proof whose request timed out must be fetched again, never reused,
//! since it may anchor to an already-superseded root.

use {
    crate::{
        error::ClientError,
        filter::MemcmpFilter,
        proof::{AddressWithTree, CompressedProof, ProofContext, ValidityProofBundle},
    },
    async_trait::async_trait,
    base64::{prelude::BASE64_STANDARD, Engine},
    serde::de::DeserializeOwned,
    serde_derive::{Deserialize, Serialize},
    solana_sdk::{pubkey::Pubkey, signature::Signature},
    std::time::Duration,
};

/// A compressed record as returned by the indexer: the leaf's derived
/// address, the program owning it, and the raw record bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompressedRecord {
    pub address: Pubkey,
    pub owner: Pubkey,
    pub data: Vec<u8>,
}

/// The prover/indexer as the client consumes it.
#[async_trait]
pub trait Indexer {
    /// Request a validity proof for a set of new addresses, each anchored
    /// to its own tree and queue. The returned bundle carries one
    /// [`ProofContext`] per requested address, in request order.
    async fn get_validity_proof(
        &self,
        new_addresses: &[AddressWithTree],
    ) -> Result<ValidityProofBundle, ClientError>;

    /// Fetch records owned by `program_id`, optionally narrowed by
    /// byte-offset filters. Heterogeneous: one call can return any mix of
    /// entity kinds.
    async fn get_compressed_accounts_by_owner(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<CompressedRecord>, ClientError>;

    /// Fetch the record at one derived address, if indexed.
    async fn get_compressed_account(
        &self,
        address: &Pubkey,
    ) -> Result<Option<CompressedRecord>, ClientError>;

    /// Transaction signatures that touched `address`, newest first.
    async fn get_compression_signatures_for_address(
        &self,
        address: &Pubkey,
    ) -> Result<Vec<Signature>, ClientError>;
}

/// Default request timeout for [`IndexerClient`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON-RPC implementation of [`Indexer`].
pub struct IndexerClient {
    url: String,
    http: reqwest::Client,
}

impl IndexerClient {
    pub fn new(url: impl Into<String>) -> Result<Self, ClientError> {
        Self::new_with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Build a client whose every request is bounded by `timeout`.
    pub fn new_with_timeout(
        url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            http,
        })
    }

    async fn call<P: serde::Serialize, R: DeserializeOwned>(
        &self,
        method: &'static str,
        params: P,
    ) -> Result<R, ClientError> {
        log::debug!("indexer request: {method}");
        let response: RpcResponse = self
            .http
            .post(&self.url)
            .json(&RpcRequest {
                jsonrpc: "2.0",
                id: 1,
                method,
                params,
            })
            .send()
            .await?
            .json()
            .await?;
        if let Some(error) = response.error {
            return Err(ClientError::Rpc {
                code: error.code,
                message: error.message,
            });
        }
        // A null result is meaningful for lookups.
        let result = response.result.unwrap_or(serde_json::Value::Null);
        serde_json::from_value(result)
            .map_err(|err| ClientError::MalformedResponse(format!("{method}: {err}")))
    }
}

#[async_trait]
impl Indexer for IndexerClient {
    async fn get_validity_proof(
        &self,
        new_addresses: &[AddressWithTree],
    ) -> Result<ValidityProofBundle, ClientError> {
        let params = ValidityProofParams {
            new_addresses_with_trees: new_addresses
                .iter()
                .map(|entry| RpcAddressWithTree {
                    address: entry.address.to_string(),
                    tree: entry.tree.to_string(),
                    queue: entry.queue.to_string(),
                })
                .collect(),
        };
        let result: RpcValidityProof = self.call("getValidityProof", params).await?;
        result.into_bundle(new_addresses.len())
    }

    async fn get_compressed_accounts_by_owner(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<CompressedRecord>, ClientError> {
        let params = AccountsByOwnerParams {
            owner: program_id.to_string(),
            filters: filters
                .iter()
                .map(|filter| RpcFilter {
                    memcmp: RpcMemcmp {
                        offset: filter.offset,
                        bytes: bs58::encode(&filter.bytes).into_string(),
                    },
                })
                .collect(),
        };
        let result: RpcRecordItems = self.call("getCompressedAccountsByOwner", params).await?;
        result
            .items
            .into_iter()
            .map(RpcRecord::into_record)
            .collect()
    }

    async fn get_compressed_account(
        &self,
        address: &Pubkey,
    ) -> Result<Option<CompressedRecord>, ClientError> {
        let params = AddressParams {
            address: address.to_string(),
        };
        let result: Option<RpcRecord> = self.call("getCompressedAccount", params).await?;
        result.map(RpcRecord::into_record).transpose()
    }

    async fn get_compression_signatures_for_address(
        &self,
        address: &Pubkey,
    ) -> Result<Vec<Signature>, ClientError> {
        let params = AddressParams {
            address: address.to_string(),
        };
        let result: RpcSignatureItems = self
            .call("getCompressionSignaturesForAddress", params)
            .await?;
        result
            .items
            .iter()
            .map(|signature| {
                signature.parse().map_err(|_| {
                    ClientError::MalformedResponse(format!("signature `{signature}`"))
                })
            })
            .collect()
    }
}

#[derive(Serialize)]
struct RpcRequest<P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: P,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    error: Option<RpcErrorObject>,
}

#[derive(Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ValidityProofParams {
    new_addresses_with_trees: Vec<RpcAddressWithTree>,
}

#[derive(Serialize)]
struct RpcAddressWithTree {
    address: String,
    tree: String,
    queue: String,
}

#[derive(Serialize)]
struct AccountsByOwnerParams {
    owner: String,
    filters: Vec<RpcFilter>,
}

#[derive(Serialize)]
struct RpcFilter {
    memcmp: RpcMemcmp,
}

#[derive(Serialize)]
struct RpcMemcmp {
    offset: usize,
    bytes: String,
}

#[derive(Serialize)]
struct AddressParams {
    address: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcValidityProof {
    compressed_proof: RpcCompressedProof,
    root_indices: Vec<u16>,
    merkle_trees: Vec<String>,
    nullifier_queues: Vec<String>,
}

#[derive(Deserialize)]
struct RpcCompressedProof {
    a: String,
    b: String,
    c: String,
}

#[derive(Deserialize)]
struct RpcRecordItems {
    items: Vec<RpcRecord>,
}

#[derive(Deserialize)]
struct RpcRecord {
    address: String,
    owner: String,
    data: String,
}

#[derive(Deserialize)]
struct RpcSignatureItems {
    items: Vec<String>,
}

fn parse_pubkey(text: &str, what: &str) -> Result<Pubkey, ClientError> {
    text.parse()
        .map_err(|_| ClientError::MalformedResponse(format!("{what} `{text}`")))
}

fn proof_component<const N: usize>(text: &str, what: &str) -> Result<[u8; N], ClientError> {
    let bytes = BASE64_STANDARD
        .decode(text)
        .map_err(|_| ClientError::MalformedResponse(format!("{what} is not base64")))?;
    bytes.try_into().map_err(|_| {
        ClientError::MalformedResponse(format!("{what} is not {N} bytes"))
    })
}

impl RpcValidityProof {
    fn into_bundle(self, expected: usize) -> Result<ValidityProofBundle, ClientError> {
        if self.root_indices.len() != expected
            || self.merkle_trees.len() != expected
            || self.nullifier_queues.len() != expected
        {
            return Err(ClientError::MalformedResponse(format!(
                "proof bundle covers {} addresses, requested {expected}",
                self.root_indices.len()
            )));
        }
        let proof = CompressedProof {
            a: proof_component(&self.compressed_proof.a, "proof.a")?,
            b: proof_component(&self.compressed_proof.b, "proof.b")?,
            c: proof_component(&self.compressed_proof.c, "proof.c")?,
        };
        let contexts = self
            .root_indices
            .iter()
            .zip(&self.merkle_trees)
            .zip(&self.nullifier_queues)
            .map(|((root_index, tree), queue)| {
                Ok(ProofContext {
                    root_index: *root_index,
                    merkle_tree: parse_pubkey(tree, "merkle tree")?,
                    queue: parse_pubkey(queue, "queue")?,
                })
            })
            .collect::<Result<_, ClientError>>()?;
        Ok(ValidityProofBundle { proof, contexts })
    }
}

impl RpcRecord {
    fn into_record(self) -> Result<CompressedRecord, ClientError> {
        Ok(CompressedRecord {
            address: parse_pubkey(&self.address, "record address")?,
            owner: parse_pubkey(&self.owner, "record owner")?,
            data: BASE64_STANDARD.decode(&self.data).map_err(|_| {
                ClientError::MalformedResponse("record data is not base64".to_string())
            })?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proof_bundle_parses_and_checks_arity() {
        let raw = RpcValidityProof {
            compressed_proof: RpcCompressedProof {
                a: BASE64_STANDARD.encode([1u8; 32]),
                b: BASE64_STANDARD.encode([2u8; 64]),
                c: BASE64_STANDARD.encode([3u8; 32]),
            },
            root_indices: vec![42],
            merkle_trees: vec![Pubkey::new_unique().to_string()],
            nullifier_queues: vec![Pubkey::new_unique().to_string()],
        };
        let bundle = raw.into_bundle(1).unwrap();
        assert_eq!(bundle.proof.a, [1u8; 32]);
        assert_eq!(bundle.contexts.len(), 1);
        assert_eq!(bundle.contexts[0].root_index, 42);

        let short = RpcValidityProof {
            compressed_proof: RpcCompressedProof {
                a: BASE64_STANDARD.encode([1u8; 32]),
                b: BASE64_STANDARD.encode([2u8; 64]),
                c: BASE64_STANDARD.encode([3u8; 32]),
            },
            root_indices: vec![],
            merkle_trees: vec![],
            nullifier_queues: vec![],
        };
        assert!(matches!(
            short.into_bundle(1),
            Err(ClientError::MalformedResponse(_))
        ));
    }

    #[test]
    fn wrong_length_proof_components_are_rejected() {
        let raw = RpcValidityProof {
            compressed_proof: RpcCompressedProof {
                a: BASE64_STANDARD.encode([1u8; 31]),
                b: BASE64_STANDARD.encode([2u8; 64]),
                c: BASE64_STANDARD.encode([3u8; 32]),
            },
            root_indices: vec![0],
            merkle_trees: vec![Pubkey::new_unique().to_string()],
            nullifier_queues: vec![Pubkey::new_unique().to_string()],
        };
        assert!(matches!(
            raw.into_bundle(1),
            Err(ClientError::MalformedResponse(_))
        ));
    }

    #[test]
    fn records_decode_base64_and_base58() {
        let address = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let raw = RpcRecord {
            address: address.to_string(),
            owner: owner.to_string(),
            data: BASE64_STANDARD.encode([0u8, 1, 2]),
        };
        let record = raw.into_record().unwrap();
        assert_eq!(record.address, address);
        assert_eq!(record.owner, owner);
        assert_eq!(record.data, vec![0, 1, 2]);

        let bad = RpcRecord {
            address: "///".to_string(),
            owner: owner.to_string(),
            data: String::new(),
        };
        assert!(matches!(
            bad.into_record(),
            Err(ClientError::MalformedResponse(_))
        ));
    }
}
