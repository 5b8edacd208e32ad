//! Group snapshot source and membership service.
//!
//! The commitment feed is an external collaborator; staleness is a normal
//! operating condition there, never corruption. One signaling attempt
//! fetches the snapshot once and reuses the resulting immutable tree for
//! path computation, proving, and submission.

use async_trait::async_trait;
use murmur_crypto::MembershipTree;
use murmur_types::{AuthPath, FieldElement, MurmurError, MurmurResult};
use tracing::debug;

/// Source of the ordered commitment snapshot for the group.
#[async_trait]
pub trait CommitmentSource: Send + Sync {
    /// Fetch the current ordered commitment list.
    async fn fetch_commitments(&self) -> MurmurResult<Vec<FieldElement>>;
}

/// Fixed in-memory snapshot source.
pub struct StaticCommitmentSource {
    commitments: Vec<FieldElement>,
}

impl StaticCommitmentSource {
    /// Wrap a fixed commitment list.
    pub fn new(commitments: Vec<FieldElement>) -> Self {
        Self { commitments }
    }
}

#[async_trait]
impl CommitmentSource for StaticCommitmentSource {
    async fn fetch_commitments(&self) -> MurmurResult<Vec<FieldElement>> {
        Ok(self.commitments.clone())
    }
}

/// Snapshot source over an HTTP endpoint serving a JSON array of hex field
/// elements in registration order.
pub struct HttpCommitmentSource {
    client: reqwest::Client,
    url: String,
}

impl HttpCommitmentSource {
    /// Point at the commitment feed endpoint.
    pub fn new(url: impl Into<String>) -> MurmurResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| MurmurError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl CommitmentSource for HttpCommitmentSource {
    async fn fetch_commitments(&self) -> MurmurResult<Vec<FieldElement>> {
        debug!("fetching group commitments from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| MurmurError::Network(format!("commitment fetch failed: {}", e)))?;

        response
            .json::<Vec<FieldElement>>()
            .await
            .map_err(|e| MurmurError::Serialization(format!("invalid commitment feed: {}", e)))
    }
}

/// Immutable view of the registered group for one signaling attempt.
pub struct GroupSnapshot {
    tree: MembershipTree,
}

impl GroupSnapshot {
    /// Build the snapshot tree from an already-fetched commitment list.
    pub fn new(commitments: &[FieldElement], depth: usize) -> MurmurResult<Self> {
        let tree = MembershipTree::build(commitments, depth)?;
        debug!(
            "group snapshot: {} commitments, root {}",
            tree.len(),
            tree.root()
        );
        Ok(Self { tree })
    }

    /// Fetch from the source and build in one step.
    pub async fn fetch(source: &dyn CommitmentSource, depth: usize) -> MurmurResult<Self> {
        let commitments = source.fetch_commitments().await?;
        Self::new(&commitments, depth)
    }

    /// Root of this snapshot.
    pub fn root(&self) -> FieldElement {
        self.tree.root()
    }

    /// Authentication path for a registered commitment. Fatal when the
    /// commitment was never registered.
    pub fn auth_path(&self, commitment: &FieldElement) -> MurmurResult<AuthPath> {
        self.tree.auth_path(commitment)
    }

    /// Number of registered commitments in this snapshot.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// True when the snapshot holds no commitments.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use murmur_crypto::{fr_to_fe, MembershipTree};

    fn fe(n: u64) -> FieldElement {
        fr_to_fe(&ark_bn254::Fr::from(n))
    }

    #[tokio::test]
    async fn static_source_round_trips() {
        let commitments = vec![fe(1), fe(2), fe(3)];
        let source = StaticCommitmentSource::new(commitments.clone());

        assert_eq!(source.fetch_commitments().await.unwrap(), commitments);
    }

    #[tokio::test]
    async fn snapshot_paths_verify_against_root() {
        let commitments = vec![fe(1), fe(2), fe(3), fe(4)];
        let source = StaticCommitmentSource::new(commitments.clone());
        let snapshot = GroupSnapshot::fetch(&source, 2).await.unwrap();

        for commitment in &commitments {
            let path = snapshot.auth_path(commitment).unwrap();
            assert_eq!(path.root, snapshot.root());
            assert!(MembershipTree::verify_path(commitment, &path));
        }
    }

    #[tokio::test]
    async fn unregistered_commitment_is_fatal() {
        let snapshot = GroupSnapshot::new(&[fe(1), fe(2)], 2).unwrap();

        let err = snapshot.auth_path(&fe(9)).unwrap_err();
        assert!(matches!(err, MurmurError::MembershipNotFound(_)));
    }
}
