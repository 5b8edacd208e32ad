//! One signaling attempt, end to end.

use crate::config::ProtocolConfig;
use crate::gateway::{SubmissionGateway, VerifierTransport};
use crate::group::{CommitmentSource, GroupSnapshot};
use crate::identity::IdentityManager;
use crate::proof::ProofClient;
use crate::signer::MessageSigner;
use murmur_crypto::SignalProver;
use murmur_types::{FieldElement, MurmurResult, SubmissionResult};
use std::sync::Arc;
use tracing::info;

/// Wires the pipeline together for one signaling attempt:
/// identity → snapshot → path → witness → proof → submission.
///
/// All collaborators are injected. Each attempt owns its identity, witness,
/// and proof exclusively; the snapshot is fetched once per attempt and
/// treated as immutable, so no locks are needed anywhere in the pipeline.
pub struct SignalSession {
    identity: IdentityManager,
    group: Arc<dyn CommitmentSource>,
    proof: ProofClient,
    gateway: SubmissionGateway,
    config: ProtocolConfig,
}

impl SignalSession {
    /// Assemble a session from its collaborators.
    pub fn new(
        signer: Arc<dyn MessageSigner>,
        group: Arc<dyn CommitmentSource>,
        prover: Arc<dyn SignalProver>,
        transport: Arc<dyn VerifierTransport>,
        config: ProtocolConfig,
    ) -> Self {
        Self {
            identity: IdentityManager::new(signer),
            group,
            proof: ProofClient::new(prover),
            gateway: SubmissionGateway::new(transport),
            config,
        }
    }

    /// Run one signaling attempt.
    ///
    /// Fatal derivation, membership, and proving failures surface as
    /// errors; verifier rejection and unreachability surface through the
    /// returned [`SubmissionResult`]. A rejection caused by a stale root
    /// calls for a fresh attempt (new snapshot, new path, new proof); an
    /// unreachable verifier can be retried with the same proof by calling
    /// the gateway again.
    pub async fn signal(
        &self,
        payload: &[u8],
        external_nullifier: FieldElement,
    ) -> MurmurResult<SubmissionResult> {
        info!("deriving signaling identity");
        let identity = self
            .identity
            .derive_identity(&self.config.identity_message)
            .await?;

        info!("fetching group snapshot");
        let snapshot = GroupSnapshot::fetch(self.group.as_ref(), self.config.tree_depth).await?;
        let path = snapshot.auth_path(&identity.commitment())?;

        info!("generating membership proof");
        let witness =
            self.proof
                .build_witness(&identity, &path, payload, external_nullifier)?;
        let (proof, signals) = self.proof.prove(witness).await?;

        info!("submitting signal");
        let result = self.gateway.submit(&proof, &signals, payload).await;
        info!("{}", result);
        Ok(result)
    }

    /// The proof client, for callers that drive proving and submission
    /// separately (for example to retry a submission with the same proof).
    pub fn proof_client(&self) -> &ProofClient {
        &self.proof
    }

    /// The submission gateway.
    pub fn gateway(&self) -> &SubmissionGateway {
        &self.gateway
    }

    /// The active configuration.
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }
}
