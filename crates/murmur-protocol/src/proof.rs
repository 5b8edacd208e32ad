//! Proof generation client.
//!
//! Assembles the witness from the identity, the authentication path, and
//! the signal payload, then drives the injected prover on the blocking
//! pool. Proving is the only long-running operation in the pipeline; the
//! returned task can be cancelled, which simply discards the computation.
//! Nothing is persisted until submission succeeds.

use murmur_crypto::{hash_signal, SignalProver};
use murmur_types::{
    AuthPath, FieldElement, Identity, MurmurError, MurmurResult, PublicSignals, SolidityProof,
    Witness,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Drives the opaque prover for one signaling attempt.
pub struct ProofClient {
    prover: Arc<dyn SignalProver>,
}

impl ProofClient {
    /// Wrap the injected proving backend.
    pub fn new(prover: Arc<dyn SignalProver>) -> Self {
        Self { prover }
    }

    /// Assemble the witness. Rejects a path whose depth does not match the
    /// circuit; a mismatched witness would deterministically fail proving.
    pub fn build_witness(
        &self,
        identity: &Identity,
        path: &AuthPath,
        signal: &[u8],
        external_nullifier: FieldElement,
    ) -> MurmurResult<Witness> {
        let depth = self.prover.depth();
        if path.depth() != depth {
            return Err(MurmurError::ProofGeneration(format!(
                "authentication path has {} levels, circuit expects {}",
                path.depth(),
                depth
            )));
        }

        Ok(Witness {
            trapdoor: identity.trapdoor(),
            nullifier_secret: identity.nullifier_secret(),
            path_elements: path.siblings.iter().map(|(sibling, _)| *sibling).collect(),
            path_index: path.path_index(),
            signal_hash: hash_signal(signal),
            external_nullifier,
        })
    }

    /// Start proving on the blocking pool. The witness moves into the task
    /// and is scrubbed when the task completes or is discarded.
    pub fn spawn_prove(&self, witness: Witness) -> ProvingTask {
        let prover = Arc::clone(&self.prover);
        debug!("starting proof generation (depth {})", prover.depth());

        let handle = tokio::task::spawn_blocking(move || prover.prove(&witness));
        ProvingTask { handle }
    }

    /// Prove and wait for the result.
    pub async fn prove(
        &self,
        witness: Witness,
    ) -> MurmurResult<(SolidityProof, PublicSignals)> {
        self.spawn_prove(witness).wait().await
    }
}

/// An in-flight proving computation.
pub struct ProvingTask {
    handle: JoinHandle<MurmurResult<(SolidityProof, PublicSignals)>>,
}

impl ProvingTask {
    /// Discard the computation. No partial side effects exist to undo.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// Wait for the proof and its public signals.
    pub async fn wait(self) -> MurmurResult<(SolidityProof, PublicSignals)> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => {
                Err(MurmurError::ProofGeneration("proving was cancelled".into()))
            }
            Err(e) => Err(MurmurError::Internal(format!("proving task failed: {}", e))),
        }
    }
}
