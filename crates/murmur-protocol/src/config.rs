use murmur_crypto::{Groth16Prover, Groth16Verifier};
use murmur_types::{MurmurError, MurmurResult, DEFAULT_TREE_DEPTH};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Protocol-side configuration for one deployment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Depth of the membership tree the group is registered under.
    pub tree_depth: usize,

    /// Message presented to the external signer; the identity is derived
    /// from its signature, so changing it changes every derived identity.
    pub identity_message: String,

    /// Endpoint the submission gateway posts proofs to.
    pub verifier_url: String,

    /// Bound on one submission round trip before it resolves unreachable.
    pub submit_timeout_secs: u64,

    /// Compressed proving-key artifact, if proving locally.
    pub proving_key_path: Option<PathBuf>,

    /// Compressed verifying-key artifact, if verifying locally.
    pub verifying_key_path: Option<PathBuf>,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            tree_depth: DEFAULT_TREE_DEPTH,
            identity_message: "Sign this message to create your identity!".to_string(),
            verifier_url: "http://127.0.0.1:3000/api/signal".to_string(),
            submit_timeout_secs: 30,
            proving_key_path: None,
            verifying_key_path: None,
        }
    }
}

impl ProtocolConfig {
    /// Override the tree depth.
    pub fn with_tree_depth(mut self, depth: usize) -> Self {
        self.tree_depth = depth;
        self
    }

    /// Override the verifier endpoint.
    pub fn with_verifier_url(mut self, url: impl Into<String>) -> Self {
        self.verifier_url = url.into();
        self
    }

    /// Override the submission timeout.
    pub fn with_submit_timeout_secs(mut self, secs: u64) -> Self {
        self.submit_timeout_secs = secs;
        self
    }

    /// Override the identity message.
    pub fn with_identity_message(mut self, message: impl Into<String>) -> Self {
        self.identity_message = message.into();
        self
    }

    /// Point at proving/verifying key artifacts on disk.
    pub fn with_artifacts(
        mut self,
        proving_key: impl Into<PathBuf>,
        verifying_key: impl Into<PathBuf>,
    ) -> Self {
        self.proving_key_path = Some(proving_key.into());
        self.verifying_key_path = Some(verifying_key.into());
        self
    }

    /// Submission timeout as a [`Duration`].
    pub fn submit_timeout(&self) -> Duration {
        Duration::from_secs(self.submit_timeout_secs)
    }

    /// Load the configured proving-key artifact.
    pub fn load_prover(&self) -> MurmurResult<Groth16Prover> {
        let path = self.proving_key_path.as_ref().ok_or_else(|| {
            MurmurError::Config("proving key path is not configured".into())
        })?;
        let bytes = std::fs::read(path).map_err(|e| {
            MurmurError::Config(format!("failed to read proving key {}: {}", path.display(), e))
        })?;
        Groth16Prover::from_artifact(&bytes, self.tree_depth)
    }

    /// Load the configured verifying-key artifact.
    pub fn load_verifier(&self) -> MurmurResult<Groth16Verifier> {
        let path = self.verifying_key_path.as_ref().ok_or_else(|| {
            MurmurError::Config("verifying key path is not configured".into())
        })?;
        let bytes = std::fs::read(path).map_err(|e| {
            MurmurError::Config(format!(
                "failed to read verifying key {}: {}",
                path.display(),
                e
            ))
        })?;
        Groth16Verifier::from_artifact(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol_conventions() {
        let config = ProtocolConfig::default();
        assert_eq!(config.tree_depth, DEFAULT_TREE_DEPTH);
        assert_eq!(
            config.identity_message,
            "Sign this message to create your identity!"
        );
        assert_eq!(config.submit_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn builders_override_fields() {
        let config = ProtocolConfig::default()
            .with_tree_depth(4)
            .with_verifier_url("http://verifier.local/api/signal")
            .with_submit_timeout_secs(5);

        assert_eq!(config.tree_depth, 4);
        assert_eq!(config.verifier_url, "http://verifier.local/api/signal");
        assert_eq!(config.submit_timeout_secs, 5);
    }

    #[test]
    fn missing_artifacts_are_config_errors() {
        let config = ProtocolConfig::default();
        assert!(matches!(
            config.load_prover().unwrap_err(),
            MurmurError::Config(_)
        ));
        assert!(matches!(
            config.load_verifier().unwrap_err(),
            MurmurError::Config(_)
        ));
    }
}
