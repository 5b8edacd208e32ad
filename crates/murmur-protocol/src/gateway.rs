//! Submission/verification gateway.
//!
//! Packages one proof for the external verifier and interprets the answer.
//! Exactly one request per call: a resend with an unchanged nullifier is a
//! duplicate by construction, so the gateway never retries on its own. An
//! unreachable verifier is a non-fatal outcome the caller may retry with
//! the same proof.

use async_trait::async_trait;
use murmur_types::{
    MurmurError, MurmurResult, PublicSignals, SignalRequest, SolidityProof, SubmissionResult,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Outcome reported by the external verifier for one submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifierResponse {
    /// Proof verified; the nullifier was recorded.
    Accepted,
    /// Proof refused, with the verifier's reason.
    Rejected(String),
}

/// Transport to the external verifier. Implementations perform exactly one
/// request per call and surface transport failure as a network error.
#[async_trait]
pub trait VerifierTransport: Send + Sync {
    /// Submit one signal request and return the verifier's decision.
    async fn submit(&self, request: &SignalRequest) -> MurmurResult<VerifierResponse>;
}

/// HTTP transport posting JSON to the verifier endpoint with a bounded
/// timeout.
pub struct HttpVerifierTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpVerifierTransport {
    /// Build the transport for one verifier endpoint.
    pub fn new(url: impl Into<String>, timeout: Duration) -> MurmurResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MurmurError::Network(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl VerifierTransport for HttpVerifierTransport {
    async fn submit(&self, request: &SignalRequest) -> MurmurResult<VerifierResponse> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| MurmurError::Network(format!("verifier request failed: {}", e)))?;

        if response.status().is_success() {
            return Ok(VerifierResponse::Accepted);
        }

        let reason = response
            .text()
            .await
            .unwrap_or_else(|_| "verification failed".to_string());
        Ok(VerifierResponse::Rejected(reason))
    }
}

/// Packages proofs for the verifier and maps its answers to
/// [`SubmissionResult`].
pub struct SubmissionGateway {
    transport: Arc<dyn VerifierTransport>,
}

impl SubmissionGateway {
    /// Wrap the injected transport.
    pub fn new(transport: Arc<dyn VerifierTransport>) -> Self {
        Self { transport }
    }

    /// Submit one proof. Never retries; never raises on an unreachable
    /// verifier.
    pub async fn submit(
        &self,
        proof: &SolidityProof,
        signals: &PublicSignals,
        signal: &[u8],
    ) -> SubmissionResult {
        let request = SignalRequest {
            signal: signal.to_vec(),
            nullifier_hash: signals.nullifier_hash,
            proof: proof.clone(),
        };

        match self.transport.submit(&request).await {
            Ok(VerifierResponse::Accepted) => {
                info!("signal accepted by verifier");
                SubmissionResult::Accepted
            }
            Ok(VerifierResponse::Rejected(reason)) => {
                warn!("signal rejected by verifier: {}", reason);
                SubmissionResult::Rejected(reason)
            }
            Err(e) => {
                warn!("verifier unreachable: {}", e);
                SubmissionResult::Unreachable
            }
        }
    }
}
