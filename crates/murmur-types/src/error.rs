//! Error taxonomy and result alias.

use thiserror::Error;

/// Error taxonomy for the signaling pipeline.
///
/// `IdentityDerivation`, `MembershipNotFound`, and `ProofGeneration` are
/// fatal for the current attempt. Verifier rejection and unreachability are
/// not errors; they surface through
/// [`SubmissionResult`](crate::signal::SubmissionResult).
#[derive(Error, Debug)]
pub enum MurmurError {
    /// The external signer declined, is unavailable, or produced unusable
    /// input for identity derivation.
    #[error("Identity derivation error: {0}")]
    IdentityDerivation(String),

    /// The commitment is absent from the group snapshot; the identity was
    /// never registered.
    #[error("Membership not found: {0}")]
    MembershipNotFound(String),

    /// The prover rejected the witness. Retrying the same witness is
    /// pointless; rebuild it from a fresh authentication path.
    #[error("Proof generation error: {0}")]
    ProofGeneration(String),

    /// The signer collaborator failed below the identity layer.
    #[error("Signer error: {0}")]
    Signer(String),

    /// A network collaborator could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// Encoding or decoding of a wire or artifact format failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invariant violation inside the core.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the workspace.
pub type MurmurResult<T> = Result<T, MurmurError>;
