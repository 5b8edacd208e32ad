//! Identity manager: the first stage of a signaling attempt.

use crate::signer::MessageSigner;
use murmur_crypto::identity_from_signature;
use murmur_types::{Identity, MurmurError, MurmurResult};
use std::sync::Arc;
use tracing::debug;

/// Derives the signaling identity from the external signer.
///
/// Derivation is deterministic: the same message against the same signer
/// always reconstructs the same identity, so nothing is ever persisted.
/// The identity is owned exclusively by the attempt that derived it.
pub struct IdentityManager {
    signer: Arc<dyn MessageSigner>,
}

impl IdentityManager {
    /// Wrap the injected signer collaborator.
    pub fn new(signer: Arc<dyn MessageSigner>) -> Self {
        Self { signer }
    }

    /// Derive the identity for one signaling attempt.
    pub async fn derive_identity(&self, message: &str) -> MurmurResult<Identity> {
        if message.is_empty() {
            return Err(MurmurError::IdentityDerivation(
                "identity message is empty".into(),
            ));
        }

        let signature = self.signer.sign_message(message).await.map_err(|e| {
            MurmurError::IdentityDerivation(format!("signer did not sign: {}", e))
        })?;

        let identity = identity_from_signature(&signature)?;
        debug!("derived signaling identity {}", identity.commitment());
        Ok(identity)
    }
}
