//! The external signer collaborator.
//!
//! The pipeline only needs one capability from a wallet: sign a
//! human-readable message. [`LocalSigner`] is the in-process
//! implementation over a raw secp256k1 key, producing the 65-byte
//! Ethereum personal-message signature wallets produce. RFC 6979 makes the
//! signature, and therefore the derived identity, deterministic.

use async_trait::async_trait;
use murmur_types::{MurmurError, MurmurResult};
use secp256k1::{Message, Secp256k1, SecretKey};
use sha3::{Digest, Keccak256};

thread_local! {
    static SECP256K1_CTX: Secp256k1<secp256k1::All> = Secp256k1::new();
}

/// Wallet-like collaborator that signs messages on request.
#[async_trait]
pub trait MessageSigner: Send + Sync {
    /// Request a signature over `message`. Fails when no signer is
    /// available or the user declines.
    async fn sign_message(&self, message: &str) -> MurmurResult<Vec<u8>>;
}

/// Ethereum personal-message digest: keccak256 of the prefixed message.
pub fn personal_message_hash(message: &[u8]) -> [u8; 32] {
    let prefix = format!("\x19Ethereum Signed Message:\n{}", message.len());

    let mut hasher = Keccak256::new();
    hasher.update(prefix.as_bytes());
    hasher.update(message);

    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());
    hash
}

/// In-process signer over a raw secp256k1 private key.
pub struct LocalSigner {
    secret_key: SecretKey,
}

impl LocalSigner {
    /// Wrap a raw 32-byte private key.
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> MurmurResult<Self> {
        let secret_key =
            SecretKey::from_slice(bytes).map_err(|e| MurmurError::Signer(e.to_string()))?;
        Ok(Self { secret_key })
    }

    /// Fresh random key, for tests and throwaway sessions.
    pub fn random() -> Self {
        Self {
            secret_key: SecretKey::new(&mut rand::thread_rng()),
        }
    }
}

#[async_trait]
impl MessageSigner for LocalSigner {
    async fn sign_message(&self, message: &str) -> MurmurResult<Vec<u8>> {
        let hash = personal_message_hash(message.as_bytes());
        let digest =
            Message::from_digest_slice(&hash).map_err(|e| MurmurError::Signer(e.to_string()))?;

        let (recovery_id, signature) = SECP256K1_CTX.with(|ctx| {
            ctx.sign_ecdsa_recoverable(&digest, &self.secret_key)
                .serialize_compact()
        });

        // r || s || v, the layout wallets return from personal_sign.
        let mut bytes = Vec::with_capacity(65);
        bytes.extend_from_slice(&signature);
        bytes.push(recovery_id.to_i32() as u8 + 27);
        Ok(bytes)
    }
}
