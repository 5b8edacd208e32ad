//! Witnesses, public signals, wire shapes, and submission outcomes.

use crate::field::FieldElement;
use crate::{FIELD_ELEMENT_SIZE, SOLIDITY_PROOF_WORDS};
use serde::{Deserialize, Serialize};
use serde_with::hex::Hex;
use serde_with::serde_as;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Private inputs to the signal circuit.
///
/// Held in memory for the duration of one proving call and scrubbed on
/// drop. Leaking a witness deanonymizes the signaler, so it is never
/// logged, serialized, or transmitted.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Witness {
    /// Private trapdoor component of the identity.
    pub trapdoor: FieldElement,
    /// Private nullifier-secret component of the identity.
    pub nullifier_secret: FieldElement,
    /// Sibling hashes of the authentication path, leaf first.
    pub path_elements: Vec<FieldElement>,
    /// Per-level flags, `true` where the leaf-side node is the right child.
    pub path_index: Vec<bool>,
    /// Hash of the signal payload bound into the proof.
    pub signal_hash: FieldElement,
    /// Scope value separating signaling rounds.
    pub external_nullifier: FieldElement,
}

impl fmt::Debug for Witness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Witness(depth: {})", self.path_elements.len())
    }
}

/// Public signals accompanying a proof. Reveal nothing about the identity
/// beyond what the nullifier hash is designed to reveal: whether the same
/// identity signals twice in the same scope.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicSignals {
    /// Root of the group snapshot the proof was built against.
    pub root: FieldElement,
    /// Scoped nullifier, the replay-prevention handle.
    pub nullifier_hash: FieldElement,
    /// Hash of the signal payload.
    pub signal_hash: FieldElement,
    /// Scope value the nullifier hash was derived under.
    pub external_nullifier: FieldElement,
}

/// Groth16 proof packed into the 8-word big-endian layout Solidity
/// verifiers consume: A.x, A.y, B.x.c1, B.x.c0, B.y.c1, B.y.c0, C.x, C.y.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolidityProof(
    #[serde_as(as = "[Hex; SOLIDITY_PROOF_WORDS]")]
    pub  [[u8; FIELD_ELEMENT_SIZE]; SOLIDITY_PROOF_WORDS],
);

/// Request shape submitted to the external verifier. The verifier holds the
/// accepted roots and the scope, so only the payload, the nullifier hash,
/// and the proof travel.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignalRequest {
    /// Raw signal payload bytes.
    #[serde_as(as = "Hex")]
    pub signal: Vec<u8>,
    /// Scoped nullifier from the public signals.
    pub nullifier_hash: FieldElement,
    /// Solidity-encoded proof.
    pub proof: SolidityProof,
}

/// Outcome of one submission to the external verifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionResult {
    /// The verifier accepted the proof and recorded the nullifier.
    Accepted,
    /// The verifier rejected the proof; the reason is surfaced verbatim.
    Rejected(String),
    /// The verifier did not answer. Resending the same proof is safe: the
    /// nullifier check makes resubmission idempotent.
    Unreachable,
}

impl SubmissionResult {
    /// True when the signal landed.
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmissionResult::Accepted)
    }

    /// True when retrying with the same proof is safe and sensible.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmissionResult::Unreachable)
    }
}

impl fmt::Display for SubmissionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionResult::Accepted => write!(f, "signal accepted"),
            SubmissionResult::Rejected(reason) => write!(f, "signal rejected: {}", reason),
            SubmissionResult::Unreachable => write!(f, "verifier unreachable"),
        }
    }
}

/// Accepted-signal notification from the external verifier's event stream.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSignal {
    /// Raw signal bytes as the verifier recorded them.
    #[serde_as(as = "Hex")]
    pub signal: Vec<u8>,
}

impl NewSignal {
    /// Decode the payload as text: trailing NUL padding is stripped (the
    /// bytes32 convention) and invalid UTF-8 is replaced.
    pub fn decoded_text(&self) -> String {
        let end = self
            .signal
            .iter()
            .rposition(|b| *b != 0)
            .map_or(0, |i| i + 1);
        String::from_utf8_lossy(&self.signal[..end]).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn witness_debug_is_redacted() {
        let witness = Witness {
            trapdoor: FieldElement::from_bytes([0x11; 32]),
            nullifier_secret: FieldElement::from_bytes([0x22; 32]),
            path_elements: vec![FieldElement::zero(); 4],
            path_index: vec![false; 4],
            signal_hash: FieldElement::zero(),
            external_nullifier: FieldElement::zero(),
        };

        let rendered = format!("{:?}", witness);
        assert_eq!(rendered, "Witness(depth: 4)");
    }

    #[test]
    fn submission_result_classification() {
        assert!(SubmissionResult::Accepted.is_accepted());
        assert!(!SubmissionResult::Rejected("invalid proof".into()).is_retryable());
        assert!(SubmissionResult::Unreachable.is_retryable());
    }

    #[test]
    fn new_signal_decodes_padded_text() {
        let mut bytes = b"Hello world!!!".to_vec();
        bytes.resize(32, 0);
        let event = NewSignal { signal: bytes };
        assert_eq!(event.decoded_text(), "Hello world!!!");
    }

    #[test]
    fn signal_request_serializes_hex() {
        let request = SignalRequest {
            signal: b"hi".to_vec(),
            nullifier_hash: FieldElement::from_bytes([0x01; 32]),
            proof: SolidityProof([[0u8; 32]; 8]),
        };

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("6869"));
        let back: SignalRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.signal, b"hi");
    }
}
