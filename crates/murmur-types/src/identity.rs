//! The signaling identity.

use crate::field::FieldElement;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// A signaling identity.
///
/// `trapdoor` and `nullifier_secret` are private; `commitment` is the public
/// leaf registered in the group tree. One identity is derived per signaling
/// session, held in memory only, and scrubbed on drop. It must never be
/// persisted, transmitted, or logged.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Identity {
    trapdoor: FieldElement,
    nullifier_secret: FieldElement,
    commitment: FieldElement,
}

impl Identity {
    /// Assemble an identity from its derived components.
    pub fn new(
        trapdoor: FieldElement,
        nullifier_secret: FieldElement,
        commitment: FieldElement,
    ) -> Self {
        Self {
            trapdoor,
            nullifier_secret,
            commitment,
        }
    }

    /// Private trapdoor component.
    pub fn trapdoor(&self) -> FieldElement {
        self.trapdoor
    }

    /// Private nullifier-secret component; combined with an external
    /// nullifier it yields the public nullifier hash.
    pub fn nullifier_secret(&self) -> FieldElement {
        self.nullifier_secret
    }

    /// Public commitment registered in the group tree.
    pub fn commitment(&self) -> FieldElement {
        self.commitment
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Secrets stay out of logs.
        write!(f, "Identity(commitment: {})", self.commitment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secrets() {
        let identity = Identity::new(
            FieldElement::from_bytes([0x11; 32]),
            FieldElement::from_bytes([0x22; 32]),
            FieldElement::from_bytes([0x33; 32]),
        );

        let rendered = format!("{:?}", identity);
        assert!(rendered.contains(&"33".repeat(32)));
        assert!(!rendered.contains(&"11".repeat(32)));
        assert!(!rendered.contains(&"22".repeat(32)));
    }
}
