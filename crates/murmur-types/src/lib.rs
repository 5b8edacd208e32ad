#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

//! Shared types for the murmur anonymous-signaling protocol.
//!
//! A participant proves membership in a registered group and emits one
//! authorized, unlinkable signal per membership scope. This crate holds the
//! data model shared by the cryptographic core and the protocol components:
//! field elements, identities, witnesses, public signals, wire shapes, and
//! the error taxonomy.

pub mod error;
pub mod field;
pub mod identity;
pub mod merkle;
pub mod signal;

pub use error::{MurmurError, MurmurResult};
pub use field::FieldElement;
pub use identity::Identity;
pub use merkle::{AuthPath, Direction};
pub use signal::{
    NewSignal, PublicSignals, SignalRequest, SolidityProof, SubmissionResult, Witness,
};

/// Size in bytes of a canonically serialized BN254 scalar.
pub const FIELD_ELEMENT_SIZE: usize = 32;

/// Default depth of the membership Merkle tree (capacity 2^20 identities).
pub const DEFAULT_TREE_DEPTH: usize = 20;

/// Number of 32-byte words in a Solidity-encoded Groth16 proof.
pub const SOLIDITY_PROOF_WORDS: usize = 8;
