#![deny(unsafe_code)]
#![warn(clippy::all)]

//! Cryptographic core of the murmur anonymous-signaling protocol.
//!
//! Everything the protocol binds into a proof is hashed with one canonical
//! Poseidon instance over the BN254 scalar field: identity commitments, the
//! membership tree, and nullifiers. The signal circuit proves knowledge of
//! an identity whose commitment sits in the tree and binds the scoped
//! nullifier and the signal hash to that knowledge, without revealing which
//! leaf was opened.

pub mod circuit;
pub mod identity;
pub mod merkle;
pub mod poseidon;
pub mod prover;

pub use circuit::SignalCircuit;
pub use identity::{identity_commitment, identity_from_signature, nullifier_hash};
pub use merkle::{compute_auth_path, MembershipTree};
pub use poseidon::{
    canonical_config, fe_to_fr, fr_to_fe, hash_signal, poseidon_hash1, poseidon_hash2,
    poseidon_hash1_field, poseidon_hash2_fields, poseidon_hash_fields,
};
pub use prover::{
    pack_solidity_proof, unpack_solidity_proof, Groth16Prover, Groth16Verifier, SignalProver,
    SignalVerifier,
};
