//! Canonical Poseidon hash for the signaling protocol.
//!
//! One configuration is shared by native hashing and the circuit gadget so
//! commitments, tree nodes, and nullifiers computed outside the circuit
//! match what the circuit recomputes. Any divergence here is an integration
//! bug with the verifier, not a recoverable runtime condition.
//!
//! ## Parameters (BN254 scalar field)
//! - Width: 3 (rate 2, capacity 1)
//! - Full rounds: 8, partial rounds: 57
//! - S-box: x^5
//! - Round constants: Grain LFSR (arkworks standard)

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::{
    poseidon::{find_poseidon_ark_and_mds, PoseidonConfig, PoseidonSponge},
    CryptographicSponge,
};
use ark_ff::PrimeField;
use ark_serialize::CanonicalSerialize;
use murmur_types::FieldElement;
use std::sync::OnceLock;

static CANONICAL_CONFIG: OnceLock<PoseidonConfig<Fr>> = OnceLock::new();

/// The canonical Poseidon configuration. Thread-safe singleton.
pub fn canonical_config() -> &'static PoseidonConfig<Fr> {
    CANONICAL_CONFIG.get_or_init(|| {
        let rate = 2;
        let alpha = 5u64;
        let full_rounds = 8;
        let partial_rounds = 57;
        let field_bits = 254;

        let (ark, mds) = find_poseidon_ark_and_mds::<Fr>(
            field_bits,
            rate,
            full_rounds,
            partial_rounds,
            0, // skip_matrices
        );

        PoseidonConfig {
            full_rounds: full_rounds as usize,
            partial_rounds: partial_rounds as usize,
            alpha,
            ark,
            mds,
            rate,
            capacity: 1,
        }
    })
}

/// Hash a sequence of field elements; returns the first squeezed element.
pub fn poseidon_hash_fields(inputs: &[Fr]) -> Fr {
    let config = canonical_config();
    let mut sponge = PoseidonSponge::new(config);
    for input in inputs {
        sponge.absorb(input);
    }
    let output: Vec<Fr> = sponge.squeeze_field_elements(1);
    output[0]
}

/// Arity-2 hash. The node-combining function of the membership tree and
/// the commitment/nullifier constructor.
pub fn poseidon_hash2_fields(left: Fr, right: Fr) -> Fr {
    poseidon_hash_fields(&[left, right])
}

/// Arity-1 hash. Defines the canonical empty-leaf value.
pub fn poseidon_hash1_field(input: Fr) -> Fr {
    poseidon_hash_fields(&[input])
}

/// Convert an interchange field element into the scalar field (mod order).
pub fn fe_to_fr(fe: &FieldElement) -> Fr {
    Fr::from_le_bytes_mod_order(fe.as_bytes())
}

/// Canonical little-endian encoding of a scalar.
pub fn fr_to_fe(fr: &Fr) -> FieldElement {
    let mut bytes = [0u8; 32];
    fr.serialize_compressed(&mut bytes[..])
        .expect("Fr serialization failed");
    FieldElement::from_bytes(bytes)
}

/// Arity-2 hash over interchange field elements.
pub fn poseidon_hash2(left: &FieldElement, right: &FieldElement) -> FieldElement {
    fr_to_fe(&poseidon_hash2_fields(fe_to_fr(left), fe_to_fr(right)))
}

/// Arity-1 hash over an interchange field element.
pub fn poseidon_hash1(input: &FieldElement) -> FieldElement {
    fr_to_fe(&poseidon_hash1_field(fe_to_fr(input)))
}

/// Hash an opaque signal payload into the field. The digest binds the
/// payload to the proof so it cannot be replayed with different content.
pub fn hash_signal(signal: &[u8]) -> FieldElement {
    let digest = blake3::hash(signal);
    fr_to_fe(&Fr::from_le_bytes_mod_order(digest.as_bytes()))
}
