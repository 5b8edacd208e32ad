//! Deterministic identity derivation.
//!
//! The two secret components are derived from an external signature with
//! domain-separated BLAKE3 key derivation, so the same signed message always
//! reconstructs the same identity and nothing needs to be stored. The public
//! commitment is the Poseidon opening of the two secrets and is the only
//! part that ever leaves the process (at registration time).

use crate::poseidon::{fe_to_fr, fr_to_fe, poseidon_hash2_fields};
use ark_bn254::Fr;
use ark_ff::PrimeField;
use murmur_types::{FieldElement, Identity, MurmurError, MurmurResult};

const TRAPDOOR_CONTEXT: &str = "MURMUR-v1-identity-trapdoor";
const NULLIFIER_CONTEXT: &str = "MURMUR-v1-identity-nullifier";

fn derive_field(context: &str, seed: &[u8]) -> Fr {
    let mut hasher = blake3::Hasher::new_derive_key(context);
    hasher.update(seed);
    Fr::from_le_bytes_mod_order(hasher.finalize().as_bytes())
}

/// Derive a signaling identity from the bytes of an external signature.
pub fn identity_from_signature(signature: &[u8]) -> MurmurResult<Identity> {
    if signature.is_empty() {
        return Err(MurmurError::IdentityDerivation(
            "signature input is empty".into(),
        ));
    }

    let trapdoor = derive_field(TRAPDOOR_CONTEXT, signature);
    let nullifier_secret = derive_field(NULLIFIER_CONTEXT, signature);
    let commitment = poseidon_hash2_fields(trapdoor, nullifier_secret);

    Ok(Identity::new(
        fr_to_fe(&trapdoor),
        fr_to_fe(&nullifier_secret),
        fr_to_fe(&commitment),
    ))
}

/// Commitment published at registration: `Poseidon2(trapdoor, nullifier_secret)`.
pub fn identity_commitment(
    trapdoor: &FieldElement,
    nullifier_secret: &FieldElement,
) -> FieldElement {
    fr_to_fe(&poseidon_hash2_fields(
        fe_to_fr(trapdoor),
        fe_to_fr(nullifier_secret),
    ))
}

/// Scoped nullifier: `Poseidon2(external_nullifier, nullifier_secret)`.
///
/// This value is public. The registry uses it to detect a repeat signal
/// from the same identity within one scope; it reveals nothing about the
/// trapdoor or the leaf that was opened.
pub fn nullifier_hash(
    external_nullifier: &FieldElement,
    nullifier_secret: &FieldElement,
) -> FieldElement {
    fr_to_fe(&poseidon_hash2_fields(
        fe_to_fr(external_nullifier),
        fe_to_fr(nullifier_secret),
    ))
}
