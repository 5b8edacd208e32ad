//! The signal circuit.
//!
//! Proves, for public inputs `(root, nullifier_hash, external_nullifier,
//! signal_hash)`, knowledge of `(trapdoor, nullifier_secret)` and a path
//! such that the commitment `Poseidon2(trapdoor, nullifier_secret)` opens
//! to `root`, and `nullifier_hash = Poseidon2(external_nullifier,
//! nullifier_secret)`. The signal hash is constrained into the statement so
//! a proof cannot be reused for a different payload.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::constraints::CryptographicSpongeVar;
use ark_crypto_primitives::sponge::poseidon::constraints::PoseidonSpongeVar;
use ark_r1cs_std::{
    alloc::AllocVar, boolean::Boolean, eq::EqGadget, fields::fp::FpVar, select::CondSelectGadget,
};
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use crate::poseidon::{canonical_config, poseidon_hash2_fields};

/// Witness and public assignments for one signaling proof. `empty` builds
/// the unassigned shape used for key generation.
#[derive(Clone)]
pub struct SignalCircuit {
    trapdoor: Option<Fr>,
    nullifier_secret: Option<Fr>,
    path_elements: Vec<Option<Fr>>,
    path_index: Vec<Option<bool>>,
    merkle_root: Option<Fr>,
    nullifier_hash: Option<Fr>,
    external_nullifier: Option<Fr>,
    signal_hash: Option<Fr>,
}

impl SignalCircuit {
    /// Fully assigned circuit. The nullifier hash is recomputed here so the
    /// public assignment can never drift from the witness.
    pub fn new(
        trapdoor: Fr,
        nullifier_secret: Fr,
        path_elements: Vec<Fr>,
        path_index: Vec<bool>,
        merkle_root: Fr,
        external_nullifier: Fr,
        signal_hash: Fr,
    ) -> Self {
        let nullifier_hash = poseidon_hash2_fields(external_nullifier, nullifier_secret);

        Self {
            trapdoor: Some(trapdoor),
            nullifier_secret: Some(nullifier_secret),
            path_elements: path_elements.into_iter().map(Some).collect(),
            path_index: path_index.into_iter().map(Some).collect(),
            merkle_root: Some(merkle_root),
            nullifier_hash: Some(nullifier_hash),
            external_nullifier: Some(external_nullifier),
            signal_hash: Some(signal_hash),
        }
    }

    /// Unassigned circuit of the given depth, for key generation.
    pub fn empty(depth: usize) -> Self {
        Self {
            trapdoor: None,
            nullifier_secret: None,
            path_elements: vec![None; depth],
            path_index: vec![None; depth],
            merkle_root: None,
            nullifier_hash: None,
            external_nullifier: None,
            signal_hash: None,
        }
    }

    /// Tree depth this circuit shape was built for.
    pub fn depth(&self) -> usize {
        self.path_elements.len()
    }
}

impl ConstraintSynthesizer<Fr> for SignalCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        let trapdoor = FpVar::new_witness(cs.clone(), || {
            self.trapdoor.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let nullifier_secret = FpVar::new_witness(cs.clone(), || {
            self.nullifier_secret
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        let mut path_elements = Vec::with_capacity(self.path_elements.len());
        for sibling in &self.path_elements {
            path_elements.push(FpVar::new_witness(cs.clone(), || {
                sibling.ok_or(SynthesisError::AssignmentMissing)
            })?);
        }

        let mut path_index = Vec::with_capacity(self.path_index.len());
        for is_right in &self.path_index {
            path_index.push(Boolean::new_witness(cs.clone(), || {
                is_right.ok_or(SynthesisError::AssignmentMissing)
            })?);
        }

        let merkle_root = FpVar::new_input(cs.clone(), || {
            self.merkle_root.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let nullifier_hash = FpVar::new_input(cs.clone(), || {
            self.nullifier_hash.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let external_nullifier = FpVar::new_input(cs.clone(), || {
            self.external_nullifier
                .ok_or(SynthesisError::AssignmentMissing)
        })?;

        let signal_hash = FpVar::new_input(cs.clone(), || {
            self.signal_hash.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let commitment =
            poseidon_hash_circuit(cs.clone(), &[trapdoor.clone(), nullifier_secret.clone()])?;

        let computed_root =
            compute_merkle_root_circuit(cs.clone(), &commitment, &path_elements, &path_index)?;
        computed_root.enforce_equal(&merkle_root)?;

        let computed_nullifier = poseidon_hash_circuit(
            cs.clone(),
            &[external_nullifier.clone(), nullifier_secret.clone()],
        )?;
        computed_nullifier.enforce_equal(&nullifier_hash)?;

        // Square the signal hash so the wire stays constrained in the
        // statement and cannot be stripped by a malleated proof.
        let _signal_hash_squared = &signal_hash * &signal_hash;

        Ok(())
    }
}

/// Poseidon sponge gadget matching the native canonical configuration.
pub fn poseidon_hash_circuit(
    cs: ConstraintSystemRef<Fr>,
    inputs: &[FpVar<Fr>],
) -> Result<FpVar<Fr>, SynthesisError> {
    let config = canonical_config();

    let mut sponge = PoseidonSpongeVar::new(cs, config);
    sponge.absorb(&inputs)?;

    let output = sponge.squeeze_field_elements(1)?;
    Ok(output[0].clone())
}

/// Fold a leaf up the tree inside the circuit. `is_right` selects the
/// running node into the right slot of each pairing.
pub fn compute_merkle_root_circuit(
    cs: ConstraintSystemRef<Fr>,
    leaf: &FpVar<Fr>,
    path_elements: &[FpVar<Fr>],
    path_index: &[Boolean<Fr>],
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut current = leaf.clone();

    for (sibling, is_right) in path_elements.iter().zip(path_index.iter()) {
        let left = FpVar::conditionally_select(is_right, sibling, &current)?;
        let right = FpVar::conditionally_select(is_right, &current, sibling)?;

        current = poseidon_hash_circuit(cs.clone(), &[left, right])?;
    }

    Ok(current)
}
