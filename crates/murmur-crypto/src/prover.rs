//! Proving backend behind a capability interface.
//!
//! The protocol drives an opaque prover/verifier pair; [`SignalProver`] and
//! [`SignalVerifier`] are the seams, [`Groth16Prover`]/[`Groth16Verifier`]
//! the concrete BN254 backend. Keys travel as compressed arkworks
//! artifacts; proofs travel in the 8-word Solidity packing the external
//! verifier consumes.

use ark_bn254::{Bn254, Fq, Fq2, Fr, G1Affine, G2Affine};
use ark_ff::{BigInteger, PrimeField};
use ark_groth16::{Groth16, PreparedVerifyingKey, Proof, ProvingKey, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::{CircuitSpecificSetupSNARK, SNARK};
use ark_std::rand::thread_rng;
use murmur_types::{MurmurError, MurmurResult, PublicSignals, SolidityProof, Witness};

use crate::circuit::SignalCircuit;
use crate::poseidon::{fe_to_fr, fr_to_fe, poseidon_hash2_fields};

/// Capability interface over the opaque proving backend.
pub trait SignalProver: Send + Sync {
    /// Tree depth the backing circuit was keyed for.
    fn depth(&self) -> usize;

    /// Produce a proof and its public signals for one witness. Proving is
    /// CPU-bound and deterministic in its failure modes: a rejected witness
    /// fails identically on retry, so callers must rebuild the witness
    /// instead of retrying.
    fn prove(&self, witness: &Witness) -> MurmurResult<(SolidityProof, PublicSignals)>;
}

/// Capability interface over proof verification.
pub trait SignalVerifier: Send + Sync {
    /// Check a packed proof against its public signals.
    fn verify(&self, proof: &SolidityProof, signals: &PublicSignals) -> MurmurResult<bool>;
}

/// Groth16 prover over the signal circuit.
#[derive(Debug)]
pub struct Groth16Prover {
    proving_key: ProvingKey<Bn254>,
    depth: usize,
}

/// Groth16 verifier over the signal circuit.
#[derive(Debug)]
pub struct Groth16Verifier {
    verifying_key: VerifyingKey<Bn254>,
    prepared_vk: PreparedVerifyingKey<Bn254>,
}

impl Groth16Prover {
    /// Development-mode key generation for a circuit of the given depth.
    /// Production deployments load artifacts produced by a trusted setup.
    pub fn setup(depth: usize) -> MurmurResult<(Groth16Prover, Groth16Verifier)> {
        let mut rng = thread_rng();

        let (pk, vk) =
            Groth16::<Bn254>::circuit_specific_setup(SignalCircuit::empty(depth), &mut rng)
                .map_err(|e| MurmurError::ProofGeneration(format!("key setup failed: {}", e)))?;

        let verifier = Groth16Verifier::from_verifying_key(vk)?;
        Ok((
            Self {
                proving_key: pk,
                depth,
            },
            verifier,
        ))
    }

    /// Load a proving key from its compressed artifact bytes.
    pub fn from_artifact(bytes: &[u8], depth: usize) -> MurmurResult<Self> {
        let proving_key = ProvingKey::<Bn254>::deserialize_compressed(bytes)
            .map_err(|e| MurmurError::Serialization(format!("invalid proving key: {}", e)))?;
        Ok(Self { proving_key, depth })
    }

    /// Compressed artifact bytes of the proving key.
    pub fn export_artifact(&self) -> MurmurResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.proving_key
            .serialize_compressed(&mut bytes)
            .map_err(|e| MurmurError::Serialization(format!("proving key export: {}", e)))?;
        Ok(bytes)
    }
}

impl SignalProver for Groth16Prover {
    fn depth(&self) -> usize {
        self.depth
    }

    fn prove(&self, witness: &Witness) -> MurmurResult<(SolidityProof, PublicSignals)> {
        if witness.path_elements.len() != self.depth || witness.path_index.len() != self.depth {
            return Err(MurmurError::ProofGeneration(format!(
                "authentication path has {} levels, circuit expects {}",
                witness.path_elements.len(),
                self.depth
            )));
        }

        let trapdoor = fe_to_fr(&witness.trapdoor);
        let nullifier_secret = fe_to_fr(&witness.nullifier_secret);
        let external_nullifier = fe_to_fr(&witness.external_nullifier);
        let signal_hash = fe_to_fr(&witness.signal_hash);
        let path_elements: Vec<Fr> = witness.path_elements.iter().map(fe_to_fr).collect();

        // The root the statement commits to is implied by the witness.
        let commitment = poseidon_hash2_fields(trapdoor, nullifier_secret);
        let mut root = commitment;
        for (sibling, is_right) in path_elements.iter().zip(witness.path_index.iter()) {
            root = if *is_right {
                poseidon_hash2_fields(*sibling, root)
            } else {
                poseidon_hash2_fields(root, *sibling)
            };
        }
        let nullifier = poseidon_hash2_fields(external_nullifier, nullifier_secret);

        let circuit = SignalCircuit::new(
            trapdoor,
            nullifier_secret,
            path_elements,
            witness.path_index.clone(),
            root,
            external_nullifier,
            signal_hash,
        );

        let mut rng = thread_rng();
        let proof = Groth16::<Bn254>::prove(&self.proving_key, circuit, &mut rng)
            .map_err(|e| MurmurError::ProofGeneration(format!("prover rejected witness: {}", e)))?;

        let signals = PublicSignals {
            root: fr_to_fe(&root),
            nullifier_hash: fr_to_fe(&nullifier),
            signal_hash: witness.signal_hash,
            external_nullifier: witness.external_nullifier,
        };

        Ok((pack_solidity_proof(&proof), signals))
    }
}

impl Groth16Verifier {
    /// Wrap a verifying key, preparing it for repeated verification.
    pub fn from_verifying_key(vk: VerifyingKey<Bn254>) -> MurmurResult<Self> {
        let prepared_vk = Groth16::<Bn254>::process_vk(&vk)
            .map_err(|e| MurmurError::Serialization(format!("verifying key processing: {}", e)))?;
        Ok(Self {
            verifying_key: vk,
            prepared_vk,
        })
    }

    /// Load a verifying key from its compressed artifact bytes.
    pub fn from_artifact(bytes: &[u8]) -> MurmurResult<Self> {
        let vk = VerifyingKey::<Bn254>::deserialize_compressed(bytes)
            .map_err(|e| MurmurError::Serialization(format!("invalid verifying key: {}", e)))?;
        Self::from_verifying_key(vk)
    }

    /// Compressed artifact bytes of the verifying key.
    pub fn export_artifact(&self) -> MurmurResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.verifying_key
            .serialize_compressed(&mut bytes)
            .map_err(|e| MurmurError::Serialization(format!("verifying key export: {}", e)))?;
        Ok(bytes)
    }
}

impl SignalVerifier for Groth16Verifier {
    fn verify(&self, proof: &SolidityProof, signals: &PublicSignals) -> MurmurResult<bool> {
        let proof = unpack_solidity_proof(proof)?;

        let public_inputs = vec![
            fe_to_fr(&signals.root),
            fe_to_fr(&signals.nullifier_hash),
            fe_to_fr(&signals.external_nullifier),
            fe_to_fr(&signals.signal_hash),
        ];

        Groth16::<Bn254>::verify_with_processed_vk(&self.prepared_vk, &public_inputs, &proof)
            .map_err(|e| MurmurError::Internal(format!("verification error: {}", e)))
    }
}

fn fq_to_word(value: &Fq) -> [u8; 32] {
    let bytes = value.into_bigint().to_bytes_be();
    let mut word = [0u8; 32];
    word[32 - bytes.len()..].copy_from_slice(&bytes);
    word
}

fn word_to_fq(word: &[u8; 32]) -> Fq {
    Fq::from_be_bytes_mod_order(word)
}

fn check_g1(point: G1Affine) -> MurmurResult<G1Affine> {
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(MurmurError::Serialization(
            "proof G1 point not on curve".into(),
        ));
    }
    Ok(point)
}

fn check_g2(point: G2Affine) -> MurmurResult<G2Affine> {
    if !point.is_on_curve() || !point.is_in_correct_subgroup_assuming_on_curve() {
        return Err(MurmurError::Serialization(
            "proof G2 point not on curve".into(),
        ));
    }
    Ok(point)
}

/// Pack a Groth16 proof into the 8-word layout Solidity verifiers expect:
/// A.x, A.y, B.x.c1, B.x.c0, B.y.c1, B.y.c0, C.x, C.y (big-endian words).
pub fn pack_solidity_proof(proof: &Proof<Bn254>) -> SolidityProof {
    SolidityProof([
        fq_to_word(&proof.a.x),
        fq_to_word(&proof.a.y),
        fq_to_word(&proof.b.x.c1),
        fq_to_word(&proof.b.x.c0),
        fq_to_word(&proof.b.y.c1),
        fq_to_word(&proof.b.y.c0),
        fq_to_word(&proof.c.x),
        fq_to_word(&proof.c.y),
    ])
}

/// Rebuild a Groth16 proof from its Solidity packing, rejecting points
/// that are off-curve or outside the prime-order subgroup.
pub fn unpack_solidity_proof(packed: &SolidityProof) -> MurmurResult<Proof<Bn254>> {
    let words = &packed.0;

    let a = check_g1(G1Affine::new_unchecked(
        word_to_fq(&words[0]),
        word_to_fq(&words[1]),
    ))?;
    let b = check_g2(G2Affine::new_unchecked(
        Fq2::new(word_to_fq(&words[3]), word_to_fq(&words[2])),
        Fq2::new(word_to_fq(&words[5]), word_to_fq(&words[4])),
    ))?;
    let c = check_g1(G1Affine::new_unchecked(
        word_to_fq(&words[6]),
        word_to_fq(&words[7]),
    ))?;

    Ok(Proof { a, b, c })
}
