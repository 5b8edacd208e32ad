//! Membership tree over registered identity commitments.
//!
//! The tree is a perfect binary Merkle tree of fixed depth, built bottom-up
//! from an ordered commitment snapshot. Unoccupied positions take canonical
//! zero values derived from `Poseidon1(0)`, so the root of a sparsely
//! populated group is well defined and publicly recomputable. Levels are
//! stored as flat arrays indexed by position; there are no node links.

use crate::poseidon::{fe_to_fr, fr_to_fe, poseidon_hash1_field, poseidon_hash2_fields};
use ark_bn254::Fr;
use murmur_types::{AuthPath, Direction, FieldElement, MurmurError, MurmurResult};

const MAX_TREE_DEPTH: usize = 32;

/// A fully materialized snapshot tree. Immutable once built; one signaling
/// attempt builds it from a single snapshot fetch and reuses it throughout.
#[derive(Debug)]
pub struct MembershipTree {
    // levels[0] holds the occupied leaves; levels[depth] the root level.
    levels: Vec<Vec<Fr>>,
    zero_values: Vec<Fr>,
    depth: usize,
}

impl MembershipTree {
    /// Build the tree from an ordered commitment snapshot.
    ///
    /// Insertion order is leaf index. Fails when the depth is out of range
    /// or the snapshot exceeds the tree capacity.
    pub fn build(commitments: &[FieldElement], depth: usize) -> MurmurResult<Self> {
        if depth == 0 || depth > MAX_TREE_DEPTH {
            return Err(MurmurError::Config(format!(
                "tree depth {} outside supported range 1..={}",
                depth, MAX_TREE_DEPTH
            )));
        }
        if commitments.len() > (1usize << depth) {
            return Err(MurmurError::Internal(format!(
                "{} commitments exceed tree capacity 2^{}",
                commitments.len(),
                depth
            )));
        }

        let mut zero_values = Vec::with_capacity(depth + 1);
        let mut zero = poseidon_hash1_field(Fr::from(0u64));
        zero_values.push(zero);
        for _ in 0..depth {
            zero = poseidon_hash2_fields(zero, zero);
            zero_values.push(zero);
        }

        let mut levels = Vec::with_capacity(depth + 1);
        levels.push(commitments.iter().map(fe_to_fr).collect::<Vec<Fr>>());

        for level_idx in 0..depth {
            let current = &levels[level_idx];
            let mut next = Vec::with_capacity(current.len().div_ceil(2));
            for pair in current.chunks(2) {
                let left = pair[0];
                let right = if pair.len() > 1 {
                    pair[1]
                } else {
                    zero_values[level_idx]
                };
                next.push(poseidon_hash2_fields(left, right));
            }
            levels.push(next);
        }

        Ok(Self {
            levels,
            zero_values,
            depth,
        })
    }

    /// Root of the snapshot.
    pub fn root(&self) -> FieldElement {
        let root = self.levels[self.depth]
            .first()
            .copied()
            .unwrap_or(self.zero_values[self.depth]);
        fr_to_fe(&root)
    }

    /// Authentication path for a commitment. On duplicates the lowest index
    /// wins, matching append-only registration order. An absent commitment
    /// is fatal: the identity was never registered.
    pub fn auth_path(&self, target: &FieldElement) -> MurmurResult<AuthPath> {
        let target_fr = fe_to_fr(target);
        let index = self.levels[0]
            .iter()
            .position(|leaf| *leaf == target_fr)
            .ok_or_else(|| {
                MurmurError::MembershipNotFound(format!(
                    "commitment {} is not in the group snapshot",
                    target
                ))
            })?;
        self.auth_path_at(index)
    }

    /// Authentication path for the leaf at `index`.
    pub fn auth_path_at(&self, index: usize) -> MurmurResult<AuthPath> {
        if index >= self.levels[0].len() {
            return Err(MurmurError::Internal(format!(
                "leaf index {} out of range for {} leaves",
                index,
                self.levels[0].len()
            )));
        }

        let mut siblings = Vec::with_capacity(self.depth);
        let mut idx = index;

        for level_idx in 0..self.depth {
            let sibling = self.levels[level_idx]
                .get(idx ^ 1)
                .copied()
                .unwrap_or(self.zero_values[level_idx]);
            let direction = if idx & 1 == 0 {
                Direction::Left
            } else {
                Direction::Right
            };
            siblings.push((fr_to_fe(&sibling), direction));
            idx >>= 1;
        }

        Ok(AuthPath {
            siblings,
            root: self.root(),
        })
    }

    /// Replay the root computation a verifier performs over `(leaf, path)`.
    pub fn recompute_root(leaf: &FieldElement, path: &AuthPath) -> FieldElement {
        let mut current = fe_to_fr(leaf);
        for (sibling, direction) in &path.siblings {
            let sibling = fe_to_fr(sibling);
            current = match direction {
                Direction::Left => poseidon_hash2_fields(current, sibling),
                Direction::Right => poseidon_hash2_fields(sibling, current),
            };
        }
        fr_to_fe(&current)
    }

    /// Check a path against its own snapshot root.
    pub fn verify_path(leaf: &FieldElement, path: &AuthPath) -> bool {
        Self::recompute_root(leaf, path) == path.root
    }

    /// Number of occupied leaves.
    pub fn len(&self) -> usize {
        self.levels[0].len()
    }

    /// True when the snapshot holds no commitments.
    pub fn is_empty(&self) -> bool {
        self.levels[0].is_empty()
    }

    /// Configured depth.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Build the snapshot tree and return the authentication path for `target`
/// in one step.
pub fn compute_auth_path(
    commitments: &[FieldElement],
    target: &FieldElement,
    depth: usize,
) -> MurmurResult<AuthPath> {
    MembershipTree::build(commitments, depth)?.auth_path(target)
}
