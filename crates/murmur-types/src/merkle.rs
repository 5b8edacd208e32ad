//! Authentication paths against a group snapshot.

use crate::field::FieldElement;
use serde::{Deserialize, Serialize};

/// Which child position the running node occupies at one tree level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// The running node is the left child; the sibling sits on the right.
    Left,
    /// The running node is the right child; the sibling sits on the left.
    Right,
}

/// Authentication path for one leaf against a fixed group snapshot.
///
/// Valid only for the snapshot it was computed from. A proof built from a
/// stale path fails verification once the on-chain root advances; that is an
/// expected, non-fatal condition handled at submission time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPath {
    /// Sibling hash and running-node position per level, leaf first.
    pub siblings: Vec<(FieldElement, Direction)>,
    /// Root of the snapshot the path was computed from.
    pub root: FieldElement,
}

impl AuthPath {
    /// Number of levels in the path.
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    /// Per-level flags, `true` where the running node is the right child.
    /// This is the index form the circuit consumes.
    pub fn path_index(&self) -> Vec<bool> {
        self.siblings
            .iter()
            .map(|(_, direction)| matches!(direction, Direction::Right))
            .collect()
    }
}
