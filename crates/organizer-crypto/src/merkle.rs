//! # Merkle Commitments
//!
//! Binary Merkle trees over payout leaves, built by approvers and batch
//! builders, and the membership verifier the executor runs per payout.
//!
//! ## Algorithm
//!
//! Domain-separated SHA-256:
//! - Leaf: the payout leaf itself (already hashed under tag `0x00`).
//! - Node: `SHA256(0x01 || a || b)`.
//!
//! Under [`PairOrdering::Sorted`], `(a, b)` is the pair in ascending byte
//! order, so proofs carry no position information. Under
//! [`PairOrdering::Positional`], `a` is the left child and every proof step
//! names the side its sibling sits on.
//!
//! A level with an odd node count promotes its last node unchanged to the
//! next level; that node gets no proof step at that level. A one-leaf
//! tree's root is the leaf.
//!
//! ## Security Invariant
//!
//! Builder and verifier must use the same [`PairOrdering`]. The ordering is
//! a deployment constant carried in the engine configuration and passed
//! explicitly to both sides.

use organizer_core::{Hash32, Leaf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Domain tag prefixed to every interior node preimage.
pub const NODE_DOMAIN_TAG: u8 = 0x01;

/// Longest proof the verifier will walk. Deeper proofs verify false.
pub const MAX_PROOF_DEPTH: usize = 64;

/// How a node combines its two children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PairOrdering {
    /// Sort the pair before hashing. Proofs need no side flags.
    #[default]
    Sorted,
    /// Hash left then right. Proofs carry one side flag per sibling.
    Positional,
}

impl PairOrdering {
    /// The configuration spelling: `"sorted"` or `"positional"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sorted => "sorted",
            Self::Positional => "positional",
        }
    }
}

impl std::fmt::Display for PairOrdering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PairOrdering {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sorted" => Ok(Self::Sorted),
            "positional" => Ok(Self::Positional),
            other => Err(format!(
                "unknown pair ordering {other:?}, expected \"sorted\" or \"positional\""
            )),
        }
    }
}

/// Which side of the running hash a sibling sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// An inclusion proof: sibling hashes from the leaf level upwards.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MerkleProof {
    /// Sibling hashes, leaf level first.
    pub siblings: Vec<Hash32>,
    /// Sibling sides. Must match `siblings` in length under
    /// [`PairOrdering::Positional`]; ignored under [`PairOrdering::Sorted`].
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sides: Vec<Side>,
}

impl MerkleProof {
    /// Number of proof steps.
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }
}

/// Tree construction errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// A tree needs at least one leaf.
    #[error("cannot build a Merkle tree over zero leaves")]
    Empty,

    /// Proof requested for a position outside the tree.
    #[error("leaf index {index} out of range for tree of {len} leaves")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Hash two children into their parent under `ordering`.
pub fn node_hash(ordering: PairOrdering, left: &Hash32, right: &Hash32) -> Hash32 {
    let (a, b) = match ordering {
        PairOrdering::Sorted if right < left => (right, left),
        _ => (left, right),
    };
    Hash32::sha256_concat(&[&[NODE_DOMAIN_TAG], a.as_bytes(), b.as_bytes()])
}

/// A fully materialized Merkle tree.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    ordering: PairOrdering,
    // levels[0] holds the leaves, the last level holds the root alone.
    levels: Vec<Vec<Hash32>>,
}

impl MerkleTree {
    /// Build a tree over `leaves` in the given order.
    pub fn build(ordering: PairOrdering, leaves: &[Leaf]) -> Result<Self, TreeError> {
        if leaves.is_empty() {
            return Err(TreeError::Empty);
        }
        let mut levels = vec![leaves.iter().map(|l| *l.as_hash()).collect::<Vec<_>>()];
        while let Some(level) = levels.last().filter(|l| l.len() > 1) {
            let next = level
                .chunks(2)
                .map(|pair| match pair.get(1) {
                    Some(right) => node_hash(ordering, &pair[0], right),
                    None => pair[0],
                })
                .collect();
            levels.push(next);
        }
        Ok(Self { ordering, levels })
    }

    /// The pair ordering this tree was built with.
    pub fn ordering(&self) -> PairOrdering {
        self.ordering
    }

    /// The commitment root.
    pub fn root(&self) -> Hash32 {
        // `build` guarantees a non-empty last level.
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or(Hash32::ZERO)
    }

    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Inclusion proof for the leaf at `index`.
    pub fn proof(&self, index: usize) -> Result<MerkleProof, TreeError> {
        let len = self.leaf_count();
        if index >= len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        let mut proof = MerkleProof::default();
        let mut idx = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = idx ^ 1;
            if let Some(hash) = level.get(sibling) {
                proof.siblings.push(*hash);
                proof.sides.push(if sibling < idx { Side::Left } else { Side::Right });
            }
            idx /= 2;
        }
        if self.ordering == PairOrdering::Sorted {
            proof.sides.clear();
        }
        Ok(proof)
    }

    /// Inclusion proof for the first occurrence of `leaf`, if present.
    pub fn proof_for(&self, leaf: &Leaf) -> Option<MerkleProof> {
        let index = self.levels.first()?.iter().position(|h| h == leaf.as_hash())?;
        self.proof(index).ok()
    }
}

/// Check that `leaf` is committed to by `root` via `proof`.
///
/// Never fails: any mismatch, including a malformed proof, is `false`.
pub fn verify_membership(
    ordering: PairOrdering,
    leaf: &Leaf,
    proof: &MerkleProof,
    root: &Hash32,
) -> bool {
    if proof.depth() > MAX_PROOF_DEPTH {
        tracing::debug!(depth = proof.depth(), "proof exceeds maximum depth");
        return false;
    }
    let mut acc = *leaf.as_hash();
    match ordering {
        PairOrdering::Sorted => {
            for sibling in &proof.siblings {
                acc = node_hash(ordering, &acc, sibling);
            }
        }
        PairOrdering::Positional => {
            if proof.sides.len() != proof.siblings.len() {
                tracing::debug!(
                    siblings = proof.siblings.len(),
                    sides = proof.sides.len(),
                    "positional proof has mismatched side flags"
                );
                return false;
            }
            for (sibling, side) in proof.siblings.iter().zip(&proof.sides) {
                acc = match side {
                    Side::Left => node_hash(ordering, sibling, &acc),
                    Side::Right => node_hash(ordering, &acc, sibling),
                };
            }
        }
    }
    acc == *root
}

/// [`verify_membership`] over hex-encoded inputs.
///
/// Any element that is not exactly 32 bytes of hex makes the result
/// `false`.
pub fn verify_membership_hex(
    ordering: PairOrdering,
    leaf: &str,
    siblings: &[&str],
    sides: &[Side],
    root: &str,
) -> bool {
    let parsed = (|| {
        let leaf = Leaf::from_hash(Hash32::from_hex(leaf).ok()?);
        let root = Hash32::from_hex(root).ok()?;
        let siblings = siblings
            .iter()
            .map(|s| Hash32::from_hex(s).ok())
            .collect::<Option<Vec<_>>>()?;
        Some((leaf, root, siblings))
    })();
    match parsed {
        Some((leaf, root, siblings)) => {
            let proof = MerkleProof {
                siblings,
                sides: sides.to_vec(),
            };
            verify_membership(ordering, &leaf, &proof, &root)
        }
        None => false,
    }
}
