//! Keccak256 Merkle proofs with sorted-pair hashing.
//!
//! Leaves are double hashed so a 64-byte internal node preimage can never be
//! passed off as a leaf. Siblings are ordered by byte value before hashing,
//! which keeps proofs free of left/right direction bits.

use alloy_primitives::{Address, U256};

use crate::error::TreeError;
use crate::hash::{address_word, amount_word, hash_pair, keccak256, Hash};

/// Computes the Merkle leaf for an `(account, amount)` entry.
///
/// `keccak256(keccak256(abi.encode(account, amount)))`
pub fn leaf_hash(account: &Address, amount: &U256) -> Hash {
    let mut encoded = [0u8; 64];
    encoded[..32].copy_from_slice(&address_word(account));
    encoded[32..].copy_from_slice(&amount_word(amount));
    keccak256(keccak256(encoded))
}

/// Recomputes the root reached by walking `proof` upward from `leaf`.
pub fn process_proof(leaf: &Hash, proof: &[Hash]) -> Hash {
    proof
        .iter()
        .fold(*leaf, |current, sibling| hash_pair(&current, sibling))
}

/// Returns true if `proof` links `leaf` to `root`.
///
/// An empty proof is only valid for a single-leaf tree, where the leaf is
/// the root.
pub fn verify(leaf: &Hash, proof: &[Hash], root: &Hash) -> bool {
    process_proof(leaf, proof) == *root
}

/// A fully materialised Merkle tree, built off-chain to hand out proofs.
///
/// Level 0 holds the sorted leaves; the last level holds the root. A level
/// with an odd node count promotes its last node unchanged.
#[derive(Clone, Debug)]
pub struct MerkleTree {
    levels: Vec<Vec<Hash>>,
}

impl MerkleTree {
    /// Builds a tree over already-hashed leaves.
    ///
    /// # Errors
    /// Returns [`TreeError::Empty`] when `leaves` is empty.
    pub fn new(mut leaves: Vec<Hash>) -> Result<Self, TreeError> {
        if leaves.is_empty() {
            return Err(TreeError::Empty);
        }
        leaves.sort_unstable();

        let mut levels = vec![leaves];
        while let Some(level) = levels.last().filter(|level| level.len() > 1) {
            let next_level: Vec<Hash> = level
                .chunks(2)
                .map(|chunk| match chunk {
                    [left, right] => hash_pair(left, right),
                    _ => chunk[0],
                })
                .collect();
            levels.push(next_level);
        }

        Ok(Self { levels })
    }

    pub fn root(&self) -> Hash {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or_default()
    }

    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Number of levels above the leaves.
    pub fn depth(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    pub fn leaves(&self) -> &[Hash] {
        self.levels.first().map(Vec::as_slice).unwrap_or_default()
    }

    /// Position of `leaf` among the sorted leaves.
    pub fn index_of(&self, leaf: &Hash) -> Option<usize> {
        self.leaves().binary_search(leaf).ok()
    }

    /// Generates the proof for `leaf`, or `None` if it is not in the tree.
    pub fn proof(&self, leaf: &Hash) -> Option<Vec<Hash>> {
        self.index_of(leaf).and_then(|index| self.proof_at(index))
    }

    /// Generates the proof for the leaf at `leaf_index` in sorted order.
    ///
    /// Levels where the node has no sibling contribute nothing to the proof,
    /// since the node was promoted without hashing.
    pub fn proof_at(&self, leaf_index: usize) -> Option<Vec<Hash>> {
        if leaf_index >= self.leaf_count() {
            return None;
        }

        let mut proof = Vec::with_capacity(self.depth());
        let mut index = leaf_index;
        for level in &self.levels[..self.depth()] {
            if let Some(sibling) = level.get(index ^ 1) {
                proof.push(*sibling);
            }
            index /= 2;
        }

        Some(proof)
    }
}
