//! Binary Merkle tree over a parent's ordered links.
//!
//! Leaves are hashed as `sha256(0x00 || data)` and internal nodes as
//! `sha256(0x01 || left || right)`. A node without a sibling is promoted to
//! the next level unchanged.

#[cfg(test)]
#[path = "tests/merkle.rs"]
mod tests;

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};

use crate::hash::HASH_LEN;

pub type Node = [u8; HASH_LEN];

const LEAF_PREFIX: u8 = 0x00;
const NODE_PREFIX: u8 = 0x01;

#[must_use]
pub fn leaf_digest(data: &[u8]) -> Node {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_PREFIX]);
    hasher.update(data);
    hasher.finalize().into()
}

fn node_digest(left: &Node, right: &Node) -> Node {
    let mut hasher = Sha256::new();
    hasher.update([NODE_PREFIX]);
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

fn next_level(level: &[Node]) -> Vec<Node> {
    level
        .chunks(2)
        .map(|pair| match pair {
            [left, right] => node_digest(left, right),
            [single] => *single,
            _ => unreachable!("chunks(2) yields one or two nodes"),
        })
        .collect()
}

/// Root over `items`, or `None` when there is nothing to commit to.
#[must_use]
pub fn root<T: AsRef<[u8]>>(items: &[T]) -> Option<Node> {
    let mut level: Vec<Node> = items.iter().map(|item| leaf_digest(item.as_ref())).collect();

    while level.len() > 1 {
        level = next_level(&level);
    }

    level.pop()
}

/// Builds the inclusion proof for `items[index]`.
#[must_use]
pub fn prove<T: AsRef<[u8]>>(items: &[T], index: usize) -> Option<MerkleProof> {
    if index >= items.len() {
        return None;
    }

    let mut level: Vec<Node> = items.iter().map(|item| leaf_digest(item.as_ref())).collect();
    let mut position = index;
    let mut siblings = Vec::new();

    while level.len() > 1 {
        let sibling = if position % 2 == 1 {
            level.get(position.wrapping_sub(1))
        } else {
            level.get(position.saturating_add(1))
        };

        if let Some(sibling) = sibling {
            siblings.push(*sibling);
        }

        level = next_level(&level);
        position >>= 1_u32;
    }

    Some(MerkleProof {
        index: index as u64,
        leaf_count: items.len() as u64,
        siblings,
    })
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Eq, PartialEq)]
pub struct MerkleProof {
    pub index: u64,
    pub leaf_count: u64,
    pub siblings: Vec<Node>,
}

impl MerkleProof {
    /// Folds `data` up the tree. `None` if the proof is malformed.
    #[must_use]
    pub fn compute_root(&self, data: &[u8]) -> Option<Node> {
        if self.index >= self.leaf_count {
            return None;
        }

        let mut hash = leaf_digest(data);
        let mut position = self.index;
        let mut width = self.leaf_count;
        let mut siblings = self.siblings.iter();

        while width > 1 {
            if position % 2 == 1 {
                hash = node_digest(siblings.next()?, &hash);
            } else if position.saturating_add(1) < width {
                hash = node_digest(&hash, siblings.next()?);
            }

            position >>= 1_u32;
            width = width.div_ceil(2);
        }

        siblings.next().is_none().then_some(hash)
    }

    #[must_use]
    pub fn verify(&self, data: &[u8], root: &Node) -> bool {
        self.compute_root(data).is_some_and(|computed| computed == *root)
    }
}
