#[cfg(test)]
#[path = "tests/leaf.rs"]
mod tests;

use std::collections::BTreeMap;
use std::io;

use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::hash::{self, ContentHash};
use crate::merkle::{self, MerkleProof, Node};

#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum LeafType {
    File = 0,
    Directory = 1,
}

/// A single content-addressed node of a DAG.
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Eq, PartialEq)]
pub struct DagLeaf {
    pub hash: String,
    pub item_name: String,
    pub leaf_type: LeafType,
    pub content_hash: Option<ContentHash>,
    pub content: Option<Vec<u8>>,
    pub classic_merkle_root: Option<Node>,
    pub current_link_count: u64,
    /// Total number of leaves in the DAG; only the root carries it.
    pub leaf_count: Option<u64>,
    pub links: Vec<String>,
    pub additional_data: BTreeMap<String, String>,
}

/// Everything the hash commits to. Content is covered through its hash and
/// links through the classic merkle root.
#[derive(BorshSerialize)]
struct HashInput<'a> {
    item_name: &'a str,
    leaf_type: LeafType,
    content_hash: Option<&'a ContentHash>,
    classic_merkle_root: Option<&'a Node>,
    current_link_count: u64,
    leaf_count: Option<u64>,
    additional_data: &'a BTreeMap<String, String>,
}

/// Positional proof that `leaf` is one of its parent's links.
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Eq, PartialEq)]
pub struct ClassicTreeBranch {
    pub leaf: String,
    pub proof: MerkleProof,
}

/// A leaf together with the transfer it arrived in.
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Eq, PartialEq)]
pub struct DagLeafData {
    pub leaf: DagLeaf,
    pub root: String,
    pub public_key: String,
    pub signature: String,
    pub parent: Option<String>,
    pub branch: Option<ClassicTreeBranch>,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LeafError {
    #[error("leaf hash `{0}` carries no label")]
    MissingLabel(String),
    #[error("root leaf hash `{0}` must not carry a label")]
    UnexpectedLabel(String),
    #[error("leaf hash mismatch: expected {expected}, computed {computed}")]
    HashMismatch { expected: String, computed: String },
    #[error("content does not match its content hash")]
    ContentMismatch,
    #[error("content present without a content hash")]
    MissingContentHash,
    #[error("classic merkle root does not match the leaf links")]
    MerkleRootMismatch,
    #[error("declared link count {declared} does not match {actual} links")]
    LinkCountMismatch { declared: u64, actual: u64 },
    #[error("root leaf carries no leaf count")]
    MissingLeafCount,
    #[error("no link labelled `{0}`")]
    UnknownLabel(String),
    #[error("leaf has no classic merkle root")]
    MissingMerkleRoot,
    #[error("branch proof for `{0}` does not verify against the parent")]
    InvalidBranch(String),
    #[error("failed to encode leaf")]
    Encoding(#[from] io::Error),
}

impl DagLeaf {
    /// Hex digest over the committed fields. Does not include any label.
    pub fn compute_digest(&self) -> Result<[u8; hash::HASH_LEN], LeafError> {
        let input = HashInput {
            item_name: &self.item_name,
            leaf_type: self.leaf_type,
            content_hash: self.content_hash.as_ref(),
            classic_merkle_root: self.classic_merkle_root.as_ref(),
            current_link_count: self.current_link_count,
            leaf_count: self.leaf_count,
            additional_data: &self.additional_data,
        };

        let mut hasher = Sha256::new();
        input.serialize(&mut hasher)?;

        Ok(hasher.finalize().into())
    }

    #[must_use]
    pub fn is_root_hash(&self) -> bool {
        hash::label(&self.hash).is_none()
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        hash::label(&self.hash)
    }

    /// Self-contained verification of a leaf that anchors a DAG.
    pub fn verify_root_leaf(&self) -> Result<(), LeafError> {
        if !self.is_root_hash() {
            return Err(LeafError::UnexpectedLabel(self.hash.clone()));
        }

        if self.leaf_count.is_none() {
            return Err(LeafError::MissingLeafCount);
        }

        self.verify_body()?;
        self.verify_digest(&self.hash)
    }

    /// Verification of a labelled, non-root leaf.
    pub fn verify_leaf(&self) -> Result<(), LeafError> {
        let (label, digest) = hash::split(&self.hash);

        if label.is_none() {
            return Err(LeafError::MissingLabel(self.hash.clone()));
        }

        self.verify_body()?;
        self.verify_digest(digest)
    }

    fn verify_digest(&self, expected: &str) -> Result<(), LeafError> {
        let computed = hex::encode(self.compute_digest()?);

        if computed != expected {
            return Err(LeafError::HashMismatch {
                expected: expected.to_owned(),
                computed,
            });
        }

        Ok(())
    }

    fn verify_body(&self) -> Result<(), LeafError> {
        if let Some(content) = &self.content {
            let content_hash = self.content_hash.ok_or(LeafError::MissingContentHash)?;

            if hash::sha256(content) != content_hash {
                return Err(LeafError::ContentMismatch);
            }
        }

        let actual = self.links.len() as u64;
        if self.current_link_count != actual {
            return Err(LeafError::LinkCountMismatch {
                declared: self.current_link_count,
                actual,
            });
        }

        if merkle::root(&self.links) != self.classic_merkle_root {
            return Err(LeafError::MerkleRootMismatch);
        }

        Ok(())
    }

    /// Whether `hash` is one of this leaf's links.
    #[must_use]
    pub fn has_link(&self, hash: &str) -> bool {
        self.links.iter().any(|link| link == hash)
    }

    /// Proof that the link labelled `label` sits at its position.
    pub fn get_branch(&self, label: &str) -> Result<ClassicTreeBranch, LeafError> {
        let index = self
            .links
            .iter()
            .position(|link| hash::label(link) == Some(label))
            .ok_or_else(|| LeafError::UnknownLabel(label.to_owned()))?;

        let proof = merkle::prove(&self.links, index).ok_or(LeafError::MissingMerkleRoot)?;

        Ok(ClassicTreeBranch {
            leaf: self.links[index].clone(),
            proof,
        })
    }

    pub fn verify_branch(&self, branch: &ClassicTreeBranch) -> Result<(), LeafError> {
        let root = self
            .classic_merkle_root
            .as_ref()
            .ok_or(LeafError::MissingMerkleRoot)?;

        if branch.proof.leaf_count != self.links.len() as u64
            || !branch.proof.verify(branch.leaf.as_bytes(), root)
        {
            return Err(LeafError::InvalidBranch(branch.leaf.clone()));
        }

        Ok(())
    }

    /// Whether a child of this leaf travels with a branch proof.
    #[must_use]
    pub fn needs_branch(&self) -> bool {
        self.links.len() > 1
    }

    /// Checks that `child` is linked from this leaf, verifying `branch` when
    /// the position is not implicit.
    pub fn verify_child(
        &self,
        child: &str,
        branch: Option<&ClassicTreeBranch>,
    ) -> Result<(), LeafError> {
        if !self.has_link(child) {
            return Err(LeafError::InvalidBranch(child.to_owned()));
        }

        if !self.needs_branch() {
            return Ok(());
        }

        let branch = branch.ok_or_else(|| LeafError::InvalidBranch(child.to_owned()))?;

        if branch.leaf != child {
            return Err(LeafError::InvalidBranch(child.to_owned()));
        }

        self.verify_branch(branch)
    }
}

impl DagLeafData {
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.leaf.hash == self.root
    }
}
