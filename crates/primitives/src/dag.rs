#[cfg(test)]
#[path = "tests/dag.rs"]
mod tests;

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use borsh::{BorshDeserialize, BorshSerialize};
use thiserror::Error;

use crate::leaf::{DagLeaf, LeafError};

/// A DAG reassembled from its leaves.
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Eq, PartialEq)]
pub struct Dag {
    pub root: String,
    pub leaves: BTreeMap<String, DagLeaf>,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DagError {
    #[error("root leaf `{0}` is missing")]
    MissingRoot(String),
    #[error("leaf `{0}` is linked but missing")]
    MissingLeaf(String),
    #[error("leaf `{0}` is reachable more than once")]
    DuplicateLeaf(String),
    #[error("{0} leaves are not reachable from the root")]
    Unreachable(usize),
    #[error("root declares {declared} leaves but the dag holds {actual}")]
    LeafCount { declared: u64, actual: u64 },
    #[error("leaf `{hash}` failed verification: {source}")]
    Leaf {
        hash: String,
        #[source]
        source: LeafError,
    },
}

impl Dag {
    #[must_use]
    pub const fn new(root: String, leaves: BTreeMap<String, DagLeaf>) -> Self {
        Self { root, leaves }
    }

    #[must_use]
    pub fn root_leaf(&self) -> Option<&DagLeaf> {
        self.leaves.get(&self.root)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Breadth-first, parent-before-children traversal from the root.
    ///
    /// Each leaf is yielded together with its parent; the root has none.
    pub fn walk(&self) -> Result<Vec<(&DagLeaf, Option<&DagLeaf>)>, DagError> {
        let root = self
            .root_leaf()
            .ok_or_else(|| DagError::MissingRoot(self.root.clone()))?;

        let mut order = Vec::with_capacity(self.leaves.len());
        let mut seen = BTreeSet::from([root.hash.as_str()]);
        let mut queue = VecDeque::from([(root, None)]);

        while let Some((leaf, parent)) = queue.pop_front() {
            order.push((leaf, parent));

            for link in &leaf.links {
                let child = self
                    .leaves
                    .get(link)
                    .ok_or_else(|| DagError::MissingLeaf(link.clone()))?;

                if !seen.insert(link.as_str()) {
                    return Err(DagError::DuplicateLeaf(link.clone()));
                }

                queue.push_back((child, Some(leaf)));
            }
        }

        Ok(order)
    }

    /// Full structural and cryptographic verification.
    pub fn verify(&self) -> Result<(), DagError> {
        let order = self.walk()?;

        let unreachable = self.leaves.len().saturating_sub(order.len());
        if unreachable > 0 {
            return Err(DagError::Unreachable(unreachable));
        }

        for (leaf, parent) in order {
            let failed = |source| DagError::Leaf {
                hash: leaf.hash.clone(),
                source,
            };

            match parent {
                None => {
                    leaf.verify_root_leaf().map_err(failed)?;

                    let actual = self.leaves.len() as u64;
                    if let Some(declared) = leaf.leaf_count.filter(|&count| count != actual) {
                        return Err(DagError::LeafCount { declared, actual });
                    }
                }
                Some(parent) => {
                    leaf.verify_leaf().map_err(failed)?;

                    if parent.needs_branch() {
                        let label = leaf.label().unwrap_or_default();
                        let branch = parent.get_branch(label).map_err(failed)?;
                        parent.verify_branch(&branch).map_err(failed)?;
                    }
                }
            }
        }

        Ok(())
    }
}
