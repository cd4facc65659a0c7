#[cfg(test)]
#[path = "tests/builder.rs"]
mod tests;

use std::collections::BTreeMap;

use crate::dag::Dag;
use crate::hash;
use crate::leaf::{DagLeaf, LeafError, LeafType};
use crate::merkle;

/// Describes one leaf before it is hashed.
#[derive(Clone, Debug)]
pub struct DagLeafBuilder {
    item_name: String,
    leaf_type: LeafType,
    content: Option<Vec<u8>>,
    links: Vec<String>,
    additional_data: BTreeMap<String, String>,
}

impl DagLeafBuilder {
    #[must_use]
    pub fn file(item_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            item_name: item_name.into(),
            leaf_type: LeafType::File,
            content: Some(content),
            links: Vec::new(),
            additional_data: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn directory(item_name: impl Into<String>) -> Self {
        Self {
            item_name: item_name.into(),
            leaf_type: LeafType::Directory,
            content: None,
            links: Vec::new(),
            additional_data: BTreeMap::new(),
        }
    }

    /// A file whose content lives in linked chunk leaves.
    #[must_use]
    pub fn chunked_file(item_name: impl Into<String>) -> Self {
        Self {
            leaf_type: LeafType::File,
            ..Self::directory(item_name)
        }
    }

    #[must_use]
    pub fn with_link(mut self, hash: impl Into<String>) -> Self {
        self.links.push(hash.into());
        self
    }

    #[must_use]
    pub fn with_links<I>(mut self, hashes: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.links.extend(hashes.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_additional_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        drop(self.additional_data.insert(key.into(), value.into()));
        self
    }

    fn unhashed(self, leaf_count: Option<u64>) -> DagLeaf {
        DagLeaf {
            hash: String::new(),
            item_name: self.item_name,
            leaf_type: self.leaf_type,
            content_hash: self.content.as_deref().map(hash::sha256),
            content: self.content,
            classic_merkle_root: merkle::root(&self.links),
            current_link_count: self.links.len() as u64,
            leaf_count,
            links: self.links,
            additional_data: self.additional_data,
        }
    }

    /// Builds a non-root leaf carrying `label`.
    pub fn build_leaf(self, label: u64) -> Result<DagLeaf, LeafError> {
        let mut leaf = self.unhashed(None);
        leaf.hash = hash::labelled(label, &leaf.compute_digest()?);
        Ok(leaf)
    }

    /// Builds the root leaf of a DAG holding `leaf_count` leaves.
    pub fn build_root_leaf(self, leaf_count: u64) -> Result<DagLeaf, LeafError> {
        let mut leaf = self.unhashed(Some(leaf_count));
        leaf.hash = hex::encode(leaf.compute_digest()?);
        Ok(leaf)
    }
}

/// Assembles a DAG bottom-up, handing out sequential labels from 1.
#[derive(Debug)]
pub struct DagBuilder {
    next_label: u64,
    leaves: BTreeMap<String, DagLeaf>,
}

impl Default for DagBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DagBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_label: 1,
            leaves: BTreeMap::new(),
        }
    }

    /// Adds a non-root leaf and returns its hash.
    pub fn add(&mut self, leaf: DagLeafBuilder) -> Result<String, LeafError> {
        let leaf = leaf.build_leaf(self.next_label)?;
        self.next_label = self.next_label.saturating_add(1);

        let hash = leaf.hash.clone();
        drop(self.leaves.insert(hash.clone(), leaf));
        Ok(hash)
    }

    /// Adds a file, split into linked chunks when it exceeds `chunk_size`.
    pub fn add_file(
        &mut self,
        item_name: impl Into<String>,
        content: &[u8],
        chunk_size: usize,
    ) -> Result<String, LeafError> {
        let file = self.chunk_file(item_name, content, chunk_size)?;

        self.add(file)
    }

    /// Adds the chunks of an oversized file and returns the leaf linking
    /// them, or a plain file leaf when `content` fits in one chunk.
    ///
    /// A `chunk_size` of zero disables chunking.
    pub fn chunk_file(
        &mut self,
        item_name: impl Into<String>,
        content: &[u8],
        chunk_size: usize,
    ) -> Result<DagLeafBuilder, LeafError> {
        let item_name = item_name.into();

        if content.len() <= chunk_size || chunk_size == 0 {
            return Ok(DagLeafBuilder::file(item_name, content.to_vec()));
        }

        let chunks = content
            .chunks(chunk_size)
            .enumerate()
            .map(|(index, chunk)| {
                self.add(DagLeafBuilder::file(
                    format!("{item_name}/{index}"),
                    chunk.to_vec(),
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DagLeafBuilder::chunked_file(item_name).with_links(chunks))
    }

    /// Finishes the DAG under a root built from `root`.
    pub fn build(mut self, root: DagLeafBuilder) -> Result<Dag, LeafError> {
        let leaf_count = (self.leaves.len() as u64).saturating_add(1);
        let root = root.build_root_leaf(leaf_count)?;

        let hash = root.hash.clone();
        drop(self.leaves.insert(hash.clone(), root));

        Ok(Dag::new(hash, self.leaves))
    }
}
