#[cfg(test)]
#[path = "tests/bucket.rs"]
mod tests;

use std::collections::BTreeMap;

use hornet_primitives::{DagLeaf, LeafType};
use serde::{Deserialize, Serialize};

/// Metadata key that names a leaf's kind explicitly.
pub const KIND_KEY: &str = "hkind";

/// The kind value that defers to name-based routing.
pub const DEFAULT_KIND: &str = "1";

/// Picks the bucket a DAG's leaves are stored under, from its root leaf.
///
/// An explicit, non-default `hkind` wins; otherwise the segment between the
/// first and second `.` of the item name, even when empty; otherwise the
/// leaf type.
#[must_use]
pub fn get_bucket(leaf: &DagLeaf) -> String {
    if let Some(kind) = leaf
        .additional_data
        .get(KIND_KEY)
        .filter(|kind| *kind != DEFAULT_KIND)
    {
        return format!("hkind:{kind}");
    }

    if let Some(extension) = leaf.item_name.split('.').nth(1) {
        return extension.to_owned();
    }

    match leaf.leaf_type {
        LeafType::Directory => "directory".to_owned(),
        LeafType::File => "file".to_owned(),
    }
}

/// A root-leaf field whose value keys the per-bucket secondary cache.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafField {
    ItemName,
    Hash,
    AdditionalData(String),
}

impl LeafField {
    #[must_use]
    pub fn extract(&self, leaf: &DagLeaf) -> Option<String> {
        match self {
            Self::ItemName => Some(leaf.item_name.clone()),
            Self::Hash => Some(leaf.hash.clone()),
            Self::AdditionalData(key) => leaf.additional_data.get(key).cloned(),
        }
    }
}

/// Bucket name to the field its secondary cache is keyed by.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CacheConfig {
    fields: BTreeMap<String, LeafField>,
}

impl CacheConfig {
    #[must_use]
    pub fn new<I: IntoIterator<Item = (String, LeafField)>>(fields: I) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn field(&self, bucket: &str) -> Option<&LeafField> {
        self.fields.get(bucket)
    }

    #[must_use]
    pub fn is_cached(&self, bucket: &str) -> bool {
        self.fields.contains_key(bucket)
    }
}
