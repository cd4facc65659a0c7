#[cfg(test)]
#[path = "tests/leaves.rs"]
mod tests;

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};

use hornet_primitives::hash::{self, ContentHash};
use hornet_primitives::{CacheData, Dag, DagError, DagLeafData, LeafError};
use thiserror::Error;
use tracing::{debug, trace};

use crate::bucket::{get_bucket, CacheConfig};
use crate::entry::Entry;
use crate::key::{BucketCacheKey, ContentKey, LeafKey, OwnerCacheKey, RootIndexKey};
use crate::tx::Transaction;
use crate::Store;

/// Prefix of public keys whose roots are tracked in the owner cache.
pub const OWNER_KEY_PREFIX: &str = "npub";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LeafStoreError {
    #[error("leaf has content hash but no content")]
    MissingContent,
    #[error("leaf has content but no content hash")]
    MissingContentHash,
    #[error("leaf content does not match its content hash")]
    ContentMismatch,
    #[error("root `{0}` is not indexed")]
    UnknownRoot(String),
    #[error("leaf `{hash}` not found in bucket `{bucket}`")]
    LeafNotFound { bucket: String, hash: String },
    #[error("content `{0}` not found")]
    ContentNotFound(String),
    #[error("failed to prove leaf position: {0}")]
    Leaf(#[from] LeafError),
    #[error("stored dag is malformed: {0}")]
    Dag(#[from] DagError),
    #[error("store error: {0}")]
    Store(#[from] eyre::Report),
}

/// Leaves partitioned into buckets, with raw content kept apart from the
/// leaf records.
#[derive(Clone, Debug)]
pub struct LeafStore {
    store: Store,
    cache: Arc<CacheConfig>,
    writer: Arc<Mutex<()>>,
}

#[must_use]
pub fn is_owner_key(public_key: &str) -> bool {
    public_key.starts_with(OWNER_KEY_PREFIX)
}

impl LeafStore {
    #[must_use]
    pub fn new(store: Store, cache: CacheConfig) -> Self {
        Self {
            store,
            cache: Arc::new(cache),
            writer: Arc::default(),
        }
    }

    /// The bucket a root's leaves live in, if the root has been stored.
    pub fn root_bucket(&self, root: &str) -> Result<Option<String>, LeafStoreError> {
        Ok(self.store.get(&RootIndexKey(root.to_owned()))?)
    }

    /// Persists one leaf, splitting content from the record.
    ///
    /// All writes land in a single transaction. Root leaves additionally
    /// update the root index and the owner and bucket caches.
    pub fn store_leaf(&self, root: &str, mut data: DagLeafData) -> Result<(), LeafStoreError> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let mut tx = Transaction::default();

        match (data.leaf.content.take(), data.leaf.content_hash) {
            (Some(content), Some(content_hash)) => {
                if hash::sha256(&content) != content_hash {
                    return Err(LeafStoreError::ContentMismatch);
                }

                tx.put(&ContentKey(content_hash), &content)?;
            }
            (Some(_), None) => return Err(LeafStoreError::MissingContentHash),
            (None, Some(_)) => return Err(LeafStoreError::MissingContent),
            (None, None) => {}
        }

        let is_root = data.leaf.hash == root;

        let bucket = if is_root {
            get_bucket(&data.leaf)
        } else {
            self.root_bucket(root)?
                .ok_or_else(|| LeafStoreError::UnknownRoot(root.to_owned()))?
        };

        if is_root {
            tx.put(&RootIndexKey(root.to_owned()), &bucket)?;

            if is_owner_key(&data.public_key) {
                let key = OwnerCacheKey {
                    public_key: data.public_key.clone(),
                    bucket: bucket.clone(),
                };
                self.append_cache(&mut tx, &key, root)?;
            }

            let cache_key = self
                .cache
                .field(&bucket)
                .and_then(|field| field.extract(&data.leaf));

            if let Some(cache_key) = cache_key {
                let key = BucketCacheKey {
                    bucket: bucket.clone(),
                    key: cache_key,
                };
                self.append_cache(&mut tx, &key, root)?;
            }
        }

        tx.put(&LeafKey::new(&bucket, &data.leaf.hash), &data)?;

        self.store.apply(&tx)?;

        debug!(%root, hash = %data.leaf.hash, %bucket, is_root, "stored leaf");

        Ok(())
    }

    fn append_cache<K>(&self, tx: &mut Transaction, key: &K, root: &str) -> Result<(), LeafStoreError>
    where
        K: Entry<DataType = CacheData>,
    {
        let mut cache = self.store.get(key)?.unwrap_or_default();

        if cache.push_unique(root) {
            tx.put(key, &cache)?;
        }

        Ok(())
    }

    pub fn retrieve_leaf(
        &self,
        root: &str,
        hash: &str,
        include_content: bool,
    ) -> Result<DagLeafData, LeafStoreError> {
        let bucket = self
            .root_bucket(root)?
            .ok_or_else(|| LeafStoreError::UnknownRoot(root.to_owned()))?;

        let mut data = self
            .store
            .get(&LeafKey::new(&bucket, hash))?
            .ok_or_else(|| LeafStoreError::LeafNotFound {
                bucket,
                hash: hash.to_owned(),
            })?;

        if include_content {
            if let Some(content_hash) = &data.leaf.content_hash {
                data.leaf.content = Some(self.retrieve_leaf_content(content_hash)?);
            }
        }

        Ok(data)
    }

    pub fn retrieve_leaf_content(&self, content_hash: &ContentHash) -> Result<Vec<u8>, LeafStoreError> {
        self.store
            .get(&ContentKey(*content_hash))?
            .ok_or_else(|| LeafStoreError::ContentNotFound(hex::encode(content_hash)))
    }

    /// Reassembles the DAG under `root` by following links from the root.
    pub fn build_dag_from_store(&self, root: &str, include_content: bool) -> Result<Dag, LeafStoreError> {
        let mut leaves = BTreeMap::new();
        let mut queue = VecDeque::from([root.to_owned()]);

        while let Some(hash) = queue.pop_front() {
            if leaves.contains_key(&hash) {
                continue;
            }

            let data = self.retrieve_leaf(root, &hash, include_content)?;

            queue.extend(data.leaf.links.iter().cloned());
            drop(leaves.insert(hash, data.leaf));
        }

        trace!(%root, leaves = leaves.len(), "built dag from store");

        Ok(Dag::new(root.to_owned(), leaves))
    }

    /// Stores every leaf of `dag`, parents first.
    pub fn store_dag(&self, dag: &Dag, public_key: &str, signature: &str) -> Result<(), LeafStoreError> {
        for (leaf, parent) in dag.walk()? {
            let branch = match parent {
                Some(parent) if parent.needs_branch() => {
                    let label = leaf.label().unwrap_or_default();
                    Some(parent.get_branch(label)?)
                }
                _ => None,
            };

            let data = DagLeafData {
                leaf: leaf.clone(),
                root: dag.root.clone(),
                public_key: public_key.to_owned(),
                signature: signature.to_owned(),
                parent: parent.map(|parent| parent.hash.clone()),
                branch,
            };

            self.store_leaf(&dag.root, data)?;
        }

        Ok(())
    }

    /// Roots recorded in the caches for each `(bucket, key)` pair.
    ///
    /// An owner key in place of a bucket looks up the roots that owner
    /// stored under the bucket named by the value. Pairs without a hit are
    /// skipped.
    pub fn query_dag(&self, filter: &BTreeMap<String, String>) -> Result<Vec<String>, LeafStoreError> {
        let mut roots = Vec::new();

        for (bucket, key) in filter {
            let cache = if is_owner_key(bucket) {
                self.store.get(&OwnerCacheKey {
                    public_key: bucket.clone(),
                    bucket: key.clone(),
                })?
            } else if self.cache.is_cached(bucket) {
                self.store.get(&BucketCacheKey {
                    bucket: bucket.clone(),
                    key: key.clone(),
                })?
            } else {
                None
            };

            if let Some(cache) = cache {
                roots.extend(cache.keys);
            }
        }

        Ok(roots)
    }
}
