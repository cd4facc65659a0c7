use std::sync::Arc;

use eyre::Result as EyreResult;

pub mod bucket;
pub mod config;
pub mod db;
pub mod entry;
pub mod key;
pub mod leaves;
pub mod tx;

use config::StoreConfig;
use db::Database;
use entry::{Codec, Entry};
use key::AsKeyParts;
use tx::Transaction;

pub use bucket::{get_bucket, CacheConfig, LeafField};
pub use leaves::{LeafStore, LeafStoreError};

/// Shared handle to the underlying column database.
#[derive(Clone)]
pub struct Store {
    db: Arc<dyn Database>,
}

impl core::fmt::Debug for Store {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Store").finish_non_exhaustive()
    }
}

impl Store {
    pub fn open<T: Database>(config: &StoreConfig) -> EyreResult<Self> {
        let db = T::open(config)?;

        Ok(Self::new(Arc::new(db)))
    }

    #[must_use]
    pub fn new(db: Arc<dyn Database>) -> Self {
        Self { db }
    }

    pub fn has<K: AsKeyParts>(&self, key: &K) -> EyreResult<bool> {
        self.db.has(K::column(), key.as_key().as_bytes())
    }

    pub fn get<E: Entry>(&self, key: &E) -> EyreResult<Option<E::DataType>> {
        let Some(value) = self.db.get(E::column(), key.as_key().as_bytes())? else {
            return Ok(None);
        };

        E::Codec::decode(&value).map(Some)
    }

    /// Commits every operation in `tx` as one unit.
    pub fn apply(&self, tx: &Transaction) -> EyreResult<()> {
        self.db.apply(tx)
    }
}
