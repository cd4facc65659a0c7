use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use eyre::{eyre, Result as EyreResult};

use crate::config::StoreConfig;
use crate::db::{Column, Database};
use crate::tx::Transaction;

type Columns = BTreeMap<Column, BTreeMap<Vec<u8>, Vec<u8>>>;

#[derive(Debug, Default)]
pub struct InMemoryDB {
    inner: RwLock<Columns>,
}

impl InMemoryDB {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn db(&self) -> EyreResult<RwLockReadGuard<'_, Columns>> {
        self.inner
            .read()
            .map_err(|_| eyre!("failed to acquire read lock on db"))
    }

    fn db_mut(&self) -> EyreResult<RwLockWriteGuard<'_, Columns>> {
        self.inner
            .write()
            .map_err(|_| eyre!("failed to acquire write lock on db"))
    }
}

impl Database for InMemoryDB {
    fn open(_config: &StoreConfig) -> EyreResult<Self> {
        Ok(Self::default())
    }

    fn has(&self, col: Column, key: &[u8]) -> EyreResult<bool> {
        self.get(col, key).map(|value| value.is_some())
    }

    fn get(&self, col: Column, key: &[u8]) -> EyreResult<Option<Vec<u8>>> {
        let db = self.db()?;

        Ok(db.get(&col).and_then(|column| column.get(key)).cloned())
    }

    fn apply(&self, tx: &Transaction) -> EyreResult<()> {
        let mut db = self.db_mut()?;

        for (column, key, value) in tx.iter() {
            drop(db.entry(column).or_default().insert(key.to_vec(), value.to_vec()));
        }

        Ok(())
    }
}
