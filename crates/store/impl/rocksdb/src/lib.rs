//! RocksDB implementation of the store's `Database` trait.
//!
//! Each [`Column`] maps to a column family. A [`Transaction`] is written as
//! one `WriteBatch`, so its operations become visible together.


use eyre::{bail, Result as EyreResult};
use hornet_store::config::StoreConfig;
use hornet_store::db::{Column, Database};
use hornet_store::tx::Transaction;
use rocksdb::{BlockBasedOptions, Cache, ColumnFamily, Options, WriteBatch, DB};
use strum::IntoEnumIterator;

/// Limits file descriptor usage.
const DEFAULT_MAX_OPEN_FILES: i32 = 256;

/// Block cache size in bytes (128MB).
const DEFAULT_BLOCK_CACHE_SIZE: usize = 128 * 1024 * 1024;

#[derive(Debug)]
pub struct RocksDB {
    db: DB,
}

impl RocksDB {
    fn cf_handle(&self, column: Column) -> Option<&ColumnFamily> {
        self.db.cf_handle(column.as_ref())
    }

    fn try_cf_handle(&self, column: Column) -> EyreResult<&ColumnFamily> {
        let Some(cf_handle) = self.cf_handle(column) else {
            bail!("unknown column family: {:?}", column);
        };

        Ok(cf_handle)
    }
}

impl Database for RocksDB {
    fn open(config: &StoreConfig) -> EyreResult<Self> {
        let mut options = Options::default();

        options.create_if_missing(true);
        options.create_missing_column_families(true);
        options.set_max_open_files(DEFAULT_MAX_OPEN_FILES);

        let cache = Cache::new_lru_cache(DEFAULT_BLOCK_CACHE_SIZE);
        let mut block_opts = BlockBasedOptions::default();
        block_opts.set_block_cache(&cache);
        options.set_block_based_table_factory(&block_opts);

        Ok(Self {
            db: DB::open_cf(&options, &config.path, Column::iter())?,
        })
    }

    fn has(&self, col: Column, key: &[u8]) -> EyreResult<bool> {
        let cf_handle = self.try_cf_handle(col)?;

        let exists =
            self.db.key_may_exist_cf(cf_handle, key) && self.get(col, key)?.is_some();

        Ok(exists)
    }

    fn get(&self, col: Column, key: &[u8]) -> EyreResult<Option<Vec<u8>>> {
        let cf_handle = self.try_cf_handle(col)?;

        let value = self.db.get_pinned_cf(cf_handle, key)?;

        Ok(value.map(|value| value.to_vec()))
    }

    fn apply(&self, tx: &Transaction) -> EyreResult<()> {
        let mut batch = WriteBatch::default();

        let mut unknown_cfs = vec![];

        for (col, key, value) in tx.iter() {
            let Some(cf) = self.cf_handle(col) else {
                unknown_cfs.push(col);
                continue;
            };

            batch.put_cf(cf, key, value);
        }

        if !unknown_cfs.is_empty() {
            bail!("unknown column families: {:?}", unknown_cfs);
        }

        self.db.write(batch)?;

        Ok(())
    }
}
