use std::collections::BTreeMap;

use eyre::Result as EyreResult;

use crate::db::Column;
use crate::entry::{Codec, Entry};

/// A batch of writes applied atomically by [`Database::apply`](crate::db::Database::apply).
///
/// A later write to the same key replaces the earlier one.
#[derive(Debug, Default)]
pub struct Transaction {
    cols: BTreeMap<Column, BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl Transaction {
    pub fn put<E: Entry>(&mut self, key: &E, value: &E::DataType) -> EyreResult<()> {
        let value = E::Codec::encode(value)?;

        self.put_raw(E::column(), key.as_key().into_bytes(), value);

        Ok(())
    }

    pub fn put_raw(&mut self, column: Column, key: Vec<u8>, value: Vec<u8>) {
        drop(
            self.cols
                .entry(column)
                .or_default()
                .insert(key, value),
        );
    }

    pub fn iter(&self) -> impl Iterator<Item = (Column, &[u8], &[u8])> {
        self.cols.iter().flat_map(|(column, writes)| {
            writes
                .iter()
                .map(move |(key, value)| (*column, key.as_slice(), value.as_slice()))
        })
    }
}
