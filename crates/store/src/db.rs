use eyre::Result as EyreResult;
use strum::{AsRefStr, EnumIter};

use crate::config::StoreConfig;
use crate::tx::Transaction;

mod memory;

pub use memory::InMemoryDB;

#[derive(AsRefStr, Clone, Copy, Debug, EnumIter, Eq, Ord, PartialEq, PartialOrd)]
#[non_exhaustive]
pub enum Column {
    /// Raw leaf content keyed by content hash.
    Content,
    /// Leaf records keyed by bucket and leaf hash.
    Leaves,
    /// Root hash to bucket name.
    RootIndex,
    /// Roots owned by a public key, per bucket.
    OwnerCache,
    /// Roots recorded under a configured field value, per bucket.
    BucketCache,
}

pub trait Database: Send + Sync + 'static {
    fn open(config: &StoreConfig) -> EyreResult<Self>
    where
        Self: Sized;

    fn has(&self, col: Column, key: &[u8]) -> EyreResult<bool>;
    fn get(&self, col: Column, key: &[u8]) -> EyreResult<Option<Vec<u8>>>;

    /// Must be all-or-nothing: readers never observe part of `tx`.
    fn apply(&self, tx: &Transaction) -> EyreResult<()>;
}
