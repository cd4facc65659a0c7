use crate::db::Column;

mod leaf;

pub use leaf::{BucketCacheKey, ContentKey, LeafKey, OwnerCacheKey, RootIndexKey};

/// Encoded key. Each component is prefixed with its length so that
/// variable-length parts cannot run into each other.
#[derive(Clone, Debug, Default, Eq, Ord, PartialEq, PartialOrd)]
pub struct Key(Vec<u8>);

impl Key {
    #[must_use]
    pub fn component(mut self, part: &[u8]) -> Self {
        let len = u32::try_from(part.len()).unwrap_or(u32::MAX);

        self.0.extend_from_slice(&len.to_be_bytes());
        self.0.extend_from_slice(part);
        self
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

pub trait AsKeyParts {
    fn column() -> Column;
    fn as_key(&self) -> Key;
}
