use hornet_primitives::hash::ContentHash;
use hornet_primitives::{CacheData, DagLeafData};

use crate::db::Column;
use crate::entry::{Borsh, Entry, Identity};
use crate::key::{AsKeyParts, Key};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ContentKey(pub ContentHash);

impl AsKeyParts for ContentKey {
    fn column() -> Column {
        Column::Content
    }

    fn as_key(&self) -> Key {
        Key::default().component(&self.0)
    }
}

impl Entry for ContentKey {
    type DataType = Vec<u8>;
    type Codec = Identity;
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LeafKey {
    pub bucket: String,
    pub hash: String,
}

impl LeafKey {
    #[must_use]
    pub fn new(bucket: &str, hash: &str) -> Self {
        Self {
            bucket: bucket.to_owned(),
            hash: hash.to_owned(),
        }
    }
}

impl AsKeyParts for LeafKey {
    fn column() -> Column {
        Column::Leaves
    }

    fn as_key(&self) -> Key {
        Key::default()
            .component(self.bucket.as_bytes())
            .component(self.hash.as_bytes())
    }
}

impl Entry for LeafKey {
    type DataType = DagLeafData;
    type Codec = Borsh;
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RootIndexKey(pub String);

impl AsKeyParts for RootIndexKey {
    fn column() -> Column {
        Column::RootIndex
    }

    fn as_key(&self) -> Key {
        Key::default().component(self.0.as_bytes())
    }
}

impl Entry for RootIndexKey {
    type DataType = String;
    type Codec = Identity;
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnerCacheKey {
    pub public_key: String,
    pub bucket: String,
}

impl AsKeyParts for OwnerCacheKey {
    fn column() -> Column {
        Column::OwnerCache
    }

    fn as_key(&self) -> Key {
        Key::default()
            .component(self.public_key.as_bytes())
            .component(self.bucket.as_bytes())
    }
}

impl Entry for OwnerCacheKey {
    type DataType = CacheData;
    type Codec = Borsh;
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BucketCacheKey {
    pub bucket: String,
    pub key: String,
}

impl AsKeyParts for BucketCacheKey {
    fn column() -> Column {
        Column::BucketCache
    }

    fn as_key(&self) -> Key {
        Key::default()
            .component(self.bucket.as_bytes())
            .component(self.key.as_bytes())
    }
}

impl Entry for BucketCacheKey {
    type DataType = CacheData;
    type Codec = Borsh;
}
