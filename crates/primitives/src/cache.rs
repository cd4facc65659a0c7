use borsh::{BorshDeserialize, BorshSerialize};

/// Roots recorded under one cache key, in insertion order.
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Default, Eq, PartialEq)]
pub struct CacheData {
    pub keys: Vec<String>,
}

impl CacheData {
    /// Appends `key` unless already present. Returns whether it was added.
    pub fn push_unique(&mut self, key: &str) -> bool {
        if self.keys.iter().any(|existing| existing == key) {
            return false;
        }

        self.keys.push(key.to_owned());
        true
    }
}
