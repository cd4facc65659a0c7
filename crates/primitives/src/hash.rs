#[cfg(test)]
#[path = "tests/hash.rs"]
mod tests;

use sha2::{Digest, Sha256};

pub const HASH_LEN: usize = 32;

/// SHA-256 digest of a leaf's raw content.
pub type ContentHash = [u8; HASH_LEN];

const LABEL_SEPARATOR: char = ':';

#[must_use]
pub fn sha256(data: &[u8]) -> [u8; HASH_LEN] {
    Sha256::digest(data).into()
}

/// Returns the label of a non-root leaf hash (`<label>:<hex>`).
///
/// Root hashes carry no label.
#[must_use]
pub fn label(hash: &str) -> Option<&str> {
    hash.split_once(LABEL_SEPARATOR).map(|(label, _)| label)
}

/// The label parsed as an integer, as used by range filters.
#[must_use]
pub fn numeric_label(hash: &str) -> Option<u64> {
    label(hash)?.parse().ok()
}

/// Splits a hash into its optional label and the hex digest.
#[must_use]
pub fn split(hash: &str) -> (Option<&str>, &str) {
    match hash.split_once(LABEL_SEPARATOR) {
        Some((label, digest)) => (Some(label), digest),
        None => (None, hash),
    }
}

#[must_use]
pub fn labelled(label: u64, digest: &[u8; HASH_LEN]) -> String {
    format!("{label}{LABEL_SEPARATOR}{}", hex::encode(digest))
}
