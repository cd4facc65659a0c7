use std::sync::Arc;

use hornet_store::LeafStore;

use crate::config::TransferConfig;
use crate::policy::DagPolicy;

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod files;
pub mod policy;
mod run;

pub use run::{start, NodeConfig};

/// State shared by every session a node serves.
#[derive(Clone)]
pub struct Node {
    store: LeafStore,
    policy: Arc<dyn DagPolicy>,
    config: TransferConfig,
}

impl core::fmt::Debug for Node {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Node")
            .field("store", &self.store)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Node {
    #[must_use]
    pub fn new(store: LeafStore, policy: Arc<dyn DagPolicy>, config: TransferConfig) -> Self {
        Self {
            store,
            policy,
            config,
        }
    }

    #[must_use]
    pub const fn store(&self) -> &LeafStore {
        &self.store
    }
}
