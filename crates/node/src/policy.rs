use async_trait::async_trait;
use hornet_primitives::{Dag, DagLeaf};
use tracing::debug;

/// Decides who may move which DAGs, and receives completed uploads.
#[async_trait]
pub trait DagPolicy: Send + Sync + 'static {
    async fn can_upload_dag(&self, root: &DagLeaf, public_key: &str, signature: &str) -> bool;

    async fn can_download_dag(&self, root: &DagLeaf, public_key: &str, signature: &str) -> bool;

    /// Called once a fully verified DAG has been persisted.
    async fn handle_received_dag(&self, dag: Dag, public_key: &str);
}

/// Accepts every transfer and only logs what arrives.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

#[async_trait]
impl DagPolicy for AllowAll {
    async fn can_upload_dag(&self, _root: &DagLeaf, _public_key: &str, _signature: &str) -> bool {
        true
    }

    async fn can_download_dag(&self, _root: &DagLeaf, _public_key: &str, _signature: &str) -> bool {
        true
    }

    async fn handle_received_dag(&self, dag: Dag, public_key: &str) {
        debug!(root = %dag.root, leaves = dag.len(), %public_key, "received dag");
    }
}
