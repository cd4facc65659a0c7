use hornet_network_primitives::framing::{wait_for_message, write_response};
use hornet_network_primitives::messages::UploadMessage;
use hornet_network_primitives::stream::Stream;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, trace};

use super::finish;
use crate::error::TransferError;
use crate::Node;

/// Serves one inbound upload: root first, then children until the peer stops
/// sending, then the whole DAG is rebuilt from the store and verified.
pub async fn handle_upload<S>(node: Node, mut stream: Stream<S>) -> Result<(), TransferError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let result = receive_dag(&node, &mut stream).await;

    finish(&mut stream, result).await
}

async fn receive_dag<S>(node: &Node, stream: &mut Stream<S>) -> Result<(), TransferError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let budget = node.config.message_timeout;

    let Some(message) = wait_for_message::<S, UploadMessage>(stream, budget).await else {
        return Err(TransferError::Timeout("upload message"));
    };

    message
        .leaf
        .verify_root_leaf()
        .map_err(TransferError::RootVerification)?;

    if message.leaf.hash != message.root {
        return Err(TransferError::RootMismatch {
            expected: message.root,
            actual: message.leaf.hash,
        });
    }

    let allowed = node
        .policy
        .can_upload_dag(&message.leaf, &message.public_key, &message.signature)
        .await;

    if !allowed {
        return Err(TransferError::UploadDenied);
    }

    let root = message.root.clone();
    let public_key = message.public_key.clone();

    debug!(%root, count = message.count, "receiving dag");

    node.store
        .store_leaf(&root, message.into())
        .map_err(TransferError::Store)?;

    write_response(stream, true)
        .await
        .map_err(TransferError::Send)?;

    let mut received = 1_u64;

    while let Some(message) = wait_for_message::<S, UploadMessage>(stream, budget).await {
        let hash = message.leaf.hash.clone();

        if message.root != root {
            return Err(TransferError::RootMismatch {
                expected: root,
                actual: hash,
            });
        }

        message
            .leaf
            .verify_leaf()
            .map_err(|source| TransferError::LeafVerification {
                hash: hash.clone(),
                source,
            })?;

        let parent_hash = message
            .parent
            .as_deref()
            .ok_or_else(|| TransferError::MissingParent(hash.clone()))?;

        let parent = node
            .store
            .retrieve_leaf(&root, parent_hash, false)
            .map_err(|source| TransferError::ParentLookup {
                parent: parent_hash.to_owned(),
                source,
            })?;

        parent
            .leaf
            .verify_child(&hash, message.branch.as_ref())
            .map_err(|source| TransferError::Branch {
                hash: hash.clone(),
                source,
            })?;

        node.store
            .store_leaf(&root, message.into())
            .map_err(TransferError::Store)?;

        write_response(stream, true)
            .await
            .map_err(TransferError::Send)?;

        received = received.saturating_add(1);

        trace!(%root, %hash, received, "stored leaf");
    }

    let dag = node
        .store
        .build_dag_from_store(&root, true)
        .map_err(TransferError::BuildDag)?;

    dag.verify().map_err(TransferError::DagVerification)?;

    info!(%root, leaves = dag.len(), %public_key, "received dag");

    node.policy.handle_received_dag(dag, &public_key).await;

    Ok(())
}
