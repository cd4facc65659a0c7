use hornet_network_primitives::framing::{send_message, wait_for_message};
use hornet_network_primitives::messages::{DownloadMessage, UploadMessage};
use hornet_network_primitives::stream::Stream;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, trace};

use super::finish;
use crate::client::expect_ack;
use crate::error::TransferError;
use crate::Node;

/// Serves one inbound download, one acknowledged leaf at a time.
///
/// The stream is closed once every selected leaf has been sent; the peer
/// takes the closure as completion.
pub async fn handle_download<S>(node: Node, mut stream: Stream<S>) -> Result<(), TransferError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let result = send_dag(&node, &mut stream).await;

    finish(&mut stream, result).await
}

async fn send_dag<S>(node: &Node, stream: &mut Stream<S>) -> Result<(), TransferError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let budget = node.config.message_timeout;

    let Some(request) = wait_for_message::<S, DownloadMessage>(stream, budget).await else {
        return Err(TransferError::Timeout("download message"));
    };

    let root = node
        .store
        .retrieve_leaf(&request.root, &request.root, true)
        .map_err(TransferError::MissingRoot)?;

    root.leaf
        .verify_root_leaf()
        .map_err(TransferError::RootVerification)?;

    let allowed = node
        .policy
        .can_download_dag(&root.leaf, &request.public_key, &request.signature)
        .await;

    if !allowed {
        return Err(TransferError::DownloadDenied);
    }

    let dag = node
        .store
        .build_dag_from_store(&request.root, true)
        .map_err(TransferError::BuildDag)?;

    let include_content = request
        .filter
        .as_ref()
        .is_none_or(|filter| filter.include_content);

    let count = dag.len() as u64;

    debug!(root = %request.root, count, filtered = request.filter.is_some(), "sending dag");

    let mut sent = 0_u64;

    for (leaf, parent) in dag.walk().map_err(TransferError::Walk)? {
        let (parent_hash, branch) = match parent {
            None => (None, None),
            Some(parent) => {
                if let Some(filter) = &request.filter {
                    if !filter.includes(&leaf.hash) {
                        trace!(hash = %leaf.hash, "filtered out");
                        continue;
                    }
                }

                leaf.verify_leaf()
                    .map_err(|source| TransferError::LeafVerification {
                        hash: leaf.hash.clone(),
                        source,
                    })?;

                let branch_failed = |source| TransferError::Branch {
                    hash: leaf.hash.clone(),
                    source,
                };

                let branch = if parent.needs_branch() {
                    let label = leaf.label().unwrap_or_default();
                    Some(parent.get_branch(label).map_err(branch_failed)?)
                } else {
                    None
                };

                parent
                    .verify_child(&leaf.hash, branch.as_ref())
                    .map_err(branch_failed)?;

                (Some(parent.hash.clone()), branch)
            }
        };

        let mut leaf = leaf.clone();

        if !include_content {
            leaf.content = None;
        }

        let message = UploadMessage {
            root: request.root.clone(),
            count,
            leaf,
            parent: parent_hash,
            branch,
            public_key: root.public_key.clone(),
            signature: root.signature.clone(),
        };

        send_message(stream, message)
            .await
            .map_err(TransferError::Send)?;

        expect_ack(stream, &node.config).await?;

        sent = sent.saturating_add(1);
    }

    info!(root = %request.root, sent, "sent dag");

    Ok(())
}
