//! The initiating side of a transfer.
//!
//! Both drivers mirror the session handlers: every leaf is acknowledged
//! before the next one moves, and a peer's [`ErrorMessage`] surfaces as
//! [`TransferError::Remote`].

use std::collections::BTreeMap;

use futures_util::SinkExt;
use hornet_network_primitives::framing::{recv, send_message, write_response, RecvError};
use hornet_network_primitives::messages::{
    DownloadMessage, Envelope, ErrorMessage, Message, ResponseMessage, UploadMessage,
};
use hornet_network_primitives::stream::Stream;
use hornet_primitives::{Dag, DagLeaf};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, trace};

use crate::config::TransferConfig;
use crate::error::TransferError;

/// Sends `dag` leaf by leaf, parents first, then waits for the peer's
/// verdict on the whole DAG.
pub async fn upload_dag<S>(
    stream: &mut Stream<S>,
    dag: &Dag,
    public_key: &str,
    signature: &str,
    config: &TransferConfig,
) -> Result<(), TransferError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let count = dag.len() as u64;

    for (leaf, parent) in dag.walk().map_err(TransferError::Walk)? {
        let branch = match parent {
            Some(parent) if parent.needs_branch() => {
                let label = leaf.label().unwrap_or_default();
                let branch = parent
                    .get_branch(label)
                    .map_err(|source| TransferError::Branch {
                        hash: leaf.hash.clone(),
                        source,
                    })?;
                Some(branch)
            }
            _ => None,
        };

        let message = UploadMessage {
            root: dag.root.clone(),
            count,
            leaf: leaf.clone(),
            parent: parent.map(|parent| parent.hash.clone()),
            branch,
            public_key: public_key.to_owned(),
            signature: signature.to_owned(),
        };

        send_message(stream, message)
            .await
            .map_err(TransferError::Send)?;

        expect_ack(stream, config).await?;

        trace!(root = %dag.root, hash = %leaf.hash, "leaf acknowledged");
    }

    // The peer finalises once it sees the end of our half.
    stream.close().await.map_err(TransferError::Send)?;

    let verdict = recv(stream, config.message_timeout)
        .await
        .map_err(recv_failed("upload verdict"))?;

    match verdict {
        None => {
            info!(root = %dag.root, leaves = count, "uploaded dag");
            Ok(())
        }
        Some(Envelope::Error(ErrorMessage { message })) => Err(TransferError::Remote(message)),
        Some(_) => Err(TransferError::Unexpected("stream closure")),
    }
}

/// Requests the DAG named in `request` and assembles what arrives.
///
/// Without a filter the result is verified as a whole. A filtered download
/// is a partial DAG, so only the individual leaves are checked.
pub async fn download_dag<S>(
    stream: &mut Stream<S>,
    request: DownloadMessage,
    config: &TransferConfig,
) -> Result<Dag, TransferError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let root = request.root.clone();
    let filtered = request.filter.is_some();

    send_message(stream, request)
        .await
        .map_err(TransferError::Send)?;

    let mut leaves = BTreeMap::<String, DagLeaf>::new();

    while let Some(envelope) = recv(stream, config.message_timeout)
        .await
        .map_err(recv_failed("upload message"))?
    {
        let message = match UploadMessage::from_envelope(envelope) {
            Ok(message) => message,
            Err(Envelope::Error(ErrorMessage { message })) => {
                return Err(TransferError::Remote(message))
            }
            Err(_) => return Err(TransferError::Unexpected(UploadMessage::KIND)),
        };

        let leaf = message.leaf;

        if message.root != root {
            return Err(TransferError::RootMismatch {
                expected: root,
                actual: leaf.hash,
            });
        }

        if leaves.is_empty() {
            if leaf.hash != root {
                return Err(TransferError::RootMismatch {
                    expected: root,
                    actual: leaf.hash,
                });
            }

            leaf.verify_root_leaf()
                .map_err(TransferError::RootVerification)?;

            debug!(%root, count = message.count, "receiving dag");
        } else {
            leaf.verify_leaf()
                .map_err(|source| TransferError::LeafVerification {
                    hash: leaf.hash.clone(),
                    source,
                })?;

            let parent_hash = message
                .parent
                .ok_or_else(|| TransferError::MissingParent(leaf.hash.clone()))?;

            match leaves.get(&parent_hash) {
                Some(parent) => {
                    parent
                        .verify_child(&leaf.hash, message.branch.as_ref())
                        .map_err(|source| TransferError::Branch {
                            hash: leaf.hash.clone(),
                            source,
                        })?;
                }
                None if filtered => {}
                None => {
                    return Err(TransferError::UnknownParent {
                        hash: leaf.hash,
                        parent: parent_hash,
                    })
                }
            }
        }

        write_response(stream, true)
            .await
            .map_err(TransferError::Send)?;

        drop(leaves.insert(leaf.hash.clone(), leaf));
    }

    if leaves.is_empty() {
        return Err(TransferError::NoLeaves);
    }

    if let Err(err) = stream.close().await {
        trace!(%err, "failed to close stream");
    }

    let dag = Dag::new(root, leaves);

    if !filtered {
        dag.verify().map_err(TransferError::DagVerification)?;
    }

    info!(root = %dag.root, leaves = dag.len(), filtered, "downloaded dag");

    Ok(dag)
}

pub(crate) async fn expect_ack<S>(stream: &mut Stream<S>, config: &TransferConfig) -> Result<(), TransferError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let envelope = recv(stream, config.message_timeout)
        .await
        .map_err(recv_failed("response"))?;

    match envelope {
        Some(Envelope::Response(ResponseMessage { ok: true })) => Ok(()),
        Some(Envelope::Error(ErrorMessage { message })) => Err(TransferError::Remote(message)),
        Some(Envelope::Response(_)) | None => Err(TransferError::NoResponse),
        Some(_) => Err(TransferError::Unexpected(ResponseMessage::KIND)),
    }
}

fn recv_failed(expected: &'static str) -> impl FnOnce(RecvError) -> TransferError {
    move |err| match err {
        RecvError::Timeout => TransferError::Timeout(expected),
        err => TransferError::Recv(err),
    }
}
