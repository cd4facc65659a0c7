use hornet_network_primitives::stream::{Stream, DOWNLOAD_PROTOCOL, UPLOAD_PROTOCOL};
use libp2p::{PeerId, StreamProtocol};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::task::JoinHandle;
use tokio::spawn;
use tracing::{debug, info, warn};

use super::{handle_download, handle_upload};
use crate::Node;

/// Runs the session matching `protocol` on its own task.
///
/// Returns `None`, dropping the stream, for protocols this node does not
/// serve.
pub fn handle_stream_opened<S>(
    node: &Node,
    peer_id: PeerId,
    protocol: &StreamProtocol,
    stream: Stream<S>,
) -> Option<JoinHandle<()>>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let node = node.clone();

    if *protocol == UPLOAD_PROTOCOL {
        info!(%peer_id, "upload session opened");

        return Some(spawn(async move {
            if let Err(err) = handle_upload(node, stream).await {
                debug!(%peer_id, %err, "upload session failed");
            }
        }));
    }

    if *protocol == DOWNLOAD_PROTOCOL {
        info!(%peer_id, "download session opened");

        return Some(spawn(async move {
            if let Err(err) = handle_download(node, stream).await {
                debug!(%peer_id, %err, "download session failed");
            }
        }));
    }

    warn!(%peer_id, %protocol, "no handler for protocol");

    None
}
