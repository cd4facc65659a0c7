use std::error::Error as StdError;

use futures_util::SinkExt;
use hornet_network_primitives::framing::write_error;
use hornet_network_primitives::stream::Stream;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, trace};

use crate::error::TransferError;

pub mod download;
mod stream_opened;
pub mod upload;

pub use download::handle_download;
pub use stream_opened::handle_stream_opened;
pub use upload::handle_upload;

/// Reports a failed session to the peer, then closes the stream either way.
async fn finish<S>(stream: &mut Stream<S>, result: Result<(), TransferError>) -> Result<(), TransferError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    if let Err(err) = &result {
        let text = match err.source() {
            Some(source) => format!("{err}: {source}"),
            None => err.to_string(),
        };

        if let Err(send_err) = write_error(stream, &text, None).await {
            debug!(%send_err, "failed to report error to peer");
        }
    }

    if let Err(err) = stream.close().await {
        trace!(%err, "failed to close stream");
    }

    result
}
