use core::pin::Pin;
use core::task::{Context, Poll};

use futures_util::{Sink as FuturesSink, SinkExt, Stream as FuturesStream, StreamExt};
use libp2p::{Stream as P2pStream, StreamProtocol};
use tokio::io::{AsyncRead, AsyncWrite, BufStream};
use tokio_util::codec::Framed;
use tokio_util::compat::{Compat, FuturesAsyncReadCompatExt};

use crate::messages::Envelope;

mod codec;

use codec::MessageCodec;
pub use codec::CodecError;

pub const MAX_MESSAGE_SIZE: usize = 8 * 1_024 * 1_024;

pub const UPLOAD_PROTOCOL: StreamProtocol = StreamProtocol::new("/upload/1.0.0");
pub const DOWNLOAD_PROTOCOL: StreamProtocol = StreamProtocol::new("/download/1.0.0");

/// Framed envelope stream over any byte transport. Defaults to a libp2p
/// stream.
#[derive(Debug)]
pub struct Stream<S = Compat<P2pStream>> {
    inner: Framed<BufStream<S>, MessageCodec>,
}

impl Stream {
    #[must_use]
    pub fn new(stream: P2pStream) -> Self {
        Self::from_io(stream.compat())
    }
}

impl<S: AsyncRead + AsyncWrite> Stream<S> {
    #[must_use]
    pub fn from_io(io: S) -> Self {
        let stream = BufStream::new(io);
        let stream = Framed::new(stream, MessageCodec::new(MAX_MESSAGE_SIZE));
        Self { inner: stream }
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> FuturesStream for Stream<S> {
    type Item = Result<Envelope, CodecError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> FuturesSink<Envelope> for Stream<S> {
    type Error = CodecError;

    fn poll_ready(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready_unpin(cx)
    }

    fn start_send(mut self: Pin<&mut Self>, item: Envelope) -> Result<(), Self::Error> {
        self.inner.start_send_unpin(item)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_flush_unpin(cx)
    }

    fn poll_close(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_close_unpin(cx)
    }
}
