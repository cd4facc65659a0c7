//! Send, receive and acknowledge envelopes on a [`Stream`].
//!
//! Waiters report absence instead of failing: a timeout, a closed stream, a
//! malformed frame and an unexpected message all come back as `None`.

#[cfg(test)]
#[path = "tests/framing.rs"]
mod tests;

use core::time::Duration;
use std::error::Error as StdError;

use futures_util::{SinkExt, TryStreamExt};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::time::timeout;
use tracing::{debug, trace, warn};

use crate::messages::{Envelope, ErrorMessage, Message, ResponseMessage};
use crate::stream::{CodecError, Stream};

/// How long a peer may stay silent where a message is expected.
pub const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecvError {
    #[error("timed out waiting for a message")]
    Timeout,
    #[error(transparent)]
    Codec(#[from] CodecError),
}

pub async fn send_message<S, M>(stream: &mut Stream<S>, message: M) -> Result<(), CodecError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    M: Into<Envelope>,
{
    stream.send(message.into()).await
}

/// Next envelope within `budget`. `Ok(None)` once the peer has closed.
pub async fn recv<S>(stream: &mut Stream<S>, budget: Duration) -> Result<Option<Envelope>, RecvError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match timeout(budget, stream.try_next()).await {
        Ok(envelope) => Ok(envelope?),
        Err(_elapsed) => Err(RecvError::Timeout),
    }
}

pub async fn wait_for_message<S, M>(stream: &mut Stream<S>, budget: Duration) -> Option<M>
where
    S: AsyncRead + AsyncWrite + Unpin,
    M: Message,
{
    let envelope = match recv(stream, budget).await {
        Ok(Some(envelope)) => envelope,
        Ok(None) => {
            trace!(expected = M::KIND, "stream closed");
            return None;
        }
        Err(RecvError::Timeout) => {
            debug!(expected = M::KIND, ?budget, "timed out waiting for message");
            return None;
        }
        Err(RecvError::Codec(err)) => {
            debug!(expected = M::KIND, %err, "failed to read message");
            return None;
        }
    };

    match M::from_envelope(envelope) {
        Ok(message) => Some(message),
        Err(Envelope::Error(ErrorMessage { message })) => {
            warn!(expected = M::KIND, %message, "peer reported an error");
            None
        }
        Err(other) => {
            warn!(expected = M::KIND, received = other.kind(), "unexpected message");
            None
        }
    }
}

/// Sends an [`ErrorMessage`]. The caller still has to close the stream.
pub async fn write_error<S>(
    stream: &mut Stream<S>,
    text: &str,
    cause: Option<&(dyn StdError + Send + Sync + 'static)>,
) -> Result<(), CodecError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let message = match cause {
        Some(cause) => format!("{text}: {cause}"),
        None => text.to_owned(),
    };

    debug!(%message, "reporting error to peer");

    send_message(stream, ErrorMessage { message }).await
}

pub async fn write_response<S>(stream: &mut Stream<S>, ok: bool) -> Result<(), CodecError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    send_message(stream, ResponseMessage { ok }).await
}

/// `true` only for a positive acknowledgement within `budget`.
pub async fn wait_for_response<S>(stream: &mut Stream<S>, budget: Duration) -> bool
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    wait_for_message::<S, ResponseMessage>(stream, budget)
        .await
        .is_some_and(|response| response.ok)
}
