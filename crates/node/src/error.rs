use hornet_network_primitives::framing::RecvError;
use hornet_network_primitives::stream::CodecError;
use hornet_primitives::{DagError, LeafError};
use hornet_store::LeafStoreError;
use thiserror::Error;

/// Why a transfer session ended early.
///
/// The display text is what the peer sees first; the source, when there is
/// one, is appended to it in the error message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransferError {
    #[error("failed to receive {0} in time")]
    Timeout(&'static str),
    #[error("root leaf failed verification")]
    RootVerification(#[source] LeafError),
    #[error("leaf `{actual}` does not belong to root `{expected}`")]
    RootMismatch { expected: String, actual: String },
    #[error("not allowed to upload this dag")]
    UploadDenied,
    #[error("not allowed to download this dag")]
    DownloadDenied,
    #[error("failed to store leaf")]
    Store(#[source] LeafStoreError),
    #[error("leaf `{hash}` failed verification")]
    LeafVerification {
        hash: String,
        #[source]
        source: LeafError,
    },
    #[error("leaf `{0}` does not name a parent")]
    MissingParent(String),
    #[error("failed to retrieve parent `{parent}`")]
    ParentLookup {
        parent: String,
        #[source]
        source: LeafStoreError,
    },
    #[error("parent `{parent}` of leaf `{hash}` was not received")]
    UnknownParent { hash: String, parent: String },
    #[error("branch proof for `{hash}` failed verification")]
    Branch {
        hash: String,
        #[source]
        source: LeafError,
    },
    #[error("failed to build dag from store")]
    BuildDag(#[source] LeafStoreError),
    #[error("dag failed verification")]
    DagVerification(#[source] DagError),
    #[error("node does not have root leaf")]
    MissingRoot(#[source] LeafStoreError),
    #[error("failed to walk dag")]
    Walk(#[source] DagError),
    #[error("failed to send message")]
    Send(#[source] CodecError),
    #[error("failed to receive message")]
    Recv(#[source] RecvError),
    #[error("peer did not acknowledge leaf")]
    NoResponse,
    #[error("peer reported an error: {0}")]
    Remote(String),
    #[error("unexpected message, expected {0}")]
    Unexpected(&'static str),
    #[error("peer closed the stream before sending the root")]
    NoLeaves,
}
