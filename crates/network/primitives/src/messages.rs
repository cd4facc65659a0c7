#[cfg(test)]
#[path = "tests/messages.rs"]
mod tests;

use borsh::{BorshDeserialize, BorshSerialize};
use hornet_primitives::hash;
use hornet_primitives::{ClassicTreeBranch, DagLeaf, DagLeafData};

/// One leaf of a transfer. Sent by the uploader, and by the server while
/// serving a download.
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Eq, PartialEq)]
pub struct UploadMessage {
    pub root: String,
    /// Total number of leaves in the DAG being transferred.
    pub count: u64,
    pub leaf: DagLeaf,
    pub parent: Option<String>,
    pub branch: Option<ClassicTreeBranch>,
    pub public_key: String,
    pub signature: String,
}

impl From<UploadMessage> for DagLeafData {
    fn from(message: UploadMessage) -> Self {
        Self {
            leaf: message.leaf,
            root: message.root,
            public_key: message.public_key,
            signature: message.signature,
            parent: message.parent,
            branch: message.branch,
        }
    }
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Eq, PartialEq)]
pub struct DownloadMessage {
    pub root: String,
    pub public_key: String,
    pub signature: String,
    pub filter: Option<DownloadFilter>,
}

/// Selects leaves by label. The root is always sent.
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Default, Eq, PartialEq)]
pub struct DownloadFilter {
    pub leaves: Vec<String>,
    pub leaf_ranges: Vec<LeafRange>,
    pub include_content: bool,
}

/// Inclusive range of numeric labels.
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Eq, PartialEq)]
pub struct LeafRange {
    pub from: String,
    pub to: String,
}

impl LeafRange {
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// `false` when either bound is not a number.
    #[must_use]
    pub fn contains(&self, label: u64) -> bool {
        match (self.from.parse::<u64>(), self.to.parse::<u64>()) {
            (Ok(from), Ok(to)) => (from..=to).contains(&label),
            _ => false,
        }
    }
}

impl DownloadFilter {
    /// Whether the leaf with `hash` passes the filter.
    ///
    /// A label listed verbatim passes. Otherwise the label must parse as a
    /// number inside one of the ranges.
    #[must_use]
    pub fn includes(&self, hash: &str) -> bool {
        let Some(label) = hash::label(hash) else {
            return false;
        };

        if self.leaves.iter().any(|listed| listed == label) {
            return true;
        }

        let Ok(label) = label.parse::<u64>() else {
            return false;
        };

        self.leaf_ranges.iter().any(|range| range.contains(label))
    }
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResponseMessage {
    pub ok: bool,
}

#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Eq, PartialEq)]
pub struct ErrorMessage {
    pub message: String,
}

/// Every frame on a transfer stream carries exactly one envelope.
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, Eq, PartialEq)]
pub enum Envelope {
    Upload(Box<UploadMessage>),
    Download(Box<DownloadMessage>),
    Response(ResponseMessage),
    Error(ErrorMessage),
}

impl Envelope {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Upload(_) => "upload",
            Self::Download(_) => "download",
            Self::Response(_) => "response",
            Self::Error(_) => "error",
        }
    }
}

/// A message type that can travel inside an [`Envelope`].
pub trait Message: Into<Envelope> + Sized {
    const KIND: &'static str;

    /// Unwraps the envelope, handing it back if it holds something else.
    fn from_envelope(envelope: Envelope) -> Result<Self, Envelope>;
}

impl From<UploadMessage> for Envelope {
    fn from(message: UploadMessage) -> Self {
        Self::Upload(Box::new(message))
    }
}

impl Message for UploadMessage {
    const KIND: &'static str = "upload";

    fn from_envelope(envelope: Envelope) -> Result<Self, Envelope> {
        match envelope {
            Envelope::Upload(message) => Ok(*message),
            other => Err(other),
        }
    }
}

impl From<DownloadMessage> for Envelope {
    fn from(message: DownloadMessage) -> Self {
        Self::Download(Box::new(message))
    }
}

impl Message for DownloadMessage {
    const KIND: &'static str = "download";

    fn from_envelope(envelope: Envelope) -> Result<Self, Envelope> {
        match envelope {
            Envelope::Download(message) => Ok(*message),
            other => Err(other),
        }
    }
}

impl From<ResponseMessage> for Envelope {
    fn from(message: ResponseMessage) -> Self {
        Self::Response(message)
    }
}

impl Message for ResponseMessage {
    const KIND: &'static str = "response";

    fn from_envelope(envelope: Envelope) -> Result<Self, Envelope> {
        match envelope {
            Envelope::Response(message) => Ok(message),
            other => Err(other),
        }
    }
}

impl From<ErrorMessage> for Envelope {
    fn from(message: ErrorMessage) -> Self {
        Self::Error(message)
    }
}

impl Message for ErrorMessage {
    const KIND: &'static str = "error";

    fn from_envelope(envelope: Envelope) -> Result<Self, Envelope> {
        match envelope {
            Envelope::Error(message) => Ok(message),
            other => Err(other),
        }
    }
}
