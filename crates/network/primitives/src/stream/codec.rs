use std::io;

use bytes::{Bytes, BytesMut};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder, LengthDelimitedCodec};

use crate::messages::Envelope;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    #[error("stream error: {0}")]
    StdIo(#[from] io::Error),
    #[error("malformed message: {0}")]
    Borsh(#[source] io::Error),
}

#[derive(Debug)]
pub(crate) struct MessageCodec {
    length_codec: LengthDelimitedCodec,
}

impl MessageCodec {
    pub(crate) fn new(max_length: usize) -> Self {
        Self {
            length_codec: LengthDelimitedCodec::builder()
                .max_frame_length(max_length)
                .new_codec(),
        }
    }
}

impl Decoder for MessageCodec {
    type Item = Envelope;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let Some(frame) = self.length_codec.decode(src)? else {
            return Ok(None);
        };

        borsh::from_slice(&frame)
            .map(Some)
            .map_err(CodecError::Borsh)
    }
}

impl Encoder<Envelope> for MessageCodec {
    type Error = CodecError;

    fn encode(&mut self, item: Envelope, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let bytes = borsh::to_vec(&item).map_err(CodecError::Borsh)?;

        self.length_codec
            .encode(Bytes::from(bytes), dst)
            .map_err(CodecError::StdIo)
    }
}
