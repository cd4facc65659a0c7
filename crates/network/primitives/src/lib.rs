pub mod framing;
pub mod messages;
pub mod stream;
