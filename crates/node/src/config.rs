use core::time::Duration;

use hornet_network_primitives::framing::DEFAULT_MESSAGE_TIMEOUT;

#[derive(Clone, Copy, Debug)]
#[non_exhaustive]
pub struct TransferConfig {
    /// How long a session waits for each expected message.
    pub message_timeout: Duration,
}

impl TransferConfig {
    #[must_use]
    pub const fn new(message_timeout: Duration) -> Self {
        Self { message_timeout }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE_TIMEOUT)
    }
}
