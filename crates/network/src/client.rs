use core::time::Duration;

use eyre::{eyre, Result as EyreResult, WrapErr};
use hornet_network_primitives::stream::Stream;
use libp2p::{Multiaddr, PeerId, StreamProtocol};
use libp2p_stream::Control;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;

use crate::Command;

/// How long a dial may take before the caller gives up on it.
pub const DIAL_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct NetworkClient {
    peer_id: PeerId,
    sender: mpsc::Sender<Command>,
    control: Control,
}

impl core::fmt::Debug for NetworkClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NetworkClient")
            .field("peer_id", &self.peer_id)
            .finish_non_exhaustive()
    }
}

impl NetworkClient {
    pub(crate) const fn new(peer_id: PeerId, sender: mpsc::Sender<Command>, control: Control) -> Self {
        Self {
            peer_id,
            sender,
            control,
        }
    }

    #[must_use]
    pub const fn peer_id(&self) -> PeerId {
        self.peer_id
    }

    pub async fn listen_on(&self, addr: Multiaddr) -> EyreResult<()> {
        let (sender, receiver) = oneshot::channel();

        self.send(Command::ListenOn { addr, sender }).await?;

        receiver.await.wrap_err("network event loop stopped")?
    }

    /// Connects to `peer_addr`, which must end in `/p2p/<peer id>`.
    pub async fn dial(&self, peer_addr: Multiaddr) -> EyreResult<PeerId> {
        let (sender, receiver) = oneshot::channel();

        self.send(Command::Dial { peer_addr, sender }).await?;

        timeout(DIAL_TIMEOUT, receiver)
            .await
            .map_err(|_| eyre!("dial timed out after {DIAL_TIMEOUT:?}"))?
            .wrap_err("network event loop stopped")?
    }

    pub async fn open_stream(&self, peer_id: PeerId, protocol: StreamProtocol) -> EyreResult<Stream> {
        let mut control = self.control.clone();

        let stream = control
            .open_stream(peer_id, protocol.clone())
            .await
            .map_err(|err| eyre!("failed to open {protocol} stream to {peer_id}: {err}"))?;

        Ok(Stream::new(stream))
    }

    async fn send(&self, command: Command) -> EyreResult<()> {
        self.sender
            .send(command)
            .await
            .map_err(|_| eyre!("network event loop stopped"))
    }
}
