use core::time::Duration;

use libp2p::identity::Keypair;
use multiaddr::{Multiaddr, Protocol};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 4242;

/// Connections without open streams are dropped after this long.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug)]
#[non_exhaustive]
pub struct NetworkConfig {
    pub identity: Keypair,
    pub swarm: SwarmConfig,
}

impl NetworkConfig {
    #[must_use]
    pub const fn new(identity: Keypair, swarm: SwarmConfig) -> Self {
        Self { identity, swarm }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[non_exhaustive]
pub struct SwarmConfig {
    pub listen: Vec<Multiaddr>,
}

impl SwarmConfig {
    #[must_use]
    pub const fn new(listen: Vec<Multiaddr>) -> Self {
        Self { listen }
    }

    /// TCP and QUIC on every interface.
    #[must_use]
    pub fn on_port(port: u16) -> Self {
        let tcp = Multiaddr::empty()
            .with(Protocol::Ip4([0, 0, 0, 0].into()))
            .with(Protocol::Tcp(port));
        let quic = Multiaddr::empty()
            .with(Protocol::Ip4([0, 0, 0, 0].into()))
            .with(Protocol::Udp(port))
            .with(Protocol::QuicV1);

        Self::new(vec![tcp, quic])
    }
}
