use std::collections::hash_map::{Entry, HashMap};

use eyre::{bail, eyre, Result as EyreResult};
use futures_util::StreamExt;
use hornet_network_primitives::stream::{Stream, DOWNLOAD_PROTOCOL, UPLOAD_PROTOCOL};
use libp2p::identify::{Behaviour as IdentifyBehaviour, Config as IdentifyConfig};
use libp2p::noise::Config as NoiseConfig;
use libp2p::ping::Behaviour as PingBehaviour;
use libp2p::swarm::NetworkBehaviour;
use libp2p::tcp::Config as TcpConfig;
use libp2p::tls::Config as TlsConfig;
use libp2p::yamux::Config as YamuxConfig;
use libp2p::{Multiaddr, PeerId, StreamProtocol, Swarm, SwarmBuilder};
use libp2p_stream::{Behaviour as StreamBehaviour, IncomingStreams};
use multiaddr::Protocol;
use tokio::sync::{mpsc, oneshot};
use tokio::{select, spawn};
use tracing::{debug, warn};

use crate::client::NetworkClient;
use crate::config::{NetworkConfig, DEFAULT_IDLE_TIMEOUT};
use crate::types::NetworkEvent;

pub mod client;
pub mod config;
mod events;
pub mod types;


const PROTOCOL_VERSION: &str = concat!("/", env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(NetworkBehaviour)]
struct Behaviour {
    identify: IdentifyBehaviour,
    ping: PingBehaviour,
    stream: StreamBehaviour,
}

/// Starts the swarm and begins listening on every configured address.
pub async fn run(config: &NetworkConfig) -> EyreResult<(NetworkClient, mpsc::Receiver<NetworkEvent>)> {
    let (client, event_receiver, event_loop) = init(config)?;

    drop(spawn(event_loop.run()));

    for addr in &config.swarm.listen {
        client.listen_on(addr.clone()).await?;
    }

    Ok((client, event_receiver))
}

fn init(config: &NetworkConfig) -> EyreResult<(NetworkClient, mpsc::Receiver<NetworkEvent>, EventLoop)> {
    let peer_id = config.identity.public().to_peer_id();

    let swarm = SwarmBuilder::with_existing_identity(config.identity.clone())
        .with_tokio()
        .with_tcp(
            TcpConfig::default(),
            (TlsConfig::new, NoiseConfig::new),
            YamuxConfig::default,
        )?
        .with_quic()
        .with_behaviour(|key| Behaviour {
            identify: IdentifyBehaviour::new(IdentifyConfig::new(
                PROTOCOL_VERSION.to_owned(),
                key.public(),
            )),
            ping: PingBehaviour::default(),
            stream: StreamBehaviour::new(),
        })?
        .with_swarm_config(|cfg| cfg.with_idle_connection_timeout(DEFAULT_IDLE_TIMEOUT))
        .build();

    let mut control = swarm.behaviour().stream.new_control();

    let Ok(upload_streams) = control.accept(UPLOAD_PROTOCOL) else {
        bail!("failed to register {UPLOAD_PROTOCOL}");
    };

    let Ok(download_streams) = control.accept(DOWNLOAD_PROTOCOL) else {
        bail!("failed to register {DOWNLOAD_PROTOCOL}");
    };

    let (command_sender, command_receiver) = mpsc::channel(32);
    let (event_sender, event_receiver) = mpsc::channel(32);

    let client = NetworkClient::new(peer_id, command_sender, control);

    let event_loop = EventLoop {
        swarm: Box::new(swarm),
        upload_streams: Box::new(upload_streams),
        download_streams: Box::new(download_streams),
        command_receiver,
        event_sender,
        pending_dial: HashMap::default(),
    };

    Ok((client, event_receiver, event_loop))
}

#[derive(Debug)]
pub(crate) enum Command {
    ListenOn {
        addr: Multiaddr,
        sender: oneshot::Sender<EyreResult<()>>,
    },
    Dial {
        peer_addr: Multiaddr,
        sender: oneshot::Sender<EyreResult<PeerId>>,
    },
}

pub(crate) struct EventLoop {
    swarm: Box<Swarm<Behaviour>>,
    upload_streams: Box<IncomingStreams>,
    download_streams: Box<IncomingStreams>,
    command_receiver: mpsc::Receiver<Command>,
    event_sender: mpsc::Sender<NetworkEvent>,
    pending_dial: HashMap<PeerId, oneshot::Sender<EyreResult<PeerId>>>,
}

impl EventLoop {
    pub(crate) async fn run(mut self) {
        #[expect(clippy::redundant_pub_crate, reason = "Needed for Tokio code")]
        loop {
            select! {
                event = self.swarm.select_next_some() => {
                    self.handle_swarm_event(event).await;
                }
                Some((peer_id, stream)) = self.upload_streams.next() => {
                    self.handle_incoming_stream(peer_id, UPLOAD_PROTOCOL, stream).await;
                }
                Some((peer_id, stream)) = self.download_streams.next() => {
                    self.handle_incoming_stream(peer_id, DOWNLOAD_PROTOCOL, stream).await;
                }
                command = self.command_receiver.recv() => {
                    let Some(command) = command else { break };
                    self.handle_command(command);
                }
            }
        }

        debug!("network event loop stopped");
    }

    async fn handle_incoming_stream(
        &mut self,
        peer_id: PeerId,
        protocol: StreamProtocol,
        stream: libp2p::Stream,
    ) {
        debug!(%peer_id, %protocol, "incoming stream");

        let event = NetworkEvent::StreamOpened {
            peer_id,
            protocol,
            stream: Box::new(Stream::new(stream)),
        };

        if self.event_sender.send(event).await.is_err() {
            warn!("network event receiver dropped");
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::ListenOn { addr, sender } => {
                let result = self
                    .swarm
                    .listen_on(addr)
                    .map(|_listener_id| ())
                    .map_err(Into::into);

                drop(sender.send(result));
            }
            Command::Dial { peer_addr, sender } => self.dial(peer_addr, sender),
        }
    }

    fn dial(&mut self, mut peer_addr: Multiaddr, sender: oneshot::Sender<EyreResult<PeerId>>) {
        let Some(Protocol::P2p(peer_id)) = peer_addr.pop() else {
            drop(sender.send(Err(eyre!("no peer id in address: {peer_addr}"))));
            return;
        };

        if self.swarm.is_connected(&peer_id) {
            drop(sender.send(Ok(peer_id)));
            return;
        }

        match self.pending_dial.entry(peer_id) {
            Entry::Occupied(_) => {
                drop(sender.send(Err(eyre!("already dialing {peer_id}"))));
            }
            Entry::Vacant(entry) => {
                let addr = peer_addr.with(Protocol::P2p(peer_id));

                match self.swarm.dial(addr) {
                    Ok(()) => {
                        let _ignored = entry.insert(sender);
                    }
                    Err(err) => drop(sender.send(Err(eyre!(err)))),
                }
            }
        }
    }
}
