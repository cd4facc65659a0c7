use libp2p::swarm::SwarmEvent;
use libp2p::{identify, ping};
use tracing::{debug, trace, warn};

use crate::types::NetworkEvent;
use crate::{BehaviourEvent, EventLoop};

pub(crate) trait EventHandler<E> {
    async fn handle(&mut self, event: E);
}

impl EventLoop {
    pub(crate) async fn handle_swarm_event(&mut self, event: SwarmEvent<BehaviourEvent>) {
        match event {
            SwarmEvent::Behaviour(BehaviourEvent::Identify(event)) => self.handle(event).await,
            SwarmEvent::Behaviour(BehaviourEvent::Ping(event)) => self.handle(event).await,
            SwarmEvent::Behaviour(BehaviourEvent::Stream(())) => {}
            SwarmEvent::NewListenAddr {
                listener_id,
                address,
            } => {
                let local_peer_id = *self.swarm.local_peer_id();

                debug!(%address, %local_peer_id, "listening");

                if self
                    .event_sender
                    .send(NetworkEvent::ListeningOn {
                        listener_id,
                        address,
                    })
                    .await
                    .is_err()
                {
                    warn!("network event receiver dropped");
                }
            }
            SwarmEvent::ConnectionEstablished { peer_id, .. } => {
                debug!(%peer_id, "connection established");

                if let Some(sender) = self.pending_dial.remove(&peer_id) {
                    drop(sender.send(Ok(peer_id)));
                }
            }
            SwarmEvent::ConnectionClosed { peer_id, cause, .. } => {
                debug!(%peer_id, ?cause, "connection closed");
            }
            SwarmEvent::OutgoingConnectionError {
                peer_id: Some(peer_id),
                error,
                ..
            } => {
                debug!(%peer_id, %error, "outgoing connection failed");

                if let Some(sender) = self.pending_dial.remove(&peer_id) {
                    drop(sender.send(Err(error.into())));
                }
            }
            SwarmEvent::IncomingConnectionError { error, .. } => {
                debug!(%error, "incoming connection failed");
            }
            SwarmEvent::ListenerError { listener_id, error } => {
                warn!(?listener_id, %error, "listener failed");
            }
            unhandled => trace!(?unhandled, "unhandled swarm event"),
        }
    }
}

impl EventHandler<identify::Event> for EventLoop {
    async fn handle(&mut self, event: identify::Event) {
        trace!(?event, "identify");

        if let identify::Event::Received { peer_id, info, .. } = event {
            debug!(%peer_id, agent = %info.agent_version, "identified peer");
        }
    }
}

impl EventHandler<ping::Event> for EventLoop {
    async fn handle(&mut self, event: ping::Event) {
        trace!(peer_id = %event.peer, result = ?event.result, "ping");
    }
}
