use hornet_network_primitives::stream::Stream;
use libp2p::core::transport::ListenerId;
use libp2p::{Multiaddr, PeerId, StreamProtocol};

#[derive(Debug)]
#[non_exhaustive]
pub enum NetworkEvent {
    ListeningOn {
        listener_id: ListenerId,
        address: Multiaddr,
    },
    StreamOpened {
        peer_id: PeerId,
        protocol: StreamProtocol,
        stream: Box<Stream>,
    },
}
