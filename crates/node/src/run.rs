use std::sync::Arc;

use camino::Utf8PathBuf;
use eyre::Result as EyreResult;
use hornet_network::config::NetworkConfig;
use hornet_network::types::NetworkEvent;
use hornet_store::config::StoreConfig;
use hornet_store::{CacheConfig, LeafStore, Store};
use hornet_store_rocksdb::RocksDB;
use libp2p::identity::Keypair;
use tracing::{debug, info};

use crate::config::TransferConfig;
use crate::handlers::handle_stream_opened;
use crate::policy::DagPolicy;
use crate::Node;

#[derive(Debug)]
#[non_exhaustive]
pub struct NodeConfig {
    pub home: Utf8PathBuf,
    pub identity: Keypair,
    pub network: NetworkConfig,
    pub datastore: StoreConfig,
    pub cache: CacheConfig,
    pub transfer: TransferConfig,
}

impl NodeConfig {
    #[must_use]
    pub const fn new(
        home: Utf8PathBuf,
        identity: Keypair,
        network: NetworkConfig,
        datastore: StoreConfig,
        cache: CacheConfig,
        transfer: TransferConfig,
    ) -> Self {
        Self {
            home,
            identity,
            network,
            datastore,
            cache,
            transfer,
        }
    }
}

/// Opens the datastore, joins the network and serves transfer sessions
/// until the network shuts down.
pub async fn start(config: NodeConfig, policy: Arc<dyn DagPolicy>) -> EyreResult<()> {
    let peer_id = config.identity.public().to_peer_id();

    info!(%peer_id, home = %config.home, "starting node");

    let store = Store::open::<RocksDB>(&config.datastore)?;
    let store = LeafStore::new(store, config.cache);

    let node = Node::new(store, policy, config.transfer);

    let (_client, mut events) = hornet_network::run(&config.network).await?;

    while let Some(event) = events.recv().await {
        match event {
            NetworkEvent::ListeningOn { address, .. } => {
                info!("listening on {}/p2p/{}", address, peer_id);
            }
            NetworkEvent::StreamOpened {
                peer_id,
                protocol,
                stream,
            } => {
                drop(handle_stream_opened(&node, peer_id, &protocol, *stream));
            }
            unhandled => debug!(?unhandled, "unhandled network event"),
        }
    }

    info!("network stopped");

    Ok(())
}
