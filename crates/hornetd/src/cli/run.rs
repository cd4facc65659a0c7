use std::sync::Arc;

use clap::Parser;
use eyre::Result as EyreResult;
use hornet_network::config::NetworkConfig;
use hornet_node::config::TransferConfig;
use hornet_node::policy::AllowAll;
use hornet_node::{start, NodeConfig};
use hornet_store::config::StoreConfig;

use crate::cli::RootArgs;

/// Run a node
#[derive(Debug, Parser)]
pub struct RunCommand;

impl RunCommand {
    pub async fn run(self, root_args: &RootArgs) -> EyreResult<()> {
        let path = root_args.node_dir();
        let config = root_args.load_config()?;

        let node_config = NodeConfig::new(
            path.clone(),
            config.identity.clone(),
            NetworkConfig::new(config.identity, config.swarm),
            StoreConfig::new(path.join(config.datastore.path)),
            config.cache,
            TransferConfig::new(config.transfer.timeout),
        );

        start(node_config, Arc::new(AllowAll)).await
    }
}
