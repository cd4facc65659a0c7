use std::fs;
use std::net::IpAddr;

use clap::Parser;
use eyre::{bail, Result as EyreResult, WrapErr};
use hornet_config::{ConfigFile, DataStoreConfig, TransferConfig};
use hornet_network::config::{SwarmConfig, DEFAULT_PORT};
use hornet_store::{CacheConfig, LeafField};
use libp2p::identity::Keypair;
use multiaddr::{Multiaddr, Protocol};
use tracing::{info, warn};

use crate::cli::RootArgs;

/// Initialize node configuration
#[derive(Debug, Parser)]
pub struct InitCommand {
    /// Host to listen on
    #[arg(long, value_name = "HOST")]
    #[arg(default_value = "0.0.0.0,::")]
    #[arg(use_value_delimiter = true)]
    pub swarm_host: Vec<IpAddr>,

    /// Port to listen on
    #[arg(long, value_name = "PORT")]
    #[arg(default_value_t = DEFAULT_PORT)]
    pub swarm_port: u16,

    /// Key a bucket's secondary cache by the root's item name
    #[arg(long, value_name = "BUCKET")]
    pub cache_item_name: Vec<String>,

    /// Key a bucket's secondary cache by a root metadata entry
    #[arg(long, value_name = "BUCKET=KEY", value_parser = parse_key_value)]
    pub cache_data: Vec<(String, String)>,

    /// Force initialization even if the directory already exists
    #[arg(long)]
    pub force: bool,
}

fn parse_key_value(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(bucket, key)| (bucket.to_owned(), key.to_owned()))
        .ok_or_else(|| format!("expected BUCKET=KEY, got `{value}`"))
}

impl InitCommand {
    pub fn run(self, root_args: &RootArgs) -> EyreResult<()> {
        let path = root_args.node_dir();

        if !path.exists() {
            fs::create_dir_all(&path)
                .wrap_err_with(|| format!("failed to create directory {path}"))?;
        }

        if ConfigFile::exists(&path) {
            if let Err(err) = ConfigFile::load(&path) {
                if self.force {
                    warn!(%err, "failed to load existing configuration, overwriting");
                } else {
                    bail!("failed to load existing configuration: {err}");
                }
            }

            if !self.force {
                bail!("node is already initialized in {path}");
            }
        }

        let identity = Keypair::generate_ed25519();
        info!(peer_id = %identity.public().to_peer_id(), "generated identity");

        let mut listen = Vec::with_capacity(self.swarm_host.len() * 2);

        for host in self.swarm_host {
            let host = Multiaddr::from(host);

            listen.push(host.clone().with(Protocol::Tcp(self.swarm_port)));
            listen.push(
                host.with(Protocol::Udp(self.swarm_port))
                    .with(Protocol::QuicV1),
            );
        }

        let cache = CacheConfig::new(
            self.cache_item_name
                .into_iter()
                .map(|bucket| (bucket, LeafField::ItemName))
                .chain(
                    self.cache_data
                        .into_iter()
                        .map(|(bucket, key)| (bucket, LeafField::AdditionalData(key))),
                ),
        );

        let config = ConfigFile::new(
            identity,
            SwarmConfig::new(listen),
            DataStoreConfig::new("data".into()),
            TransferConfig::default(),
            cache,
        );

        fs::create_dir_all(path.join(&config.datastore.path))
            .wrap_err_with(|| format!("failed to create datastore in {path}"))?;

        config.save(&path)?;

        info!("initialized node in {path}");

        Ok(())
    }
}
