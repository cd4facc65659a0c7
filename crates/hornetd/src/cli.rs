use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use const_format::concatcp;
use eyre::{bail, Result as EyreResult};
use hornet_config::ConfigFile;
use hornet_network::client::NetworkClient;
use hornet_network::config::{NetworkConfig, SwarmConfig};
use hornet_node::config::TransferConfig;
use libp2p::PeerId;
use multiaddr::Multiaddr;

use crate::defaults;

mod fetch;
mod init;
mod push;
mod run;

use fetch::FetchCommand;
use init::InitCommand;
use push::PushCommand;
use run::RunCommand;

pub const EXAMPLES: &str = r"
  # Initialize a new node
  $ hornetd --home data/ --node-name node1 init

  # Serve uploads and downloads
  $ hornetd --home data/ --node-name node1 run

  # Upload a directory to a running node
  $ hornetd --home data/ --node-name node2 push --peer /ip4/127.0.0.1/tcp/4242/p2p/12D3Koo... ./photos

  # Download part of a dag without content
  $ hornetd --home data/ --node-name node2 fetch --peer /ip4/127.0.0.1/tcp/4242/p2p/12D3Koo... <ROOT> --range 10-20 --no-content
";

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(after_help = concatcp!(
    "Environment variables:\n",
    "  HORNET_HOME    Directory for config and data\n\n",
    "Examples:",
    EXAMPLES
))]
pub struct RootCommand {
    #[command(flatten)]
    pub args: RootArgs,

    #[command(subcommand)]
    pub action: SubCommands,
}

#[derive(Debug, Subcommand)]
pub enum SubCommands {
    Init(InitCommand),
    #[command(alias = "up")]
    Run(RunCommand),
    Push(PushCommand),
    Fetch(FetchCommand),
}

#[derive(Debug, Parser)]
pub struct RootArgs {
    /// Directory for config and data
    #[arg(long, value_name = "PATH", default_value_t = defaults::default_node_dir())]
    #[arg(env = "HORNET_HOME", hide_env_values = true)]
    pub home: Utf8PathBuf,

    /// Name of node
    #[arg(short, long, value_name = "NAME")]
    pub node_name: Utf8PathBuf,
}

impl RootArgs {
    pub fn node_dir(&self) -> Utf8PathBuf {
        self.home.join(&self.node_name)
    }

    /// Loads the node's configuration, failing if `init` has not run.
    pub fn load_config(&self) -> EyreResult<ConfigFile> {
        let path = self.node_dir();

        if !ConfigFile::exists(&path) {
            bail!("node is not initialized in {path}");
        }

        ConfigFile::load(&path)
    }
}

/// Joins the network without listening and dials `peer`.
async fn connect(config: &ConfigFile, peer: Multiaddr) -> EyreResult<(NetworkClient, PeerId)> {
    let network = NetworkConfig::new(config.identity.clone(), SwarmConfig::new(Vec::new()));

    let (client, _events) = hornet_network::run(&network).await?;
    let peer_id = client.dial(peer).await?;

    Ok((client, peer_id))
}

fn transfer_config(config: &ConfigFile) -> TransferConfig {
    TransferConfig::new(config.transfer.timeout)
}

impl RootCommand {
    pub async fn run(self) -> EyreResult<()> {
        match self.action {
            SubCommands::Init(init) => init.run(&self.args),
            SubCommands::Run(run) => run.run(&self.args).await,
            SubCommands::Push(push) => push.run(&self.args).await,
            SubCommands::Fetch(fetch) => fetch.run(&self.args).await,
        }
    }
}
