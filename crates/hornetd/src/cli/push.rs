use camino::Utf8PathBuf;
use clap::Parser;
use eyre::Result as EyreResult;
use hornet_network_primitives::stream::UPLOAD_PROTOCOL;
use hornet_node::client::upload_dag;
use hornet_node::files::{dag_from_path, DEFAULT_CHUNK_SIZE};
use multiaddr::Multiaddr;
use tracing::info;

use super::{connect, transfer_config};
use crate::cli::RootArgs;

/// Upload a file or directory to a peer
#[derive(Debug, Parser)]
pub struct PushCommand {
    /// Address of the receiving node, ending in /p2p/<peer id>
    #[arg(long, value_name = "ADDR")]
    pub peer: Multiaddr,

    /// Owner key recorded with the dag, defaults to this node's peer id
    #[arg(long, value_name = "KEY")]
    pub public_key: Option<String>,

    /// Split files into chunks of at most this many bytes
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,

    /// File or directory to upload
    pub path: Utf8PathBuf,
}

impl PushCommand {
    pub async fn run(self, root_args: &RootArgs) -> EyreResult<()> {
        let config = root_args.load_config()?;

        let dag = dag_from_path(&self.path, self.chunk_size)?;

        let public_key = self
            .public_key
            .unwrap_or_else(|| config.identity.public().to_peer_id().to_base58());
        let signature = hex::encode(config.identity.sign(dag.root.as_bytes())?);

        let (client, peer_id) = connect(&config, self.peer).await?;
        let mut stream = client.open_stream(peer_id, UPLOAD_PROTOCOL).await?;

        upload_dag(
            &mut stream,
            &dag,
            &public_key,
            &signature,
            &transfer_config(&config),
        )
        .await?;

        info!(root = %dag.root, leaves = dag.len(), %peer_id, "pushed");
        println!("{}", dag.root);

        Ok(())
    }
}
