use camino::Utf8PathBuf;
use clap::Parser;
use eyre::{bail, Result as EyreResult};
use hornet_network_primitives::messages::{DownloadFilter, DownloadMessage, LeafRange};
use hornet_network_primitives::stream::DOWNLOAD_PROTOCOL;
use hornet_node::client::download_dag;
use hornet_node::files::write_dag;
use multiaddr::Multiaddr;
use tracing::info;

use super::{connect, transfer_config};
use crate::cli::RootArgs;

/// Download a dag from a peer
#[derive(Debug, Parser)]
pub struct FetchCommand {
    /// Address of the serving node, ending in /p2p/<peer id>
    #[arg(long, value_name = "ADDR")]
    pub peer: Multiaddr,

    /// Only fetch leaves with these labels
    #[arg(long, value_name = "LABEL")]
    pub leaf: Vec<String>,

    /// Only fetch leaves with labels in this inclusive range
    #[arg(long, value_name = "FROM-TO", value_parser = parse_range)]
    pub range: Vec<LeafRange>,

    /// Leave file content behind
    #[arg(long)]
    pub no_content: bool,

    /// Recreate the downloaded tree under this directory
    #[arg(long, value_name = "DIR")]
    pub output: Option<Utf8PathBuf>,

    /// Root hash of the dag
    pub root: String,
}

fn parse_range(value: &str) -> Result<LeafRange, String> {
    value
        .split_once('-')
        .map(|(from, to)| LeafRange::new(from, to))
        .ok_or_else(|| format!("expected FROM-TO, got `{value}`"))
}

impl FetchCommand {
    pub async fn run(self, root_args: &RootArgs) -> EyreResult<()> {
        let config = root_args.load_config()?;

        let filtered = !self.leaf.is_empty() || !self.range.is_empty() || self.no_content;

        if filtered && self.output.is_some() {
            bail!("--output needs the complete dag, drop the filter options");
        }

        let mut leaf_ranges = self.range;

        // Content can only be dropped through a filter, which then has to
        // select every label.
        if self.leaf.is_empty() && leaf_ranges.is_empty() {
            leaf_ranges.push(LeafRange::new("0", u64::MAX.to_string()));
        }

        let filter = filtered.then(|| DownloadFilter {
            leaves: self.leaf,
            leaf_ranges,
            include_content: !self.no_content,
        });

        let public_key = config.identity.public().to_peer_id().to_base58();
        let signature = hex::encode(config.identity.sign(self.root.as_bytes())?);

        let request = DownloadMessage {
            root: self.root,
            public_key,
            signature,
            filter,
        };

        let (client, peer_id) = connect(&config, self.peer).await?;
        let mut stream = client.open_stream(peer_id, DOWNLOAD_PROTOCOL).await?;

        let dag = download_dag(&mut stream, request, &transfer_config(&config)).await?;

        info!(root = %dag.root, leaves = dag.len(), %peer_id, "fetched");

        if let Some(output) = self.output {
            write_dag(&dag, &output)?;
            println!("{output}");
        } else {
            for (hash, leaf) in &dag.leaves {
                println!("{hash}\t{}", leaf.item_name);
            }
        }

        Ok(())
    }
}
