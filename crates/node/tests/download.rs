mod common;

use std::collections::BTreeSet;

use common::{flat_dag, node, pair, sample_dag, Recorder, OWNER, SIGNATURE};
use hornet_network_primitives::framing::{
    recv, send_message, wait_for_message, write_response, DEFAULT_MESSAGE_TIMEOUT,
};
use hornet_network_primitives::messages::{
    DownloadFilter, DownloadMessage, Envelope, ErrorMessage, LeafRange, UploadMessage,
};
use hornet_node::client::download_dag;
use hornet_node::config::TransferConfig;
use hornet_node::error::TransferError;
use hornet_node::handlers::handle_download;
use hornet_node::Node;
use hornet_primitives::{hash, Dag};
use tokio::join;

fn request(root: &str, filter: Option<DownloadFilter>) -> DownloadMessage {
    DownloadMessage {
        root: root.to_owned(),
        public_key: OWNER.to_owned(),
        signature: SIGNATURE.to_owned(),
        filter,
    }
}

fn serving(dag: &Dag, recorder: std::sync::Arc<Recorder>) -> Node {
    let node = node(recorder);

    node.store()
        .store_dag(dag, OWNER, SIGNATURE)
        .expect("dag is stored");

    node
}

#[tokio::test]
async fn unfiltered_download_reproduces_the_dag() {
    let config = TransferConfig::default();
    let dag = sample_dag();
    let node = serving(&dag, Recorder::allowing());
    let (mut client, server) = pair();

    let (served, downloaded) = join!(
        handle_download(node, server),
        download_dag(&mut client, request(&dag.root, None), &config),
    );

    served.expect("server sends the dag");
    assert_eq!(downloaded.expect("client assembles the dag"), dag);
}

#[tokio::test]
async fn filter_selects_listed_labels_and_ranges() {
    let config = TransferConfig::default();
    let dag = flat_dag(25);
    let node = serving(&dag, Recorder::allowing());
    let (mut client, server) = pair();

    let filter = DownloadFilter {
        leaves: vec!["3".to_owned(), "abc".to_owned()],
        leaf_ranges: vec![LeafRange::new("10", "20"), LeafRange::new("x", "5")],
        include_content: false,
    };

    let (served, downloaded) = join!(
        handle_download(node, server),
        download_dag(
            &mut client,
            request(&dag.root, Some(filter)),
            &config
        ),
    );

    served.expect("malformed filter entries do not abort the session");
    let downloaded = downloaded.expect("client assembles the partial dag");

    assert!(downloaded.leaves.contains_key(&dag.root));

    let labels = downloaded
        .leaves
        .keys()
        .filter_map(|hash| hash::numeric_label(hash))
        .collect::<BTreeSet<_>>();

    let expected = [3].into_iter().chain(10..=20).collect::<BTreeSet<u64>>();
    assert_eq!(labels, expected);
    assert_eq!(downloaded.len(), expected.len() + 1);

    assert!(downloaded.leaves.values().all(|leaf| leaf.content.is_none()));
}

#[tokio::test]
async fn branches_travel_only_with_multi_link_parents() {
    let dag = sample_dag();
    let node = serving(&dag, Recorder::allowing());
    let (mut client, server) = pair();

    let client_side = async {
        send_message(&mut client, request(&dag.root, None))
            .await
            .expect("request is sent");

        let mut seen = Vec::new();

        while let Some(message) =
            wait_for_message::<_, UploadMessage>(&mut client, DEFAULT_MESSAGE_TIMEOUT).await
        {
            seen.push((message.leaf.item_name.clone(), message.branch.is_some()));

            write_response(&mut client, true)
                .await
                .expect("ack is sent");
        }

        seen
    };

    let (served, seen) = join!(handle_download(node, server), client_side);

    served.expect("server sends the dag");

    assert_eq!(
        seen,
        [
            ("photos".to_owned(), false),
            ("a.txt".to_owned(), true),
            ("b.txt".to_owned(), true),
            ("nested".to_owned(), true),
            ("c.txt".to_owned(), false),
        ]
    );
}

#[tokio::test]
async fn unknown_root_is_reported() {
    let config = TransferConfig::default();
    let node = node(Recorder::allowing());
    let (mut client, server) = pair();

    let (served, downloaded) = join!(
        handle_download(node, server),
        download_dag(&mut client, request("missing", None), &config),
    );

    assert!(matches!(served, Err(TransferError::MissingRoot(_))));

    let Err(TransferError::Remote(message)) = downloaded else {
        panic!("client should see the server's error, got {downloaded:?}");
    };
    assert!(message.starts_with("node does not have root leaf"), "{message}");
}

#[tokio::test]
async fn denied_download_sends_nothing() {
    let config = TransferConfig::default();
    let dag = sample_dag();
    let node = serving(&dag, Recorder::denying());
    let (mut client, server) = pair();

    let (served, downloaded) = join!(
        handle_download(node, server),
        download_dag(&mut client, request(&dag.root, None), &config),
    );

    assert!(matches!(served, Err(TransferError::DownloadDenied)));

    let Err(TransferError::Remote(message)) = downloaded else {
        panic!("client should see the denial, got {downloaded:?}");
    };
    assert_eq!(message, "not allowed to download this dag");
}

#[tokio::test]
async fn negative_ack_aborts_the_download() {
    let dag = sample_dag();
    let node = serving(&dag, Recorder::allowing());
    let (mut client, server) = pair();

    let client_side = async {
        send_message(&mut client, request(&dag.root, None))
            .await
            .expect("request is sent");

        let root = wait_for_message::<_, UploadMessage>(&mut client, DEFAULT_MESSAGE_TIMEOUT)
            .await
            .expect("root arrives first");
        assert_eq!(root.leaf.hash, dag.root);
        assert_eq!(root.count, dag.len() as u64);

        write_response(&mut client, false)
            .await
            .expect("nack is sent");

        wait_for_message::<_, ErrorMessage>(&mut client, DEFAULT_MESSAGE_TIMEOUT).await
    };

    let (served, error) = join!(handle_download(node, server), client_side);

    assert!(matches!(served, Err(TransferError::NoResponse)));
    assert_eq!(
        error.map(|error| error.message),
        Some("peer did not acknowledge leaf".to_owned())
    );
}

#[tokio::test(start_paused = true)]
async fn silent_downloader_times_out() {
    let node = node(Recorder::allowing());
    let (mut client, server) = pair();

    let served = handle_download(node, server).await;

    assert!(matches!(served, Err(TransferError::Timeout(_))));

    let envelope = recv(&mut client, DEFAULT_MESSAGE_TIMEOUT)
        .await
        .expect("error frame decodes");
    assert_eq!(
        envelope,
        Some(Envelope::Error(ErrorMessage {
            message: "failed to receive download message in time".to_owned(),
        }))
    );
}

#[tokio::test(start_paused = true)]
async fn downloader_that_stops_acking_times_out() {
    let dag = sample_dag();
    let node = serving(&dag, Recorder::allowing());
    let (mut client, server) = pair();

    let client_side = async {
        send_message(&mut client, request(&dag.root, None))
            .await
            .expect("request is sent");

        let root = wait_for_message::<_, UploadMessage>(&mut client, DEFAULT_MESSAGE_TIMEOUT)
            .await
            .expect("root arrives first");
        assert_eq!(root.leaf.hash, dag.root);

        recv(&mut client, DEFAULT_MESSAGE_TIMEOUT * 2)
            .await
            .expect("error frame decodes")
    };

    let (served, envelope) = join!(handle_download(node, server), client_side);

    assert!(matches!(served, Err(TransferError::Timeout("response"))));
    assert_eq!(
        envelope,
        Some(Envelope::Error(ErrorMessage {
            message: "failed to receive response in time".to_owned(),
        }))
    );
}
