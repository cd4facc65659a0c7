#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hornet_network_primitives::stream::Stream;
use hornet_node::config::TransferConfig;
use hornet_node::policy::DagPolicy;
use hornet_node::Node;
use hornet_primitives::{Dag, DagBuilder, DagLeaf, DagLeafBuilder};
use hornet_store::db::InMemoryDB;
use hornet_store::{CacheConfig, LeafStore, Store};
use tokio::io::{duplex, DuplexStream};

pub const OWNER: &str = "npub1owner";
pub const SIGNATURE: &str = "signature";

pub type TestStream = Stream<DuplexStream>;

pub fn pair() -> (TestStream, TestStream) {
    let (left, right) = duplex(256 * 1_024);

    (Stream::from_io(left), Stream::from_io(right))
}

#[derive(Debug)]
pub struct Recorder {
    pub allow_upload: bool,
    pub allow_download: bool,
    pub received: Mutex<Vec<(Dag, String)>>,
}

impl Recorder {
    pub fn allowing() -> Arc<Self> {
        Arc::new(Self {
            allow_upload: true,
            allow_download: true,
            received: Mutex::default(),
        })
    }

    pub fn denying() -> Arc<Self> {
        Arc::new(Self {
            allow_upload: false,
            allow_download: false,
            received: Mutex::default(),
        })
    }

    pub fn received(&self) -> Vec<(Dag, String)> {
        self.received.lock().expect("lock is not poisoned").clone()
    }
}

#[async_trait]
impl DagPolicy for Recorder {
    async fn can_upload_dag(&self, _root: &DagLeaf, _public_key: &str, _signature: &str) -> bool {
        self.allow_upload
    }

    async fn can_download_dag(&self, _root: &DagLeaf, _public_key: &str, _signature: &str) -> bool {
        self.allow_download
    }

    async fn handle_received_dag(&self, dag: Dag, public_key: &str) {
        self.received
            .lock()
            .expect("lock is not poisoned")
            .push((dag, public_key.to_owned()));
    }
}

pub fn node(policy: Arc<Recorder>) -> Node {
    let store = LeafStore::new(
        Store::new(Arc::new(InMemoryDB::new())),
        CacheConfig::default(),
    );

    Node::new(store, policy, TransferConfig::default())
}

/// Root with three children, the last of which is a directory holding a
/// single file.
pub fn sample_dag() -> Dag {
    let mut builder = DagBuilder::new();

    let a = builder
        .add(DagLeafBuilder::file("a.txt", b"alpha".to_vec()))
        .expect("a builds");
    let b = builder
        .add(DagLeafBuilder::file("b.txt", b"beta".to_vec()))
        .expect("b builds");
    let c = builder
        .add(DagLeafBuilder::file("c.txt", b"gamma".to_vec()))
        .expect("c builds");
    let nested = builder
        .add(DagLeafBuilder::directory("nested").with_link(c))
        .expect("nested builds");

    builder
        .build(DagLeafBuilder::directory("photos").with_links([a, b, nested]))
        .expect("root builds")
}

/// Root directly linking `count` files labelled `1..=count`.
pub fn flat_dag(count: usize) -> Dag {
    let mut builder = DagBuilder::new();

    let links = (0..count)
        .map(|index| {
            builder
                .add(DagLeafBuilder::file(
                    format!("{index}.txt"),
                    format!("file {index}").into_bytes(),
                ))
                .expect("file builds")
        })
        .collect::<Vec<_>>();

    builder
        .build(DagLeafBuilder::directory("flat").with_links(links))
        .expect("root builds")
}
