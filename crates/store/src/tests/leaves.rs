use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use eyre::{bail, Result as EyreResult};
use hornet_primitives::{DagBuilder, DagLeafBuilder};

use super::*;
use crate::bucket::LeafField;
use crate::config::StoreConfig;
use crate::db::{Column, Database, InMemoryDB};

const OWNER: &str = "npub1owner";

fn leaf_store(cache: CacheConfig) -> LeafStore {
    LeafStore::new(Store::new(Arc::new(InMemoryDB::new())), cache)
}

fn sample_dag(root_name: &str) -> Dag {
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
        .build(
            DagLeafBuilder::directory(root_name)
                .with_links([a, b, nested])
                .with_additional_data("title", "holiday"),
        )
        .expect("root builds")
}

fn root_data(dag: &Dag, public_key: &str) -> DagLeafData {
    DagLeafData {
        leaf: dag.root_leaf().expect("root").clone(),
        root: dag.root.clone(),
        public_key: public_key.to_owned(),
        signature: "sig".to_owned(),
        parent: None,
        branch: None,
    }
}

#[test]
fn stored_dag_round_trips_with_content() {
    let store = leaf_store(CacheConfig::default());
    let dag = sample_dag("photos");

    store.store_dag(&dag, OWNER, "sig").expect("dag stores");

    let rebuilt = store
        .build_dag_from_store(&dag.root, true)
        .expect("dag rebuilds");

    assert_eq!(rebuilt, dag);
    rebuilt.verify().expect("rebuilt dag verifies");
}

#[test]
fn content_is_kept_apart_from_leaf_records() {
    let store = leaf_store(CacheConfig::default());
    let dag = sample_dag("photos");
    store.store_dag(&dag, OWNER, "sig").expect("dag stores");

    let (hash, leaf) = dag
        .leaves
        .iter()
        .find(|(_, leaf)| leaf.content.is_some())
        .expect("sample has a file");

    let bare = store
        .retrieve_leaf(&dag.root, hash, false)
        .expect("leaf is stored");
    assert!(bare.leaf.content.is_none());

    let content_hash = leaf.content_hash.expect("files carry a content hash");
    assert_eq!(
        store.retrieve_leaf_content(&content_hash).expect("content stored"),
        leaf.content.clone().expect("sample has content")
    );

    let full = store
        .retrieve_leaf(&dag.root, hash, true)
        .expect("leaf is stored");
    assert_eq!(&full.leaf, leaf);
}

#[test]
fn children_resolve_to_the_root_bucket() {
    let store = leaf_store(CacheConfig::default());
    let dag = sample_dag("album.jpg");
    store.store_dag(&dag, OWNER, "sig").expect("dag stores");

    assert_eq!(
        store.root_bucket(&dag.root).expect("index readable").as_deref(),
        Some("jpg")
    );

    for hash in dag.leaves.keys() {
        let key = LeafKey::new("jpg", hash);
        assert!(store.store.has(&key).expect("store readable"), "{hash} in root bucket");
    }
}

#[test]
fn content_hash_without_content_is_rejected() {
    let store = leaf_store(CacheConfig::default());
    let dag = sample_dag("photos");
    store
        .store_leaf(&dag.root, root_data(&dag, OWNER))
        .expect("root stores");

    let (hash, leaf) = dag
        .leaves
        .iter()
        .find(|(_, leaf)| leaf.content.is_some())
        .expect("sample has a file");

    let mut leaf = leaf.clone();
    leaf.content = None;

    let data = DagLeafData {
        leaf,
        root: dag.root.clone(),
        public_key: OWNER.to_owned(),
        signature: "sig".to_owned(),
        parent: Some(dag.root.clone()),
        branch: None,
    };

    assert!(matches!(
        store.store_leaf(&dag.root, data),
        Err(LeafStoreError::MissingContent)
    ));
    assert!(store.retrieve_leaf(&dag.root, hash, false).is_err());
}

#[test]
fn child_before_root_is_rejected() {
    let store = leaf_store(CacheConfig::default());
    let dag = sample_dag("photos");
    let child = dag.root_leaf().expect("root").links[0].clone();

    let data = DagLeafData {
        leaf: dag.leaves[&child].clone(),
        root: dag.root.clone(),
        public_key: OWNER.to_owned(),
        signature: "sig".to_owned(),
        parent: Some(dag.root.clone()),
        branch: None,
    };

    assert!(matches!(
        store.store_leaf(&dag.root, data),
        Err(LeafStoreError::UnknownRoot(_))
    ));
}

#[test]
fn missing_leaf_fails_the_rebuild() {
    let store = leaf_store(CacheConfig::default());
    let dag = sample_dag("photos");

    store
        .store_leaf(&dag.root, root_data(&dag, OWNER))
        .expect("root stores");

    assert!(matches!(
        store.build_dag_from_store(&dag.root, false),
        Err(LeafStoreError::LeafNotFound { .. })
    ));
    assert!(matches!(
        store.build_dag_from_store("unknown", false),
        Err(LeafStoreError::UnknownRoot(_))
    ));
}

#[test]
fn owner_cache_tracks_roots_once() {
    let store = leaf_store(CacheConfig::default());
    let first = sample_dag("first");
    let second = sample_dag("second");

    store.store_dag(&first, OWNER, "sig").expect("first stores");
    store.store_dag(&second, OWNER, "sig").expect("second stores");
    store.store_dag(&first, OWNER, "sig").expect("re-upload stores");

    let filter = BTreeMap::from([(OWNER.to_owned(), "directory".to_owned())]);
    let roots = store.query_dag(&filter).expect("query runs");

    assert_eq!(roots, [first.root.clone(), second.root.clone()]);
}

#[test]
fn non_owner_keys_are_not_cached() {
    let store = leaf_store(CacheConfig::default());
    let dag = sample_dag("photos");
    store.store_dag(&dag, "hex-key", "sig").expect("dag stores");

    let filter = BTreeMap::from([("hex-key".to_owned(), "directory".to_owned())]);

    assert!(store.query_dag(&filter).expect("query runs").is_empty());
}

#[test]
fn bucket_cache_is_keyed_by_the_configured_field() {
    let cache = CacheConfig::new([(
        "directory".to_owned(),
        LeafField::AdditionalData("title".to_owned()),
    )]);
    let store = leaf_store(cache);
    let dag = sample_dag("photos");
    store.store_dag(&dag, OWNER, "sig").expect("dag stores");

    let hit = BTreeMap::from([("directory".to_owned(), "holiday".to_owned())]);
    assert_eq!(store.query_dag(&hit).expect("query runs"), [dag.root.clone()]);

    let miss = BTreeMap::from([
        ("directory".to_owned(), "work".to_owned()),
        ("png".to_owned(), "holiday".to_owned()),
    ]);
    assert!(store.query_dag(&miss).expect("query runs").is_empty());
}

#[derive(Debug, Default)]
struct CrashingDB {
    inner: InMemoryDB,
    crash: AtomicBool,
}

impl Database for CrashingDB {
    fn open(_config: &StoreConfig) -> EyreResult<Self> {
        Ok(Self::default())
    }

    fn has(&self, col: Column, key: &[u8]) -> EyreResult<bool> {
        self.inner.has(col, key)
    }

    fn get(&self, col: Column, key: &[u8]) -> EyreResult<Option<Vec<u8>>> {
        self.inner.get(col, key)
    }

    fn apply(&self, tx: &Transaction) -> EyreResult<()> {
        if self.crash.load(Ordering::SeqCst) {
            bail!("simulated crash");
        }

        self.inner.apply(tx)
    }
}

#[test]
fn failed_commit_leaves_nothing_behind() {
    let db = Arc::new(CrashingDB::default());
    db.crash.store(true, Ordering::SeqCst);

    let store = leaf_store_on(Arc::clone(&db));
    let dag = sample_dag("photos");

    assert!(matches!(
        store.store_leaf(&dag.root, root_data(&dag, OWNER)),
        Err(LeafStoreError::Store(_))
    ));

    assert_eq!(store.root_bucket(&dag.root).expect("index readable"), None);
    assert!(matches!(
        store.retrieve_leaf(&dag.root, &dag.root, false),
        Err(LeafStoreError::UnknownRoot(_))
    ));

    let filter = BTreeMap::from([(OWNER.to_owned(), "directory".to_owned())]);
    assert!(store.query_dag(&filter).expect("query runs").is_empty());

    db.crash.store(false, Ordering::SeqCst);
    store
        .store_leaf(&dag.root, root_data(&dag, OWNER))
        .expect("root stores once the db recovers");
    assert!(store.retrieve_leaf(&dag.root, &dag.root, false).is_ok());
}

fn leaf_store_on(db: Arc<CrashingDB>) -> LeafStore {
    LeafStore::new(Store::new(db), CacheConfig::default())
}

#[test]
fn readers_never_see_an_index_without_its_record() {
    let store = leaf_store(CacheConfig::default());
    let dags: Vec<Dag> = (0..64).map(|i| sample_dag(&format!("dir-{i}"))).collect();

    let roots: Vec<String> = dags.iter().map(|dag| dag.root.clone()).collect();

    let writer = {
        let store = store.clone();
        thread::spawn(move || {
            for dag in &dags {
                store
                    .store_leaf(&dag.root, root_data(dag, OWNER))
                    .expect("root stores");
            }
        })
    };

    let reader = {
        let store = store.clone();
        thread::spawn(move || {
            while roots
                .iter()
                .any(|root| store.root_bucket(root).ok().flatten().is_none())
            {
                for root in &roots {
                    if store.root_bucket(root).expect("index readable").is_some() {
                        assert!(
                            store.retrieve_leaf(root, root, false).is_ok(),
                            "indexed root {root} must have its record"
                        );
                    }
                }
            }
        })
    };

    writer.join().expect("writer finishes");
    reader.join().expect("reader finishes");
}
