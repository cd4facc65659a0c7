use hornet_store::LeafField;
use tempfile::TempDir;

use super::*;

fn home() -> (TempDir, Utf8PathBuf) {
    let dir = TempDir::new().expect("temp dir is created");
    let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("temp path is utf-8");

    (dir, path)
}

#[test]
fn saved_config_loads_back() {
    let (_guard, home) = home();

    let identity = Keypair::generate_ed25519();
    let peer_id = identity.public().to_peer_id();

    let config = ConfigFile::new(
        identity,
        SwarmConfig::on_port(4242),
        DataStoreConfig::new("data".into()),
        TransferConfig::new(Duration::from_millis(1_500)),
        CacheConfig::new([
            ("mp3".to_owned(), LeafField::ItemName),
            ("notes".to_owned(), LeafField::AdditionalData("title".to_owned())),
        ]),
    );

    assert!(!ConfigFile::exists(&home));
    config.save(&home).expect("config is saved");
    assert!(ConfigFile::exists(&home));

    let loaded = ConfigFile::load(&home).expect("config loads");

    assert_eq!(loaded.identity.public().to_peer_id(), peer_id);
    assert_eq!(loaded.swarm.listen, config.swarm.listen);
    assert_eq!(loaded.datastore.path, "data");
    assert_eq!(loaded.transfer.timeout, Duration::from_millis(1_500));
    assert_eq!(loaded.cache, config.cache);
}

#[test]
fn optional_sections_take_defaults() {
    let (_guard, home) = home();

    let identity = Keypair::generate_ed25519();
    let encoded = bs58::encode(identity.to_protobuf_encoding().expect("key encodes")).into_string();

    let content = format!(
        r#"
[identity]
peer_id = "{}"
keypair = "{encoded}"

[swarm]
listen = ["/ip4/127.0.0.1/tcp/4242"]

[datastore]
path = "data"
"#,
        identity.public().to_peer_id().to_base58()
    );

    write(home.join(CONFIG_FILE), content).expect("config is written");

    let loaded = ConfigFile::load(&home).expect("config loads");

    assert_eq!(loaded.transfer.timeout, DEFAULT_TIMEOUT);
    assert_eq!(loaded.cache, CacheConfig::default());
}

#[test]
fn mismatched_peer_id_is_rejected() {
    let (_guard, home) = home();

    let identity = Keypair::generate_ed25519();
    let other = Keypair::generate_ed25519();
    let encoded = bs58::encode(identity.to_protobuf_encoding().expect("key encodes")).into_string();

    let content = format!(
        r#"
[identity]
peer_id = "{}"
keypair = "{encoded}"

[swarm]
listen = []

[datastore]
path = "data"
"#,
        other.public().to_peer_id().to_base58()
    );

    write(home.join(CONFIG_FILE), content).expect("config is written");

    assert!(ConfigFile::load(&home).is_err());
}
