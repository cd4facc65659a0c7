use core::time::Duration;
use std::fs::{read_to_string, write};

use camino::{Utf8Path, Utf8PathBuf};
use eyre::{Result as EyreResult, WrapErr};
use hornet_network::config::SwarmConfig;
use hornet_store::CacheConfig;
use libp2p_identity::Keypair;
use serde::{Deserialize, Serialize};

#[cfg(test)]
mod tests;

pub const CONFIG_FILE: &str = "config.toml";

/// Per-message deadline used when the file does not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize, Serialize)]
#[non_exhaustive]
pub struct ConfigFile {
    #[serde(with = "serde_identity", default = "Keypair::generate_ed25519")]
    pub identity: Keypair,

    pub swarm: SwarmConfig,

    pub datastore: DataStoreConfig,

    #[serde(default)]
    pub transfer: TransferConfig,

    /// Bucket name to the leaf field its secondary cache is keyed by.
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Serialize)]
#[non_exhaustive]
pub struct DataStoreConfig {
    /// Relative paths are resolved against the node home.
    pub path: Utf8PathBuf,
}

impl DataStoreConfig {
    #[must_use]
    pub const fn new(path: Utf8PathBuf) -> Self {
        Self { path }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[non_exhaustive]
pub struct TransferConfig {
    #[serde(rename = "timeout_ms", with = "serde_duration")]
    pub timeout: Duration,
}

impl TransferConfig {
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl ConfigFile {
    #[must_use]
    pub const fn new(
        identity: Keypair,
        swarm: SwarmConfig,
        datastore: DataStoreConfig,
        transfer: TransferConfig,
        cache: CacheConfig,
    ) -> Self {
        Self {
            identity,
            swarm,
            datastore,
            transfer,
            cache,
        }
    }

    #[must_use]
    pub fn exists(dir: &Utf8Path) -> bool {
        dir.join(CONFIG_FILE).is_file()
    }

    pub fn load(dir: &Utf8Path) -> EyreResult<Self> {
        let path = dir.join(CONFIG_FILE);
        let content = read_to_string(&path)
            .wrap_err_with(|| format!("failed to read configuration from {path}"))?;

        toml::from_str(&content).wrap_err_with(|| format!("failed to parse {path}"))
    }

    pub fn save(&self, dir: &Utf8Path) -> EyreResult<()> {
        let path = dir.join(CONFIG_FILE);
        let content = toml::to_string_pretty(self)?;

        write(&path, content)
            .wrap_err_with(|| format!("failed to write configuration to {path}"))?;

        Ok(())
    }
}

mod serde_duration {
    use core::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

pub mod serde_identity {
    use core::fmt::{self, Formatter};

    use libp2p_identity::Keypair;
    use serde::de::{self, MapAccess};
    use serde::ser::{self, SerializeMap};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(key: &Keypair, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut keypair = serializer.serialize_map(Some(2))?;
        keypair.serialize_entry("peer_id", &key.public().to_peer_id().to_base58())?;
        keypair.serialize_entry(
            "keypair",
            &bs58::encode(&key.to_protobuf_encoding().map_err(ser::Error::custom)?).into_string(),
        )?;
        keypair.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Keypair, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct IdentityVisitor;

        impl<'de> de::Visitor<'de> for IdentityVisitor {
            type Value = Keypair;

            fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
                formatter.write_str("an identity")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut peer_id = None::<String>;
                let mut keypair = None::<String>;

                while let Some(key) = map.next_key::<String>()? {
                    match key.as_str() {
                        "peer_id" => peer_id = Some(map.next_value()?),
                        "keypair" => keypair = Some(map.next_value()?),
                        _ => {}
                    }
                }

                let peer_id = peer_id.ok_or_else(|| de::Error::missing_field("peer_id"))?;
                let keypair = keypair.ok_or_else(|| de::Error::missing_field("keypair"))?;

                let decoded = bs58::decode(&keypair).into_vec().map_err(de::Error::custom)?;
                let keypair = Keypair::from_protobuf_encoding(&decoded).map_err(de::Error::custom)?;

                if keypair.public().to_peer_id().to_base58() != peer_id {
                    return Err(de::Error::custom("peer_id does not match keypair"));
                }

                Ok(keypair)
            }
        }

        deserializer.deserialize_map(IdentityVisitor)
    }
}
