use camino::{Utf8Path, Utf8PathBuf};
use dirs::home_dir;

pub const DEFAULT_HORNET_HOME: &str = ".hornet";

pub fn default_node_dir() -> Utf8PathBuf {
    home_dir()
        .as_deref()
        .and_then(Utf8Path::from_path)
        .map(|home| home.join(DEFAULT_HORNET_HOME))
        .unwrap_or_default()
}
