//! Subcommands of the billrec CLI.

pub mod config;
pub mod inspect;
pub mod process;

use std::path::{Path, PathBuf};

use billrec_core::BillrecConfig;
use tracing::debug;

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("billrec")
        .join("config.json")
}

/// Resolve the configuration file: the `--config` flag wins over the default path.
pub fn config_path(flag: Option<&str>) -> PathBuf {
    flag.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load configuration, falling back to defaults when no file exists.
///
/// An explicit `--config` path must exist.
pub fn load_config(flag: Option<&str>) -> anyhow::Result<BillrecConfig> {
    let path = config_path(flag);
    if flag.is_some() && !path.exists() {
        anyhow::bail!("Config file not found: {}", path.display());
    }
    read_config(&path)
}

fn read_config(path: &Path) -> anyhow::Result<BillrecConfig> {
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok(BillrecConfig::from_file(path)?)
    } else {
        Ok(BillrecConfig::default())
    }
}

/// Display name of a document: its file name.
pub fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
