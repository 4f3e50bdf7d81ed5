use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

/// Environment variable overriding [`ServerConfig::root_dir`].
pub const ROOT_ENV: &str = "PROJECT_ROOT";
/// Environment variable overriding [`ServerConfig::bind_addr`].
pub const BIND_ENV: &str = "DOCSTORE_BIND";

/// File name of the durable registry under the root directory.
pub const REGISTRY_LOG: &str = "registry.log";

const MIB: usize = 1024 * 1024;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryBackend {
    /// Identifier to location mapping lost on restart.
    #[default]
    Memory,
    /// Append-only log at `<root_dir>/registry.log`.
    Log,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Stored content lives under `<root_dir>/files`.
    pub root_dir: PathBuf,
    /// Largest accepted upload request body, in bytes.
    pub max_upload_size: usize,
    pub registry: RegistryBackend,
    /// fsync the registry log after every record.
    pub sync_writes: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3003)),
            root_dir: PathBuf::from("."),
            max_upload_size: 10 * MIB,
            registry: RegistryBackend::Memory,
            sync_writes: false,
        }
    }
}

impl ServerConfig {
    /// Defaults, then the TOML file at `path` if given, then environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> ServerResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> ServerResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ServerError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> ServerResult<Self> {
        toml::from_str(raw).map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Apply `PROJECT_ROOT` and `DOCSTORE_BIND` as looked up by `var`.
    pub fn apply_overrides<F>(&mut self, var: F) -> ServerResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = var(ROOT_ENV).filter(|v| !v.is_empty()) {
            self.root_dir = PathBuf::from(root);
        }
        if let Some(bind) = var(BIND_ENV).filter(|v| !v.is_empty()) {
            self.bind_addr = bind
                .parse()
                .map_err(|e| ServerError::Config(format!("invalid {BIND_ENV} {bind:?}: {e}")))?;
        }
        Ok(())
    }

    pub fn registry_path(&self) -> PathBuf {
        self.root_dir.join(REGISTRY_LOG)
    }

    /// Upload limit as shown to clients, e.g. `10MB`.
    pub fn max_upload_label(&self) -> String {
        size_label(self.max_upload_size)
    }
}

pub(crate) fn size_label(bytes: usize) -> String {
    if bytes >= MIB && bytes % MIB == 0 {
        format!("{}MB", bytes / MIB)
    } else {
        format!("{bytes} bytes")
    }
}
