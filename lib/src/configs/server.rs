use std::path::{Path, PathBuf};
use std::{fs, io};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::crypto_schemes::paillier::PublicKey;
use crate::election::{NewCandidate, NewParty};

pub const DEFAULT_CONFIG_PATH: &str = "voting_server_config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("failed to parse {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
}

/// voting_server_config.json
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Modulus size used by generate_keys when none is given.
    pub key_bits: usize,
    /// Election started as soon as the server is up.
    pub election: Option<ElectionSetup>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ElectionSetup {
    pub candidates: Vec<NewCandidate>,
    pub parties: Vec<NewParty>,
    /// JSON file holding the Paillier public key, as written by generate_keys.
    pub public_key_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            listen_addr: "127.0.0.1:8002".to_string(),
            key_bits: 2048,
            election: None,
        }
    }
}

impl ServerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        read_json(path.as_ref())
    }
}

impl ElectionSetup {
    pub fn load_public_key(&self) -> Result<Option<PublicKey>, ConfigError> {
        self.public_key_path.as_deref().map(read_json::<PublicKey>).transpose()
    }
}

pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let bytes = fs::read(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}
