//! Network-scoped deployment configuration.
//!
//! The file maps a network id to the addresses of the two contracts deployed
//! there:
//!
//! ```json
//! { "31337": { "rentalProperty": { "address": "C..." }, "rentalEscrow": { "address": "C..." } } }
//! ```

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ClientError;

/// Network id of the in-process development ledger.
pub const LOCAL_NETWORK_ID: u32 = 31337;

pub const CONFIG_PATH_ENV: &str = "RENTAL_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

pub const CONFIRM_TIMEOUT_ENV: &str = "RENTAL_CONFIRM_TIMEOUT_SECS";
pub const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRef {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub rental_property: ContractRef,
    pub rental_escrow: ContractRef,
}

impl Deployment {
    pub fn new(rental_property: impl Into<String>, rental_escrow: impl Into<String>) -> Self {
        Deployment {
            rental_property: ContractRef { address: rental_property.into() },
            rental_escrow: ContractRef { address: rental_escrow.into() },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkConfig {
    networks: BTreeMap<u32, Deployment>,
}

impl NetworkConfig {
    /// `RENTAL_CONFIG` if set, otherwise `config.json` in the working directory.
    pub fn default_path() -> PathBuf {
        env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.networks)
    }

    pub fn load(path: &Path) -> Result<Self, ClientError> {
        let raw = fs::read_to_string(path).map_err(|e| config_error(path, e))?;
        let config = Self::from_json(&raw).map_err(|e| config_error(path, e))?;
        debug!(path = %path.display(), networks = config.networks.len(), "Loaded network config");
        Ok(config)
    }

    /// Like [`NetworkConfig::load`] but a missing file yields an empty config.
    pub fn load_or_default(path: &Path) -> Result<Self, ClientError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ClientError> {
        let json = self.to_json().map_err(|e| config_error(path, e))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| config_error(path, e))?;
        }
        fs::write(path, json).map_err(|e| config_error(path, e))?;
        debug!(path = %path.display(), "Saved network config");
        Ok(())
    }

    pub fn deployment(&self, network_id: u32) -> Result<&Deployment, ClientError> {
        self.networks
            .get(&network_id)
            .ok_or(ClientError::NetworkMismatch { network_id })
    }

    /// Binds `network_id` to `deployment`, returning the entry it replaced.
    pub fn insert(&mut self, network_id: u32, deployment: Deployment) -> Option<Deployment> {
        self.networks.insert(network_id, deployment)
    }

    pub fn networks(&self) -> impl Iterator<Item = u32> + '_ {
        self.networks.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }
}

/// Confirmation timeout from `RENTAL_CONFIRM_TIMEOUT_SECS`, falling back to
/// 30 seconds when unset or unparsable.
pub fn confirm_timeout_from_env() -> Duration {
    match env::var(CONFIRM_TIMEOUT_ENV) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                warn!(value = %raw, "Ignoring invalid {}", CONFIRM_TIMEOUT_ENV);
                DEFAULT_CONFIRM_TIMEOUT
            }
        },
        Err(_) => DEFAULT_CONFIRM_TIMEOUT,
    }
}

fn config_error(path: &Path, err: impl std::fmt::Display) -> ClientError {
    ClientError::Config {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
