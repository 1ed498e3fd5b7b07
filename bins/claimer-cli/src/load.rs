//! Config, snapshot and request files.
//!
//! Every file goes through the `config` crate, so TOML, JSON and YAML are
//! all accepted; the format follows the file extension.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use claimer_core::Address;
use claimer_core::memory::{LedgerState, MemoryLedger, MemoryVault};
use claimer_core::types::{ClaimItem, ClaimRequest};
use claimer_engine::ClaimerConfig;
use config::{Config, Environment, File};
use serde::Deserialize;
use serde::de::DeserializeOwned;

/// Prefix of environment overrides, e.g. `CLAIMER__TIME_TO_REACH_MAX_FEE`.
pub const ENV_PREFIX: &str = "CLAIMER";

/// `<data dir>/claimer/claimer.toml`, if the platform has a data dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("claimer").join("claimer.toml"))
}

/// Load the claimer config with environment overrides.
///
/// An explicit `path` must exist. Without one the default path is read if
/// present, and built-in defaults fill every missing field.
pub fn load_config(path: Option<&Path>) -> Result<ClaimerConfig> {
    load_config_with_env(
        path,
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__"),
    )
}

pub fn load_config_with_env(path: Option<&Path>, env: Environment) -> Result<ClaimerConfig> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => match default_config_path() {
            Some(path) => File::from(path).required(false),
            None => File::with_name("claimer").required(false),
        },
    };

    let config: ClaimerConfig = Config::builder()
        .add_source(file)
        .add_source(env)
        .build()
        .context("failed to read claimer config")?
        .try_deserialize()
        .context("invalid claimer config")?;
    config.validate().context("invalid claimer config")?;
    Ok(config)
}

/// Ledger and vault state for offline quoting and simulation.
#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    /// Clock value used as "now", unix seconds.
    pub now: u64,
    pub ledger: LedgerState,
    #[serde(default)]
    pub vault: VaultSnapshot,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VaultSnapshot {
    pub address: Address,
    /// Items the vault will pay.
    pub winners: Vec<ClaimItem>,
    /// Items claimed before the snapshot.
    pub claimed: Vec<ClaimItem>,
}

impl Snapshot {
    /// Build the in-memory ledger and vault.
    pub fn into_world(self) -> (Arc<MemoryLedger>, Arc<MemoryVault>) {
        let ledger = Arc::new(MemoryLedger::new(self.ledger));
        let vault_address = if self.vault.address.is_zero() {
            Address::repeat_byte(0xaa)
        } else {
            self.vault.address
        };
        let vault = MemoryVault::new(vault_address, Arc::clone(&ledger))
            .with_winners(self.vault.winners);
        for item in self.vault.claimed {
            vault.mark_claimed(item);
        }
        (ledger, Arc::new(vault))
    }
}

pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    read_file(path).with_context(|| format!("invalid snapshot {}", path.display()))
}

pub fn load_request(path: &Path) -> Result<ClaimRequest> {
    read_file(path).with_context(|| format!("invalid claim request {}", path.display()))
}

fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    Ok(Config::builder()
        .add_source(File::from(path).required(true))
        .build()?
        .try_deserialize()?)
}
