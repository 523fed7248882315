//! Configuration structures for the position reconciliation system.
//!
//! The chain table and the protocol alias table are static configuration:
//! they are loaded once at start-up and never mutated during a run.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration for a reconciliation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Raw input location.
    pub input: InputConfig,
    /// Output dataset location.
    pub output: OutputConfig,
    /// Tracked chains, in output order.
    pub chains: Vec<ChainEntry>,
    /// Canonical chain key → provider-B protocol name → provider-A name.
    pub aliases: BTreeMap<String, BTreeMap<String, String>>,
    /// Optional allow-list of addresses to process.
    pub address_allow_list: Option<Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: InputConfig::default(),
            output: OutputConfig::default(),
            chains: default_chains(),
            aliases: default_aliases(),
            address_allow_list: None,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file. Missing sections take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;
        let config: Config = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable.
    ///
    /// Uniqueness of chain identifiers is checked when the chain mapper is built.
    pub fn validate(&self) -> Result<()> {
        if self.chains.is_empty() {
            return Err(Error::config("chain table is empty"));
        }
        for entry in &self.chains {
            if entry.canonical.trim().is_empty() {
                return Err(Error::config("chain entry with empty canonical key"));
            }
            if entry.debank.trim().is_empty() {
                return Err(Error::config(format!(
                    "chain {} has an empty provider-A slug",
                    entry.canonical
                )));
            }
        }
        if let Some(list) = &self.address_allow_list {
            if list.iter().any(|a| a.trim().is_empty()) {
                return Err(Error::config("address allow-list contains an empty entry"));
            }
        }
        Ok(())
    }
}

/// Raw input configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Root directory holding `<address>/<provider>/<chain>.json` files.
    pub root: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("data/raw"),
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path of the comparison dataset.
    pub path: PathBuf,
    /// Pretty-print the JSON document.
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/comparison.json"),
            pretty: true,
        }
    }
}

/// One row of the chain identity table.
///
/// The provider-B slug is the canonical key itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChainEntry {
    /// Canonical key (provider-B slug).
    pub canonical: String,
    /// Provider-A slug.
    pub debank: String,
    /// Numeric EVM chain id.
    #[serde(default)]
    pub chain_id: Option<u64>,
}

impl ChainEntry {
    /// Create a chain entry.
    pub fn new(canonical: &str, debank: &str, chain_id: Option<u64>) -> Self {
        Self {
            canonical: canonical.to_string(),
            debank: debank.to_string(),
            chain_id,
        }
    }
}

fn default_chains() -> Vec<ChainEntry> {
    vec![
        ChainEntry::new("ethereum", "eth", Some(1)),
        ChainEntry::new("binance-smart-chain", "bsc", Some(56)),
        ChainEntry::new("polygon", "matic", Some(137)),
        ChainEntry::new("fantom", "ftm", Some(250)),
        ChainEntry::new("avalanche", "avax", Some(43114)),
        ChainEntry::new("optimism", "op", Some(10)),
        ChainEntry::new("arbitrum", "arb", Some(42161)),
        ChainEntry::new("base", "base", Some(8453)),
        ChainEntry::new("linea", "linea", Some(59144)),
        ChainEntry::new("zksync-era", "era", Some(324)),
        ChainEntry::new("scroll", "scroll", Some(534352)),
    ]
}

fn default_aliases() -> BTreeMap<String, BTreeMap<String, String>> {
    let table: &[(&str, &[(&str, &str)])] = &[
        (
            "ethereum",
            &[
                ("Morpho Blue", "Morpho"),
                ("Lido", "LIDO"),
                ("Convex Finance", "Convex"),
                ("Pendle V2", "Pendle"),
            ],
        ),
        ("optimism", &[("Velodrome", "Velodrome V2")]),
        ("base", &[("Aerodrome", "Aerodrome V2"), ("Morpho Blue", "Morpho")]),
        ("arbitrum", &[("GMX V2", "GMX"), ("Pendle V2", "Pendle")]),
        ("binance-smart-chain", &[("PancakeSwap V3", "PancakeSwap")]),
    ];

    table
        .iter()
        .map(|(chain, pairs)| {
            let names = pairs
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect();
            (chain.to_string(), names)
        })
        .collect()
}
