//! Chain identity mapping.
//!
//! Translates provider-A slugs (`eth`, `matic`, `era`, ...), provider-B slugs
//! and numeric EVM chain ids into the canonical chain key. The table is fixed
//! and explicit; a chain that is not in it is simply not tracked.

use recon_core::{ChainEntry, Config, Error, Provider, Result};
use std::collections::HashMap;
use tracing::debug;

/// Immutable chain identity table.
#[derive(Debug, Clone)]
pub struct ChainIdentityMapper {
    /// Rows in configured order.
    entries: Vec<ChainEntry>,
    /// Provider-A slug → row index.
    by_debank: HashMap<String, usize>,
    /// Canonical key (provider-B slug) → row index.
    by_canonical: HashMap<String, usize>,
    /// EVM chain id → row index.
    by_chain_id: HashMap<u64, usize>,
}

impl ChainIdentityMapper {
    /// Build the mapper, rejecting tables that are not 1:1.
    pub fn new(entries: Vec<ChainEntry>) -> Result<Self> {
        let mut by_debank = HashMap::with_capacity(entries.len());
        let mut by_canonical = HashMap::with_capacity(entries.len());
        let mut by_chain_id = HashMap::with_capacity(entries.len());

        for (idx, entry) in entries.iter().enumerate() {
            if by_canonical.insert(entry.canonical.clone(), idx).is_some() {
                return Err(Error::config(format!(
                    "duplicate canonical chain key '{}'",
                    entry.canonical
                )));
            }
            if by_debank.insert(entry.debank.clone(), idx).is_some() {
                return Err(Error::config(format!(
                    "duplicate provider-A chain slug '{}'",
                    entry.debank
                )));
            }
            if let Some(chain_id) = entry.chain_id {
                if by_chain_id.insert(chain_id, idx).is_some() {
                    return Err(Error::config(format!("duplicate EVM chain id {chain_id}")));
                }
            }
        }

        debug!(chains = entries.len(), "chain identity table loaded");

        Ok(Self {
            entries,
            by_debank,
            by_canonical,
            by_chain_id,
        })
    }

    /// Build the mapper from the configured chain table.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.chains.clone())
    }

    /// Canonical key for a provider-A chain slug.
    pub fn canonical_for_native(&self, slug: &str) -> Option<&str> {
        self.by_debank
            .get(slug)
            .map(|&idx| self.entries[idx].canonical.as_str())
    }

    /// Canonical key for a numeric EVM chain id.
    pub fn canonical_for_chain_id(&self, chain_id: u64) -> Option<&str> {
        self.by_chain_id
            .get(&chain_id)
            .map(|&idx| self.entries[idx].canonical.as_str())
    }

    /// Canonical key for a provider-B chain slug.
    pub fn canonical_for_provider_b(&self, slug: &str) -> Option<&str> {
        self.by_canonical
            .get(slug)
            .map(|&idx| self.entries[idx].canonical.as_str())
    }

    /// Resolve a provider-B chain reference, which is either a numeric chain id
    /// (`"1"`, `"137"`) or a provider-B slug.
    pub fn resolve_reference(&self, reference: &str) -> Option<&str> {
        let reference = reference.trim();
        match reference.parse::<u64>() {
            Ok(chain_id) => self.canonical_for_chain_id(chain_id),
            Err(_) => self.canonical_for_provider_b(reference),
        }
    }

    /// Provider-native resource key for a canonical chain.
    pub fn native_slug(&self, provider: Provider, canonical: &str) -> Option<&str> {
        let entry = &self.entries[*self.by_canonical.get(canonical)?];
        Some(match provider {
            Provider::Debank => entry.debank.as_str(),
            Provider::Zerion => entry.canonical.as_str(),
        })
    }

    /// Canonical keys in configured order.
    pub fn canonical_keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.canonical.as_str())
    }

    /// Number of tracked chains.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no chain is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
