//! Chain-scoped protocol alias resolution.
//!
//! Maps a provider-B protocol display name to the provider-A name for the same
//! protocol. Entries are looked up by (canonical chain, name) and applied in
//! the configured direction only.

use recon_core::Config;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Immutable alias table.
#[derive(Debug, Clone, Default)]
pub struct ProtocolAliasResolver {
    /// Canonical chain key → provider-B name → provider-A name.
    table: HashMap<String, HashMap<String, String>>,
}

impl ProtocolAliasResolver {
    /// Build a resolver from a chain-keyed table.
    pub fn new(table: BTreeMap<String, BTreeMap<String, String>>) -> Self {
        let table: HashMap<String, HashMap<String, String>> = table
            .into_iter()
            .map(|(chain, names)| (chain, names.into_iter().collect()))
            .collect();

        let resolver = Self { table };
        debug!(aliases = resolver.alias_count(), "protocol alias table loaded");
        resolver
    }

    /// Build a resolver from the configured alias table.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.aliases.clone())
    }

    /// Provider-A name for `name` on `chain`, or `name` itself when no alias exists.
    pub fn resolve<'a>(&'a self, chain: &str, name: &'a str) -> &'a str {
        self.table
            .get(chain)
            .and_then(|names| names.get(name))
            .map(String::as_str)
            .unwrap_or(name)
    }

    /// Total number of configured aliases across all chains.
    pub fn alias_count(&self) -> usize {
        self.table.values().map(HashMap::len).sum()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.alias_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[(&str, &str, &str)]) -> BTreeMap<String, BTreeMap<String, String>> {
        let mut table: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for (chain, from, to) in rows {
            table
                .entry(chain.to_string())
                .or_default()
                .insert(from.to_string(), to.to_string());
        }
        table
    }

    #[test]
    fn test_resolves_configured_alias() {
        let resolver = ProtocolAliasResolver::new(table(&[("ethereum", "Morpho Blue", "Morpho")]));
        assert_eq!(resolver.resolve("ethereum", "Morpho Blue"), "Morpho");
    }

    #[test]
    fn test_unknown_name_passes_through() {
        let resolver = ProtocolAliasResolver::new(table(&[("ethereum", "Morpho Blue", "Morpho")]));
        assert_eq!(resolver.resolve("ethereum", "Aave V3"), "Aave V3");
        assert_eq!(resolver.resolve("solana", "Morpho Blue"), "Morpho Blue");
    }

    #[test]
    fn test_alias_is_chain_scoped() {
        let resolver = ProtocolAliasResolver::new(table(&[
            ("ethereum", "Pendle", "Pendle V2"),
            ("arbitrum", "Pendle", "Pendle Arbitrum"),
        ]));
        let eth = resolver.resolve("ethereum", "Pendle");
        let arb = resolver.resolve("arbitrum", "Pendle");
        assert_eq!(eth, "Pendle V2");
        assert_eq!(arb, "Pendle Arbitrum");
        assert_ne!(eth, arb);
    }

    #[test]
    fn test_contradictory_entries_apply_per_chain_only() {
        let resolver = ProtocolAliasResolver::new(table(&[
            ("optimism", "Velodrome", "Velodrome V2"),
            ("base", "Velodrome V2", "Velodrome"),
        ]));
        assert_eq!(resolver.resolve("optimism", "Velodrome"), "Velodrome V2");
        assert_eq!(resolver.resolve("optimism", "Velodrome V2"), "Velodrome V2");
        assert_eq!(resolver.resolve("base", "Velodrome V2"), "Velodrome");
        assert_eq!(resolver.resolve("base", "Velodrome"), "Velodrome");
    }

    #[test]
    fn test_default_table() {
        let resolver = ProtocolAliasResolver::from_config(&Config::default());
        assert!(!resolver.is_empty());
        assert_eq!(resolver.resolve("ethereum", "Morpho Blue"), "Morpho");
        assert!(ProtocolAliasResolver::default().is_empty());
    }
}
