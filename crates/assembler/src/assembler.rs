//! Reconciliation assembler.
//!
//! For every selected address and every tracked chain, looks up each
//! provider's raw payload, normalizes it and pairs the two snapshots into a
//! [`ComparisonRecord`]. Every (address, chain) pair depends only on its own
//! two payloads; a problem with one never stops the pass.

use crate::source::{RawSource, SourceLookup};
use crate::stats::AssemblyStats;
use recon_core::{ComparisonDataset, ComparisonRecord, Config, Provider, Result};
use recon_mapping::{ChainIdentityMapper, ProtocolAliasResolver};
use recon_normalizer::{DebankNormalizer, NormalizeContext, Normalizer, ZerionNormalizer};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Result of a reconciliation pass.
#[derive(Debug, Clone)]
pub struct Assembly {
    /// The comparison dataset.
    pub dataset: ComparisonDataset,
    /// Pass statistics.
    pub stats: AssemblyStats,
}

/// Builds the comparison dataset from raw provider payloads.
pub struct ReconciliationAssembler {
    chains: ChainIdentityMapper,
    aliases: ProtocolAliasResolver,
    normalizers: Vec<Box<dyn Normalizer>>,
    /// Lowercased allow-list, if any.
    allow_list: Option<HashSet<String>>,
}

impl ReconciliationAssembler {
    /// Create an assembler with both provider normalizers.
    pub fn new(chains: ChainIdentityMapper, aliases: ProtocolAliasResolver) -> Self {
        Self {
            chains,
            aliases,
            normalizers: vec![Box::new(DebankNormalizer), Box::new(ZerionNormalizer)],
            allow_list: None,
        }
    }

    /// Create an assembler from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let chains = ChainIdentityMapper::from_config(config)?;
        let aliases = ProtocolAliasResolver::from_config(config);
        let assembler = Self::new(chains, aliases);
        Ok(match &config.address_allow_list {
            Some(list) => assembler.with_allow_list(list.iter().map(String::as_str)),
            None => assembler,
        })
    }

    /// Restrict the pass to the given addresses. Matching ignores ASCII case.
    pub fn with_allow_list<'a>(mut self, addresses: impl IntoIterator<Item = &'a str>) -> Self {
        self.allow_list = Some(
            addresses
                .into_iter()
                .map(|a| a.trim().to_ascii_lowercase())
                .collect(),
        );
        self
    }

    /// Chain identity table in use.
    pub fn chains(&self) -> &ChainIdentityMapper {
        &self.chains
    }

    /// Addresses from `available` that pass the allow-list.
    fn select_addresses(&self, available: Vec<String>, stats: &mut AssemblyStats) -> Vec<String> {
        let Some(allow) = &self.allow_list else {
            return available;
        };

        let available_keys: HashSet<String> =
            available.iter().map(|a| a.to_ascii_lowercase()).collect();
        stats.unknown_allowed = allow.difference(&available_keys).count() as u64;

        let (selected, filtered): (Vec<String>, Vec<String>) = available
            .into_iter()
            .partition(|a| allow.contains(&a.to_ascii_lowercase()));
        stats.filtered_addresses = filtered.len() as u64;
        selected
    }

    /// Run one full reconciliation pass over `source`.
    ///
    /// Fails only when the source cannot list its addresses.
    pub fn assemble(&self, source: &dyn RawSource) -> Result<Assembly> {
        let mut stats = AssemblyStats::default();
        let mut dataset = ComparisonDataset::new();

        let addresses = self.select_addresses(source.addresses()?, &mut stats);
        for address in &addresses {
            self.assemble_address(source, address, &mut dataset, &mut stats);
            stats.addresses += 1;
        }

        Ok(Assembly { dataset, stats })
    }

    fn assemble_address(
        &self,
        source: &dyn RawSource,
        address: &str,
        dataset: &mut ComparisonDataset,
        stats: &mut AssemblyStats,
    ) {
        dataset.ensure_address(address);

        let mut covered = Vec::with_capacity(self.normalizers.len());
        for normalizer in &self.normalizers {
            let provider = normalizer.provider();
            let present = source.has_provider(address, provider);
            if present {
                self.count_unmapped(source, address, provider, stats);
            } else {
                debug!(address, %provider, "no data for provider, using empty snapshots");
                stats.provider_mut(provider).absent_addresses += 1;
            }
            covered.push(present);
        }

        for chain in self.chains.canonical_keys() {
            let ctx = NormalizeContext::new(chain, &self.chains, &self.aliases);
            let mut record = ComparisonRecord::default();

            for (normalizer, present) in self.normalizers.iter().zip(&covered) {
                if !present {
                    continue;
                }
                let provider = normalizer.provider();
                let Some(slug) = self.chains.native_slug(provider, chain) else {
                    continue;
                };

                match source.load(address, provider, slug) {
                    SourceLookup::Found(raw) => {
                        record.set_snapshot(provider, normalizer.normalize(&raw, &ctx));
                        stats.provider_mut(provider).loaded += 1;
                    }
                    SourceLookup::Missing => {
                        stats.provider_mut(provider).missing += 1;
                    }
                    SourceLookup::Malformed(reason) => {
                        warn!(address, chain, %provider, %reason, "malformed payload, using empty snapshot");
                        stats.provider_mut(provider).malformed += 1;
                    }
                }
            }

            dataset.insert(address, chain, record);
            stats.records += 1;
        }
    }

    /// Count payload files whose chain is outside the chain table.
    fn count_unmapped(
        &self,
        source: &dyn RawSource,
        address: &str,
        provider: Provider,
        stats: &mut AssemblyStats,
    ) {
        for slug in source.native_chains(address, provider) {
            let mapped = match provider {
                Provider::Debank => self.chains.canonical_for_native(&slug),
                Provider::Zerion => self.chains.canonical_for_provider_b(&slug),
            };
            if mapped.is_none() {
                debug!(address, %provider, chain = %slug, "skipping unmapped chain");
                stats.provider_mut(provider).unmapped_chains += 1;
            }
        }
    }
}
