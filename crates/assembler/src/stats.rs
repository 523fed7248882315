//! Statistics about a reconciliation pass.

use recon_core::Provider;
use tracing::info;

/// Per-provider payload counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderStats {
    /// Payloads found and normalized.
    pub loaded: u64,
    /// (address, chain) pairs with no payload.
    pub missing: u64,
    /// Payloads that could not be read or parsed.
    pub malformed: u64,
    /// Addresses with no data at all for this provider.
    pub absent_addresses: u64,
    /// Payload files for chains outside the chain table.
    pub unmapped_chains: u64,
}

impl ProviderStats {
    /// Fraction of looked-up payloads that were usable.
    pub fn coverage(&self) -> f64 {
        let total = self.loaded + self.missing + self.malformed;
        if total > 0 {
            self.loaded as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Statistics about one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    /// Addresses processed.
    pub addresses: u64,
    /// Addresses with raw data that the allow-list excluded.
    pub filtered_addresses: u64,
    /// Allow-listed addresses with no raw data.
    pub unknown_allowed: u64,
    /// (address, chain) records written.
    pub records: u64,
    /// Provider-A counters.
    pub debank: ProviderStats,
    /// Provider-B counters.
    pub zerion: ProviderStats,
}

impl AssemblyStats {
    /// Counters for a provider.
    pub fn provider(&self, provider: Provider) -> &ProviderStats {
        match provider {
            Provider::Debank => &self.debank,
            Provider::Zerion => &self.zerion,
        }
    }

    /// Mutable counters for a provider.
    pub fn provider_mut(&mut self, provider: Provider) -> &mut ProviderStats {
        match provider {
            Provider::Debank => &mut self.debank,
            Provider::Zerion => &mut self.zerion,
        }
    }

    /// Emit a one-line summary per provider.
    pub fn log_summary(&self) {
        info!(
            addresses = self.addresses,
            filtered = self.filtered_addresses,
            unknown_allowed = self.unknown_allowed,
            records = self.records,
            "reconciliation pass complete"
        );
        for provider in Provider::ALL {
            let stats = self.provider(provider);
            info!(
                %provider,
                loaded = stats.loaded,
                missing = stats.missing,
                malformed = stats.malformed,
                absent_addresses = stats.absent_addresses,
                unmapped_chains = stats.unmapped_chains,
                coverage = stats.coverage(),
                "provider coverage"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_coverage() {
        let stats = ProviderStats {
            loaded: 3,
            missing: 1,
            malformed: 0,
            ..Default::default()
        };
        assert_relative_eq!(stats.coverage(), 0.75);
        assert_eq!(ProviderStats::default().coverage(), 0.0);
    }

    #[test]
    fn test_provider_mut() {
        let mut stats = AssemblyStats::default();
        stats.provider_mut(Provider::Zerion).malformed += 2;
        assert_eq!(stats.zerion.malformed, 2);
        assert_eq!(stats.provider(Provider::Debank).malformed, 0);
    }
}
