//! The provider-agnostic normalization capability.

use recon_core::{NormalizedChainSnapshot, Provider};
use recon_mapping::{ChainIdentityMapper, ProtocolAliasResolver};
use serde_json::Value;

/// Lookup context for normalizing one (address, chain) payload.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeContext<'a> {
    /// Canonical key of the chain being normalized.
    pub chain: &'a str,
    /// Chain identity table.
    pub chains: &'a ChainIdentityMapper,
    /// Protocol alias table.
    pub aliases: &'a ProtocolAliasResolver,
}

impl<'a> NormalizeContext<'a> {
    /// Create a context for `chain`.
    pub fn new(
        chain: &'a str,
        chains: &'a ChainIdentityMapper,
        aliases: &'a ProtocolAliasResolver,
    ) -> Self {
        Self {
            chain,
            chains,
            aliases,
        }
    }
}

/// Turns one provider's raw per-chain payload into a canonical snapshot.
///
/// Implementations are total: any input, however partial, yields a snapshot.
pub trait Normalizer {
    /// Provider whose payloads this normalizer understands.
    fn provider(&self) -> Provider;

    /// Normalize a raw payload.
    fn normalize(&self, raw: &Value, ctx: &NormalizeContext<'_>) -> NormalizedChainSnapshot;
}
