//! Provider-A normalization.
//!
//! Provider A groups positions by protocol: each protocol record carries a
//! list of portfolio items, and each item splits its tokens into supplied,
//! borrowed and rewarded lists plus an optional single vesting token.

use crate::lenient;
use crate::normalizer::{NormalizeContext, Normalizer};
use crate::payload::PayloadShape;
use recon_core::{AssetRole, CanonicalAsset, NormalizedChainSnapshot, Provider};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Placeholder for a missing symbol or protocol name.
pub const UNKNOWN: &str = "?";

/// One protocol record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebankProtocol {
    /// Protocol slug (e.g. `aave3`).
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: Option<String>,
    /// Display name.
    #[serde(default, deserialize_with = "lenient::string")]
    pub name: Option<String>,
    /// Portfolio items.
    #[serde(default, deserialize_with = "lenient::list")]
    pub portfolio_item_list: Vec<DebankPortfolioItem>,
}

impl DebankProtocol {
    /// Bucket name: the display name, else the slug, else a placeholder.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.id.as_deref())
            .unwrap_or(UNKNOWN)
    }

    /// Bucket id: the slug, else the display name.
    pub fn protocol_id(&self) -> &str {
        self.id.as_deref().unwrap_or_else(|| self.display_name())
    }
}

/// One portfolio item within a protocol.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebankPortfolioItem {
    /// Aggregate values.
    #[serde(default, deserialize_with = "lenient::record")]
    pub stats: Option<DebankStats>,
    /// Token breakdown.
    #[serde(default, deserialize_with = "lenient::record")]
    pub detail: Option<DebankDetail>,
}

impl DebankPortfolioItem {
    /// Net value of the item, zero when absent.
    pub fn net_value(&self) -> f64 {
        self.stats
            .as_ref()
            .and_then(|s| s.net_usd_value)
            .unwrap_or(0.0)
    }

    /// Decompose the item into canonical assets, in supply, borrow, reward
    /// order. The single vesting token only counts when all three lists are
    /// empty.
    pub fn assets(&self) -> Vec<CanonicalAsset> {
        let Some(detail) = &self.detail else {
            return Vec::new();
        };

        let supply = detail
            .supply_token_list
            .iter()
            .map(|t| t.to_asset(AssetRole::Supply));
        let borrow = detail
            .borrow_token_list
            .iter()
            .map(|t| t.to_asset(AssetRole::Borrow));
        let reward = detail
            .reward_token_list
            .iter()
            .map(|t| t.to_asset(AssetRole::Reward));
        let vesting = detail
            .token
            .iter()
            .filter(|_| !detail.has_token_lists())
            .map(|t| t.to_asset(AssetRole::Vesting));

        supply.chain(borrow).chain(reward).chain(vesting).collect()
    }
}

/// Aggregate values of a portfolio item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebankStats {
    /// Net value (assets minus debt).
    #[serde(default, deserialize_with = "lenient::number")]
    pub net_usd_value: Option<f64>,
}

/// Token breakdown of a portfolio item.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebankDetail {
    #[serde(default, deserialize_with = "lenient::list")]
    pub supply_token_list: Vec<DebankToken>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub borrow_token_list: Vec<DebankToken>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub reward_token_list: Vec<DebankToken>,
    /// Single vesting token.
    #[serde(default, deserialize_with = "lenient::record")]
    pub token: Option<DebankToken>,
}

impl DebankDetail {
    fn has_token_lists(&self) -> bool {
        !self.supply_token_list.is_empty()
            || !self.borrow_token_list.is_empty()
            || !self.reward_token_list.is_empty()
    }
}

/// A token entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DebankToken {
    #[serde(default, deserialize_with = "lenient::string")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub price: Option<f64>,
}

impl DebankToken {
    /// Convert to a canonical asset. Borrowed value is always non-positive,
    /// whatever sign the provider reported. A product that overflows counts
    /// as zero.
    pub fn to_asset(&self, role: AssetRole) -> CanonicalAsset {
        let amount = self.amount.unwrap_or(0.0);
        let price = self.price.unwrap_or(0.0);
        let mut gross = amount * price;
        if !gross.is_finite() {
            debug!(symbol = ?self.symbol, amount, price, "asset value overflows, using zero");
            gross = 0.0;
        }
        let value = if role == AssetRole::Borrow {
            if gross == 0.0 {
                0.0
            } else {
                -gross.abs()
            }
        } else {
            gross
        };
        CanonicalAsset::new(
            self.symbol.as_deref().unwrap_or(UNKNOWN),
            amount,
            price,
            value,
            role,
        )
    }
}

/// Normalize a provider-A protocol list.
///
/// Protocol buckets are keyed by display name verbatim. Protocol values and
/// the snapshot total are sums of portfolio item net values as reported, so
/// they only match the asset sums when the payload is self-consistent.
pub fn normalize_provider_a(raw: &Value) -> NormalizedChainSnapshot {
    let mut snapshot = NormalizedChainSnapshot::empty();

    let shape = PayloadShape::provider_a(raw);
    if let PayloadShape::Malformed(reason) = &shape {
        warn!(provider = "debank", %reason, "malformed payload, treating as empty");
        return snapshot;
    }

    let mut total_value = 0.0;
    for record in shape.records() {
        let Some(protocol) = lenient::as_record::<DebankProtocol>(record) else {
            warn!(provider = "debank", "skipping protocol record that is not an object");
            continue;
        };

        let bucket = snapshot.bucket(protocol.display_name(), protocol.protocol_id());
        for item in &protocol.portfolio_item_list {
            let net = item.net_value();
            bucket.value += net;
            total_value += net;
            bucket.assets.extend(item.assets());
        }
    }
    snapshot.total_value = total_value;

    debug!(
        provider = "debank",
        protocols = snapshot.protocols.len(),
        total_value = snapshot.total_value,
        "normalized payload"
    );
    snapshot
}

/// Provider-A normalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DebankNormalizer;

impl Normalizer for DebankNormalizer {
    fn provider(&self) -> Provider {
        Provider::Debank
    }

    fn normalize(&self, raw: &Value, _ctx: &NormalizeContext<'_>) -> NormalizedChainSnapshot {
        normalize_provider_a(raw)
    }
}
