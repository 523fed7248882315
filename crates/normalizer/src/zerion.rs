//! Provider-B normalization.
//!
//! Provider B reports a flat list of positions. Each position names its
//! protocol (or none, for a plain wallet balance), its position type, a
//! fungible-asset descriptor and a reference to its chain.

use crate::debank::UNKNOWN;
use crate::lenient;
use crate::normalizer::{NormalizeContext, Normalizer};
use crate::payload::PayloadShape;
use recon_core::{AssetRole, CanonicalAsset, NormalizedChainSnapshot, Provider};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// One position record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZerionPosition {
    /// Position id.
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: Option<String>,
    /// Position attributes.
    #[serde(default, deserialize_with = "lenient::record")]
    pub attributes: Option<ZerionAttributes>,
    /// Related resources.
    #[serde(default, deserialize_with = "lenient::record")]
    pub relationships: Option<ZerionRelationships>,
}

impl ZerionPosition {
    /// Protocol name, `None` for a plain wallet balance.
    pub fn protocol(&self) -> Option<&str> {
        self.attributes
            .as_ref()?
            .protocol
            .as_deref()
            .filter(|p| !p.trim().is_empty())
    }

    /// Chain reference (slug or numeric id), if the position carries one.
    pub fn chain_reference(&self) -> Option<&str> {
        self.relationships
            .as_ref()?
            .chain
            .as_ref()?
            .data
            .as_ref()?
            .id
            .as_deref()
    }
}

/// Position attributes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZerionAttributes {
    /// Protocol display name; null for wallet balances.
    #[serde(default, deserialize_with = "lenient::string")]
    pub protocol: Option<String>,
    /// Signed value as reported.
    #[serde(default, deserialize_with = "lenient::number")]
    pub value: Option<f64>,
    /// Unit price.
    #[serde(default, deserialize_with = "lenient::number")]
    pub price: Option<f64>,
    /// Position type tag (`deposit`, `staked`, `locked`, `loan`, ...).
    #[serde(default, deserialize_with = "lenient::string")]
    pub position_type: Option<String>,
    /// Token quantity.
    #[serde(default, deserialize_with = "lenient::record")]
    pub quantity: Option<ZerionQuantity>,
    /// Fungible-asset descriptor.
    #[serde(default, deserialize_with = "lenient::record")]
    pub fungible_info: Option<ZerionFungibleInfo>,
    /// Risk flags, kept opaque.
    #[serde(default, deserialize_with = "lenient::opaque")]
    pub flags: Option<Value>,
}

/// Token quantity in several representations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZerionQuantity {
    #[serde(default, deserialize_with = "lenient::number")]
    pub float: Option<f64>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub numeric: Option<f64>,
}

impl ZerionQuantity {
    fn amount(&self) -> Option<f64> {
        self.float.or(self.numeric)
    }
}

/// Fungible-asset descriptor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZerionFungibleInfo {
    #[serde(default, deserialize_with = "lenient::string")]
    pub symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient::opaque")]
    pub flags: Option<Value>,
}

/// Related resources of a position.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZerionRelationships {
    #[serde(default, deserialize_with = "lenient::record")]
    pub chain: Option<ZerionRelation>,
}

/// A relationship wrapper.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZerionRelation {
    #[serde(default, deserialize_with = "lenient::record")]
    pub data: Option<ZerionRelationData>,
}

/// Relationship target.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ZerionRelationData {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: Option<String>,
}

/// Map a position type tag onto the canonical role taxonomy.
///
/// `locked` and `staked` count as supply; every other tag passes through.
pub fn coalesce_position_type(tag: &str) -> AssetRole {
    match tag {
        "locked" | "staked" => AssetRole::Supply,
        other => AssetRole::from_tag(other),
    }
}

fn to_asset(attributes: &ZerionAttributes) -> CanonicalAsset {
    let info = attributes.fungible_info.as_ref();
    let symbol = info.and_then(|f| f.symbol.as_deref()).unwrap_or(UNKNOWN);
    let amount = attributes
        .quantity
        .as_ref()
        .and_then(ZerionQuantity::amount)
        .unwrap_or(0.0);
    let price = attributes.price.unwrap_or(0.0);
    let value = attributes.value.unwrap_or(0.0);
    let role = attributes
        .position_type
        .as_deref()
        .map(coalesce_position_type)
        .unwrap_or(AssetRole::Supply);
    let flags = attributes
        .flags
        .clone()
        .or_else(|| info.and_then(|f| f.flags.clone()));

    CanonicalAsset::new(symbol, amount, price, value, role).with_flags(flags)
}

/// Normalize a provider-B position list for the chain in `ctx`.
///
/// Wallet balances (no protocol) are dropped, protocol names are resolved
/// through the alias table, and values are taken as reported.
pub fn normalize_provider_b(raw: &Value, ctx: &NormalizeContext<'_>) -> NormalizedChainSnapshot {
    let mut snapshot = NormalizedChainSnapshot::empty();

    let shape = PayloadShape::provider_b(raw);
    if let PayloadShape::Malformed(reason) = &shape {
        warn!(provider = "zerion", chain = ctx.chain, %reason, "malformed payload, treating as empty");
        return snapshot;
    }

    let mut total_value = 0.0;
    let mut wallet_positions = 0usize;
    for record in shape.records() {
        let Some(position) = lenient::as_record::<ZerionPosition>(record) else {
            warn!(provider = "zerion", chain = ctx.chain, "skipping position record that is not an object");
            continue;
        };
        let Some(protocol) = position.protocol() else {
            wallet_positions += 1;
            continue;
        };

        if let Some(reference) = position.chain_reference() {
            match ctx.chains.resolve_reference(reference) {
                Some(chain) if chain == ctx.chain => {}
                Some(chain) => {
                    debug!(position = ?position.id, expected = ctx.chain, found = chain, "position belongs to another chain");
                    continue;
                }
                None => {
                    debug!(position = ?position.id, reference, "position on unmapped chain");
                    continue;
                }
            }
        }

        let Some(attributes) = position.attributes.as_ref() else {
            continue;
        };
        let asset = to_asset(attributes);
        if asset.role.is_liability() && asset.value > 0.0 {
            warn!(
                position = ?position.id,
                role = %asset.role,
                value = asset.value,
                "liability reported with positive value, keeping reported sign"
            );
        }

        let name = ctx.aliases.resolve(ctx.chain, protocol);
        let bucket = snapshot.bucket(name, name);
        bucket.value += asset.value;
        total_value += asset.value;
        bucket.assets.push(asset);
    }
    snapshot.total_value = total_value;

    debug!(
        provider = "zerion",
        chain = ctx.chain,
        protocols = snapshot.protocols.len(),
        wallet_positions,
        total_value = snapshot.total_value,
        "normalized payload"
    );
    snapshot
}

/// Provider-B normalizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZerionNormalizer;

impl Normalizer for ZerionNormalizer {
    fn provider(&self) -> Provider {
        Provider::Zerion
    }

    fn normalize(&self, raw: &Value, ctx: &NormalizeContext<'_>) -> NormalizedChainSnapshot {
        normalize_provider_b(raw, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use recon_core::Config;
    use recon_mapping::{ChainIdentityMapper, ProtocolAliasResolver};
    use serde_json::json;

    struct Tables {
        chains: ChainIdentityMapper,
        aliases: ProtocolAliasResolver,
    }

    impl Tables {
        fn new() -> Self {
            let config = Config::default();
            Self {
                chains: ChainIdentityMapper::from_config(&config).unwrap(),
                aliases: ProtocolAliasResolver::from_config(&config),
            }
        }

        fn ctx<'a>(&'a self, chain: &'a str) -> NormalizeContext<'a> {
            NormalizeContext::new(chain, &self.chains, &self.aliases)
        }
    }

    fn position(protocol: Option<&str>, position_type: &str, symbol: &str, value: f64) -> Value {
        json!({
            "type": "positions",
            "id": format!("{symbol}-{position_type}"),
            "attributes": {
                "protocol": protocol,
                "name": "Asset",
                "position_type": position_type,
                "quantity": {"float": 2.0, "numeric": "2.0"},
                "price": value / 2.0,
                "value": value,
                "fungible_info": {"symbol": symbol, "name": symbol},
                "flags": {"displayable": true, "is_trash": false}
            },
            "relationships": {"chain": {"data": {"type": "chains", "id": "ethereum"}}}
        })
    }

    #[test]
    fn test_wallet_balance_excluded() {
        let tables = Tables::new();
        let raw = json!({"data": [{"attributes": {"protocol": null, "value": 50}}]});
        let snapshot = normalize_provider_b(&raw, &tables.ctx("ethereum"));
        assert_eq!(
            serde_json::to_value(&snapshot).unwrap(),
            json!({"protocols": {}, "totalValue": 0.0})
        );
    }

    #[test]
    fn test_absent_protocol_excluded() {
        let tables = Tables::new();
        let raw = json!([
            {"attributes": {"value": 10.0}},
            position(None, "wallet", "ETH", 3000.0),
            position(Some("Aave V3"), "deposit", "USDC", 100.0)
        ]);
        let snapshot = normalize_provider_b(&raw, &tables.ctx("ethereum"));
        assert_eq!(snapshot.protocols.len(), 1);
        assert_eq!(snapshot.asset_count(), 1);
        assert!(snapshot
            .protocols
            .values()
            .flat_map(|p| &p.assets)
            .all(|a| a.symbol != "ETH"));
        assert_relative_eq!(snapshot.total_value, 100.0);
    }

    #[test]
    fn test_alias_applied_before_bucketing() {
        let tables = Tables::new();
        let raw = json!([position(Some("Morpho Blue"), "deposit", "USDC", 250.0)]);
        let snapshot = normalize_provider_b(&raw, &tables.ctx("ethereum"));
        let morpho = &snapshot.protocols["Morpho"];
        assert_eq!(morpho.name, "Morpho");
        assert_eq!(morpho.id, "Morpho");
        assert!(!snapshot.protocols.contains_key("Morpho Blue"));
    }

    #[test]
    fn test_locked_and_staked_become_supply() {
        let tables = Tables::new();
        let raw = json!([
            position(Some("Lido"), "staked", "stETH", 2000.0),
            position(Some("Convex Finance"), "locked", "CVX", 40.0),
            position(Some("Aave V3"), "deposit", "USDC", 10.0)
        ]);
        let snapshot = normalize_provider_b(&raw, &tables.ctx("ethereum"));
        assert_eq!(snapshot.protocols["LIDO"].assets[0].role, AssetRole::Supply);
        assert_eq!(snapshot.protocols["Convex"].assets[0].role, AssetRole::Supply);
        assert_eq!(
            snapshot.protocols["Aave V3"].assets[0].role,
            AssetRole::Other("deposit".to_string())
        );
    }

    #[test]
    fn test_same_protocol_positions_merge() {
        let tables = Tables::new();
        let raw = json!([
            position(Some("Aave V3"), "deposit", "WETH", 2000.0),
            position(Some("Aave V3"), "loan", "USDC", -500.0)
        ]);
        let snapshot = normalize_provider_b(&raw, &tables.ctx("ethereum"));
        let aave = &snapshot.protocols["Aave V3"];
        assert_eq!(aave.assets.len(), 2);
        assert_relative_eq!(aave.value, 1500.0);
        assert_relative_eq!(aave.value, aave.assets_value());
        assert_relative_eq!(snapshot.total_value, snapshot.protocols_value());
    }

    #[test]
    fn test_missing_fields_degrade() {
        let tables = Tables::new();
        let raw = json!([{"attributes": {"protocol": "Curve", "position_type": "deposit"}}]);
        let snapshot = normalize_provider_b(&raw, &tables.ctx("ethereum"));
        let asset = &snapshot.protocols["Curve"].assets[0];
        assert_eq!(asset.symbol, "?");
        assert_eq!(asset.amount, 0.0);
        assert_eq!(asset.price, 0.0);
        assert_eq!(asset.value, 0.0);
        assert!(asset.flags.is_none());
    }

    #[test]
    fn test_symbol_trimmed_and_flags_copied() {
        let tables = Tables::new();
        let raw = json!([{
            "attributes": {
                "protocol": "Curve",
                "position_type": "deposit",
                "value": 5.0,
                "quantity": {"numeric": "5"},
                "price": 1.0,
                "fungible_info": {"symbol": " crvUSD "},
                "flags": {"is_trash": true}
            }
        }]);
        let snapshot = normalize_provider_b(&raw, &tables.ctx("ethereum"));
        let asset = &snapshot.protocols["Curve"].assets[0];
        assert_eq!(asset.symbol, "crvUSD");
        assert_relative_eq!(asset.amount, 5.0);
        assert_eq!(asset.flags, Some(json!({"is_trash": true})));
    }

    #[test]
    fn test_positions_on_other_chains_skipped() {
        let tables = Tables::new();
        let mut on_polygon = position(Some("Aave V3"), "deposit", "USDC", 10.0);
        on_polygon["relationships"]["chain"]["data"]["id"] = json!("137");
        let mut on_unmapped = position(Some("Aave V3"), "deposit", "USDC", 20.0);
        on_unmapped["relationships"]["chain"]["data"]["id"] = json!("blast");
        let mut numeric_eth = position(Some("Aave V3"), "deposit", "DAI", 30.0);
        numeric_eth["relationships"]["chain"]["data"]["id"] = json!("1");

        let raw = json!([on_polygon, on_unmapped, numeric_eth]);
        let snapshot = normalize_provider_b(&raw, &tables.ctx("ethereum"));
        assert_eq!(snapshot.asset_count(), 1);
        assert_relative_eq!(snapshot.total_value, 30.0);
    }

    #[test]
    fn test_reported_sign_is_kept() {
        let tables = Tables::new();
        let raw = json!([position(Some("Spark"), "loan", "DAI", 75.0)]);
        let snapshot = normalize_provider_b(&raw, &tables.ctx("ethereum"));
        assert_relative_eq!(snapshot.protocols["Spark"].assets[0].value, 75.0);
    }

    #[test]
    fn test_alias_scoped_to_context_chain() {
        let tables = Tables::new();
        let mut on_base = position(Some("Morpho Blue"), "deposit", "USDC", 1.0);
        on_base["relationships"]["chain"]["data"]["id"] = json!("base");
        let mut on_arb = position(Some("Morpho Blue"), "deposit", "USDC", 1.0);
        on_arb["relationships"]["chain"]["data"]["id"] = json!("arbitrum");

        let base = normalize_provider_b(&json!([on_base]), &tables.ctx("base"));
        let arb = normalize_provider_b(&json!([on_arb]), &tables.ctx("arbitrum"));
        assert!(base.protocols.contains_key("Morpho"));
        assert!(arb.protocols.contains_key("Morpho Blue"));
    }

    #[test]
    fn test_malformed_payloads() {
        let tables = Tables::new();
        for raw in [json!({"meta": {}}), json!("x"), json!({"data": 5}), json!([1, "a"])] {
            let snapshot = normalize_provider_b(&raw, &tables.ctx("ethereum"));
            assert!(snapshot.is_empty());
            assert_eq!(snapshot.total_value, 0.0);
        }
    }

    #[test]
    fn test_trait_dispatch() {
        let tables = Tables::new();
        let normalizer: &dyn Normalizer = &ZerionNormalizer;
        assert_eq!(normalizer.provider(), Provider::Zerion);
        let raw = json!([position(Some("Aave V3"), "deposit", "USDC", 100.0)]);
        let snapshot = normalizer.normalize(&raw, &tables.ctx("ethereum"));
        assert_relative_eq!(snapshot.total_value, 100.0);
    }
}
