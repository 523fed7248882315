//! Core data types for the position reconciliation system.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Chain identifier in the provider-B vocabulary, shared by the whole pipeline.
pub type CanonicalChainKey = String;

/// Wallet address, spelled as stored by the fetch layer.
pub type Address = String;

/// One of the two data providers being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Protocol-grouped portfolio items (provider A).
    Debank,
    /// Flat position list (provider B).
    Zerion,
}

impl Provider {
    /// Both providers, in output order.
    pub const ALL: [Provider; 2] = [Provider::Debank, Provider::Zerion];

    /// Lowercase name, also used as the raw-data directory name.
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Debank => "debank",
            Provider::Zerion => "zerion",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Economic role of an asset within a position.
///
/// Provider-B position types that have no canonical counterpart are kept
/// verbatim in `Other` and serialized unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetRole {
    /// Supplied, deposited or staked.
    Supply,
    /// Borrowed (liability).
    Borrow,
    /// Pending or claimable reward.
    Reward,
    /// Vesting allocation.
    Vesting,
    /// Provider-specific tag passed through as is.
    Other(String),
}

impl AssetRole {
    /// Parse a role tag. Unknown tags become `Other`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "supply" => AssetRole::Supply,
            "borrow" => AssetRole::Borrow,
            "reward" => AssetRole::Reward,
            "vesting" => AssetRole::Vesting,
            other => AssetRole::Other(other.to_string()),
        }
    }

    /// Tag as written to the output dataset.
    pub fn as_str(&self) -> &str {
        match self {
            AssetRole::Supply => "supply",
            AssetRole::Borrow => "borrow",
            AssetRole::Reward => "reward",
            AssetRole::Vesting => "vesting",
            AssetRole::Other(tag) => tag,
        }
    }

    /// Whether this role denotes a liability.
    pub fn is_liability(&self) -> bool {
        match self {
            AssetRole::Borrow => true,
            AssetRole::Other(tag) => matches!(tag.as_str(), "borrowed" | "loan"),
            _ => false,
        }
    }
}

impl fmt::Display for AssetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AssetRole {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AssetRole {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(AssetRole::from_tag(&tag))
    }
}

/// Unified per-asset record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalAsset {
    /// Token symbol, trimmed of surrounding whitespace.
    pub symbol: String,
    /// Token amount.
    pub amount: f64,
    /// Unit price.
    pub price: f64,
    /// Signed value; liabilities are negative.
    pub value: f64,
    /// Economic role.
    pub role: AssetRole,
    /// Opaque provider risk markers, copied through for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<serde_json::Value>,
}

impl CanonicalAsset {
    /// Create an asset. The symbol is trimmed; case and inner characters are kept.
    pub fn new(symbol: &str, amount: f64, price: f64, value: f64, role: AssetRole) -> Self {
        Self {
            symbol: symbol.trim().to_string(),
            amount,
            price,
            value,
            role,
            flags: None,
        }
    }

    /// Attach risk flags.
    pub fn with_flags(mut self, flags: Option<serde_json::Value>) -> Self {
        self.flags = flags;
        self
    }
}

/// One protocol bucket within a chain snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedProtocol {
    /// Display name after alias resolution.
    pub name: String,
    /// Provider-A slug when known, otherwise the display name.
    pub id: String,
    /// Signed protocol value.
    pub value: f64,
    /// Constituent assets in source order.
    pub assets: Vec<CanonicalAsset>,
}

impl NormalizedProtocol {
    /// Create an empty bucket.
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            value: 0.0,
            assets: Vec::new(),
        }
    }

    /// Sum of the constituent asset values.
    pub fn assets_value(&self) -> f64 {
        self.assets.iter().map(|a| a.value).sum()
    }
}

/// Fully normalized single-provider view of one address on one chain.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedChainSnapshot {
    /// Protocol buckets keyed by display name.
    pub protocols: BTreeMap<String, NormalizedProtocol>,
    /// Sum of all protocol values.
    #[serde(rename = "totalValue")]
    pub total_value: f64,
}

impl NormalizedChainSnapshot {
    /// Create an empty snapshot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether no protocol was recorded.
    pub fn is_empty(&self) -> bool {
        self.protocols.is_empty()
    }

    /// Get the bucket for `name`, creating it with `id` if needed.
    ///
    /// An existing bucket keeps the id it was created with.
    pub fn bucket(&mut self, name: &str, id: &str) -> &mut NormalizedProtocol {
        self.protocols
            .entry(name.to_string())
            .or_insert_with(|| NormalizedProtocol::new(name, id))
    }

    /// Sum of the protocol values.
    pub fn protocols_value(&self) -> f64 {
        self.protocols.values().map(|p| p.value).sum()
    }

    /// Total number of assets across all protocols.
    pub fn asset_count(&self) -> usize {
        self.protocols.values().map(|p| p.assets.len()).sum()
    }
}

/// Both providers' snapshots for one (address, chain) pair.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ComparisonRecord {
    /// Provider-A snapshot.
    pub debank: NormalizedChainSnapshot,
    /// Provider-B snapshot.
    pub zerion: NormalizedChainSnapshot,
}

impl ComparisonRecord {
    /// Replace the snapshot for the given provider.
    pub fn set_snapshot(&mut self, provider: Provider, snapshot: NormalizedChainSnapshot) {
        match provider {
            Provider::Debank => self.debank = snapshot,
            Provider::Zerion => self.zerion = snapshot,
        }
    }
}

/// The comparison dataset: address → canonical chain → record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComparisonDataset {
    records: BTreeMap<Address, BTreeMap<CanonicalChainKey, ComparisonRecord>>,
}

impl ComparisonDataset {
    /// Create an empty dataset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the record for (address, chain), replacing any previous one.
    pub fn insert(&mut self, address: &str, chain: &str, record: ComparisonRecord) {
        self.records
            .entry(address.to_string())
            .or_default()
            .insert(chain.to_string(), record);
    }

    /// Ensure an address has an entry even when no chain was recorded.
    pub fn ensure_address(&mut self, address: &str) {
        self.records.entry(address.to_string()).or_default();
    }

    /// Record for (address, chain).
    pub fn get(&self, address: &str, chain: &str) -> Option<&ComparisonRecord> {
        self.records.get(address)?.get(chain)
    }

    /// All chain records for an address.
    pub fn chains(&self, address: &str) -> Option<&BTreeMap<CanonicalChainKey, ComparisonRecord>> {
        self.records.get(address)
    }

    /// Addresses present in the dataset.
    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    /// Number of addresses.
    pub fn address_count(&self) -> usize {
        self.records.len()
    }

    /// Number of (address, chain) records.
    pub fn record_count(&self) -> usize {
        self.records.values().map(BTreeMap::len).sum()
    }
}
