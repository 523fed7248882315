//! Raw payload sources.
//!
//! A source exposes the already-fetched provider documents, one per
//! (address, provider, native chain slug). How they got there is not its
//! concern.

use recon_core::{Error, Provider, Result};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::PathBuf;

/// Extension of raw payload files.
const PAYLOAD_EXTENSION: &str = "json";

/// Outcome of looking up one raw payload.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceLookup {
    /// No payload exists for the key.
    Missing,
    /// A payload exists but could not be read or parsed.
    Malformed(String),
    /// The parsed payload.
    Found(Value),
}

/// Read-only access to raw provider payloads.
pub trait RawSource {
    /// Addresses with any raw data available.
    fn addresses(&self) -> Result<Vec<String>>;

    /// Whether the address has any data at all for the provider.
    fn has_provider(&self, address: &str, provider: Provider) -> bool;

    /// Native chain slugs with a payload for (address, provider).
    fn native_chains(&self, address: &str, provider: Provider) -> Vec<String>;

    /// Look up one payload.
    fn load(&self, address: &str, provider: Provider, native_chain: &str) -> SourceLookup;
}

/// Filesystem source with the layout `<root>/<address>/<provider>/<chain>.json`.
#[derive(Debug, Clone)]
pub struct FsRawSource {
    root: PathBuf,
}

impl FsRawSource {
    /// Create a source rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn provider_dir(&self, address: &str, provider: Provider) -> PathBuf {
        self.root.join(address).join(provider.as_str())
    }

    /// Path of the payload for (address, provider, chain).
    pub fn payload_path(&self, address: &str, provider: Provider, native_chain: &str) -> PathBuf {
        self.provider_dir(address, provider)
            .join(format!("{native_chain}.{PAYLOAD_EXTENSION}"))
    }
}

impl RawSource for FsRawSource {
    fn addresses(&self) -> Result<Vec<String>> {
        if !self.root.is_dir() {
            return Err(Error::data(format!(
                "input root {} is not a directory",
                self.root.display()
            )));
        }

        let mut addresses = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                addresses.push(name.to_string());
            }
        }
        addresses.sort();
        Ok(addresses)
    }

    fn has_provider(&self, address: &str, provider: Provider) -> bool {
        self.provider_dir(address, provider).is_dir()
    }

    fn native_chains(&self, address: &str, provider: Provider) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.provider_dir(address, provider)) else {
            return Vec::new();
        };

        let mut chains: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path.extension().and_then(|e| e.to_str()) == Some(PAYLOAD_EXTENSION)
            })
            .filter_map(|path| path.file_stem()?.to_str().map(str::to_string))
            .collect();
        chains.sort();
        chains
    }

    fn load(&self, address: &str, provider: Provider, native_chain: &str) -> SourceLookup {
        let path = self.payload_path(address, provider, native_chain);
        if !path.is_file() {
            return SourceLookup::Missing;
        }

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => return SourceLookup::Malformed(format!("{}: {e}", path.display())),
        };
        match serde_json::from_str(&text) {
            Ok(value) => SourceLookup::Found(value),
            Err(e) => SourceLookup::Malformed(format!("{}: {e}", path.display())),
        }
    }
}

/// In-memory source.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    addresses: BTreeSet<String>,
    providers: BTreeSet<(String, Provider)>,
    payloads: BTreeMap<(String, Provider, String), SourceLookup>,
}

impl MemorySource {
    /// Create an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an address without any provider data.
    pub fn add_address(&mut self, address: &str) {
        self.addresses.insert(address.to_string());
    }

    /// Register a parsed payload.
    pub fn insert(&mut self, address: &str, provider: Provider, native_chain: &str, payload: Value) {
        self.put(address, provider, native_chain, SourceLookup::Found(payload));
    }

    /// Register a payload that failed to parse.
    pub fn insert_malformed(
        &mut self,
        address: &str,
        provider: Provider,
        native_chain: &str,
        reason: &str,
    ) {
        self.put(
            address,
            provider,
            native_chain,
            SourceLookup::Malformed(reason.to_string()),
        );
    }

    fn put(&mut self, address: &str, provider: Provider, native_chain: &str, lookup: SourceLookup) {
        self.add_address(address);
        self.providers.insert((address.to_string(), provider));
        self.payloads.insert(
            (address.to_string(), provider, native_chain.to_string()),
            lookup,
        );
    }
}

impl RawSource for MemorySource {
    fn addresses(&self) -> Result<Vec<String>> {
        Ok(self.addresses.iter().cloned().collect())
    }

    fn has_provider(&self, address: &str, provider: Provider) -> bool {
        self.providers.contains(&(address.to_string(), provider))
    }

    fn native_chains(&self, address: &str, provider: Provider) -> Vec<String> {
        self.payloads
            .keys()
            .filter(|(a, p, _)| a == address && *p == provider)
            .map(|(_, _, chain)| chain.clone())
            .collect()
    }

    fn load(&self, address: &str, provider: Provider, native_chain: &str) -> SourceLookup {
        self.payloads
            .get(&(address.to_string(), provider, native_chain.to_string()))
            .cloned()
            .unwrap_or(SourceLookup::Missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn write(root: &Path, rel: &str, contents: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_fs_layout() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "0xAbC/debank/eth.json", "[]");
        write(dir.path(), "0xAbC/debank/notes.txt", "ignored");
        write(dir.path(), "0xAbC/zerion/ethereum.json", r#"{"data": []}"#);
        write(dir.path(), "0xdef/debank/bsc.json", "[]");
        write(dir.path(), "README.md", "not an address");

        let source = FsRawSource::new(dir.path());
        assert_eq!(source.addresses().unwrap(), vec!["0xAbC", "0xdef"]);
        assert!(source.has_provider("0xAbC", Provider::Zerion));
        assert!(!source.has_provider("0xdef", Provider::Zerion));
        assert_eq!(source.native_chains("0xAbC", Provider::Debank), vec!["eth"]);
        assert!(source.native_chains("0xdef", Provider::Zerion).is_empty());

        assert_eq!(
            source.load("0xAbC", Provider::Zerion, "ethereum"),
            SourceLookup::Found(json!({"data": []}))
        );
        assert_eq!(source.load("0xAbC", Provider::Zerion, "base"), SourceLookup::Missing);
    }

    #[test]
    fn test_fs_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "0xabc/debank/eth.json", "{not json");

        let source = FsRawSource::new(dir.path());
        assert!(matches!(
            source.load("0xabc", Provider::Debank, "eth"),
            SourceLookup::Malformed(_)
        ));
    }

    #[test]
    fn test_fs_missing_root_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsRawSource::new(dir.path().join("absent"));
        assert!(source.addresses().is_err());
    }

    #[test]
    fn test_memory_source() {
        let mut source = MemorySource::new();
        source.insert("0xa", Provider::Debank, "eth", json!([]));
        source.insert_malformed("0xa", Provider::Zerion, "ethereum", "bad");
        source.add_address("0xb");

        assert_eq!(source.addresses().unwrap(), vec!["0xa", "0xb"]);
        assert!(source.has_provider("0xa", Provider::Zerion));
        assert!(!source.has_provider("0xb", Provider::Debank));
        assert_eq!(source.native_chains("0xa", Provider::Debank), vec!["eth"]);
        assert_eq!(
            source.load("0xa", Provider::Zerion, "ethereum"),
            SourceLookup::Malformed("bad".to_string())
        );
        assert_eq!(source.load("0xb", Provider::Debank, "eth"), SourceLookup::Missing);
    }
}
