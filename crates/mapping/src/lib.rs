//! Static lookup tables for the position reconciliation system.
//!
//! This crate provides:
//! - Chain identity mapping (provider-native slugs and EVM chain ids → canonical key)
//! - Chain-scoped protocol alias resolution (provider-B name → provider-A name)
//!
//! Both tables are immutable once built and are passed explicitly to the
//! normalizers and the assembler.

pub mod alias;
pub mod chain;

pub use alias::ProtocolAliasResolver;
pub use chain::ChainIdentityMapper;
