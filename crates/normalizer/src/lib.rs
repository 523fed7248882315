//! Position normalization for the position reconciliation system.
//!
//! This crate handles:
//! - Classifying raw provider payloads (absent, empty, malformed, records)
//! - Lenient decoding of third-party records
//! - Provider-A (protocol-grouped) normalization
//! - Provider-B (flat position list) normalization
//!
//! Both normalizers implement [`Normalizer`] and produce a
//! [`recon_core::NormalizedChainSnapshot`].

mod lenient;

pub mod debank;
pub mod normalizer;
pub mod payload;
pub mod zerion;

pub use debank::{normalize_provider_a, DebankNormalizer};
pub use normalizer::{NormalizeContext, Normalizer};
pub use payload::PayloadShape;
pub use zerion::{normalize_provider_b, ZerionNormalizer};
