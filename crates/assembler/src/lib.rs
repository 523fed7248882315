//! Reconciliation assembly for the position reconciliation system.
//!
//! This crate provides:
//! - Raw payload sources (filesystem layout and in-memory)
//! - The reconciliation pass pairing both providers per (address, chain)
//! - Run statistics
//! - Atomic writing of the comparison dataset

pub mod assembler;
pub mod source;
pub mod stats;
pub mod writer;

pub use assembler::{Assembly, ReconciliationAssembler};
pub use source::{FsRawSource, MemorySource, RawSource, SourceLookup};
pub use stats::{AssemblyStats, ProviderStats};
pub use writer::{to_json_string, write_dataset};
