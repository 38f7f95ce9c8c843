//! # Critters IO
//!
//! Persistence layer for the critters engine. The engine never touches
//! files; everything that reads or writes one lives here.
//!
//! This crate provides:
//! - Structured error handling with [`IoError`]
//! - JSON and HexDNA serialization
//! - Snapshot files, optionally gzip-compressed
//! - rkyv binary population archives

/// Error types and result aliases for I/O operations
pub mod error;
/// Snapshot files, population archives and genome export
pub mod persistence;
/// JSON and HexDNA helpers
pub mod serialization;

pub use error::{IoError, Result};
pub use persistence::{
    archive_population, export_genome, import_genome, load_rkyv, load_snapshot, restore_archive,
    save_rkyv, save_snapshot,
};
pub use serialization::{from_hex_dna, from_json, to_hex_dna, to_json};

