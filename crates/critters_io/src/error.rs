//! Error types for critters_io crate.
//!
//! Covers snapshot files, HexDNA genomes and rkyv population archives, plus
//! engine errors raised while rehydrating what they hold.

use critters_core::CoreError;
use thiserror::Error;

/// Main error type for critters_io operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// Input that should carry a document was blank
    #[error("Empty {0}")]
    Empty(&'static str),

    /// Snapshot or genome JSON that does not parse or does not fit the record
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// HexDNA that is not base16 or does not decode to UTF-8
    #[error("Malformed HexDNA: {0}")]
    HexDna(String),

    /// Population archive that fails validation or deserialization
    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("File system error: {0}")]
    FileSystem(#[from] std::io::Error),

    #[error("No snapshot at {0}")]
    NotFound(String),

    /// A stored genome or population the engine refused
    #[error("Engine error: {0}")]
    Core(#[from] CoreError),

    #[error("{context}: {source}")]
    Context {
        context: String,
        source: Box<IoError>,
    },
}

/// Result type alias for critters_io operations.
pub type Result<T> = std::result::Result<T, IoError>;

impl IoError {
    #[must_use]
    pub fn hex_dna<S: Into<String>>(msg: S) -> Self {
        Self::HexDna(msg.into())
    }

    #[must_use]
    pub fn archive<S: Into<String>>(msg: S) -> Self {
        Self::Archive(msg.into())
    }

    #[must_use]
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound(resource.into())
    }

    #[must_use]
    pub fn compression<S: Into<String>>(msg: S) -> Self {
        Self::Compression(msg.into())
    }

    /// Wraps an error with additional context.
    #[must_use]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through any context wrappers.
    #[must_use]
    pub fn root(&self) -> &IoError {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }
}
