//! sd_io: everything that touches the filesystem.
//!
//! - `source`: the Data Source Adapter (`DataSource` trait, CSV and XLSX readers,
//!   an in-memory source for fixtures)
//! - `encoding`: strict byte → text decoding (no replacement characters)
//! - `manifest`: the JSON configuration naming the five sources
//! - `schema`: embedded JSON Schema for the manifest
//! - `hasher`: SHA-256 of raw input bytes
//! - `canonical_json`: sorted-key JSON output with atomic writes
//!
//! Shared error type (`IoError`) lives here; every load-phase failure is fatal.

#![forbid(unsafe_code)]

use thiserror::Error;

pub mod canonical_json;
pub mod encoding;
pub mod hasher;
pub mod manifest;
pub mod schema;
pub mod source;

/// Unified error for sd_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// A source or manifest could not be opened or read.
    #[error("read error: {0}")]
    Read(String),

    /// Bytes are not valid in the declared encoding.
    #[error("{path}: not valid {encoding} text")]
    Encoding { path: String, encoding: &'static str },

    /// Delimited-text parse failure.
    #[error("csv error in {path}: {msg}")]
    Csv { path: String, msg: String },

    /// Workbook open / sheet lookup failure.
    #[error("spreadsheet error in {path}: {msg}")]
    Spreadsheet { path: String, msg: String },

    /// Manifest shape / policy violations.
    #[error("manifest: {0}")]
    Manifest(String),

    /// JSON Schema validation failures (manifest).
    #[error("schema error: {0}")]
    Schema(String),

    /// JSON (de)serialization errors with a JSON Pointer hint.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Declared input digest does not match the file.
    #[error("sha256 mismatch for {source_name}: expected {expected}, got {actual}")]
    Digest { source_name: String, expected: String, actual: String },

    /// Output path / write failures.
    #[error("io/path error: {0}")]
    Path(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json keeps line/column, not a pointer; default to root.
        IoError::Json { pointer: "/".to_string(), msg: e.to_string() }
    }
}

/// Returns true if `s` looks like a URL (any `<scheme>://`, including `file://`).
#[inline]
pub fn looks_like_url(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:")
}

pub mod prelude {
    pub use crate::{looks_like_url, IoError, IoResult};

    pub use crate::canonical_json::{to_canonical_json_bytes, write_canonical_file};
    pub use crate::hasher::{sha256_file, sha256_hex};
    pub use crate::manifest::{Manifest, ResolvedManifest, ResolvedSource, SourceFormat};
    pub use crate::source::{DataSource, FileSource, InMemorySource, SourceTable};
}
