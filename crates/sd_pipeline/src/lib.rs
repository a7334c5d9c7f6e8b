//! sd_pipeline: orchestration surface (load → normalize → derive → join → context,
//! then filter → aggregate per selection).
//! File access is delegated to `sd_io`; every transformation lives in `sd_algo`.
//! The enriched table is built once into an immutable `DataContext`; each
//! selection re-runs only filter and aggregation against it.

#![forbid(unsafe_code)]

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod context;
pub mod dashboard;
pub mod load;

pub use context::DataContext;
pub use dashboard::{build_dashboard, DashboardView};
pub use load::{load_tables, InputEcho, LoadedTables};

/// Engine identifiers echoed in every dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMeta {
    pub name: String,
    pub version: String,
}

impl EngineMeta {
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Single error surface for orchestration.
#[derive(Debug)]
pub enum PipelineError {
    /// Load-phase failure from the source adapter (read, decode, parse, digest).
    Io(sd_io::IoError),
    /// A source table is structurally unusable.
    Schema(sd_core::SchemaError),
    /// A join stage broke the row-count invariant.
    Join(sd_algo::JoinError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Io(e) => write!(f, "load: {e}"),
            PipelineError::Schema(e) => write!(f, "schema: {e}"),
            PipelineError::Join(e) => write!(f, "join: {e}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Io(e) => Some(e),
            PipelineError::Schema(e) => Some(e),
            PipelineError::Join(e) => Some(e),
        }
    }
}

impl From<sd_io::IoError> for PipelineError {
    fn from(e: sd_io::IoError) -> Self {
        PipelineError::Io(e)
    }
}

impl From<sd_core::SchemaError> for PipelineError {
    fn from(e: sd_core::SchemaError) -> Self {
        PipelineError::Schema(e)
    }
}

impl From<sd_algo::JoinError> for PipelineError {
    fn from(e: sd_algo::JoinError) -> Self {
        PipelineError::Join(e)
    }
}
