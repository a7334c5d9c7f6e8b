//! sd_core: Core types for the sales dashboard engine.
//!
//! This crate is **I/O-free**. It defines the stable vocabulary shared by
//! `sd_io`, `sd_algo`, `sd_pipeline`, `sd_report` and `sd_cli`:
//!
//! - Table identities and the column names each source must carry
//! - Surrogate keys with explicit "parse or absent" coercion
//! - Integer-cent `Money` (exact sums, no floats)
//! - Calendar periods (`Quarter`, `YearMonth`, `Period`)
//! - Exact `Ratio`s and one-decimal percent rendering
//! - Fact / dimension / enriched records, filter selections, facets
//! - The data-quality ledger filled during load
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod columns;
pub mod determinism;
pub mod errors;
pub mod keys;
pub mod money;
pub mod period;
pub mod quality;
pub mod records;
pub mod rounding;
pub mod table;

pub use errors::{CoreError, DivisionUndefined, InvalidDateError, SchemaError};
pub use keys::{coerce_key, KeyCoercion, SurrogateKey};
pub use money::Money;
pub use period::{Period, Quarter, YearMonth};
pub use quality::{DataQualityReport, JoinStageReport, KeyCoercionWarning};
pub use records::{
    AggregateLimits, CityRow, CustomerRow, EmployeeRow, EnrichedFact, Facets, FilterSelection,
    SalesFact, StockItemRow,
};
pub use rounding::Ratio;
pub use table::{RawTable, TableName};
