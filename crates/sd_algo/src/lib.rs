// crates/sd_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Algorithm layer. Pure functions over `sd_core` types; no I/O, no logging.
//!
//! Leaf-first:
//! - `normalize`: header repair, required columns, keep-first dedup
//! - `dates`: invoice date → year / quarter / year-month
//! - `extract`: normalized tables → typed facts and dimension rows
//! - `join`: the four named left-join stages
//! - `filter`: facets and the year × quarter × territory predicate
//! - `aggregate`: KPIs, monthly series, rankings, shares, state rollup

pub mod aggregate;
pub mod dates;
pub mod extract;
pub mod filter;
pub mod join;
pub mod normalize;

pub use aggregate::{
    build_view, kpi_margin, kpi_summary, monthly_profit_margin, monthly_revenue, state_rollup,
    state_margin, territory_share, top_customers, top_products, top_salespeople, transaction_preview,
    AggregateView, KpiSummary, MaybeRatio, MonthlyMargin, MonthlyRevenue, PreviewRow, RankedRow, StateRow,
    TerritoryShare,
};
pub use dates::derive_period;
pub use extract::Dimensions;
pub use filter::{apply_filter, facets};
pub use join::{enrich, DimIndex, JoinError, JoinStage};
pub use normalize::{dedup_on_key, normalize_table, promote_header, require_columns};
