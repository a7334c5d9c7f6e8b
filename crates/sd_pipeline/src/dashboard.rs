//! Per-selection dashboard build: filter → aggregate, plus the run echo.

use tracing::info;

use sd_algo::{build_view, AggregateView};
use sd_core::{AggregateLimits, DataQualityReport, Facets, FilterSelection};

use crate::context::DataContext;
use crate::load::InputEcho;
use crate::EngineMeta;

/// One rendered-ready dashboard: the aggregates plus what produced them.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub engine: EngineMeta,
    pub manifest_id: Option<String>,
    pub inputs: Vec<InputEcho>,
    pub facets: Facets,
    pub selection: FilterSelection,
    pub quality: DataQualityReport,
    pub limits: AggregateLimits,
    /// Rows in the filtered view.
    pub view_rows: usize,
    pub view: AggregateView,
}

/// Filter the context with `sel` and aggregate the result.
pub fn build_dashboard(ctx: &DataContext, sel: &FilterSelection, limits: &AggregateLimits) -> DashboardView {
    let rows = ctx.filter(sel);
    info!(selected = rows.len(), total = ctx.rows().len(), "selection applied");
    let view = build_view(&rows, limits);

    DashboardView {
        engine: EngineMeta::current(),
        manifest_id: ctx.manifest_id().map(str::to_string),
        inputs: ctx.inputs().to_vec(),
        facets: ctx.facets().clone(),
        selection: sel.clone(),
        quality: ctx.quality().clone(),
        limits: *limits,
        view_rows: rows.len(),
        view,
    }
}
