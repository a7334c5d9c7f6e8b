//! The immutable, process-lifetime data context.

use std::path::Path;

use tracing::{debug, info};

use sd_algo::{apply_filter, enrich, facets};
use sd_core::{AggregateLimits, DataQualityReport, EnrichedFact, Facets, FilterSelection};
use sd_io::manifest::{load_and_resolve_manifest, Manifest, ResolvedManifest};
use sd_io::source::{DataSource, FileSource};

use crate::load::{load_tables, InputEcho};
use crate::PipelineError;

/// The enriched table plus everything known about how it was built.
///
/// Built once, then shared by reference; selections never mutate it.
#[derive(Debug, Clone)]
pub struct DataContext {
    rows: Vec<EnrichedFact>,
    facets: Facets,
    quality: DataQualityReport,
    inputs: Vec<InputEcho>,
    manifest_id: Option<String>,
    limits: AggregateLimits,
}

impl DataContext {
    /// Load, normalize, derive and join everything `source` provides.
    pub fn build(
        source: &dyn DataSource,
        limits: AggregateLimits,
        manifest_id: Option<String>,
    ) -> Result<Self, PipelineError> {
        let loaded = load_tables(source)?;
        let mut quality = loaded.quality;

        let (rows, stages) = enrich(loaded.facts, &loaded.dims)?;
        for s in &stages {
            debug!(
                stage = %s.stage,
                rows_in = s.rows_in,
                matched = s.matched,
                unmatched = s.unmatched,
                "join stage"
            );
        }
        quality.join_stages = stages;

        let facets = facets(&rows);
        info!(
            rows = rows.len(),
            years = facets.years.len(),
            territories = facets.territories.len(),
            "data context ready"
        );
        Ok(Self { rows, facets, quality, inputs: loaded.inputs, manifest_id, limits })
    }

    /// Build from already-resolved file sources.
    pub fn from_resolved(resolved: ResolvedManifest) -> Result<Self, PipelineError> {
        let limits = resolved.limits;
        let id = resolved.id.clone();
        Self::build(&FileSource::new(resolved), limits, id)
    }

    /// Build from a manifest file; source paths resolve against its directory.
    pub fn from_manifest_path(path: &Path) -> Result<Self, PipelineError> {
        Self::from_resolved(load_and_resolve_manifest(path)?)
    }

    /// Build from a directory holding the conventionally named sources.
    pub fn from_directory(dir: &Path) -> Result<Self, PipelineError> {
        Self::from_resolved(Manifest::for_directory(dir)?)
    }

    pub fn rows(&self) -> &[EnrichedFact] {
        &self.rows
    }

    pub fn facets(&self) -> &Facets {
        &self.facets
    }

    pub fn quality(&self) -> &DataQualityReport {
        &self.quality
    }

    pub fn inputs(&self) -> &[InputEcho] {
        &self.inputs
    }

    pub fn manifest_id(&self) -> Option<&str> {
        self.manifest_id.as_deref()
    }

    pub fn limits(&self) -> AggregateLimits {
        self.limits
    }

    /// Everything observed.
    pub fn default_selection(&self) -> FilterSelection {
        FilterSelection::full(&self.facets)
    }

    /// Start from the default selection and narrow each field that was given.
    /// `None` keeps the full facet; `Some(empty)` selects nothing.
    pub fn selection(
        &self,
        years: Option<Vec<i32>>,
        quarters: Option<Vec<sd_core::Quarter>>,
        territories: Option<Vec<String>>,
    ) -> FilterSelection {
        let mut sel = self.default_selection();
        if let Some(y) = years {
            sel = sel.with_years(y);
        }
        if let Some(q) = quarters {
            sel = sel.with_quarters(q);
        }
        if let Some(t) = territories {
            sel = sel.with_territories(t);
        }
        sel
    }

    /// The rows of the enriched table that satisfy `sel`, in source order.
    pub fn filter(&self, sel: &FilterSelection) -> Vec<&EnrichedFact> {
        apply_filter(&self.rows, sel, &self.facets)
    }
}
