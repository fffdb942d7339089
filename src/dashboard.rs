//! The view pipeline shared by both datasets:
//! filter → region merge → rank → trend.

use crate::auth::AuthContext;
use crate::boundary::{BoundaryCache, BoundaryProvider, GeoJsonFileProvider};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::filter::{filter_by_label, unit_for};
use crate::loader::{DatasetCache, DatasetSnapshot};
use crate::ranking::{rank_top_n, Palette};
use crate::time::{TimePoint, TimeRange};
use crate::trend::assemble_trend;
use crate::types::{DatasetId, RankedEntitySet, TrendSeries};
use crate::util::{axis_unit_label, resolve_display_label};
use serde::Serialize;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct ViewRequest {
    pub dataset: DatasetId,
    pub chapter: Option<String>,
    /// Indicator display label (`name --- number`) or a bare name.
    pub indicator_label: String,
    pub panel: TimePoint,
    pub range: TimeRange,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub dataset: DatasetId,
    pub indicator_label: String,
    pub indicator_name: String,
    pub unit: Option<String>,
    pub axis_label: String,
    /// Parent region that absorbed its subordinate's values, when a merge
    /// rule ran for this indicator.
    pub merged_region: Option<String>,
    pub range: TimeRange,
    pub ranked: RankedEntitySet,
    pub trend: TrendSeries,
}

impl DashboardView {
    pub fn has_data(&self) -> bool {
        !self.ranked.is_empty()
    }
}

pub struct Dashboard {
    config: DashboardConfig,
    palette: Palette,
    datasets: DatasetCache,
    boundaries: BoundaryCache,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Self {
        let provider = config
            .boundary_path
            .clone()
            .map(|p| Box::new(GeoJsonFileProvider::new(p)) as Box<dyn BoundaryProvider>);
        Self::with_boundary_provider(config, provider)
    }

    pub fn with_boundary_provider(
        config: DashboardConfig,
        provider: Option<Box<dyn BoundaryProvider>>,
    ) -> Self {
        Dashboard {
            palette: Palette::new(config.palette.clone()),
            config,
            datasets: DatasetCache::new(),
            boundaries: BoundaryCache::new(provider),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn boundaries(&self) -> &BoundaryCache {
        &self.boundaries
    }

    /// Cached snapshot of a dataset; empty when it could not be loaded.
    pub fn dataset(&mut self, id: DatasetId) -> Rc<DatasetSnapshot> {
        let path = self.config.dataset_path(id);
        self.datasets.get_or_load(id, &path)
    }

    /// Build both views for one selection. Nothing is carried over from
    /// earlier calls apart from the cached dataset snapshot.
    pub fn view(&mut self, auth: &AuthContext, req: &ViewRequest) -> Result<DashboardView> {
        auth.require()?;
        let snapshot = self.dataset(req.dataset);
        if snapshot.is_empty() {
            return Err(DashboardError::NoData(req.dataset.to_string()));
        }
        Ok(build_view(&snapshot, &self.config, &self.palette, req))
    }
}

/// Pure part of [`Dashboard::view`].
pub fn build_view(
    snapshot: &DatasetSnapshot,
    config: &DashboardConfig,
    palette: &Palette,
    req: &ViewRequest,
) -> DashboardView {
    let profile = config.profile(req.dataset);
    let rows = filter_by_label(&snapshot.observations, &req.indicator_label, req.chapter.as_deref());
    let unit = unit_for(&rows);

    let (rows, merged_region) = match &profile.region_merge {
        Some(rule) if rule.applies_to(unit.as_deref()) => {
            (rule.apply(rows, unit.as_deref()), Some(rule.parent.clone()))
        }
        _ => (rows, None),
    };

    let ranked = rank_top_n(&rows, req.panel, profile.rank_depth, palette);
    let trend = assemble_trend(&rows, &ranked, &req.range);
    tracing::debug!(
        dataset = %req.dataset,
        indicator = %req.indicator_label,
        panel = %req.panel,
        ranked = ranked.len(),
        series = trend.series.len(),
        "Built dashboard view"
    );

    DashboardView {
        dataset: req.dataset,
        indicator_label: req.indicator_label.clone(),
        indicator_name: resolve_display_label(&req.indicator_label).to_string(),
        axis_label: axis_unit_label(unit.as_deref()),
        unit,
        merged_region,
        range: req.range,
        ranked,
        trend,
    }
}
