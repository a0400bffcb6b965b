use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::info;

use crate::aggregate::{annotate_calendar, monthly_means, MonthlyMeans};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::figure::Figure;
use crate::loader::load_page_views;
use crate::outliers::{remove_outliers_between, FilteredPageViews, PercentileBounds};
use crate::render::{draw_bar_plot, draw_box_plot, draw_line_plot};

/// Row counts and thresholds from the load and filter stages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FilterSummary {
    pub raw_rows: usize,
    pub kept_rows: usize,
    pub removed_rows: usize,
    pub bounds: PercentileBounds,
}

impl From<&FilteredPageViews> for FilterSummary {
    fn from(filtered: &FilteredPageViews) -> Self {
        Self {
            raw_rows: filtered.raw_rows(),
            kept_rows: filtered.kept_rows(),
            removed_rows: filtered.removed_rows(),
            bounds: filtered.bounds(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub summary: FilterSummary,
    pub line: Figure,
    pub bar: Figure,
    pub boxes: Figure,
}

/// Loads the input and removes outliers; every renderer works from this result.
pub fn prepare(config: &PipelineConfig) -> Result<FilteredPageViews> {
    let raw = load_page_views(&config.input_path)?;
    let filtered = remove_outliers_between(&raw, config.lower_quantile, config.upper_quantile)?;
    Ok(filtered)
}

pub fn monthly_view(filtered: &FilteredPageViews) -> Result<MonthlyMeans> {
    Ok(monthly_means(filtered.frame())?)
}

pub fn long_form_view(filtered: &FilteredPageViews) -> Result<DataFrame> {
    Ok(annotate_calendar(filtered.frame())?)
}

pub fn run_line(config: &PipelineConfig, filtered: &FilteredPageViews) -> Result<Figure> {
    Ok(draw_line_plot(filtered.frame(), config.output_dir())?)
}

pub fn run_bar(config: &PipelineConfig, filtered: &FilteredPageViews) -> Result<Figure> {
    let means = monthly_view(filtered)?;
    Ok(draw_bar_plot(&means, config.output_dir())?)
}

pub fn run_box(config: &PipelineConfig, filtered: &FilteredPageViews) -> Result<Figure> {
    let long_form = long_form_view(filtered)?;
    Ok(draw_box_plot(&long_form, config.output_dir())?)
}

/// Runs load → filter → the three renderers once, in that order.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport> {
    let filtered = prepare(config)?;
    let summary = FilterSummary::from(&filtered);

    let line = run_line(config, &filtered)?;
    let bar = run_bar(config, &filtered)?;
    let boxes = run_box(config, &filtered)?;

    info!(
        output_dir = %config.output_dir().display(),
        kept_rows = summary.kept_rows,
        removed_rows = summary.removed_rows,
        "rendered all page view figures"
    );

    Ok(PipelineReport {
        summary,
        line,
        bar,
        boxes,
    })
}
