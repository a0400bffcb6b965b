use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::loader::{value_values, VALUE_COLUMN};
use crate::stats::percentile;

pub const LOWER_QUANTILE: f64 = 0.025;
pub const UPPER_QUANTILE: f64 = 0.975;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("polars operation failed: {0}")]
    Polars(#[from] PolarsError),
    #[error("cannot compute percentiles of an empty '{VALUE_COLUMN}' column")]
    EmptyData,
    #[error("quantiles must satisfy 0 <= lower <= upper <= 1, got {lower} and {upper}")]
    InvalidQuantiles { lower: f64, upper: f64 },
}

/// Closed interval `[lower, upper]` of values that survive filtering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentileBounds {
    pub lower: f64,
    pub upper: f64,
}

impl PercentileBounds {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// The outlier-free dataset together with the thresholds that produced it.
///
/// Bounds are taken from the unfiltered data once; the frame is never
/// re-filtered afterwards.
#[derive(Debug, Clone)]
pub struct FilteredPageViews {
    frame: DataFrame,
    bounds: PercentileBounds,
    raw_rows: usize,
}

impl FilteredPageViews {
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn bounds(&self) -> PercentileBounds {
        self.bounds
    }

    pub fn raw_rows(&self) -> usize {
        self.raw_rows
    }

    pub fn kept_rows(&self) -> usize {
        self.frame.height()
    }

    pub fn removed_rows(&self) -> usize {
        self.raw_rows - self.frame.height()
    }
}

pub fn percentile_bounds(
    df: &DataFrame,
    lower_quantile: f64,
    upper_quantile: f64,
) -> Result<PercentileBounds, FilterError> {
    let quantiles_valid = (0.0..=1.0).contains(&lower_quantile)
        && (0.0..=1.0).contains(&upper_quantile)
        && lower_quantile <= upper_quantile;
    if !quantiles_valid {
        return Err(FilterError::InvalidQuantiles {
            lower: lower_quantile,
            upper: upper_quantile,
        });
    }

    let values = value_values(df)?;
    let lower = percentile(&values, lower_quantile).ok_or(FilterError::EmptyData)?;
    let upper = percentile(&values, upper_quantile).ok_or(FilterError::EmptyData)?;
    Ok(PercentileBounds { lower, upper })
}

/// Drops every row outside the 2.5th..97.5th percentile band.
pub fn remove_outliers(df: &DataFrame) -> Result<FilteredPageViews, FilterError> {
    remove_outliers_between(df, LOWER_QUANTILE, UPPER_QUANTILE)
}

pub fn remove_outliers_between(
    df: &DataFrame,
    lower_quantile: f64,
    upper_quantile: f64,
) -> Result<FilteredPageViews, FilterError> {
    let bounds = percentile_bounds(df, lower_quantile, upper_quantile)?;

    let frame = df
        .clone()
        .lazy()
        .filter(
            col(VALUE_COLUMN)
                .gt_eq(lit(bounds.lower))
                .and(col(VALUE_COLUMN).lt_eq(lit(bounds.upper))),
        )
        .collect()?;

    info!(
        lower = bounds.lower,
        upper = bounds.upper,
        raw_rows = df.height(),
        kept_rows = frame.height(),
        "removed page view outliers"
    );

    Ok(FilteredPageViews {
        frame,
        bounds,
        raw_rows: df.height(),
    })
}
