// crates/pageviews-core/src/error.rs

use thiserror::Error;

use crate::aggregate::AggregateError;
use crate::loader::LoadError;
use crate::outliers::FilterError;
use crate::render::RenderError;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Loading page views failed: {0}")]
    Load(#[from] LoadError),

    #[error("Outlier filtering failed: {0}")]
    Filter(#[from] FilterError),

    #[error("Aggregation failed: {0}")]
    Aggregate(#[from] AggregateError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
