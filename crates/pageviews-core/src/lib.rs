pub mod aggregate;
pub mod calendar;
pub mod config;
pub mod error;
pub mod figure;
pub mod loader;
pub mod outliers;
pub mod pipeline;
pub mod render;
pub mod stats;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use figure::{Figure, Panel, PanelData};
pub use pipeline::{run_pipeline, PipelineReport};
