use std::path::{Path, PathBuf};

use crate::outliers::{LOWER_QUANTILE, UPPER_QUANTILE};

pub const DEFAULT_INPUT_PATH: &str = "fcc-forum-pageviews.csv";

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub lower_quantile: f64,
    pub upper_quantile: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_dir: PathBuf::from("."),
            lower_quantile: LOWER_QUANTILE,
            upper_quantile: UPPER_QUANTILE,
        }
    }
}

impl PipelineConfig {
    pub fn new(input_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_path: input_path.into(),
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
