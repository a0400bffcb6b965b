use std::fmt::Display;
use std::ops::Range;

use plotters::prelude::*;
use polars::prelude::PolarsError;
use thiserror::Error;

mod bar;
mod boxplot;
mod line;

pub use bar::{bar_figure, draw_bar_plot, BAR_PLOT_FILE};
pub use boxplot::{box_figure, draw_box_plot, BOX_PLOT_FILE};
pub use line::{draw_line_plot, line_figure, LINE_PLOT_FILE};

static DEFAULT_FONT: FontFamily = FontFamily::SansSerif;
const CAPTION_FONT_SIZE: u32 = 22;
const LABEL_FONT_SIZE: u32 = 16;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{figure}: no data to draw")]
    EmptyData { figure: &'static str },

    #[error("{figure}: drawing failed: {message}")]
    Draw {
        figure: &'static str,
        message: String,
    },

    #[error("{figure}: panel {panel} does not hold {expected} data")]
    UnexpectedPanel {
        figure: &'static str,
        panel: usize,
        expected: &'static str,
    },

    #[error("polars operation failed: {0}")]
    Polars(#[from] PolarsError),
}

fn draw_error<E: Display>(figure: &'static str) -> impl Fn(E) -> RenderError {
    move |err| RenderError::Draw {
        figure,
        message: err.to_string(),
    }
}

/// Pads a value range by `fraction` of its span on both sides, keeping
/// degenerate ranges drawable.
fn padded_range(min: f64, max: f64, fraction: f64) -> Range<f64> {
    let span = max - min;
    if span <= f64::EPSILON {
        let pad = if min.abs() > f64::EPSILON { min.abs() * 0.1 } else { 1.0 };
        return (min - pad)..(max + pad);
    }
    (min - span * fraction)..(max + span * fraction)
}

/// Labels integer category positions `0..labels.len()`; anything between
/// categories gets an empty label.
fn category_label(labels: &[String], x: f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    labels.get(rounded as usize).cloned().unwrap_or_default()
}
