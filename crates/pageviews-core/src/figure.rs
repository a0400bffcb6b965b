use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Serialize;

use crate::stats::BoxSummary;

/// Figure size in inches; rendered at [`FigureSize::DPI`] pixels per inch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FigureSize {
    pub width: f64,
    pub height: f64,
}

impl FigureSize {
    pub const DPI: f64 = 100.0;

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn pixels(&self) -> (u32, u32) {
        (
            (self.width * Self::DPI).round() as u32,
            (self.height * Self::DPI).round() as u32,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Inspectable description of a rendered chart: what was drawn and where it
/// was saved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub name: &'static str,
    pub size: FigureSize,
    pub panels: Vec<Panel>,
    pub path: Option<PathBuf>,
}

impl Figure {
    pub fn panel(&self, idx: usize) -> Option<&Panel> {
        self.panels.get(idx)
    }

    /// Titles of every panel, in panel order.
    pub fn titles(&self) -> Vec<&str> {
        self.panels
            .iter()
            .filter_map(|panel| panel.title.as_deref())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: Option<String>,
    pub x_label: String,
    pub y_label: String,
    pub legend: Option<Legend>,
    pub data: PanelData,
}

impl Panel {
    pub fn line(&self) -> Option<&LineTrace> {
        match &self.data {
            PanelData::Line(trace) => Some(trace),
            _ => None,
        }
    }

    pub fn bar_groups(&self) -> Option<&[BarGroup]> {
        match &self.data {
            PanelData::GroupedBars(groups) => Some(groups),
            _ => None,
        }
    }

    pub fn boxes(&self) -> Option<&[BoxCategory]> {
        match &self.data {
            PanelData::Boxes(boxes) => Some(boxes),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Legend {
    pub title: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum PanelData {
    Line(LineTrace),
    GroupedBars(Vec<BarGroup>),
    Boxes(Vec<BoxCategory>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineTrace {
    pub points: Vec<(NaiveDate, f64)>,
    pub color: Rgb,
    pub stroke_width: u32,
}

/// One x-axis group (a year) with a bar slot per legend entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarGroup {
    pub label: String,
    pub bars: Vec<Bar>,
}

/// A bar slot; `value` is `None` when there is no data for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: Option<f64>,
}

/// One x-axis category of a box plot; categories without data keep their slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxCategory {
    pub label: String,
    pub summary: Option<BoxSummary>,
}
