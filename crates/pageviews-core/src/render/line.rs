use std::path::Path;

use chrono::{Duration, NaiveDate};
use plotters::prelude::*;
use polars::prelude::DataFrame;
use tracing::info;

use super::{
    draw_error, padded_range, RenderError, CAPTION_FONT_SIZE, DEFAULT_FONT, LABEL_FONT_SIZE,
};
use crate::figure::{Figure, FigureSize, LineTrace, Panel, PanelData, Rgb};
use crate::loader::{date_values, value_values};

pub const LINE_PLOT_FILE: &str = "line_plot.png";

const NAME: &str = "line_plot";
const SIZE: FigureSize = FigureSize::new(10.0, 5.0);
const TITLE: &str = "Daily freeCodeCamp Forum Page Views 5/2016-12/2019";
const X_LABEL: &str = "Date";
const Y_LABEL: &str = "Page Views";
const LINE_COLOR: Rgb = Rgb(255, 0, 0);
const LINE_WIDTH: u32 = 1;

/// Describes the daily line chart for the filtered frame without drawing it.
pub fn line_figure(filtered: &DataFrame) -> Result<Figure, RenderError> {
    let dates = date_values(filtered)?;
    let values = value_values(filtered)?;
    if dates.is_empty() {
        return Err(RenderError::EmptyData { figure: NAME });
    }

    Ok(Figure {
        name: NAME,
        size: SIZE,
        panels: vec![Panel {
            title: Some(TITLE.to_string()),
            x_label: X_LABEL.to_string(),
            y_label: Y_LABEL.to_string(),
            legend: None,
            data: PanelData::Line(LineTrace {
                points: dates.into_iter().zip(values).collect(),
                color: LINE_COLOR,
                stroke_width: LINE_WIDTH,
            }),
        }],
        path: None,
    })
}

/// Draws the daily page-view line chart into `output_dir/line_plot.png`.
pub fn draw_line_plot(filtered: &DataFrame, output_dir: &Path) -> Result<Figure, RenderError> {
    let mut figure = line_figure(filtered)?;
    let path = output_dir.join(LINE_PLOT_FILE);
    render(&figure, &path)?;
    info!(path = %path.display(), points = filtered.height(), "saved line plot");
    figure.path = Some(path);
    Ok(figure)
}

fn render(figure: &Figure, path: &Path) -> Result<(), RenderError> {
    let panel = &figure.panels[0];
    let trace = panel.line().ok_or(RenderError::UnexpectedPanel {
        figure: NAME,
        panel: 0,
        expected: "line",
    })?;
    let (Some(&(first, _)), Some(&(last, _))) = (trace.points.first(), trace.points.last())
    else {
        return Err(RenderError::EmptyData { figure: NAME });
    };
    let last = if last > first { last } else { first + Duration::days(1) };

    let (min, max) = trace
        .points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, v)| {
            (lo.min(v), hi.max(v))
        });

    let root_area = BitMapBackend::new(path, figure.size.pixels()).into_drawing_area();
    root_area.fill(&WHITE).map_err(draw_error(NAME))?;

    let mut cb = ChartBuilder::on(&root_area);
    if let Some(title) = &panel.title {
        cb.caption(title, (DEFAULT_FONT, CAPTION_FONT_SIZE));
    }

    let mut chart = cb
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(first..last, padded_range(min, max, 0.05))
        .map_err(draw_error(NAME))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .axis_desc_style((DEFAULT_FONT, LABEL_FONT_SIZE))
        .x_label_formatter(&|date: &NaiveDate| date.format("%Y-%m").to_string())
        .draw()
        .map_err(draw_error(NAME))?;

    let Rgb(r, g, b) = trace.color;
    chart
        .draw_series(LineSeries::new(
            trace.points.iter().copied(),
            RGBColor(r, g, b).stroke_width(trace.stroke_width),
        ))
        .map_err(draw_error(NAME))?;

    root_area.present().map_err(draw_error(NAME))?;
    Ok(())
}
