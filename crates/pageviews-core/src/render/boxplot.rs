use std::collections::BTreeMap;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use polars::prelude::DataFrame;
use tracing::info;

use super::{
    category_label, draw_error, padded_range, RenderError, CAPTION_FONT_SIZE, DEFAULT_FONT,
    LABEL_FONT_SIZE,
};
use crate::aggregate::{MONTH_COLUMN, YEAR_COLUMN};
use crate::calendar::Month;
use crate::figure::{BoxCategory, Figure, FigureSize, Panel, PanelData};
use crate::loader::VALUE_COLUMN;
use crate::stats::BoxSummary;

pub const BOX_PLOT_FILE: &str = "box_plot.png";

const NAME: &str = "box_plot";
const SIZE: FigureSize = FigureSize::new(15.0, 6.0);
const YEAR_TITLE: &str = "Year-wise Box Plot (Trend)";
const MONTH_TITLE: &str = "Month-wise Box Plot (Seasonality)";
const YEAR_X_LABEL: &str = "Year";
const MONTH_X_LABEL: &str = "Month";
const Y_LABEL: &str = "Page Views";

const BOX_HALF_WIDTH: f64 = 0.35;
const CAP_HALF_WIDTH: f64 = 0.15;
const OUTLIER_RADIUS: u32 = 2;

const BOX_COLORS: [RGBColor; 6] = [
    RGBColor(59, 117, 175),
    RGBColor(239, 134, 54),
    RGBColor(81, 157, 62),
    RGBColor(197, 57, 50),
    RGBColor(141, 105, 184),
    RGBColor(132, 88, 78),
];

/// Describes the two box-plot panels for the long-form (`year`/`month`) frame:
/// years ascending on the left, Jan..Dec on the right.
pub fn box_figure(long_form: &DataFrame) -> Result<Figure, RenderError> {
    let years = long_form.column(YEAR_COLUMN)?.i32()?;
    let months = long_form.column(MONTH_COLUMN)?.str()?;
    let values = long_form.column(VALUE_COLUMN)?.f64()?;

    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    let mut by_month: Vec<Vec<f64>> = vec![Vec::new(); Month::ALL.len()];

    for idx in 0..long_form.height() {
        let Some(value) = values.get(idx) else {
            continue;
        };
        if let Some(year) = years.get(idx) {
            by_year.entry(year).or_default().push(value);
        }
        if let Some(month) = months.get(idx).and_then(|label| Month::try_from(label).ok()) {
            by_month[month.index()].push(value);
        }
    }

    if by_year.is_empty() {
        return Err(RenderError::EmptyData { figure: NAME });
    }

    let year_boxes = by_year
        .into_iter()
        .map(|(year, values)| BoxCategory {
            label: year.to_string(),
            summary: BoxSummary::from_values(&values),
        })
        .collect();

    let month_boxes = Month::ALL
        .iter()
        .map(|month| BoxCategory {
            label: month.abbreviation().to_string(),
            summary: BoxSummary::from_values(&by_month[month.index()]),
        })
        .collect();

    Ok(Figure {
        name: NAME,
        size: SIZE,
        panels: vec![
            Panel {
                title: Some(YEAR_TITLE.to_string()),
                x_label: YEAR_X_LABEL.to_string(),
                y_label: Y_LABEL.to_string(),
                legend: None,
                data: PanelData::Boxes(year_boxes),
            },
            Panel {
                title: Some(MONTH_TITLE.to_string()),
                x_label: MONTH_X_LABEL.to_string(),
                y_label: Y_LABEL.to_string(),
                legend: None,
                data: PanelData::Boxes(month_boxes),
            },
        ],
        path: None,
    })
}

/// Draws the year-wise and month-wise box plots side by side into
/// `output_dir/box_plot.png`.
pub fn draw_box_plot(long_form: &DataFrame, output_dir: &Path) -> Result<Figure, RenderError> {
    let mut figure = box_figure(long_form)?;
    let path = output_dir.join(BOX_PLOT_FILE);
    render(&figure, &path)?;
    info!(path = %path.display(), rows = long_form.height(), "saved box plot");
    figure.path = Some(path);
    Ok(figure)
}

fn render(figure: &Figure, path: &Path) -> Result<(), RenderError> {
    let root_area = BitMapBackend::new(path, figure.size.pixels()).into_drawing_area();
    root_area.fill(&WHITE).map_err(draw_error(NAME))?;

    let areas = root_area.split_evenly((1, figure.panels.len().max(1)));
    for (idx, (area, panel)) in areas.iter().zip(&figure.panels).enumerate() {
        let boxes = panel.boxes().ok_or(RenderError::UnexpectedPanel {
            figure: NAME,
            panel: idx,
            expected: "box",
        })?;
        draw_panel(area, panel, boxes)?;
    }

    root_area.present().map_err(draw_error(NAME))?;
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &Panel,
    boxes: &[BoxCategory],
) -> Result<(), RenderError> {
    let summaries = || boxes.iter().filter_map(|category| category.summary.as_ref());
    let min = summaries().map(|s| s.min).fold(f64::INFINITY, f64::min);
    let max = summaries().map(|s| s.max).fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return Err(RenderError::EmptyData { figure: NAME });
    }
    let labels: Vec<String> = boxes.iter().map(|category| category.label.clone()).collect();

    let mut cb = ChartBuilder::on(area);
    if let Some(title) = &panel.title {
        cb.caption(title, (DEFAULT_FONT, CAPTION_FONT_SIZE));
    }

    let mut chart = cb
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5..(boxes.len() as f64 - 0.5), padded_range(min, max, 0.05))
        .map_err(draw_error(NAME))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(boxes.len())
        .x_label_formatter(&|x: &f64| category_label(&labels, *x))
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .axis_desc_style((DEFAULT_FONT, LABEL_FONT_SIZE))
        .draw()
        .map_err(draw_error(NAME))?;

    let placed = || {
        boxes
            .iter()
            .enumerate()
            .filter_map(|(idx, category)| Some((idx, idx as f64, category.summary.as_ref()?)))
    };

    chart
        .draw_series(placed().map(|(idx, x, s)| {
            let color = BOX_COLORS[idx % BOX_COLORS.len()];
            Rectangle::new(
                [(x - BOX_HALF_WIDTH, s.q1), (x + BOX_HALF_WIDTH, s.q3)],
                color.filled(),
            )
        }))
        .map_err(draw_error(NAME))?;

    chart
        .draw_series(placed().map(|(_, x, s)| {
            Rectangle::new(
                [(x - BOX_HALF_WIDTH, s.q1), (x + BOX_HALF_WIDTH, s.q3)],
                BLACK.stroke_width(1),
            )
        }))
        .map_err(draw_error(NAME))?;

    chart
        .draw_series(placed().flat_map(|(_, x, s)| {
            [
                vec![(x, s.q1), (x, s.lower_whisker)],
                vec![(x, s.q3), (x, s.upper_whisker)],
                vec![(x - CAP_HALF_WIDTH, s.lower_whisker), (x + CAP_HALF_WIDTH, s.lower_whisker)],
                vec![(x - CAP_HALF_WIDTH, s.upper_whisker), (x + CAP_HALF_WIDTH, s.upper_whisker)],
            ]
            .into_iter()
            .map(|points| PathElement::new(points, BLACK.stroke_width(1)))
        }))
        .map_err(draw_error(NAME))?;

    chart
        .draw_series(placed().map(|(_, x, s)| {
            PathElement::new(
                vec![(x - BOX_HALF_WIDTH, s.median), (x + BOX_HALF_WIDTH, s.median)],
                BLACK.stroke_width(2),
            )
        }))
        .map_err(draw_error(NAME))?;

    chart
        .draw_series(placed().flat_map(|(_, x, s)| {
            s.outliers
                .iter()
                .map(move |&value| Circle::new((x, value), OUTLIER_RADIUS, BLACK.stroke_width(1)))
        }))
        .map_err(draw_error(NAME))?;

    Ok(())
}
