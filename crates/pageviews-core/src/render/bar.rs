use std::path::Path;

use plotters::prelude::*;
use tracing::info;

use super::{
    category_label, draw_error, RenderError, CAPTION_FONT_SIZE, DEFAULT_FONT, LABEL_FONT_SIZE,
};
use crate::aggregate::MonthlyMeans;
use crate::calendar::Month;
use crate::figure::{Bar, BarGroup, Figure, FigureSize, Legend, Panel, PanelData};

pub const BAR_PLOT_FILE: &str = "bar_plot.png";

const NAME: &str = "bar_plot";
const SIZE: FigureSize = FigureSize::new(10.0, 6.0);
const X_LABEL: &str = "Years";
const Y_LABEL: &str = "Average Page Views";
const LEGEND_TITLE: &str = "Months";

/// Share of a category slot covered by its bars.
const GROUP_WIDTH: f64 = 0.8;

static MONTH_COLORS: [RGBColor; 12] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
    RGBColor(57, 59, 121),
    RGBColor(173, 73, 74),
];

/// Describes the grouped bar chart: one group per year, one bar slot per month
/// in calendar order.
pub fn bar_figure(means: &MonthlyMeans) -> Result<Figure, RenderError> {
    if means.is_empty() {
        return Err(RenderError::EmptyData { figure: NAME });
    }

    let groups = means
        .rows()
        .map(|(year, row)| BarGroup {
            label: year.to_string(),
            bars: Month::ALL
                .iter()
                .map(|month| Bar {
                    label: month.full_name().to_string(),
                    value: row[month.index()],
                })
                .collect(),
        })
        .collect();

    Ok(Figure {
        name: NAME,
        size: SIZE,
        panels: vec![Panel {
            title: None,
            x_label: X_LABEL.to_string(),
            y_label: Y_LABEL.to_string(),
            legend: Some(Legend {
                title: LEGEND_TITLE.to_string(),
                labels: Month::ALL
                    .iter()
                    .map(|month| month.full_name().to_string())
                    .collect(),
            }),
            data: PanelData::GroupedBars(groups),
        }],
        path: None,
    })
}

/// Draws the monthly-average bar chart into `output_dir/bar_plot.png`.
pub fn draw_bar_plot(means: &MonthlyMeans, output_dir: &Path) -> Result<Figure, RenderError> {
    let mut figure = bar_figure(means)?;
    let path = output_dir.join(BAR_PLOT_FILE);
    render(&figure, &path)?;
    info!(path = %path.display(), years = means.years().len(), "saved bar plot");
    figure.path = Some(path);
    Ok(figure)
}

fn render(figure: &Figure, path: &Path) -> Result<(), RenderError> {
    let panel = &figure.panels[0];
    let groups = panel.bar_groups().ok_or(RenderError::UnexpectedPanel {
        figure: NAME,
        panel: 0,
        expected: "grouped bar",
    })?;
    let legend = panel.legend.as_ref();
    let slots = legend.map_or(Month::ALL.len(), |legend| legend.labels.len());
    let bar_width = GROUP_WIDTH / slots as f64;

    let y_max = groups
        .iter()
        .flat_map(|group| group.bars.iter().filter_map(|bar| bar.value))
        .fold(0.0_f64, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };
    let labels: Vec<String> = groups.iter().map(|group| group.label.clone()).collect();

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
        .build_cartesian_2d(-0.5..(groups.len() as f64 - 0.5), 0.0..y_max)
        .map_err(draw_error(NAME))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups.len())
        .x_label_formatter(&|x: &f64| category_label(&labels, *x))
        .x_desc(panel.x_label.as_str())
        .y_desc(panel.y_label.as_str())
        .axis_desc_style((DEFAULT_FONT, LABEL_FONT_SIZE))
        .draw()
        .map_err(draw_error(NAME))?;

    if let Some(legend) = legend {
        // Title row of the legend box, drawn without a marker.
        chart
            .draw_series(std::iter::empty::<Rectangle<(f64, f64)>>())
            .map_err(draw_error(NAME))?
            .label(legend.title.as_str())
            .legend(|(x, y)| Rectangle::new([(x, y), (x, y)], TRANSPARENT.filled()));
    }

    for slot in 0..slots {
        let color = MONTH_COLORS[slot % MONTH_COLORS.len()];
        let offset = -GROUP_WIDTH / 2.0 + slot as f64 * bar_width;
        let bars = groups.iter().enumerate().filter_map(|(idx, group)| {
            let value = group.bars.get(slot)?.value?;
            let x0 = idx as f64 + offset;
            Some(Rectangle::new([(x0, 0.0), (x0 + bar_width, value)], color.filled()))
        });

        let series = chart.draw_series(bars).map_err(draw_error(NAME))?;
        if let Some(label) = legend.and_then(|legend| legend.labels.get(slot)) {
            series.label(label.as_str()).legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled())
            });
        }
    }

    if legend.is_some() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(&BLACK)
            .label_font((DEFAULT_FONT, 13))
            .draw()
            .map_err(draw_error(NAME))?;
    }

    root_area.present().map_err(draw_error(NAME))?;
    Ok(())
}
