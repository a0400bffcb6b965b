mod common;

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};

use common::{date, synthetic_daily, write_csv};
use pageviews_core::calendar::Month;
use pageviews_core::pipeline::{monthly_view, prepare};
use pageviews_core::render::{BAR_PLOT_FILE, BOX_PLOT_FILE, LINE_PLOT_FILE};
use pageviews_core::{run_pipeline, PanelData, PipelineConfig, PipelineError};

const SPIKE: f64 = 100.0;

/// Four years of daily data with one day inflated a hundredfold.
fn spiked_input(dir: &Path) -> (PathBuf, NaiveDate, f64) {
    let (dates, mut values) = synthetic_daily(date(2016, 5, 9), date(2019, 12, 3));
    let spike_idx = 400;
    values[spike_idx] *= SPIKE;
    let path = write_csv(dir, &dates, &values);
    (path, dates[spike_idx], values[spike_idx])
}

#[test]
fn renders_three_pngs_without_the_spike() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (input, spike_date, spike_value) = spiked_input(dir.path());
    let out = dir.path().join("charts");
    std::fs::create_dir(&out)?;

    let report = run_pipeline(&PipelineConfig::new(&input, &out))?;

    for file in [LINE_PLOT_FILE, BAR_PLOT_FILE, BOX_PLOT_FILE] {
        let meta = std::fs::metadata(out.join(file))?;
        assert!(meta.len() > 0, "{file} is empty");
    }
    assert_eq!(report.line.path.as_deref(), Some(out.join(LINE_PLOT_FILE).as_path()));
    assert_eq!(report.bar.path.as_deref(), Some(out.join(BAR_PLOT_FILE).as_path()));
    assert_eq!(report.boxes.path.as_deref(), Some(out.join(BOX_PLOT_FILE).as_path()));

    let summary = report.summary;
    assert_eq!(summary.raw_rows, summary.kept_rows + summary.removed_rows);
    assert!(summary.removed_rows > 0);
    assert!(summary.bounds.upper < spike_value);

    let trace = report.line.panels[0].line().expect("line data");
    assert_eq!(trace.points.len(), summary.kept_rows);
    assert!(trace.points.iter().all(|(day, _)| *day != spike_date));
    assert!(trace.points.iter().all(|(_, v)| summary.bounds.contains(*v)));

    let PanelData::Boxes(year_boxes) = &report.boxes.panels[0].data else {
        panic!("year panel should hold boxes");
    };
    for category in year_boxes {
        let stats = category.summary.as_ref().expect("every year has data");
        assert!(stats.max <= summary.bounds.upper);
        assert!(stats.min >= summary.bounds.lower);
    }
    Ok(())
}

#[test]
fn monthly_means_ignore_the_spike() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (input, spike_date, _) = spiked_input(dir.path());
    let config = PipelineConfig::new(&input, dir.path());

    let filtered = prepare(&config)?;
    let means = monthly_view(&filtered)?;

    assert_eq!(means.years(), &[2016, 2017, 2018, 2019]);
    let month = Month::from_number(spike_date.month()).expect("valid month");
    let mean = means
        .get(spike_date.year(), month)
        .expect("spike month has data");
    assert!(filtered.bounds().contains(mean));
    Ok(())
}

#[test]
fn missing_input_fails_before_rendering() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = PipelineConfig::new(dir.path().join("absent.csv"), dir.path());

    let err = run_pipeline(&config).unwrap_err();
    assert!(matches!(err, PipelineError::Load(_)));
    assert!(!dir.path().join(LINE_PLOT_FILE).exists());
}

#[test]
fn unwritable_output_dir_is_a_render_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (input, _, _) = spiked_input(dir.path());
    let config = PipelineConfig::new(&input, dir.path().join("does").join("not").join("exist"));

    let err = run_pipeline(&config).unwrap_err();
    assert!(matches!(err, PipelineError::Render(_)));
    Ok(())
}
