#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Duration, NaiveDate};
use polars::prelude::*;

use pageviews_core::loader::page_view_frame;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}

/// Deterministic daily series from `start` to `end` inclusive with a slow upward
/// trend and a repeating wobble.
pub fn synthetic_daily(start: NaiveDate, end: NaiveDate) -> (Vec<NaiveDate>, Vec<f64>) {
    let days = (end - start).num_days();
    let mut dates = Vec::with_capacity(days as usize + 1);
    let mut values = Vec::with_capacity(days as usize + 1);
    for offset in 0..=days {
        dates.push(start + Duration::days(offset));
        let wobble = ((offset * 37) % 101) as f64 * 50.0;
        values.push(20_000.0 + offset as f64 * 20.0 + wobble);
    }
    (dates, values)
}

pub fn frame(dates: &[NaiveDate], values: &[f64]) -> DataFrame {
    page_view_frame(dates, values).expect("page view frame")
}

/// Writes the series as a `date,value` CSV, shuffled out of date order.
pub fn write_csv(dir: &Path, dates: &[NaiveDate], values: &[f64]) -> PathBuf {
    let mut rows: Vec<String> = dates
        .iter()
        .zip(values)
        .map(|(date, value)| format!("{},{}", date.format("%Y-%m-%d"), value))
        .collect();
    rows.reverse();

    let path = dir.join("fcc-forum-pageviews.csv");
    let content = format!("date,value\n{}\n", rows.join("\n"));
    fs::write(&path, content).expect("write csv fixture");
    path
}
