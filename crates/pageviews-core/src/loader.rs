use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use polars::prelude::*;
use thiserror::Error;
use tracing::{debug, info};

pub const DATE_COLUMN: &str = "date";
pub const VALUE_COLUMN: &str = "value";

/// Day number of 1970-01-01 counted from 0001-01-01 (day 1).
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("header is missing the '{0}' column")]
    MissingColumn(&'static str),

    #[error("data row {line_index} invalid: {message}")]
    DataRow { line_index: u64, message: String },

    #[error("date {date} appears on line {first_line} and again on line {second_line}")]
    DuplicateDate {
        date: NaiveDate,
        first_line: u64,
        second_line: u64,
    },

    #[error("file did not contain any data rows")]
    EmptyData,

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

struct RawRecord {
    date: NaiveDate,
    value: f64,
    line_index: u64,
}

/// Reads the page-view CSV at `path` into a two-column frame (`date`, `value`)
/// sorted by date.
pub fn load_page_views(path: impl AsRef<Path>) -> Result<DataFrame, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let df = read_page_views(file)?;
    info!(path = %path.display(), rows = df.height(), "loaded page views");
    Ok(df)
}

/// Same as [`load_page_views`] but reads from any byte source.
///
/// The header must contain a `date` column; the first other column is taken
/// as the value column whatever its name.
pub fn read_page_views<R: Read>(reader: R) -> Result<DataFrame, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let header = reader.headers()?.clone();
    let (date_idx, value_idx) = locate_columns(&header)?;
    debug!(
        date_column = header.get(date_idx).unwrap_or_default(),
        value_column = header.get(value_idx).unwrap_or_default(),
        "resolved input columns"
    );

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let line_index = row.position().map(|pos| pos.line()).unwrap_or_default();
        let date = parse_date(row.get(date_idx).unwrap_or_default(), line_index)?;
        let value = parse_value(row.get(value_idx).unwrap_or_default(), line_index)?;
        records.push(RawRecord {
            date,
            value,
            line_index,
        });
    }

    if records.is_empty() {
        return Err(LoadError::EmptyData);
    }

    records.sort_by_key(|record| record.date);
    for window in records.windows(2) {
        if window[0].date == window[1].date {
            let (first_line, second_line) = if window[0].line_index <= window[1].line_index {
                (window[0].line_index, window[1].line_index)
            } else {
                (window[1].line_index, window[0].line_index)
            };
            return Err(LoadError::DuplicateDate {
                date: window[0].date,
                first_line,
                second_line,
            });
        }
    }

    let dates: Vec<NaiveDate> = records.iter().map(|record| record.date).collect();
    let values: Vec<f64> = records.iter().map(|record| record.value).collect();
    Ok(page_view_frame(&dates, &values)?)
}

/// Builds the canonical `date`/`value` frame. Rows are kept in the order given.
pub fn page_view_frame(dates: &[NaiveDate], values: &[f64]) -> PolarsResult<DataFrame> {
    if dates.len() != values.len() {
        return Err(PolarsError::ShapeMismatch(
            format!(
                "{} dates but {} values for the page view frame",
                dates.len(),
                values.len()
            )
            .into(),
        ));
    }

    let days: Vec<i32> = dates
        .iter()
        .map(|date| date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
        .collect();
    let date_series = Series::new(DATE_COLUMN.into(), days).cast(&DataType::Date)?;
    let value_series = Series::new(VALUE_COLUMN.into(), values.to_vec());

    DataFrame::new(vec![date_series.into(), value_series.into()])
}

/// Reads the `date` column back into chrono dates.
pub fn date_values(df: &DataFrame) -> PolarsResult<Vec<NaiveDate>> {
    let days = df.column(DATE_COLUMN)?.cast(&DataType::Int32)?;
    days.i32()?
        .into_iter()
        .map(|day| {
            day.and_then(|day| NaiveDate::from_num_days_from_ce_opt(day + UNIX_EPOCH_DAYS_FROM_CE))
                .ok_or_else(|| {
                    PolarsError::ComputeError(
                        format!("'{DATE_COLUMN}' holds a null or out-of-range date").into(),
                    )
                })
        })
        .collect()
}

pub fn value_values(df: &DataFrame) -> PolarsResult<Vec<f64>> {
    Ok(df.column(VALUE_COLUMN)?.f64()?.into_iter().flatten().collect())
}

fn locate_columns(header: &StringRecord) -> Result<(usize, usize), LoadError> {
    let date_idx = header
        .iter()
        .position(|name| name.eq_ignore_ascii_case(DATE_COLUMN))
        .ok_or(LoadError::MissingColumn(DATE_COLUMN))?;
    let value_idx = (0..header.len())
        .find(|idx| *idx != date_idx)
        .ok_or(LoadError::MissingColumn(VALUE_COLUMN))?;
    Ok((date_idx, value_idx))
}

fn parse_date(value: &str, line_index: u64) -> Result<NaiveDate, LoadError> {
    static DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
    static DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Ok(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Ok(dt.date());
        }
    }

    Err(LoadError::DataRow {
        line_index,
        message: format!("invalid date '{value}'"),
    })
}

fn parse_value(value: &str, line_index: u64) -> Result<f64, LoadError> {
    let parsed = value.parse::<f64>().map_err(|err| LoadError::DataRow {
        line_index,
        message: format!("failed to parse value '{value}' as a number: {err}"),
    })?;

    if !parsed.is_finite() {
        return Err(LoadError::DataRow {
            line_index,
            message: format!("value '{value}' is not a finite number"),
        });
    }

    Ok(parsed)
}
