use std::collections::BTreeMap;

use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::calendar::Month;
use crate::loader::{DATE_COLUMN, VALUE_COLUMN};

pub const YEAR_COLUMN: &str = "year";
pub const MONTH_COLUMN: &str = "month";

const MONTH_NUMBER_COLUMN: &str = "month_number";
const MEAN_COLUMN: &str = "mean_value";

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("polars operation failed: {0}")]
    Polars(#[from] PolarsError),
    #[error("calendar month {0} is outside 1..=12")]
    InvalidMonth(i32),
}

/// Year × month table of mean page views. A cell is `None` when the month had no
/// filtered observations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyMeans {
    years: Vec<i32>,
    cells: Vec<[Option<f64>; 12]>,
}

impl MonthlyMeans {
    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Rows in ascending year order; each row is indexed by [`Month::index`].
    pub fn rows(&self) -> impl Iterator<Item = (i32, &[Option<f64>; 12])> + '_ {
        self.years.iter().copied().zip(self.cells.iter())
    }

    pub fn get(&self, year: i32, month: Month) -> Option<f64> {
        let row = self.years.binary_search(&year).ok()?;
        self.cells[row][month.index()]
    }

    pub fn non_empty_cells(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| cell.is_some()).count()
    }

    pub fn empty_cells(&self) -> usize {
        self.cells.len() * Month::ALL.len() - self.non_empty_cells()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Wide frame: a `year` column followed by one column per month name.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(Month::ALL.len() + 1);
        columns.push(Series::new(YEAR_COLUMN.into(), self.years.clone()).into());
        for month in Month::ALL {
            let values: Vec<Option<f64>> =
                self.cells.iter().map(|row| row[month.index()]).collect();
            columns.push(Series::new(month.full_name().into(), values).into());
        }
        DataFrame::new(columns)
    }
}

/// Groups the filtered observations by calendar year and month and averages them.
pub fn monthly_means(filtered: &DataFrame) -> Result<MonthlyMeans, AggregateError> {
    let grouped = filtered
        .clone()
        .lazy()
        .with_columns(calendar_columns())
        .group_by([col(YEAR_COLUMN), col(MONTH_NUMBER_COLUMN)])
        .agg([col(VALUE_COLUMN).mean().alias(MEAN_COLUMN)])
        .collect()?;

    let years = grouped.column(YEAR_COLUMN)?.i32()?;
    let months = grouped.column(MONTH_NUMBER_COLUMN)?.i32()?;
    let means = grouped.column(MEAN_COLUMN)?.f64()?;

    let mut table: BTreeMap<i32, [Option<f64>; 12]> = BTreeMap::new();
    for idx in 0..grouped.height() {
        let (Some(year), Some(month_number), Some(mean)) =
            (years.get(idx), months.get(idx), means.get(idx))
        else {
            continue;
        };
        let month = month_from_i32(month_number)?;
        table.entry(year).or_insert([None; 12])[month.index()] = Some(mean);
    }

    debug!(years = table.len(), groups = grouped.height(), "computed monthly means");

    let (years, cells): (Vec<i32>, Vec<[Option<f64>; 12]>) = table.into_iter().unzip();
    Ok(MonthlyMeans { years, cells })
}

/// Long-form view: the filtered frame with an integer `year` and an abbreviated
/// `month` label (`Jan`..`Dec`) appended to every row.
pub fn annotate_calendar(filtered: &DataFrame) -> Result<DataFrame, AggregateError> {
    let with_numbers = filtered
        .clone()
        .lazy()
        .with_columns(calendar_columns())
        .collect()?;

    let month_numbers = with_numbers.column(MONTH_NUMBER_COLUMN)?.i32()?;
    let mut labels: Vec<Option<&'static str>> = Vec::with_capacity(with_numbers.height());
    for number in month_numbers.into_iter() {
        let label = match number {
            Some(number) => Some(month_from_i32(number)?.abbreviation()),
            None => None,
        };
        labels.push(label);
    }

    let mut annotated = with_numbers.drop(MONTH_NUMBER_COLUMN)?;
    annotated.with_column(Series::new(MONTH_COLUMN.into(), labels))?;
    Ok(annotated)
}

fn calendar_columns() -> [Expr; 2] {
    [
        col(DATE_COLUMN).dt().year().cast(DataType::Int32).alias(YEAR_COLUMN),
        col(DATE_COLUMN)
            .dt()
            .month()
            .cast(DataType::Int32)
            .alias(MONTH_NUMBER_COLUMN),
    ]
}

fn month_from_i32(number: i32) -> Result<Month, AggregateError> {
    u32::try_from(number)
        .ok()
        .and_then(Month::from_number)
        .ok_or(AggregateError::InvalidMonth(number))
}
