mod common;

use polars::prelude::*;

use common::date;
use pageviews_core::loader::{
    date_values, load_page_views, read_page_views, value_values, LoadError, DATE_COLUMN,
    VALUE_COLUMN,
};

#[test]
fn reads_dates_as_sorted_key() -> anyhow::Result<()> {
    let csv = "date,value\n2016-05-11,1201\n2016-05-09,1201\n2016-05-10,2329\n";
    let df = read_page_views(csv.as_bytes())?;

    assert_eq!(df.get_column_names_str(), vec![DATE_COLUMN, VALUE_COLUMN]);
    assert_eq!(df.column(DATE_COLUMN)?.dtype(), &DataType::Date);
    assert_eq!(
        date_values(&df)?,
        vec![date(2016, 5, 9), date(2016, 5, 10), date(2016, 5, 11)]
    );
    assert_eq!(value_values(&df)?, vec![1201.0, 2329.0, 1201.0]);
    Ok(())
}

#[test]
fn first_non_date_column_is_the_value() -> anyhow::Result<()> {
    let csv = "views,date\n10,2019-12-01\n12,2019-12-02\n";
    let df = read_page_views(csv.as_bytes())?;

    assert_eq!(value_values(&df)?, vec![10.0, 12.0]);
    Ok(())
}

#[test]
fn rejects_unparseable_dates() {
    let csv = "date,value\n2016-05-09,1\nnot-a-date,2\n";
    let err = read_page_views(csv.as_bytes()).unwrap_err();

    match err {
        LoadError::DataRow {
            line_index,
            message,
        } => {
            assert_eq!(line_index, 3);
            assert!(message.contains("not-a-date"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn rejects_non_numeric_values() {
    let csv = "date,value\n2016-05-09,lots\n";
    let err = read_page_views(csv.as_bytes()).unwrap_err();
    assert!(matches!(err, LoadError::DataRow { line_index: 2, .. }));
}

#[test]
fn rejects_duplicate_dates() {
    let csv = "date,value\n2016-05-09,1\n2016-05-10,2\n2016-05-09,3\n";
    let err = read_page_views(csv.as_bytes()).unwrap_err();

    match err {
        LoadError::DuplicateDate {
            date: duplicate,
            first_line,
            second_line,
        } => {
            assert_eq!(duplicate, date(2016, 5, 9));
            assert_eq!((first_line, second_line), (2, 4));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn rejects_missing_columns_and_empty_files() {
    let err = read_page_views("day,value\n2016-05-09,1\n".as_bytes()).unwrap_err();
    assert!(matches!(err, LoadError::MissingColumn(DATE_COLUMN)));

    let err = read_page_views("date\n2016-05-09\n".as_bytes()).unwrap_err();
    assert!(matches!(err, LoadError::MissingColumn(VALUE_COLUMN)));

    let err = read_page_views("date,value\n".as_bytes()).unwrap_err();
    assert!(matches!(err, LoadError::EmptyData));
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = load_page_views(dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, LoadError::Io { .. }));
}

#[test]
fn loads_file_from_disk() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let (dates, values) = common::synthetic_daily(date(2016, 5, 9), date(2016, 6, 30));
    let path = common::write_csv(dir.path(), &dates, &values);

    let df = load_page_views(&path)?;
    assert_eq!(df.height(), dates.len());
    assert_eq!(date_values(&df)?, dates);
    assert_eq!(value_values(&df)?, values);
    Ok(())
}
