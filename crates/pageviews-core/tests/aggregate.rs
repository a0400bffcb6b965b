mod common;

use approx::assert_relative_eq;
use chrono::Duration;

use common::{date, frame, synthetic_daily};
use pageviews_core::aggregate::{annotate_calendar, monthly_means, MONTH_COLUMN, YEAR_COLUMN};
use pageviews_core::calendar::Month;
use pageviews_core::loader::VALUE_COLUMN;
use pageviews_core::outliers::remove_outliers;

#[test]
fn averages_each_calendar_month() -> anyhow::Result<()> {
    let start = date(2018, 1, 1);
    let dates: Vec<_> = (0..59).map(|offset| start + Duration::days(offset)).collect();
    // January holds 1..=31, February holds 100 every day.
    let values: Vec<f64> = (1..=31)
        .map(|v| v as f64)
        .chain(std::iter::repeat(100.0).take(28))
        .collect();

    let means = monthly_means(&frame(&dates, &values))?;

    assert_eq!(means.years(), &[2018]);
    assert_relative_eq!(means.get(2018, Month::January).unwrap(), 16.0, epsilon = 1e-9);
    assert_relative_eq!(means.get(2018, Month::February).unwrap(), 100.0, epsilon = 1e-9);
    assert_eq!(means.get(2018, Month::March), None);
    assert_eq!(means.get(2019, Month::January), None);
    Ok(())
}

#[test]
fn months_without_data_stay_empty() -> anyhow::Result<()> {
    let (dates, values) = synthetic_daily(date(2016, 5, 9), date(2017, 2, 15));
    let means = monthly_means(&frame(&dates, &values))?;

    assert_eq!(means.years(), &[2016, 2017]);
    for month in [Month::January, Month::February, Month::March, Month::April] {
        assert_eq!(means.get(2016, month), None, "{month} 2016");
    }
    for month in &Month::ALL[2..] {
        assert_eq!(means.get(2017, *month), None, "{month} 2017");
    }
    assert!(means.get(2016, Month::May).is_some());
    assert_eq!(means.non_empty_cells(), 8 + 2);
    assert_eq!(means.empty_cells(), 24 - 10);
    Ok(())
}

#[test]
fn two_full_years_fill_every_cell() -> anyhow::Result<()> {
    let (dates, _) = synthetic_daily(date(2018, 1, 1), date(2019, 12, 31));
    let values = vec![5000.0; dates.len()];
    let filtered = remove_outliers(&frame(&dates, &values))?;
    assert_eq!(filtered.removed_rows(), 0);

    let means = monthly_means(filtered.frame())?;
    assert_eq!(means.years(), &[2018, 2019]);
    assert_eq!(means.non_empty_cells(), 24);
    assert_eq!(means.empty_cells(), 0);
    for (_, row) in means.rows() {
        for cell in row {
            assert_relative_eq!(cell.unwrap(), 5000.0, epsilon = 1e-9);
        }
    }
    Ok(())
}

#[test]
fn wide_frame_has_year_then_month_names() -> anyhow::Result<()> {
    let (dates, values) = synthetic_daily(date(2018, 11, 1), date(2019, 1, 31));
    let means = monthly_means(&frame(&dates, &values))?;
    let wide = means.to_dataframe()?;

    let mut expected = vec![YEAR_COLUMN];
    expected.extend(Month::ALL.iter().map(|month| month.full_name()));
    assert_eq!(wide.get_column_names_str(), expected);
    assert_eq!(wide.height(), 2);

    let january = wide.column("January")?.f64()?;
    assert_eq!(january.get(0), None);
    assert!(january.get(1).is_some());
    let december = wide.column("December")?.f64()?;
    assert!(december.get(0).is_some());
    assert_eq!(december.get(1), None);
    Ok(())
}

#[test]
fn long_form_labels_every_row() -> anyhow::Result<()> {
    let (dates, values) = synthetic_daily(date(2017, 12, 30), date(2018, 1, 2));
    let annotated = annotate_calendar(&frame(&dates, &values))?;

    assert_eq!(annotated.height(), 4);
    let years: Vec<Option<i32>> = annotated.column(YEAR_COLUMN)?.i32()?.into_iter().collect();
    assert_eq!(years, vec![Some(2017), Some(2017), Some(2018), Some(2018)]);

    let months: Vec<Option<&str>> = annotated.column(MONTH_COLUMN)?.str()?.into_iter().collect();
    assert_eq!(months, vec![Some("Dec"), Some("Dec"), Some("Jan"), Some("Jan")]);

    let kept: Vec<f64> = annotated
        .column(VALUE_COLUMN)?
        .f64()?
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(kept, values);
    Ok(())
}

#[test]
fn one_record_per_month_gives_twenty_four_cells() -> anyhow::Result<()> {
    let dates: Vec<_> = [2018, 2019]
        .into_iter()
        .flat_map(|year| (1..=12).map(move |month| date(year, month, 15)))
        .collect();
    let values: Vec<f64> = (0..dates.len()).map(|idx| 1000.0 + idx as f64).collect();

    let means = monthly_means(&frame(&dates, &values))?;
    assert_eq!(means.non_empty_cells(), 24);
    assert_eq!(means.empty_cells(), 0);
    assert_relative_eq!(
        means.get(2019, Month::December).unwrap(),
        1023.0,
        epsilon = 1e-9
    );
    Ok(())
}
