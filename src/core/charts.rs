//! Time-bucketed chart series.
//!
//! A period selects both the bucket width and the window length. The window
//! always ends with the bucket containing `now`, and every bucket in it is
//! emitted, with zero values when nothing falls inside.

use super::{DateRange, coerce_amount, to_amount};
use crate::{
    entities::{cattle_purchase, expense, revenue},
    errors::Error,
};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::{fmt, str::FromStr};

/// Bucket width of a chart series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// 30 daily buckets
    Day,
    /// 12 ISO-week buckets starting on Monday
    Week,
    /// 12 calendar-month buckets
    #[default]
    Month,
    /// 5 calendar-year buckets
    Year,
}

impl Period {
    /// Number of buckets in the window.
    #[must_use]
    pub const fn bucket_count(self) -> u32 {
        match self {
            Self::Day => 30,
            Self::Week | Self::Month => 12,
            Self::Year => 5,
        }
    }

    /// Lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            _ => Err(Error::InvalidPeriod {
                value: value.to_string(),
            }),
        }
    }
}

/// One bucket of the chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartBucket {
    /// Display label (`2024-03-15`, `2024-W11`, `2024-03`, `2024`)
    pub label: String,
    /// Bucket start (inclusive)
    pub start: DateTime<Utc>,
    /// Bucket end (exclusive)
    pub end: DateTime<Utc>,
    /// Revenue amount by `received_date`
    pub revenues: f64,
    /// Expense amount by `due_date`
    pub expenses: f64,
    /// Purchase value by `purchase_date`
    pub purchases: f64,
    /// Number of purchases
    pub purchase_count: u64,
    /// `revenues - expenses`
    pub net: f64,
}

/// A gap-free series of buckets
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    /// Bucket width
    pub period: Period,
    /// Buckets in chronological order
    pub buckets: Vec<ChartBucket>,
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn bucket_starts(period: Period, now: DateTime<Utc>) -> Vec<NaiveDate> {
    let today = now.date_naive();
    let count = period.bucket_count();
    match period {
        Period::Day => (0..count)
            .rev()
            .map(|back| today - Duration::days(i64::from(back)))
            .collect(),
        Period::Week => {
            let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
            (0..count)
                .rev()
                .map(|back| monday - Duration::weeks(i64::from(back)))
                .collect()
        }
        Period::Month => {
            let first = today - Duration::days(i64::from(today.day0()));
            (0..count)
                .rev()
                .filter_map(|back| first.checked_sub_months(Months::new(back)))
                .collect()
        }
        Period::Year => (0..count)
            .rev()
            .filter_map(|back| {
                let year = today.year() - i32::try_from(back).ok()?;
                NaiveDate::from_ymd_opt(year, 1, 1)
            })
            .collect(),
    }
}

fn next_start(period: Period, start: NaiveDate) -> Option<NaiveDate> {
    match period {
        Period::Day => start.checked_add_signed(Duration::days(1)),
        Period::Week => start.checked_add_signed(Duration::weeks(1)),
        Period::Month => start.checked_add_months(Months::new(1)),
        Period::Year => start.checked_add_months(Months::new(12)),
    }
}

fn label(period: Period, start: NaiveDate) -> String {
    match period {
        Period::Day => start.format("%Y-%m-%d").to_string(),
        Period::Week => start.format("%G-W%V").to_string(),
        Period::Month => start.format("%Y-%m").to_string(),
        Period::Year => start.format("%Y").to_string(),
    }
}

/// Empty buckets covering the window for `period` ending at `now`.
#[must_use]
pub fn empty_buckets(period: Period, now: DateTime<Utc>) -> Vec<ChartBucket> {
    bucket_starts(period, now)
        .into_iter()
        .filter_map(|start| {
            let end = next_start(period, start)?;
            Some(ChartBucket {
                label: label(period, start),
                start: midnight(start),
                end: midnight(end),
                revenues: 0.0,
                expenses: 0.0,
                purchases: 0.0,
                purchase_count: 0,
                net: 0.0,
            })
        })
        .collect()
}

/// The overall window covered by the buckets of `period`.
#[must_use]
pub fn window(period: Period, now: DateTime<Utc>) -> DateRange {
    let buckets = empty_buckets(period, now);
    DateRange {
        from: buckets.first().map(|b| b.start),
        to: buckets.last().map(|b| b.end),
    }
}

fn bucket_index(buckets: &[ChartBucket], at: DateTime<Utc>) -> Option<usize> {
    let index = buckets.partition_point(|b| b.end <= at);
    buckets.get(index).filter(|b| b.start <= at).map(|_| index)
}

#[derive(Default, Clone, Copy)]
struct BucketTotals {
    revenues: Decimal,
    expenses: Decimal,
    purchases: Decimal,
}

/// Buckets the three collections for `period`, each by its own date field.
///
/// Rows outside the window, and revenues without a date, are ignored.
#[must_use]
pub fn build_series(
    period: Period,
    now: DateTime<Utc>,
    revenues: &[revenue::Model],
    expenses: &[expense::Model],
    purchases: &[cattle_purchase::Model],
) -> ChartSeries {
    let mut buckets = empty_buckets(period, now);
    let mut totals = vec![BucketTotals::default(); buckets.len()];

    for row in revenues {
        if let Some(date) = row.received_date
            && let Some(index) = bucket_index(&buckets, date)
        {
            totals[index].revenues += coerce_amount(row.total_amount);
        }
    }
    for row in expenses {
        if let Some(index) = bucket_index(&buckets, row.due_date) {
            totals[index].expenses += coerce_amount(row.total_amount);
        }
    }
    for row in purchases {
        if let Some(index) = bucket_index(&buckets, row.purchase_date) {
            totals[index].purchases += coerce_amount(row.total_value);
            buckets[index].purchase_count += 1;
        }
    }
    for (bucket, sums) in buckets.iter_mut().zip(totals) {
        bucket.revenues = to_amount(sums.revenues);
        bucket.expenses = to_amount(sums.expenses);
        bucket.purchases = to_amount(sums.purchases);
        bucket.net = to_amount(sums.revenues - sums.expenses);
    }

    ChartSeries { period, buckets }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp, clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::{expense_row, purchase_row, revenue_row};
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        // A Wednesday
        Utc.with_ymd_and_hms(2024, 3, 13, 15, 30, 0).unwrap()
    }

    #[test]
    fn test_parse_period() {
        assert_eq!("day".parse::<Period>().ok(), Some(Period::Day));
        assert_eq!(" WEEK ".parse::<Period>().ok(), Some(Period::Week));
        assert_eq!("year".parse::<Period>().ok(), Some(Period::Year));
        assert!(matches!(
            "quarter".parse::<Period>(),
            Err(Error::InvalidPeriod { .. })
        ));
    }

    #[test]
    fn test_windows_are_contiguous() {
        for period in [Period::Day, Period::Week, Period::Month, Period::Year] {
            let buckets = empty_buckets(period, fixed_now());
            assert_eq!(buckets.len(), period.bucket_count() as usize, "{period}");
            for pair in buckets.windows(2) {
                assert_eq!(pair[0].end, pair[1].start, "{period} has a gap");
            }
            let last = buckets.last().unwrap();
            assert!(last.start <= fixed_now() && fixed_now() < last.end);
        }
    }

    #[test]
    fn test_bucket_labels() {
        let weeks = empty_buckets(Period::Week, fixed_now());
        assert_eq!(weeks.last().unwrap().label, "2024-W11");
        assert_eq!(
            weeks.last().unwrap().start,
            Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap()
        );

        let months = empty_buckets(Period::Month, fixed_now());
        assert_eq!(months.first().unwrap().label, "2023-04");
        assert_eq!(months.last().unwrap().label, "2024-03");

        let years = empty_buckets(Period::Year, fixed_now());
        let labels: Vec<&str> = years.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, ["2020", "2021", "2022", "2023", "2024"]);
    }

    #[test]
    fn test_empty_buckets_still_present() {
        let now = fixed_now();
        let revenues = vec![revenue_row(1, Some(100.0), true, Some(now - Duration::days(40)))];

        let series = build_series(Period::Month, now, &revenues, &[], &[]);
        assert_eq!(series.buckets.len(), 12);
        let non_zero: Vec<&ChartBucket> =
            series.buckets.iter().filter(|b| b.revenues > 0.0).collect();
        assert_eq!(non_zero.len(), 1);
        assert_eq!(non_zero[0].label, "2024-02");
        assert!(series.buckets.iter().all(|b| b.expenses == 0.0));
    }

    #[test]
    fn test_each_collection_uses_its_own_date() {
        let now = fixed_now();
        let today = Utc.with_ymd_and_hms(2024, 3, 13, 8, 0, 0).unwrap();
        let yesterday = today - Duration::days(1);

        let revenues = vec![
            revenue_row(1, Some(100.0), true, Some(today)),
            revenue_row(2, Some(999.0), false, None),
        ];
        let expenses = vec![expense_row(1, Some(40.0), false, yesterday)];
        let purchases = vec![
            purchase_row(1, Some(5000.0), today),
            purchase_row(2, None, today),
            purchase_row(3, Some(1.0), now - Duration::days(365)),
        ];

        let series = build_series(Period::Day, now, &revenues, &expenses, &purchases);
        let last = series.buckets.last().unwrap();
        let before = &series.buckets[series.buckets.len() - 2];

        assert_eq!(last.revenues, 100.0);
        assert_eq!(last.purchases, 5000.0);
        assert_eq!(last.purchase_count, 2);
        assert_eq!(last.expenses, 0.0);
        assert_eq!(before.expenses, 40.0);
        assert_eq!(before.net, -40.0);

        let total_purchases: u64 = series.buckets.iter().map(|b| b.purchase_count).sum();
        assert_eq!(total_purchases, 2);
    }

    #[test]
    fn test_window_matches_buckets() {
        let range = window(Period::Year, fixed_now());
        assert_eq!(range.from, Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()));
        assert_eq!(range.to, Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()));
    }
}
