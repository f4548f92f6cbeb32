//! Periodic buy-date schedule for contribution strategies.
//!
//! Calendar targets are generated across the series' date span and then mapped
//! onto the last trading day at or before each target. Weekly targets fall on
//! Sundays, biweekly on every second Sunday from the first one in range, and
//! monthly on calendar month ends.

use chrono::{Datelike, Duration, NaiveDate};

use crate::domain::{Frequency, PriceSeries};

/// Calendar target dates in `[start, end]` for a frequency.
pub fn target_dates(start: NaiveDate, end: NaiveDate, frequency: Frequency) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    if start > end {
        return out;
    }
    match frequency {
        Frequency::Weekly | Frequency::Biweekly => {
            let step = if frequency == Frequency::Weekly { 7 } else { 14 };
            let offset = (7 - start.weekday().num_days_from_sunday()) % 7;
            let mut d = start + Duration::days(offset as i64);
            while d <= end {
                out.push(d);
                d += Duration::days(step);
            }
        }
        Frequency::Monthly => {
            let mut d = month_end(start.year(), start.month());
            while d <= end {
                out.push(d);
                let next = d + Duration::days(1);
                d = month_end(next.year(), next.month());
            }
        }
    }
    out
}

fn month_end(year: i32, month: u32) -> NaiveDate {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(ny, nm, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX)
}

/// Indices of the series points that act as buy dates.
///
/// Each target maps to the nearest preceding trading day present in the
/// series. Targets before the first trading day are dropped; repeated
/// mappings are collapsed. The result is strictly increasing.
pub fn buy_date_indices(series: &PriceSeries, frequency: Frequency) -> Vec<usize> {
    let points = series.points();
    let targets = target_dates(series.first().date, series.last().date, frequency);

    let mut indices: Vec<usize> = Vec::with_capacity(targets.len());
    for target in targets {
        let idx = points.partition_point(|p| p.date <= target);
        if idx == 0 {
            continue;
        }
        let mapped = idx - 1;
        if indices.last() != Some(&mapped) {
            indices.push(mapped);
        }
    }
    indices
}
