//! Business-day calendar for synthetic paths (weekends only, no holidays).

use chrono::{Datelike, Duration, NaiveDate, Weekday};

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// First business day on or after `date`.
pub fn first_business_day(date: NaiveDate) -> NaiveDate {
    let mut d = date;
    while !is_business_day(d) {
        d += Duration::days(1);
    }
    d
}

/// `count` consecutive business days starting at the first business day ≥ `start`.
pub fn business_days(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(count);
    let mut d = first_business_day(start);
    while out.len() < count {
        out.push(d);
        d = first_business_day(d + Duration::days(1));
    }
    out
}
