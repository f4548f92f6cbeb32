//! Close-price extraction from a provider response table.
//!
//! Provider tables carry a date column and one or more value columns. A
//! multi-symbol download flattens its two-level headers into `Field:SYMBOL`
//! names (`Close:SPY`, `Open:SPY`, ...).

use chrono::{Duration, NaiveDate};
use polars::prelude::*;

use crate::domain::{PricePoint, PriceSeries};
use crate::error::{Error, Result};

/// Accepted names for the date column, checked in order.
pub const DATE_COLUMNS: [&str; 4] = ["Date", "date", "Datetime", "timestamp"];

/// Separator between field and symbol in flattened column names.
pub const LEVEL_SEPARATOR: char = ':';

/// Extract the close-price series for `ticker` from a provider table.
pub fn extract_close_series(table: Option<&DataFrame>, ticker: &str) -> Result<PriceSeries> {
    let df = match table {
        Some(df) if df.height() > 0 => df,
        _ => return Err(Error::unavailable("No data returned for ticker/date range")),
    };

    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    let close_name = resolve_close_column(&names, ticker)?;
    let date_name = DATE_COLUMNS
        .iter()
        .find(|c| names.iter().any(|n| n == *c))
        .ok_or_else(|| Error::unavailable("No date column in price data"))?;

    let dates = read_dates(df, date_name)?;
    let closes = read_closes(df, &close_name)?;

    let mut rows: Vec<(NaiveDate, f64)> = dates
        .into_iter()
        .zip(closes)
        .filter_map(|(d, c)| match (d, c) {
            (Some(d), Some(c)) if !c.is_nan() => Some((d, c)),
            _ => None,
        })
        .collect();

    // Stable sort keeps the first of any repeated date in front.
    rows.sort_by_key(|(d, _)| *d);
    rows.dedup_by_key(|(d, _)| *d);

    if rows.is_empty() {
        return Err(Error::unavailable("No closing prices available"));
    }

    PriceSeries::new(rows.into_iter().map(|(d, c)| PricePoint::new(d, c)).collect())
}

/// Pick the close column among `names`.
///
/// Exact `Close` wins, then `Close:{TICKER}`, then a unique case-insensitive
/// match on the field name.
pub fn resolve_close_column(names: &[String], ticker: &str) -> Result<String> {
    if names.iter().any(|n| n == "Close") {
        return Ok("Close".to_string());
    }

    let ticker = ticker.trim().to_ascii_uppercase();
    let qualified = format!("Close{LEVEL_SEPARATOR}{ticker}");
    if names.iter().any(|n| *n == qualified) {
        return Ok(qualified);
    }

    let candidates: Vec<&String> = names
        .iter()
        .filter(|n| {
            let field = n.split(LEVEL_SEPARATOR).next().unwrap_or_default();
            field.eq_ignore_ascii_case("close")
        })
        .collect();

    match candidates.as_slice() {
        [only] => Ok((*only).clone()),
        [] => Err(Error::unavailable(
            "Unable to determine closing prices for ticker",
        )),
        _ => Err(Error::unavailable("Ambiguous closing price data returned")),
    }
}

fn read_dates(df: &DataFrame, name: &str) -> Result<Vec<Option<NaiveDate>>> {
    let column = df
        .column(name)
        .map_err(|e| Error::unavailable(format!("date column '{name}': {e}")))?;
    let as_date = column
        .cast(&DataType::Date)
        .map_err(|e| Error::unavailable(format!("date column '{name}' is not a date: {e}")))?;
    let days = as_date
        .date()
        .map_err(|e| Error::unavailable(format!("date column '{name}': {e}")))?;

    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
        .ok_or_else(|| Error::invalid("epoch date out of range"))?;
    Ok((0..days.len())
        .map(|i| days.get(i).map(|d| epoch + Duration::days(i64::from(d))))
        .collect())
}

fn read_closes(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let column = df
        .column(name)
        .map_err(|e| Error::unavailable(format!("close column '{name}': {e}")))?;
    let as_f64 = column
        .cast(&DataType::Float64)
        .map_err(|e| Error::unavailable(format!("close column '{name}' is not numeric: {e}")))?;
    let values = as_f64
        .f64()
        .map_err(|e| Error::unavailable(format!("close column '{name}': {e}")))?;
    Ok(values.into_iter().collect())
}
