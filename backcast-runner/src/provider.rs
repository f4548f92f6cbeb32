//! Price provider trait and structured error types.
//!
//! The PriceProvider trait abstracts over data sources (Yahoo Finance, local
//! CSV files) so the runner can swap implementations and mock for tests.
//! Providers return the raw table; close-price resolution happens in
//! `backcast_core::data::extract_close_series`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::NaiveDate;
use polars::prelude::*;
use thiserror::Error;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("table error: {0}")]
    Table(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("data error: {0}")]
    Other(String),
}

impl From<PolarsError> for DataError {
    fn from(e: PolarsError) -> Self {
        Self::Table(e.to_string())
    }
}

/// Source of daily close-price tables.
///
/// Implementations must be shareable across threads; the runner only calls
/// them before a simulation starts, never from inside the trial loop.
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the daily table for `ticker` over `[start, end]`.
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<DataFrame, DataError>;
}

/// Build a `Date` / `Close` table from parallel slices.
pub fn close_frame(dates: &[NaiveDate], closes: &[Option<f64>]) -> Result<DataFrame, DataError> {
    DataFrame::new(vec![date_column("Date", dates)?, Column::new("Close".into(), closes)])
        .map_err(DataError::from)
}

/// A `Date`-typed column from calendar dates.
pub fn date_column(name: &str, dates: &[NaiveDate]) -> Result<Column, DataError> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
        .ok_or_else(|| DataError::Other("epoch date out of range".into()))?;
    let days: Vec<i32> = dates
        .iter()
        .map(|d| (*d - epoch).num_days() as i32)
        .collect();
    Column::new(name.into(), days)
        .cast(&DataType::Date)
        .map_err(|e| DataError::Table(format!("date cast: {e}")))
}

/// Keep the rows of `df` whose `date_col` falls within `[start, end]`.
pub fn filter_date_range(
    df: &DataFrame,
    date_col: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<DataFrame, DataError> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
        .ok_or_else(|| DataError::Other("epoch date out of range".into()))?;
    let lo = (start - epoch).num_days() as i32;
    let hi = (end - epoch).num_days() as i32;

    let dates = df.column(date_col)?.cast(&DataType::Date)?;
    let days = dates.date()?;
    let mask: BooleanChunked = (0..days.len())
        .map(|i| days.get(i).map(|d| d >= lo && d <= hi))
        .collect();
    Ok(df.filter(&mask)?)
}

/// In-memory provider for tests and offline runs.
///
/// Series registered with [`StaticProvider::with_closes`] are filtered to the
/// requested range; tables registered with [`StaticProvider::with_frame`] are
/// returned as-is. Unknown tickers yield [`DataError::SymbolNotFound`].
#[derive(Debug, Default)]
pub struct StaticProvider {
    closes: HashMap<String, (Vec<NaiveDate>, Vec<f64>)>,
    frames: HashMap<String, DataFrame>,
    calls: AtomicUsize,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_closes(mut self, ticker: &str, dates: Vec<NaiveDate>, closes: Vec<f64>) -> Self {
        self.closes.insert(ticker.to_ascii_uppercase(), (dates, closes));
        self
    }

    pub fn with_frame(mut self, ticker: &str, frame: DataFrame) -> Self {
        self.frames.insert(ticker.to_ascii_uppercase(), frame);
        self
    }

    /// Number of `fetch` calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl PriceProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<DataFrame, DataError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        let key = ticker.to_ascii_uppercase();

        if let Some(frame) = self.frames.get(&key) {
            return Ok(frame.clone());
        }

        let (dates, closes) = self.closes.get(&key).ok_or_else(|| DataError::SymbolNotFound {
            symbol: key.clone(),
        })?;
        let (d, c): (Vec<NaiveDate>, Vec<Option<f64>>) = dates
            .iter()
            .zip(closes)
            .filter(|(d, _)| **d >= start && **d <= end)
            .map(|(d, c)| (*d, Some(*c)))
            .unzip();
        close_frame(&d, &c)
    }
}
