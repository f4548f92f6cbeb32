//! Local CSV price provider.
//!
//! Reads `{dir}/{TICKER}.csv` with a header row. Any column layout the
//! close-price extractor understands is accepted (`Date,Close`,
//! `Date,Open,High,Low,Close,Volume`, `date,Close:SPY,Close:QQQ`, ...).

use std::path::PathBuf;

use chrono::NaiveDate;
use polars::prelude::*;

use backcast_core::data::extract::DATE_COLUMNS;

use crate::provider::{filter_date_range, DataError, PriceProvider};

pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", ticker.trim().to_ascii_uppercase()))
    }
}

impl PriceProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<DataFrame, DataError> {
        let path = self.path_for(ticker);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: ticker.to_string(),
            });
        }

        let df = LazyCsvReader::new(&path)
            .with_has_header(true)
            .with_try_parse_dates(true)
            .finish()
            .and_then(|lf| lf.collect())
            .map_err(|e| DataError::Io(format!("{}: {e}", path.display())))?;

        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|n| n.to_string())
            .collect();
        match DATE_COLUMNS.iter().find(|c| names.iter().any(|n| n == *c)) {
            Some(date_col) => filter_date_range(&df, date_col, start, end),
            // Let the extractor report the missing date column.
            None => Ok(df),
        }
    }
}
