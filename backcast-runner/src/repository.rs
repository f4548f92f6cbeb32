//! Saved-strategy lookup.
//!
//! A stored strategy records what a user backtested: ticker, type, capital,
//! date range and the type-specific parameters in a loose `metadata` map.

use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use backcast_core::domain::{Frequency, StrategyKind, StrategyParameters};
use backcast_core::strategies::{DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW};
use backcast_core::Result;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Strategy not found")]
    NotFound { strategy_id: String },

    #[error("strategy store I/O error: {0}")]
    Io(String),

    #[error("strategy store is malformed: {0}")]
    Parse(String),
}

/// Type-specific parameters as persisted. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_window: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_window: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_growth_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commission_dollars: Option<f64>,
}

/// One persisted strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredStrategy {
    pub strategy_id: String,
    pub user_id: String,
    pub ticker_name: String,
    pub strategy_type: String,
    pub money_invested: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub metadata: StrategyMetadata,
}

impl StoredStrategy {
    pub fn kind(&self) -> Result<StrategyKind> {
        self.strategy_type.parse()
    }

    /// Rebuild evaluator parameters from the stored metadata, filling defaults.
    pub fn parameters(&self) -> Result<StrategyParameters> {
        let m = &self.metadata;
        let frequency = || -> Result<Frequency> {
            m.frequency
                .as_deref()
                .map(str::parse::<Frequency>)
                .transpose()
                .map(Option::unwrap_or_default)
        };
        let params = match self.kind()? {
            StrategyKind::BuyHold => StrategyParameters::BuyHold,
            StrategyKind::BuyHoldAdvanced => StrategyParameters::BuyHoldAdvanced {
                entry_price: m.entry_price,
                exit_price: m.exit_price,
                position_percent: m.position_percent.unwrap_or(100.0),
                commission_dollars: m.commission_dollars.unwrap_or(0.0),
            },
            StrategyKind::SmaCrossover => StrategyParameters::SmaCrossover {
                short_window: m.short_window.unwrap_or(DEFAULT_SHORT_WINDOW),
                long_window: m.long_window.unwrap_or(DEFAULT_LONG_WINDOW),
            },
            StrategyKind::Dca => StrategyParameters::Dca {
                frequency: frequency()?,
                contribution: m.contribution,
            },
            StrategyKind::ValueAveraging => StrategyParameters::ValueAveraging {
                frequency: frequency()?,
                target_growth_rate: m.target_growth_rate,
            },
        };
        params.validate()?;
        Ok(params)
    }

    pub fn ticker(&self) -> String {
        self.ticker_name.trim().to_ascii_uppercase()
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Read access to saved strategies.
pub trait StrategyRepository: Send + Sync {
    fn get(&self, strategy_id: &str) -> std::result::Result<StoredStrategy, RepoError>;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    strategies: HashMap<String, StoredStrategy>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, strategy: StoredStrategy) {
        self.strategies.insert(strategy.strategy_id.clone(), strategy);
    }

    pub fn with(mut self, strategy: StoredStrategy) -> Self {
        self.insert(strategy);
        self
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl FromIterator<StoredStrategy> for InMemoryRepository {
    fn from_iter<I: IntoIterator<Item = StoredStrategy>>(iter: I) -> Self {
        let mut repo = Self::new();
        for s in iter {
            repo.insert(s);
        }
        repo
    }
}

impl StrategyRepository for InMemoryRepository {
    fn get(&self, strategy_id: &str) -> std::result::Result<StoredStrategy, RepoError> {
        self.strategies
            .get(strategy_id)
            .cloned()
            .ok_or_else(|| RepoError::NotFound {
                strategy_id: strategy_id.to_string(),
            })
    }
}

/// Strategies loaded from a JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    inner: InMemoryRepository,
}

impl JsonFileRepository {
    pub fn open(path: &Path) -> std::result::Result<Self, RepoError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RepoError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> std::result::Result<Self, RepoError> {
        let list: Vec<StoredStrategy> =
            serde_json::from_str(content).map_err(|e| RepoError::Parse(e.to_string()))?;
        Ok(Self {
            inner: list.into_iter().collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl StrategyRepository for JsonFileRepository {
    fn get(&self, strategy_id: &str) -> std::result::Result<StoredStrategy, RepoError> {
        self.inner.get(strategy_id)
    }
}
