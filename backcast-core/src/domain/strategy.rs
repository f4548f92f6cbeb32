//! Strategy parameter variants.
//!
//! The five evaluators share no state, so parameters are a closed tagged
//! union dispatched with `match` rather than a trait hierarchy. Tag names are
//! the `strategy_type` strings used by saved strategies.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Contribution frequency for DCA and Value Averaging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Weekly,
    Biweekly,
    #[default]
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(Error::invalid("Invalid frequency.")),
        }
    }
}

/// Strategy type tag without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    BuyHold,
    #[serde(rename = "buy_hold_markers")]
    BuyHoldAdvanced,
    #[serde(rename = "simple_moving_average_crossover")]
    SmaCrossover,
    Dca,
    ValueAveraging,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 5] = [
        Self::BuyHold,
        Self::BuyHoldAdvanced,
        Self::SmaCrossover,
        Self::Dca,
        Self::ValueAveraging,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BuyHold => "buy_hold",
            Self::BuyHoldAdvanced => "buy_hold_markers",
            Self::SmaCrossover => "simple_moving_average_crossover",
            Self::Dca => "dca",
            Self::ValueAveraging => "value_averaging",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::BuyHold => "Buy & Hold (simple)",
            Self::BuyHoldAdvanced => "Buy & Hold Advanced",
            Self::SmaCrossover => "SMA Crossover",
            Self::Dca => "Dollar Cost Averaging",
            Self::ValueAveraging => "Value Averaging",
        }
    }

    /// Simple Buy & Hold is excluded from Monte Carlo replay.
    pub fn is_monte_carlo_eligible(&self) -> bool {
        !matches!(self, Self::BuyHold)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == key)
            .ok_or_else(|| Error::invalid(format!("Unsupported strategy type: {s}")))
    }
}

/// Parameters for one strategy evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum StrategyParameters {
    BuyHold,
    #[serde(rename = "buy_hold_markers")]
    BuyHoldAdvanced {
        entry_price: Option<f64>,
        exit_price: Option<f64>,
        position_percent: f64,
        commission_dollars: f64,
    },
    #[serde(rename = "simple_moving_average_crossover")]
    SmaCrossover {
        short_window: usize,
        long_window: usize,
    },
    Dca {
        frequency: Frequency,
        contribution: Option<f64>,
    },
    ValueAveraging {
        frequency: Frequency,
        target_growth_rate: Option<f64>,
    },
}

impl StrategyParameters {
    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::BuyHold => StrategyKind::BuyHold,
            Self::BuyHoldAdvanced { .. } => StrategyKind::BuyHoldAdvanced,
            Self::SmaCrossover { .. } => StrategyKind::SmaCrossover,
            Self::Dca { .. } => StrategyKind::Dca,
            Self::ValueAveraging { .. } => StrategyKind::ValueAveraging,
        }
    }

    /// Check the per-variant invariants.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::BuyHold => Ok(()),
            Self::BuyHoldAdvanced {
                entry_price,
                exit_price,
                position_percent,
                commission_dollars,
            } => {
                if !(position_percent > 0.0 && position_percent <= 100.0) {
                    return Err(Error::invalid(
                        "position_percent must be greater than 0 and at most 100",
                    ));
                }
                if !commission_dollars.is_finite() || commission_dollars < 0.0 {
                    return Err(Error::invalid("commission_dollars must be non-negative"));
                }
                check_optional_positive(entry_price, "entry_price")?;
                check_optional_positive(exit_price, "exit_price")
            }
            Self::SmaCrossover {
                short_window,
                long_window,
            } => {
                if short_window == 0 || long_window == 0 {
                    return Err(Error::invalid("Moving average windows must be positive"));
                }
                if short_window >= long_window {
                    return Err(Error::invalid(
                        "short_window must be strictly less than long_window",
                    ));
                }
                Ok(())
            }
            Self::Dca { contribution, .. } => {
                check_optional_positive(contribution, "contribution")
                    .map_err(|_| Error::invalid("Invalid contribution amount"))
            }
            Self::ValueAveraging {
                target_growth_rate, ..
            } => match target_growth_rate {
                Some(g) if !g.is_finite() || g <= -1.0 => Err(Error::invalid(
                    "target_growth_rate must be finite and greater than -1",
                )),
                _ => Ok(()),
            },
        }
    }
}

fn check_optional_positive(value: Option<f64>, name: &str) -> Result<()> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 => {
            Err(Error::invalid(format!("{name} must be a positive number")))
        }
        _ => Ok(()),
    }
}
