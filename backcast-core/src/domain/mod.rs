//! Domain types: price series, strategy parameters, evaluation results.

pub mod price;
pub mod result;
pub mod strategy;

pub use price::{PricePoint, PriceSeries, ReturnSample};
pub use result::{pct_change, BacktestResult, BacktestSummary, EquityCurvePoint, PointDetail};
pub use strategy::{Frequency, StrategyKind, StrategyParameters};
