//! Backcast Core: price series, strategy evaluators, synthetic paths, outcome statistics.
//!
//! This crate contains the deterministic heart of the system:
//! - Domain types (price series, strategy parameters, equity curves)
//! - Close-price extraction from provider tables
//! - Five strategy evaluators behind one `match` dispatch
//! - Historical-bootstrap and forward-simulation path generators
//! - BLAKE3-derived per-trial RNG seeds
//! - Terminal-capital statistics

pub mod data;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod paths;
pub mod rng;
pub mod stats;
pub mod strategies;

pub use error::{Error, Result};
