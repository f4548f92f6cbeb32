//! Runner error type: every failure a backtest or simulation request can
//! surface, with a stable category name for logs and envelopes.

use thiserror::Error;

use crate::config::ConfigError;
use crate::provider::DataError;
use crate::repository::RepoError;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Core(#[from] backcast_core::Error),

    /// Provider failure. Reported as unavailable data; the runner does not retry.
    #[error("{0}")]
    Data(#[from] DataError),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RunError {
    /// Taxonomy name of the failure.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Core(e) => e.category(),
            Self::Data(_) => "DataUnavailable",
            Self::Repo(RepoError::NotFound { .. }) => "NotFound",
            Self::Repo(_) => "RepositoryError",
            Self::Config(_) => "ConfigError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backcast_core::Error;

    #[test]
    fn categories() {
        assert_eq!(
            RunError::from(Error::invalid("Invalid capital amount")).category(),
            "InvalidInput"
        );
        assert_eq!(
            RunError::from(DataError::SymbolNotFound {
                symbol: "X".into()
            })
            .category(),
            "DataUnavailable"
        );
        assert_eq!(
            RunError::from(RepoError::NotFound {
                strategy_id: "s".into()
            })
            .category(),
            "NotFound"
        );
        assert_eq!(RunError::from(Error::NoValidSimulations).category(), "NoValidSimulations");
    }

    #[test]
    fn core_messages_pass_through() {
        let err = RunError::from(Error::invalid("Start date must be before end date"));
        assert_eq!(err.to_string(), "Start date must be before end date");
    }
}
