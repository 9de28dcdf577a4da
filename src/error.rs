use thiserror::Error;

/// Errors surfaced by the decision engine and its collaborators
#[derive(Debug, Error)]
pub enum RotabotError {
    /// Price series shorter than the indicator window needs
    #[error("insufficient data: {actual} prices, need at least {required}")]
    InsufficientData { required: usize, actual: usize },

    /// Indicator read inside its warm-up period
    #[error("{indicator} is undefined at index {index} (first {warmup} values are warm-up)")]
    UndefinedIndicator {
        indicator: &'static str,
        index: usize,
        warmup: usize,
    },

    /// A collaborator could not supply market data for a symbol
    #[error("data unavailable for {symbol}: {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// Position bookkeeping is inconsistent
    #[error("position invariant violated: {0}")]
    InvariantViolation(String),

    #[error("invalid price {value} at index {index}")]
    InvalidPrice { index: usize, value: f64 },

    #[error("account error for {asset}: {reason}")]
    Account { asset: String, reason: String },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

impl RotabotError {
    pub fn data_unavailable(symbol: impl Into<String>, reason: impl ToString) -> Self {
        Self::DataUnavailable {
            symbol: symbol.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether the error only disqualifies one candidate/cycle rather than the process
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientData { .. }
                | Self::UndefinedIndicator { .. }
                | Self::DataUnavailable { .. }
                | Self::InvalidPrice { .. }
        )
    }
}
