pub mod analysis;

use crate::error::RotabotError;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use analysis::{AssetAnalysis, MarketAnalysis};

/// Trading signal
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Signal::Buy => "buy",
            Signal::Sell => "sell",
            Signal::Hold => "hold",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeSide {
    Buy,
    Sell,
}

/// OHLCV candlestick as returned by the exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Chronological closing prices for one evaluation cycle
///
/// Every close is finite and strictly positive.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    closes: Vec<f64>,
}

impl PriceSeries {
    pub fn new(closes: Vec<f64>) -> Result<Self> {
        if let Some((index, &value)) = closes
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p <= 0.0)
        {
            return Err(RotabotError::InvalidPrice { index, value });
        }
        Ok(Self { closes })
    }

    pub fn from_candles(candles: &[Candle]) -> Result<Self> {
        Self::new(candles.iter().map(|c| c.close).collect())
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    /// Most recent close
    pub fn latest(&self) -> Result<f64> {
        self.closes
            .last()
            .copied()
            .ok_or(RotabotError::InsufficientData {
                required: 1,
                actual: 0,
            })
    }

    /// Fail unless the series covers `window` points
    pub fn require(&self, window: usize) -> Result<()> {
        if self.closes.len() < window {
            return Err(RotabotError::InsufficientData {
                required: window,
                actual: self.closes.len(),
            });
        }
        Ok(())
    }
}

/// The single position slot: cash, or one asset bought at a recorded price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PositionState {
    Cash,
    Holding { asset: String, entry_price: f64 },
}

/// Flat form of [`PositionState`] as a store keeps it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub asset: String,
    pub entry_price: Option<f64>,
}

impl PositionState {
    pub fn open(asset: impl Into<String>, entry_price: f64) -> Result<Self> {
        let asset = asset.into();
        if asset.is_empty() {
            return Err(RotabotError::InvariantViolation(
                "held asset code is empty".to_string(),
            ));
        }
        if !entry_price.is_finite() || entry_price <= 0.0 {
            return Err(RotabotError::InvariantViolation(format!(
                "entry price {} for {} is not a positive number",
                entry_price, asset
            )));
        }
        Ok(Self::Holding { asset, entry_price })
    }

    /// Convert a stored record, rejecting it if the entry price and asset disagree
    pub fn from_record(record: PositionRecord, cash_asset: &str) -> Result<Self> {
        let is_cash = record.asset == cash_asset;
        match (is_cash, record.entry_price) {
            (true, None) => Ok(Self::Cash),
            (true, Some(price)) => Err(RotabotError::InvariantViolation(format!(
                "entry price {} recorded while holding cash ({})",
                price, cash_asset
            ))),
            (false, None) => Err(RotabotError::InvariantViolation(format!(
                "no entry price recorded for held asset {}",
                record.asset
            ))),
            (false, Some(price)) => Self::open(record.asset, price),
        }
    }

    pub fn to_record(&self, cash_asset: &str) -> PositionRecord {
        match self {
            Self::Cash => PositionRecord {
                asset: cash_asset.to_string(),
                entry_price: None,
            },
            Self::Holding { asset, entry_price } => PositionRecord {
                asset: asset.clone(),
                entry_price: Some(*entry_price),
            },
        }
    }

    pub fn is_cash(&self) -> bool {
        matches!(self, Self::Cash)
    }

    pub fn held_asset(&self) -> Option<&str> {
        match self {
            Self::Cash => None,
            Self::Holding { asset, .. } => Some(asset),
        }
    }

    pub fn entry_price(&self) -> Option<f64> {
        match self {
            Self::Cash => None,
            Self::Holding { entry_price, .. } => Some(*entry_price),
        }
    }
}
