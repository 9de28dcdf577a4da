use super::Signal;
use crate::indicators::{BandReading, TrendReading};
use serde::{Deserialize, Serialize};

/// Latest indicator readings and signals for one watchlist symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetAnalysis {
    pub asset: String,
    pub symbol: String,
    pub price: f64,
    pub rsi: f64,
    pub ema: f64,
    pub lower_band: f64,
    pub upper_band: f64,
    pub middle_band: f64,
    pub trend_signal: Signal,
    pub band_signal: Signal,
}

impl AssetAnalysis {
    /// Only assets without a SELL on either axis are rotation targets
    pub fn is_eligible(&self) -> bool {
        self.trend_signal != Signal::Sell && self.band_signal != Signal::Sell
    }

    /// Overall market stance, led by the band signal and tempered by the trend
    pub fn stance(&self) -> Signal {
        match (self.band_signal, self.trend_signal) {
            (Signal::Buy, Signal::Buy | Signal::Hold) => Signal::Buy,
            (Signal::Sell, Signal::Sell | Signal::Hold) => Signal::Sell,
            _ => Signal::Hold,
        }
    }

    pub fn trend_reading(&self) -> TrendReading {
        TrendReading {
            rsi: self.rsi,
            ema: self.ema,
        }
    }

    pub fn band_reading(&self) -> BandReading {
        BandReading {
            upper: self.upper_band,
            lower: self.lower_band,
            middle: self.middle_band,
        }
    }
}

/// Analyses for every watchlist symbol that could be evaluated this cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketAnalysis {
    pub markets: Vec<AssetAnalysis>,
}

impl MarketAnalysis {
    pub fn new(markets: Vec<AssetAnalysis>) -> Self {
        Self { markets }
    }

    pub fn len(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AssetAnalysis> {
        self.markets.iter()
    }

    pub fn eligible(&self) -> impl Iterator<Item = &AssetAnalysis> {
        self.markets.iter().filter(|m| m.is_eligible())
    }
}
