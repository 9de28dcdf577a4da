// Technical indicators module
// Implements RSI, EMA and Bollinger Bands over a closing-price series

pub mod bollinger;
pub mod moving_average;
pub mod rsi;

pub use bollinger::{calculate_bollinger_bands, BollingerSeries};
pub use moving_average::{calculate_ema_series, calculate_sma_series};
pub use rsi::calculate_rsi_series;

use crate::error::RotabotError;
use crate::models::PriceSeries;
use crate::Result;
use serde::{Deserialize, Serialize};

/// Indicator windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub ema_period: usize,
    pub bb_period: usize,
    pub bb_std_dev: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            ema_period: 200,
            bb_period: 20,
            bb_std_dev: 1.5,
        }
    }
}

impl IndicatorConfig {
    /// Points needed before the latest RSI and EMA are both defined
    pub fn trend_window(&self) -> usize {
        self.rsi_period.max(self.ema_period)
    }

    /// Largest window of any indicator
    pub fn max_window(&self) -> usize {
        self.trend_window().max(self.bb_period)
    }
}

/// Latest RSI and EMA
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendReading {
    pub rsi: f64,
    pub ema: f64,
}

/// Latest Bollinger Band values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandReading {
    pub upper: f64,
    pub lower: f64,
    pub middle: f64,
}

/// RSI and EMA series aligned with the input prices
///
/// Only built by [`compute_trend`], so the latest values are always defined.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    rsi: Vec<Option<f64>>,
    ema: Vec<Option<f64>>,
    rsi_period: usize,
    ema_period: usize,
    latest: TrendReading,
}

impl IndicatorSet {
    pub fn len(&self) -> usize {
        self.rsi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rsi.is_empty()
    }

    pub fn rsi(&self) -> &[Option<f64>] {
        &self.rsi
    }

    pub fn ema(&self) -> &[Option<f64>] {
        &self.ema
    }

    pub fn rsi_at(&self, index: usize) -> Result<f64> {
        value_at(&self.rsi, index, "rsi", self.rsi_period)
    }

    pub fn ema_at(&self, index: usize) -> Result<f64> {
        value_at(&self.ema, index, "ema", self.ema_period)
    }

    pub fn latest(&self) -> TrendReading {
        self.latest
    }
}

/// Bollinger Band series aligned with the input prices
///
/// Only built by [`compute_bands`], so the latest values are always defined.
#[derive(Debug, Clone, PartialEq)]
pub struct BandSet {
    bands: BollingerSeries,
    period: usize,
    latest: BandReading,
}

impl BandSet {
    pub fn len(&self) -> usize {
        self.bands.middle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.middle.is_empty()
    }

    pub fn upper(&self) -> &[Option<f64>] {
        &self.bands.upper
    }

    pub fn lower(&self) -> &[Option<f64>] {
        &self.bands.lower
    }

    pub fn middle(&self) -> &[Option<f64>] {
        &self.bands.middle
    }

    pub fn reading_at(&self, index: usize) -> Result<BandReading> {
        Ok(BandReading {
            upper: value_at(&self.bands.upper, index, "bollinger_upper", self.period)?,
            lower: value_at(&self.bands.lower, index, "bollinger_lower", self.period)?,
            middle: value_at(&self.bands.middle, index, "bollinger_middle", self.period)?,
        })
    }

    pub fn latest(&self) -> BandReading {
        self.latest
    }
}

/// Compute RSI and EMA for a price series
///
/// Fails with `InsufficientData` before any math runs if the series is
/// shorter than the larger of the two windows.
pub fn compute_trend(series: &PriceSeries, config: &IndicatorConfig) -> Result<IndicatorSet> {
    series.require(config.trend_window())?;

    let closes = series.closes();
    let last = closes.len() - 1;
    let rsi = calculate_rsi_series(closes, config.rsi_period);
    let ema = calculate_ema_series(closes, config.ema_period);

    let latest = TrendReading {
        rsi: value_at(&rsi, last, "rsi", config.rsi_period)?,
        ema: value_at(&ema, last, "ema", config.ema_period)?,
    };

    tracing::debug!(
        "Trend indicators: RSI({})={:.2}, EMA({})={:.4} over {} prices",
        config.rsi_period,
        latest.rsi,
        config.ema_period,
        latest.ema,
        closes.len()
    );

    Ok(IndicatorSet {
        rsi,
        ema,
        rsi_period: config.rsi_period,
        ema_period: config.ema_period,
        latest,
    })
}

/// Compute Bollinger Bands for a price series
pub fn compute_bands(series: &PriceSeries, config: &IndicatorConfig) -> Result<BandSet> {
    series.require(config.bb_period)?;

    let closes = series.closes();
    let last = closes.len() - 1;
    let bands = calculate_bollinger_bands(closes, config.bb_period, config.bb_std_dev);

    let latest = BandReading {
        upper: value_at(&bands.upper, last, "bollinger_upper", config.bb_period)?,
        lower: value_at(&bands.lower, last, "bollinger_lower", config.bb_period)?,
        middle: value_at(&bands.middle, last, "bollinger_middle", config.bb_period)?,
    };

    tracing::debug!(
        "Bollinger({}, {}): lower={:.4}, mid={:.4}, upper={:.4}",
        config.bb_period,
        config.bb_std_dev,
        latest.lower,
        latest.middle,
        latest.upper
    );

    Ok(BandSet {
        bands,
        period: config.bb_period,
        latest,
    })
}

fn value_at(
    values: &[Option<f64>],
    index: usize,
    indicator: &'static str,
    period: usize,
) -> Result<f64> {
    values
        .get(index)
        .copied()
        .flatten()
        .ok_or(RotabotError::UndefinedIndicator {
            indicator,
            index,
            warmup: period.saturating_sub(1),
        })
}
