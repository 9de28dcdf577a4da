use crate::indicators::{BandReading, BandSet, IndicatorSet, TrendReading};
use crate::models::Signal;
use serde::{Deserialize, Serialize};

/// RSI thresholds for the trend classifier
///
/// RSI between the two thresholds never produces a directional signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub rsi_buy_below: f64,
    pub rsi_sell_above: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            rsi_buy_below: 40.0,
            rsi_sell_above: 60.0,
        }
    }
}

/// Classify the trend of a price against its RSI/EMA indicators
pub fn classify_trend(latest_price: f64, indicators: &IndicatorSet, config: &SignalConfig) -> Signal {
    trend_signal(latest_price, &indicators.latest(), config)
}

/// Classify a price against its Bollinger Bands
pub fn classify_bands(latest_price: f64, bands: &BandSet) -> Signal {
    band_signal(latest_price, &bands.latest())
}

/// Trend rule on raw readings
///
/// Oversold while above the EMA is a BUY; overbought while below it is a SELL.
pub fn trend_signal(latest_price: f64, reading: &TrendReading, config: &SignalConfig) -> Signal {
    if reading.rsi < config.rsi_buy_below && latest_price > reading.ema {
        Signal::Buy
    } else if reading.rsi > config.rsi_sell_above && latest_price < reading.ema {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

/// Band breakout rule on raw readings
pub fn band_signal(latest_price: f64, reading: &BandReading) -> Signal {
    if latest_price < reading.lower {
        Signal::Buy
    } else if latest_price > reading.upper {
        Signal::Sell
    } else {
        Signal::Hold
    }
}
