pub mod binance;

pub use binance::BinanceClient;

use crate::models::Candle;
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Candle interval understood by the exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KlineInterval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
}

impl KlineInterval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::ThirtyMinutes => "30m",
            Self::OneHour => "1h",
            Self::FourHours => "4h",
            Self::OneDay => "1d",
        }
    }
}

impl fmt::Display for KlineInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KlineInterval {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "1m" => Ok(Self::OneMinute),
            "5m" => Ok(Self::FiveMinutes),
            "15m" => Ok(Self::FifteenMinutes),
            "30m" => Ok(Self::ThirtyMinutes),
            "1h" => Ok(Self::OneHour),
            "4h" => Ok(Self::FourHours),
            "1d" => Ok(Self::OneDay),
            other => Err(format!("unsupported kline interval: {}", other)),
        }
    }
}

/// Market data the decision engine consumes
///
/// Implementations fail with `DataUnavailable` instead of returning a
/// partial or empty series.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Most recent `lookback` candles for a symbol, oldest first
    async fn get_prices(
        &self,
        symbol: &str,
        interval: KlineInterval,
        lookback: usize,
    ) -> Result<Vec<Candle>>;

    /// Current spot price for a symbol
    async fn get_spot_price(&self, symbol: &str) -> Result<f64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_parsing() {
        assert_eq!("5m".parse::<KlineInterval>().unwrap(), KlineInterval::FiveMinutes);
        assert_eq!(KlineInterval::OneHour.to_string(), "1h");
        assert!("7m".parse::<KlineInterval>().is_err());
        assert_eq!(
            serde_json::from_str::<KlineInterval>("\"4h\"").unwrap(),
            KlineInterval::FourHours
        );
    }
}
