use super::{KlineInterval, PriceSource};
use crate::config::ExchangeConfig;
use crate::error::RotabotError;
use crate::models::Candle;
use crate::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

const INITIAL_BACKOFF_MS: u64 = 1000;

type BinanceRateLimiter = RateLimiter<
    governor::state::direct::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Client for Binance public market data (klines and ticker prices)
///
/// Cloneable; all clones share the same rate limiter.
#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
    max_retries: u32,
    backoff: Duration,
    rate_limiter: Arc<BinanceRateLimiter>,
}

/// Row of `/api/v3/klines`:
/// [open time, open, high, low, close, volume, close time, quote volume,
///  trades, taker base, taker quote, ignore]
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct RawKline(
    i64,
    String,
    String,
    String,
    String,
    String,
    IgnoredAny,
    IgnoredAny,
    IgnoredAny,
    IgnoredAny,
    IgnoredAny,
    IgnoredAny,
);

#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

impl RawKline {
    fn into_candle(self, symbol: &str) -> Result<Candle> {
        let parse = |field: &str, raw: &str| -> Result<f64> {
            raw.parse::<f64>().map_err(|e| {
                RotabotError::data_unavailable(symbol, format!("bad {} value {:?}: {}", field, raw, e))
            })
        };

        let timestamp: DateTime<Utc> = DateTime::from_timestamp_millis(self.0).ok_or_else(|| {
            RotabotError::data_unavailable(symbol, format!("bad open time {}", self.0))
        })?;

        Ok(Candle {
            symbol: symbol.to_string(),
            timestamp,
            open: parse("open", &self.1)?,
            high: parse("high", &self.2)?,
            low: parse("low", &self.3)?,
            close: parse("close", &self.4)?,
            volume: parse("volume", &self.5)?,
        })
    }
}

impl BinanceClient {
    pub fn new(config: &ExchangeConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RotabotError::InvalidSettings(format!("failed to build HTTP client: {}", e)))?;

        let rpm = NonZeroU32::new(config.requests_per_minute).ok_or_else(|| {
            RotabotError::InvalidSettings("exchange.requests_per_minute must be positive".to_string())
        })?;
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(rpm)));

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries.max(1),
            backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
            rate_limiter,
        })
    }

    /// Override the initial retry backoff (doubles on every attempt)
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Delay after a failed attempt (1-based), doubling each time and saturating
    fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }

    /// Make a rate-limited GET with retry logic
    ///
    /// Retries on 429, 5xx and network errors; other statuses fail at once.
    async fn get_json<T: DeserializeOwned>(
        &self,
        symbol: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let mut last_error = String::from("no attempt made");

        for attempt in 1..=self.max_retries {
            self.rate_limiter.until_ready().await;

            match self.client.get(&url).query(query).send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return response.json::<T>().await.map_err(|e| {
                            RotabotError::data_unavailable(symbol, format!("malformed response: {}", e))
                        });
                    }

                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());
                    last_error = format!("HTTP {}: {}", status, body);

                    if status != StatusCode::TOO_MANY_REQUESTS && !status.is_server_error() {
                        return Err(RotabotError::data_unavailable(symbol, last_error));
                    }
                }
                Err(e) => {
                    last_error = format!("network error: {}", e);
                }
            }

            if attempt < self.max_retries {
                let backoff = self.backoff_for(attempt);
                tracing::warn!(
                    "Attempt {}/{} failed for {}: {}. Retrying in {:?}...",
                    attempt,
                    self.max_retries,
                    symbol,
                    last_error,
                    backoff
                );
                tokio::time::sleep(backoff).await;
            }
        }

        Err(RotabotError::data_unavailable(
            symbol,
            format!("failed after {} attempts, last error: {}", self.max_retries, last_error),
        ))
    }
}

#[async_trait]
impl PriceSource for BinanceClient {
    async fn get_prices(
        &self,
        symbol: &str,
        interval: KlineInterval,
        lookback: usize,
    ) -> Result<Vec<Candle>> {
        let query = [
            ("symbol", symbol.to_string()),
            ("interval", interval.as_str().to_string()),
            ("limit", lookback.to_string()),
        ];
        let rows: Vec<RawKline> = self.get_json(symbol, "/api/v3/klines", &query).await?;

        if rows.len() < lookback {
            return Err(RotabotError::data_unavailable(
                symbol,
                format!("only {} of {} {} candles returned", rows.len(), lookback, interval),
            ));
        }

        let candles = rows
            .into_iter()
            .map(|row| row.into_candle(symbol))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Fetched {} {} candles for {}", candles.len(), interval, symbol);

        Ok(candles)
    }

    async fn get_spot_price(&self, symbol: &str) -> Result<f64> {
        let query = [("symbol", symbol.to_string())];
        let ticker: TickerPrice = self.get_json(symbol, "/api/v3/ticker/price", &query).await?;

        ticker.price.parse::<f64>().map_err(|e| {
            RotabotError::data_unavailable(symbol, format!("bad price {:?}: {}", ticker.price, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kline_row() {
        let json = r#"[1499040000000,"0.01634790","0.80000000","0.01575800","0.01577100","148976.11427815",1499644799999,"2434.19055334",308,"1756.87402397","28.46694368","0"]"#;
        let raw: RawKline = serde_json::from_str(json).unwrap();
        let candle = raw.into_candle("LTCBTC").unwrap();

        assert_eq!(candle.symbol, "LTCBTC");
        assert_eq!(candle.close, 0.015771);
        assert_eq!(candle.high, 0.8);
        assert_eq!(candle.timestamp.timestamp_millis(), 1499040000000);
    }

    #[test]
    fn test_bad_close_is_data_unavailable() {
        let json = r#"[1499040000000,"1","1","1","oops","1",1499644799999,"1",1,"1","1","0"]"#;
        let raw: RawKline = serde_json::from_str(json).unwrap();
        assert!(matches!(
            raw.into_candle("ETHUSDT"),
            Err(RotabotError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn test_client_rejects_zero_rate() {
        let config = ExchangeConfig {
            requests_per_minute: 0,
            ..Default::default()
        };
        assert!(BinanceClient::new(&config).is_err());
    }

    #[test]
    fn test_backoff_doubles_and_saturates() {
        let client = BinanceClient::new(&ExchangeConfig::default())
            .unwrap()
            .with_backoff(Duration::from_millis(10));

        assert_eq!(client.backoff_for(1), Duration::from_millis(10));
        assert_eq!(client.backoff_for(3), Duration::from_millis(40));
        assert_eq!(client.backoff_for(40), Duration::from_millis(10).saturating_mul(u32::MAX));
    }
}
