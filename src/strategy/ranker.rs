use super::signals::{classify_bands, classify_trend, SignalConfig};
use crate::indicators::{compute_bands, compute_trend, IndicatorConfig};
use crate::models::{AssetAnalysis, MarketAnalysis, PriceSeries};
use crate::Result;
use std::cmp::Ordering;

/// Scores watchlist candidates and picks the best rotation target
#[derive(Debug, Clone, Default)]
pub struct MarketRanker {
    indicators: IndicatorConfig,
    signals: SignalConfig,
    quote_asset: String,
}

impl MarketRanker {
    pub fn new(indicators: IndicatorConfig, signals: SignalConfig) -> Self {
        Self {
            indicators,
            signals,
            quote_asset: String::new(),
        }
    }

    /// Strip this quote-asset suffix from symbols to get asset codes
    pub fn with_quote_asset(mut self, quote_asset: impl Into<String>) -> Self {
        self.quote_asset = quote_asset.into();
        self
    }

    /// Asset code for a trading symbol (`ETHUSDT` -> `ETH`)
    pub fn asset_code<'a>(&self, symbol: &'a str) -> &'a str {
        if self.quote_asset.is_empty() {
            return symbol;
        }
        symbol
            .strip_suffix(self.quote_asset.as_str())
            .filter(|code| !code.is_empty())
            .unwrap_or(symbol)
    }

    /// Compute indicators and signals for one symbol
    pub fn analyze(&self, symbol: &str, series: &PriceSeries) -> Result<AssetAnalysis> {
        let price = series.latest()?;
        let trend = compute_trend(series, &self.indicators)?;
        let bands = compute_bands(series, &self.indicators)?;

        let trend_reading = trend.latest();
        let band_reading = bands.latest();

        Ok(AssetAnalysis {
            asset: self.asset_code(symbol).to_string(),
            symbol: symbol.to_string(),
            price,
            rsi: trend_reading.rsi,
            ema: trend_reading.ema,
            lower_band: band_reading.lower,
            upper_band: band_reading.upper,
            middle_band: band_reading.middle,
            trend_signal: classify_trend(price, &trend, &self.signals),
            band_signal: classify_bands(price, &bands),
        })
    }

    /// Analyse every candidate, dropping the ones that cannot be evaluated
    pub fn analyze_all<'a, I>(&self, candidates: I) -> MarketAnalysis
    where
        I: IntoIterator<Item = (&'a str, &'a PriceSeries)>,
    {
        let mut markets = Vec::new();

        for (symbol, series) in candidates {
            match self.analyze(symbol, series) {
                Ok(analysis) => {
                    tracing::debug!(
                        "  {} @ {:.4}: RSI={:.1} trend={} band={}",
                        symbol,
                        analysis.price,
                        analysis.rsi,
                        analysis.trend_signal,
                        analysis.band_signal
                    );
                    markets.push(analysis);
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!("  ✗ Skipping {}: {}", symbol, e);
                }
                Err(e) => {
                    tracing::error!("  ✗ Skipping {}, unexpected failure: {}", symbol, e);
                }
            }
        }

        MarketAnalysis::new(markets)
    }

    /// Analyse candidates and return the best eligible one
    pub fn rank<'a, I>(&self, candidates: I) -> Option<AssetAnalysis>
    where
        I: IntoIterator<Item = (&'a str, &'a PriceSeries)>,
    {
        select_best(&self.analyze_all(candidates)).cloned()
    }
}

/// Lowest-RSI eligible market; the earliest one wins a tie
pub fn select_best(market: &MarketAnalysis) -> Option<&AssetAnalysis> {
    market
        .eligible()
        .min_by(|a, b| a.rsi.partial_cmp(&b.rsi).unwrap_or(Ordering::Equal))
}
