use crate::api::PriceSource;
use crate::config::{HorizonConfig, Settings};
use crate::models::{AssetAnalysis, MarketAnalysis, PriceSeries};
use crate::strategy::{select_best, MarketRanker};
use crate::Result;
use std::sync::Arc;

/// Fetch one horizon of closes for a symbol
pub async fn fetch_series(
    source: &dyn PriceSource,
    symbol: &str,
    horizon: &HorizonConfig,
) -> Result<PriceSeries> {
    let candles = source
        .get_prices(symbol, horizon.interval, horizon.lookback)
        .await?;
    PriceSeries::from_candles(&candles)
}

/// Analyses the watchlist at the scan horizon
pub struct MarketScanner {
    source: Arc<dyn PriceSource>,
    ranker: MarketRanker,
    horizon: HorizonConfig,
    watchlist: Vec<String>,
}

impl MarketScanner {
    pub fn new(source: Arc<dyn PriceSource>, settings: &Settings) -> Self {
        Self {
            source,
            ranker: MarketRanker::new(settings.indicators.clone(), settings.signals.clone())
                .with_quote_asset(settings.quote_asset.clone()),
            horizon: settings.scan_horizon.clone(),
            watchlist: settings.watchlist.clone(),
        }
    }

    pub fn watchlist(&self) -> &[String] {
        &self.watchlist
    }

    /// Fetch and analyse every watchlist symbol, in watchlist order
    ///
    /// Symbols whose data cannot be fetched or evaluated are left out.
    pub async fn scan(&self) -> MarketAnalysis {
        tracing::info!("🔎 Scanning {} markets ({})", self.watchlist.len(), self.horizon.interval);

        let mut fetched = Vec::with_capacity(self.watchlist.len());
        for symbol in &self.watchlist {
            match fetch_series(self.source.as_ref(), symbol, &self.horizon).await {
                Ok(series) => fetched.push((symbol.as_str(), series)),
                Err(e) if e.is_recoverable() => tracing::warn!("  ✗ Skipping {}: {}", symbol, e),
                Err(e) => tracing::error!("  ✗ Skipping {}, unexpected failure: {}", symbol, e),
            }
        }

        let analysis = self
            .ranker
            .analyze_all(fetched.iter().map(|(symbol, series)| (*symbol, series)));

        tracing::info!(
            "Scan complete: {}/{} markets analysed, {} eligible",
            analysis.len(),
            self.watchlist.len(),
            analysis.eligible().count()
        );

        analysis
    }

    /// Best rotation target on the watchlist, if any
    pub async fn best(&self) -> Option<AssetAnalysis> {
        let analysis = self.scan().await;
        let best = select_best(&analysis).cloned();

        match &best {
            Some(pick) => tracing::info!("🏆 Best pick: {} (RSI {:.1})", pick.asset, pick.rsi),
            None => tracing::info!("No eligible market on the watchlist"),
        }

        best
    }
}
