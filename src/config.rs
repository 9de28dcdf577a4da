use crate::api::KlineInterval;
use crate::error::RotabotError;
use crate::indicators::IndicatorConfig;
use crate::strategy::{ExitConfig, SignalConfig};
use crate::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

const MAX_RETRIES: u32 = 10;

/// Sampling window for one horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonConfig {
    pub interval: KlineInterval,
    pub lookback: usize,
}

impl HorizonConfig {
    pub fn new(interval: KlineInterval, lookback: usize) -> Self {
        Self { interval, lookback }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub base_url: String,
    pub requests_per_minute: u32,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.binance.com".to_string(),
            requests_per_minute: 600,
            timeout_secs: 20,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderConfig {
    /// Decimal places kept on order quantities (truncated, never rounded up)
    pub quantity_precision: u32,
}

impl Default for OrderConfig {
    fn default() -> Self {
        Self {
            quantity_precision: 4,
        }
    }
}

/// Bot settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Quote currency of every traded pair; holding it means holding cash
    pub quote_asset: String,
    pub initial_asset: String,
    pub watchlist: Vec<String>,
    pub short_horizon: HorizonConfig,
    pub long_horizon: HorizonConfig,
    pub scan_horizon: HorizonConfig,
    pub indicators: IndicatorConfig,
    pub signals: SignalConfig,
    pub exit: ExitConfig,
    pub exchange: ExchangeConfig,
    pub order: OrderConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quote_asset: "USDT".to_string(),
            initial_asset: "ETH".to_string(),
            watchlist: ["ETHUSDT", "BTCUSDT", "SOLUSDT", "TAOUSDT"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            short_horizon: HorizonConfig::new(KlineInterval::FiveMinutes, 288),
            long_horizon: HorizonConfig::new(KlineInterval::OneHour, 240),
            scan_horizon: HorizonConfig::new(KlineInterval::FiveMinutes, 200),
            indicators: IndicatorConfig::default(),
            signals: SignalConfig::default(),
            exit: ExitConfig::default(),
            exchange: ExchangeConfig::default(),
            order: OrderConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings: defaults, then the optional file, then `ROTABOT_*` env vars
    ///
    /// Nested keys use `__`, e.g. `ROTABOT_EXIT__TAKE_PROFIT_PCT=3`.
    /// `ROTABOT_WATCHLIST` is a comma-separated list.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let settings: Settings = Config::builder()
            .add_source(File::with_name(path.unwrap_or("rotabot")).required(false))
            .add_source(
                Environment::with_prefix("ROTABOT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("watchlist")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(RotabotError::InvalidSettings(msg));

        if self.quote_asset.is_empty() {
            return invalid("quote_asset must not be empty".to_string());
        }
        if self.watchlist.is_empty() {
            return invalid("watchlist must contain at least one symbol".to_string());
        }

        let ind = &self.indicators;
        if ind.rsi_period == 0 || ind.ema_period == 0 || ind.bb_period == 0 {
            return invalid("indicator periods must be positive".to_string());
        }
        if ind.bb_std_dev.is_nan() || ind.bb_std_dev <= 0.0 {
            return invalid(format!("bb_std_dev must be positive, got {}", ind.bb_std_dev));
        }

        let required = ind.max_window();
        for (name, horizon) in [
            ("short_horizon", &self.short_horizon),
            ("long_horizon", &self.long_horizon),
            ("scan_horizon", &self.scan_horizon),
        ] {
            if horizon.lookback < required {
                return invalid(format!(
                    "{}.lookback is {} but the indicators need {} prices",
                    name, horizon.lookback, required
                ));
            }
        }

        if self.signals.rsi_buy_below >= self.signals.rsi_sell_above {
            return invalid(format!(
                "rsi_buy_below ({}) must be below rsi_sell_above ({})",
                self.signals.rsi_buy_below, self.signals.rsi_sell_above
            ));
        }
        if self.exit.stop_loss_pct >= self.exit.take_profit_pct {
            return invalid(format!(
                "stop_loss_pct ({}) must be below take_profit_pct ({})",
                self.exit.stop_loss_pct, self.exit.take_profit_pct
            ));
        }
        if self.exchange.requests_per_minute == 0 {
            return invalid("exchange.requests_per_minute must be positive".to_string());
        }
        if !(1..=MAX_RETRIES).contains(&self.exchange.max_retries) {
            return invalid(format!(
                "exchange.max_retries must be between 1 and {}, got {}",
                MAX_RETRIES, self.exchange.max_retries
            ));
        }

        Ok(())
    }

    /// Trading pair of an asset against the quote asset
    pub fn symbol_for(&self, asset: &str) -> String {
        format!("{}{}", asset, self.quote_asset)
    }

    pub fn is_cash(&self, asset: &str) -> bool {
        asset == self.quote_asset
    }
}
