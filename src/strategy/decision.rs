use crate::models::Signal;
use serde::{Deserialize, Serialize};

/// Percentage-change thresholds for the exit evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitConfig {
    /// Above this gain (%) the position is always sold
    pub take_profit_pct: f64,
    /// Below this change (%) the position is in the stop-loss zone
    pub stop_loss_pct: f64,
}

impl Default for ExitConfig {
    fn default() -> Self {
        Self {
            take_profit_pct: 2.0,
            stop_loss_pct: -1.0,
        }
    }
}

/// Where the current price sits relative to the entry price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceZone {
    TakeProfit,
    StopLoss,
    Neutral,
}

impl PriceZone {
    pub fn from_change(change_pct: f64, config: &ExitConfig) -> Self {
        if change_pct > config.take_profit_pct {
            Self::TakeProfit
        } else if change_pct < config.stop_loss_pct {
            Self::StopLoss
        } else {
            Self::Neutral
        }
    }
}

/// How the trend and band signals agree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confluence {
    BothBuy,
    BothSell,
    BothHold,
    Mixed,
}

impl Confluence {
    pub fn of(trend: Signal, band: Signal) -> Self {
        match (trend, band) {
            (Signal::Buy, Signal::Buy) => Self::BothBuy,
            (Signal::Sell, Signal::Sell) => Self::BothSell,
            (Signal::Hold, Signal::Hold) => Self::BothHold,
            _ => Self::Mixed,
        }
    }
}

/// Exit decision table
///
/// Only SELL or HOLD is ever returned. In the stop-loss zone anything short of
/// a joint BUY exits; in the neutral zone anything short of a joint SELL holds.
pub fn verdict(zone: PriceZone, confluence: Confluence) -> Signal {
    use Confluence::*;
    use PriceZone::*;

    match (zone, confluence) {
        (TakeProfit, _) => Signal::Sell,

        (StopLoss, BothSell) => Signal::Sell,
        (StopLoss, BothBuy) => Signal::Hold,
        (StopLoss, BothHold) => Signal::Sell,
        (StopLoss, Mixed) => Signal::Sell,

        (Neutral, BothBuy) => Signal::Hold,
        (Neutral, BothSell) => Signal::Sell,
        (Neutral, BothHold) => Signal::Hold,
        (Neutral, Mixed) => Signal::Hold,
    }
}

/// Percentage change from entry to current price
pub fn percent_change(entry_price: f64, current_price: f64) -> f64 {
    (current_price - entry_price) / entry_price * 100.0
}

/// Decide whether to sell or hold the current position at one horizon
///
/// `entry_price` must be finite and strictly positive, as
/// [`PositionState::open`](crate::models::PositionState::open) guarantees. A zero
/// entry would turn the percentage change into `inf` or `NaN`.
pub fn evaluate(
    entry_price: f64,
    current_price: f64,
    trend_signal: Signal,
    band_signal: Signal,
    config: &ExitConfig,
) -> Signal {
    debug_assert!(
        entry_price.is_finite() && entry_price > 0.0,
        "entry price must be positive, got {}",
        entry_price
    );
    let change = percent_change(entry_price, current_price);
    let zone = PriceZone::from_change(change, config);
    let confluence = Confluence::of(trend_signal, band_signal);
    let decision = verdict(zone, confluence);

    tracing::debug!(
        "Exit evaluation: change={:.3}% zone={:?} trend={} band={} -> {}",
        change,
        zone,
        trend_signal,
        band_signal,
        decision
    );

    decision
}

/// Exit verdicts at the short and long horizons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorizonVerdicts {
    pub short: Signal,
    pub long: Signal,
}

impl HorizonVerdicts {
    /// Rotation needs both horizons to independently say SELL
    pub fn confirms_exit(&self) -> bool {
        self.short == Signal::Sell && self.long == Signal::Sell
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Signal; 3] = [Signal::Buy, Signal::Sell, Signal::Hold];

    fn eval(change_pct: f64, trend: Signal, band: Signal) -> Signal {
        let entry = 100.0;
        evaluate(entry, entry * (1.0 + change_pct / 100.0), trend, band, &ExitConfig::default())
    }

    #[test]
    fn test_take_profit_overrides_signals() {
        for trend in ALL {
            for band in ALL {
                assert_eq!(eval(2.5, trend, band), Signal::Sell);
            }
        }
    }

    #[test]
    fn test_neutral_zone_table() {
        assert_eq!(eval(1.5, Signal::Buy, Signal::Buy), Signal::Hold);
        assert_eq!(eval(1.5, Signal::Sell, Signal::Sell), Signal::Sell);
        assert_eq!(eval(1.5, Signal::Hold, Signal::Hold), Signal::Hold);
        assert_eq!(eval(1.5, Signal::Sell, Signal::Hold), Signal::Hold);
        assert_eq!(eval(1.5, Signal::Buy, Signal::Sell), Signal::Hold);
    }

    #[test]
    fn test_stop_loss_zone_table() {
        assert_eq!(eval(-2.0, Signal::Sell, Signal::Sell), Signal::Sell);
        assert_eq!(eval(-2.0, Signal::Buy, Signal::Buy), Signal::Hold);
        assert_eq!(eval(-2.0, Signal::Hold, Signal::Hold), Signal::Sell);
        assert_eq!(eval(-2.0, Signal::Buy, Signal::Hold), Signal::Sell);
        assert_eq!(eval(-2.0, Signal::Sell, Signal::Buy), Signal::Sell);
    }

    #[test]
    fn test_zone_boundaries_are_neutral() {
        let config = ExitConfig::default();
        assert_eq!(PriceZone::from_change(2.0, &config), PriceZone::Neutral);
        assert_eq!(PriceZone::from_change(-1.0, &config), PriceZone::Neutral);
        assert_eq!(PriceZone::from_change(2.0001, &config), PriceZone::TakeProfit);
        assert_eq!(PriceZone::from_change(-1.0001, &config), PriceZone::StopLoss);

        // Exactly +2% with mixed signals holds instead of taking profit
        assert_eq!(evaluate(100.0, 102.0, Signal::Hold, Signal::Buy, &config), Signal::Hold);
    }

    #[test]
    fn test_never_returns_buy() {
        for change in [-5.0, -1.5, -1.0, 0.0, 1.0, 2.0, 3.0] {
            for trend in ALL {
                for band in ALL {
                    assert_ne!(eval(change, trend, band), Signal::Buy);
                }
            }
        }
    }

    #[test]
    fn test_confluence() {
        assert_eq!(Confluence::of(Signal::Buy, Signal::Buy), Confluence::BothBuy);
        assert_eq!(Confluence::of(Signal::Hold, Signal::Sell), Confluence::Mixed);
    }

    #[test]
    fn test_dual_horizon_confirmation() {
        let both = HorizonVerdicts {
            short: Signal::Sell,
            long: Signal::Sell,
        };
        assert!(both.confirms_exit());

        let short_only = HorizonVerdicts {
            short: Signal::Sell,
            long: Signal::Hold,
        };
        assert!(!short_only.confirms_exit());

        let long_only = HorizonVerdicts {
            short: Signal::Hold,
            long: Signal::Sell,
        };
        assert!(!long_only.confirms_exit());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "entry price must be positive")]
    fn test_zero_entry_price_rejected() {
        evaluate(0.0, 100.0, Signal::Hold, Signal::Hold, &ExitConfig::default());
    }
}
