use super::notifier::{notify_quietly, Notifier};
use super::order::{HoldingValuation, OrderFactory, OrderPlan};
use super::scanner::{fetch_series, MarketScanner};
use super::store::PositionStore;
use super::wallet::Wallet;
use crate::api::PriceSource;
use crate::config::{HorizonConfig, Settings};
use crate::indicators::{compute_bands, compute_trend};
use crate::models::{PositionRecord, PositionState, Signal};
use crate::strategy::{classify_bands, classify_trend, evaluate, HorizonVerdicts};
use crate::Result;
use serde::Serialize;
use std::sync::Arc;

/// What one cycle decided
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CycleAction {
    /// Nothing held, nothing to evaluate
    InCash,
    /// At least one horizon does not confirm the exit
    Hold { verdicts: HorizonVerdicts },
    /// Exit confirmed but the held asset is still the best pick
    StayInBest { asset: String },
    Rotate { from: String, to: String },
    ExitToCash { from: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleOutcome {
    pub state: PositionState,
    pub action: CycleAction,
    pub order: Option<OrderPlan>,
}

impl CycleOutcome {
    fn unchanged(state: PositionState, action: CycleAction) -> Self {
        Self {
            state,
            action,
            order: None,
        }
    }
}

/// One evaluation of the held position, with rotation when both horizons say SELL
pub struct RotationCycle {
    settings: Settings,
    source: Arc<dyn PriceSource>,
    wallet: Arc<dyn Wallet>,
    notifier: Arc<dyn Notifier>,
    scanner: MarketScanner,
    orders: OrderFactory,
}

impl RotationCycle {
    pub fn new(
        settings: Settings,
        source: Arc<dyn PriceSource>,
        wallet: Arc<dyn Wallet>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let scanner = MarketScanner::new(source.clone(), &settings);
        let orders = OrderFactory::new(settings.quote_asset.clone(), settings.order.quantity_precision);

        Self {
            settings,
            source,
            wallet,
            notifier,
            scanner,
            orders,
        }
    }

    pub fn scanner(&self) -> &MarketScanner {
        &self.scanner
    }

    /// Start holding `asset` at its current spot price
    ///
    /// The quote asset opens a cash position.
    pub async fn open_position(&self, asset: &str) -> Result<PositionState> {
        if self.settings.is_cash(asset) {
            return Ok(PositionState::Cash);
        }

        let price = self
            .source
            .get_spot_price(&self.settings.symbol_for(asset))
            .await?;
        tracing::info!("📌 Opening position in {} at {:.4}", asset, price);

        PositionState::open(asset, price)
    }

    /// Position for `asset` with an optional recorded entry price
    ///
    /// A given entry price goes through the same checks as a stored record, so
    /// the quote asset with an entry price is an `InvariantViolation`. A held
    /// asset without one opens at the current spot price.
    pub async fn resolve_position(
        &self,
        asset: &str,
        entry_price: Option<f64>,
    ) -> Result<PositionState> {
        match entry_price {
            Some(price) => PositionState::from_record(
                PositionRecord {
                    asset: asset.to_string(),
                    entry_price: Some(price),
                },
                &self.settings.quote_asset,
            ),
            None => self.open_position(asset).await,
        }
    }

    /// Exit verdict for a held asset at both horizons
    pub async fn evaluate_horizons(&self, asset: &str, entry_price: f64) -> Result<HorizonVerdicts> {
        let symbol = self.settings.symbol_for(asset);

        let short = self
            .evaluate_horizon(&symbol, &self.settings.short_horizon, entry_price)
            .await?;
        let long = self
            .evaluate_horizon(&symbol, &self.settings.long_horizon, entry_price)
            .await?;

        let verdicts = HorizonVerdicts { short, long };
        tracing::info!(
            "{} verdicts: {} {} / {} {}",
            asset,
            self.settings.short_horizon.interval,
            verdicts.short,
            self.settings.long_horizon.interval,
            verdicts.long
        );

        Ok(verdicts)
    }

    async fn evaluate_horizon(
        &self,
        symbol: &str,
        horizon: &HorizonConfig,
        entry_price: f64,
    ) -> Result<Signal> {
        let series = fetch_series(self.source.as_ref(), symbol, horizon).await?;
        let current_price = series.latest()?;

        let trend = compute_trend(&series, &self.settings.indicators)?;
        let bands = compute_bands(&series, &self.settings.indicators)?;

        let trend_signal = classify_trend(current_price, &trend, &self.settings.signals);
        let band_signal = classify_bands(current_price, &bands);

        Ok(evaluate(
            entry_price,
            current_price,
            trend_signal,
            band_signal,
            &self.settings.exit,
        ))
    }

    /// Run one cycle from `state`
    pub async fn run(&self, state: PositionState) -> Result<CycleOutcome> {
        let (asset, entry_price) = match &state {
            PositionState::Cash => {
                tracing::info!("💵 Holding {}, nothing to evaluate", self.settings.quote_asset);
                return Ok(CycleOutcome::unchanged(state, CycleAction::InCash));
            }
            PositionState::Holding { asset, entry_price } => (asset.clone(), *entry_price),
        };

        let verdicts = self.evaluate_horizons(&asset, entry_price).await?;
        if !verdicts.confirms_exit() {
            return Ok(CycleOutcome::unchanged(state, CycleAction::Hold { verdicts }));
        }

        tracing::info!("🚨 Exit confirmed for {}, looking for a better market", asset);

        let best = self.scanner.best().await;
        if let Some(pick) = &best {
            if pick.asset == asset {
                tracing::info!("✓ {} is still the best market, staying", asset);
                return Ok(CycleOutcome::unchanged(state, CycleAction::StayInBest { asset }));
            }
        }

        let holding = self.valuation(&asset, entry_price).await?;

        let outcome = match best {
            Some(pick) => {
                let plan = self.orders.rotation(&holding, &pick.asset, pick.price)?;
                let next = PositionState::open(pick.asset.clone(), pick.price)?;
                CycleOutcome {
                    state: next,
                    action: CycleAction::Rotate {
                        from: asset,
                        to: pick.asset,
                    },
                    order: Some(plan),
                }
            }
            None => CycleOutcome {
                state: PositionState::Cash,
                action: CycleAction::ExitToCash { from: asset },
                order: Some(self.orders.exit_to_cash(&holding)?),
            },
        };

        tracing::info!("🔄 {:?}", outcome.action);
        if let Some(plan) = &outcome.order {
            for order in plan.orders() {
                notify_quietly(self.notifier.as_ref(), &order.summary()).await;
            }
        }

        Ok(outcome)
    }

    /// Load the stored position, run one cycle and save the result
    ///
    /// An empty store starts from the configured initial asset.
    pub async fn run_stored(&self, store: &dyn PositionStore) -> Result<CycleOutcome> {
        let state = match store.load().await? {
            Some(record) => PositionState::from_record(record, &self.settings.quote_asset)?,
            None => self.open_position(&self.settings.initial_asset).await?,
        };

        let outcome = self.run(state).await?;
        store
            .save(&outcome.state.to_record(&self.settings.quote_asset))
            .await?;

        Ok(outcome)
    }

    async fn valuation(&self, asset: &str, entry_price: f64) -> Result<HoldingValuation> {
        let balance = self.wallet.balance(asset).await?;
        let spot_price = self
            .source
            .get_spot_price(&self.settings.symbol_for(asset))
            .await?;

        Ok(HoldingValuation {
            asset: asset.to_string(),
            balance,
            spot_price,
            entry_price,
        })
    }
}
