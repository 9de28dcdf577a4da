use async_trait::async_trait;
use chrono::Utc;
use rotabot::api::{KlineInterval, PriceSource};
use rotabot::config::Settings;
use rotabot::execution::{
    CycleAction, MemoryPositionStore, Notifier, OrderPlan, PaperWallet, PositionStore,
    RotationCycle,
};
use rotabot::{Candle, PositionRecord, PositionState, RotabotError, TradeSide};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

const LEN: usize = 300;

struct FakeSource {
    closes: HashMap<String, Vec<f64>>,
}

impl FakeSource {
    fn new(markets: &[(&str, Vec<f64>)]) -> Self {
        Self {
            closes: markets
                .iter()
                .map(|(symbol, closes)| (symbol.to_string(), closes.clone()))
                .collect(),
        }
    }
}

#[async_trait]
impl PriceSource for FakeSource {
    async fn get_prices(
        &self,
        symbol: &str,
        _interval: KlineInterval,
        lookback: usize,
    ) -> rotabot::Result<Vec<Candle>> {
        let closes = self
            .closes
            .get(symbol)
            .ok_or_else(|| RotabotError::data_unavailable(symbol, "no such market"))?;
        let start = closes.len().saturating_sub(lookback);
        Ok(closes[start..]
            .iter()
            .map(|&close| Candle {
                symbol: symbol.to_string(),
                timestamp: Utc::now(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 10.0,
            })
            .collect())
    }

    async fn get_spot_price(&self, symbol: &str) -> rotabot::Result<f64> {
        self.closes
            .get(symbol)
            .and_then(|closes| closes.last().copied())
            .ok_or_else(|| RotabotError::data_unavailable(symbol, "no such market"))
    }
}

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, message: &str) -> rotabot::Result<()> {
        self.messages.lock().unwrap().push(message.to_string());
        Ok(())
    }
}

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _message: &str) -> rotabot::Result<()> {
        Err(RotabotError::InvariantViolation("channel closed".to_string()))
    }
}

/// RSI 100, flat bands: HOLD on both axes
fn flat(price: f64) -> Vec<f64> {
    vec![price; LEN]
}

/// RSI 0 and a close under the lower band: BUY on bands, HOLD on trend
fn flat_then_drop(price: f64, last: f64) -> Vec<f64> {
    let mut closes = vec![price; LEN - 1];
    closes.push(last);
    closes
}

/// Close above the upper band: SELL on bands
fn climbing(start: f64) -> Vec<f64> {
    (0..LEN).map(|i| start + i as f64).collect()
}

fn settings() -> Settings {
    Settings {
        watchlist: vec!["ETHUSDT".to_string(), "SOLUSDT".to_string()],
        ..Default::default()
    }
}

fn cycle_with(
    source: FakeSource,
    wallet: PaperWallet,
    notifier: Arc<dyn Notifier>,
) -> RotationCycle {
    RotationCycle::new(settings(), Arc::new(source), Arc::new(wallet), notifier)
}

#[tokio::test]
async fn test_cash_position_does_nothing() {
    let source = FakeSource::new(&[("ETHUSDT", flat(3000.0))]);
    let cycle = cycle_with(source, PaperWallet::new(), Arc::new(RecordingNotifier::default()));

    let outcome = cycle.run(PositionState::Cash).await.unwrap();

    assert_eq!(outcome.action, CycleAction::InCash);
    assert_eq!(outcome.state, PositionState::Cash);
    assert!(outcome.order.is_none());
}

#[tokio::test]
async fn test_holds_when_exit_not_confirmed() {
    let source = FakeSource::new(&[("ETHUSDT", flat(3000.0)), ("SOLUSDT", flat(150.0))]);
    let notifier = Arc::new(RecordingNotifier::default());
    let cycle = cycle_with(source, PaperWallet::new(), notifier.clone());

    let state = PositionState::open("ETH", 3000.0).unwrap();
    let outcome = cycle.run(state.clone()).await.unwrap();

    match outcome.action {
        CycleAction::Hold { verdicts } => assert!(!verdicts.confirms_exit()),
        other => panic!("expected hold, got {:?}", other),
    }
    assert_eq!(outcome.state, state);
    assert!(outcome.order.is_none());
    assert!(notifier.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_rotates_into_lowest_rsi_market() {
    let source = FakeSource::new(&[
        ("ETHUSDT", flat(3000.0)),
        ("SOLUSDT", flat_then_drop(150.0, 140.0)),
    ]);
    let wallet = PaperWallet::new().with_balance("ETH", 2.0);
    let notifier = Arc::new(RecordingNotifier::default());
    let cycle = cycle_with(source, wallet, notifier.clone());

    // +7% since entry: take-profit on both horizons
    let state = PositionState::open("ETH", 2800.0).unwrap();
    let outcome = cycle.run(state).await.unwrap();

    assert_eq!(
        outcome.action,
        CycleAction::Rotate {
            from: "ETH".to_string(),
            to: "SOL".to_string()
        }
    );
    assert_eq!(outcome.state, PositionState::open("SOL", 140.0).unwrap());

    let Some(OrderPlan::Rotate { sell, buy }) = outcome.order else {
        panic!("expected a rotation order");
    };
    assert_eq!(sell.symbol, "ETHUSDT");
    assert_eq!(sell.side, TradeSide::Sell);
    assert_eq!(sell.profit, Some(400.0));
    assert_eq!(buy.symbol, "SOLUSDT");
    assert_eq!(buy.side, TradeSide::Buy);
    assert_eq!(buy.quantity.to_string(), "42.8571");

    assert_eq!(notifier.messages.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_stays_when_held_asset_is_best() {
    let source = FakeSource::new(&[
        ("ETHUSDT", flat_then_drop(3000.0, 2900.0)),
        ("SOLUSDT", flat(150.0)),
    ]);
    let wallet = PaperWallet::new().with_balance("ETH", 1.0);
    let cycle = cycle_with(source, wallet, Arc::new(RecordingNotifier::default()));

    let state = PositionState::open("ETH", 2800.0).unwrap();
    let outcome = cycle.run(state.clone()).await.unwrap();

    assert_eq!(
        outcome.action,
        CycleAction::StayInBest {
            asset: "ETH".to_string()
        }
    );
    assert_eq!(outcome.state, state);
    assert!(outcome.order.is_none());
}

#[tokio::test]
async fn test_exits_to_cash_when_nothing_eligible() {
    let source = FakeSource::new(&[("ETHUSDT", climbing(2000.0)), ("SOLUSDT", climbing(100.0))]);
    let wallet = PaperWallet::new().with_balance("ETH", 1.5);
    let notifier = Arc::new(RecordingNotifier::default());
    let cycle = cycle_with(source, wallet, notifier.clone());

    let state = PositionState::open("ETH", 2000.0).unwrap();
    let outcome = cycle.run(state).await.unwrap();

    assert_eq!(
        outcome.action,
        CycleAction::ExitToCash {
            from: "ETH".to_string()
        }
    );
    assert_eq!(outcome.state, PositionState::Cash);
    assert!(matches!(outcome.order, Some(OrderPlan::ExitToCash { .. })));
    assert_eq!(notifier.messages.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_notifier_failure_does_not_change_decision() {
    let source = FakeSource::new(&[("ETHUSDT", climbing(2000.0)), ("SOLUSDT", climbing(100.0))]);
    let wallet = PaperWallet::new().with_balance("ETH", 1.0);
    let cycle = cycle_with(source, wallet, Arc::new(FailingNotifier));

    let state = PositionState::open("ETH", 2000.0).unwrap();
    let outcome = cycle.run(state).await.unwrap();

    assert_eq!(outcome.state, PositionState::Cash);
}

#[tokio::test]
async fn test_empty_balance_is_account_error() {
    let source = FakeSource::new(&[
        ("ETHUSDT", flat(3000.0)),
        ("SOLUSDT", flat_then_drop(150.0, 140.0)),
    ]);
    let cycle = cycle_with(source, PaperWallet::new(), Arc::new(RecordingNotifier::default()));

    let state = PositionState::open("ETH", 2800.0).unwrap();
    assert!(matches!(
        cycle.run(state).await,
        Err(RotabotError::Account { .. })
    ));
}

#[tokio::test]
async fn test_missing_market_data_fails_the_cycle() {
    let source = FakeSource::new(&[("SOLUSDT", flat(150.0))]);
    let cycle = cycle_with(source, PaperWallet::new(), Arc::new(RecordingNotifier::default()));

    let state = PositionState::open("ETH", 3000.0).unwrap();
    assert!(matches!(
        cycle.run(state).await,
        Err(RotabotError::DataUnavailable { .. })
    ));
}

#[tokio::test]
async fn test_run_stored_bootstraps_initial_asset() {
    let source = FakeSource::new(&[("ETHUSDT", flat(3000.0)), ("SOLUSDT", flat(150.0))]);
    let cycle = cycle_with(source, PaperWallet::new(), Arc::new(RecordingNotifier::default()));
    let store = MemoryPositionStore::new();

    let outcome = cycle.run_stored(&store).await.unwrap();
    assert!(matches!(outcome.action, CycleAction::Hold { .. }));

    let saved = store.load().await.unwrap().unwrap();
    assert_eq!(
        saved,
        PositionRecord {
            asset: "ETH".to_string(),
            entry_price: Some(3000.0)
        }
    );
}

#[tokio::test]
async fn test_run_stored_rejects_cash_with_entry_price() {
    let source = FakeSource::new(&[("ETHUSDT", flat(3000.0))]);
    let cycle = cycle_with(source, PaperWallet::new(), Arc::new(RecordingNotifier::default()));
    let store = MemoryPositionStore::with_record(PositionRecord {
        asset: "USDT".to_string(),
        entry_price: Some(1.0),
    });

    assert!(matches!(
        cycle.run_stored(&store).await,
        Err(RotabotError::InvariantViolation(_))
    ));
}

#[tokio::test]
async fn test_resolve_position_rejects_cash_with_entry_price() {
    let source = FakeSource::new(&[("ETHUSDT", flat(3000.0))]);
    let cycle = cycle_with(source, PaperWallet::new(), Arc::new(RecordingNotifier::default()));

    assert!(matches!(
        cycle.resolve_position("USDT", Some(1.0)).await,
        Err(RotabotError::InvariantViolation(_))
    ));
}

#[tokio::test]
async fn test_resolve_position_variants() {
    let source = FakeSource::new(&[("ETHUSDT", flat(3000.0))]);
    let cycle = cycle_with(source, PaperWallet::new(), Arc::new(RecordingNotifier::default()));

    assert_eq!(
        cycle.resolve_position("USDT", None).await.unwrap(),
        PositionState::Cash
    );
    assert_eq!(
        cycle.resolve_position("ETH", Some(2800.0)).await.unwrap(),
        PositionState::open("ETH", 2800.0).unwrap()
    );
    assert_eq!(
        cycle.resolve_position("ETH", None).await.unwrap(),
        PositionState::open("ETH", 3000.0).unwrap()
    );
    assert!(cycle.resolve_position("ETH", Some(-1.0)).await.is_err());
}

