// Collaborators, order construction and the rotation cycle
pub mod cycle;
pub mod notifier;
pub mod order;
pub mod scanner;
pub mod store;
pub mod wallet;

pub use cycle::{CycleAction, CycleOutcome, RotationCycle};
pub use notifier::{notify_quietly, Notifier, TracingNotifier};
pub use order::{HoldingValuation, OrderFactory, OrderPlan, TradeOrder};
pub use scanner::{fetch_series, MarketScanner};
pub use store::{MemoryPositionStore, PositionStore};
pub use wallet::{PaperWallet, Wallet};
