// Decision engine: signal classification, exit evaluation, market ranking
pub mod decision;
pub mod ranker;
pub mod signals;

pub use decision::{evaluate, Confluence, ExitConfig, HorizonVerdicts, PriceZone};
pub use ranker::{select_best, MarketRanker};
pub use signals::{band_signal, classify_bands, classify_trend, trend_signal, SignalConfig};
