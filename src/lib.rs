// Core modules
pub mod api;
pub mod config;
pub mod error;
pub mod execution;
pub mod indicators;
pub mod models;
pub mod strategy;

// Re-export commonly used types
pub use api::{BinanceClient, KlineInterval, PriceSource};
pub use config::Settings;
pub use error::RotabotError;
pub use models::*;

pub type Result<T> = std::result::Result<T, RotabotError>;
