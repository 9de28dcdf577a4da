use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Balance lookup for order sizing
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Free balance of an asset
    async fn balance(&self, asset: &str) -> Result<f64>;
}

/// In-memory balances, for dry runs and tests
///
/// A poisoned lock is recovered on both reads and writes; a plain map of
/// balances has no partial state to protect.
#[derive(Debug, Clone, Default)]
pub struct PaperWallet {
    balances: Arc<RwLock<HashMap<String, f64>>>,
}

impl PaperWallet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(self, asset: impl Into<String>, quantity: f64) -> Self {
        self.set_balance(asset, quantity);
        self
    }

    pub fn set_balance(&self, asset: impl Into<String>, quantity: f64) {
        self.balances
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(asset.into(), quantity);
    }
}

#[async_trait]
impl Wallet for PaperWallet {
    async fn balance(&self, asset: &str) -> Result<f64> {
        let balances = self.balances.read().unwrap_or_else(PoisonError::into_inner);
        Ok(balances.get(asset).copied().unwrap_or(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paper_wallet_balances() {
        let wallet = PaperWallet::new().with_balance("ETH", 1.5);

        assert_eq!(tokio_test::block_on(wallet.balance("ETH")).unwrap(), 1.5);
        assert_eq!(tokio_test::block_on(wallet.balance("SOL")).unwrap(), 0.0);

        wallet.set_balance("ETH", 0.25);
        assert_eq!(tokio_test::block_on(wallet.balance("ETH")).unwrap(), 0.25);
    }

    #[test]
    fn test_poisoned_lock_keeps_reads_and_writes_consistent() {
        let wallet = PaperWallet::new().with_balance("ETH", 1.0);

        let poisoner = wallet.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.balances.write().unwrap();
            panic!("poison the balance lock");
        })
        .join();
        assert!(wallet.balances.is_poisoned());

        wallet.set_balance("ETH", 2.0);
        assert_eq!(tokio_test::block_on(wallet.balance("ETH")).unwrap(), 2.0);
    }
}
