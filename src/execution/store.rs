use crate::error::RotabotError;
use crate::models::PositionRecord;
use crate::Result;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Atomic read/write of the single position record
#[async_trait]
pub trait PositionStore: Send + Sync {
    /// `None` when nothing has been saved yet
    async fn load(&self) -> Result<Option<PositionRecord>>;

    async fn save(&self, record: &PositionRecord) -> Result<()>;
}

/// Position record held in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryPositionStore {
    record: Arc<Mutex<Option<PositionRecord>>>,
}

impl MemoryPositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_record(record: PositionRecord) -> Self {
        Self {
            record: Arc::new(Mutex::new(Some(record))),
        }
    }
}

fn poisoned(e: impl ToString) -> RotabotError {
    RotabotError::InvariantViolation(format!("position store lock poisoned: {}", e.to_string()))
}

#[async_trait]
impl PositionStore for MemoryPositionStore {
    async fn load(&self) -> Result<Option<PositionRecord>> {
        let record = self.record.lock().map_err(poisoned)?;
        Ok(record.clone())
    }

    async fn save(&self, record: &PositionRecord) -> Result<()> {
        let mut slot = self.record.lock().map_err(poisoned)?;
        *slot = Some(record.clone());
        Ok(())
    }
}
