//! In-process reading store.

use super::{ReadingStore, StoreError};
use crate::model::Reading;

/// Keeps readings in a `Vec`. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStore {
    readings: Vec<Reading>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored readings sorted by timestamp, stable on ties.
    fn chronological(&self) -> Vec<&Reading> {
        let mut ordered: Vec<&Reading> = self.readings.iter().collect();
        ordered.sort_by_key(|r| r.timestamp);
        ordered
    }
}

impl ReadingStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    fn insert(&mut self, reading: &Reading) -> Result<(), StoreError> {
        self.readings.push(reading.clone());
        Ok(())
    }

    fn latest(&mut self) -> Result<Option<Reading>, StoreError> {
        Ok(self.chronological().last().map(|r| (*r).clone()))
    }

    fn recent(&mut self, limit: usize) -> Result<Vec<Reading>, StoreError> {
        let ordered = self.chronological();
        let skip = ordered.len().saturating_sub(limit);
        Ok(ordered.into_iter().skip(skip).cloned().collect())
    }

    fn count(&mut self) -> Result<u64, StoreError> {
        Ok(self.readings.len() as u64)
    }

    fn close(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
