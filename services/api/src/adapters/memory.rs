//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the storage port. Tables are keyed by
//! the shift partition key and kept newest-first, matching the ordering
//! guarantee the PostgREST adapter gets from its `order=...desc` queries.
//! This is the default backend for local use and the one the tests run
//! against.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use night_ops_core::domain::{NewNightTail, NewTempLog, NightTail, ShiftKey, TemperatureLog};
use night_ops_core::ports::{NightOpsStore, PortError, PortResult};

#[derive(Default)]
struct Shifts {
    night_tails: HashMap<String, Vec<NightTail>>,
    temp_logs: HashMap<String, Vec<TemperatureLog>>,
}

/// A storage adapter holding everything in memory.
pub struct MemoryStore {
    inner: RwLock<Shifts>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Shifts::default()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(id: Uuid) -> PortError {
    PortError::NotFound(format!("Night tail {} not found", id))
}

#[async_trait]
impl NightOpsStore for MemoryStore {
    async fn list_night_tails(&self, shift: &ShiftKey) -> PortResult<Vec<NightTail>> {
        let shifts = self.inner.read().await;
        Ok(shifts
            .night_tails
            .get(&shift.partition_key())
            .cloned()
            .unwrap_or_default())
    }

    async fn create_night_tail(
        &self,
        shift: &ShiftKey,
        entry: NewNightTail,
    ) -> PortResult<NightTail> {
        let tail = entry.into_tail(Uuid::new_v4(), Utc::now());
        let mut shifts = self.inner.write().await;
        shifts
            .night_tails
            .entry(shift.partition_key())
            .or_default()
            .insert(0, tail.clone());
        Ok(tail)
    }

    async fn mark_in(
        &self,
        shift: &ShiftKey,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> PortResult<NightTail> {
        let mut shifts = self.inner.write().await;
        let tail = shifts
            .night_tails
            .get_mut(&shift.partition_key())
            .and_then(|entries| entries.iter_mut().find(|t| t.id == id))
            .ok_or_else(|| not_found(id))?;
        tail.mark_in(at);
        Ok(tail.clone())
    }

    async fn record_purge(
        &self,
        shift: &ShiftKey,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> PortResult<NightTail> {
        let mut shifts = self.inner.write().await;
        let tail = shifts
            .night_tails
            .get_mut(&shift.partition_key())
            .and_then(|entries| entries.iter_mut().find(|t| t.id == id))
            .ok_or_else(|| not_found(id))?;
        tail.apply_purge(at);
        Ok(tail.clone())
    }

    async fn update_heat_source(
        &self,
        shift: &ShiftKey,
        id: Uuid,
        heat_source: Option<String>,
    ) -> PortResult<NightTail> {
        let mut shifts = self.inner.write().await;
        let tail = shifts
            .night_tails
            .get_mut(&shift.partition_key())
            .and_then(|entries| entries.iter_mut().find(|t| t.id == id))
            .ok_or_else(|| not_found(id))?;
        tail.heat_source = heat_source;
        Ok(tail.clone())
    }

    async fn clear_night(&self, shift: &ShiftKey) -> PortResult<u64> {
        let mut shifts = self.inner.write().await;
        let removed = shifts
            .night_tails
            .remove(&shift.partition_key())
            .map(|entries| entries.len() as u64)
            .unwrap_or(0);
        Ok(removed)
    }

    async fn list_temp_logs(&self, shift: &ShiftKey) -> PortResult<Vec<TemperatureLog>> {
        let shifts = self.inner.read().await;
        Ok(shifts
            .temp_logs
            .get(&shift.partition_key())
            .cloned()
            .unwrap_or_default())
    }

    async fn create_temp_log(
        &self,
        shift: &ShiftKey,
        entry: NewTempLog,
    ) -> PortResult<TemperatureLog> {
        let log = entry.into_log(Uuid::new_v4(), Utc::now());
        let mut shifts = self.inner.write().await;
        shifts
            .temp_logs
            .entry(shift.partition_key())
            .or_default()
            .insert(0, log.clone());
        Ok(log)
    }
}
