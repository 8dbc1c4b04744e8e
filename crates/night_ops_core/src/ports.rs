//! crates/night_ops_core/src/ports.rs
//!
//! The storage contract the core depends on. Concrete backends (PostgREST,
//! in-memory) live in the service crate and implement this trait; the core
//! never sees their wire schemas or clients.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{NewNightTail, NewTempLog, NightTail, ShiftKey, TemperatureLog};

/// Error type shared by all storage operations, abstracting over the
/// specific backend failures.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// An update addressed an entity that no longer exists. Surfaced as a
    /// no-op with a message, never fatal.
    #[error("not found: {0}")]
    NotFound(String),
    /// The backend call itself failed. Existing in-memory state is left
    /// untouched; nothing is partially applied.
    #[error("storage backend error: {0}")]
    Backend(String),
    /// The backend is not configured or reachable at all.
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// A convenience alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

/// The overnight-tracking storage port.
///
/// Every implementation guarantees newest-first ordering for both list
/// operations (by creation time for plan entries, recording time for
/// logs). The read-model code relies on exactly that guarantee: the
/// latest reading is the first list element and chart series are built
/// by full reversal.
#[async_trait]
pub trait NightOpsStore: Send + Sync {
    // --- Plan entries ---
    async fn list_night_tails(&self, shift: &ShiftKey) -> PortResult<Vec<NightTail>>;

    async fn create_night_tail(
        &self,
        shift: &ShiftKey,
        entry: NewNightTail,
    ) -> PortResult<NightTail>;

    /// Stamps the arrival time; the first stamp wins.
    async fn mark_in(&self, shift: &ShiftKey, id: Uuid, at: DateTime<Utc>)
        -> PortResult<NightTail>;

    /// Records the purge/drain action. Idempotent: an already purged tail
    /// keeps its original timestamp.
    async fn record_purge(
        &self,
        shift: &ShiftKey,
        id: Uuid,
        at: DateTime<Utc>,
    ) -> PortResult<NightTail>;

    async fn update_heat_source(
        &self,
        shift: &ShiftKey,
        id: Uuid,
        heat_source: Option<String>,
    ) -> PortResult<NightTail>;

    /// Shift reset: bulk-deletes the plan entries for the shift and
    /// returns how many were removed. Temperature logs are immutable
    /// history and are not touched.
    async fn clear_night(&self, shift: &ShiftKey) -> PortResult<u64>;

    // --- Temperature logs ---
    async fn list_temp_logs(&self, shift: &ShiftKey) -> PortResult<Vec<TemperatureLog>>;

    async fn create_temp_log(
        &self,
        shift: &ShiftKey,
        entry: NewTempLog,
    ) -> PortResult<TemperatureLog>;
}
