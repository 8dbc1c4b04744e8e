//! crates/night_ops_core/src/filter.rs
//!
//! The snapshot pill filters. Two independently toggleable dimensions
//! (temperature status, purge category) combine as OR within a dimension
//! and AND across dimensions. All counts are computed over the filtered
//! collections, never the unfiltered originals.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{NightTail, TemperatureLog};
use crate::status::{PurgeCategory, TempStatus};

/// How many filtered logs the recent-readings table shows.
pub const RECENT_LOGS_LIMIT: usize = 12;

//=========================================================================================
// Filter State
//=========================================================================================

/// The active pill selections. An empty set means the dimension is not
/// filtering at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub statuses: BTreeSet<TempStatus>,
    pub purge: BTreeSet<PurgeCategory>,
}

impl FilterState {
    /// Adds the status if absent, removes it if present.
    pub fn toggle_status(&mut self, status: TempStatus) {
        if !self.statuses.insert(status) {
            self.statuses.remove(&status);
        }
    }

    /// Adds the category if absent, removes it if present.
    pub fn toggle_purge(&mut self, category: PurgeCategory) {
        if !self.purge.insert(category) {
            self.purge.remove(&category);
        }
    }

    /// Resets both dimensions, restoring the unfiltered view.
    pub fn clear(&mut self) {
        self.statuses.clear();
        self.purge.clear();
    }

    pub fn is_active(&self) -> bool {
        !self.statuses.is_empty() || !self.purge.is_empty()
    }

    fn admits_status(&self, status: TempStatus) -> bool {
        self.statuses.is_empty() || self.statuses.contains(&status)
    }

    fn admits_purge(&self, category: PurgeCategory) -> bool {
        self.purge.is_empty() || self.purge.contains(&category)
    }
}

//=========================================================================================
// Filter Outcome
//=========================================================================================

/// Pill counts for the snapshot panel, all over the filtered collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotCounts {
    pub total_logs: usize,
    pub total_tails: usize,
    pub cold: usize,
    pub normal: usize,
    pub above_target: usize,
    pub critical_hot: usize,
    pub purged: usize,
    pub not_purged: usize,
    pub purge_unknown: usize,
}

impl SnapshotCounts {
    fn tally(tails: &[NightTail], logs: &[TemperatureLog]) -> Self {
        let status_count =
            |status: TempStatus| logs.iter().filter(|log| log.status == status).count();
        let purge_count = |category: PurgeCategory| {
            tails.iter().filter(|t| t.purge_category() == category).count()
        };
        Self {
            total_logs: logs.len(),
            total_tails: tails.len(),
            cold: status_count(TempStatus::Cold),
            normal: status_count(TempStatus::Normal),
            above_target: status_count(TempStatus::AboveTarget),
            critical_hot: status_count(TempStatus::CriticalHot),
            purged: purge_count(PurgeCategory::Purged),
            not_purged: purge_count(PurgeCategory::NotPurged),
            purge_unknown: purge_count(PurgeCategory::Unknown),
        }
    }
}

/// The filtered collections plus their counts.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub tails: Vec<NightTail>,
    pub logs: Vec<TemperatureLog>,
    pub counts: SnapshotCounts,
}

impl FilterOutcome {
    /// The first `limit` filtered logs in list order (newest-first). The
    /// filtered total stays available in `counts.total_logs`.
    pub fn recent_logs(&self, limit: usize) -> &[TemperatureLog] {
        &self.logs[..self.logs.len().min(limit)]
    }
}

/// Applies the pill filters to both collections independently.
///
/// Tails pass when their purge category is selected (or no purge pill is
/// active). Logs pass when their stored status is selected (or no status
/// pill is active) and the purge category of their plan entry, joined
/// case-insensitively over the full unfiltered tail list, is selected
/// (or no purge pill is active). With both sets empty this is the
/// identity.
pub fn apply_filters(
    tails: &[NightTail],
    logs: &[TemperatureLog],
    state: &FilterState,
) -> FilterOutcome {
    let filtered_tails: Vec<NightTail> = tails
        .iter()
        .filter(|t| state.admits_purge(t.purge_category()))
        .cloned()
        .collect();

    let filtered_logs: Vec<TemperatureLog> = logs
        .iter()
        .filter(|log| {
            state.admits_status(log.status)
                && state.admits_purge(PurgeCategory::for_tail_in(tails, &log.tail))
        })
        .cloned()
        .collect();

    let counts = SnapshotCounts::tally(&filtered_tails, &filtered_logs);
    FilterOutcome {
        tails: filtered_tails,
        logs: filtered_logs,
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewNightTail, NewTempLog, PurgeAnswer, TempValue};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn tail_with(tail: &str, answer: Option<PurgeAnswer>) -> NightTail {
        let mut entry = NewNightTail {
            tail: tail.to_string(),
            flight: None,
            gate: None,
            eta: None,
            heat_source: None,
            purged_drained: answer,
            notes: None,
        }
        .into_tail(Uuid::new_v4(), Utc.timestamp_opt(0, 0).unwrap());
        if answer == Some(PurgeAnswer::Yes) {
            entry.purged_at = Some(Utc.timestamp_opt(10, 0).unwrap());
        }
        entry
    }

    fn log_for(tail: &str, temp: f64) -> TemperatureLog {
        NewTempLog {
            tail: tail.to_string(),
            temp: TempValue::Number(temp),
            location: None,
            heat_source: None,
            notes: None,
            time: None,
        }
        .into_log(Uuid::new_v4(), Utc.timestamp_opt(0, 0).unwrap())
    }

    fn fixtures() -> (Vec<NightTail>, Vec<TemperatureLog>) {
        let tails = vec![
            tail_with("N1", Some(PurgeAnswer::Yes)),
            tail_with("N2", Some(PurgeAnswer::No)),
            tail_with("N3", None),
        ];
        // Newest-first, as the store returns them.
        let logs = vec![
            log_for("N1", 65.0),  // Cold, Purged
            log_for("N1", 75.0),  // Normal, Purged
            log_for("N2", 60.0),  // Cold, Not Purged
            log_for("N2", 95.0),  // Critical Hot, Not Purged
            log_for("N4", 85.0),  // Above Target, no plan entry
        ];
        (tails, logs)
    }

    #[test]
    fn empty_filters_are_the_identity() {
        let (tails, logs) = fixtures();
        let outcome = apply_filters(&tails, &logs, &FilterState::default());
        assert_eq!(outcome.tails, tails);
        assert_eq!(outcome.logs, logs);
        assert_eq!(outcome.counts.total_logs, 5);
        assert_eq!(outcome.counts.total_tails, 3);
    }

    #[test]
    fn toggling_adds_then_removes() {
        let mut state = FilterState::default();
        state.toggle_status(TempStatus::Cold);
        assert!(state.is_active());
        state.toggle_status(TempStatus::Cold);
        assert!(!state.is_active());

        state.toggle_purge(PurgeCategory::Purged);
        state.toggle_status(TempStatus::Normal);
        state.clear();
        assert_eq!(state, FilterState::default());
    }

    #[test]
    fn statuses_union_within_the_dimension() {
        let (tails, logs) = fixtures();
        let mut state = FilterState::default();
        state.toggle_status(TempStatus::Cold);
        state.toggle_status(TempStatus::Normal);

        let outcome = apply_filters(&tails, &logs, &state);
        assert_eq!(outcome.logs.len(), 3);
        assert!(outcome
            .logs
            .iter()
            .all(|log| matches!(log.status, TempStatus::Cold | TempStatus::Normal)));
        // The status dimension leaves tails alone.
        assert_eq!(outcome.tails.len(), 3);
    }

    #[test]
    fn dimensions_intersect_across() {
        let (tails, logs) = fixtures();
        let mut state = FilterState::default();
        state.toggle_status(TempStatus::Cold);
        state.toggle_purge(PurgeCategory::Purged);

        let outcome = apply_filters(&tails, &logs, &state);
        assert_eq!(outcome.logs.len(), 1);
        assert_eq!(outcome.logs[0].tail, "N1");
        assert_eq!(outcome.logs[0].status, TempStatus::Cold);
        assert_eq!(outcome.tails.len(), 1);
        assert_eq!(outcome.tails[0].tail, "N1");
    }

    #[test]
    fn logs_without_a_plan_entry_join_as_unknown() {
        let (tails, logs) = fixtures();
        let mut state = FilterState::default();
        state.toggle_purge(PurgeCategory::Unknown);

        let outcome = apply_filters(&tails, &logs, &state);
        // N4 has no plan entry, N3's answer is unset.
        assert_eq!(outcome.logs.len(), 1);
        assert_eq!(outcome.logs[0].tail, "N4");
        assert_eq!(outcome.tails.len(), 1);
        assert_eq!(outcome.tails[0].tail, "N3");
    }

    #[test]
    fn counts_come_from_the_filtered_collections() {
        let (tails, logs) = fixtures();
        let mut state = FilterState::default();
        state.toggle_purge(PurgeCategory::NotPurged);

        let outcome = apply_filters(&tails, &logs, &state);
        assert_eq!(outcome.counts.total_tails, 1);
        assert_eq!(outcome.counts.total_logs, 2);
        assert_eq!(outcome.counts.cold, 1);
        assert_eq!(outcome.counts.critical_hot, 1);
        assert_eq!(outcome.counts.normal, 0);
        assert_eq!(outcome.counts.purged, 0);
        assert_eq!(outcome.counts.not_purged, 1);
        assert_eq!(outcome.counts.purge_unknown, 0);
    }

    #[test]
    fn recent_view_truncates_but_reports_the_total() {
        let tails = vec![tail_with("N1", None)];
        let logs: Vec<TemperatureLog> = (0..20).map(|i| log_for("N1", 70.0 + i as f64)).collect();

        let outcome = apply_filters(&tails, &logs, &FilterState::default());
        let recent = outcome.recent_logs(RECENT_LOGS_LIMIT);
        assert_eq!(recent.len(), 12);
        assert_eq!(outcome.counts.total_logs, 20);
        // Truncation keeps list order from the front (newest-first).
        assert_eq!(recent[0].id, logs[0].id);
    }
}
