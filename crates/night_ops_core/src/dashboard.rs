//! crates/night_ops_core/src/dashboard.rs
//!
//! The dashboard read model. A pure projection over the current plan and
//! log collections, recomputed per request; nothing here is cached or
//! stored. Stored log statuses are used as-is, never reclassified.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{NightTail, PurgeAnswer, ShiftKey, TailStatus, TemperatureLog};
use crate::filter::{apply_filters, FilterState, SnapshotCounts, RECENT_LOGS_LIMIT};
use crate::series::{build_series, SeriesPoint};
use crate::status::TempStatus;

const DASH: &str = "—";
const NO_GATE: &str = "No gate";
const NO_HEAT_SOURCE: &str = "No heat source";

//=========================================================================================
// View Model
//=========================================================================================

/// Everything one dashboard render needs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub station: String,
    pub night_date: NaiveDate,
    pub filters: FilterState,
    pub counts: SnapshotCounts,
    /// Tonight's plan entries that pass the purge filter.
    pub tails: Vec<TailRow>,
    /// Filtered readings, truncated for display.
    pub recent_logs: Vec<LogRow>,
    /// Total filtered readings, independent of the display truncation.
    pub recent_total: usize,
    /// Per-tail history cards. Always the full unfiltered history.
    pub charts: Vec<TailChart>,
}

/// One row of the filtered plan table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TailRow {
    pub id: Uuid,
    pub tail: String,
    pub gate: String,
    pub heat_source: String,
    pub purge_label: String,
    pub in_time: String,
    pub status: TailStatus,
    /// Latest reading over the unfiltered logs, shown regardless of the
    /// active filters.
    pub latest: Option<LatestReading>,
}

/// The newest reading for a tail, for summary cards and table cells.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestReading {
    pub temp_display: String,
    pub status: TempStatus,
    pub time: Option<String>,
}

/// One row of the recent-readings table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRow {
    pub id: Uuid,
    pub tail: String,
    pub temp_display: String,
    pub status: TempStatus,
    pub location: String,
    pub heat_source: String,
    pub time: String,
    pub purge_label: String,
    pub notes: String,
}

/// One history card with its chart series.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TailChart {
    pub id: Uuid,
    pub tail: String,
    pub gate: String,
    pub heat_source: String,
    pub latest: Option<LatestReading>,
    pub points: Vec<SeriesPoint>,
    /// False when no point carries a numeric temperature; the consumer
    /// renders a no-data state instead of an empty chart.
    pub has_data: bool,
}

//=========================================================================================
// Projection
//=========================================================================================

/// Composes the full dashboard view for one shift.
pub fn build_dashboard(
    shift: &ShiftKey,
    tails: &[NightTail],
    logs: &[TemperatureLog],
    filters: &FilterState,
) -> DashboardView {
    let outcome = apply_filters(tails, logs, filters);

    let tail_rows = outcome
        .tails
        .iter()
        .map(|t| TailRow {
            id: t.id,
            tail: t.tail.clone(),
            gate: text_or(&t.gate, DASH),
            heat_source: text_or(&t.heat_source, DASH),
            purge_label: purge_label(t),
            in_time: t
                .in_time
                .map(|at| at.format("%H:%M").to_string())
                .unwrap_or_else(|| "Waiting".to_string()),
            status: t.status(),
            latest: latest_reading(logs, &t.tail),
        })
        .collect();

    let recent_logs = outcome
        .recent_logs(RECENT_LOGS_LIMIT)
        .iter()
        .map(|log| LogRow {
            id: log.id,
            tail: log.tail.clone(),
            temp_display: log.temp.display(),
            status: log.status,
            location: text_or(&log.location, DASH),
            heat_source: text_or(&log.heat_source, DASH),
            time: log.time.clone().unwrap_or_else(|| DASH.to_string()),
            purge_label: tails
                .iter()
                .find(|t| t.matches_tail(&log.tail))
                .map(purge_label)
                .unwrap_or_else(|| "N/A".to_string()),
            notes: text_or(&log.notes, DASH),
        })
        .collect();

    // History cards cover every plan entry and ignore the filters.
    let charts = tails
        .iter()
        .map(|t| {
            let points = build_series(logs, &t.tail);
            let has_data = points.iter().any(|p| p.temp.is_some());
            TailChart {
                id: t.id,
                tail: t.tail.clone(),
                gate: text_or(&t.gate, NO_GATE),
                heat_source: text_or(&t.heat_source, NO_HEAT_SOURCE),
                latest: latest_reading(logs, &t.tail),
                points,
                has_data,
            }
        })
        .collect();

    DashboardView {
        station: shift.station.clone(),
        night_date: shift.night_date,
        filters: filters.clone(),
        counts: outcome.counts,
        tails: tail_rows,
        recent_logs,
        recent_total: outcome.counts.total_logs,
        charts,
    }
}

/// Latest reading for a tail: the first match in the newest-first list.
fn latest_reading(logs: &[TemperatureLog], tail: &str) -> Option<LatestReading> {
    logs.iter().find(|log| log.matches_tail(tail)).map(|log| LatestReading {
        temp_display: log.temp.display(),
        status: log.status,
        time: log.time.clone(),
    })
}

fn purge_label(tail: &NightTail) -> String {
    match (tail.purged_drained, tail.purged_at) {
        (Some(PurgeAnswer::Yes), Some(at)) => format!("Yes · {}", at.format("%H:%M")),
        (Some(answer), _) => answer.as_str().to_string(),
        (None, _) => "N/A".to_string(),
    }
}

fn text_or(value: &Option<String>, fallback: &str) -> String {
    value
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(fallback)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewNightTail, NewTempLog, TempValue};
    use crate::status::PurgeCategory;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn shift() -> ShiftKey {
        ShiftKey::new("OMA", NaiveDate::from_ymd_opt(2026, 8, 6).unwrap())
    }

    fn plan(tail: &str, gate: Option<&str>) -> NightTail {
        NewNightTail {
            tail: tail.to_string(),
            flight: None,
            gate: gate.map(str::to_string),
            eta: None,
            heat_source: None,
            purged_drained: None,
            notes: None,
        }
        .into_tail(Uuid::new_v4(), Utc.timestamp_opt(0, 0).unwrap())
    }

    fn reading(tail: &str, temp: f64, time: &str) -> TemperatureLog {
        NewTempLog {
            tail: tail.to_string(),
            temp: TempValue::Number(temp),
            location: None,
            heat_source: None,
            notes: None,
            time: Some(time.to_string()),
        }
        .into_log(Uuid::new_v4(), Utc.timestamp_opt(0, 0).unwrap())
    }

    #[test]
    fn missing_fields_render_placeholders() {
        let tails = vec![plan("N1", None)];
        let view = build_dashboard(&shift(), &tails, &[], &FilterState::default());

        assert_eq!(view.tails[0].gate, "—");
        assert_eq!(view.tails[0].heat_source, "—");
        assert_eq!(view.tails[0].purge_label, "N/A");
        assert_eq!(view.tails[0].in_time, "Waiting");
        assert!(view.tails[0].latest.is_none());

        assert_eq!(view.charts[0].gate, "No gate");
        assert_eq!(view.charts[0].heat_source, "No heat source");
        assert!(!view.charts[0].has_data);
        assert!(view.charts[0].points.is_empty());
    }

    #[test]
    fn latest_reading_and_charts_ignore_filters() {
        let mut purged = plan("N1", Some("A12"));
        purged.apply_purge(Utc.timestamp_opt(60, 0).unwrap());
        let tails = vec![purged, plan("N2", None)];
        // Newest-first: N1's latest is Cold, its history also has Normal.
        let logs = vec![
            reading("N1", 65.0, "10:05"),
            reading("N1", 75.0, "10:00"),
            reading("N2", 72.0, "09:55"),
        ];

        // Filter down to Normal readings from purged tails only.
        let mut filters = FilterState::default();
        filters.toggle_status(TempStatus::Normal);
        filters.toggle_purge(PurgeCategory::Purged);

        let view = build_dashboard(&shift(), &tails, &logs, &filters);

        // The table keeps only the purged tail and the one Normal reading.
        assert_eq!(view.tails.len(), 1);
        assert_eq!(view.recent_logs.len(), 1);
        assert_eq!(view.recent_total, 1);

        // But the latest reading is still the unfiltered newest (Cold).
        let latest = view.tails[0].latest.as_ref().unwrap();
        assert_eq!(latest.status, TempStatus::Cold);
        assert_eq!(latest.temp_display, "65°F");

        // And every plan entry keeps its full history card.
        assert_eq!(view.charts.len(), 2);
        assert_eq!(view.charts[0].points.len(), 2);
        assert_eq!(view.charts[0].points[0].time, "10:00");
        assert_eq!(view.charts[1].points.len(), 1);
    }

    #[test]
    fn purge_labels_include_the_stamp_time() {
        let mut tail = plan("N1", None);
        tail.apply_purge(Utc.with_ymd_and_hms(2026, 8, 6, 21, 4, 0).unwrap());
        let tails = vec![tail];
        let logs = vec![reading("N1", 70.0, "21:10")];

        let view = build_dashboard(&shift(), &tails, &logs, &FilterState::default());
        assert_eq!(view.tails[0].purge_label, "Yes · 21:04");
        assert_eq!(view.recent_logs[0].purge_label, "Yes · 21:04");
    }

    #[test]
    fn recent_table_truncates_to_the_display_limit() {
        let tails = vec![plan("N1", None)];
        let logs: Vec<TemperatureLog> = (0..15)
            .map(|i| reading("N1", 70.0 + i as f64, "22:00"))
            .collect();

        let view = build_dashboard(&shift(), &tails, &logs, &FilterState::default());
        assert_eq!(view.recent_logs.len(), RECENT_LOGS_LIMIT);
        assert_eq!(view.recent_total, 15);
        assert_eq!(view.counts.total_logs, 15);
    }

    #[test]
    fn raw_temperatures_render_their_original_text() {
        let tails = vec![plan("N1", None)];
        let logs = vec![TemperatureLog {
            temp: TempValue::Raw("no reading".to_string()),
            status: TempStatus::Unknown,
            ..reading("N1", 0.0, "23:00")
        }];

        let view = build_dashboard(&shift(), &tails, &logs, &FilterState::default());
        assert_eq!(view.recent_logs[0].temp_display, "no reading");
        let latest = view.tails[0].latest.as_ref().unwrap();
        assert_eq!(latest.temp_display, "no reading");
    }
}
