//! crates/night_ops_core/src/series.rs
//!
//! Chart series reconstruction. Historical charts always show the full
//! reading history for a tail, regardless of the active snapshot filters.

use serde::Serialize;

use crate::domain::TemperatureLog;
use crate::status::TempStatus;

/// One plotted reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// Time label for the axis; `"#3"` positional fallback when the log
    /// carries no label.
    pub time: String,
    /// Parsed temperature, `None` when the stored value is not numeric.
    /// The chart skips the point; nothing is dropped from the series.
    pub temp: Option<f64>,
    pub status: TempStatus,
}

/// Rebuilds the chronological (oldest to newest) series for one tail.
///
/// The input list is newest-first, the order the store guarantees, so the
/// matching subsequence is reversed wholesale. Timestamps are never
/// parsed or compared here; list order is the only ordering source. A
/// tail with no matching logs yields an empty series.
pub fn build_series(logs: &[TemperatureLog], tail: &str) -> Vec<SeriesPoint> {
    logs.iter()
        .filter(|log| log.matches_tail(tail))
        .rev()
        .enumerate()
        .map(|(index, log)| SeriesPoint {
            time: log
                .time
                .clone()
                .filter(|label| !label.is_empty())
                .unwrap_or_else(|| format!("#{}", index + 1)),
            temp: log.temp.as_f64(),
            status: log.status,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TempValue;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn log(tail: &str, temp: TempValue, time: Option<&str>) -> TemperatureLog {
        let status = match &temp {
            TempValue::Number(v) => TempStatus::classify(*v),
            TempValue::Raw(s) => TempStatus::classify_str(s),
        };
        TemperatureLog {
            id: Uuid::new_v4(),
            tail: tail.to_string(),
            temp,
            status,
            location: None,
            heat_source: None,
            notes: None,
            time: time.map(str::to_string),
            recorded_at: Utc.timestamp_opt(0, 0).unwrap(),
        }
    }

    #[test]
    fn newest_first_storage_becomes_chronological() {
        // Stored newest-first: 80 at 10:05, then 75 at 10:00.
        let logs = vec![
            log("N1", TempValue::Number(80.0), Some("10:05")),
            log("N1", TempValue::Number(75.0), Some("10:00")),
        ];

        let series = build_series(&logs, "N1");
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].time, "10:00");
        assert_eq!(series[0].temp, Some(75.0));
        assert_eq!(series[1].time, "10:05");
        assert_eq!(series[1].temp, Some(80.0));
    }

    #[test]
    fn only_the_matching_tail_contributes() {
        let logs = vec![
            log("N2", TempValue::Number(70.0), Some("09:00")),
            log("n1", TempValue::Number(75.0), Some("08:00")),
        ];
        let series = build_series(&logs, "N1");
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].temp, Some(75.0));
    }

    #[test]
    fn no_matching_logs_is_an_empty_series() {
        let logs = vec![log("N2", TempValue::Number(70.0), Some("09:00"))];
        assert!(build_series(&logs, "N1").is_empty());
        assert!(build_series(&[], "N1").is_empty());
    }

    #[test]
    fn missing_labels_fall_back_to_chronological_positions() {
        let logs = vec![
            log("N1", TempValue::Number(80.0), None),
            log("N1", TempValue::Number(76.0), Some("")),
            log("N1", TempValue::Number(75.0), Some("10:00")),
        ];
        let series = build_series(&logs, "N1");
        assert_eq!(series[0].time, "10:00");
        assert_eq!(series[1].time, "#2");
        assert_eq!(series[2].time, "#3");
    }

    #[test]
    fn unparseable_temps_become_gap_points() {
        let logs = vec![
            log("N1", TempValue::Raw("sensor fault".to_string()), Some("10:05")),
            log("N1", TempValue::Number(75.0), Some("10:00")),
        ];
        let series = build_series(&logs, "N1");
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].temp, None);
        assert_eq!(series[1].status, TempStatus::Unknown);
    }
}
