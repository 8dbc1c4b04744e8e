//! crates/night_ops_core/src/domain.rs
//!
//! The core data structures for the overnight shift: plan entries for
//! expected aircraft and the immutable temperature readings logged against
//! them. These structs are independent of any storage backend or web
//! framework; adapters normalize their wire schemas into these shapes.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::status::{PurgeCategory, TempStatus};

//=========================================================================================
// Shift Addressing
//=========================================================================================

/// Station code plus night date. Every plan entry and temperature log
/// belongs to exactly one shift, and all storage operations are scoped
/// to one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShiftKey {
    pub station: String,
    pub night_date: NaiveDate,
}

impl ShiftKey {
    pub fn new(station: impl Into<String>, night_date: NaiveDate) -> Self {
        Self {
            station: station.into(),
            night_date,
        }
    }

    /// The partition key both backends address a shift by, e.g.
    /// `"OMA-2026-08-06"`.
    pub fn partition_key(&self) -> String {
        format!("{}-{}", self.station, self.night_date)
    }
}

//=========================================================================================
// Plan Entries (NightTail)
//=========================================================================================

/// The crew's answer to "has this tail been purged/drained?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PurgeAnswer {
    Yes,
    No,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl PurgeAnswer {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurgeAnswer::Yes => "Yes",
            PurgeAnswer::No => "No",
            PurgeAnswer::NotApplicable => "N/A",
        }
    }
}

/// Whether a planned aircraft has arrived at its overnight position yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TailStatus {
    Waiting,
    Arrived,
}

/// A planned or arrived aircraft for tonight's shift.
///
/// Created when the crew adds a plan entry, mutated in place by the
/// mark-in, purge and heat-source actions, and bulk-deleted at shift
/// reset. The tail number is the join key to temperature logs and is
/// always compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NightTail {
    pub id: Uuid,
    pub tail: String,
    pub flight: Option<String>,
    pub gate: Option<String>,
    pub eta: Option<String>,
    pub heat_source: Option<String>,
    pub purged_drained: Option<PurgeAnswer>,
    pub purged_at: Option<DateTime<Utc>>,
    pub in_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NightTail {
    /// Derived from `in_time`; there is no separately stored status field
    /// that could disagree with the timestamp.
    pub fn status(&self) -> TailStatus {
        if self.in_time.is_some() {
            TailStatus::Arrived
        } else {
            TailStatus::Waiting
        }
    }

    /// Case-insensitive tail-number match.
    pub fn matches_tail(&self, tail: &str) -> bool {
        self.tail.eq_ignore_ascii_case(tail.trim())
    }

    pub fn purge_category(&self) -> PurgeCategory {
        PurgeCategory::categorize(self.purged_drained)
    }

    /// Stamps the arrival time. The first stamp wins; repeating the action
    /// leaves the entry unchanged. Returns whether anything changed.
    pub fn mark_in(&mut self, at: DateTime<Utc>) -> bool {
        if self.in_time.is_some() {
            return false;
        }
        self.in_time = Some(at);
        true
    }

    /// Records the purge/drain action. A tail already marked `Yes` with a
    /// purge time keeps its original timestamp; the action is idempotent.
    /// Returns whether anything changed.
    pub fn apply_purge(&mut self, at: DateTime<Utc>) -> bool {
        if self.purged_drained == Some(PurgeAnswer::Yes) && self.purged_at.is_some() {
            return false;
        }
        self.purged_drained = Some(PurgeAnswer::Yes);
        self.purged_at = Some(at);
        true
    }
}

/// A plan entry as submitted by the crew, before the store assigns an id
/// and creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNightTail {
    pub tail: String,
    pub flight: Option<String>,
    pub gate: Option<String>,
    pub eta: Option<String>,
    pub heat_source: Option<String>,
    pub purged_drained: Option<PurgeAnswer>,
    pub notes: Option<String>,
}

impl NewNightTail {
    /// Normalizes the draft into a stored entity. Tail numbers are stored
    /// uppercase so the case-insensitive join has a canonical form.
    pub fn into_tail(self, id: Uuid, created_at: DateTime<Utc>) -> NightTail {
        NightTail {
            id,
            tail: self.tail.trim().to_uppercase(),
            flight: self.flight,
            gate: self.gate,
            eta: self.eta,
            heat_source: self.heat_source,
            purged_drained: self.purged_drained,
            purged_at: None,
            in_time: None,
            notes: self.notes,
            created_at,
        }
    }
}

//=========================================================================================
// Temperature Logs
//=========================================================================================

/// A submitted temperature value. Parseable submissions are kept as
/// numbers; anything else is kept as the raw string and rendered as-is
/// rather than being excluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TempValue {
    Number(f64),
    Raw(String),
}

impl TempValue {
    pub fn parse(input: &str) -> Self {
        match input.trim().parse::<f64>() {
            Ok(v) => TempValue::Number(v),
            Err(_) => TempValue::Raw(input.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TempValue::Number(v) => Some(*v),
            TempValue::Raw(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// Display form: whole degrees for numbers, the raw string otherwise.
    pub fn display(&self) -> String {
        match self {
            TempValue::Number(v) => format!("{:.0}°F", v),
            TempValue::Raw(s) => s.clone(),
        }
    }
}

/// An immutable point-in-time cabin reading. Never updated or deleted
/// within a shift; its `status` is classified exactly once at creation
/// and never recomputed, even if the banding rule later changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemperatureLog {
    pub id: Uuid,
    pub tail: String,
    pub temp: TempValue,
    pub status: TempStatus,
    pub location: Option<String>,
    pub heat_source: Option<String>,
    pub notes: Option<String>,
    /// Display label for tables and the chart axis, e.g. `"21:04"`.
    pub time: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl TemperatureLog {
    pub fn matches_tail(&self, tail: &str) -> bool {
        self.tail.eq_ignore_ascii_case(tail.trim())
    }
}

/// A reading as submitted, before the store assigns identity. Carries the
/// snapshot of the tail's gate and heat source taken at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTempLog {
    pub tail: String,
    pub temp: TempValue,
    pub location: Option<String>,
    pub heat_source: Option<String>,
    pub notes: Option<String>,
    pub time: Option<String>,
}

impl NewTempLog {
    /// Finalizes the reading. This is the single place a log's status is
    /// classified; stored logs keep this value for good. A missing time
    /// label defaults to the recording time.
    pub fn into_log(self, id: Uuid, recorded_at: DateTime<Utc>) -> TemperatureLog {
        let status = match &self.temp {
            TempValue::Number(v) => TempStatus::classify(*v),
            TempValue::Raw(s) => TempStatus::classify_str(s),
        };
        TemperatureLog {
            id,
            tail: self.tail.trim().to_uppercase(),
            temp: self.temp,
            status,
            location: self.location,
            heat_source: self.heat_source,
            notes: self.notes,
            time: self
                .time
                .or_else(|| Some(recorded_at.format("%H:%M").to_string())),
            recorded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn plan_entry(tail: &str) -> NightTail {
        NewNightTail {
            tail: tail.to_string(),
            flight: None,
            gate: None,
            eta: None,
            heat_source: None,
            purged_drained: None,
            notes: None,
        }
        .into_tail(Uuid::new_v4(), ts(0))
    }

    #[test]
    fn partition_key_renders_station_and_date() {
        let shift = ShiftKey::new("OMA", NaiveDate::from_ymd_opt(2026, 8, 6).unwrap());
        assert_eq!(shift.partition_key(), "OMA-2026-08-06");
    }

    #[test]
    fn tail_numbers_are_normalized_uppercase() {
        let tail = plan_entry(" n123ab ");
        assert_eq!(tail.tail, "N123AB");
        assert!(tail.matches_tail("n123ab"));
        assert!(tail.matches_tail("N123AB "));
        assert!(!tail.matches_tail("N999ZZ"));
    }

    #[test]
    fn status_is_derived_from_in_time() {
        let mut tail = plan_entry("N1");
        assert_eq!(tail.status(), TailStatus::Waiting);
        assert!(tail.mark_in(ts(100)));
        assert_eq!(tail.status(), TailStatus::Arrived);
        // The first stamp wins.
        assert!(!tail.mark_in(ts(200)));
        assert_eq!(tail.in_time, Some(ts(100)));
    }

    #[test]
    fn purge_action_is_idempotent() {
        let mut tail = plan_entry("N123AB");
        assert_eq!(tail.purge_category(), PurgeCategory::Unknown);

        assert!(tail.apply_purge(ts(100)));
        assert_eq!(tail.purged_drained, Some(PurgeAnswer::Yes));
        assert_eq!(tail.purged_at, Some(ts(100)));
        assert_eq!(tail.purge_category(), PurgeCategory::Purged);

        assert!(!tail.apply_purge(ts(500)));
        assert_eq!(tail.purged_at, Some(ts(100)));
    }

    #[test]
    fn purge_overwrites_an_explicit_no() {
        let mut tail = plan_entry("N1");
        tail.purged_drained = Some(PurgeAnswer::No);
        assert!(tail.apply_purge(ts(50)));
        assert_eq!(tail.purged_drained, Some(PurgeAnswer::Yes));
    }

    #[test]
    fn temp_values_keep_raw_strings() {
        assert_eq!(TempValue::parse("74.5"), TempValue::Number(74.5));
        assert_eq!(TempValue::parse("warm"), TempValue::Raw("warm".to_string()));
        assert_eq!(TempValue::Number(74.5).display(), "74°F");
        assert_eq!(TempValue::Raw("warm".to_string()).display(), "warm");
        assert_eq!(TempValue::Raw("80".to_string()).as_f64(), Some(80.0));
    }

    #[test]
    fn logs_are_classified_exactly_once_at_creation() {
        let log = NewTempLog {
            tail: "n1".to_string(),
            temp: TempValue::Number(92.0),
            location: None,
            heat_source: None,
            notes: None,
            time: Some("22:10".to_string()),
        }
        .into_log(Uuid::new_v4(), ts(0));

        assert_eq!(log.tail, "N1");
        assert_eq!(log.status, TempStatus::CriticalHot);
        assert_eq!(log.time.as_deref(), Some("22:10"));

        let raw = NewTempLog {
            tail: "N1".to_string(),
            temp: TempValue::Raw("frozen".to_string()),
            location: None,
            heat_source: None,
            notes: None,
            time: None,
        }
        .into_log(Uuid::new_v4(), ts(3600));
        assert_eq!(raw.status, TempStatus::Unknown);
        // Missing labels default to the recording time.
        assert_eq!(raw.time.as_deref(), Some("01:00"));
    }
}
