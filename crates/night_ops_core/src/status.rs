//! crates/night_ops_core/src/status.rs
//!
//! Pure classification logic: cabin temperature bands and purge/drain
//! categories. Both are total functions over their inputs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{NightTail, PurgeAnswer};

/// Error returned when a filter label from the outside does not name a
/// known status or category.
#[derive(Debug, thiserror::Error)]
#[error("unrecognized label: {0}")]
pub struct UnknownLabel(pub String);

//=========================================================================================
// Temperature Status
//=========================================================================================

/// The health band of a single cabin temperature reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TempStatus {
    Cold,
    Normal,
    #[serde(rename = "Above Target")]
    AboveTarget,
    #[serde(rename = "Critical Hot")]
    CriticalHot,
    Unknown,
}

impl TempStatus {
    /// Classifies a Fahrenheit reading into its band.
    ///
    /// Bands are half-open: 70.0, 81.0 and 90.0 each belong to the
    /// higher band. NaN classifies as `Unknown`.
    pub fn classify(temp_f: f64) -> Self {
        if temp_f.is_nan() {
            TempStatus::Unknown
        } else if temp_f >= 90.0 {
            TempStatus::CriticalHot
        } else if temp_f >= 81.0 {
            TempStatus::AboveTarget
        } else if temp_f >= 70.0 {
            TempStatus::Normal
        } else {
            TempStatus::Cold
        }
    }

    /// Classifies a raw submitted string, e.g. form input. Anything that
    /// does not parse as a number is `Unknown`.
    pub fn classify_str(input: &str) -> Self {
        input
            .trim()
            .parse::<f64>()
            .map(Self::classify)
            .unwrap_or(TempStatus::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TempStatus::Cold => "Cold",
            TempStatus::Normal => "Normal",
            TempStatus::AboveTarget => "Above Target",
            TempStatus::CriticalHot => "Critical Hot",
            TempStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for TempStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TempStatus {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Cold" => Ok(TempStatus::Cold),
            "Normal" => Ok(TempStatus::Normal),
            "Above Target" => Ok(TempStatus::AboveTarget),
            "Critical Hot" => Ok(TempStatus::CriticalHot),
            "Unknown" => Ok(TempStatus::Unknown),
            other => Err(UnknownLabel(other.to_string())),
        }
    }
}

//=========================================================================================
// Purge Category
//=========================================================================================

/// What the snapshot pills say about a tail's overnight water system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PurgeCategory {
    Purged,
    #[serde(rename = "Not Purged")]
    NotPurged,
    Unknown,
}

impl PurgeCategory {
    /// Maps the crew-entered purge/drain answer to its category. Anything
    /// other than an explicit yes or no (including "N/A" and unset) is
    /// `Unknown`.
    pub fn categorize(answer: Option<PurgeAnswer>) -> Self {
        match answer {
            Some(PurgeAnswer::Yes) => PurgeCategory::Purged,
            Some(PurgeAnswer::No) => PurgeCategory::NotPurged,
            _ => PurgeCategory::Unknown,
        }
    }

    /// Category of the plan entry matching `tail`, joined case-insensitively.
    /// A tail with no plan entry is `Unknown`.
    pub fn for_tail_in(tails: &[NightTail], tail: &str) -> Self {
        tails
            .iter()
            .find(|t| t.matches_tail(tail))
            .map(NightTail::purge_category)
            .unwrap_or(PurgeCategory::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PurgeCategory::Purged => "Purged",
            PurgeCategory::NotPurged => "Not Purged",
            PurgeCategory::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for PurgeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PurgeCategory {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Purged" => Ok(PurgeCategory::Purged),
            "Not Purged" => Ok(PurgeCategory::NotPurged),
            "Unknown" => Ok(PurgeCategory::Unknown),
            other => Err(UnknownLabel(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_partition_with_exact_boundaries() {
        assert_eq!(TempStatus::classify(69.9), TempStatus::Cold);
        assert_eq!(TempStatus::classify(70.0), TempStatus::Normal);
        assert_eq!(TempStatus::classify(80.9), TempStatus::Normal);
        assert_eq!(TempStatus::classify(81.0), TempStatus::AboveTarget);
        assert_eq!(TempStatus::classify(89.9), TempStatus::AboveTarget);
        assert_eq!(TempStatus::classify(90.0), TempStatus::CriticalHot);
    }

    #[test]
    fn extremes_classify_without_panicking() {
        assert_eq!(TempStatus::classify(f64::NEG_INFINITY), TempStatus::Cold);
        assert_eq!(TempStatus::classify(f64::INFINITY), TempStatus::CriticalHot);
        assert_eq!(TempStatus::classify(f64::NAN), TempStatus::Unknown);
    }

    #[test]
    fn non_numeric_strings_are_unknown() {
        assert_eq!(TempStatus::classify_str("abc"), TempStatus::Unknown);
        assert_eq!(TempStatus::classify_str(""), TempStatus::Unknown);
        assert_eq!(TempStatus::classify_str(" 74.5 "), TempStatus::Normal);
    }

    #[test]
    fn purge_answers_map_to_categories() {
        assert_eq!(
            PurgeCategory::categorize(Some(PurgeAnswer::Yes)),
            PurgeCategory::Purged
        );
        assert_eq!(
            PurgeCategory::categorize(Some(PurgeAnswer::No)),
            PurgeCategory::NotPurged
        );
        assert_eq!(
            PurgeCategory::categorize(Some(PurgeAnswer::NotApplicable)),
            PurgeCategory::Unknown
        );
        assert_eq!(PurgeCategory::categorize(None), PurgeCategory::Unknown);
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        for status in [
            TempStatus::Cold,
            TempStatus::Normal,
            TempStatus::AboveTarget,
            TempStatus::CriticalHot,
            TempStatus::Unknown,
        ] {
            assert_eq!(status.as_str().parse::<TempStatus>().unwrap(), status);
        }
        assert!("Tepid".parse::<TempStatus>().is_err());
        assert_eq!(
            "Not Purged".parse::<PurgeCategory>().unwrap(),
            PurgeCategory::NotPurged
        );
    }
}
