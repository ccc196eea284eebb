use derive_more::{Constructor, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::{AsRefStr, EnumIter, EnumString};

/// Value Object - Price
#[derive(Debug, Clone, Copy, PartialEq, From, Into, Constructor, Serialize, Deserialize)]
pub struct Price(f64);

impl Price {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

/// Value Object - Timestamp in epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, From, Into, Constructor, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_millis(value: i64) -> Self {
        Self(value)
    }
}

/// Value Object - Chart timeframe.
///
/// Displayed with its candle label (`1H`, `4H`, `1D`); parsed from either the
/// label or the semantic name (`short`, `medium`, `long`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Display,
    EnumIter,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum Timeframe {
    #[default]
    #[display(fmt = "1H")]
    #[strum(serialize = "short", serialize = "1H")]
    #[serde(rename = "short", alias = "1H", alias = "1h")]
    Short,
    #[display(fmt = "4H")]
    #[strum(serialize = "medium", serialize = "4H")]
    #[serde(rename = "medium", alias = "4H", alias = "4h")]
    Medium,
    #[display(fmt = "1D")]
    #[strum(serialize = "long", serialize = "1D")]
    #[serde(rename = "long", alias = "1D", alias = "1d")]
    Long,
}

impl Timeframe {
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Short => "1H",
            Timeframe::Medium => "4H",
            Timeframe::Long => "1D",
        }
    }

    /// Number of markers in the timeframe badge.
    pub fn badge_markers(&self) -> usize {
        match self {
            Timeframe::Short => 1,
            Timeframe::Medium => 4,
            Timeframe::Long => 24,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn timeframe_parses_names_and_labels() {
        assert_eq!(Timeframe::from_str("short").unwrap(), Timeframe::Short);
        assert_eq!(Timeframe::from_str("4H").unwrap(), Timeframe::Medium);
        assert_eq!(Timeframe::from_str("1d").unwrap(), Timeframe::Long);
        assert!(Timeframe::from_str("2W").is_err());
    }

    #[test]
    fn timeframe_displays_candle_label() {
        let labels: Vec<String> = Timeframe::iter().map(|tf| tf.to_string()).collect();
        assert_eq!(labels, vec!["1H", "4H", "1D"]);
    }
}
