use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The closed set of event kinds the engine recognizes.
///
/// Filing events carry their SEC form code verbatim (e.g. "10-Q", "8-K");
/// split events are synthetic labels derived from the daily split flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    Filing(String),
    Split,
    ReverseSplit,
}

impl EventType {
    /// The flat label stored in the catalog's `event_type` column.
    pub fn label(&self) -> &str {
        match self {
            EventType::Filing(code) => code,
            EventType::Split => "SPLIT",
            EventType::ReverseSplit => "REVERSE_SPLIT",
        }
    }

    /// Parses a catalog label back into the tagged union. Any label that is
    /// not a split marker is a filing form code, so this never fails.
    pub fn from_label(label: &str) -> Self {
        match label {
            "SPLIT" => EventType::Split,
            "REVERSE_SPLIT" => EventType::ReverseSplit,
            code => EventType::Filing(code.to_string()),
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How an event date that has no row in its ticker's panel is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorPolicy {
    /// Drop the event unless its date matches a panel row exactly.
    #[default]
    ExactMatch,
    /// Roll the anchor forward to the ticker's next available trading day.
    NextTradingDay,
}

impl FromStr for AnchorPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" | "exact_match" | "exact-match" => Ok(AnchorPolicy::ExactMatch),
            "next" | "next_trading_day" | "next-trading-day" | "roll-forward" => {
                Ok(AnchorPolicy::NextTradingDay)
            }
            other => Err(CoreError::InvalidInput(
                "anchor policy".to_string(),
                format!("'{other}' is not one of: exact, next-trading-day"),
            )),
        }
    }
}

/// Which confidence-band formula the aggregator applies to the CAR series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidencePolicy {
    /// Prefix sums of the per-day `mean ± 1.96·SE` series, taken separately.
    /// Kept for comparability with earlier exports.
    Naive,
    /// `CAR ± 1.96·sqrt(Σ SE²)`: per-day estimate errors treated as
    /// independent, variances added before the square root.
    #[default]
    Propagated,
}

impl FromStr for ConfidencePolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "naive" => Ok(ConfidencePolicy::Naive),
            "propagated" => Ok(ConfidencePolicy::Propagated),
            other => Err(CoreError::InvalidInput(
                "confidence policy".to_string(),
                format!("'{other}' is not one of: naive, propagated"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_labels_round_trip() {
        for label in ["10-Q", "8-K", "SC 13G/A", "SPLIT", "REVERSE_SPLIT"] {
            assert_eq!(EventType::from_label(label).label(), label);
        }
    }

    #[test]
    fn split_labels_map_to_variants() {
        assert_eq!(EventType::from_label("SPLIT"), EventType::Split);
        assert_eq!(EventType::from_label("REVERSE_SPLIT"), EventType::ReverseSplit);
        assert_eq!(
            EventType::from_label("10-K"),
            EventType::Filing("10-K".to_string())
        );
    }

    #[test]
    fn anchor_policy_parses_aliases() {
        assert_eq!("exact".parse::<AnchorPolicy>().unwrap(), AnchorPolicy::ExactMatch);
        assert_eq!(
            "roll-forward".parse::<AnchorPolicy>().unwrap(),
            AnchorPolicy::NextTradingDay
        );
        assert!("nearest".parse::<AnchorPolicy>().is_err());
    }

    #[test]
    fn confidence_policy_parses() {
        assert_eq!(
            "Propagated".parse::<ConfidencePolicy>().unwrap(),
            ConfidencePolicy::Propagated
        );
        assert_eq!("naive".parse::<ConfidencePolicy>().unwrap(), ConfidencePolicy::Naive);
        assert!("bootstrap".parse::<ConfidencePolicy>().is_err());
    }
}
