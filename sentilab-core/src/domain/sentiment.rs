//! Sentiment: the five-level Fear & Greed scale.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Daily market sentiment on an ordered five-level scale.
///
/// Ordering follows the scale: `ExtremeFear < Fear < Neutral < Greed < ExtremeGreed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Sentiment {
    #[serde(rename = "Extreme Fear")]
    ExtremeFear,
    #[serde(rename = "Fear")]
    Fear,
    #[serde(rename = "Neutral")]
    Neutral,
    #[serde(rename = "Greed")]
    Greed,
    #[serde(rename = "Extreme Greed")]
    ExtremeGreed,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized sentiment label '{0}'")]
pub struct UnknownSentiment(pub String);

impl Sentiment {
    /// All labels in scale order.
    pub const ALL: [Sentiment; 5] = [
        Sentiment::ExtremeFear,
        Sentiment::Fear,
        Sentiment::Neutral,
        Sentiment::Greed,
        Sentiment::ExtremeGreed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Sentiment::ExtremeFear => "Extreme Fear",
            Sentiment::Fear => "Fear",
            Sentiment::Neutral => "Neutral",
            Sentiment::Greed => "Greed",
            Sentiment::ExtremeGreed => "Extreme Greed",
        }
    }

    /// Position on the scale, 0 (Extreme Fear) through 4 (Extreme Greed).
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Sentiment {
    type Err = UnknownSentiment;

    /// Case- and whitespace-insensitive: `"extreme  greed"`, `"Extreme_Greed"`
    /// and `"EXTREME GREED"` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();

        match normalized.as_str() {
            "extreme fear" => Ok(Sentiment::ExtremeFear),
            "fear" => Ok(Sentiment::Fear),
            "neutral" => Ok(Sentiment::Neutral),
            "greed" => Ok(Sentiment::Greed),
            "extreme greed" => Ok(Sentiment::ExtremeGreed),
            _ => Err(UnknownSentiment(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_labels() {
        for s in Sentiment::ALL {
            assert_eq!(s.label().parse::<Sentiment>().unwrap(), s);
        }
    }

    #[test]
    fn parsing_ignores_case_and_separators() {
        assert_eq!("extreme  greed".parse::<Sentiment>().unwrap(), Sentiment::ExtremeGreed);
        assert_eq!("EXTREME_FEAR".parse::<Sentiment>().unwrap(), Sentiment::ExtremeFear);
        assert_eq!(" neutral ".parse::<Sentiment>().unwrap(), Sentiment::Neutral);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = "Euphoria".parse::<Sentiment>().unwrap_err();
        assert_eq!(err, UnknownSentiment("Euphoria".into()));
    }

    #[test]
    fn scale_order_matches_index() {
        for (i, s) in Sentiment::ALL.iter().enumerate() {
            assert_eq!(s.index(), i);
        }
        assert!(Sentiment::ExtremeFear < Sentiment::ExtremeGreed);
    }

    #[test]
    fn serde_uses_display_labels() {
        let json = serde_json::to_string(&Sentiment::ExtremeGreed).unwrap();
        assert_eq!(json, "\"Extreme Greed\"");
        let back: Sentiment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Sentiment::ExtremeGreed);
    }
}
