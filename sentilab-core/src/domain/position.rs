//! Position type and size bucket derived from raw trade fields.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of the book a trade belongs to, derived from the `Direction` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PositionType {
    Long,
    Short,
    /// Spot conversions, liquidations, settlements and anything unrecognized.
    Other,
}

impl PositionType {
    pub fn from_direction(direction: &str) -> Self {
        match direction.trim() {
            "Open Long" | "Close Long" | "Buy" => PositionType::Long,
            "Open Short" | "Close Short" | "Sell" => PositionType::Short,
            _ => PositionType::Other,
        }
    }

    pub fn is_directional(self) -> bool {
        matches!(self, PositionType::Long | PositionType::Short)
    }
}

impl fmt::Display for PositionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PositionType::Long => "Long",
            PositionType::Short => "Short",
            PositionType::Other => "Other",
        };
        f.write_str(s)
    }
}

/// Notional size category of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SizeBucket {
    Small,
    Medium,
    Large,
    VeryLarge,
}

impl SizeBucket {
    pub const ALL: [SizeBucket; 4] = [
        SizeBucket::Small,
        SizeBucket::Medium,
        SizeBucket::Large,
        SizeBucket::VeryLarge,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SizeBucket::Small => "Small",
            SizeBucket::Medium => "Medium",
            SizeBucket::Large => "Large",
            SizeBucket::VeryLarge => "Very Large",
        }
    }
}

impl fmt::Display for SizeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lower bounds (USD, inclusive) of the upper three size buckets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizeThresholds {
    pub medium: f64,
    pub large: f64,
    pub very_large: f64,
}

impl Default for SizeThresholds {
    fn default() -> Self {
        Self {
            medium: 500.0,
            large: 2_000.0,
            very_large: 10_000.0,
        }
    }
}

impl SizeThresholds {
    pub fn bucket(&self, size_usd: f64) -> SizeBucket {
        if size_usd >= self.very_large {
            SizeBucket::VeryLarge
        } else if size_usd >= self.large {
            SizeBucket::Large
        } else if size_usd >= self.medium {
            SizeBucket::Medium
        } else {
            SizeBucket::Small
        }
    }

    /// Human-readable range for a bucket, e.g. `"$2,000-$10,000"`.
    pub fn describe(&self, bucket: SizeBucket) -> String {
        match bucket {
            SizeBucket::Small => format!("<${}", thousands(self.medium)),
            SizeBucket::Medium => format!("${}-${}", thousands(self.medium), thousands(self.large)),
            SizeBucket::Large => {
                format!("${}-${}", thousands(self.large), thousands(self.very_large))
            }
            SizeBucket::VeryLarge => format!(">${}", thousands(self.very_large)),
        }
    }
}

fn thousands(value: f64) -> String {
    let whole = value.round() as i64;
    let digits = whole.abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if whole < 0 {
        out.insert(0, '-');
    }
    out
}
