//! JLPT proficiency levels and level adjacency
//!
//! Levels form a closed, ordered set from N5 (easiest) to N1 (hardest),
//! plus the wildcard `All` that matches every level.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==================== Data Structures ====================

/// Proficiency tier of a learning item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    N5,
    N4,
    N3,
    N2,
    N1,
    #[serde(rename = "ALL")]
    All,
}

/// Error returned when a level string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown level: {0}")]
pub struct ParseLevelError(pub String);

impl Level {
    /// Concrete levels, easiest first
    pub const CONCRETE: [Level; 5] = [Level::N5, Level::N4, Level::N3, Level::N2, Level::N1];

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::N5 => "N5",
            Level::N4 => "N4",
            Level::N3 => "N3",
            Level::N2 => "N2",
            Level::N1 => "N1",
            Level::All => "ALL",
        }
    }

    /// Neighbouring levels used to widen a candidate pool, always including `self`.
    ///
    /// Ordered easiest first. `All` does not expand.
    pub fn adjacent(&self) -> &'static [Level] {
        match self {
            Level::N5 => &[Level::N5, Level::N4],
            Level::N4 => &[Level::N5, Level::N4, Level::N3],
            Level::N3 => &[Level::N4, Level::N3, Level::N2],
            Level::N2 => &[Level::N3, Level::N2, Level::N1],
            Level::N1 => &[Level::N2, Level::N1],
            Level::All => &[Level::All],
        }
    }

    /// Whether an item tagged `item_level` belongs to a request for `self`
    pub fn matches(&self, item_level: Level) -> bool {
        *self == Level::All || *self == item_level
    }

    pub fn is_wildcard(&self) -> bool {
        *self == Level::All
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "N5" => Ok(Level::N5),
            "N4" => Ok(Level::N4),
            "N3" => Ok(Level::N3),
            "N2" => Ok(Level::N2),
            "N1" => Ok(Level::N1),
            "ALL" => Ok(Level::All),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}
