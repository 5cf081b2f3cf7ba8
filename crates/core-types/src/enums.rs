use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the four experiment groups.
///
/// The variant order is the reporting order (A < B < C < D) and drives both
/// table layout and the pairing order of significance tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupLabel {
    /// No UI change, no description change (control).
    A,
    /// Description change only.
    B,
    /// UI change only.
    C,
    /// Both changes.
    D,
}

impl GroupLabel {
    pub const ALL: [GroupLabel; 4] = [GroupLabel::A, GroupLabel::B, GroupLabel::C, GroupLabel::D];

    /// Resolves the group from the two experiment flags.
    pub fn from_flags(ui_change: bool, desc_change: bool) -> Self {
        match (ui_change, desc_change) {
            (false, false) => GroupLabel::A,
            (false, true) => GroupLabel::B,
            (true, false) => GroupLabel::C,
            (true, true) => GroupLabel::D,
        }
    }

    /// Returns `(ui_change, desc_change)` for this group.
    pub fn flags(&self) -> (bool, bool) {
        match self {
            GroupLabel::A => (false, false),
            GroupLabel::B => (false, true),
            GroupLabel::C => (true, false),
            GroupLabel::D => (true, true),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupLabel::A => "A",
            GroupLabel::B => "B",
            GroupLabel::C => "C",
            GroupLabel::D => "D",
        }
    }

    /// Every unordered pair `(g1, g2)` with `g1 < g2`, in reporting order.
    pub fn pairs() -> Vec<(GroupLabel, GroupLabel)> {
        let mut pairs = Vec::with_capacity(6);
        for (i, first) in Self::ALL.iter().enumerate() {
            for second in &Self::ALL[i + 1..] {
                pairs.push((*first, *second));
            }
        }
        pairs
    }
}

impl fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupLabel {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(GroupLabel::A),
            "B" | "b" => Ok(GroupLabel::B),
            "C" | "c" => Ok(GroupLabel::C),
            "D" | "d" => Ok(GroupLabel::D),
            other => Err(CoreError::UnknownGroup(other.to_string())),
        }
    }
}
