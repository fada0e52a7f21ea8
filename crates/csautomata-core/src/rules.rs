//! Transition rules.
//!
//! Every variant maps a [`NeighborhoodSample`] to the next value of its center
//! cell. Conditions are checked in order and the first match wins.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ParseVariantError;
use crate::grid::{Grid, NeighborhoodSample};

const EXPECTED: &str = "a, b, c, competitive-majority, symmetric-majority, corner-propagation";

/// Selectable transition rule.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum RuleVariant {
    /// Left/right column majority with a top-notch override.
    #[default]
    #[serde(alias = "a", alias = "A")]
    CompetitiveMajority,
    /// Competitive majority plus the mirrored bottom-notch override.
    #[serde(alias = "b", alias = "B")]
    SymmetricMajority,
    /// Copies the top neighbor across a top-left/left edge. Reads three cells.
    #[serde(alias = "c", alias = "C")]
    CornerPropagation,
}

impl RuleVariant {
    pub const ALL: [Self; 3] = [
        Self::CompetitiveMajority,
        Self::SymmetricMajority,
        Self::CornerPropagation,
    ];

    /// Stable kebab-case identifier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CompetitiveMajority => "competitive-majority",
            Self::SymmetricMajority => "symmetric-majority",
            Self::CornerPropagation => "corner-propagation",
        }
    }

    /// Next value of the sample's center cell.
    #[must_use]
    pub fn classify(self, sample: &NeighborhoodSample) -> u8 {
        match self {
            Self::CompetitiveMajority => {
                competitive_majority(sample).unwrap_or(sample.center)
            }
            Self::SymmetricMajority => competitive_majority(sample)
                .or_else(|| bottom_notch(sample))
                .unwrap_or(sample.center),
            Self::CornerPropagation => {
                if sample.top_left == sample.left && sample.top_left != sample.top {
                    sample.top
                } else {
                    sample.center
                }
            }
        }
    }

    /// Produce the successor grid.
    ///
    /// Reads only from `grid`; the result is written to a fresh buffer so the
    /// outcome does not depend on visiting order.
    #[must_use]
    pub fn step(self, grid: &Grid) -> Grid {
        let n = grid.side_length();
        let mut next = Vec::with_capacity(n * n);
        for row in 0..n {
            for col in 0..n {
                next.push(self.classify(&grid.neighborhood(row, col)));
            }
        }
        Grid::from_cells(n, next)
    }
}

/// Shared prefix of the majority rules; `None` means no condition fired.
fn competitive_majority(sample: &NeighborhoodSample) -> Option<u8> {
    if sample.top == 0 && sample.top_left == 1 && sample.top_right == 1 {
        return Some(0);
    }
    let sides = sample.left_sum() + sample.right_sum();
    if sides >= 4 {
        Some(0)
    } else if sides <= 2 {
        Some(1)
    } else {
        None
    }
}

fn bottom_notch(sample: &NeighborhoodSample) -> Option<u8> {
    (sample.bottom == 0 && sample.bottom_left == 1 && sample.bottom_right == 1).then_some(0)
}

impl fmt::Display for RuleVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleVariant {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" | "competitive-majority" | "competitive_majority" => Ok(Self::CompetitiveMajority),
            "b" | "symmetric-majority" | "symmetric_majority" => Ok(Self::SymmetricMajority),
            "c" | "corner-propagation" | "corner_propagation" => Ok(Self::CornerPropagation),
            _ => Err(ParseVariantError::new("rule variant", s, EXPECTED)),
        }
    }
}
