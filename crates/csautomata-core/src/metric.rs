//! Column balance scoring.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ParseVariantError;
use crate::grid::Grid;

/// Selectable balance metric.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum MetricVariant {
    /// Mean per-column distance from an even split.
    #[default]
    Plain,
    /// Plain score minus the share of adjacent columns sharing a majority.
    Penalized,
}

impl MetricVariant {
    pub const ALL: [Self; 2] = [Self::Plain, Self::Penalized];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Penalized => "penalized",
        }
    }

    /// Score a grid snapshot.
    #[must_use]
    pub fn score(self, grid: &Grid) -> f64 {
        let proportions = column_proportions(grid);
        let base = balance_score(&proportions);
        match self {
            Self::Plain => base,
            Self::Penalized => base - adjacency_penalty(&proportions),
        }
    }
}

/// Fraction of live cells in each column, left to right.
#[must_use]
pub fn column_proportions(grid: &Grid) -> Vec<f64> {
    let n = grid.side_length() as f64;
    grid.column_populations()
        .into_iter()
        .map(|ones| ones as f64 / n)
        .collect()
}

/// Contribution of one column: its majority share, counting an exact tie as white.
#[inline]
#[must_use]
pub fn column_contribution(proportion_black: f64) -> f64 {
    if is_majority_black(proportion_black) {
        proportion_black
    } else {
        1.0 - proportion_black
    }
}

/// Mean column contribution; `0.0` for an empty slice.
#[must_use]
pub fn balance_score(proportions: &[f64]) -> f64 {
    if proportions.is_empty() {
        return 0.0;
    }
    let total: f64 = proportions.iter().copied().map(column_contribution).sum();
    total / proportions.len() as f64
}

#[inline]
fn is_majority_black(proportion_black: f64) -> bool {
    proportion_black > 0.5
}

/// Share of adjacent column pairs (no wraparound) on the same side of 0.5.
fn adjacency_penalty(proportions: &[f64]) -> f64 {
    if proportions.len() < 2 {
        return 0.0;
    }
    let same_side = proportions
        .windows(2)
        .filter(|pair| is_majority_black(pair[0]) == is_majority_black(pair[1]))
        .count();
    same_side as f64 / (proportions.len() - 1) as f64
}

impl fmt::Display for MetricVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricVariant {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "penalized" | "penalised" => Ok(Self::Penalized),
            _ => Err(ParseVariantError::new(
                "metric variant",
                s,
                "plain, penalized",
            )),
        }
    }
}
