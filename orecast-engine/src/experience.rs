//! Level ↔ cumulative experience tables.
//!
//! Two curve families are supported; both are tabulated once at
//! construction for levels 1..=199 and are strictly increasing, so level
//! recovery is a monotonic floor lookup.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Highest tabulated level.
pub const MAX_LEVEL: u32 = 199;

/// Experience curve family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceCurve {
    /// Polynomial curve with a cubic late-game segment past level 101.
    Segmented,
    /// Doubling-every-seven-levels curve.
    #[default]
    Exponential,
}

/// Errors raised by exact table lookups.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ExperienceError {
    #[error("level {level} outside tabulated range 1..={MAX_LEVEL}")]
    LevelOutOfRange { level: u32 },
}

/// Precomputed level → cumulative experience table.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperienceTable {
    curve: ExperienceCurve,
    total_xp: Vec<f64>,
}

impl ExperienceTable {
    /// Tabulate the given curve for levels 1..=199.
    #[must_use]
    pub fn new(curve: ExperienceCurve) -> Self {
        let total_xp = match curve {
            ExperienceCurve::Segmented => segmented_totals(),
            ExperienceCurve::Exponential => exponential_totals(),
        };
        Self { curve, total_xp }
    }

    /// Curve family this table was built from.
    #[must_use]
    pub const fn curve(&self) -> ExperienceCurve {
        self.curve
    }

    /// Cumulative experience required for an exact level.
    ///
    /// # Errors
    ///
    /// Returns [`ExperienceError::LevelOutOfRange`] outside 1..=199; the
    /// table never extrapolates.
    pub fn experience(&self, level: u32) -> Result<f64, ExperienceError> {
        if !(1..=MAX_LEVEL).contains(&level) {
            return Err(ExperienceError::LevelOutOfRange { level });
        }
        Ok(self.total_xp[(level - 1) as usize])
    }

    /// Highest level whose threshold is at or below the given cumulative
    /// experience. Saturates at level 1 below the first threshold and at
    /// the top of the table above the last.
    #[must_use]
    pub fn level_for(&self, experience: f64) -> u32 {
        let mut level = 1u32;
        for (index, threshold) in self.total_xp.iter().enumerate() {
            if experience >= *threshold {
                level = index as u32 + 1;
            } else {
                break;
            }
        }
        level
    }
}

fn segmented_totals() -> Vec<f64> {
    (1..=MAX_LEVEL)
        .map(|level| {
            let l = f64::from(level) - 1.0;
            let late = if f64::from(level) > 101.0 {
                ((f64::from(level) - 101.0) / 2.0).powi(3)
            } else {
                0.0
            };
            (50_000.0 * (l + (l / 10.0).powi(2) + late)).floor()
        })
        .collect()
}

fn exponential_totals() -> Vec<f64> {
    // Per-level increment to reach level L from L-1, zero at level 1.
    let mut total = 0.0f64;
    (1..=MAX_LEVEL)
        .map(|level| {
            if level >= 2 {
                let prior = f64::from(level) - 2.0;
                total += 0.25 * (prior + 300.0 * (prior / 7.0).exp2()).floor();
            }
            total.floor()
        })
        .collect()
}
