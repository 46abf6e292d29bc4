//! Pluggable node-yield estimation seam.
//!
//! The fishing model asks an estimator for expected node size and expected
//! tries-to-exhaust. The built-in implementation is a seeded Monte-Carlo
//! sampler; externally trained predictors can slot in behind the same
//! trait without touching callers.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::cell::RefCell;

/// Default Monte-Carlo trial count. The only cost-versus-precision knob.
pub const DEFAULT_TRIALS: u32 = 10_000;

/// Inputs describing one node visit for the fishing trial model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FishingNodeContext {
    pub zone_level: f64,
    pub min_base: f64,
    pub max_base: f64,
    pub effective_level: f64,
    pub bait_power: f64,
    pub base_chance: f64,
    pub fishing_enchant: f64,
}

/// Contract shared by the built-in trial model and any external predictor.
pub trait NodeYieldEstimator {
    /// Expected resource units produced by one node.
    fn expected_node_yield(&self, ctx: &FishingNodeContext) -> f64;

    /// Expected loot attempts needed to exhaust one node.
    fn expected_attempts(&self, ctx: &FishingNodeContext) -> f64;
}

/// Seeded Monte-Carlo estimator for the uniform-with-lucky-roll yield
/// distribution.
#[derive(Debug)]
pub struct MonteCarloEstimator {
    trials: u32,
    rng: RefCell<SmallRng>,
}

impl MonteCarloEstimator {
    /// Estimator with the default trial count.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self::with_trials(seed, DEFAULT_TRIALS)
    }

    /// Estimator with an explicit trial count (minimum 1).
    #[must_use]
    pub fn with_trials(seed: u64, trials: u32) -> Self {
        Self {
            trials: trials.max(1),
            rng: RefCell::new(SmallRng::seed_from_u64(seed)),
        }
    }

    /// Configured trial count.
    #[must_use]
    pub const fn trials(&self) -> u32 {
        self.trials
    }
}

/// Draw one node size.
///
/// Both range ends widen with the level surplus over the zone and with bait
/// power; a lucky roll (5% plus bait scaling) boosts the minimum by 1.5x
/// and the maximum by 3x before the final uniform draw.
pub fn sample_node_size<R: Rng + ?Sized>(rng: &mut R, ctx: &FishingNodeContext) -> f64 {
    let level_gap = ctx.effective_level - ctx.zone_level;
    let mut maximum = (ctx.max_base
        + rng.r#gen::<f64>() * level_gap / 8.0
        + (rng.r#gen::<f64>() * ctx.bait_power / 20.0).floor())
    .floor();
    let mut minimum = (ctx.min_base
        + rng.r#gen::<f64>() * level_gap / 6.0
        + (rng.r#gen::<f64>() * ctx.bait_power / 10.0).floor())
    .floor();

    let lucky_chance = 0.05 + ctx.bait_power / 2000.0;
    if rng.r#gen::<f64>() <= lucky_chance {
        minimum *= 1.5;
        maximum *= 3.0;
    }

    let delta = (maximum - minimum).abs();
    let small = maximum.min(minimum);
    (rng.r#gen::<f64>() * delta + small).floor()
}

/// Expected tries to exhaust a node of `size` units: one unit at a time,
/// with per-attempt success probability rising as the node empties out.
#[must_use]
pub fn tries_to_exhaust(size: f64, base_chance: f64, fishing_enchant: f64) -> f64 {
    let mut tries = 0.0;
    let mut remaining = size.floor();
    while remaining >= 1.0 {
        let success = (base_chance + fishing_enchant * 0.025 + remaining / 48.0).min(1.0);
        if success > 0.0 {
            tries += 1.0 / success;
        }
        remaining -= 1.0;
    }
    tries
}

impl NodeYieldEstimator for MonteCarloEstimator {
    fn expected_node_yield(&self, ctx: &FishingNodeContext) -> f64 {
        let mut rng = self.rng.borrow_mut();
        let mut total = 0.0;
        for _ in 0..self.trials {
            total += sample_node_size(&mut *rng, ctx);
        }
        total / f64::from(self.trials)
    }

    fn expected_attempts(&self, ctx: &FishingNodeContext) -> f64 {
        // Tries are paired with the size drawn in the same trial; sizes and
        // tries are not averaged independently.
        let mut rng = self.rng.borrow_mut();
        let mut total = 0.0;
        for _ in 0..self.trials {
            let size = sample_node_size(&mut *rng, ctx);
            total += tries_to_exhaust(size, ctx.base_chance, ctx.fishing_enchant);
        }
        total / f64::from(self.trials)
    }
}
