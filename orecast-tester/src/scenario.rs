//! Scenario files: a player setup, a leveling script, and acceptance
//! targets, replayed against the engine.

use anyhow::{Context, Result, bail};
use orecast_engine::experience::{ExperienceCurve, ExperienceTable};
use orecast_engine::gathering::Gathering;
use orecast_engine::sequencer::{SequenceEvent, Sequencer};
use orecast_engine::{Activity, Character, EquipmentComponent, EquipmentSet, EquipmentSlot, RateEngine};
use serde::Deserialize;
use std::collections::BTreeMap;

fn default_hours() -> f64 {
    24.0
}

fn default_step() -> f64 {
    1.0
}

/// Acceptance thresholds checked after a scenario run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ScenarioTargets {
    pub min_final_level: Option<u32>,
    pub max_final_level: Option<u32>,
    pub min_peak_rate: Option<f64>,
}

/// One scenario as stored on disk.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioFile {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub activity: Activity,
    #[serde(default)]
    pub player: Character,
    /// Slot → composite item key (`"<name>_<augment>"`), or a bare name
    /// for augment level 0.
    #[serde(default)]
    pub equipment: BTreeMap<EquipmentSlot, String>,
    #[serde(default = "default_hours")]
    pub hours: f64,
    #[serde(default = "default_step")]
    pub step: f64,
    #[serde(default)]
    pub curve: ExperienceCurve,
    #[serde(default)]
    pub events: Vec<SequenceEvent>,
    #[serde(default)]
    pub targets: ScenarioTargets,
}

impl ScenarioFile {
    /// Parse a scenario from its JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid scenario file")
    }

    fn time_axis(&self) -> Result<Vec<f64>> {
        if self.step <= 0.0 || self.hours < self.step {
            bail!(
                "scenario '{}' needs hours >= step > 0 (got hours={}, step={})",
                self.name,
                self.hours,
                self.step
            );
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let steps = (self.hours / self.step).floor() as usize;
        Ok((0..=steps).map(|i| i as f64 * self.step).collect())
    }
}

/// Result of replaying one scenario.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    pub name: String,
    pub final_level: u32,
    pub peak_rate: f64,
    pub levels: Vec<u32>,
    pub violations: Vec<String>,
}

impl ScenarioOutcome {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Replay a scenario against loaded game data.
pub fn run_scenario(engine: &RateEngine, scenario: &ScenarioFile, seed: u64) -> Result<ScenarioOutcome> {
    let mut player = scenario.player.clone();
    if !scenario.equipment.is_empty() {
        let mut set = EquipmentSet::new();
        for (slot, key) in &scenario.equipment {
            let component =
                EquipmentComponent::from_key(key).unwrap_or_else(|| EquipmentComponent::new(key, 0));
            set.equip(*slot, &component.name, component.augment);
        }
        player.apply_equipment(&set, engine.items());
    }

    let mining;
    let foraging;
    let fishing;
    let model: &dyn Gathering = match scenario.activity {
        Activity::Mining => {
            mining = engine.mining();
            &mining
        }
        Activity::Foraging => {
            foraging = engine.foraging();
            &foraging
        }
        Activity::Fishing => {
            fishing = engine.fishing(seed);
            &fishing
        }
    };

    let table = ExperienceTable::new(scenario.curve);
    let axis = scenario.time_axis()?;
    let sequencer = Sequencer::new(scenario.events.clone());
    let outcome = sequencer
        .simulate_by_time(&player, model, &axis, &table)
        .with_context(|| format!("scenario '{}' failed to simulate", scenario.name))?;

    let final_level = outcome.final_level();
    let peak_rate = outcome.peak_rate();
    let mut violations = Vec::new();
    let targets = &scenario.targets;
    if let Some(min) = targets.min_final_level {
        if final_level < min {
            violations.push(format!("final level {final_level} below target {min}"));
        }
    }
    if let Some(max) = targets.max_final_level {
        if final_level > max {
            violations.push(format!("final level {final_level} above cap {max}"));
        }
    }
    if let Some(min) = targets.min_peak_rate {
        if peak_rate < min {
            violations.push(format!("peak rate {peak_rate:.1} xp/h below target {min:.1}"));
        }
    }

    Ok(ScenarioOutcome {
        name: scenario.name.clone(),
        final_level,
        peak_rate,
        levels: outcome.levels,
        violations,
    })
}
