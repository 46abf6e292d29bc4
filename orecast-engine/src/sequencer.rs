//! Time-stepped leveling simulator.
//!
//! The sequencer advances a cloned character along a caller-supplied time
//! axis, crediting the best available experience rate each tick and
//! ceiling-merging scripted stat-change events as their level or elapsed
//! hour thresholds are crossed. The original character is never mutated.

use serde::Deserialize;
use serde::de::Error as _;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::character::{Character, StatKey, StatKeyError};
use crate::experience::ExperienceTable;
use crate::gathering::{Gathering, ModelError};

/// Errors raised while parsing event scripts or running a simulation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SequenceError {
    #[error("event has neither a 'level' nor an 'hours' trigger")]
    MissingTrigger,
    #[error("event has both 'level' and 'hours' triggers")]
    ConflictingTrigger,
    #[error("event value for '{key}' is not a number")]
    NonNumericValue { key: String },
    #[error(transparent)]
    Stat(#[from] StatKeyError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("time axis needs at least two points to derive a step width")]
    TimeAxisTooShort,
}

/// What crosses an event into the active set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventTrigger {
    /// Active once the simulated level reaches the threshold.
    Level(u32),
    /// Active once elapsed simulated hours reach the threshold.
    Hours(f64),
}

/// A scripted stat change.
///
/// Once its threshold is crossed the event is re-applied every tick; the
/// ceiling merge makes re-application idempotent, and events are never
/// consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceEvent {
    pub trigger: EventTrigger,
    pub changes: Vec<(StatKey, f64)>,
    pub info: Option<String>,
}

impl SequenceEvent {
    /// Build an event from the flat wire form, e.g.
    /// `{"level": 5, "mining_bonus": 10, "info": "bronze tool"}` with
    /// enchantments addressed as `"enchantments:<name>"`.
    ///
    /// # Errors
    ///
    /// Rejects events without exactly one trigger, unknown stat keys, and
    /// non-numeric values.
    pub fn from_entries(
        entries: &BTreeMap<String, serde_json::Value>,
    ) -> Result<Self, SequenceError> {
        let mut trigger = None;
        let mut info = None;
        let mut changes = Vec::new();
        for (key, value) in entries {
            match key.as_str() {
                "level" => {
                    if trigger.is_some() {
                        return Err(SequenceError::ConflictingTrigger);
                    }
                    let level = value
                        .as_u64()
                        .ok_or_else(|| SequenceError::NonNumericValue { key: key.clone() })?;
                    trigger = Some(EventTrigger::Level(u32::try_from(level).unwrap_or(u32::MAX)));
                }
                "hours" => {
                    if trigger.is_some() {
                        return Err(SequenceError::ConflictingTrigger);
                    }
                    let hours = value
                        .as_f64()
                        .ok_or_else(|| SequenceError::NonNumericValue { key: key.clone() })?;
                    trigger = Some(EventTrigger::Hours(hours));
                }
                "info" => {
                    info = value.as_str().map(str::to_string);
                }
                _ => {
                    let stat: StatKey = key.parse()?;
                    let value = value
                        .as_f64()
                        .ok_or_else(|| SequenceError::NonNumericValue { key: key.clone() })?;
                    changes.push((stat, value));
                }
            }
        }
        let trigger = trigger.ok_or(SequenceError::MissingTrigger)?;
        Ok(Self {
            trigger,
            changes,
            info,
        })
    }

    fn apply(&self, character: &mut Character) {
        for (stat, value) in &self.changes {
            stat.apply_max(character, *value);
        }
    }
}

impl<'de> Deserialize<'de> for SequenceEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let entries = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        Self::from_entries(&entries).map_err(D::Error::custom)
    }
}

/// Aligned level and realized experience-rate trajectories.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimulationOutcome {
    /// Level after each tick.
    pub levels: Vec<u32>,
    /// Experience-per-hour rate realized during each tick.
    pub experience_rates: Vec<f64>,
}

impl SimulationOutcome {
    /// Level at the end of the run.
    #[must_use]
    pub fn final_level(&self) -> u32 {
        self.levels.last().copied().unwrap_or(1)
    }

    /// Best single-tick experience rate seen.
    #[must_use]
    pub fn peak_rate(&self) -> f64 {
        self.experience_rates.iter().copied().fold(0.0, f64::max)
    }
}

/// Leveling simulator over a scripted event sequence.
#[derive(Debug, Clone, Default)]
pub struct Sequencer {
    level_events: Vec<SequenceEvent>,
    hour_events: Vec<SequenceEvent>,
}

impl Sequencer {
    /// Split and order the events by trigger kind and threshold.
    #[must_use]
    pub fn new(events: Vec<SequenceEvent>) -> Self {
        let mut level_events = Vec::new();
        let mut hour_events = Vec::new();
        for event in events {
            match event.trigger {
                EventTrigger::Level(_) => level_events.push(event),
                EventTrigger::Hours(_) => hour_events.push(event),
            }
        }
        level_events.sort_by_key(|event| match event.trigger {
            EventTrigger::Level(level) => level,
            EventTrigger::Hours(_) => u32::MAX,
        });
        hour_events.sort_by(|a, b| {
            let threshold = |event: &SequenceEvent| match event.trigger {
                EventTrigger::Hours(hours) => hours,
                EventTrigger::Level(_) => f64::MAX,
            };
            threshold(a).total_cmp(&threshold(b))
        });
        Self {
            level_events,
            hour_events,
        }
    }

    /// Parse an event script from its JSON wire form (an array of flat
    /// event maps).
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON or invalid events.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let events: Vec<SequenceEvent> = serde_json::from_str(json)?;
        Ok(Self::new(events))
    }

    /// Run the simulation along `time_axis` (hours, uniform spacing taken
    /// from the first two points).
    ///
    /// The passed character is cloned; the original and the model are left
    /// untouched, so independent what-if runs can share them freely.
    ///
    /// # Errors
    ///
    /// Fails when the axis is shorter than two points or the model cannot
    /// produce a rate.
    pub fn simulate_by_time(
        &self,
        player: &Character,
        model: &dyn Gathering,
        time_axis: &[f64],
        table: &ExperienceTable,
    ) -> Result<SimulationOutcome, SequenceError> {
        if time_axis.len() < 2 {
            return Err(SequenceError::TimeAxisTooShort);
        }
        let delta_t = time_axis[1] - time_axis[0];
        let skill = model.skill();
        let mut clone = player.clone();
        let mut total_experience = 0.0;
        let mut levels = Vec::with_capacity(time_axis.len());
        let mut experience_rates = Vec::with_capacity(time_axis.len());

        for &timer in time_axis {
            // Rate realized during this tick, under last tick's stats.
            let rate = model.max_experience_rate(&clone)?;
            experience_rates.push(rate);
            total_experience += rate * delta_t;

            let current_level = table.level_for(total_experience);
            if clone.skill_level(skill) != current_level {
                log::debug!("{skill} reached level {current_level} at t={timer:.2}h");
            }
            clone.set_skill_level(skill, current_level);
            levels.push(current_level);

            for event in &self.hour_events {
                if let EventTrigger::Hours(threshold) = event.trigger {
                    if threshold <= timer {
                        event.apply(&mut clone);
                    }
                }
            }
            for event in &self.level_events {
                if let EventTrigger::Level(threshold) = event.trigger {
                    if threshold <= current_level {
                        event.apply(&mut clone);
                    }
                }
            }
        }
        Ok(SimulationOutcome {
            levels,
            experience_rates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flat_event_maps() {
        let script = r#"[
            {"level": 5, "mining_bonus": 10, "info": "bronze tool"},
            {"hours": 12.5, "enchantments:haste": 3}
        ]"#;
        let events: Vec<SequenceEvent> = serde_json::from_str(script).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].trigger, EventTrigger::Level(5));
        assert_eq!(events[0].info.as_deref(), Some("bronze tool"));
        assert_eq!(events[0].changes, vec![(StatKey::MiningBonus, 10.0)]);
        assert_eq!(events[1].trigger, EventTrigger::Hours(12.5));
        assert_eq!(
            events[1].changes,
            vec![(StatKey::Enchantment("haste".to_string()), 3.0)]
        );
    }

    #[test]
    fn rejects_unknown_stats_and_missing_triggers() {
        let unknown = r#"{"level": 5, "mystery_stat": 1}"#;
        assert!(serde_json::from_str::<SequenceEvent>(unknown).is_err());
        let missing = r#"{"mining_bonus": 1}"#;
        assert!(serde_json::from_str::<SequenceEvent>(missing).is_err());
        let both = r#"{"level": 5, "hours": 1, "mining_bonus": 1}"#;
        assert!(serde_json::from_str::<SequenceEvent>(both).is_err());
    }

    #[test]
    fn short_axis_is_rejected() {
        let sequencer = Sequencer::default();
        let player = Character::default();
        let model = crate::gathering::Mining::new(
            std::sync::Arc::new(crate::catalog::ActivityCatalog::from_locations(
                crate::catalog::Activity::Mining,
                std::collections::BTreeMap::new(),
            )),
            std::sync::Arc::new(crate::items::ItemDatabase::empty()),
        );
        let table = ExperienceTable::new(crate::experience::ExperienceCurve::Exponential);
        let err = sequencer
            .simulate_by_time(&player, &model, &[0.0], &table)
            .unwrap_err();
        assert_eq!(err, SequenceError::TimeAxisTooShort);
    }
}
