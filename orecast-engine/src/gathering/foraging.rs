//! Foraging yield model.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::catalog::{Activity, ActivityCatalog, Location, Node};
use crate::character::{Character, Skill};
use crate::items::ItemDatabase;

use super::{
    Gathering, HistogramInterval, ModelError, clamp_frequency, gathering_yield_multiplier,
};

/// Foraging rate model over a foraging catalog.
#[derive(Debug, Clone)]
pub struct Foraging {
    catalog: Arc<ActivityCatalog>,
    items: Arc<ItemDatabase>,
    alt_experience: Option<HashMap<String, f64>>,
}

impl Foraging {
    #[must_use]
    pub fn new(catalog: Arc<ActivityCatalog>, items: Arc<ItemDatabase>) -> Self {
        Self {
            catalog,
            items,
            alt_experience: None,
        }
    }

    /// Replace the loot-weighted experience path with a per-zone override
    /// table (experience per action).
    #[must_use]
    pub fn with_experience_override(mut self, table: HashMap<String, f64>) -> Self {
        self.alt_experience = Some(table);
        self
    }

    fn rate_modifier(&self, player: &Character) -> f64 {
        let haste = player.enchant_f64("haste");
        (self.effective_level(player) + 99.0) / 100.0 * (1.0 + haste * 0.04)
    }
}

impl Gathering for Foraging {
    fn activity(&self) -> Activity {
        Activity::Foraging
    }

    fn skill(&self) -> Skill {
        Skill::Foraging
    }

    fn catalog(&self) -> &ActivityCatalog {
        &self.catalog
    }

    fn effective_level(&self, player: &Character) -> f64 {
        f64::from(player.foraging_level)
            + player.foraging_bonus * (1.0 + player.foraging_set_bonus)
    }

    fn node_frequency_scores(
        &self,
        player: &Character,
        location: &Location,
    ) -> BTreeMap<String, f64> {
        location
            .nodes
            .values()
            .map(|node| {
                let mut frequency = node.frequency;
                // Specialty enchants favor their tagged node families.
                if node.tags.iter().any(|tag| tag == "tree") {
                    frequency += player.enchant_f64("nature");
                }
                if node.tags.iter().any(|tag| tag == "plants") {
                    frequency += player.enchant_f64("herbalist");
                }
                if node.tags.iter().any(|tag| tag == "seeds") {
                    frequency += player.enchant_f64("seedHarvesting");
                }
                (
                    node.node_id.clone(),
                    clamp_frequency(frequency, node.max_frequency),
                )
            })
            .collect()
    }

    fn expected_node_yield(&self, player: &Character, _location: &Location, node: &Node) -> f64 {
        node.mean_base_amount() * gathering_yield_multiplier(player)
    }

    fn expected_attempts_per_node(
        &self,
        _player: &Character,
        _location: &Location,
        node: &Node,
    ) -> f64 {
        node.mean_base_amount()
    }

    fn zone_action_rate(&self, player: &Character, zone: &str) -> Result<f64, ModelError> {
        let location = self.catalog.zone(zone)?;
        if location.level > player.foraging_level {
            log::debug!("zone '{zone}' gated: requires foraging {}", location.level);
            return Ok(0.0);
        }
        Ok(self.rate_modifier(player) * 3_600_000.0 / location.base_duration)
    }

    fn zone_experience_rate(&self, player: &Character, zone: &str) -> Result<f64, ModelError> {
        let location = self.catalog.zone(zone)?;
        if location.level > player.foraging_level {
            return Ok(0.0);
        }
        if let Some(table) = &self.alt_experience {
            let per_action = table.get(zone).copied().unwrap_or(0.0);
            return Ok(per_action * self.zone_action_rate(player, zone)?);
        }
        let histogram = self.zone_item_histogram(player, zone, HistogramInterval::PerAction)?;
        let weighted_xp: f64 = histogram
            .iter()
            .map(|(id, per_action)| {
                let xp = self
                    .items
                    .get(*id)
                    .and_then(|def| def.experience)
                    .unwrap_or(1.0);
                per_action * xp
            })
            .sum();
        Ok(weighted_xp * self.rate_modifier(player) * 3_600_000.0 / location.base_duration)
    }
}
