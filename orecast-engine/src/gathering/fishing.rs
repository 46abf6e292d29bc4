//! Fishing yield model.
//!
//! Fishing diverges from the other activities: node and loot selection
//! scale with effective level and rarity power, node sizes come from a
//! probabilistic trial model, and time per action splits into a node
//! search phase and a reeling phase.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::catalog::{Activity, ActivityCatalog, Location, Node};
use crate::character::{Character, Skill};
use crate::estimator::{FishingNodeContext, MonteCarloEstimator, NodeYieldEstimator};
use crate::items::{ItemDatabase, ItemId};

use super::{
    Gathering, ModelError, clamp_frequency, gathering_yield_multiplier, normalize_scores,
};

/// Fishing rate model over a fishing catalog.
pub struct Fishing {
    catalog: Arc<ActivityCatalog>,
    items: Arc<ItemDatabase>,
    alt_experience: Option<HashMap<String, f64>>,
    estimator: Box<dyn NodeYieldEstimator>,
}

impl Fishing {
    /// Model with the built-in Monte-Carlo estimator under an explicit
    /// seed, so rates are reproducible run to run.
    #[must_use]
    pub fn new(catalog: Arc<ActivityCatalog>, items: Arc<ItemDatabase>, seed: u64) -> Self {
        Self {
            catalog,
            items,
            alt_experience: None,
            estimator: Box::new(MonteCarloEstimator::from_seed(seed)),
        }
    }

    /// Swap in an alternate node-yield estimator (e.g. a trained
    /// predictor) honoring the same contract.
    #[must_use]
    pub fn with_estimator(mut self, estimator: Box<dyn NodeYieldEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    /// Replace the loot-weighted experience path with a per-zone override
    /// table (experience per action).
    #[must_use]
    pub fn with_experience_override(mut self, table: HashMap<String, f64>) -> Self {
        self.alt_experience = Some(table);
        self
    }

    fn bait_scale(player: &Character) -> f64 {
        1.0 + player.enchant_f64("deadliestCatch") * 0.05
    }

    /// Derived bait power: gear and enchant adjustments under the set
    /// bonus, plus the equipped bait's own contribution.
    #[must_use]
    pub fn bait_power(&self, player: &Character) -> f64 {
        let set_bonus = 1.0 + player.fishing_set_bonus;
        let gear_enchant = player.enchant_f64("pungentBait") * 3.0
            - player.enchant_f64("fishingMagnetism") * 2.0;
        (player.bait_power + gear_enchant) * set_bonus
            + player.bait_bait_power * Self::bait_scale(player)
    }

    /// Derived rarity power feeding node and loot selection.
    #[must_use]
    pub fn bonus_rarity(&self, player: &Character) -> f64 {
        let set_bonus = 1.0 + player.fishing_set_bonus;
        let gear_enchant = player.enchant_f64("fishingMagnetism") * 2.0;
        (player.bonus_rarity + gear_enchant) * set_bonus
            + player.bait_bonus_rarity * Self::bait_scale(player)
    }

    /// Derived reel power shortening the reeling phase.
    #[must_use]
    pub fn reel_power(&self, player: &Character) -> f64 {
        let set_bonus = 1.0 + player.fishing_set_bonus;
        let gear_enchant = player.enchant_f64("reinforcedLine") * 3.0
            - player.enchant_f64("fishingMagnetism") * 2.0;
        (player.reel_power + gear_enchant) * set_bonus
            + player.bait_reel_power * Self::bait_scale(player)
    }

    /// Per-attempt success chance against a node in this zone.
    fn node_base_chance(&self, player: &Character, location: &Location) -> f64 {
        let fishing_enchant = player.enchant_f64("fishing");
        0.4 + (self.effective_level(player) - f64::from(location.level) * 1.25) / 275.0
            + fishing_enchant * 0.025
            + self.bait_power(player) / 200.0
    }

    /// Expected casts until a node is found, with the per-failure pity
    /// escalation capped at seven attempts.
    fn average_tries_to_find_node(&self, player: &Character, location: &Location) -> f64 {
        let base_chance = self.node_base_chance(player, location);
        let fishing_enchant = player.enchant_f64("fishing");
        let mut average_tries = 0.0;
        let mut chance_to_reach = 1.0;
        for failures in 0..7 {
            let chance =
                (base_chance + fishing_enchant * 0.025 + f64::from(failures) / 6.0).min(1.0);
            average_tries += chance * chance_to_reach * f64::from(failures + 1);
            chance_to_reach *= 1.0 - chance;
        }
        average_tries
    }

    fn yield_context(
        &self,
        player: &Character,
        location: &Location,
        node: &Node,
    ) -> FishingNodeContext {
        FishingNodeContext {
            zone_level: f64::from(location.level),
            min_base: node.minimum_base_amount,
            max_base: node.maximum_base_amount,
            effective_level: self.effective_level(player),
            bait_power: self.bait_power(player),
            base_chance: self.node_base_chance(player, location),
            fishing_enchant: player.enchant_f64("fishing"),
        }
    }

    /// The exhaustion model keys off the raw gear fields rather than the
    /// fully derived powers.
    fn attempts_context(
        &self,
        player: &Character,
        location: &Location,
        node: &Node,
    ) -> FishingNodeContext {
        FishingNodeContext {
            zone_level: f64::from(location.level),
            min_base: node.minimum_base_amount,
            max_base: node.maximum_base_amount,
            effective_level: f64::from(player.fishing_level) + player.fishing_bonus,
            bait_power: player.bait_power,
            base_chance: self.node_base_chance(player, location),
            fishing_enchant: player.enchant_f64("fishing"),
        }
    }

    /// Time components per node visit, in seconds.
    fn search_times(&self, player: &Character, location: &Location) -> (f64, f64) {
        let haste = player.enchant_f64("haste");
        let base_time = location.base_duration / 1000.0 / (1.0 + haste * 0.04);
        let node_search = (base_time * 1.75 * (1.0 - self.bait_power(player) / 400.0)).max(1.0);
        let loot_search = (base_time / 1.25 * (200.0 / (self.reel_power(player) + 200.0))).max(1.0);
        (node_search, loot_search)
    }

    fn frequency_score(&self, player: &Character, frequency: f64, max_frequency: f64) -> f64 {
        let boosted = (frequency + self.bonus_rarity(player))
            * (1.0 + self.effective_level(player) / 360.0);
        clamp_frequency(boosted, max_frequency)
    }
}

impl Gathering for Fishing {
    fn activity(&self) -> Activity {
        Activity::Fishing
    }

    fn skill(&self) -> Skill {
        Skill::Fishing
    }

    fn catalog(&self) -> &ActivityCatalog {
        &self.catalog
    }

    fn effective_level(&self, player: &Character) -> f64 {
        let set_bonus = 1.0 + player.fishing_set_bonus;
        let bait = player.bait_fishing_bonus * Self::bait_scale(player);
        f64::from(player.fishing_level) + bait + player.fishing_bonus * set_bonus
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
                (
                    node.node_id.clone(),
                    self.frequency_score(player, node.frequency, node.max_frequency),
                )
            })
            .collect()
    }

    fn loot_frequency_scores(&self, player: &Character, node: &Node) -> BTreeMap<ItemId, f64> {
        let fiber_finder = player.enchant_f64("fiberFinder");
        node.loot
            .values()
            .map(|loot| {
                let mut score = self.frequency_score(player, loot.frequency, loot.max_frequency);
                if loot.item_class == "fiber" {
                    score *= 1.0 + fiber_finder * 0.25;
                }
                (loot.id, score)
            })
            .collect()
    }

    /// Fishing loot weights are pure probabilities; drop amounts are
    /// already captured by the node-size trial model.
    fn loot_weights(
        &self,
        player: &Character,
        node: &Node,
    ) -> Result<BTreeMap<ItemId, f64>, ModelError> {
        let scores = self.loot_frequency_scores(player, node);
        normalize_scores(&scores, &format!("loot of node '{}'", node.node_id))
    }

    fn expected_node_yield(&self, player: &Character, location: &Location, node: &Node) -> f64 {
        let ctx = self.yield_context(player, location, node);
        self.estimator.expected_node_yield(&ctx) * gathering_yield_multiplier(player)
    }

    fn expected_attempts_per_node(
        &self,
        player: &Character,
        location: &Location,
        node: &Node,
    ) -> f64 {
        let ctx = self.attempts_context(player, location, node);
        self.estimator.expected_attempts(&ctx)
    }

    fn zone_action_rate(&self, player: &Character, zone: &str) -> Result<f64, ModelError> {
        let location = self.catalog.zone(zone)?;
        if location.level > player.fishing_level {
            log::debug!("zone '{zone}' gated: requires fishing {}", location.level);
            return Ok(0.0);
        }
        let node_rates = self.node_distribution(player, location)?;
        let (node_search, loot_search) = self.search_times(player, location);
        let tries_to_find = self.average_tries_to_find_node(player, location);

        let mut total_actions = 0.0;
        let mut total_time = 0.0;
        for (node_id, rate) in &node_rates {
            let node = &location.nodes[node_id];
            let attempts = self.expected_attempts_per_node(player, location, node);
            total_time += (node_search * tries_to_find + loot_search * attempts) * rate;
            total_actions += self.expected_node_yield(player, location, node) * rate;
        }
        Ok(total_actions / total_time * 3600.0)
    }

    fn zone_experience_rate(&self, player: &Character, zone: &str) -> Result<f64, ModelError> {
        let location = self.catalog.zone(zone)?;
        if location.level > player.fishing_level {
            return Ok(0.0);
        }
        if let Some(table) = &self.alt_experience {
            let per_action = table.get(zone).copied().unwrap_or(0.0);
            return Ok(per_action * self.zone_action_rate(player, zone)?);
        }
        let node_rates = self.node_distribution(player, location)?;
        let (node_search, loot_search) = self.search_times(player, location);
        let tries_to_find = self.average_tries_to_find_node(player, location);

        let mut total_experience = 0.0;
        let mut total_time = 0.0;
        for (node_id, rate) in &node_rates {
            let node = &location.nodes[node_id];
            let attempts = self.expected_attempts_per_node(player, location, node);
            let size = self.expected_node_yield(player, location, node);
            total_time += (node_search * tries_to_find + loot_search * attempts) * rate;
            for (id, probability) in self.loot_weights(player, node)? {
                let xp = self
                    .items
                    .get(id)
                    .and_then(|def| def.experience)
                    .unwrap_or(30.0);
                total_experience += probability * size * rate * xp;
            }
        }
        Ok(total_experience / total_time * 3600.0)
    }
}
