//! Mining yield model.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::catalog::{Activity, ActivityCatalog, Location, Node};
use crate::character::{Character, Skill};
use crate::items::{ItemDatabase, ItemId};

use super::{Gathering, HistogramInterval, ModelError, gathering_yield_multiplier};

/// Ore → bar transmutation targets for the superheating enchantment.
const SUPERHEAT_TABLE: [(ItemId, ItemId); 10] = [
    (101, 201), // Copper
    (102, 201), // Tin
    (103, 202), // Iron
    (104, 203), // Gold
    (105, 204), // Mithril
    (106, 205), // Adamantite
    (107, 206), // Runite
    (110, 3001), // Sand
    (114, 207), // Stygian
    (115, 208), // Void
];

fn superheat_target(ore: ItemId) -> Option<ItemId> {
    SUPERHEAT_TABLE
        .iter()
        .find(|(from, _)| *from == ore)
        .map(|(_, to)| *to)
}

/// Mining rate model over a mining catalog.
#[derive(Debug, Clone)]
pub struct Mining {
    catalog: Arc<ActivityCatalog>,
    items: Arc<ItemDatabase>,
    alt_experience: Option<HashMap<String, f64>>,
}

impl Mining {
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

    /// Item actually produced, after any superheat transmutation of ores
    /// into their bars.
    fn produced_item(&self, player: &Character, id: ItemId) -> ItemId {
        if player.enchant("superheating") > 0 {
            superheat_target(id).unwrap_or(id)
        } else {
            id
        }
    }

    fn item_experience(&self, id: ItemId) -> f64 {
        self.items
            .get(id)
            .and_then(|def| def.experience)
            .unwrap_or(1.0)
    }
}

impl Gathering for Mining {
    fn activity(&self) -> Activity {
        Activity::Mining
    }

    fn skill(&self) -> Skill {
        Skill::Mining
    }

    fn catalog(&self) -> &ActivityCatalog {
        &self.catalog
    }

    fn effective_level(&self, player: &Character) -> f64 {
        f64::from(player.mining_level)
            + player.mining_bonus * (1.0 + player.mining_set_bonus)
    }

    fn node_frequency_scores(
        &self,
        _player: &Character,
        location: &Location,
    ) -> BTreeMap<String, f64> {
        location
            .nodes
            .values()
            .map(|node| (node.node_id.clone(), node.frequency.max(0.0)))
            .collect()
    }

    /// Loot weights keyed by the produced item, so histograms report bar
    /// ids while superheating is active.
    fn loot_weights(
        &self,
        player: &Character,
        node: &Node,
    ) -> Result<BTreeMap<ItemId, f64>, ModelError> {
        let distribution = self.loot_distribution(player, node)?;
        let mut weights: BTreeMap<ItemId, f64> = BTreeMap::new();
        for (id, probability) in distribution {
            let mean_amount = node
                .loot
                .get(&id)
                .map(|loot| (loot.min_amount + loot.max_amount) / 2.0)
                .unwrap_or(0.0);
            *weights.entry(self.produced_item(player, id)).or_insert(0.0) +=
                probability * mean_amount;
        }
        Ok(weights)
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
        // One action per resource unit; the mean size stands in for both.
        node.mean_base_amount()
    }

    fn zone_action_rate(&self, player: &Character, zone: &str) -> Result<f64, ModelError> {
        let location = self.catalog.zone(zone)?;
        if location.level > player.mining_level {
            log::debug!("zone '{zone}' gated: requires mining {}", location.level);
            return Ok(0.0);
        }
        Ok(self.rate_modifier(player) * 3_600_000.0 / location.base_duration)
    }

    fn zone_experience_rate(&self, player: &Character, zone: &str) -> Result<f64, ModelError> {
        let location = self.catalog.zone(zone)?;
        if location.level > player.mining_level {
            return Ok(0.0);
        }
        if let Some(table) = &self.alt_experience {
            let per_action = table.get(zone).copied().unwrap_or(0.0);
            return Ok(per_action * self.zone_action_rate(player, zone)?);
        }
        let histogram = self.zone_item_histogram(player, zone, HistogramInterval::PerAction)?;
        let weighted_xp: f64 = histogram
            .iter()
            .map(|(id, per_action)| per_action * self.item_experience(*id))
            .sum();
        Ok(weighted_xp * self.rate_modifier(player) * 3_600_000.0 / location.base_duration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{NodeLoot, NodeTagSet};
    use crate::items::ItemDef;

    fn loot(id: ItemId, frequency: f64, amount: f64) -> NodeLoot {
        NodeLoot {
            id,
            frequency,
            max_frequency: frequency,
            min_amount: amount,
            max_amount: amount,
            item_class: "ore".to_string(),
        }
    }

    fn single_node_catalog(zone_level: u32) -> ActivityCatalog {
        let node = Node {
            node_id: "vein".to_string(),
            frequency: 1.0,
            max_frequency: 1.0,
            minimum_base_amount: 10.0,
            maximum_base_amount: 10.0,
            tags: NodeTagSet::new(),
            loot: [(101, loot(101, 1.0, 1.0))].into_iter().collect(),
        };
        let location = Location {
            name: "Quarry".to_string(),
            loc_id: 1,
            activity: Activity::Mining,
            base_duration: 3_600_000.0,
            level: zone_level,
            nodes: [("vein".to_string(), node)].into_iter().collect(),
        };
        ActivityCatalog::from_locations(
            Activity::Mining,
            [("Quarry".to_string(), location)].into_iter().collect(),
        )
    }

    fn item_db() -> ItemDatabase {
        let mut raw = HashMap::new();
        raw.insert(
            101,
            ItemDef {
                name: "Copper Ore".to_string(),
                experience: Some(5.0),
                ..ItemDef::default()
            },
        );
        raw.insert(
            201,
            ItemDef {
                name: "Copper Bar".to_string(),
                experience: Some(25.0),
                ..ItemDef::default()
            },
        );
        ItemDatabase::from_items(raw)
    }

    fn model(zone_level: u32) -> Mining {
        Mining::new(Arc::new(single_node_catalog(zone_level)), Arc::new(item_db()))
    }

    #[test]
    fn baseline_yield_is_mean_base_amount() {
        let mining = model(1);
        let player = Character::default();
        let zone = mining.catalog().zone("Quarry").unwrap();
        let node = &zone.nodes["vein"];
        assert!((mining.expected_node_yield(&player, zone, node) - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zone_gating_returns_exact_zero() {
        let mining = model(50);
        let player = Character::default();
        assert!((mining.zone_action_rate(&player, "Quarry").unwrap() - 0.0).abs() < f64::EPSILON);
        assert!(
            (mining.zone_experience_rate(&player, "Quarry").unwrap() - 0.0).abs() < f64::EPSILON
        );
    }

    #[test]
    fn action_rate_follows_effective_level() {
        let mining = model(1);
        let player = Character::default();
        // Level 1, no bonuses: modifier (1+99)/100 = 1, one action per hour
        // at a one-hour base duration.
        let rate = mining.zone_action_rate(&player, "Quarry").unwrap();
        assert!((rate - 1.0).abs() < 1e-12);

        let boosted = Character {
            mining_level: 1,
            mining_bonus: 100.0,
            mining_set_bonus: 0.2,
            ..Character::default()
        };
        // Effective level 1 + 100*1.2 = 121 -> modifier 2.2.
        let rate = mining.zone_action_rate(&boosted, "Quarry").unwrap();
        assert!((rate - 2.2).abs() < 1e-12);
    }

    #[test]
    fn experience_rate_weights_loot_by_item_experience() {
        let mining = model(1);
        let player = Character::default();
        // One item at probability 1 and amount 1: xp/action = 5.
        let rate = mining.zone_experience_rate(&player, "Quarry").unwrap();
        assert!((rate - 5.0).abs() < 1e-9);
    }

    #[test]
    fn superheating_credits_bar_experience() {
        let mining = model(1);
        let mut player = Character::default();
        player.enchantments.insert("superheating".to_string(), 1);
        let rate = mining.zone_experience_rate(&player, "Quarry").unwrap();
        assert!((rate - 25.0).abs() < 1e-9);
    }

    #[test]
    fn superheating_transmutes_histogram_items() {
        let mining = model(1);
        let mut player = Character::default();
        let plain = mining
            .zone_item_histogram(&player, "Quarry", HistogramInterval::PerAction)
            .unwrap();
        player.enchantments.insert("superheating".to_string(), 1);
        let heated = mining
            .zone_item_histogram(&player, "Quarry", HistogramInterval::PerAction)
            .unwrap();
        // The ore id disappears; its weight moves to the bar unchanged.
        assert!(!heated.contains_key(&101));
        assert!((heated[&201] - plain[&101]).abs() < 1e-12);
    }

    #[test]
    fn override_table_takes_precedence() {
        let mining =
            model(1).with_experience_override([("Quarry".to_string(), 40.0)].into_iter().collect());
        let player = Character::default();
        let rate = mining.zone_experience_rate(&player, "Quarry").unwrap();
        // 40 xp per action at one action per hour.
        assert!((rate - 40.0).abs() < 1e-9);
    }

    #[test]
    fn max_experience_picks_best_zone() {
        let mining = model(1);
        let player = Character::default();
        let best = mining.max_experience_rate(&player).unwrap();
        assert!((best - 5.0).abs() < 1e-9);
    }
}
