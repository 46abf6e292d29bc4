//! Per-activity yield models sharing one capability contract.
//!
//! Each activity (mining, foraging, fishing) converts the static catalog
//! plus aggregated character stats into node-selection probabilities,
//! expected yields, and per-zone action/experience rates. The models are
//! stateless per call; the character is always passed in, never stored, so
//! a simulation can mutate its own clone freely.

use std::collections::BTreeMap;
use thiserror::Error;

use crate::catalog::{Activity, ActivityCatalog, CatalogError, Location, Node};
use crate::character::{Character, Skill};
use crate::items::ItemId;

mod fishing;
mod foraging;
mod mining;

pub use fishing::Fishing;
pub use foraging::Foraging;
pub use mining::Mining;

/// Errors raised by the yield models.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// A frequency table summed to zero; normalizing would divide by zero.
    #[error("total frequency is zero in {context}; cannot form a distribution")]
    ZeroTotalFrequency { context: String },
    #[error("no zones available for {activity}")]
    EmptyCatalog { activity: Activity },
}

/// Interval basis for item histograms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistogramInterval {
    /// Expected items per action.
    PerAction,
    /// Expected items per hour.
    PerHour,
}

/// Normalize clamped frequency scores into a probability simplex.
///
/// # Errors
///
/// Returns [`ModelError::ZeroTotalFrequency`] when the scores sum to zero;
/// silent NaN propagation is never acceptable here.
pub fn normalize_scores<K: Ord + Clone>(
    scores: &BTreeMap<K, f64>,
    context: &str,
) -> Result<BTreeMap<K, f64>, ModelError> {
    let total: f64 = scores.values().sum();
    if total <= 0.0 {
        return Err(ModelError::ZeroTotalFrequency {
            context: context.to_string(),
        });
    }
    Ok(scores
        .iter()
        .map(|(key, score)| (key.clone(), score / total))
        .collect())
}

/// Clamp a raw frequency into `[0, max_frequency]`.
#[must_use]
pub fn clamp_frequency(frequency: f64, max_frequency: f64) -> f64 {
    frequency.min(max_frequency).max(0.0)
}

/// Yield multiplier contributed by the gathering enchantment family,
/// applied uniformly across all three activities.
#[must_use]
pub fn gathering_yield_multiplier(player: &Character) -> f64 {
    1.0 + player.enchant_f64("gathering") * 0.04
        + player.enchant_f64("empoweredGathering") * 0.08
}

/// Capability contract shared by the three activity models.
pub trait Gathering {
    /// Activity this model serves.
    fn activity(&self) -> Activity;

    /// Skill whose level gates zones and receives simulated experience.
    fn skill(&self) -> Skill;

    /// The static catalog this model reads.
    fn catalog(&self) -> &ActivityCatalog;

    /// Skill level plus gear, set, and (where applicable) bait modifiers.
    fn effective_level(&self, player: &Character) -> f64;

    /// Clamped pre-normalization node frequency scores for a zone.
    fn node_frequency_scores(&self, player: &Character, location: &Location)
    -> BTreeMap<String, f64>;

    /// Clamped pre-normalization loot frequency scores for a node.
    fn loot_frequency_scores(&self, player: &Character, node: &Node) -> BTreeMap<ItemId, f64> {
        let _ = player;
        node.loot
            .values()
            .map(|loot| (loot.id, clamp_frequency(loot.frequency, loot.max_frequency)))
            .collect()
    }

    /// Node-selection probability distribution over a zone's nodes.
    ///
    /// # Errors
    ///
    /// Fails loudly when every node score is zero.
    fn node_distribution(
        &self,
        player: &Character,
        location: &Location,
    ) -> Result<BTreeMap<String, f64>, ModelError> {
        let scores = self.node_frequency_scores(player, location);
        normalize_scores(&scores, &format!("nodes of zone '{}'", location.name))
    }

    /// Loot drop probability distribution within a node.
    ///
    /// # Errors
    ///
    /// Fails loudly when every loot score is zero.
    fn loot_distribution(
        &self,
        player: &Character,
        node: &Node,
    ) -> Result<BTreeMap<ItemId, f64>, ModelError> {
        let scores = self.loot_frequency_scores(player, node);
        normalize_scores(&scores, &format!("loot of node '{}'", node.node_id))
    }

    /// Per-loot histogram weights: drop probability, with the expected
    /// drop amount folded in for the amount-carrying activities.
    ///
    /// # Errors
    ///
    /// Propagates distribution normalization failures.
    fn loot_weights(
        &self,
        player: &Character,
        node: &Node,
    ) -> Result<BTreeMap<ItemId, f64>, ModelError> {
        let distribution = self.loot_distribution(player, node)?;
        Ok(distribution
            .into_iter()
            .map(|(id, probability)| {
                let mean_amount = node
                    .loot
                    .get(&id)
                    .map(|loot| (loot.min_amount + loot.max_amount) / 2.0)
                    .unwrap_or(0.0);
                (id, probability * mean_amount)
            })
            .collect())
    }

    /// Expected resource units produced by one node.
    fn expected_node_yield(&self, player: &Character, location: &Location, node: &Node) -> f64;

    /// Expected actions spent exhausting one node.
    fn expected_attempts_per_node(
        &self,
        player: &Character,
        location: &Location,
        node: &Node,
    ) -> f64;

    /// Actions per hour in a zone; exactly 0 when the zone outlevels the
    /// player.
    ///
    /// # Errors
    ///
    /// Unknown zone names and degenerate distributions are errors.
    fn zone_action_rate(&self, player: &Character, zone: &str) -> Result<f64, ModelError>;

    /// Experience per hour in a zone; exactly 0 when the zone outlevels
    /// the player. When an experience override table is configured it
    /// takes precedence over the loot-weighted sum.
    ///
    /// # Errors
    ///
    /// Unknown zone names and degenerate distributions are errors.
    fn zone_experience_rate(&self, player: &Character, zone: &str) -> Result<f64, ModelError>;

    /// Expected items per action (or per hour) in a zone, keyed by item id.
    ///
    /// # Errors
    ///
    /// Unknown zone names and degenerate distributions are errors.
    fn zone_item_histogram(
        &self,
        player: &Character,
        zone: &str,
        interval: HistogramInterval,
    ) -> Result<BTreeMap<ItemId, f64>, ModelError> {
        let location = self.catalog().zone(zone)?;
        let node_rates = self.node_distribution(player, location)?;
        let action_rate = match interval {
            HistogramInterval::PerAction => 1.0,
            HistogramInterval::PerHour => self.zone_action_rate(player, zone)?,
        };

        let mut items: BTreeMap<ItemId, f64> = BTreeMap::new();
        let mut total_actions = 0.0;
        for (node_id, rate) in &node_rates {
            let node = &location.nodes[node_id];
            let yield_per_node = self.expected_node_yield(player, location, node);
            total_actions += self.expected_attempts_per_node(player, location, node) * rate;
            for (id, weight) in self.loot_weights(player, node)? {
                *items.entry(id).or_insert(0.0) += weight * yield_per_node * rate * action_rate;
            }
        }
        if total_actions <= 0.0 {
            return Err(ModelError::ZeroTotalFrequency {
                context: format!("actions in zone '{}'", location.name),
            });
        }
        Ok(items
            .into_iter()
            .map(|(id, value)| (id, value / total_actions))
            .collect())
    }

    /// Best experience-per-hour across every zone in the catalog. The
    /// simulator assumes the player always works their best eligible zone.
    ///
    /// # Errors
    ///
    /// Fails when the catalog has no zones or a zone rate fails.
    fn max_experience_rate(&self, player: &Character) -> Result<f64, ModelError> {
        let catalog = self.catalog();
        if catalog.is_empty() {
            return Err(ModelError::EmptyCatalog {
                activity: self.activity(),
            });
        }
        let mut best = 0.0f64;
        for zone in catalog.zones() {
            let rate = self.zone_experience_rate(player, &zone.name)?;
            best = best.max(rate);
        }
        Ok(best)
    }
}
