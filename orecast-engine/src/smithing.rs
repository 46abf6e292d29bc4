//! Smithing crafting-cost model.
//!
//! A stateless formula: one crafting action's time, experience, output
//! quantity, and per-resource cost, given a forge, a bar, and an intensity
//! setting. Intensity below the bar's tier is allowed; the exponential
//! multipliers simply invert, which penalizes under-tier crafting.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;

use crate::character::Character;
use crate::items::{HEAT_ITEM_ID, ItemDatabase, ItemId};
use crate::numbers::ceil_f64_to_i64;

/// Errors raised by the crafting planner.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SmithingError {
    #[error("unknown forge id {id}")]
    UnknownForge { id: u32 },
    #[error("unknown bar item id {id}")]
    UnknownBar { id: ItemId },
    #[error("bar item {id} has no required-resources recipe")]
    MissingRecipe { id: ItemId },
}

/// One forge record from the forge table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgeDef {
    #[serde(default = "default_one")]
    pub forge_speed_mult: f64,
    #[serde(default = "default_one")]
    pub forge_intensity_speed_mult: f64,
    #[serde(default = "default_one", rename = "forgeXPMult")]
    pub forge_xp_mult: f64,
    #[serde(default)]
    pub forge_bonus_bars: f64,
    #[serde(default = "default_one")]
    pub forge_intensity_bonus_bars: f64,
    #[serde(default = "default_one")]
    pub forge_intensity_heat_cost_mult: f64,
    #[serde(default = "default_one")]
    pub forge_intensity_material_cost_mult: f64,
    #[serde(default = "default_one")]
    pub forge_heat_cost: f64,
    #[serde(default = "default_one")]
    pub forge_material_cost: f64,
}

const fn default_one() -> f64 {
    1.0
}

impl Default for ForgeDef {
    fn default() -> Self {
        Self {
            forge_speed_mult: 1.0,
            forge_intensity_speed_mult: 1.0,
            forge_xp_mult: 1.0,
            forge_bonus_bars: 0.0,
            forge_intensity_bonus_bars: 1.0,
            forge_intensity_heat_cost_mult: 1.0,
            forge_intensity_material_cost_mult: 1.0,
            forge_heat_cost: 1.0,
            forge_material_cost: 1.0,
        }
    }
}

/// Immutable id-keyed forge table.
#[derive(Debug, Clone, Default)]
pub struct ForgeDatabase {
    forges: HashMap<u32, ForgeDef>,
}

impl ForgeDatabase {
    #[must_use]
    pub fn from_forges(forges: HashMap<u32, ForgeDef>) -> Self {
        Self { forges }
    }

    /// Parse the raw forge table JSON (a map of id strings to records).
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into forge records.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, ForgeDef> = serde_json::from_str(json)?;
        let forges = raw
            .into_iter()
            .filter_map(|(key, def)| key.parse::<u32>().ok().map(|id| (id, def)))
            .collect();
        Ok(Self { forges })
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<&ForgeDef> {
        self.forges.get(&id)
    }
}

/// Time, experience, output, and cost of one crafting action.
#[derive(Debug, Clone, PartialEq)]
pub struct SmithingPlan {
    /// Crafting time in seconds.
    pub time: f64,
    pub experience: f64,
    /// Expected bars produced per action.
    pub output: f64,
    /// Resource display name → whole units consumed.
    pub cost: BTreeMap<String, i64>,
}

/// Crafting planner over a forge table and the item database.
#[derive(Debug, Clone)]
pub struct Smithing {
    forges: ForgeDatabase,
    items: Arc<ItemDatabase>,
}

impl Smithing {
    #[must_use]
    pub fn new(forges: ForgeDatabase, items: Arc<ItemDatabase>) -> Self {
        Self { forges, items }
    }

    /// Plan one crafting action.
    ///
    /// # Errors
    ///
    /// Fails on unknown forge or bar ids and on bars without a recipe.
    pub fn plan(
        &self,
        player: &Character,
        forge_id: u32,
        bar_id: ItemId,
        intensity: i32,
    ) -> Result<SmithingPlan, SmithingError> {
        let forge = self
            .forges
            .get(forge_id)
            .ok_or(SmithingError::UnknownForge { id: forge_id })?;
        let bar = self
            .items
            .get(bar_id)
            .ok_or(SmithingError::UnknownBar { id: bar_id })?;
        let recipe = bar
            .required_resources
            .first()
            .ok_or(SmithingError::MissingRecipe { id: bar_id })?;

        let total_level =
            f64::from(player.smithing_level) + player.smithing_mastery + player.smithing_bonus;
        let haste = 1.0 + player.enchant_f64("haste") * 0.04;
        let efficiency = player.enchant_f64("efficiency") * 0.01;
        let pyromancy = player.enchant_f64("pyromancy") * 0.05;
        let pure_metals = player.enchant_f64("pureMetals") * 0.04;
        let metallurgy = player.enchant_f64("metallurgy") * 0.6;

        let bar_level = f64::from(bar.level.unwrap_or(1));
        let bar_tier = (bar_level / (13.5 + metallurgy)).round().max(1.0);
        // Deliberately unfloored: intensity below tier flips the
        // exponents and makes under-tier crafting a penalty.
        let effective_intensity = f64::from(intensity) - bar_tier;

        let power_mult = 360.0 / (360.0 + 2.5 * player.smithing_mastery + total_level - 1.0);
        let time = bar.time.unwrap_or(0.0)
            * forge.forge_speed_mult
            * forge.forge_intensity_speed_mult.powf(effective_intensity)
            * power_mult
            / haste
            / 1000.0;
        let experience = bar.experience.unwrap_or(0.0) * forge.forge_xp_mult;
        let output = 1.0
            + forge.forge_bonus_bars * forge.forge_intensity_bonus_bars.powf(effective_intensity)
            + efficiency;

        let heat_multiplier = forge.forge_intensity_heat_cost_mult.powf(effective_intensity)
            * forge.forge_heat_cost
            * (1.0 - pyromancy);
        let material_multiplier = forge
            .forge_intensity_material_cost_mult
            .powf(effective_intensity)
            * forge.forge_material_cost
            * (1.0 - pure_metals);

        let mut cost = BTreeMap::new();
        for (resource_key, amount) in recipe {
            let multiplier = if resource_key.parse::<ItemId>() == Ok(HEAT_ITEM_ID) {
                heat_multiplier
            } else {
                material_multiplier
            };
            let name = resource_key
                .parse::<ItemId>()
                .ok()
                .and_then(|id| self.items.get(id))
                .map_or_else(|| resource_key.clone(), |def| def.name.clone());
            cost.insert(name, ceil_f64_to_i64(amount * multiplier));
        }

        Ok(SmithingPlan {
            time,
            experience,
            output,
            cost,
        })
    }
}
