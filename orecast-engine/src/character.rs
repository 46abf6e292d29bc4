//! Character stats, equipment sets, and the equipment → bonus aggregation.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::items::{ItemDatabase, ItemId};
use crate::numbers::floor_f64_to_u32;

/// Item-set identifiers recognized by the set-bonus scan.
const MINING_SET_ID: u32 = 10_007;
const FORAGING_SET_ID: u32 = 10_005;
const FISHING_SET_ID: u32 = 10_001;

/// Skills tracked by the character sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Mining,
    Foraging,
    Fishing,
    Smithing,
}

impl std::fmt::Display for Skill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mining => write!(f, "mining"),
            Self::Foraging => write!(f, "foraging"),
            Self::Fishing => write!(f, "fishing"),
            Self::Smithing => write!(f, "smithing"),
        }
    }
}

/// Mutable bag of per-skill levels, gear bonuses, set bonuses, and
/// enchantment ranks.
///
/// All derived bonus fields stay at zero until [`Character::apply_equipment`]
/// runs; they are only valid for the most recently applied equipment set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Character {
    // Mining
    pub mining_level: u32,
    pub mining_bonus: f64,
    pub mining_set_bonus: f64,
    // Foraging
    pub foraging_level: u32,
    pub foraging_bonus: f64,
    pub foraging_set_bonus: f64,
    // Fishing
    pub fishing_level: u32,
    pub fishing_bonus: f64,
    pub fishing_set_bonus: f64,
    pub bait_fishing_bonus: f64,
    pub bait_power: f64,
    pub bait_bait_power: f64,
    pub reel_power: f64,
    pub bait_reel_power: f64,
    pub bonus_rarity: f64,
    pub bait_bonus_rarity: f64,
    // Smithing
    pub smithing_level: u32,
    pub smithing_mastery: f64,
    pub smithing_bonus: f64,
    /// Enchantment name → rank. Absent means rank 0.
    #[serde(default)]
    pub enchantments: HashMap<String, i32>,
}

impl Default for Character {
    fn default() -> Self {
        Self {
            mining_level: 1,
            mining_bonus: 0.0,
            mining_set_bonus: 0.0,
            foraging_level: 1,
            foraging_bonus: 0.0,
            foraging_set_bonus: 0.0,
            fishing_level: 1,
            fishing_bonus: 0.0,
            fishing_set_bonus: 0.0,
            bait_fishing_bonus: 0.0,
            bait_power: 0.0,
            bait_bait_power: 0.0,
            reel_power: 0.0,
            bait_reel_power: 0.0,
            bonus_rarity: 0.0,
            bait_bonus_rarity: 0.0,
            smithing_level: 1,
            smithing_mastery: 0.0,
            smithing_bonus: 0.0,
            enchantments: HashMap::new(),
        }
    }
}

impl Character {
    /// Rank of an enchantment, 0 when not active.
    #[must_use]
    pub fn enchant(&self, name: &str) -> i32 {
        self.enchantments.get(name).copied().unwrap_or(0)
    }

    /// Rank of an enchantment as a float modifier input.
    #[must_use]
    pub fn enchant_f64(&self, name: &str) -> f64 {
        f64::from(self.enchant(name))
    }

    /// Nominal level of a skill.
    #[must_use]
    pub const fn skill_level(&self, skill: Skill) -> u32 {
        match skill {
            Skill::Mining => self.mining_level,
            Skill::Foraging => self.foraging_level,
            Skill::Fishing => self.fishing_level,
            Skill::Smithing => self.smithing_level,
        }
    }

    /// Overwrite the nominal level of a skill.
    pub fn set_skill_level(&mut self, skill: Skill, level: u32) {
        match skill {
            Skill::Mining => self.mining_level = level,
            Skill::Foraging => self.foraging_level = level,
            Skill::Fishing => self.fishing_level = level,
            Skill::Smithing => self.smithing_level = level,
        }
    }

    fn reset_derived_stats(&mut self) {
        self.mining_bonus = 0.0;
        self.mining_set_bonus = 0.0;
        self.foraging_bonus = 0.0;
        self.foraging_set_bonus = 0.0;
        self.fishing_bonus = 0.0;
        self.fishing_set_bonus = 0.0;
        self.bait_fishing_bonus = 0.0;
        self.bait_power = 0.0;
        self.bait_bait_power = 0.0;
        self.reel_power = 0.0;
        self.bait_reel_power = 0.0;
        self.bonus_rarity = 0.0;
        self.bait_bonus_rarity = 0.0;
        self.smithing_bonus = 0.0;
    }

    /// Tally derived bonuses from an equipment set.
    ///
    /// Derived fields are reset first, then every non-empty slot is scanned
    /// in fixed slot order. Unresolvable item names are skipped silently;
    /// they represent empty or placeholder slots. Bait-derived fields are
    /// overwritten (not summed) by the last bait item seen. Set bonuses
    /// trigger only at exactly 3 (0.2) or 4 (0.4) matching pieces.
    pub fn apply_equipment(&mut self, set: &EquipmentSet, items: &ItemDatabase) {
        self.reset_derived_stats();
        let mut mining_pieces = 0u32;
        let mut foraging_pieces = 0u32;
        let mut fishing_pieces = 0u32;
        for slot in EquipmentSlot::ALL {
            let Some(component) = set.component(slot) else {
                continue;
            };
            let Some(item) = items.get_by_name(&component.name) else {
                continue;
            };
            let augment = f64::from(component.augment);
            if let Some(stats) = &item.equipment_stats {
                for tb in &stats.tool_boost {
                    match tb.skill.as_str() {
                        "mining" => self.mining_bonus += tb.boost,
                        "foraging" => self.foraging_bonus += tb.boost,
                        "fishing" => self.fishing_bonus += tb.boost,
                        "fishingBaitPower" => self.bait_power += tb.boost,
                        "fishingReelPower" => self.reel_power += tb.boost,
                        "fishingRarityPower" => self.bonus_rarity += tb.boost,
                        _ => {}
                    }
                }
                for ab in &stats.augmentation_bonus {
                    let gain = ab.value * augment;
                    match ab.stat.as_str() {
                        "toolBoost.mining" => self.mining_bonus += gain,
                        "toolBoost.foraging" => self.foraging_bonus += gain,
                        "toolBoost.fishing" => self.fishing_bonus += gain,
                        "toolBoost.fishingBaitPower" => self.bait_power += gain,
                        "toolBoost.fishingReelPower" => self.reel_power += gain,
                        "toolBoost.fishingRarityPower" => self.bonus_rarity += gain,
                        _ => {}
                    }
                }
                if stats.item_set.contains(&MINING_SET_ID) {
                    mining_pieces += 1;
                }
                if stats.item_set.contains(&FORAGING_SET_ID) {
                    foraging_pieces += 1;
                }
                if stats.item_set.contains(&FISHING_SET_ID) {
                    fishing_pieces += 1;
                }
            }
            if let Some(bait) = item.fishing_bait {
                self.bait_fishing_bonus = bait.level;
                self.bait_bait_power = bait.bait;
                self.bait_reel_power = bait.reel;
                self.bait_bonus_rarity = bait.bonus;
            }
        }
        self.mining_set_bonus = set_bonus_for(mining_pieces);
        self.foraging_set_bonus = set_bonus_for(foraging_pieces);
        self.fishing_set_bonus = set_bonus_for(fishing_pieces);
    }
}

/// Thresholded set-bonus mapping. Exact counts only; 5+ worn pieces grant
/// nothing extra, matching the game's rules.
const fn set_bonus_for(pieces: u32) -> f64 {
    match pieces {
        3 => 0.2,
        4 => 0.4,
        _ => 0.0,
    }
}

/// Named equipment slots, scanned in declaration order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    Helm,
    Body,
    Legs,
    Shield,
    Weapon,
    Boots,
    Gloves,
    Cape,
    Arrows,
    Ring,
    Necklace,
    Pickaxe,
    Hatchet,
    Hoe,
    Tongs,
    Tome,
    Tacklebox,
    Bait,
}

impl EquipmentSlot {
    pub const ALL: [Self; 18] = [
        Self::Helm,
        Self::Body,
        Self::Legs,
        Self::Shield,
        Self::Weapon,
        Self::Boots,
        Self::Gloves,
        Self::Cape,
        Self::Arrows,
        Self::Ring,
        Self::Necklace,
        Self::Pickaxe,
        Self::Hatchet,
        Self::Hoe,
        Self::Tongs,
        Self::Tome,
        Self::Tacklebox,
        Self::Bait,
    ];

    /// Wire name of the slot as used by the item table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Helm => "helm",
            Self::Body => "body",
            Self::Legs => "legs",
            Self::Shield => "shield",
            Self::Weapon => "weapon",
            Self::Boots => "boots",
            Self::Gloves => "gloves",
            Self::Cape => "cape",
            Self::Arrows => "arrows",
            Self::Ring => "ring",
            Self::Necklace => "necklace",
            Self::Pickaxe => "pickaxe",
            Self::Hatchet => "hatchet",
            Self::Hoe => "hoe",
            Self::Tongs => "tongs",
            Self::Tome => "tome",
            Self::Tacklebox => "tacklebox",
            Self::Bait => "bait",
        }
    }
}

/// An equipped item reference: display name plus augment level, carried
/// around as the composite key `"<name>_<augment>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentComponent {
    pub name: String,
    pub augment: u32,
}

impl EquipmentComponent {
    #[must_use]
    pub fn new(name: &str, augment: u32) -> Self {
        Self {
            name: name.to_string(),
            augment,
        }
    }

    /// Composite key form used by stored equipment sets.
    #[must_use]
    pub fn as_key(&self) -> String {
        format!("{}_{}", self.name, self.augment)
    }

    /// Parse a composite key. The augment is the suffix after the last
    /// underscore so item names containing spaces survive.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let (name, augment) = key.rsplit_once('_')?;
        let augment = augment.parse().ok()?;
        Some(Self {
            name: name.to_string(),
            augment,
        })
    }
}

/// A named-slot equipment loadout. A character typically keeps one per
/// activity but only the most recently applied one is reflected in stats.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EquipmentSet {
    slots: BTreeMap<EquipmentSlot, EquipmentComponent>,
}

impl EquipmentSet {
    /// An empty loadout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Equip an item by name and augment level.
    pub fn equip(&mut self, slot: EquipmentSlot, name: &str, augment: u32) {
        self.slots
            .insert(slot, EquipmentComponent::new(name, augment));
    }

    /// Clear a slot.
    pub fn unequip(&mut self, slot: EquipmentSlot) {
        self.slots.remove(&slot);
    }

    /// Component in a slot, if any.
    #[must_use]
    pub fn component(&self, slot: EquipmentSlot) -> Option<&EquipmentComponent> {
        self.slots.get(&slot)
    }

    /// Item names equippable in a slot, keyed by item id. Bait items match
    /// the bait slot by their bait block rather than an equipment slot tag.
    #[must_use]
    pub fn matching_items(
        items: &ItemDatabase,
        slot: EquipmentSlot,
        related_skill: Option<&str>,
    ) -> BTreeMap<ItemId, String> {
        let mut matches = BTreeMap::new();
        if slot == EquipmentSlot::Bait {
            for (id, def) in items.iter() {
                if def.fishing_bait.is_some() {
                    matches.insert(id, def.name.clone());
                }
            }
        }
        for (id, def) in items.iter() {
            if def.class != "equipment" {
                continue;
            }
            let Some(stats) = &def.equipment_stats else {
                continue;
            };
            if stats.slot != slot.as_str() {
                continue;
            }
            if let Some(skill) = related_skill {
                if def.related_skill.as_deref() != Some(skill) {
                    continue;
                }
            }
            matches.insert(id, def.name.clone());
        }
        matches
    }
}

/// Error raised when a scripted event names an unrecognized stat.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StatKeyError {
    #[error("unknown stat key '{key}'")]
    Unknown { key: String },
}

/// Typed handle on a character field addressable from scripted events.
///
/// This is the explicit dispatch table standing in for by-name attribute
/// access: each recognized name resolves to a getter/setter pair once, and
/// unrecognized names are a configuration error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatKey {
    MiningLevel,
    MiningBonus,
    ForagingLevel,
    ForagingBonus,
    FishingLevel,
    FishingBonus,
    BaitPower,
    ReelPower,
    BonusRarity,
    SmithingLevel,
    SmithingMastery,
    SmithingBonus,
    Enchantment(String),
}

impl std::str::FromStr for StatKey {
    type Err = StatKeyError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        if let Some(name) = key.strip_prefix("enchantments:") {
            return Ok(Self::Enchantment(name.to_string()));
        }
        match key {
            "mining_level" => Ok(Self::MiningLevel),
            "mining_bonus" => Ok(Self::MiningBonus),
            "foraging_level" => Ok(Self::ForagingLevel),
            "foraging_bonus" => Ok(Self::ForagingBonus),
            "fishing_level" => Ok(Self::FishingLevel),
            "fishing_bonus" => Ok(Self::FishingBonus),
            "bait_power" => Ok(Self::BaitPower),
            "reel_power" => Ok(Self::ReelPower),
            "bonus_rarity" => Ok(Self::BonusRarity),
            "smithing_level" => Ok(Self::SmithingLevel),
            "smithing_mastery" => Ok(Self::SmithingMastery),
            "smithing_bonus" => Ok(Self::SmithingBonus),
            _ => Err(StatKeyError::Unknown {
                key: key.to_string(),
            }),
        }
    }
}

impl StatKey {
    /// Current value of the addressed field.
    #[must_use]
    pub fn value(&self, character: &Character) -> f64 {
        match self {
            Self::MiningLevel => f64::from(character.mining_level),
            Self::MiningBonus => character.mining_bonus,
            Self::ForagingLevel => f64::from(character.foraging_level),
            Self::ForagingBonus => character.foraging_bonus,
            Self::FishingLevel => f64::from(character.fishing_level),
            Self::FishingBonus => character.fishing_bonus,
            Self::BaitPower => character.bait_power,
            Self::ReelPower => character.reel_power,
            Self::BonusRarity => character.bonus_rarity,
            Self::SmithingLevel => f64::from(character.smithing_level),
            Self::SmithingMastery => character.smithing_mastery,
            Self::SmithingBonus => character.smithing_bonus,
            Self::Enchantment(name) => character.enchant_f64(name),
        }
    }

    /// Ceiling-merge `value` into the addressed field: the field is raised
    /// to `value` when higher and never lowered.
    pub fn apply_max(&self, character: &mut Character, value: f64) {
        let merged = self.value(character).max(value);
        match self {
            Self::MiningLevel => character.mining_level = floor_f64_to_u32(merged),
            Self::MiningBonus => character.mining_bonus = merged,
            Self::ForagingLevel => character.foraging_level = floor_f64_to_u32(merged),
            Self::ForagingBonus => character.foraging_bonus = merged,
            Self::FishingLevel => character.fishing_level = floor_f64_to_u32(merged),
            Self::FishingBonus => character.fishing_bonus = merged,
            Self::BaitPower => character.bait_power = merged,
            Self::ReelPower => character.reel_power = merged,
            Self::BonusRarity => character.bonus_rarity = merged,
            Self::SmithingLevel => character.smithing_level = floor_f64_to_u32(merged),
            Self::SmithingMastery => character.smithing_mastery = merged,
            Self::SmithingBonus => character.smithing_bonus = merged,
            Self::Enchantment(name) => {
                let rank = crate::numbers::round_f64_to_i32(merged);
                character.enchantments.insert(name.clone(), rank);
            }
        }
    }
}
