//! Item database records.
//!
//! The item table is consumed read-only as opaque structured records; only
//! the fields the rate models care about are typed here. Everything else in
//! the source data is ignored by serde.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Numeric item identifier as used by loot tables and the forge database.
pub type ItemId = u32;

/// Reserved identifier for the "heat" pseudo-resource consumed by forges.
pub const HEAT_ITEM_ID: ItemId = 2;

/// Flat skill-tagged boost contributed by an equipped tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolBoost {
    pub skill: String,
    #[serde(default)]
    pub boost: f64,
}

/// Per-augment-level stat bonus contributed by an equipped item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentationBonus {
    pub stat: String,
    #[serde(default)]
    pub value: f64,
}

/// Equipment block attached to wearable/wieldable items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentStats {
    #[serde(default)]
    pub slot: String,
    #[serde(default)]
    pub tool_boost: Vec<ToolBoost>,
    #[serde(default)]
    pub augmentation_bonus: Vec<AugmentationBonus>,
    #[serde(default)]
    pub item_set: Vec<u32>,
}

/// Bait block attached to consumable fishing bait items.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct FishingBaitProps {
    #[serde(default)]
    pub level: f64,
    #[serde(default)]
    pub bait: f64,
    #[serde(default)]
    pub reel: f64,
    #[serde(default)]
    pub bonus: f64,
}

/// A single item record from the game-data item table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ItemDef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub experience: Option<f64>,
    #[serde(default)]
    pub level: Option<u32>,
    /// Base crafting time in milliseconds (bars and other craftables).
    #[serde(default)]
    pub time: Option<f64>,
    #[serde(default)]
    pub related_skill: Option<String>,
    #[serde(default)]
    pub equipment_stats: Option<EquipmentStats>,
    #[serde(default)]
    pub fishing_bait: Option<FishingBaitProps>,
    /// Recipe inputs: each entry maps resource item id (as a string on the
    /// wire) to the required amount.
    #[serde(default)]
    pub required_resources: Vec<HashMap<String, f64>>,
}

/// Immutable id-keyed item table with a name index.
#[derive(Debug, Clone, Default)]
pub struct ItemDatabase {
    items: HashMap<ItemId, ItemDef>,
    by_name: HashMap<String, ItemId>,
}

impl ItemDatabase {
    /// Create an empty database (useful for tests).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a database from pre-parsed records.
    #[must_use]
    pub fn from_items(items: HashMap<ItemId, ItemDef>) -> Self {
        let mut db = Self {
            items,
            by_name: HashMap::new(),
        };
        for (id, def) in &mut db.items {
            // Apostrophes are stripped so display names survive cookie and
            // query-string round trips in downstream consumers.
            def.name = def.name.replace('\'', "");
            db.by_name.insert(def.name.clone(), *id);
        }
        db
    }

    /// Parse the raw item table JSON (a map of id strings to records).
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into item records.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, ItemDef> = serde_json::from_str(json)?;
        let items = raw
            .into_iter()
            .filter_map(|(key, def)| key.parse::<ItemId>().ok().map(|id| (id, def)))
            .collect();
        Ok(Self::from_items(items))
    }

    /// Look up an item by id.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&ItemDef> {
        self.items.get(&id)
    }

    /// Look up an item by display name. A miss is not an error; empty or
    /// placeholder equipment slots resolve to nothing.
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<&ItemDef> {
        self.by_name.get(name).and_then(|id| self.items.get(id))
    }

    /// Id for a display name, if known.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<ItemId> {
        self.by_name.get(name).copied()
    }

    /// Iterate over all records.
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &ItemDef)> {
        self.items.iter().map(|(id, def)| (*id, def))
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the table holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "101": {
            "name": "Miner's Pick",
            "class": "equipment",
            "equipmentStats": {
                "slot": "pickaxe",
                "toolBoost": [{"skill": "mining", "boost": 10}],
                "augmentationBonus": [{"stat": "toolBoost.mining", "value": 2}],
                "itemSet": [10007]
            }
        },
        "900": {
            "name": "Worm",
            "class": "bait",
            "fishingBait": {"level": 2, "bait": 5, "reel": 1, "bonus": 0}
        }
    }"#;

    #[test]
    fn parses_and_indexes_by_name() {
        let db = ItemDatabase::from_json(SAMPLE).unwrap();
        assert_eq!(db.len(), 2);
        // Apostrophe stripped on load.
        let pick = db.get_by_name("Miners Pick").unwrap();
        let stats = pick.equipment_stats.as_ref().unwrap();
        assert_eq!(stats.slot, "pickaxe");
        assert!((stats.tool_boost[0].boost - 10.0).abs() < f64::EPSILON);
        assert_eq!(stats.item_set, vec![10007]);
    }

    #[test]
    fn optional_blocks_default_to_absent() {
        let db = ItemDatabase::from_json(SAMPLE).unwrap();
        let worm = db.get(900).unwrap();
        assert!(worm.equipment_stats.is_none());
        assert!((worm.fishing_bait.unwrap().bait - 5.0).abs() < f64::EPSILON);
        assert!(db.get(999).is_none());
        assert!(db.get_by_name("missing").is_none());
    }
}
