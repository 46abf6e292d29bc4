//! Static location → node → loot catalog for the gathering activities.
//!
//! Built once from the opaque location table and shared read-only across
//! every model instance of the same activity.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::items::{ItemDatabase, ItemId};

/// Tags attached to a node, stored inline for the common small case.
pub type NodeTagSet = SmallVec<[String; 4]>;

/// The three gathering activities modeled by this engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    Mining,
    Foraging,
    Fishing,
}

impl Activity {
    /// Action-type tag used by the location table.
    #[must_use]
    pub const fn wire_tag(self) -> &'static str {
        match self {
            Self::Mining => "Action-Mining",
            Self::Foraging => "Action-Foraging",
            Self::Fishing => "Action-Fishing",
        }
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mining => write!(f, "mining"),
            Self::Foraging => write!(f, "foraging"),
            Self::Fishing => write!(f, "fishing"),
        }
    }
}

/// Errors raised by catalog accessors.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("unknown zone '{name}'; valid zones: {}", known.join(", "))]
    UnknownZone { name: String, known: Vec<String> },
}

/// One drop entry in a node's loot table.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLoot {
    pub id: ItemId,
    pub frequency: f64,
    pub max_frequency: f64,
    pub min_amount: f64,
    pub max_amount: f64,
    pub item_class: String,
}

/// A discrete gatherable source within a zone.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub node_id: String,
    pub frequency: f64,
    pub max_frequency: f64,
    pub minimum_base_amount: f64,
    pub maximum_base_amount: f64,
    pub tags: NodeTagSet,
    pub loot: BTreeMap<ItemId, NodeLoot>,
}

impl Node {
    /// Mean of the base yield range.
    #[must_use]
    pub fn mean_base_amount(&self) -> f64 {
        (self.minimum_base_amount + self.maximum_base_amount) / 2.0
    }
}

/// A gathering zone: required level, base action duration, and its nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub name: String,
    pub loc_id: u32,
    pub activity: Activity,
    /// Base action duration in milliseconds.
    pub base_duration: f64,
    pub level: u32,
    pub nodes: BTreeMap<String, Node>,
}

/// Immutable per-activity zone catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityCatalog {
    activity: Activity,
    locations: BTreeMap<String, Location>,
}

impl ActivityCatalog {
    /// Build a catalog from already-resolved locations.
    #[must_use]
    pub fn from_locations(activity: Activity, locations: BTreeMap<String, Location>) -> Self {
        Self {
            activity,
            locations,
        }
    }

    /// Parse the raw location table JSON and keep only entries matching
    /// `activity`. Loot item classes are resolved against `items`.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into location records.
    pub fn from_json(
        json: &str,
        items: &ItemDatabase,
        activity: Activity,
    ) -> Result<Self, serde_json::Error> {
        let raw: BTreeMap<String, RawLocation> = serde_json::from_str(json)?;
        let mut locations = BTreeMap::new();
        for raw_loc in raw.into_values() {
            if raw_loc.action_type != activity.wire_tag() {
                continue;
            }
            let location = raw_loc.resolve(items, activity);
            locations.insert(location.name.clone(), location);
        }
        Ok(Self::from_locations(activity, locations))
    }

    /// The activity this catalog serves.
    #[must_use]
    pub const fn activity(&self) -> Activity {
        self.activity
    }

    /// Zone names, sorted.
    #[must_use]
    pub fn zone_names(&self) -> Vec<String> {
        self.locations.keys().cloned().collect()
    }

    /// All zones in name order.
    pub fn zones(&self) -> impl Iterator<Item = &Location> {
        self.locations.values()
    }

    /// Zone lookup by name. An unknown name is a reportable error carrying
    /// the valid alternatives.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownZone`] when no zone matches.
    pub fn zone(&self, name: &str) -> Result<&Location, CatalogError> {
        self.locations
            .get(name)
            .ok_or_else(|| CatalogError::UnknownZone {
                name: name.to_string(),
                known: self.zone_names(),
            })
    }

    /// Number of zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// True when the catalog holds no zones.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

// Wire-shape records. Absent fields fall back to the same defaults the
// game data relies on: frequency 1, max frequency = frequency, amount
// range collapsing to the minimum.

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLocation {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "locID")]
    loc_id: u32,
    #[serde(default)]
    action_type: String,
    #[serde(default)]
    base_duration: f64,
    #[serde(default)]
    access_requirements: Option<RawAccessRequirements>,
    #[serde(default)]
    nodes: Option<Vec<RawNode>>,
    #[serde(default)]
    loot: Vec<RawLoot>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAccessRequirements {
    #[serde(default)]
    required_skills: Vec<RawRequiredSkill>,
}

#[derive(Debug, Clone, Deserialize)]
struct RawRequiredSkill {
    #[serde(default)]
    level: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    #[serde(default, rename = "nodeID")]
    node_id: String,
    #[serde(default = "default_frequency")]
    frequency: f64,
    #[serde(default)]
    max_frequency: Option<f64>,
    #[serde(default = "default_amount")]
    minimum_base_amount: f64,
    #[serde(default)]
    maximum_base_amount: Option<f64>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    loot: Vec<RawLoot>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLoot {
    #[serde(default)]
    id: ItemId,
    #[serde(default = "default_frequency")]
    frequency: f64,
    #[serde(default)]
    max_frequency: Option<f64>,
    #[serde(default = "default_amount")]
    min_amount: f64,
    #[serde(default)]
    max_amount: Option<f64>,
}

const fn default_frequency() -> f64 {
    1.0
}

const fn default_amount() -> f64 {
    1.0
}

impl RawLocation {
    fn required_level(&self) -> u32 {
        let level = self
            .access_requirements
            .as_ref()
            .and_then(|req| req.required_skills.first())
            .map(|skill| skill.level);
        match level {
            Some(level) => level,
            None => {
                log::warn!("no required level found for zone '{}'", self.name);
                0
            }
        }
    }

    fn resolve(self, items: &ItemDatabase, activity: Activity) -> Location {
        let level = self.required_level();
        // Zones without explicit nodes get one implicit node wrapping the
        // zone-level loot list.
        let raw_nodes = self.nodes.unwrap_or_else(|| {
            vec![RawNode {
                node_id: String::new(),
                frequency: 1.0,
                max_frequency: None,
                minimum_base_amount: 1.0,
                maximum_base_amount: None,
                tags: Vec::new(),
                loot: self.loot,
            }]
        });
        let mut nodes = BTreeMap::new();
        for raw_node in raw_nodes {
            let node = raw_node.resolve(items);
            nodes.insert(node.node_id.clone(), node);
        }
        Location {
            name: self.name,
            loc_id: self.loc_id,
            activity,
            base_duration: self.base_duration,
            level,
            nodes,
        }
    }
}

impl RawNode {
    fn resolve(self, items: &ItemDatabase) -> Node {
        let mut loot = BTreeMap::new();
        for raw in self.loot {
            let item_class = items
                .get(raw.id)
                .map(|def| def.class.clone())
                .unwrap_or_default();
            loot.insert(
                raw.id,
                NodeLoot {
                    id: raw.id,
                    frequency: raw.frequency,
                    max_frequency: raw.max_frequency.unwrap_or(raw.frequency),
                    min_amount: raw.min_amount,
                    max_amount: raw.max_amount.unwrap_or(raw.min_amount),
                    item_class,
                },
            );
        }
        Node {
            node_id: self.node_id,
            frequency: self.frequency,
            max_frequency: self.max_frequency.unwrap_or(self.frequency),
            minimum_base_amount: self.minimum_base_amount,
            maximum_base_amount: self.maximum_base_amount.unwrap_or(self.minimum_base_amount),
            tags: self.tags.into_iter().collect(),
            loot,
        }
    }
}
