//! Orecast Rate Engine
//!
//! Platform-agnostic rate modeling for an idle gathering game: stat
//! aggregation from equipment, per-activity yield models for mining,
//! foraging, and fishing, experience tables, a time-stepped leveling
//! sequencer, and a smithing cost planner. This crate carries no I/O or
//! platform-specific dependencies; data sources plug in through
//! [`DataLoader`].

pub mod catalog;
pub mod character;
pub mod estimator;
pub mod experience;
pub mod gathering;
pub mod items;
pub mod numbers;
pub mod sequencer;
pub mod smithing;

// Re-export commonly used types
pub use catalog::{Activity, ActivityCatalog, CatalogError, Location, Node, NodeLoot};
pub use character::{
    Character, EquipmentComponent, EquipmentSet, EquipmentSlot, Skill, StatKey, StatKeyError,
};
pub use estimator::{FishingNodeContext, MonteCarloEstimator, NodeYieldEstimator};
pub use experience::{ExperienceCurve, ExperienceError, ExperienceTable, MAX_LEVEL};
pub use gathering::{
    Fishing, Foraging, Gathering, HistogramInterval, Mining, ModelError, normalize_scores,
};
pub use items::{HEAT_ITEM_ID, ItemDatabase, ItemDef, ItemId};
pub use sequencer::{SequenceEvent, SequenceError, Sequencer, SimulationOutcome};
pub use smithing::{ForgeDatabase, ForgeDef, Smithing, SmithingError, SmithingPlan};

use std::sync::Arc;

/// Trait for abstracting data loading operations.
/// Platform-specific implementations should provide this.
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the item database from the platform-specific source.
    ///
    /// # Errors
    ///
    /// Returns an error if the item data cannot be loaded or parsed.
    fn load_item_data(&self) -> Result<ItemDatabase, Self::Error>;

    /// Load the location catalog for one gathering activity.
    ///
    /// # Errors
    ///
    /// Returns an error if the location data cannot be loaded or parsed.
    fn load_location_data(&self, activity: Activity) -> Result<ActivityCatalog, Self::Error>;

    /// Load the forge table.
    ///
    /// # Errors
    ///
    /// Returns an error if the forge data cannot be loaded or parsed.
    fn load_forge_data(&self) -> Result<ForgeDatabase, Self::Error>;
}

/// Engine facade wiring loaded data into the activity models.
pub struct RateEngine {
    items: Arc<ItemDatabase>,
    forges: ForgeDatabase,
    mining_catalog: Arc<ActivityCatalog>,
    foraging_catalog: Arc<ActivityCatalog>,
    fishing_catalog: Arc<ActivityCatalog>,
}

impl RateEngine {
    /// Load all data tables through the given loader.
    ///
    /// # Errors
    ///
    /// Returns the loader's error if any table fails to load.
    pub fn load<L: DataLoader>(loader: &L) -> Result<Self, L::Error> {
        Ok(Self {
            items: Arc::new(loader.load_item_data()?),
            forges: loader.load_forge_data()?,
            mining_catalog: Arc::new(loader.load_location_data(Activity::Mining)?),
            foraging_catalog: Arc::new(loader.load_location_data(Activity::Foraging)?),
            fishing_catalog: Arc::new(loader.load_location_data(Activity::Fishing)?),
        })
    }

    #[must_use]
    pub fn items(&self) -> &Arc<ItemDatabase> {
        &self.items
    }

    #[must_use]
    pub fn mining(&self) -> Mining {
        Mining::new(Arc::clone(&self.mining_catalog), Arc::clone(&self.items))
    }

    #[must_use]
    pub fn foraging(&self) -> Foraging {
        Foraging::new(Arc::clone(&self.foraging_catalog), Arc::clone(&self.items))
    }

    /// Build the fishing model with a seeded node-yield estimator.
    #[must_use]
    pub fn fishing(&self, seed: u64) -> Fishing {
        Fishing::new(
            Arc::clone(&self.fishing_catalog),
            Arc::clone(&self.items),
            seed,
        )
    }

    #[must_use]
    pub fn smithing(&self) -> Smithing {
        Smithing::new(self.forges.clone(), Arc::clone(&self.items))
    }
}
