use orecast_engine::{
    Activity, ActivityCatalog, Character, DataLoader, ForgeDatabase, ItemDatabase, RateEngine,
    gathering::Gathering,
};

const ITEMS: &str = r#"{
    "2": {"name": "Heat", "class": "resource"},
    "101": {"name": "Copper Ore", "class": "ore", "experience": 5},
    "201": {
        "name": "Copper Bar",
        "class": "bar",
        "experience": 25,
        "level": 10,
        "time": 10000,
        "requiredResources": [{"2": 20, "101": 4}]
    },
    "60": {"name": "Raw Shrimp", "class": "fish", "experience": 10},
    "900": {
        "name": "Fisherman's Friend",
        "class": "bait",
        "fishingBait": {"level": 2, "bait": 5, "reel": 1, "bonus": 0}
    }
}"#;

const LOCATIONS: &str = r#"{
    "1": {
        "name": "Quarry",
        "locID": 1,
        "actionType": "Action-Mining",
        "baseDuration": 60000,
        "accessRequirements": {"requiredSkills": [{"skill": "mining", "level": 1}]},
        "nodes": [
            {
                "nodeID": "vein",
                "frequency": 1,
                "minimumBaseAmount": 1,
                "loot": [{"id": 101, "frequency": 1, "minAmount": 1}]
            }
        ]
    },
    "2": {
        "name": "Shallow Pond",
        "locID": 2,
        "actionType": "Action-Fishing",
        "baseDuration": 5000,
        "loot": [{"id": 60, "frequency": 5, "minAmount": 1}]
    },
    "3": {
        "name": "Grove",
        "locID": 3,
        "actionType": "Action-Foraging",
        "baseDuration": 30000,
        "accessRequirements": {"requiredSkills": [{"skill": "foraging", "level": 1}]},
        "nodes": [
            {
                "nodeID": "oak",
                "frequency": 2,
                "minimumBaseAmount": 2,
                "maximumBaseAmount": 4,
                "tags": ["tree"],
                "loot": [{"id": 101, "frequency": 1, "minAmount": 1}]
            }
        ]
    }
}"#;

const FORGES: &str = r#"{
    "1": {},
    "2": {
        "forgeSpeedMult": 0.9,
        "forgeXPMult": 1.2,
        "forgeBonusBars": 0.05,
        "forgeIntensityBonusBars": 1.4,
        "forgeIntensityHeatCostMult": 1.8,
        "forgeIntensityMaterialCostMult": 1.2
    }
}"#;

/// Loader backed by in-memory JSON strings, standing in for the
/// filesystem loader a frontend would provide.
struct StaticLoader;

impl DataLoader for StaticLoader {
    type Error = serde_json::Error;

    fn load_item_data(&self) -> Result<ItemDatabase, Self::Error> {
        ItemDatabase::from_json(ITEMS)
    }

    fn load_location_data(&self, activity: Activity) -> Result<ActivityCatalog, Self::Error> {
        let items = ItemDatabase::from_json(ITEMS)?;
        ActivityCatalog::from_json(LOCATIONS, &items, activity)
    }

    fn load_forge_data(&self) -> Result<ForgeDatabase, Self::Error> {
        ForgeDatabase::from_json(FORGES)
    }
}

#[test]
fn engine_loads_all_tables() {
    let engine = RateEngine::load(&StaticLoader).unwrap();
    assert_eq!(engine.items().len(), 5);
    // Apostrophes are stripped from display names on load.
    assert!(engine.items().get_by_name("Fishermans Friend").is_some());
    assert_eq!(engine.mining().catalog().zone_names(), vec!["Quarry"]);
    assert_eq!(engine.foraging().catalog().zone_names(), vec!["Grove"]);
    assert_eq!(
        engine.fishing(1).catalog().zone_names(),
        vec!["Shallow Pond"]
    );
}

#[test]
fn bare_loot_lists_round_trip_through_models() {
    let engine = RateEngine::load(&StaticLoader).unwrap();
    let fishing = engine.fishing(5);
    let player = Character::default();
    // The pond has no explicit nodes; the synthesized wrapper node must
    // still produce a positive rate at the default zone level of 0.
    let rate = fishing.zone_action_rate(&player, "Shallow Pond").unwrap();
    assert!(rate > 0.0);
}

#[test]
fn loot_item_classes_resolve_against_the_item_table() {
    let engine = RateEngine::load(&StaticLoader).unwrap();
    let mining = engine.mining();
    let zone = mining.catalog().zone("Quarry").unwrap();
    assert_eq!(zone.nodes["vein"].loot[&101].item_class, "ore");
}

#[test]
fn forge_defaults_fill_missing_fields() {
    let engine = RateEngine::load(&StaticLoader).unwrap();
    let smithing = engine.smithing();
    let player = Character {
        smithing_level: 10,
        ..Character::default()
    };
    // Forge 1 is an empty record: every multiplier neutral. Bar level 10
    // gives tier 1, so intensity 1 sits exactly at tier.
    let plan = smithing.plan(&player, 1, 201, 1).unwrap();
    assert_eq!(plan.cost["Heat"], 20);
    assert_eq!(plan.cost["Copper Ore"], 4);
    assert!((plan.experience - 25.0).abs() < f64::EPSILON);
    assert!((plan.output - 1.0).abs() < f64::EPSILON);
}

#[test]
fn configured_forge_applies_its_multipliers() {
    let engine = RateEngine::load(&StaticLoader).unwrap();
    let smithing = engine.smithing();
    let player = Character {
        smithing_level: 10,
        ..Character::default()
    };
    let plan = smithing.plan(&player, 2, 201, 2).unwrap();
    // Effective intensity 1: heat 20 * 1.8 = 36, ore 4 * 1.2 -> 5.
    assert_eq!(plan.cost["Heat"], 36);
    assert_eq!(plan.cost["Copper Ore"], 5);
    assert!((plan.experience - 30.0).abs() < 1e-12);
    assert!((plan.output - (1.0 + 0.05 * 1.4)).abs() < 1e-12);
}

#[test]
fn foraging_tags_survive_the_catalog_build() {
    let engine = RateEngine::load(&StaticLoader).unwrap();
    let foraging = engine.foraging();
    let mut player = Character::default();
    player.enchantments.insert("nature".to_string(), 3);
    let zone = foraging.catalog().zone("Grove").unwrap();
    let scores = foraging.node_frequency_scores(&player, zone);
    // frequency 2 + nature 3, clamped at the default max of 2.
    assert!((scores["oak"] - 2.0).abs() < f64::EPSILON);
}
