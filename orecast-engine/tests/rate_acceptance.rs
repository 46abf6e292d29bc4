use orecast_engine::estimator::{FishingNodeContext, MonteCarloEstimator, NodeYieldEstimator};
use orecast_engine::experience::{ExperienceCurve, ExperienceTable};
use orecast_engine::gathering::{Fishing, Gathering, Mining};
use orecast_engine::items::ItemDatabase;
use orecast_engine::sequencer::Sequencer;
use orecast_engine::{Activity, ActivityCatalog, Character, EquipmentSet, EquipmentSlot};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

const MC_TRIALS: u32 = 50_000;
const MC_TOLERANCE: f64 = 0.15;

const ITEMS: &str = r#"{
    "101": {"name": "Copper Ore", "class": "ore", "experience": 5},
    "150": {
        "name": "Bronze Pickaxe",
        "class": "equipment",
        "relatedSkill": "mining",
        "equipmentStats": {
            "slot": "pickaxe",
            "toolBoost": [{"skill": "mining", "boost": 10}],
            "augmentationBonus": [{"stat": "toolBoost.mining", "value": 2}]
        }
    },
    "60": {"name": "Raw Shrimp", "class": "fish", "experience": 10}
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
        "accessRequirements": {"requiredSkills": [{"skill": "fishing", "level": 1}]},
        "nodes": [
            {
                "nodeID": "school",
                "frequency": 10,
                "maxFrequency": 40,
                "minimumBaseAmount": 4,
                "maximumBaseAmount": 8,
                "loot": [{"id": 60, "frequency": 1, "minAmount": 1}]
            }
        ]
    }
}"#;

fn item_db() -> Arc<ItemDatabase> {
    Arc::new(ItemDatabase::from_json(ITEMS).unwrap())
}

fn mining_model() -> Mining {
    let items = item_db();
    let catalog = ActivityCatalog::from_json(LOCATIONS, &items, Activity::Mining).unwrap();
    Mining::new(Arc::new(catalog), items)
}

fn fishing_model(seed: u64) -> Fishing {
    let items = item_db();
    let catalog = ActivityCatalog::from_json(LOCATIONS, &items, Activity::Fishing).unwrap();
    Fishing::new(Arc::new(catalog), items, seed)
}

#[test]
fn mining_pipeline_from_raw_tables() {
    let mining = mining_model();
    let player = Character::default();
    // Level 1, no gear: modifier 1, 60 actions/hour, 5 xp each.
    let rate = mining.zone_experience_rate(&player, "Quarry").unwrap();
    assert!((rate - 300.0).abs() < 1e-9, "got {rate}");
}

#[test]
fn equipment_boosts_flow_into_rates() {
    let items = item_db();
    let mining = mining_model();
    let mut set = EquipmentSet::new();
    set.equip(EquipmentSlot::Pickaxe, "Bronze Pickaxe", 3);
    let mut player = Character::default();
    player.apply_equipment(&set, &items);
    // 10 flat + 2 per augment level -> effective level 17, modifier 1.16.
    assert!((player.mining_bonus - 16.0).abs() < f64::EPSILON);
    let rate = mining.zone_experience_rate(&player, "Quarry").unwrap();
    assert!((rate - 348.0).abs() < 1e-9, "got {rate}");
}

#[test]
fn leveling_trajectory_is_monotonic() {
    let mining = mining_model();
    let player = Character::default();
    let table = ExperienceTable::new(ExperienceCurve::Exponential);
    let axis: Vec<f64> = (0..=100).map(f64::from).collect();
    let outcome = Sequencer::default()
        .simulate_by_time(&player, &mining, &axis, &table)
        .unwrap();
    assert!(outcome.levels.windows(2).all(|pair| pair[0] <= pair[1]));
    assert!(
        outcome
            .experience_rates
            .windows(2)
            .all(|pair| pair[0] <= pair[1])
    );
    assert!(outcome.final_level() >= 10, "got {}", outcome.final_level());
    // The source character stays untouched.
    assert_eq!(player.mining_level, 1);
}

#[test]
fn segmented_curve_levels_much_slower() {
    let mining = mining_model();
    let player = Character::default();
    let axis: Vec<f64> = (0..=10).map(f64::from).collect();
    let exponential = ExperienceTable::new(ExperienceCurve::Exponential);
    let segmented = ExperienceTable::new(ExperienceCurve::Segmented);
    let fast = Sequencer::default()
        .simulate_by_time(&player, &mining, &axis, &exponential)
        .unwrap();
    let slow = Sequencer::default()
        .simulate_by_time(&player, &mining, &axis, &segmented)
        .unwrap();
    // 3000 xp clears several exponential levels but not the 50500 the
    // segmented curve wants for level 2.
    assert!(fast.final_level() > 1);
    assert_eq!(slow.final_level(), 1);
}

#[test]
fn scripted_upgrades_accelerate_leveling() {
    let mining = mining_model();
    let player = Character::default();
    let table = ExperienceTable::new(ExperienceCurve::Exponential);
    let axis: Vec<f64> = (0..=100).map(f64::from).collect();
    let script = r#"[{"level": 5, "mining_bonus": 50, "info": "upgrade"}]"#;
    let sequencer = Sequencer::from_json(script).unwrap();
    let upgraded = sequencer
        .simulate_by_time(&player, &mining, &axis, &table)
        .unwrap();
    let baseline = Sequencer::default()
        .simulate_by_time(&player, &mining, &axis, &table)
        .unwrap();
    assert!(upgraded.final_level() >= baseline.final_level());
    assert!(upgraded.peak_rate() > baseline.peak_rate());
}

#[test]
fn events_never_downgrade_stats() {
    let mining = mining_model();
    let player = Character {
        mining_bonus: 100.0,
        ..Character::default()
    };
    let table = ExperienceTable::new(ExperienceCurve::Exponential);
    let axis: Vec<f64> = (0..=50).map(f64::from).collect();
    // The scripted bonus is below what the character already has; the
    // ceiling merge must leave every tick's rate unchanged.
    let script = r#"[{"hours": 0.0, "mining_bonus": 10}]"#;
    let with_event = Sequencer::from_json(script)
        .unwrap()
        .simulate_by_time(&player, &mining, &axis, &table)
        .unwrap();
    let without = Sequencer::default()
        .simulate_by_time(&player, &mining, &axis, &table)
        .unwrap();
    assert_eq!(with_event.experience_rates, without.experience_rates);
    assert_eq!(with_event.levels, without.levels);
}

#[test]
fn monte_carlo_seeds_agree_within_tolerance() {
    let ctx = FishingNodeContext {
        zone_level: 1.0,
        min_base: 4.0,
        max_base: 8.0,
        effective_level: 12.0,
        bait_power: 10.0,
        base_chance: 0.45,
        fishing_enchant: 0.0,
    };
    let a = MonteCarloEstimator::with_trials(0xA11CE, MC_TRIALS).expected_node_yield(&ctx);
    let b = MonteCarloEstimator::with_trials(0xB0B, MC_TRIALS).expected_node_yield(&ctx);
    assert!(
        (a - b).abs() <= MC_TOLERANCE,
        "seed drift too large: {a:.4} vs {b:.4}"
    );
}

#[test]
fn fishing_rates_are_reproducible_per_seed() {
    let player = Character {
        fishing_level: 5,
        ..Character::default()
    };
    let first = fishing_model(7)
        .zone_action_rate(&player, "Shallow Pond")
        .unwrap();
    let second = fishing_model(7)
        .zone_action_rate(&player, "Shallow Pond")
        .unwrap();
    assert!((first - second).abs() < f64::EPSILON);

    let other_seed = fishing_model(8)
        .zone_action_rate(&player, "Shallow Pond")
        .unwrap();
    assert!(first > 0.0);
    // Different seeds wander a little but stay in the same neighborhood.
    assert!((first - other_seed).abs() / first < 0.05);
}

#[test]
fn random_characters_keep_distributions_normalized() {
    let mining = mining_model();
    let fishing = fishing_model(3);
    let mut rng = ChaCha8Rng::seed_from_u64(0xFEED);
    for _ in 0..25 {
        let mut player = Character {
            mining_level: rng.gen_range(1..=90),
            mining_bonus: rng.gen_range(0.0..200.0),
            fishing_level: rng.gen_range(1..=90),
            fishing_bonus: rng.gen_range(0.0..60.0),
            bait_power: rng.gen_range(0.0..40.0),
            reel_power: rng.gen_range(0.0..40.0),
            ..Character::default()
        };
        if rng.r#gen::<bool>() {
            player
                .enchantments
                .insert("haste".to_string(), rng.gen_range(1..=5));
        }

        let quarry = mining.catalog().zone("Quarry").unwrap();
        let dist = mining.node_distribution(&player, quarry).unwrap();
        assert!((dist.values().sum::<f64>() - 1.0).abs() < 1e-12);
        let mining_rate = mining.zone_experience_rate(&player, "Quarry").unwrap();
        assert!(mining_rate.is_finite() && mining_rate > 0.0);

        let pond = fishing.catalog().zone("Shallow Pond").unwrap();
        let dist = fishing.node_distribution(&player, pond).unwrap();
        assert!((dist.values().sum::<f64>() - 1.0).abs() < 1e-12);
        let fishing_rate = fishing.zone_experience_rate(&player, "Shallow Pond").unwrap();
        assert!(fishing_rate.is_finite() && fishing_rate > 0.0);
    }
}
