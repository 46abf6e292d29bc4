mod loader;
mod scenario;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use orecast_engine::gathering::Gathering;
use orecast_engine::{Activity, Character, RateEngine};
use std::path::PathBuf;
use std::time::Instant;

use loader::FsDataLoader;
use scenario::{ScenarioFile, ScenarioOutcome, run_scenario};

#[derive(Debug, Parser)]
#[command(name = "orecast-tester", version = "0.1.0")]
#[command(about = "Rate inspection and scenario acceptance runner for the Orecast engine")]
struct Args {
    /// Directory holding items.json, locations.json, and forges.json
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Scenario files to replay (repeatable)
    #[arg(long = "scenario")]
    scenarios: Vec<PathBuf>,

    /// Print per-zone rate tables for this activity (mining, foraging, fishing)
    #[arg(long)]
    activity: Option<String>,

    /// Skill level used for the rate tables
    #[arg(long, default_value_t = 1)]
    level: u32,

    /// Seed for the fishing yield estimator
    #[arg(long, default_value_t = 1337)]
    seed: u64,

    /// Verbose output (per-tick levels for scenarios)
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("{}", "⛏️  Orecast Rate Tester".bright_cyan().bold());
    println!("{}", "========================".cyan());

    let start_time = Instant::now();
    let loader = FsDataLoader::new(&args.data_dir);
    let engine = RateEngine::load(&loader).with_context(|| {
        format!("failed to load game data from {}", args.data_dir.display())
    })?;
    log::info!(
        "loaded {} items from {}",
        engine.items().len(),
        args.data_dir.display()
    );

    if let Some(name) = &args.activity {
        match parse_activity(name) {
            Some(activity) => print_rate_table(&engine, activity, args.level, args.seed)?,
            None => eprintln!("⚠️  Unknown activity: {}", name.yellow()),
        }
    }

    let outcomes = run_scenarios(&args, &engine)?;
    let failed = outcomes.iter().filter(|o| !o.passed()).count();

    println!();
    println!("🏁 Total time: {:?}", start_time.elapsed());
    if failed > 0 {
        eprintln!("{}", format!("{failed} scenario(s) failed").red().bold());
        std::process::exit(1);
    }
    Ok(())
}

fn parse_activity(name: &str) -> Option<Activity> {
    match name {
        "mining" => Some(Activity::Mining),
        "foraging" => Some(Activity::Foraging),
        "fishing" => Some(Activity::Fishing),
        _ => None,
    }
}

fn activity_model(engine: &RateEngine, activity: Activity, seed: u64) -> Box<dyn Gathering> {
    match activity {
        Activity::Mining => Box::new(engine.mining()),
        Activity::Foraging => Box::new(engine.foraging()),
        Activity::Fishing => Box::new(engine.fishing(seed)),
    }
}

fn print_rate_table(
    engine: &RateEngine,
    activity: Activity,
    level: u32,
    seed: u64,
) -> Result<()> {
    let model = activity_model(engine, activity, seed);
    let mut player = Character::default();
    player.set_skill_level(model.skill(), level);

    println!();
    println!(
        "{}",
        format!("📊 {activity} rates at level {level}").bright_yellow().bold()
    );
    println!("{:<24} {:>14} {:>14}", "zone", "actions/h", "xp/h");
    for zone in model.catalog().zones() {
        let actions = model.zone_action_rate(&player, &zone.name)?;
        let experience = model.zone_experience_rate(&player, &zone.name)?;
        let line = format!("{:<24} {actions:>14.1} {experience:>14.1}", zone.name);
        if actions > 0.0 {
            println!("{line}");
        } else {
            // Gated zones print dimmed so eligible ones stand out.
            println!("{}", format!("{line}  (requires {})", zone.level).dimmed());
        }
    }
    Ok(())
}

fn run_scenarios(args: &Args, engine: &RateEngine) -> Result<Vec<ScenarioOutcome>> {
    let mut outcomes = Vec::new();
    if args.scenarios.is_empty() {
        return Ok(outcomes);
    }

    println!();
    println!("{}", "🧪 Running Scenarios".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    for path in &args.scenarios {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file = ScenarioFile::from_json(&json)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        let scenario_start = Instant::now();
        log::info!("replaying scenario '{}' from {}", file.name, path.display());
        let outcome = run_scenario(engine, &file, args.seed)?;
        let duration = scenario_start.elapsed();

        if outcome.passed() {
            println!(
                "✅ {} - level {} peak {:.1} xp/h - {duration:?}",
                outcome.name.green(),
                outcome.final_level,
                outcome.peak_rate
            );
        } else {
            eprintln!("❌ {} - {duration:?}", outcome.name.red());
            for violation in &outcome.violations {
                eprintln!("   {}", violation.red());
            }
        }
        if args.verbose {
            println!("   levels: {:?}", outcome.levels);
        }
        outcomes.push(outcome);
    }
    Ok(outcomes)
}
