//! Exit Coordination CLI - run episodes from the command line.
//!
//! # Quick Start
//!
//! ```bash
//! # List the built-in scenarios
//! exit-coordination scenarios
//!
//! # Run one episode of the demo scenario
//! exit-coordination run --scenario demo
//!
//! # Run four weekly episodes and dump the full reports as JSON
//! exit-coordination run --scenario stress --episodes 4 --json
//!
//! # Sweep one parameter across values
//! exit-coordination sweep --scenario demo --param default_adjustment_minutes 1 2 4
//! ```

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exit_coordination_core::{
    CoordinationConfig, EpisodeDate, EpisodeOrchestrator, EpisodeResult, ScenarioConfig,
    SweepParameter, UnavailableProvider,
};

/// Classroom exit-time coordination around a shared corridor bottleneck
#[derive(Parser)]
#[command(name = "exit-coordination")]
#[command(version)]
#[command(about = "Negotiate staggered classroom exit times", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one or more coordination episodes
    Run {
        /// Built-in scenario name
        #[arg(long, default_value = "demo")]
        scenario: String,

        /// Load a scenario from a JSON file instead
        #[arg(long, conflicts_with = "scenario")]
        scenario_file: Option<PathBuf>,

        /// Number of consecutive episodes
        #[arg(long, default_value_t = 1)]
        episodes: usize,

        /// Date of the first episode (YYYY-MM-DD)
        #[arg(long, default_value = "2025-03-28")]
        start_date: EpisodeDate,

        /// Print full episode reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the built-in scenarios
    Scenarios,

    /// Re-run a scenario across values of one parameter
    Sweep {
        /// Built-in scenario name
        #[arg(long, default_value = "demo")]
        scenario: String,

        /// Parameter to sweep followed by its values,
        /// e.g. --param risk_threshold 0.5 0.7 0.9
        #[arg(long, num_args = 2.., value_names = ["NAME", "VALUES"])]
        param: Vec<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Run {
            scenario,
            scenario_file,
            episodes,
            start_date,
            json,
        } => {
            let scenario = load_scenario(&scenario, scenario_file.as_deref())?;
            tracing::info!(scenario = %scenario.name, episodes, "starting run");
            let mut orchestrator = EpisodeOrchestrator::new(
                scenario,
                CoordinationConfig::default(),
                Box::new(UnavailableProvider),
                start_date,
            )?;
            let results = orchestrator.run_episodes(episodes)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                let config = CoordinationConfig::default();
                for result in &results {
                    print_summary(result, &config);
                }
            }
            Ok(())
        }

        Commands::Scenarios => {
            for name in ScenarioConfig::builtin_names() {
                let scenario = ScenarioConfig::builtin(name)?;
                println!(
                    "{:<10} {} classrooms, capacity {}/min - {}",
                    name,
                    scenario.classrooms.len(),
                    scenario.bottleneck_capacity,
                    scenario.description
                );
            }
            Ok(())
        }

        Commands::Sweep { scenario, param } => {
            let (name, values) = param
                .split_first()
                .ok_or("--param requires a name and at least one value")?;
            for raw in values {
                let value: f64 = raw.parse()?;
                let mut config = CoordinationConfig::default();
                SweepParameter::parse(name, value)?.apply(&mut config);

                let mut orchestrator = EpisodeOrchestrator::new(
                    ScenarioConfig::builtin(&scenario)?,
                    config,
                    Box::new(UnavailableProvider),
                    EpisodeDate::new(2025, 3, 28),
                )?;
                let result = orchestrator.run_episode()?;
                let m = &result.coordination_metrics;
                println!(
                    "{name}={raw}: risk {:.3} -> {:.3} (reduction {:.3}, success {})",
                    m.initial_risk, m.final_risk, m.risk_reduction, m.coordination_success
                );
            }
            Ok(())
        }
    }
}

fn load_scenario(
    name: &str,
    file: Option<&std::path::Path>,
) -> Result<ScenarioConfig, Box<dyn Error>> {
    match file {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            let scenario: ScenarioConfig = serde_json::from_str(&text)?;
            scenario.validate()?;
            Ok(scenario)
        }
        None => Ok(ScenarioConfig::builtin(name)?),
    }
}

fn print_summary(result: &EpisodeResult, config: &CoordinationConfig) {
    let m = &result.coordination_metrics;
    println!(
        "episode {} ({}): {} -> {}",
        result.episode_date,
        result.scenario,
        result.initial_analysis.overall_status,
        result.final_analysis.overall_status
    );
    println!(
        "  risk {:.3} -> {:.3} (reduction {:.3}), grade {}, {} agents moved",
        m.initial_risk,
        m.final_risk,
        m.risk_reduction,
        config.performance.grade(m.risk_reduction),
        m.agents_participated
    );
    for (id, entry) in &result.final_schedule {
        println!(
            "  {id}: {} ({}{} min) -> {} [{} students]",
            entry.base_time,
            if entry.adjustment >= 0 { "+" } else { "" },
            entry.adjustment,
            entry.final_time,
            entry.students
        );
    }
    for event in &result.broadcasts {
        println!("  broadcast: {}", event.event_type());
    }
}
