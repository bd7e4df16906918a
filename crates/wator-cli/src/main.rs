//! Command-line driver for the Wator simulation.

mod telemetry;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use wator_core::SimulationConfig;
use wator_world::Environment;

const DEFAULT_FILTER: &str = "info";
const QUIET_FILTER: &str = "warn";

#[derive(Parser)]
#[command(name = "wator")]
#[command(version)]
#[command(about = "Predator-prey cellular automaton on a toroidal grid")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation and print a JSON summary
    Run {
        /// Configuration file (JSON); built-in defaults when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the number of cycles
        #[arg(short = 'n', long)]
        cycles: Option<u64>,

        /// Override the random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Print the grid every N cycles (0 prints only the final grid)
        #[arg(long)]
        show_every: Option<u64>,

        /// Quiet mode (warnings and the summary only)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Write the default configuration as JSON
    Init {
        /// Output path
        #[arg(short, long, default_value = "wator.json")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            cycles,
            seed,
            show_every,
            quiet,
        } => {
            telemetry::init_telemetry(if quiet { QUIET_FILTER } else { DEFAULT_FILTER })?;

            let mut config = load_config(config.as_deref())?;
            if let Some(cycles) = cycles {
                config.num_cycles = cycles;
            }
            if let Some(seed) = seed {
                config.seed = seed;
            }
            config.validate()?;

            match show_every {
                Some(every) => run_with_display(config, every),
                None => run(config),
            }
        }
        Commands::Init { output } => {
            let json = serde_json::to_string_pretty(&SimulationConfig::default())?;
            std::fs::write(&output, json)
                .with_context(|| format!("failed to write {}", output.display()))?;
            println!("Default configuration written to {}", output.display());
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    match path {
        Some(path) => {
            let config = SimulationConfig::from_json_file(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?;
            info!("Loaded configuration from {}", path.display());
            Ok(config)
        }
        None => Ok(SimulationConfig::default()),
    }
}

fn run(config: SimulationConfig) -> Result<()> {
    let mut env = Environment::new(config)?;
    let result = env.run();
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Step manually so the grid can be printed between cycles
fn run_with_display(config: SimulationConfig, every: u64) -> Result<()> {
    let num_cycles = config.num_cycles;
    let stop_on_extinction = config.stop_on_extinction;
    let mut env = Environment::new(config)?;

    println!("cycle 0\n{}", env.snapshot());
    for _ in 0..num_cycles {
        let report = env.step();
        if every > 0 && report.cycle % every == 0 {
            println!(
                "cycle {} predators={} prey={}\n{}",
                report.cycle,
                report.population.predators,
                report.population.prey,
                env.snapshot()
            );
        }
        if stop_on_extinction && report.population.any_extinct() {
            info!(cycle = report.cycle, "A species died out, stopping");
            break;
        }
    }

    println!("final (cycle {})\n{}", env.cycle(), env.snapshot());
    println!("{}", serde_json::to_string_pretty(&env.totals())?);
    Ok(())
}
