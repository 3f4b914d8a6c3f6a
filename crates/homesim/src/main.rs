use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result};
use homesim::util::atomic_write;
use homesim::{EXAMPLE_SCENARIO, OutputFormat, init_logging, load_scenario};
use homesim_core::{ScenarioConfig, simulate, simulate_batch};

#[derive(Parser, Debug)]
#[command(name = "homesim")]
#[command(about = "Simulate renting, owning and fractional home equity over the years")]
struct Args {
    /// Log level (debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one scenario and print its year-by-year results
    Run {
        scenario: PathBuf,

        /// Override the number of simulated years
        #[arg(short, long)]
        years: Option<u32>,

        /// Date snapshots from this start date (YYYY-MM-DD)
        #[arg(long)]
        start_date: Option<jiff::civil::Date>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run several scenarios and compare everyone's final position
    Compare {
        #[arg(required = true)]
        scenarios: Vec<PathBuf>,

        #[arg(short, long)]
        years: Option<u32>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a sample scenario file
    Example {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            atomic_write(path, content)
                .wrap_err_with(|| format!("failed to write {}", path.display()))?;
            tracing::info!("wrote {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

fn load_with_overrides(
    path: &Path,
    years: Option<u32>,
    start_date: Option<jiff::civil::Date>,
) -> Result<ScenarioConfig> {
    let mut scenario = load_scenario(path)?;
    if let Some(years) = years {
        scenario.years = years;
    }
    if start_date.is_some() {
        scenario.environment.start_date = start_date;
    }
    Ok(scenario)
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(&args.log_level, args.log_file.as_deref())?;

    match args.command {
        Command::Run {
            scenario,
            years,
            start_date,
            format,
            output,
        } => {
            let config = load_with_overrides(&scenario, years, start_date)?;
            let result = simulate(&config)
                .wrap_err_with(|| format!("scenario {} failed", config.name))?;
            emit(&homesim::render(&result, format)?, output.as_deref())?;
        }
        Command::Compare {
            scenarios,
            years,
            format,
            output,
        } => {
            let configs = scenarios
                .iter()
                .map(|path| load_with_overrides(path, years, None))
                .collect::<Result<Vec<_>>>()?;
            let results = simulate_batch(&configs)
                .into_iter()
                .zip(&configs)
                .map(|(result, config)| {
                    result.wrap_err_with(|| format!("scenario {} failed", config.name))
                })
                .collect::<Result<Vec<_>>>()?;
            emit(
                &homesim::render_comparison(&results, format)?,
                output.as_deref(),
            )?;
        }
        Command::Example { output } => emit(EXAMPLE_SCENARIO, output.as_deref())?,
    }

    Ok(())
}
