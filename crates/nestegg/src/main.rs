use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{ArgGroup, Args, Parser, Subcommand};
use color_eyre::eyre::{WrapErr, bail};
use nestegg::report::render_statistics;
use nestegg::settings::{CONFIG_FILE, default_data_dir};
use nestegg::{
    InferenceQuery, Report, Settings, SimulationRequest, SimulationResponse, SimulationWorker,
    init_logging, load_prices,
};
use nestegg_core::model::MONTHS_PER_YEAR;
use nestegg_core::{AggregationMode, Comparison, ReturnSeries, SimulationParameters};

#[derive(Parser, Debug)]
#[command(name = "nestegg")]
#[command(about = "Bootstrap Monte Carlo projections of a portfolio from historical prices")]
struct Cli {
    /// Settings file (default: ~/.nestegg/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: String,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a Monte Carlo projection and print the report
    Simulate(SimulateArgs),
    /// Print statistics of the monthly returns in a price file
    Returns {
        /// CSV of `date,price` rows
        #[arg(short, long)]
        prices: PathBuf,
    },
    /// Write a settings file filled with the defaults
    Init {
        /// Replace an existing settings file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("flow").args(["contribution", "withdrawal"])))]
#[command(group(ArgGroup::new("horizon").args(["years", "months"])))]
#[command(group(ArgGroup::new("query").args(["probability", "value"])))]
struct SimulateArgs {
    /// CSV of `date,price` rows
    #[arg(short, long)]
    prices: PathBuf,

    /// Starting balance
    #[arg(long)]
    principal: Option<f64>,

    /// Amount added every month
    #[arg(long)]
    contribution: Option<f64>,

    /// Amount withdrawn every month
    #[arg(long)]
    withdrawal: Option<f64>,

    #[arg(long)]
    years: Option<u32>,

    #[arg(long)]
    months: Option<u32>,

    /// Number of simulated paths
    #[arg(short = 'n', long)]
    iterations: Option<usize>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Series shown in the yearly table
    #[arg(long, value_enum)]
    aggregation: Option<AggregationArg>,

    /// Tail probability in percent; the report derives the matching value
    #[arg(long)]
    probability: Option<f64>,

    /// Portfolio value; the report derives the matching probability
    #[arg(long)]
    value: Option<f64>,

    #[arg(long, value_enum)]
    comparison: Option<ComparisonArg>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum AggregationArg {
    Mean,
    Median,
}

impl From<AggregationArg> for AggregationMode {
    fn from(arg: AggregationArg) -> Self {
        match arg {
            AggregationArg::Mean => AggregationMode::Mean,
            AggregationArg::Median => AggregationMode::Median,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ComparisonArg {
    AtMost,
    AtLeast,
}

impl From<ComparisonArg> for Comparison {
    fn from(arg: ComparisonArg) -> Self {
        match arg {
            ComparisonArg::AtMost => Comparison::AtMost,
            ComparisonArg::AtLeast => Comparison::AtLeast,
        }
    }
}

fn simulate(args: SimulateArgs, settings: &Settings) -> color_eyre::Result<()> {
    let prices = load_prices(&args.prices)
        .wrap_err_with(|| format!("Failed to load prices from {}", args.prices.display()))?;
    let returns = ReturnSeries::from_prices(&prices).wrap_err("Invalid price history")?;

    let contribution = match (args.contribution, args.withdrawal) {
        (_, Some(w)) => -w.abs(),
        (Some(c), None) => c,
        (None, None) => settings.contribution,
    };
    let horizon_periods = match (args.months, args.years) {
        (Some(m), _) => m,
        (None, Some(y)) => y.saturating_mul(MONTHS_PER_YEAR),
        (None, None) => settings.years.saturating_mul(MONTHS_PER_YEAR),
    };
    let params = SimulationParameters::new(
        args.principal.unwrap_or(settings.principal),
        contribution,
        horizon_periods,
    );

    let mut config = settings.to_monte_carlo_config();
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }

    let query = match (args.probability, args.value) {
        (_, Some(v)) => InferenceQuery::Value(v),
        (Some(p), None) => InferenceQuery::Probability(p),
        (None, None) => InferenceQuery::Probability(settings.probability),
    };
    if let InferenceQuery::Probability(p) = query {
        if !(0.0..=100.0).contains(&p) {
            bail!("Probability must be between 0 and 100, got {p}");
        }
    }

    let mut worker = SimulationWorker::new();
    let id = worker.submit(SimulationRequest {
        returns: Arc::new(returns),
        params,
        config,
    });

    let summary = loop {
        if let Some(response) = worker.recv_timeout(Duration::from_millis(500)) {
            match response {
                SimulationResponse::Complete { id: done, summary } if done == id => break summary,
                SimulationResponse::Error { message, .. } => bail!("Simulation failed: {message}"),
                SimulationResponse::Cancelled { .. } => bail!("Simulation was cancelled"),
                SimulationResponse::Complete { .. } => continue,
            }
        }
        let progress = worker.progress();
        tracing::info!(
            completed = progress.completed(),
            total = progress.total(),
            "Simulation in progress"
        );
    };

    let report = Report::build(
        &summary,
        args.aggregation.map_or(settings.aggregation, Into::into),
        query,
        args.comparison.map_or(settings.comparison, Into::into),
    )
    .wrap_err("Failed to analyze simulation results")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref(), &cli.log_level)?;

    let explicit_config = cli.config.is_some();
    let config_path = cli
        .config
        .unwrap_or_else(|| default_data_dir().join(CONFIG_FILE));

    if let Command::Init { force } = cli.command {
        if config_path.exists() && !force {
            bail!(
                "Settings file {} already exists (use --force to replace it)",
                config_path.display()
            );
        }
        Settings::default()
            .save(&config_path)
            .wrap_err_with(|| format!("Failed to write settings to {}", config_path.display()))?;
        println!("Wrote default settings to {}", config_path.display());
        return Ok(());
    }

    if explicit_config && !config_path.exists() {
        bail!("Settings file {} does not exist", config_path.display());
    }
    let settings = Settings::load(&config_path)
        .wrap_err_with(|| format!("Failed to load settings from {}", config_path.display()))?;

    match cli.command {
        Command::Simulate(args) => simulate(args, &settings)?,
        Command::Returns { prices } => {
            let points = load_prices(&prices)
                .wrap_err_with(|| format!("Failed to load prices from {}", prices.display()))?;
            let returns = ReturnSeries::from_prices(&points).wrap_err("Invalid price history")?;
            print!("{}", render_statistics(&returns.statistics()));
        }
        Command::Init { .. } => {}
    }

    tracing::debug!("Done");
    Ok(())
}
