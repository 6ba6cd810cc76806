//! heston-price: command line pricing of European options under the Heston model.
//!
//! # Commands
//!
//! - `heston-price price` - Monte Carlo price with standard error
//! - `heston-price greeks` - price plus Delta, Gamma and Theta
//! - `heston-price payoff` - payoff-at-expiry profile around the spot
//! - `heston-price estimate --history prices.txt` - model parameters from a price history
//!
//! Inputs come either from flags or from a TOML pricing request (`--config`).
//! Set `RUST_LOG` (or pass `--verbose`) to see engine logs on stderr.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use heston_mc::config::PricingRequest;
use heston_mc::estimation::{FixedRate, HistoricalVolEstimator, ParameterEstimator, RateFeed};
use heston_mc::mc::payoffs::payoff_grid;
use heston_mc::output::{write_greeks_csv, write_payoff_grid_csv};
use heston_mc::{
    ContractSpec, DiscretizationScheme, ModelParameters, OptionType, RandomNumbers,
    SimulationConfig,
};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Heston Monte Carlo option pricer
#[derive(Parser)]
#[command(name = "heston-price")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price an option
    Price(PricingArgs),

    /// Price an option and estimate Delta, Gamma and Theta
    Greeks {
        #[command(flatten)]
        args: PricingArgs,

        /// Also write the result to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Payoff at expiry for spots from 80% to 120% of the current spot
    Payoff {
        #[arg(long, default_value_t = 100.0)]
        spot: f64,

        #[arg(short = 'k', long, default_value_t = 100.0)]
        strike: f64,

        /// call or put
        #[arg(short = 't', long, default_value = "call")]
        option_type: OptionType,

        /// Also write the grid to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Estimate Heston parameters from a daily closing price history
    Estimate {
        /// Text file with one price per line, oldest first
        #[arg(long)]
        history: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SchemeArg {
    PartialFloor,
    FullTruncation,
}

impl From<SchemeArg> for DiscretizationScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::PartialFloor => DiscretizationScheme::PartialFloor,
            SchemeArg::FullTruncation => DiscretizationScheme::FullTruncation,
        }
    }
}

#[derive(Args)]
struct PricingArgs {
    /// TOML pricing request; overrides every other pricing flag
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 100.0)]
    spot: f64,

    /// Initial variance
    #[arg(long, default_value_t = 0.04)]
    v0: f64,

    /// Long-run variance
    #[arg(long, default_value_t = 0.04)]
    theta: f64,

    /// Mean reversion speed
    #[arg(long, default_value_t = 2.0)]
    kappa: f64,

    /// Volatility of variance
    #[arg(long, default_value_t = 0.3)]
    sigma: f64,

    /// Price/variance correlation
    #[arg(long, default_value_t = -0.5, allow_negative_numbers = true)]
    rho: f64,

    #[arg(short = 'k', long, default_value_t = 100.0)]
    strike: f64,

    /// Time to maturity in years
    #[arg(short = 'T', long, default_value_t = 1.0, allow_negative_numbers = true)]
    maturity: f64,

    /// Calendar days to expiry (Act/365); overrides --maturity
    #[arg(long, conflicts_with = "maturity")]
    days: Option<f64>,

    /// call or put
    #[arg(short = 't', long, default_value = "call")]
    option_type: OptionType,

    /// Continuously compounded risk-free rate
    #[arg(short, long, allow_negative_numbers = true)]
    rate: Option<f64>,

    #[arg(short = 'n', long, default_value_t = 10_000)]
    num_paths: usize,

    #[arg(long, default_value_t = 100)]
    num_steps: usize,

    /// Seed for reproducible results
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value = "partial-floor")]
    scheme: SchemeArg,

    /// Reuse the same random numbers in every Greek leg
    #[arg(long)]
    common_random_numbers: bool,
}

impl PricingArgs {
    fn into_request(self) -> Result<PricingRequest> {
        if let Some(path) = &self.config {
            let request = PricingRequest::from_path(path)
                .with_context(|| format!("loading pricing request {}", path.display()))?;
            info!(path = %path.display(), "loaded pricing request");
            return Ok(request);
        }

        let rate = self
            .rate
            .unwrap_or_else(|| FixedRate::default().risk_free_rate());
        let request = PricingRequest {
            model: ModelParameters {
                spot: self.spot,
                v0: self.v0,
                theta: self.theta,
                kappa: self.kappa,
                sigma: self.sigma,
                rho: self.rho,
            },
            contract: match self.days {
                Some(days) => ContractSpec::from_days(days, self.strike, self.option_type, rate),
                None => ContractSpec::new(self.strike, self.maturity, self.option_type, rate),
            },
            simulation: SimulationConfig {
                num_paths: self.num_paths,
                num_steps: self.num_steps,
                seed: self.seed,
                scheme: self.scheme.into(),
                random_numbers: if self.common_random_numbers {
                    RandomNumbers::Common
                } else {
                    RandomNumbers::Independent
                },
                ..Default::default()
            },
        };
        request.validate()?;
        Ok(request)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Price(args) => run_price(args, cli.json),
        Commands::Greeks { args, csv } => run_greeks(args, csv.as_deref(), cli.json),
        Commands::Payoff {
            spot,
            strike,
            option_type,
            csv,
        } => run_payoff(spot, strike, option_type, csv.as_deref(), cli.json),
        Commands::Estimate { history } => run_estimate(&history, cli.json),
    }
}

fn run_price(args: PricingArgs, json: bool) -> Result<()> {
    let request = args.into_request()?;
    let estimate = request.price()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
    } else {
        let (lo, hi) = estimate.confidence_interval_95();
        println!(
            "{} K={} T={} under {}",
            request.contract.option_type,
            request.contract.strike,
            request.contract.maturity,
            request.simulation.scheme.name()
        );
        println!("  Price:      {:.4}", estimate.price);
        println!("  Std error:  {:.4}", estimate.std_error);
        println!("  95% CI:     [{:.4}, {:.4}]", lo, hi);
        println!("  Paths:      {}", estimate.num_paths);
    }
    Ok(())
}

fn run_greeks(args: PricingArgs, csv: Option<&Path>, json: bool) -> Result<()> {
    let request = args.into_request()?;
    let result = request.greeks()?;

    if let Some(path) = csv {
        let label = format!("{}_{}", request.contract.option_type, request.contract.strike);
        write_greeks_csv(path, &[(label.as_str(), result)])
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "wrote greeks");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("  Price:  {:.4} ± {:.4}", result.price, result.std_error);
        println!("  Delta:  {:.4}", result.delta);
        println!("  Gamma:  {:.4}", result.gamma);
        println!("  Theta:  {:.4}", result.theta);
        println!("  Paths per leg: {}", result.num_paths);
    }
    Ok(())
}

fn run_payoff(
    spot: f64,
    strike: f64,
    option_type: OptionType,
    csv: Option<&Path>,
    json: bool,
) -> Result<()> {
    let rate = FixedRate::default().risk_free_rate();
    let contract = ContractSpec::new(strike, 1.0, option_type, rate);
    contract.validate()?;
    let grid = payoff_grid(&contract, spot);

    if let Some(path) = csv {
        write_payoff_grid_csv(path, &grid)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&grid)?);
    } else {
        println!("{:>10} {:>10}", "Spot", "Payoff");
        for (s, payoff) in &grid {
            println!("{:>10.2} {:>10.2}", s, payoff);
        }
    }
    Ok(())
}

fn run_estimate(history: &Path, json: bool) -> Result<()> {
    let text = std::fs::read_to_string(history)
        .with_context(|| format!("reading {}", history.display()))?;
    let prices = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            line.parse::<f64>()
                .with_context(|| format!("invalid price '{}'", line))
        })
        .collect::<Result<Vec<f64>>>()?;

    let params = HistoricalVolEstimator::default().estimate(&prices)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&params)?);
    } else {
        println!("[model]");
        println!("{}", toml::to_string(&params)?);
    }
    Ok(())
}
