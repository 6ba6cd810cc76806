// demos/demo.rs
use heston_mc::analytics::bs_analytic;
use heston_mc::estimation::{HistoricalVolEstimator, ParameterEstimator};
use heston_mc::math_utils::Timer;
use heston_mc::mc::paths::simulate_path_batch;
use heston_mc::mc::payoffs::payoff_grid;
use heston_mc::models::heston::Heston;
use heston_mc::output;
use heston_mc::rng::RngFactory;
use heston_mc::{
    greeks, price, ContractSpec, DiscretizationScheme, ModelParameters, OptionType,
    RandomNumbers, SimulationConfig,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Running heston-mc Monte Carlo Demo\n");

    let params = ModelParameters::default();
    let r = 0.05;
    let config = SimulationConfig {
        num_paths: 100_000,
        num_steps: 100,
        ..Default::default()
    }
    .with_seed(42);

    println!("--- Heston European Options ---");
    for (label, option_type) in [("Call", OptionType::Call), ("Put", OptionType::Put)] {
        let contract = ContractSpec::new(100.0, 1.0, option_type, r);
        let timer = Timer::new();
        let estimate = price(&params, &contract, &config).expect("Valid inputs");
        let (lo, hi) = estimate.confidence_interval_95();
        println!(
            "{} Price: {:.4} (StdErr: {:.4}, 95% CI [{:.4}, {:.4}], Time: {:.2} ms)",
            label,
            estimate.price,
            estimate.std_error,
            lo,
            hi,
            timer.elapsed_ms()
        );
    }

    println!("\n--- Zero vol-of-vol vs Black-Scholes ---");
    let flat = ModelParameters {
        sigma: 0.0,
        ..params
    };
    let contract = ContractSpec::new(100.0, 1.0, OptionType::Call, r);
    let mc = price(&flat, &contract, &config).expect("Valid inputs");
    let bs = bs_analytic::bs_price(OptionType::Call, 100.0, 100.0, r, 0.2, 1.0);
    println!(
        "MC: {:.4} ± {:.4}   Analytic: {:.4}   Diff: {:.4}",
        mc.price,
        mc.std_error,
        bs,
        (mc.price - bs).abs()
    );

    println!("\n--- Discretization schemes ---");
    let wild = ModelParameters {
        sigma: 1.0,
        kappa: 0.5,
        ..params
    };
    for scheme in [DiscretizationScheme::PartialFloor, DiscretizationScheme::FullTruncation] {
        let cfg = SimulationConfig { scheme, ..config.clone() };
        let estimate = price(&wild, &contract, &cfg).expect("Valid inputs");
        println!("{:<22} {:.4} ± {:.4}", scheme.name(), estimate.price, estimate.std_error);
    }

    let model = Heston::new(wild, r).expect("Valid inputs");
    let batch = simulate_path_batch(&model, 1.0, 100, 2_000, 256, &RngFactory::new(7));
    let negatives = batch.variances().iter().filter(|v| **v < 0.0).count();
    println!(
        "Partial floor: {} of {} stored variances are negative",
        negatives,
        batch.variances().len()
    );

    println!("\n--- Greeks (finite differences) ---");
    let mut rows = Vec::new();
    for random_numbers in [RandomNumbers::Independent, RandomNumbers::Common] {
        let cfg = SimulationConfig {
            num_paths: 50_000,
            random_numbers,
            ..config.clone()
        };
        let timer = Timer::new();
        let g = greeks(&params, &contract, &cfg).expect("Valid inputs");
        println!(
            "{:?}: Delta {:.4}  Gamma {:.4}  Theta {:.4}  ({:.2} ms)",
            random_numbers,
            g.delta,
            g.gamma,
            g.theta,
            timer.elapsed_ms()
        );
        rows.push((
            match random_numbers {
                RandomNumbers::Independent => "independent",
                RandomNumbers::Common => "common",
            },
            g,
        ));
    }
    println!(
        "Black-Scholes reference (σ = 20%): Delta {:.4}  Gamma {:.4}  Theta {:.4}",
        bs_analytic::bs_delta(OptionType::Call, 100.0, 100.0, r, 0.2, 1.0),
        bs_analytic::bs_gamma(100.0, 100.0, r, 0.2, 1.0),
        bs_analytic::bs_theta(OptionType::Call, 100.0, 100.0, r, 0.2, 1.0)
    );

    println!("\n--- Parameters from price history ---");
    let history: Vec<f64> = (0..120)
        .map(|i| 100.0 * (1.0 + 0.02 * ((i as f64) * 0.7).sin()))
        .collect();
    let estimated = HistoricalVolEstimator::default()
        .estimate(&history)
        .expect("Positive prices");
    println!(
        "spot {:.2}  v0 {:.4}  theta {:.4}  kappa {}  sigma {}  rho {}",
        estimated.spot, estimated.v0, estimated.theta, estimated.kappa, estimated.sigma, estimated.rho
    );

    let out_dir = std::env::temp_dir();
    let greeks_path = out_dir.join("heston_greeks.csv");
    let grid_path = out_dir.join("heston_payoff.csv");
    output::write_greeks_csv(&greeks_path, &rows).expect("Could not write greeks");
    output::write_payoff_grid_csv(&grid_path, &payoff_grid(&contract, params.spot))
        .expect("Could not write payoff grid");
    println!("\nResults written to {} and {}", greeks_path.display(), grid_path.display());
}
