// tests/scheme_test.rs
use heston_mc::analytics::bs_analytic;
use heston_mc::mc::paths::{simulate_path_batch, simulate_terminal_prices};
use heston_mc::models::heston::Heston;
use heston_mc::rng::RngFactory;
use heston_mc::{
    price, ContractSpec, DiscretizationScheme, ModelParameters, OptionType, SimulationConfig,
};

// Feller condition badly violated: the Euler variance often crosses zero
fn rough_params() -> ModelParameters {
    ModelParameters {
        spot: 100.0,
        v0: 0.04,
        theta: 0.04,
        kappa: 0.5,
        sigma: 1.0,
        rho: -0.7,
    }
}

#[test]
fn test_partial_floor_stores_negative_variance() {
    let factory = RngFactory::new(42);
    let partial = Heston::new_with_scheme(rough_params(), 0.05, DiscretizationScheme::PartialFloor)
        .expect("Valid parameters");
    let truncated =
        Heston::new_with_scheme(rough_params(), 0.05, DiscretizationScheme::FullTruncation)
            .expect("Valid parameters");

    let partial_batch = simulate_path_batch(&partial, 1.0, 100, 2_000, 250, &factory);
    let truncated_batch = simulate_path_batch(&truncated, 1.0, 100, 2_000, 250, &factory);

    let negatives = partial_batch.variances().iter().filter(|v| **v < 0.0).count();
    println!(
        "\nPartial floor: {} negative stored variances out of {}",
        negatives,
        partial_batch.variances().len()
    );
    assert!(negatives > 0);
    assert!(truncated_batch.variances().iter().all(|v| *v >= 0.0));

    // Both start from the same state
    assert!(partial_batch.variances().column(0).iter().all(|v| *v == 0.04));
    assert!(truncated_batch.prices().column(0).iter().all(|s| *s == 100.0));
}

#[test]
fn test_schemes_diverge_only_after_variance_crosses_zero() {
    let factory = RngFactory::new(9);
    let partial = Heston::new_with_scheme(rough_params(), 0.05, DiscretizationScheme::PartialFloor)
        .expect("Valid parameters");
    let truncated =
        Heston::new_with_scheme(rough_params(), 0.05, DiscretizationScheme::FullTruncation)
            .expect("Valid parameters");

    let a = simulate_path_batch(&partial, 1.0, 50, 500, 100, &factory);
    let b = simulate_path_batch(&truncated, 1.0, 50, 500, 100, &factory);

    for path in 0..a.num_paths() {
        let va = a.variance_path(path);
        let first_negative = va.iter().position(|v| *v < 0.0);
        let agree_until = first_negative.unwrap_or(va.len() - 1);
        for step in 0..=agree_until {
            assert_eq!(a.price_path(path)[step], b.price_path(path)[step]);
        }
        if first_negative.is_none() {
            assert_eq!(va, b.variance_path(path));
        }
    }
}

#[test]
fn test_schemes_agree_when_feller_holds() {
    let params = ModelParameters::default();
    assert!(params.feller_condition_satisfied());
    let contract = ContractSpec::new(100.0, 1.0, OptionType::Call, 0.05);

    let estimate = |scheme: DiscretizationScheme| {
        let config = SimulationConfig {
            num_paths: 50_000,
            num_steps: 100,
            scheme,
            ..Default::default()
        }
        .with_seed(123);
        price(&params, &contract, &config).expect("Valid inputs")
    };

    let partial = estimate(DiscretizationScheme::PartialFloor);
    let truncated = estimate(DiscretizationScheme::FullTruncation);
    println!(
        "\nPartial floor {:.4} ± {:.4}, full truncation {:.4} ± {:.4}",
        partial.price, partial.std_error, truncated.price, truncated.std_error
    );
    // Same streams; paths only differ where the variance went negative
    assert!((partial.price - truncated.price).abs() < partial.std_error);
}

#[test]
fn test_deterministic_variance_converges_in_steps() {
    // With sigma = 0 the variance follows dv = kappa (theta - v) dt, so the option
    // is Black-Scholes with the time-averaged variance.
    let params = ModelParameters {
        spot: 100.0,
        v0: 0.09,
        theta: 0.04,
        kappa: 2.0,
        sigma: 0.0,
        rho: -0.5,
    };
    let (k, t, r) = (100.0, 1.0, 0.05);
    let avg_variance = params.theta
        + (params.v0 - params.theta) * (1.0 - (-params.kappa * t).exp()) / (params.kappa * t);
    let analytic = bs_analytic::bs_price(OptionType::Call, 100.0, k, r, avg_variance.sqrt(), t);
    let contract = ContractSpec::new(k, t, OptionType::Call, r);

    let mut errors = Vec::new();
    for num_steps in [1usize, 4, 200] {
        let config = SimulationConfig {
            num_paths: 200_000,
            num_steps,
            ..Default::default()
        }
        .with_seed(42);
        let estimate = price(&params, &contract, &config).expect("Valid inputs");
        let error = (estimate.price - analytic).abs();
        println!(
            "Steps: {:>4}, MC: {:.4} ± {:.4}, analytic: {:.4}, error: {:.4}",
            num_steps, estimate.price, estimate.std_error, analytic, error
        );
        errors.push((error, estimate.std_error));
    }

    // A single step uses v0 for the whole year
    assert!(errors[0].0 > 1.0);
    assert!(errors[0].0 > errors[1].0);
    assert!(errors[2].0 < 4.0 * errors[2].1 + 0.05);
}

#[test]
fn test_terminal_prices_positive_under_both_schemes() {
    let factory = RngFactory::new(17);
    for scheme in [DiscretizationScheme::PartialFloor, DiscretizationScheme::FullTruncation] {
        let model = Heston::new_with_scheme(rough_params(), 0.05, scheme).expect("Valid parameters");
        let terminals = simulate_terminal_prices(&model, 2.0, 200, 5_000, 1024, &factory);
        assert_eq!(terminals.len(), 5_000);
        assert!(
            terminals.iter().all(|s| s.is_finite() && *s > 0.0),
            "{} produced a non-positive terminal price",
            scheme.name()
        );
    }
}
