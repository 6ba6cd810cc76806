// demos/error_handling_demo.rs
use heston_mc::config::{ConfigError, PricingRequest};
use heston_mc::models::heston::Heston;
use heston_mc::{
    greeks, price, ContractSpec, ModelParameters, OptionType, PricingError, SimulationConfig,
};

fn main() {
    println!("Error Handling Demo for heston-mc");
    println!("=================================\n");

    let contract = ContractSpec::new(100.0, 1.0, OptionType::Call, 0.05);
    let config = SimulationConfig::default().with_seed(42);

    // Test 1: Invalid spot
    println!("1. Testing negative spot price...");
    let invalid_spot = ModelParameters {
        spot: -100.0,
        ..Default::default()
    };
    match price(&invalid_spot, &contract, &config) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    // Test 2: Invalid correlation
    println!("\n2. Testing invalid correlation...");
    let invalid_rho = ModelParameters {
        rho: 1.5,
        ..Default::default()
    };
    match Heston::new(invalid_rho, 0.05) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {} (field: {:?})", e, e.field()),
    }

    // Test 3: Extreme parameters that are still valid
    println!("\n3. Testing extreme but valid parameters...");
    let extreme = ModelParameters {
        kappa: 1.0,
        sigma: 0.8,
        ..Default::default()
    };
    println!(
        "   Feller condition satisfied: {}",
        extreme.feller_condition_satisfied()
    );
    match price(&extreme, &contract, &config) {
        Ok(estimate) => println!("   ✓ Priced anyway: {:.4} ± {:.4}", estimate.price, estimate.std_error),
        Err(e) => println!("   Error: {}", e),
    }

    // Test 4: Invalid simulation configuration
    println!("\n4. Testing invalid simulation configuration...");
    let zero_paths = SimulationConfig {
        num_paths: 0,
        ..config.clone()
    };
    match greeks(&ModelParameters::default(), &contract, &zero_paths) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => {
            println!("   ✓ Caught error: {}", e);
            println!("   Validation error: {}", e.is_validation());
        }
    }

    // Test 5: Non-finite contract terms
    println!("\n5. Testing NaN strike...");
    let nan_strike = ContractSpec::new(f64::NAN, 1.0, OptionType::Put, 0.05);
    match price(&ModelParameters::default(), &nan_strike, &config) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(PricingError::InvalidParameter { parameter, .. }) => {
            println!("   ✓ Rejected parameter '{}'", parameter)
        }
        Err(e) => println!("   Other error: {}", e),
    }

    // Test 6: Expired contract prices at intrinsic value
    println!("\n6. Testing zero maturity...");
    let expired = ContractSpec::new(90.0, 0.0, OptionType::Call, 0.05);
    match price(&ModelParameters::default(), &expired, &config) {
        Ok(estimate) => println!(
            "   ✓ Intrinsic value: {:.4} (std error {:.4})",
            estimate.price, estimate.std_error
        ),
        Err(e) => println!("   Error: {}", e),
    }

    // Test 7: Malformed and invalid request files
    println!("\n7. Testing pricing requests...");
    match PricingRequest::from_toml_str("[model]\nspot = \"one hundred\"") {
        Err(ConfigError::Parse(e)) => println!("   ✓ Parse error: {}", e.message()),
        other => println!("   Unexpected: {:?}", other.map(|_| ())),
    }
    let bad_request = r#"
        [model]
        spot = 100.0
        v0 = -0.04
        theta = 0.04
        kappa = 2.0
        sigma = 0.3
        rho = -0.5

        [contract]
        strike = 100.0
        maturity = 1.0
        option_type = "call"
        risk_free_rate = 0.05
    "#;
    match PricingRequest::from_toml_str(bad_request) {
        Err(ConfigError::Invalid(e)) => println!("   ✓ Invalid request: {}", e),
        other => println!("   Unexpected: {:?}", other.map(|_| ())),
    }

    println!("\n=================================");
    println!("Error handling demo completed!");
}
