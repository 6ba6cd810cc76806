// scripts/benchmark.rs
use anyhow::{Context, Result};
use heston_mc::analytics::bs_analytic;
use heston_mc::math_utils::Timer;
use heston_mc::{
    greeks, price, ContractSpec, DiscretizationScheme, ModelParameters, OptionType,
    RandomNumbers, SimulationConfig,
};
use std::env;
use std::fs::File;
use std::io::Write;

#[derive(Debug)]
struct SystemInfo {
    os: String,
    cpu_model: String,
    cpu_cores: usize,
    rustc_flags: String,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        Self {
            os: env::consts::OS.to_string(),
            cpu_model: Self::get_cpu_model(),
            cpu_cores: num_cpus::get(),
            rustc_flags: env::var("RUSTFLAGS").unwrap_or_else(|_| "default".to_string()),
            rayon_threads: rayon::current_num_threads(),
        }
    }

    fn get_cpu_model() -> String {
        #[cfg(target_os = "linux")]
        {
            std::fs::read_to_string("/proc/cpuinfo")
                .ok()
                .and_then(|content| {
                    content
                        .lines()
                        .find(|line| line.starts_with("model name"))
                        .and_then(|line| line.split(':').nth(1))
                        .map(|s| s.trim().to_string())
                })
                .unwrap_or_else(|| "Unknown CPU".to_string())
        }

        #[cfg(not(target_os = "linux"))]
        {
            "Unknown CPU".to_string()
        }
    }
}

#[derive(Debug)]
struct BenchmarkResult {
    name: String,
    paths: usize,
    time_ms: f64,
    throughput_paths_per_sec: f64,
    value: f64,
    analytic_value: Option<f64>,
    relative_error: Option<f64>,
}

fn run_price_benchmarks() -> Result<Vec<BenchmarkResult>> {
    let mut results = Vec::new();
    let contract = ContractSpec::new(100.0, 1.0, OptionType::Call, 0.05);

    // Zero vol-of-vol: constant variance, Black-Scholes with σ = √θ
    let bs_limit = ModelParameters {
        sigma: 0.0,
        ..ModelParameters::default()
    };
    let analytic = bs_analytic::bs_price(OptionType::Call, 100.0, 100.0, 0.05, 0.2, 1.0);

    for &paths in &[10_000usize, 100_000, 1_000_000] {
        for scheme in [DiscretizationScheme::PartialFloor, DiscretizationScheme::FullTruncation] {
            let config = SimulationConfig {
                num_paths: paths,
                num_steps: 100,
                scheme,
                ..Default::default()
            }
            .with_seed(42);

            let timer = Timer::new();
            let estimate = price(&ModelParameters::default(), &contract, &config)?;
            let time_ms = timer.elapsed_ms();

            results.push(BenchmarkResult {
                name: format!("Heston Call ({})", scheme.name()),
                paths,
                time_ms,
                throughput_paths_per_sec: paths as f64 / (time_ms / 1000.0),
                value: estimate.price,
                analytic_value: None,
                relative_error: None,
            });
        }

        let config = SimulationConfig {
            num_paths: paths,
            num_steps: 100,
            ..Default::default()
        }
        .with_seed(42);
        let timer = Timer::new();
        let estimate = price(&bs_limit, &contract, &config)?;
        let time_ms = timer.elapsed_ms();

        results.push(BenchmarkResult {
            name: "Heston Call (sigma = 0)".to_string(),
            paths,
            time_ms,
            throughput_paths_per_sec: paths as f64 / (time_ms / 1000.0),
            value: estimate.price,
            analytic_value: Some(analytic),
            relative_error: Some((estimate.price - analytic).abs() / analytic),
        });
    }

    Ok(results)
}

fn run_greeks_benchmarks() -> Result<Vec<BenchmarkResult>> {
    let mut results = Vec::new();
    let contract = ContractSpec::new(100.0, 1.0, OptionType::Call, 0.05);

    for random_numbers in [RandomNumbers::Independent, RandomNumbers::Common] {
        let config = SimulationConfig {
            num_paths: 50_000,
            random_numbers,
            ..Default::default()
        }
        .with_seed(42);

        let timer = Timer::new();
        let g = greeks(&ModelParameters::default(), &contract, &config)?;
        let time_ms = timer.elapsed_ms();
        let total_paths = g.num_paths * 4;

        results.push(BenchmarkResult {
            name: format!("Heston Greeks Delta ({:?})", random_numbers),
            paths: total_paths,
            time_ms,
            throughput_paths_per_sec: total_paths as f64 / (time_ms / 1000.0),
            value: g.delta,
            analytic_value: None,
            relative_error: None,
        });
    }

    Ok(results)
}

fn write_results_to_csv(
    results: &[BenchmarkResult],
    system_info: &SystemInfo,
    filename: &str,
) -> Result<()> {
    let mut file =
        File::create(filename).with_context(|| format!("Could not create {}", filename))?;

    writeln!(file, "# System Information")?;
    writeln!(file, "# OS: {}", system_info.os)?;
    writeln!(file, "# CPU: {}", system_info.cpu_model)?;
    writeln!(file, "# CPU Cores: {}", system_info.cpu_cores)?;
    writeln!(file, "# RUSTFLAGS: {}", system_info.rustc_flags)?;
    writeln!(file, "# Rayon Threads: {}", system_info.rayon_threads)?;
    writeln!(
        file,
        "# Benchmark Date: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(file, "#")?;

    writeln!(
        file,
        "Benchmark,Paths,Time_ms,Throughput_paths_per_sec,Value,Analytic_Value,Relative_Error"
    )?;
    for result in results {
        writeln!(
            file,
            "{},{},{:.2},{:.0},{:.6},{},{}",
            result.name,
            result.paths,
            result.time_ms,
            result.throughput_paths_per_sec,
            result.value,
            result
                .analytic_value
                .map(|v| format!("{:.6}", v))
                .unwrap_or_else(|| "N/A".to_string()),
            result
                .relative_error
                .map(|e| format!("{:.6}", e))
                .unwrap_or_else(|| "N/A".to_string())
        )?;
    }

    Ok(())
}

fn main() -> Result<()> {
    println!("heston-mc Benchmark Suite");
    println!("=========================\n");

    let system_info = SystemInfo::gather();
    println!("System Information:");
    println!("  OS: {}", system_info.os);
    println!("  CPU: {}", system_info.cpu_model);
    println!("  CPU Cores: {}", system_info.cpu_cores);
    println!("  RUSTFLAGS: {}", system_info.rustc_flags);
    println!("  Rayon Threads: {}", system_info.rayon_threads);
    println!();

    println!("Running pricing benchmarks...");
    let mut all_results = run_price_benchmarks()?;
    println!("Running Greeks benchmarks...");
    all_results.extend(run_greeks_benchmarks()?);

    println!("\n{:=<100}", "");
    println!(
        "{:<45} {:>9} {:>12} {:>15} {:>10} {:>10} {:>10}",
        "Benchmark", "Paths", "Time (ms)", "Throughput", "Value", "Analytic", "Rel Error"
    );
    println!("{:-<100}", "");
    for result in &all_results {
        println!(
            "{:<45} {:>9} {:>12.2} {:>15.0} {:>10.4} {:>10} {:>10}",
            result.name,
            result.paths,
            result.time_ms,
            result.throughput_paths_per_sec,
            result.value,
            result
                .analytic_value
                .map(|v| format!("{:.4}", v))
                .unwrap_or_else(|| "N/A".to_string()),
            result
                .relative_error
                .map(|e| format!("{:.2}%", e * 100.0))
                .unwrap_or_else(|| "N/A".to_string())
        );
    }
    println!("{:=<100}", "");

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!("benchmark_results_{}.csv", timestamp);
    write_results_to_csv(&all_results, &system_info, &filename)?;
    println!("\nResults saved to: {}", filename);
    println!("Run again with: cargo run --bin benchmark --release");

    Ok(())
}
