// src/output.rs
use crate::mc::greeks::GreeksResult;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

pub fn write_greeks_csv(path: impl AsRef<Path>, results: &[(&str, GreeksResult)]) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "label,price,std_error,delta,gamma,theta,paths_per_leg")?;
    for (label, g) in results {
        writeln!(
            file,
            "{},{},{},{},{},{},{}",
            label, g.price, g.std_error, g.delta, g.gamma, g.theta, g.num_paths
        )?;
    }
    file.flush()
}

pub fn write_payoff_grid_csv(path: impl AsRef<Path>, grid: &[(f64, f64)]) -> io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "spot,payoff")?;
    for (spot, payoff) in grid {
        writeln!(file, "{},{}", spot, payoff)?;
    }
    file.flush()
}
