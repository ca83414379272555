#!/usr/bin/env rust
//! Sample Dataset Generator
//!
//! Writes a synthetic flood risk dataset with the same layout as the field
//! survey export: five numeric features plus the `risco_alagamento` target
//! (0 low, 1 medium, 2 high).
//!
//! Usage:
//!   cargo run --bin generate_sample_data -- [PATH]
//!
//! Options:
//!   --rows N     Number of rows (default: 200)
//!   --seed N     Random seed (default: 42)
//!   --force      Overwrite PATH if it already exists

use flood_risk_knn::ingest::sample::{DEFAULT_SAMPLE_ROWS, DEFAULT_SAMPLE_SEED, write_sample_csv};
use flood_risk_knn::model::class_counts;
use std::env;
use std::path::PathBuf;

const DEFAULT_OUTPUT: &str = "dados_alagamento_exemplo.csv";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🌊 Sample Flood Risk Dataset");
    println!("============================\n");

    // Parse arguments
    let args: Vec<String> = env::args().collect();
    let option = |name: &str| {
        args.iter()
            .position(|a| a == name)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };

    let rows = match option("--rows") {
        Some(v) => v.parse::<usize>()?,
        None => DEFAULT_SAMPLE_ROWS,
    };
    let seed = match option("--seed") {
        Some(v) => v.parse::<u64>()?,
        None => DEFAULT_SAMPLE_SEED,
    };
    let force = args.contains(&"--force".to_string());

    // First positional argument that is not an option value
    let mut path = PathBuf::from(DEFAULT_OUTPUT);
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rows" | "--seed" => i += 2,
            "--force" => i += 1,
            other => {
                path = PathBuf::from(other);
                break;
            }
        }
    }

    if path.exists() && !force {
        println!("⚠ '{}' already exists; pass --force to overwrite", path.display());
        return Ok(());
    }

    println!("📝 Writing {} rows (seed {}) to '{}'...", rows, seed, path.display());
    let dataset = write_sample_csv(&path, rows, seed)?;

    let target_idx = dataset.columns.len() - 1;
    let labels: Vec<i64> = dataset
        .rows
        .iter()
        .filter_map(|r| r[target_idx].parse().ok())
        .collect();

    println!("✓ Sample dataset written");
    for (label, count) in class_counts(&labels) {
        println!("  class {}: {} rows", label, count);
    }

    Ok(())
}
