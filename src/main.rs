//! Flood Risk KNN - batch classifier
//!
//! Loads a tabular dataset, trains a K-Nearest-Neighbors classifier to
//! label flood risk, evaluates it on a stratified held-out split, and
//! raises an alert for points predicted high risk.
//!
//! Usage:
//!   cargo run --release -- data.csv                         # alert on held-out split
//!   cargo run --release -- data.csv --new-data points.csv   # alert on new data
//!
//! Options:
//!   --new-data PATH      Predict and alert on this file instead of the test split
//!   --config PATH        TOML configuration (see floodrisk.toml)
//!   --neighbors N        Override n_neighbors from the configuration
//!   --report-json PATH   Also write a machine-readable run summary
//!
//! Environment:
//!   FLOOD_RISK_CONFIG - configuration file used when --config is absent

use flood_risk_knn::config;
use flood_risk_knn::pipeline::Pipeline;
use std::env;
use std::fs;
use std::path::PathBuf;

fn usage(program: &str) -> String {
    format!(
        "Usage: {} <TRAINING_CSV> [--new-data PATH] [--config PATH] [--neighbors N] [--report-json PATH]",
        program
    )
}

fn main() {
    println!("🌊 Flood Risk KNN");
    println!("=================\n");

    // Parse command-line arguments
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("flood_risk_knn");

    let mut training_path: Option<PathBuf> = None;
    let mut new_data_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut report_path: Option<PathBuf> = None;
    let mut neighbors: Option<usize> = None;

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--new-data" | "--config" | "--neighbors" | "--report-json" => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("Error: {} requires a value", flag);
                    eprintln!("{}", usage(program));
                    std::process::exit(1);
                };
                match flag {
                    "--new-data" => new_data_path = Some(PathBuf::from(value)),
                    "--config" => config_path = Some(PathBuf::from(value)),
                    "--report-json" => report_path = Some(PathBuf::from(value)),
                    _ => match value.parse::<usize>() {
                        Ok(k) => neighbors = Some(k),
                        Err(_) => {
                            eprintln!("Error: --neighbors expects a non-negative integer, got '{}'", value);
                            std::process::exit(1);
                        }
                    },
                }
                i += 2;
            }
            "-h" | "--help" => {
                println!("{}", usage(program));
                return;
            }
            other if other.starts_with("--") => {
                eprintln!("Unknown argument: {}", other);
                eprintln!("{}", usage(program));
                std::process::exit(1);
            }
            other => {
                if training_path.is_some() {
                    eprintln!("Unexpected extra argument: {}", other);
                    eprintln!("{}", usage(program));
                    std::process::exit(1);
                }
                training_path = Some(PathBuf::from(other));
                i += 1;
            }
        }
    }

    let Some(training_path) = training_path else {
        eprintln!("Error: a training data path is required");
        eprintln!("{}", usage(program));
        std::process::exit(1);
    };

    // Resolve configuration before touching any data file
    let mut pipeline_config = match config::load_effective_config(config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("\n❌ Configuration error: {}\n", e);
            std::process::exit(1);
        }
    };
    if let Some(k) = neighbors {
        pipeline_config.n_neighbors = k;
    }

    let pipeline = match Pipeline::new(pipeline_config) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("\n❌ {}\n", e);
            std::process::exit(1);
        }
    };

    let summary = match pipeline.run(&training_path, new_data_path.as_deref()) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("\n❌ {}\n", e);
            eprintln!("Could not complete training. Exiting.");
            std::process::exit(1);
        }
    };

    if let Some(path) = report_path {
        let written = serde_json::to_string_pretty(&summary.to_json())
            .map_err(|e| e.to_string())
            .and_then(|text| fs::write(&path, text).map_err(|e| e.to_string()));
        match written {
            Ok(()) => println!("\n✓ Run summary written to '{}'", path.display()),
            Err(e) => {
                eprintln!("\n❌ Failed to write run summary to '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }

    if !summary.completed() {
        std::process::exit(1);
    }
}
