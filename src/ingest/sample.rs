/// Synthetic flood risk dataset for demos and end-to-end tests.
///
/// Produces the same column layout and value ranges as the field survey
/// export the pipeline was built around. Labels are drawn independently of
/// the features, so a classifier trained on this data is expected to score
/// near chance; the data exercises the workflow, not the model.
///
/// Generation is explicit (the `generate_sample_data` binary or a direct
/// call). The loader never substitutes sample data for a missing file.

use csv::Writer;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::error::Error;
use std::path::Path;

use crate::model::{DEFAULT_TARGET_COLUMN, Dataset};

/// Feature columns of the sample data, in file order.
pub const SAMPLE_FEATURE_COLUMNS: [&str; 5] = [
    "nivel_chuva_mm",
    "historico_alagamentos",
    "altitude_m",
    "permeabilidade_solo",
    "distancia_rio_km",
];

/// Row count used by the demo workflow.
pub const DEFAULT_SAMPLE_ROWS: usize = 200;

/// Seed used by the demo workflow.
pub const DEFAULT_SAMPLE_SEED: u64 = 42;

/// Generates `n` rows:
///   nivel_chuva_mm        in [10, 130)
///   historico_alagamentos in 0..=5
///   altitude_m            in [5, 45)
///   permeabilidade_solo   in [0.1, 0.9)
///   distancia_rio_km      in [0.1, 5.1)
///   risco_alagamento      in 0..=2
pub fn generate_sample_dataset(n: usize, seed: u64) -> Dataset {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut columns: Vec<String> = SAMPLE_FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.push(DEFAULT_TARGET_COLUMN.to_string());

    let rows = (0..n)
        .map(|_| {
            vec![
                format!("{:.3}", rng.gen_range(10.0..130.0)),
                rng.gen_range(0..=5u32).to_string(),
                format!("{:.3}", rng.gen_range(5.0..45.0)),
                format!("{:.4}", rng.gen_range(0.1..0.9)),
                format!("{:.4}", rng.gen_range(0.1..5.1)),
                rng.gen_range(0..=2i64).to_string(),
            ]
        })
        .collect();

    Dataset::new(columns, rows)
}

/// Writes a dataset as comma-separated text with a header row.
pub fn write_dataset_csv(dataset: &Dataset, path: &Path) -> Result<(), Box<dyn Error>> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(&dataset.columns)?;
    for row in &dataset.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Generates and writes a sample dataset to `path`.
pub fn write_sample_csv(path: &Path, n: usize, seed: u64) -> Result<Dataset, Box<dyn Error>> {
    let dataset = generate_sample_dataset(n, seed).with_source(path);
    write_dataset_csv(&dataset, path)?;
    Ok(dataset)
}
