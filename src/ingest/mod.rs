/// Data ingestion for the flood risk pipeline.
///
/// Submodules:
/// - `csv_loader` - delimited file reading, target/feature separation.
/// - `sample`     - seeded synthetic dataset for demos and tests.
/// - `fixtures` (test only) - small CSV payloads for loader tests.

pub mod csv_loader;
pub mod sample;

#[cfg(test)]
pub(crate) mod fixtures;
