/// flood_risk_knn: nearest-neighbour flood risk classification and alerting.
///
/// # Module structure
///
/// ```text
/// flood_risk_knn
/// ├── model       - shared data types (Dataset, LoadedDataset, ClassLabel, PipelineError)
/// ├── config      - pipeline settings loader (optional TOML file)
/// ├── ingest
/// │   ├── csv_loader - delimited file reading, target/feature separation
/// │   ├── sample     - seeded synthetic dataset
/// │   └── fixtures (test only) - representative CSV payloads
/// ├── analysis
/// │   ├── split      - stratified, seeded train/test split
/// │   ├── scaler     - standardization fit on training rows
/// │   ├── knn        - nearest-neighbour classifier
/// │   ├── evaluation - confusion matrix and classification report
/// │   └── predictor  - schema-checked predictions for new data
/// ├── alert       - high-risk record collection and reporting
/// └── pipeline    - load → split → train → evaluate → predict → alert
/// ```

/// Public modules
pub mod alert;
pub mod analysis;
pub mod config;
pub mod ingest;
pub mod model;
pub mod pipeline;
