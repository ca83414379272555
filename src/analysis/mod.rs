/// Model fitting and scoring for the flood risk pipeline.
///
/// Submodules:
/// - `split`      - stratified, seeded train/test partitioning.
/// - `scaler`     - standardization fit on training rows only.
/// - `knn`        - nearest-neighbour classifier.
/// - `evaluation` - confusion matrix and classification report.
/// - `predictor`  - schema-checked predictions for new data.

pub mod evaluation;
pub mod knn;
pub mod predictor;
pub mod scaler;
pub mod split;
