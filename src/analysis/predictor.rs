/// Predictions for new, unseen rows.
///
/// New data must carry every training feature column. Columns are matched
/// by name and reordered to training order; unrelated extra columns (area
/// identifiers, a leftover target column) are ignored.

use crate::analysis::knn::KnnClassifier;
use crate::analysis::scaler::ScalerState;
use crate::ingest::csv_loader::feature_matrix;
use crate::model::{ClassLabel, Dataset, PipelineError};

/// Scales `new_rows` with the stored training statistics and classifies them.
///
/// # Errors
/// - `SchemaMismatch` - one or more training feature columns are absent;
///   every missing column is listed.
/// - `ParseFailure` - a feature cell is not numeric.
pub fn predict(
    model: &KnnClassifier,
    scaler: &ScalerState,
    new_rows: &Dataset,
) -> Result<Vec<ClassLabel>, PipelineError> {
    let training_columns = scaler.feature_columns();

    let missing = new_rows.missing_columns(training_columns);
    if !missing.is_empty() {
        return Err(PipelineError::schema_mismatch(
            format!(
                "'{}' must contain the training feature columns: {}",
                new_rows.origin().display(),
                training_columns.join(", ")
            ),
            missing,
        ));
    }

    let features = feature_matrix(new_rows, training_columns)?;
    let scaled = scaler.apply(&features)?;
    model.predict(&scaled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::scaler::StandardScaler;
    use crate::ingest::csv_loader::{read_dataset, split_features};
    use crate::ingest::fixtures::*;
    use crate::model::{RISK_HIGH, RISK_LOW};
    use std::path::Path;

    fn trained() -> (KnnClassifier, ScalerState) {
        let dataset = read_dataset(fixture_training_csv().as_bytes(), b',', Path::new("train.csv"))
            .expect("training fixture should parse");
        let loaded = split_features(dataset, "risco_alagamento").unwrap();
        let scaler = StandardScaler::fit(&loaded.features, &loaded.feature_columns).unwrap();
        let scaled = scaler.apply(&loaded.features).unwrap();
        let model = KnnClassifier::train(&scaled, &loaded.labels, 3).unwrap();
        (model, scaler)
    }

    fn new_data(text: &str) -> Dataset {
        read_dataset(text.as_bytes(), b',', Path::new("new.csv")).expect("fixture should parse")
    }

    #[test]
    fn test_predicts_with_reordered_and_extra_columns() {
        let (model, scaler) = trained();
        let rows = new_data(fixture_new_data_extra_columns_csv());

        let predictions = predict(&model, &scaler, &rows).expect("prediction should succeed");
        assert_eq!(predictions, vec![RISK_HIGH, RISK_LOW]);
    }

    #[test]
    fn test_missing_feature_column_is_schema_mismatch() {
        let (model, scaler) = trained();
        let rows = new_data(fixture_new_data_missing_column_csv());

        match predict(&model, &scaler, &rows) {
            Err(PipelineError::SchemaMismatch { missing, .. }) => {
                assert_eq!(missing, vec!["distancia_rio_km"]);
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_training_rows_predict_their_own_class() {
        let (model, scaler) = trained();
        let rows = new_data(fixture_training_csv());
        let predictions = predict(&model, &scaler, &rows).unwrap();
        assert_eq!(predictions, vec![0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2]);
    }

    #[test]
    fn test_prediction_is_repeatable() {
        let (model, scaler) = trained();
        let rows = new_data(fixture_new_data_extra_columns_csv());
        assert_eq!(
            predict(&model, &scaler, &rows).unwrap(),
            predict(&model, &scaler, &rows).unwrap()
        );
    }
}
