/// Flood risk workflow orchestration
///
/// Runs the stages strictly in order, each one finishing before the next:
/// 1. Load the training file and separate target from features
/// 2. Split rows into stratified train/test partitions (seeded)
/// 3. Fit the scaler on the training partition and train the classifier
/// 4. Evaluate on the held-out partition and print the report
/// 5. Predict new data if a path was given, otherwise the held-out rows
/// 6. Raise a high-risk alert (or report that none was found)
///
/// A failure in stages 1–4 aborts the run. A failure in stage 5 only
/// aborts the prediction/alert phase; the evaluation already printed stays
/// valid and is returned in the `RunSummary`.

use chrono::{DateTime, Utc};
use ndarray::{Array2, Axis};
use std::path::{Path, PathBuf};

use crate::alert::{self, AlertOutcome};
use crate::analysis::evaluation::{self, ClassificationReport};
use crate::analysis::knn::KnnClassifier;
use crate::analysis::predictor;
use crate::analysis::scaler::{ScalerState, StandardScaler};
use crate::analysis::split::{SplitIndices, stratified_split};
use crate::config::PipelineConfig;
use crate::ingest::csv_loader;
use crate::model::{ClassLabel, LoadedDataset, PipelineError, class_counts, risk_class_name};

/// Rows shown in the dataset summary
const SUMMARY_HEAD_ROWS: usize = 5;

// ---------------------------------------------------------------------------
// Stage outputs
// ---------------------------------------------------------------------------

/// Everything produced by the training phase. Read-only afterwards.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub loaded: LoadedDataset,
    pub split: SplitIndices,
    pub scaler: ScalerState,
    pub model: KnnClassifier,
    pub scaled_test: Array2<f64>,
    pub test_labels: Vec<ClassLabel>,
}

/// Where the prediction phase took its rows from.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionSource {
    NewData(PathBuf),
    HeldOutSplit,
}

impl PredictionSource {
    fn describe(&self) -> String {
        match self {
            PredictionSource::NewData(path) => path.display().to_string(),
            PredictionSource::HeldOutSplit => "held-out test partition".to_string(),
        }
    }
}

/// Outcome of the prediction/alert phase.
#[derive(Debug)]
pub enum PredictionPhase {
    Completed {
        source: PredictionSource,
        predictions: Vec<ClassLabel>,
        outcome: AlertOutcome,
    },
    Aborted {
        source: PredictionSource,
        error: PipelineError,
    },
}

impl PredictionPhase {
    pub fn alert_outcome(&self) -> Option<&AlertOutcome> {
        match self {
            PredictionPhase::Completed { outcome, .. } => Some(outcome),
            PredictionPhase::Aborted { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&PipelineError> {
        match self {
            PredictionPhase::Completed { .. } => None,
            PredictionPhase::Aborted { error, .. } => Some(error),
        }
    }
}

/// Result of a run that got past training and evaluation.
#[derive(Debug)]
pub struct RunSummary {
    pub finished_at: DateTime<Utc>,
    pub training_path: PathBuf,
    pub dataset_rows: usize,
    pub feature_columns: Vec<String>,
    pub train_size: usize,
    pub test_size: usize,
    pub test_class_counts: Vec<(ClassLabel, usize)>,
    pub report: ClassificationReport,
    pub prediction: PredictionPhase,
}

impl RunSummary {
    /// True when every stage, including prediction and alerting, completed.
    pub fn completed(&self) -> bool {
        matches!(self.prediction, PredictionPhase::Completed { .. })
    }

    /// Machine-readable form of the run for `--report-json`.
    pub fn to_json(&self) -> serde_json::Value {
        let prediction = match &self.prediction {
            PredictionPhase::Completed { source, predictions, outcome } => serde_json::json!({
                "status": "completed",
                "source": source.describe(),
                "predicted_rows": predictions.len(),
                "predicted_class_counts": counts_json(&class_counts(predictions)),
                "alert": outcome,
            }),
            PredictionPhase::Aborted { source, error } => serde_json::json!({
                "status": "aborted",
                "source": source.describe(),
                "error_kind": error.kind(),
                "error": error.to_string(),
            }),
        };

        serde_json::json!({
            "finished_at": self.finished_at,
            "training_path": self.training_path.display().to_string(),
            "dataset_rows": self.dataset_rows,
            "feature_columns": self.feature_columns,
            "train_size": self.train_size,
            "test_size": self.test_size,
            "test_class_counts": counts_json(&self.test_class_counts),
            "evaluation": self.report,
            "prediction": prediction,
        })
    }
}

fn counts_json(counts: &[(ClassLabel, usize)]) -> serde_json::Value {
    counts
        .iter()
        .map(|(label, count)| (label.to_string(), serde_json::json!(count)))
        .collect::<serde_json::Map<String, serde_json::Value>>()
        .into()
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// One-shot batch workflow with a validated configuration.
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Validates the configuration up front, before any file is touched.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Stage 1: load the training file and print a short summary.
    pub fn load(&self, training_path: &Path) -> Result<LoadedDataset, PipelineError> {
        println!("📊 Loading training data from '{}'...", training_path.display());
        let loaded = csv_loader::load_training_dataset(
            training_path,
            &self.config.target_column,
            self.config.delimiter_byte(),
        )?;

        println!("✓ Loaded {} rows, {} columns", loaded.dataset.len(), loaded.dataset.columns.len());
        println!("  Target: {}", loaded.target_column);
        println!("  Features: {}", loaded.feature_columns.join(", "));
        println!("  Class distribution:");
        for (label, count) in class_counts(&loaded.labels) {
            println!("    {} ({}): {}", label, risk_class_name(label), count);
        }
        println!();

        let head: Vec<usize> = (0..loaded.dataset.len().min(SUMMARY_HEAD_ROWS)).collect();
        print!("{}", loaded.dataset.render_rows(&head));
        println!();

        Ok(loaded)
    }

    /// Stage 2: stratified train/test split.
    pub fn split(&self, loaded: &LoadedDataset) -> Result<SplitIndices, PipelineError> {
        let split = stratified_split(&loaded.labels, self.config.test_ratio, self.config.seed)?;
        println!(
            "✓ Data split: {} for training, {} for testing (seed {})\n",
            split.train.len(),
            split.test.len(),
            self.config.seed
        );
        Ok(split)
    }

    /// Stage 3: fit the scaler on training rows only, then train the model.
    pub fn train(&self, loaded: LoadedDataset, split: SplitIndices) -> Result<TrainedModel, PipelineError> {
        let train_features = loaded.features.select(Axis(0), &split.train);
        let test_features = loaded.features.select(Axis(0), &split.test);
        let train_labels: Vec<ClassLabel> = split.train.iter().map(|&i| loaded.labels[i]).collect();
        let test_labels: Vec<ClassLabel> = split.test.iter().map(|&i| loaded.labels[i]).collect();

        let scaler = StandardScaler::fit(&train_features, &loaded.feature_columns)?;
        for column in scaler.constant_columns() {
            println!("⚠ Feature '{}' is constant in the training partition; it is centered only", column);
        }
        let scaled_train = scaler.apply(&train_features)?;
        let scaled_test = scaler.apply(&test_features)?;

        println!("⚙️  Training KNN classifier with k={}...", self.config.n_neighbors);
        let model = KnnClassifier::train(&scaled_train, &train_labels, self.config.n_neighbors)?;
        println!("✓ Model trained on {} samples\n", model.n_samples());

        Ok(TrainedModel {
            loaded,
            split,
            scaler,
            model,
            scaled_test,
            test_labels,
        })
    }

    /// Stage 4: score the held-out partition and print the report.
    pub fn evaluate(&self, trained: &TrainedModel) -> Result<ClassificationReport, PipelineError> {
        println!("📋 Evaluating model...");
        let report = evaluation::evaluate(&trained.model, &trained.scaled_test, &trained.test_labels)?;

        println!("\nConfusion matrix:");
        println!("{}", report.confusion_matrix);
        println!("\nClassification report:");
        println!("{}", report);

        Ok(report)
    }

    /// Stage 5a: predict a new data file and raise alerts for it.
    pub fn predict_new_data(
        &self,
        trained: &TrainedModel,
        new_data_path: &Path,
    ) -> Result<(Vec<ClassLabel>, AlertOutcome), PipelineError> {
        println!("🔮 Predicting new data from '{}'...", new_data_path.display());
        let new_rows = csv_loader::load_dataset(new_data_path, self.config.delimiter_byte())?;
        let predictions = predictor::predict(&trained.model, &trained.scaler, &new_rows)?;
        println!("✓ Predicted {} rows", predictions.len());

        let outcome = alert::alert(&predictions, &new_rows)?;
        Ok((predictions, outcome))
    }

    /// Stage 5b: with no new data, use the held-out partition as a stand-in
    /// and alert on its original rows.
    pub fn predict_held_out(&self, trained: &TrainedModel) -> Result<(Vec<ClassLabel>, AlertOutcome), PipelineError> {
        println!("🔮 Demonstration: predicting the held-out test partition...");
        let predictions = trained.model.predict(&trained.scaled_test)?;
        let original_rows = trained.loaded.dataset.subset(&trained.split.test);

        let outcome = alert::alert(&predictions, &original_rows)?;
        Ok((predictions, outcome))
    }

    /// Runs every stage.
    ///
    /// # Errors
    /// Any failure before or during evaluation. Prediction-phase failures
    /// are reported and returned inside `RunSummary::prediction` instead.
    pub fn run(&self, training_path: &Path, new_data_path: Option<&Path>) -> Result<RunSummary, PipelineError> {
        let loaded = self.load(training_path)?;
        let split = self.split(&loaded)?;
        let trained = self.train(loaded, split)?;
        let report = self.evaluate(&trained)?;

        let source = match new_data_path {
            Some(path) => PredictionSource::NewData(path.to_path_buf()),
            None => PredictionSource::HeldOutSplit,
        };

        let result = match &source {
            PredictionSource::NewData(path) => self.predict_new_data(&trained, path),
            PredictionSource::HeldOutSplit => self.predict_held_out(&trained),
        };

        let prediction = match result {
            Ok((predictions, outcome)) => {
                println!("\n{}", outcome);
                PredictionPhase::Completed { source, predictions, outcome }
            }
            Err(error) => {
                eprintln!("\n❌ Prediction phase aborted: {}\n", error);
                PredictionPhase::Aborted { source, error }
            }
        };

        Ok(RunSummary {
            finished_at: Utc::now(),
            training_path: training_path.to_path_buf(),
            dataset_rows: trained.loaded.dataset.len(),
            feature_columns: trained.loaded.feature_columns.clone(),
            train_size: trained.split.train.len(),
            test_size: trained.split.test.len(),
            test_class_counts: class_counts(&trained.test_labels),
            report,
            prediction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::fixtures::*;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).expect("fixture should be written");
        path
    }

    fn pipeline(k: usize) -> Pipeline {
        Pipeline::new(PipelineConfig {
            n_neighbors: k,
            test_ratio: 0.25,
            ..PipelineConfig::default()
        })
        .expect("config should be valid")
    }

    #[test]
    fn test_invalid_config_rejected_before_io() {
        let err = Pipeline::new(PipelineConfig { test_ratio: 1.2, ..PipelineConfig::default() });
        assert!(matches!(err, Err(PipelineError::InvalidParameter(_))));
    }

    #[test]
    fn test_run_on_held_out_split() {
        let dir = tempfile::tempdir().unwrap();
        let train = write(dir.path(), "train.csv", fixture_training_csv());

        let summary = pipeline(3).run(&train, None).expect("run should succeed");

        // ceil(0.25 * 12) = 3 test rows, one per class
        assert_eq!(summary.test_size, 3);
        assert_eq!(summary.train_size, 9);
        assert_eq!(summary.test_class_counts, vec![(0, 1), (1, 1), (2, 1)]);
        assert_eq!(summary.report.accuracy, 1.0);

        match &summary.prediction {
            PredictionPhase::Completed { source, predictions, outcome } => {
                assert_eq!(*source, PredictionSource::HeldOutSplit);
                assert_eq!(predictions.len(), 3);
                assert_eq!(outcome.flagged_positions().len(), 1);
            }
            other => panic!("expected completed prediction, got {:?}", other),
        }
    }

    #[test]
    fn test_held_out_alert_uses_original_rows() {
        let dir = tempfile::tempdir().unwrap();
        let train = write(dir.path(), "train.csv", fixture_training_csv());
        let p = pipeline(3);

        let loaded = p.load(&train).unwrap();
        let split = p.split(&loaded).unwrap();
        let trained = p.train(loaded, split).unwrap();
        let (_, outcome) = p.predict_held_out(&trained).unwrap();

        let AlertOutcome::HighRisk(report) = outcome else {
            panic!("the high-risk test row should raise an alert");
        };
        let test_position = report.records[0].position;
        let original_index = trained.split.test[test_position];
        assert_eq!(report.records[0].values, trained.loaded.dataset.rows[original_index]);
        // Unscaled: the target column is still there with its raw value
        assert_eq!(report.records[0].values.last().map(String::as_str), Some("2"));
    }

    #[test]
    fn test_missing_training_file_aborts() {
        let err = pipeline(3).run(Path::new("nope/train.csv"), None).unwrap_err();
        assert!(matches!(err, PipelineError::ResourceNotFound { .. }));
    }

    #[test]
    fn test_missing_target_aborts_before_training() {
        let dir = tempfile::tempdir().unwrap();
        let train = write(dir.path(), "train.csv", fixture_no_target_csv());
        let err = pipeline(3).run(&train, None).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_k_larger_than_training_partition_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let train = write(dir.path(), "train.csv", fixture_training_csv());
        let err = pipeline(50).run(&train, None).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParameter(_)));
    }

    #[test]
    fn test_new_data_predicted_and_alerted() {
        let dir = tempfile::tempdir().unwrap();
        let train = write(dir.path(), "train.csv", fixture_training_csv());
        let new = write(dir.path(), "new.csv", fixture_new_data_extra_columns_csv());

        let summary = pipeline(3).run(&train, Some(&new)).unwrap();
        assert!(summary.completed());

        let outcome = summary.prediction.alert_outcome().expect("alert should have run");
        assert_eq!(outcome.flagged_positions(), vec![0]);
        let AlertOutcome::HighRisk(report) = outcome else { unreachable!() };
        assert_eq!(report.records[0].values[0], "riverside");
    }

    #[test]
    fn test_new_data_schema_mismatch_aborts_only_prediction() {
        let dir = tempfile::tempdir().unwrap();
        let train = write(dir.path(), "train.csv", fixture_training_csv());
        let new = write(dir.path(), "new.csv", fixture_new_data_missing_column_csv());

        let summary = pipeline(3).run(&train, Some(&new)).expect("training phase should succeed");
        assert!(!summary.completed());
        assert!(summary.prediction.alert_outcome().is_none());
        assert!(matches!(
            summary.prediction.error(),
            Some(PipelineError::SchemaMismatch { .. })
        ));
        assert_eq!(summary.report.confusion_matrix.total(), summary.test_size);
    }

    #[test]
    fn test_missing_new_data_file_aborts_only_prediction() {
        let dir = tempfile::tempdir().unwrap();
        let train = write(dir.path(), "train.csv", fixture_training_csv());

        let summary = pipeline(3)
            .run(&train, Some(&dir.path().join("absent.csv")))
            .expect("training phase should succeed");
        assert!(matches!(
            summary.prediction.error(),
            Some(PipelineError::ResourceNotFound { .. })
        ));
    }

    #[test]
    fn test_json_summary_shape() {
        let dir = tempfile::tempdir().unwrap();
        let train = write(dir.path(), "train.csv", fixture_training_csv());
        let new = write(dir.path(), "new.csv", fixture_new_data_missing_column_csv());

        let summary = pipeline(3).run(&train, Some(&new)).unwrap();
        let json = summary.to_json();
        assert_eq!(json["train_size"], 9);
        assert_eq!(json["prediction"]["status"], "aborted");
        assert_eq!(json["prediction"]["error_kind"], "schema_mismatch");
        assert!(json["evaluation"]["accuracy"].is_number());
        assert_eq!(json["test_class_counts"]["2"], 1);
    }
}
