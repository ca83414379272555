/// K-Nearest-Neighbors flood risk classifier.
///
/// Training stores the scaled training matrix and its labels; prediction
/// finds, for each query row, the `k` closest training rows by Euclidean
/// distance and takes a majority vote over their labels.
///
/// Deterministic tie policy:
///   - equidistant neighbours are ranked by training row index (earlier wins)
///   - a tied vote goes to the lowest class label

use ndarray::{Array2, ArrayView1};
use std::cmp::Ordering;

use crate::model::{ClassLabel, PipelineError};

/// A trained classifier. Immutable after `train`.
#[derive(Debug, Clone)]
pub struct KnnClassifier {
    k: usize,
    x_train: Array2<f64>,
    y_train: Vec<ClassLabel>,
}

impl KnnClassifier {
    /// Fits the classifier on scaled training features and labels.
    ///
    /// # Errors
    /// - `InvalidParameter` - `k` is zero or exceeds the number of training
    ///   rows, or the row and label counts differ.
    pub fn train(
        scaled_features: &Array2<f64>,
        labels: &[ClassLabel],
        k: usize,
    ) -> Result<Self, PipelineError> {
        if scaled_features.nrows() != labels.len() {
            return Err(PipelineError::InvalidParameter(format!(
                "training matrix has {} rows but {} labels were given",
                scaled_features.nrows(),
                labels.len()
            )));
        }
        if k == 0 {
            return Err(PipelineError::InvalidParameter(
                "n_neighbors must be a positive integer, got 0".to_string(),
            ));
        }
        if k > labels.len() {
            return Err(PipelineError::InvalidParameter(format!(
                "n_neighbors = {} exceeds the {} available training samples",
                k,
                labels.len()
            )));
        }

        Ok(Self {
            k,
            x_train: scaled_features.clone(),
            y_train: labels.to_vec(),
        })
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn n_features(&self) -> usize {
        self.x_train.ncols()
    }

    pub fn n_samples(&self) -> usize {
        self.y_train.len()
    }

    /// Predicts one label per query row.
    ///
    /// # Errors
    /// - `SchemaMismatch` - query column count differs from training.
    pub fn predict(&self, scaled_features: &Array2<f64>) -> Result<Vec<ClassLabel>, PipelineError> {
        if scaled_features.ncols() != self.n_features() {
            return Err(PipelineError::schema_mismatch(
                format!(
                    "model was trained on {} features but received {}",
                    self.n_features(),
                    scaled_features.ncols()
                ),
                Vec::new(),
            ));
        }

        Ok(scaled_features
            .rows()
            .into_iter()
            .map(|query| self.predict_row(query))
            .collect())
    }

    /// Training row indices of the `k` nearest neighbours, closest first.
    pub fn neighbors(&self, query: ArrayView1<f64>) -> Vec<usize> {
        let mut distances: Vec<(usize, f64)> = self
            .x_train
            .rows()
            .into_iter()
            .enumerate()
            .map(|(i, train_row)| (i, euclidean_distance(query, train_row)))
            .collect();

        // Stable sort keeps training order among equal distances
        distances.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

        distances.into_iter().take(self.k).map(|(i, _)| i).collect()
    }

    fn predict_row(&self, query: ArrayView1<f64>) -> ClassLabel {
        let labels: Vec<ClassLabel> = self
            .neighbors(query)
            .into_iter()
            .map(|i| self.y_train[i])
            .collect();
        majority_vote(&labels)
    }
}

/// L2 distance between two rows of equal length.
pub fn euclidean_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Most frequent label; ties go to the lowest label.
fn majority_vote(labels: &[ClassLabel]) -> ClassLabel {
    let mut sorted = labels.to_vec();
    sorted.sort_unstable();

    let mut best = (sorted.first().copied().unwrap_or_default(), 0usize);
    let mut i = 0;
    while i < sorted.len() {
        let label = sorted[i];
        let run = sorted[i..].iter().take_while(|&&l| l == label).count();
        // Strictly greater: an equal count later in ascending order loses
        if run > best.1 {
            best = (label, run);
        }
        i += run;
    }
    best.0
}
