/// Model evaluation: confusion matrix and classification report.
///
/// Metric definitions follow the scikit-learn conventions so numbers can be
/// compared with notebooks run on the same data:
///   - labels are the sorted union of true and predicted labels
///   - confusion matrix rows are true classes, columns predicted classes
///   - precision / recall / F1 with zero division reported as 0.0
///   - macro average: unweighted mean over labels
///   - weighted average: mean weighted by true-class support

use ndarray::Array2;
use serde::Serialize;
use std::fmt;

use crate::analysis::knn::KnnClassifier;
use crate::model::{ClassLabel, PipelineError};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Square count matrix indexed by `labels`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfusionMatrix {
    pub labels: Vec<ClassLabel>,
    /// `counts[true_idx][predicted_idx]`
    pub counts: Vec<Vec<usize>>,
}

impl ConfusionMatrix {
    /// Number of rows whose true class is `labels[i]`.
    pub fn row_sums(&self) -> Vec<usize> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    /// Number of rows predicted as `labels[j]`.
    pub fn column_sums(&self) -> Vec<usize> {
        (0..self.labels.len())
            .map(|j| self.counts.iter().map(|row| row[j]).sum())
            .collect()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.labels.len()).map(|i| self.counts[i][i]).sum()
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .counts
            .iter()
            .flatten()
            .map(|c| c.to_string().len())
            .max()
            .unwrap_or(1);

        for (i, row) in self.counts.iter().enumerate() {
            let open = if i == 0 { "[[" } else { " [" };
            let cells: Vec<String> = row
                .iter()
                .map(|c| format!("{:>width$}", c, width = width))
                .collect();
            let close = if i + 1 == self.counts.len() { "]]" } else { "]" };
            write!(f, "{}{}{}", open, cells.join(" "), close)?;
            if i + 1 < self.counts.len() {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: ClassLabel,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Full evaluation of predictions against held-out labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub confusion_matrix: ConfusionMatrix,
    pub per_class: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
}

// ---------------------------------------------------------------------------
// Computation
// ---------------------------------------------------------------------------

/// Builds the confusion matrix over the sorted union of labels.
pub fn confusion_matrix(y_true: &[ClassLabel], y_pred: &[ClassLabel]) -> ConfusionMatrix {
    let mut labels: Vec<ClassLabel> = y_true.iter().chain(y_pred).copied().collect();
    labels.sort_unstable();
    labels.dedup();

    let mut counts = vec![vec![0usize; labels.len()]; labels.len()];
    for (t, p) in y_true.iter().zip(y_pred) {
        // Both are present in `labels` by construction
        if let (Ok(i), Ok(j)) = (labels.binary_search(t), labels.binary_search(p)) {
            counts[i][j] += 1;
        }
    }

    ConfusionMatrix { labels, counts }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Computes the full classification report.
///
/// # Errors
/// `InvalidParameter` when the slices differ in length or are empty.
pub fn classification_report(
    y_true: &[ClassLabel],
    y_pred: &[ClassLabel],
) -> Result<ClassificationReport, PipelineError> {
    if y_true.len() != y_pred.len() {
        return Err(PipelineError::InvalidParameter(format!(
            "{} true labels but {} predictions",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(PipelineError::InvalidParameter(
            "cannot evaluate on an empty test set".to_string(),
        ));
    }

    let matrix = confusion_matrix(y_true, y_pred);
    let row_sums = matrix.row_sums();
    let column_sums = matrix.column_sums();

    let per_class: Vec<ClassMetrics> = matrix
        .labels
        .iter()
        .enumerate()
        .map(|(i, &label)| {
            let tp = matrix.counts[i][i];
            let precision = ratio(tp, column_sums[i]);
            let recall = ratio(tp, row_sums[i]);
            ClassMetrics {
                label,
                precision,
                recall,
                f1_score: f1(precision, recall),
                support: row_sums[i],
            }
        })
        .collect();

    let total = y_true.len();
    let n_labels = per_class.len() as f64;

    let macro_avg = AverageMetrics {
        precision: per_class.iter().map(|m| m.precision).sum::<f64>() / n_labels,
        recall: per_class.iter().map(|m| m.recall).sum::<f64>() / n_labels,
        f1_score: per_class.iter().map(|m| m.f1_score).sum::<f64>() / n_labels,
        support: total,
    };

    let weighted = |metric: fn(&ClassMetrics) -> f64| {
        per_class
            .iter()
            .map(|m| metric(m) * m.support as f64)
            .sum::<f64>()
            / total as f64
    };
    let weighted_avg = AverageMetrics {
        precision: weighted(|m| m.precision),
        recall: weighted(|m| m.recall),
        f1_score: weighted(|m| m.f1_score),
        support: total,
    };

    let accuracy = ratio(matrix.correct(), total);

    Ok(ClassificationReport {
        confusion_matrix: matrix,
        per_class,
        accuracy,
        macro_avg,
        weighted_avg,
    })
}

/// Predicts the scaled test partition and scores it against `test_labels`.
pub fn evaluate(
    model: &KnnClassifier,
    scaled_test_features: &Array2<f64>,
    test_labels: &[ClassLabel],
) -> Result<ClassificationReport, PipelineError> {
    let predictions = model.predict(scaled_test_features)?;
    classification_report(test_labels, &predictions)
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name_width = 12;
        writeln!(
            f,
            "{:>nw$} {:>9} {:>9} {:>9} {:>9}",
            "",
            "precision",
            "recall",
            "f1-score",
            "support",
            nw = name_width
        )?;
        writeln!(f)?;

        for m in &self.per_class {
            writeln!(
                f,
                "{:>nw$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                m.label,
                m.precision,
                m.recall,
                m.f1_score,
                m.support,
                nw = name_width
            )?;
        }
        writeln!(f)?;

        writeln!(
            f,
            "{:>nw$} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy",
            "",
            "",
            self.accuracy,
            self.macro_avg.support,
            nw = name_width
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>nw$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name,
                avg.precision,
                avg.recall,
                avg.f1_score,
                avg.support,
                nw = name_width
            )?;
        }
        Ok(())
    }
}
