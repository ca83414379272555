/// High flood risk alerting.
///
/// Predictions carry no row identity; position `i` in the prediction list
/// refers to row `i` of the dataset the predictions were made for. Every
/// position predicted as `HIGH_RISK_LABEL` contributes its original,
/// unscaled record to the alert.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::model::{ClassLabel, Dataset, HIGH_RISK_LABEL, PipelineError, render_table, risk_class_name};

/// One original record flagged as high risk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedRecord {
    /// Position in the dataset the predictions were made for
    pub position: usize,
    pub values: Vec<String>,
}

/// Records flagged as high risk, with enough context to act on them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertReport {
    pub label: ClassLabel,
    pub generated_at: DateTime<Utc>,
    pub columns: Vec<String>,
    pub records: Vec<FlaggedRecord>,
    /// Number of rows that were scanned
    pub scanned: usize,
}

/// Result of an alert scan. Both outcomes are reported to the operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AlertOutcome {
    HighRisk(AlertReport),
    NoRiskDetected { scanned: usize },
}

impl AlertOutcome {
    pub fn is_alert(&self) -> bool {
        matches!(self, AlertOutcome::HighRisk(_))
    }

    pub fn flagged_positions(&self) -> Vec<usize> {
        match self {
            AlertOutcome::HighRisk(report) => report.records.iter().map(|r| r.position).collect(),
            AlertOutcome::NoRiskDetected { .. } => Vec::new(),
        }
    }
}

/// Scans predictions and collects the original rows predicted high risk.
///
/// # Errors
/// `InvalidParameter` when the prediction count differs from the row count,
/// since positional alignment would be meaningless.
pub fn alert(predictions: &[ClassLabel], original_rows: &Dataset) -> Result<AlertOutcome, PipelineError> {
    if predictions.len() != original_rows.len() {
        return Err(PipelineError::InvalidParameter(format!(
            "{} predictions cannot be aligned with {} original rows",
            predictions.len(),
            original_rows.len()
        )));
    }

    let records: Vec<FlaggedRecord> = predictions
        .iter()
        .enumerate()
        .filter(|(_, label)| **label == HIGH_RISK_LABEL)
        .map(|(position, _)| FlaggedRecord {
            position,
            values: original_rows.rows[position].clone(),
        })
        .collect();

    if records.is_empty() {
        return Ok(AlertOutcome::NoRiskDetected { scanned: predictions.len() });
    }

    Ok(AlertOutcome::HighRisk(AlertReport {
        label: HIGH_RISK_LABEL,
        generated_at: Utc::now(),
        columns: original_rows.columns.clone(),
        records,
        scanned: predictions.len(),
    }))
}

impl fmt::Display for AlertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertOutcome::HighRisk(report) => {
                writeln!(f, "🚨 FLOOD RISK ALERT")?;
                writeln!(f, "{}", "=".repeat(50))?;
                writeln!(
                    f,
                    "{} of {} points predicted {} risk (class {}):",
                    report.records.len(),
                    report.scanned,
                    risk_class_name(report.label),
                    report.label
                )?;
                writeln!(f)?;

                let rows: Vec<(usize, &[String])> = report
                    .records
                    .iter()
                    .map(|r| (r.position, r.values.as_slice()))
                    .collect();
                write!(f, "{}", render_table(&report.columns, &rows))?;
                write!(f, "{}", "=".repeat(50))
            }
            AlertOutcome::NoRiskDetected { scanned } => {
                write!(f, "✓ No high flood risk detected in {} predicted points", scanned)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Dataset {
        Dataset::new(
            vec!["area".to_string(), "nivel_chuva_mm".to_string()],
            (0..n).map(|i| vec![format!("area-{}", i), format!("{}.0", 10 * i)]).collect(),
        )
    }

    #[test]
    fn test_single_high_risk_prediction_returns_exactly_that_row() {
        let predictions = [0, 1, 2, 0, 1];
        let outcome = alert(&predictions, &rows(5)).unwrap();

        match outcome {
            AlertOutcome::HighRisk(report) => {
                assert_eq!(report.records.len(), 1);
                assert_eq!(report.records[0].position, 2);
                assert_eq!(report.records[0].values, vec!["area-2", "20.0"]);
                assert_eq!(report.label, 2);
                assert_eq!(report.scanned, 5);
            }
            other => panic!("expected HighRisk, got {:?}", other),
        }
    }

    #[test]
    fn test_all_high_risk_positions_collected_in_order() {
        let outcome = alert(&[2, 0, 2, 2], &rows(4)).unwrap();
        assert!(outcome.is_alert());
        assert_eq!(outcome.flagged_positions(), vec![0, 2, 3]);
    }

    #[test]
    fn test_no_high_risk_is_explicit_outcome() {
        let outcome = alert(&[0, 1, 1], &rows(3)).unwrap();
        assert_eq!(outcome, AlertOutcome::NoRiskDetected { scanned: 3 });
        assert!(outcome.to_string().contains("No high flood risk"));
    }

    #[test]
    fn test_empty_predictions_report_no_risk() {
        let outcome = alert(&[], &rows(0)).unwrap();
        assert!(!outcome.is_alert());
    }

    #[test]
    fn test_length_mismatch_rejected() {
        assert!(matches!(
            alert(&[2, 2], &rows(3)),
            Err(PipelineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_alert_text_lists_original_positions() {
        let outcome = alert(&[0, 0, 0, 2], &rows(4)).unwrap();
        let text = outcome.to_string();
        assert!(text.contains("FLOOD RISK ALERT"));
        assert!(text.contains("area-3"));
        assert!(text.contains("30.0"));
        assert!(text.lines().any(|l| l.trim_start().starts_with("3 ")));
    }
}
