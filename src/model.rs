/// Shared data types for the flood risk pipeline.
///
/// Everything that crosses a module boundary lives here: the raw `Dataset`
/// read from disk, the numeric view extracted from it (`LoadedDataset`),
/// class label constants, and the `PipelineError` taxonomy.

use ndarray::Array2;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Flood risk classes
// ---------------------------------------------------------------------------

/// Flood risk class label as stored in the target column.
pub type ClassLabel = i64;

pub const RISK_LOW: ClassLabel = 0;
pub const RISK_MEDIUM: ClassLabel = 1;
pub const RISK_HIGH: ClassLabel = 2;

/// Label that triggers a high-risk alert.
pub const HIGH_RISK_LABEL: ClassLabel = RISK_HIGH;

/// Default name of the target column in the sample data.
pub const DEFAULT_TARGET_COLUMN: &str = "risco_alagamento";

/// Human-readable name for a risk class.
pub fn risk_class_name(label: ClassLabel) -> &'static str {
    match label {
        RISK_LOW => "low",
        RISK_MEDIUM => "medium",
        RISK_HIGH => "high",
        _ => "unknown",
    }
}

// ---------------------------------------------------------------------------
// Dataset
// ---------------------------------------------------------------------------

/// Tabular data exactly as read from a delimited file.
///
/// Cells are kept as text so alert listings can show the original record
/// untouched. Every row has one cell per column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// File the data was read from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { columns, rows, source: None }
    }

    pub fn with_source(mut self, source: &Path) -> Self {
        self.source = Some(source.to_path_buf());
        self
    }

    /// Path used when reporting errors about this dataset.
    pub fn origin(&self) -> &Path {
        self.source.as_deref().unwrap_or(Path::new("<in-memory dataset>"))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns the names from `required` that this dataset does not have.
    pub fn missing_columns(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .cloned()
            .collect()
    }

    /// New dataset holding the rows at `indices`, in that order.
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
            source: self.source.clone(),
        }
    }

    /// Renders the rows at `positions` as an aligned text table, each line
    /// prefixed by the row position.
    pub fn render_rows(&self, positions: &[usize]) -> String {
        let rows: Vec<(usize, &[String])> = positions
            .iter()
            .filter_map(|&p| self.rows.get(p).map(|r| (p, r.as_slice())))
            .collect();
        render_table(&self.columns, &rows)
    }
}

/// Aligned text table with a leading index column. Used for the dataset
/// summary and for alert listings.
pub fn render_table(columns: &[String], rows: &[(usize, &[String])]) -> String {
    let index_width = rows
        .iter()
        .map(|(p, _)| p.to_string().len())
        .max()
        .unwrap_or(1);

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(col, name)| {
            rows.iter()
                .filter_map(|(_, r)| r.get(col))
                .map(|cell| cell.len())
                .chain(std::iter::once(name.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = " ".repeat(index_width);
    for (name, width) in columns.iter().zip(&widths) {
        out.push_str(&format!("  {:>width$}", name, width = *width));
    }
    out.push('\n');

    for (position, row) in rows {
        out.push_str(&format!("{:>width$}", position, width = index_width));
        for (cell, width) in row.iter().zip(&widths) {
            out.push_str(&format!("  {:>width$}", cell, width = *width));
        }
        out.push('\n');
    }

    out
}

/// A training dataset split into its numeric feature matrix and label vector.
///
/// `features` rows and `labels` are aligned 1:1 with `dataset.rows`, and
/// `features` columns follow `feature_columns`.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub target_column: String,
    pub feature_columns: Vec<String>,
    pub features: Array2<f64>,
    pub labels: Vec<ClassLabel>,
}

/// Sorted distinct labels with their counts.
pub fn class_counts(labels: &[ClassLabel]) -> Vec<(ClassLabel, usize)> {
    let mut counts: Vec<(ClassLabel, usize)> = Vec::new();
    for &label in labels {
        match counts.binary_search_by_key(&label, |(l, _)| *l) {
            Ok(i) => counts[i].1 += 1,
            Err(i) => counts.insert(i, (label, 1)),
        }
    }
    counts
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure conditions for every pipeline stage.
#[derive(Debug)]
pub enum PipelineError {
    /// Input file does not exist
    ResourceNotFound { path: PathBuf },
    /// File exists but is not valid delimited tabular data
    ParseFailure { path: PathBuf, detail: String },
    /// Expected target or feature columns are absent
    SchemaMismatch { context: String, missing: Vec<String> },
    /// Neighbour count, split ratio or similar is out of range
    InvalidParameter(String),
}

impl PipelineError {
    pub fn parse_failure(path: &Path, detail: impl Into<String>) -> Self {
        PipelineError::ParseFailure {
            path: path.to_path_buf(),
            detail: detail.into(),
        }
    }

    pub fn schema_mismatch(context: impl Into<String>, missing: Vec<String>) -> Self {
        PipelineError::SchemaMismatch {
            context: context.into(),
            missing,
        }
    }

    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::ResourceNotFound { .. } => "resource_not_found",
            PipelineError::ParseFailure { .. } => "parse_failure",
            PipelineError::SchemaMismatch { .. } => "schema_mismatch",
            PipelineError::InvalidParameter(_) => "invalid_parameter",
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::ResourceNotFound { path } => {
                write!(f, "File not found: '{}'\n\n", path.display())?;
                write!(f, "  Check the path, or create a sample dataset with:\n")?;
                write!(f, "  cargo run --bin generate_sample_data -- {}", path.display())
            }
            PipelineError::ParseFailure { path, detail } => {
                write!(f, "Failed to parse '{}' as delimited tabular data.\n\n", path.display())?;
                write!(f, "  Error: {}\n\n", detail)?;
                write!(f, "  Expected: a header row followed by one record per line,\n")?;
                write!(f, "  with numeric values in every feature column.")
            }
            PipelineError::SchemaMismatch { context, missing } => {
                write!(f, "Schema mismatch: {}", context)?;
                if !missing.is_empty() {
                    write!(f, "\n\n  Missing columns: {}", missing.join(", "))?;
                }
                Ok(())
            }
            PipelineError::InvalidParameter(msg) => {
                write!(f, "Invalid parameter: {}", msg)
            }
        }
    }
}

impl std::error::Error for PipelineError {}
