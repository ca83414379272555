/// Delimited tabular file loader.
///
/// Reads a header row plus records into a `Dataset`, then (for training
/// data) separates the target column from the feature columns and parses
/// both into numeric form.
///
/// Failure modes are kept distinct so the operator can tell a wrong path
/// from a broken file from a file with the wrong columns:
///   - file absent                  → `PipelineError::ResourceNotFound`
///   - unreadable / ragged / bad cell → `PipelineError::ParseFailure`
///   - target column absent         → `PipelineError::SchemaMismatch`

use csv::{ReaderBuilder, Trim};
use ndarray::Array2;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::model::{ClassLabel, Dataset, LoadedDataset, PipelineError};

// ---------------------------------------------------------------------------
// Raw reading
// ---------------------------------------------------------------------------

/// Reads delimited text from any reader. `origin` is only used in errors.
pub fn read_dataset<R: Read>(
    input: R,
    delimiter: u8,
    origin: &Path,
) -> Result<Dataset, PipelineError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| PipelineError::parse_failure(origin, e.to_string()))?
        .clone();

    let columns: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
        return Err(PipelineError::parse_failure(origin, "no header row found"));
    }

    let mut seen = HashSet::new();
    for name in &columns {
        if name.is_empty() {
            return Err(PipelineError::parse_failure(origin, "header contains an empty column name"));
        }
        if !seen.insert(name.as_str()) {
            return Err(PipelineError::parse_failure(
                origin,
                format!("duplicate column name '{}'", name),
            ));
        }
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        // Ragged rows surface here as csv UnequalLengths errors
        let record = result.map_err(|e| PipelineError::parse_failure(origin, e.to_string()))?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    Ok(Dataset::new(columns, rows).with_source(origin))
}

/// Loads any delimited file (training or new data).
///
/// # Errors
/// - `ResourceNotFound` - `path` does not exist.
/// - `ParseFailure` - the file cannot be opened or is not valid delimited data.
pub fn load_dataset(path: &Path, delimiter: u8) -> Result<Dataset, PipelineError> {
    if !path.exists() {
        return Err(PipelineError::ResourceNotFound { path: path.to_path_buf() });
    }

    let file = File::open(path).map_err(|e| PipelineError::parse_failure(path, e.to_string()))?;
    read_dataset(file, delimiter, path)
}

// ---------------------------------------------------------------------------
// Target / feature separation
// ---------------------------------------------------------------------------

/// Builds the numeric feature matrix from the named columns, in the order
/// given. Columns are looked up by name so extra columns are ignored.
pub fn feature_matrix(dataset: &Dataset, feature_columns: &[String]) -> Result<Array2<f64>, PipelineError> {
    let missing = dataset.missing_columns(feature_columns);
    if !missing.is_empty() {
        return Err(PipelineError::schema_mismatch(
            format!("'{}' lacks required feature columns", dataset.origin().display()),
            missing,
        ));
    }

    let indices: Vec<usize> = feature_columns
        .iter()
        .filter_map(|name| dataset.column_index(name))
        .collect();

    let mut values = Vec::with_capacity(dataset.len() * indices.len());
    for (row_idx, row) in dataset.rows.iter().enumerate() {
        for (&col_idx, name) in indices.iter().zip(feature_columns) {
            let cell = row[col_idx].as_str();
            let value = parse_numeric(cell).ok_or_else(|| {
                PipelineError::parse_failure(
                    dataset.origin(),
                    format!("row {}: column '{}' has non-numeric value '{}'", row_idx + 1, name, cell),
                )
            })?;
            values.push(value);
        }
    }

    Array2::from_shape_vec((dataset.len(), indices.len()), values)
        .map_err(|e| PipelineError::parse_failure(dataset.origin(), e.to_string()))
}

/// Parses the target column into class labels. Accepts `"2"` and `"2.0"`.
pub fn label_vector(dataset: &Dataset, target_column: &str) -> Result<Vec<ClassLabel>, PipelineError> {
    let target_idx = dataset.column_index(target_column).ok_or_else(|| {
        PipelineError::schema_mismatch(
            format!(
                "target column '{}' not found in '{}'",
                target_column,
                dataset.origin().display()
            ),
            vec![target_column.to_string()],
        )
    })?;

    dataset
        .rows
        .iter()
        .enumerate()
        .map(|(row_idx, row)| {
            let cell = row[target_idx].as_str();
            parse_label(cell).ok_or_else(|| {
                PipelineError::parse_failure(
                    dataset.origin(),
                    format!(
                        "row {}: target '{}' has non-integer class label '{}'",
                        row_idx + 1,
                        target_column,
                        cell
                    ),
                )
            })
        })
        .collect()
}

/// Separates a dataset into target labels and every remaining column as a
/// feature.
///
/// # Errors
/// - `SchemaMismatch` - `target_column` is absent, or no other column exists.
/// - `ParseFailure` - no data rows, a non-numeric feature cell, or a
///   non-integer label.
pub fn split_features(dataset: Dataset, target_column: &str) -> Result<LoadedDataset, PipelineError> {
    if dataset.column_index(target_column).is_none() {
        return Err(PipelineError::schema_mismatch(
            format!(
                "target column '{}' not found in '{}' (columns: {})",
                target_column,
                dataset.origin().display(),
                dataset.columns.join(", ")
            ),
            vec![target_column.to_string()],
        ));
    }

    let feature_columns: Vec<String> = dataset
        .columns
        .iter()
        .filter(|c| c.as_str() != target_column)
        .cloned()
        .collect();

    if feature_columns.is_empty() {
        return Err(PipelineError::schema_mismatch(
            format!("'{}' has no feature columns besides the target", dataset.origin().display()),
            Vec::new(),
        ));
    }

    if dataset.is_empty() {
        return Err(PipelineError::parse_failure(dataset.origin(), "file contains no data rows"));
    }

    let features = feature_matrix(&dataset, &feature_columns)?;
    let labels = label_vector(&dataset, target_column)?;

    Ok(LoadedDataset {
        dataset,
        target_column: target_column.to_string(),
        feature_columns,
        features,
        labels,
    })
}

/// Loads a training file and separates target from features.
pub fn load_training_dataset(
    path: &Path,
    target_column: &str,
    delimiter: u8,
) -> Result<LoadedDataset, PipelineError> {
    let dataset = load_dataset(path, delimiter)?;
    split_features(dataset, target_column)
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

fn parse_numeric(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_label(cell: &str) -> Option<ClassLabel> {
    let value = parse_numeric(cell)?;
    if value.fract() != 0.0 || value.abs() > i64::MAX as f64 {
        return None;
    }
    Some(value as ClassLabel)
}
