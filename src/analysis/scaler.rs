/// Feature standardization (zero mean, unit variance).
///
/// Statistics are learned from the training partition only and then
/// reused verbatim for the test partition and for any new data, so every
/// matrix handed to the classifier lives in the same scaled space.
///
/// Zero-variance columns: the effective scale is 1.0, so such a column is
/// only centered. On the training rows it becomes exactly 0.

use ndarray::{Array1, Array2, Axis};

use crate::model::PipelineError;

/// Learned per-feature statistics. Immutable once fit.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalerState {
    feature_columns: Vec<String>,
    means: Array1<f64>,
    std_devs: Array1<f64>,
    scales: Array1<f64>,
}

/// Fits a `ScalerState` on the training feature matrix.
pub struct StandardScaler;

impl StandardScaler {
    /// Computes per-column mean and population standard deviation.
    ///
    /// # Errors
    /// - `InvalidParameter` - the matrix has no rows.
    /// - `SchemaMismatch` - column count differs from `feature_columns`.
    pub fn fit(features: &Array2<f64>, feature_columns: &[String]) -> Result<ScalerState, PipelineError> {
        if features.nrows() == 0 {
            return Err(PipelineError::InvalidParameter(
                "cannot fit scaler on an empty feature matrix".to_string(),
            ));
        }
        if features.ncols() != feature_columns.len() {
            return Err(PipelineError::schema_mismatch(
                format!(
                    "feature matrix has {} columns but {} feature names were given",
                    features.ncols(),
                    feature_columns.len()
                ),
                Vec::new(),
            ));
        }

        let means = features
            .mean_axis(Axis(0))
            .ok_or_else(|| PipelineError::InvalidParameter("empty feature matrix".to_string()))?;
        let std_devs = features.std_axis(Axis(0), 0.0);

        let scales = std_devs
            .iter()
            .zip(means.iter())
            .map(|(&std, &mean)| if is_zero_variance(std, mean) { 1.0 } else { std })
            .collect::<Array1<f64>>();

        Ok(ScalerState {
            feature_columns: feature_columns.to_vec(),
            means,
            std_devs,
            scales,
        })
    }
}

// Relative tolerance keeps float noise in a constant column from being
// treated as real spread.
fn is_zero_variance(std: f64, mean: f64) -> bool {
    std <= 10.0 * f64::EPSILON * mean.abs().max(1.0)
}

impl ScalerState {
    /// Standardizes `features` with the stored statistics. Pure: the same
    /// input always yields the same output.
    ///
    /// # Errors
    /// - `SchemaMismatch` - column count differs from the fitted features.
    pub fn apply(&self, features: &Array2<f64>) -> Result<Array2<f64>, PipelineError> {
        if features.ncols() != self.means.len() {
            return Err(PipelineError::schema_mismatch(
                format!(
                    "scaler was fit on {} features but received {}",
                    self.means.len(),
                    features.ncols()
                ),
                Vec::new(),
            ));
        }

        let mut scaled = features.to_owned();
        for mut row in scaled.rows_mut() {
            row -= &self.means;
            row /= &self.scales;
        }
        Ok(scaled)
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    pub fn means(&self) -> &Array1<f64> {
        &self.means
    }

    /// Population standard deviations as measured (zero for constant columns).
    pub fn std_devs(&self) -> &Array1<f64> {
        &self.std_devs
    }

    /// Divisors actually applied (1.0 for constant columns).
    pub fn scales(&self) -> &Array1<f64> {
        &self.scales
    }

    /// Names of columns that were treated as zero-variance.
    pub fn constant_columns(&self) -> Vec<&str> {
        self.feature_columns
            .iter()
            .zip(self.std_devs.iter().zip(self.means.iter()))
            .filter(|(_, (std, mean))| is_zero_variance(**std, **mean))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}
