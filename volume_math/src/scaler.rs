//! Quantile-based normalization of volume sequences
//!
//! Values are divided by an upper quantile of a reference sample so that the
//! bulk of a sequence lands in `[0, 1]` and renders with few characters.

use crate::{MathError, Result};

/// Lower bound for the fitted reference value.
pub const REFERENCE_FLOOR: f64 = 0.1;

/// Default quantile used as the reference value
pub const DEFAULT_UPPER_QUANT: f64 = 0.95;

/// Scales a sequence by the clipped upper quantile of a reference sample
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileScaler {
    upper_quant: f64,
    reference_value: Option<f64>,
}

impl Default for QuantileScaler {
    fn default() -> Self {
        Self {
            upper_quant: DEFAULT_UPPER_QUANT,
            reference_value: None,
        }
    }
}

impl QuantileScaler {
    /// Create an unfitted scaler for the given quantile
    pub fn new(upper_quant: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&upper_quant) {
            return Err(MathError::InvalidInput(format!(
                "Quantile must be between 0 and 1, got {}",
                upper_quant
            )));
        }

        Ok(Self {
            upper_quant,
            reference_value: None,
        })
    }

    /// Create a scaler that is already fitted to `reference_value`.
    ///
    /// The floor still applies, so values below 0.1 are raised to 0.1.
    pub fn with_reference_value(upper_quant: f64, reference_value: f64) -> Result<Self> {
        if reference_value.is_nan() {
            return Err(MathError::InvalidInput(
                "Reference value cannot be NaN".to_string(),
            ));
        }

        let mut scaler = Self::new(upper_quant)?;
        scaler.reference_value = Some(reference_value.max(REFERENCE_FLOOR));
        Ok(scaler)
    }

    /// The configured quantile
    pub fn upper_quant(&self) -> f64 {
        self.upper_quant
    }

    /// The fitted reference value, `None` before the first fit
    pub fn reference_value(&self) -> Option<f64> {
        self.reference_value
    }

    /// Whether `fit` has been called successfully at least once
    pub fn is_fitted(&self) -> bool {
        self.reference_value.is_some()
    }

    /// Fit the scaler to a reference sample, replacing any previous state
    pub fn fit(&mut self, sample: &[f64]) -> Result<()> {
        let q = quantile(sample, self.upper_quant)?;
        self.reference_value = Some(q.max(REFERENCE_FLOOR));
        Ok(())
    }

    /// Divide every value by the reference value
    pub fn transform(&self, values: &[f64]) -> Result<Vec<f64>> {
        let reference = self.reference_value.ok_or(MathError::UnfittedState)?;
        Ok(values.iter().map(|v| v / reference).collect())
    }

    /// Multiply every value by the reference value
    pub fn inverse_transform(&self, values: &[f64]) -> Result<Vec<f64>> {
        let reference = self.reference_value.ok_or(MathError::UnfittedState)?;
        Ok(values.iter().map(|v| v * reference).collect())
    }

    /// Fit on `sample` and return it transformed
    pub fn fit_transform(&mut self, sample: &[f64]) -> Result<Vec<f64>> {
        self.fit(sample)?;
        self.transform(sample)
    }
}

/// Quantile with linear interpolation between the two closest ranks.
pub fn quantile(sample: &[f64], q: f64) -> Result<f64> {
    if sample.is_empty() {
        return Err(MathError::InvalidInput(
            "Cannot compute a quantile of an empty sample".to_string(),
        ));
    }
    if sample.iter().any(|v| v.is_nan()) {
        return Err(MathError::InvalidInput(
            "Sample contains NaN values".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&q) {
        return Err(MathError::InvalidInput(format!(
            "Quantile must be between 0 and 1, got {}",
            q
        )));
    }

    let mut sorted = sample.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let h = (sorted.len() - 1) as f64 * q;
    let lower = h.floor() as usize;
    let upper = h.ceil() as usize;
    let weight = h - lower as f64;

    if lower == upper {
        return Ok(sorted[lower]);
    }

    Ok(sorted[lower] + weight * (sorted[upper] - sorted[lower]))
}
