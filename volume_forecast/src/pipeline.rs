//! Prediction and embedding pipelines
//!
//! history -> scaler -> codec -> prompt -> service -> codec -> scaler -> forecast

use crate::client::{Completion, LanguageModel};
use crate::config::AppConfig;
use crate::error::{ForecastError, Result};
use crate::prompt::Prompt;
use volume_math::{QuantileScaler, SequenceCodec};

/// Forecast produced by one prediction call
#[derive(Debug, Clone)]
pub struct ForecastResult {
    /// Forecasted values, at most `requested_horizon` of them
    values: Vec<f64>,
    requested_horizon: usize,
    completion: Completion,
}

impl ForecastResult {
    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Consume the result and return the values
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Number of values that were asked for
    pub fn requested_horizon(&self) -> usize {
        self.requested_horizon
    }

    /// Whether the service delivered the full horizon
    pub fn is_complete(&self) -> bool {
        self.values.len() == self.requested_horizon
    }

    /// The unmodified service answer
    pub fn raw_response(&self) -> &Completion {
        &self.completion
    }

    /// Calculate mean absolute error between forecast and actual values
    pub fn mean_absolute_error(&self, actual: &[f64]) -> Result<f64> {
        if self.values.len() != actual.len() {
            return Err(ForecastError::DataError(format!(
                "Forecast length ({}) doesn't match actual length ({})",
                self.values.len(),
                actual.len()
            )));
        }
        if self.values.is_empty() {
            return Err(ForecastError::DataError(
                "Cannot score an empty forecast".to_string(),
            ));
        }

        let sum: f64 = self
            .values
            .iter()
            .zip(actual.iter())
            .map(|(f, a)| (f - a).abs())
            .sum();

        Ok(sum / self.values.len() as f64)
    }
}

/// Forecasts and embeds volume sequences through a language model.
///
/// The scaler is refit on every call, so normalization depends only on the
/// history passed to that call. Calls take `&mut self` because of that refit.
#[derive(Debug, Clone)]
pub struct LlmForecaster<M: LanguageModel> {
    model: M,
    codec: SequenceCodec,
    scaler: Option<QuantileScaler>,
}

impl<M: LanguageModel> LlmForecaster<M> {
    /// Forecaster with the default codec and no scaling
    pub fn new(model: M) -> Self {
        Self {
            model,
            codec: SequenceCodec::default(),
            scaler: None,
        }
    }

    /// Forecaster with codec and scaler taken from configuration
    pub fn from_config(model: M, config: &AppConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            model,
            codec: config.codec.build()?,
            scaler: config.scaler.build()?,
        })
    }

    pub fn with_scaler(mut self, scaler: QuantileScaler) -> Self {
        self.scaler = Some(scaler);
        self
    }

    pub fn with_codec(mut self, codec: SequenceCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn codec(&self) -> &SequenceCodec {
        &self.codec
    }

    pub fn scaler(&self) -> Option<&QuantileScaler> {
        self.scaler.as_ref()
    }

    /// Forecast the next `predict_frame` values after `history`.
    ///
    /// The service is not trusted to return exactly `predict_frame` values:
    /// extra values are dropped and a shortfall is returned as is.
    pub fn predict(&mut self, history: &[f64], predict_frame: usize) -> Result<ForecastResult> {
        if predict_frame == 0 {
            return Err(ForecastError::InvalidParameter(
                "predict_frame must be at least 1".to_string(),
            ));
        }

        let history = self.normalize(history)?;
        let encoded = self.codec.encode(&history);
        let prompt = Prompt::for_prediction(&encoded, predict_frame, &self.codec);

        log::debug!(
            "Requesting {} values for a history of {} ({} chars encoded)",
            predict_frame,
            history.len(),
            encoded.len()
        );
        let completion = self.model.complete(&prompt)?;
        log::debug!("Completion returned {} chars", completion.text.len());

        let mut forecast = self.codec.decode(&completion.text)?;
        if let Some(value) = forecast.iter().find(|v| !v.is_finite()) {
            return Err(ForecastError::MalformedNumber(value.to_string()));
        }
        if let Some(scaler) = &self.scaler {
            forecast = scaler.inverse_transform(&forecast)?;
        }

        if forecast.len() < predict_frame {
            log::warn!(
                "Service returned {} of {} requested values",
                forecast.len(),
                predict_frame
            );
        }
        forecast.truncate(predict_frame);

        Ok(ForecastResult {
            values: forecast,
            requested_horizon: predict_frame,
            completion,
        })
    }

    /// Embed `history` through the service's embedding endpoint
    pub fn embed(&mut self, history: &[f64]) -> Result<Vec<f64>> {
        let history = self.normalize(history)?;
        let input = self.codec.encode(&history).replace('\n', " ");

        log::debug!("Requesting embedding for {} chars", input.len());
        self.model.embed(&input)
    }

    /// Refit the scaler on `history` and scale it, if a scaler is configured
    fn normalize(&mut self, history: &[f64]) -> Result<Vec<f64>> {
        match self.scaler.as_mut() {
            Some(scaler) => Ok(scaler.fit_transform(history)?),
            None => Ok(history.to_vec()),
        }
    }
}
