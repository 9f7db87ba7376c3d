//! Configuration for the forecasting pipelines
//!
//! Loaded from TOML; every section falls back to its defaults when missing.
//!
//! ```toml
//! [codec]
//! dec_sep = " "
//! num_sep = ","
//!
//! [scaler]
//! enabled = true
//! upper_quant = 0.95
//!
//! [prediction]
//! predict_frame = 10
//!
//! [service]
//! base_url = "https://api.openai.com/v1"
//! api_key_env = "OPENAI_API_KEY"
//! completion_model = "gpt-3.5-turbo"
//! embedding_model = "text-embedding-ada-002"
//! timeout_secs = 60
//! ```

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use volume_math::codec::{DEFAULT_DEC_SEP, DEFAULT_NUM_SEP};
use volume_math::scaler::DEFAULT_UPPER_QUANT;
use volume_math::{QuantileScaler, SequenceCodec};

/// Trait for configuration sections
pub trait ConfigSection: Serialize + for<'de> Deserialize<'de> + Default + Clone {
    fn section_name() -> &'static str;
    fn validate(&self) -> Result<()>;
}

/// Separators used by the sequence codec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub dec_sep: String,
    pub num_sep: String,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            dec_sep: DEFAULT_DEC_SEP.to_string(),
            num_sep: DEFAULT_NUM_SEP.to_string(),
        }
    }
}

impl CodecConfig {
    /// Build the codec described by this section
    pub fn build(&self) -> Result<SequenceCodec> {
        Ok(SequenceCodec::new(&self.dec_sep, &self.num_sep)?)
    }
}

impl ConfigSection for CodecConfig {
    fn section_name() -> &'static str {
        "codec"
    }

    fn validate(&self) -> Result<()> {
        self.build()
            .map(|_| ())
            .map_err(|e| ForecastError::ConfigError(format!("[{}] {}", Self::section_name(), e)))
    }
}

/// Normalization applied before encoding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalerConfig {
    pub enabled: bool,
    pub upper_quant: f64,
}

impl Default for ScalerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            upper_quant: DEFAULT_UPPER_QUANT,
        }
    }
}

impl ScalerConfig {
    /// Build the scaler, or `None` when scaling is disabled
    pub fn build(&self) -> Result<Option<QuantileScaler>> {
        if !self.enabled {
            return Ok(None);
        }
        Ok(Some(QuantileScaler::new(self.upper_quant)?))
    }
}

impl ConfigSection for ScalerConfig {
    fn section_name() -> &'static str {
        "scaler"
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.upper_quant) {
            return Err(ForecastError::ConfigError(format!(
                "[{}] upper_quant must be between 0 and 1, got {}",
                Self::section_name(),
                self.upper_quant
            )));
        }
        Ok(())
    }
}

/// Forecast horizon settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionConfig {
    pub predict_frame: usize,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self { predict_frame: 10 }
    }
}

impl ConfigSection for PredictionConfig {
    fn section_name() -> &'static str {
        "prediction"
    }

    fn validate(&self) -> Result<()> {
        if self.predict_frame == 0 {
            return Err(ForecastError::ConfigError(format!(
                "[{}] predict_frame must be at least 1",
                Self::section_name()
            )));
        }
        Ok(())
    }
}

/// Connection settings for the external language-model service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub completion_model: String,
    pub embedding_model: String,
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            completion_model: "gpt-3.5-turbo".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            timeout_secs: 60,
        }
    }
}

impl ConfigSection for ServiceConfig {
    fn section_name() -> &'static str {
        "service"
    }

    fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ForecastError::ConfigError(format!(
                "[{}] base_url must be an http(s) URL, got {:?}",
                Self::section_name(),
                self.base_url
            )));
        }
        for (field, value) in [
            ("api_key_env", &self.api_key_env),
            ("completion_model", &self.completion_model),
            ("embedding_model", &self.embedding_model),
        ] {
            if value.trim().is_empty() {
                return Err(ForecastError::ConfigError(format!(
                    "[{}] {} cannot be empty",
                    Self::section_name(),
                    field
                )));
            }
        }
        if self.timeout_secs == 0 {
            return Err(ForecastError::ConfigError(format!(
                "[{}] timeout_secs must be at least 1",
                Self::section_name()
            )));
        }
        Ok(())
    }
}

/// Full application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub codec: CodecConfig,
    pub scaler: ScalerConfig,
    pub prediction: PredictionConfig,
    pub service: ServiceConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.codec.validate()?;
        self.scaler.validate()?;
        self.prediction.validate()?;
        self.service.validate()?;
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)
            .map_err(|e| ForecastError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ForecastError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        log::debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&contents)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| ForecastError::ConfigError(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| ForecastError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }
}
