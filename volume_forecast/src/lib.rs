//! # Volume Forecast
//!
//! Sales-volume forecasting by delegating the prediction to an external
//! language-model service.
//!
//! ## Features
//!
//! - Quantile normalization and spaced-digit text encoding (via `volume_math`)
//! - Prompt construction and a blocking OpenAI-compatible client
//! - Prediction and embedding pipelines with a swappable [`LanguageModel`]
//! - Sales history selection from CSV and simulated seasonal data
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use volume_forecast::{AppConfig, LlmForecaster, OpenAiClient};
//!
//! let config = AppConfig::default();
//! let client = OpenAiClient::from_config(&config.service)?;
//! let mut forecaster = LlmForecaster::from_config(client, &config)?;
//!
//! let history = vec![3.0, 5.0, 8.0, 4.0, 6.0, 9.0, 5.0, 7.0];
//! let forecast = forecaster.predict(&history, 3)?;
//! println!("{:?}", forecast.values());
//! # Ok::<(), volume_forecast::ForecastError>(())
//! ```

pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod prompt;
pub mod simulation;

// Re-export commonly used types
pub use crate::client::{Completion, LanguageModel, OpenAiClient};
pub use crate::config::AppConfig;
pub use crate::data::{ColumnMapping, SalesData, SalesFilter, SeriesEmbeddings};
pub use crate::error::ForecastError;
pub use crate::pipeline::{ForecastResult, LlmForecaster};
pub use crate::prompt::Prompt;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
