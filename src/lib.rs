//! # Volume Oracle
//!
//! Sales-volume forecasting through an external language model. This crate
//! re-exports the workspace members:
//!
//! - [`math`]: quantile scaling and the spaced-digit sequence codec
//! - [`forecast`]: prompts, the service client and the prediction pipelines
//!
//! ## Example
//!
//! ```
//! use volume_oracle::math::SequenceCodec;
//!
//! let codec = SequenceCodec::default();
//! let encoded = codec.encode(&[12.0, 3.5]);
//! assert_eq!(encoded, "1 2 , 3 . 5");
//! assert_eq!(codec.decode(&encoded).unwrap(), vec![12.0, 3.5]);
//! ```

pub use volume_forecast as forecast;
pub use volume_math as math;

pub use volume_forecast::{
    AppConfig, Completion, ForecastError, ForecastResult, LanguageModel, LlmForecaster,
    OpenAiClient, Prompt,
};
pub use volume_math::{MathError, QuantileScaler, SequenceCodec};
