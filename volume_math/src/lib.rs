//! # Volume Math
//!
//! Numeric building blocks for turning sales-volume sequences into text a
//! language model can continue, and back again.
//!
//! - [`scaler::QuantileScaler`] keeps values in a stable range before encoding
//! - [`codec::SequenceCodec`] converts sequences to and from delimited strings

use thiserror::Error;

pub mod codec;
pub mod scaler;

pub use codec::SequenceCodec;
pub use scaler::QuantileScaler;

/// Errors raised while scaling or encoding volume sequences
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Scaler used before fit")]
    UnfittedState,

    #[error("Malformed number: {substring:?}")]
    MalformedNumber { substring: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for volume math operations
pub type Result<T> = std::result::Result<T, MathError>;
