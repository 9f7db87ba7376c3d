//! Text encoding of volume sequences
//!
//! A sequence `[12, 3.5]` with the default separators becomes
//! `"1 2 , 3 . 5"`: every character of the rendered list is spaced out by the
//! digit separator so each digit is its own token, and numbers are bounded by
//! the sequence separator.

use crate::{MathError, Result};

/// Default separator placed between the characters of a number
pub const DEFAULT_DEC_SEP: &str = " ";

/// Default separator placed between numbers
pub const DEFAULT_NUM_SEP: &str = ",";

/// Bidirectional conversion between volume sequences and encoded strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceCodec {
    dec_sep: String,
    num_sep: String,
}

impl Default for SequenceCodec {
    fn default() -> Self {
        Self {
            dec_sep: DEFAULT_DEC_SEP.to_string(),
            num_sep: DEFAULT_NUM_SEP.to_string(),
        }
    }
}

impl SequenceCodec {
    /// Create a codec with custom separators.
    ///
    /// `dec_sep` may be empty, which disables character spacing. `num_sep`
    /// must be non-empty. Neither may contain characters that appear in a
    /// rendered number, and `dec_sep` must not occur inside `num_sep`.
    pub fn new(dec_sep: &str, num_sep: &str) -> Result<Self> {
        if num_sep.is_empty() {
            return Err(MathError::InvalidInput(
                "Sequence separator cannot be empty".to_string(),
            ));
        }

        for (role, sep) in [("Digit", dec_sep), ("Sequence", num_sep)] {
            if sep.chars().any(is_numeric_char) {
                return Err(MathError::InvalidInput(format!(
                    "{} separator {:?} overlaps with numeric characters",
                    role, sep
                )));
            }
        }

        if !dec_sep.is_empty() && num_sep.contains(dec_sep) {
            return Err(MathError::InvalidInput(format!(
                "Digit separator {:?} cannot occur inside sequence separator {:?}",
                dec_sep, num_sep
            )));
        }

        Ok(Self {
            dec_sep: dec_sep.to_string(),
            num_sep: num_sep.to_string(),
        })
    }

    /// Separator between the characters of a number
    pub fn dec_sep(&self) -> &str {
        &self.dec_sep
    }

    /// Separator between consecutive numbers
    pub fn num_sep(&self) -> &str {
        &self.num_sep
    }

    /// Encode a sequence into a single spaced-out string
    pub fn encode(&self, values: &[f64]) -> String {
        let rendered = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(&self.num_sep);

        if self.dec_sep.is_empty() {
            return rendered;
        }

        let mut encoded = String::with_capacity(rendered.len() * (1 + self.dec_sep.len()));
        for (i, c) in rendered.chars().enumerate() {
            if i > 0 {
                encoded.push_str(&self.dec_sep);
            }
            encoded.push(c);
        }
        encoded
    }

    /// Decode an encoded string back into a sequence.
    ///
    /// Every substring between sequence separators must parse as a number;
    /// stray separators produce an empty substring and fail rather than
    /// silently shortening the result. `NaN`, `inf` and exponent forms parse
    /// like any other float literal, so callers that need finite values must
    /// check for them.
    pub fn decode(&self, text: &str) -> Result<Vec<f64>> {
        let compact = if self.dec_sep.is_empty() {
            text.to_string()
        } else {
            text.replace(&self.dec_sep, "")
        };

        if compact.trim().is_empty() {
            return Ok(Vec::new());
        }

        compact
            .split(self.num_sep.as_str())
            .map(|part| {
                let trimmed = part.trim();
                if trimmed.is_empty() {
                    return Err(MathError::MalformedNumber {
                        substring: part.to_string(),
                    });
                }
                trimmed
                    .parse::<f64>()
                    .map_err(|_| MathError::MalformedNumber {
                        substring: part.to_string(),
                    })
            })
            .collect()
    }
}

/// Characters that can appear in a rendered `f64` (including `inf` and `NaN`)
fn is_numeric_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')
}
