//! Prompt construction for completion requests

use serde::Serialize;
use volume_math::SequenceCodec;

/// A system instruction plus the user message sent to the completion service
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Build the prediction prompt for an already encoded history
    pub fn for_prediction(encoded_history: &str, predict_frame: usize, codec: &SequenceCodec) -> Self {
        let system = format!(
            "You predict sales volumes. The user will provide a sequence of historic sales \
             volumes and you will predict the remaining sequence. The decimal values of the \
             volumes are separated by {} and the different volumina are separated by {}.",
            describe_separator(codec.dec_sep()),
            describe_separator(codec.num_sep()),
        );

        let num_sep = describe_separator(codec.num_sep());
        let user = format!(
            "Please continue the following sequence for {} values without producing any \
             additional text. Do not say anything like 'the next terms in the sequence are', \
             just return the numbers split by {}. Sequence:\n{}",
            predict_frame, num_sep, encoded_history
        );

        Self { system, user }
    }
}

/// Name a separator in words for the instruction text
fn describe_separator(sep: &str) -> String {
    match sep {
        "" => "nothing".to_string(),
        " " => "spaces".to_string(),
        "," => "commas".to_string(),
        ";" => "semicolons".to_string(),
        "|" => "vertical bars".to_string(),
        "\t" => "tabs".to_string(),
        other => format!("'{}'", other),
    }
}
