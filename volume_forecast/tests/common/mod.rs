use std::cell::RefCell;
use volume_forecast::error::{ForecastError, Result};
use volume_forecast::{Completion, LanguageModel, Prompt};

/// In-memory language model that answers with a fixed reply and records requests
#[derive(Debug, Default)]
pub struct ScriptedModel {
    pub reply: Option<String>,
    pub embedding: Vec<f64>,
    pub failure: Option<String>,
    pub prompts: RefCell<Vec<Prompt>>,
    pub embed_inputs: RefCell<Vec<String>>,
}

impl ScriptedModel {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn embedding(vector: Vec<f64>) -> Self {
        Self {
            embedding: vector,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }
}

impl LanguageModel for ScriptedModel {
    fn complete(&self, prompt: &Prompt) -> Result<Completion> {
        self.prompts.borrow_mut().push(prompt.clone());
        if let Some(message) = &self.failure {
            return Err(ForecastError::ExternalService(message.clone()));
        }
        Ok(Completion::from_text(self.reply.clone().unwrap_or_default()))
    }

    fn embed(&self, input: &str) -> Result<Vec<f64>> {
        self.embed_inputs.borrow_mut().push(input.to_string());
        if let Some(message) = &self.failure {
            return Err(ForecastError::ExternalService(message.clone()));
        }
        Ok(self.embedding.clone())
    }
}
