use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::agent::decider::{build_prompt, first_command_line, Decider, DecisionRequest};
use crate::agent::error::AgentError;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_MODEL: &str = "qwen2.5:1.5b";

/// Asks a local Ollama model for the next command.
pub struct OllamaDecider {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    /// Upper bound on generated tokens; a command is a single short line.
    pub max_tokens: u32,
    client: reqwest::blocking::Client,
}

impl Default for OllamaDecider {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT, DEFAULT_MODEL)
    }
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

impl OllamaDecider {
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            temperature: 0.5,
            max_tokens: 50,
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Decider for OllamaDecider {
    fn decide(&mut self, request: &DecisionRequest) -> Result<Option<String>, AgentError> {
        let body = OllamaRequest {
            model: &self.model,
            prompt: build_prompt(request),
            stream: false,
            options: OllamaOptions {
                temperature: self.temperature,
                num_predict: self.max_tokens,
            },
        };

        let response: OllamaResponse = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        debug!(reply = %response.response, "model reply");

        let command = first_command_line(&response.response);
        if command.is_none() {
            // Blank reply still counts as a (bad) command so the cycle goes on.
            warn!("model returned an empty reply");
            return Ok(Some(String::new()));
        }
        Ok(command)
    }
}
