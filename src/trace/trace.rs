use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::command::command_model::Outcome;

/// One line of the per-cycle trace file.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub cycle: u64,

    pub url: Option<String>,
    pub page_fingerprint: Option<String>,
    pub element_count: usize,

    pub command: Option<String>,
    pub outcome: Option<Outcome>,
    pub error: Option<String>,
}

impl TraceEvent {
    pub fn now(cycle: u64) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            cycle,
            url: None,
            page_fingerprint: None,
            element_count: 0,
            command: None,
            outcome: None,
            error: None,
        }
    }

    pub fn with_page(mut self, url: &str, rendered: &str, element_count: usize) -> Self {
        self.url = Some(url.to_string());
        self.page_fingerprint = Some(page_fingerprint(rendered));
        self.element_count = element_count;
        self
    }

    pub fn with_command(mut self, command: impl ToString) -> Self {
        self.command = Some(command.to_string());
        self
    }

    pub fn with_outcome(mut self, outcome: &Outcome) -> Self {
        self.outcome = Some(outcome.clone());
        self
    }

    pub fn with_error(mut self, error: impl ToString) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

/// SHA-1 of the rendered element list; equal fingerprints mean the agent saw
/// the same page twice.
pub fn page_fingerprint(rendered: &str) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    hasher.update(rendered.as_bytes());
    format!("{:x}", hasher.finalize())
}
