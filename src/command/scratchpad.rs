use serde::{Deserialize, Serialize};

/// Notes saved by the agent over a whole session. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scratchpad {
    texts: Vec<String>,
    links: Vec<String>,
}

impl Scratchpad {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_text(&mut self, text: impl Into<String>) {
        self.texts.push(text.into());
    }

    pub fn save_link(&mut self, link: impl Into<String>) {
        self.links.push(link.into());
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn links(&self) -> &[String] {
        &self.links
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty() && self.links.is_empty()
    }

    /// Human-readable listing for the end-of-session summary.
    pub fn summary(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("Saved text ({}):\n", self.texts.len()));
        for text in &self.texts {
            out.push_str(&format!("  - {}\n", text));
        }

        out.push_str(&format!("Saved links ({}):\n", self.links.len()));
        for link in &self.links {
            out.push_str(&format!("  - {}\n", link));
        }

        out
    }
}
