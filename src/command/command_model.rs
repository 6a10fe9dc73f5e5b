use std::fmt;

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
}

/// One parsed instruction from the decision maker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    Scroll { direction: ScrollDirection },
    Click { id: usize },
    TypeSubmit { id: usize, text: String },
    SaveText { id: usize, text: String },
    SaveLink { id: usize, text: String },
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Scroll {
                direction: ScrollDirection::Up,
            } => write!(f, "SCROLL UP"),
            Command::Scroll {
                direction: ScrollDirection::Down,
            } => write!(f, "SCROLL DOWN"),
            Command::Click { id } => write!(f, "CLICK {}", id),
            Command::TypeSubmit { id, text } => write!(f, "TYPESUBMIT {} \"{}\"", id, text),
            Command::SaveText { id, text } => write!(f, "SAVE TEXT {} \"{}\"", id, text),
            Command::SaveLink { id, text } => write!(f, "SAVE LINK {} \"{}\"", id, text),
        }
    }
}

/// Why a line of text is not a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command keyword '{0}'")]
    UnknownKeyword(String),

    #[error("{command} is missing its {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("'{0}' is not a valid element id")]
    InvalidId(String),

    #[error("'{0}' is not a scroll direction (expected UP or DOWN)")]
    InvalidDirection(String),

    #[error("quoted text is not terminated")]
    UnterminatedQuote,

    #[error("unexpected trailing input '{0}'")]
    TrailingInput(String),
}

/// Result of dispatching a command against the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Scrolled { direction: ScrollDirection },
    Clicked { id: usize },
    Submitted { id: usize },
    SavedText,
    SavedLink,
    /// The id does not exist in this cycle's buffer; nothing was sent to the browser.
    ElementNotFound { id: usize },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Outcome::ElementNotFound { .. })
    }

    /// Whether the browser was touched.
    pub fn acted_on_browser(&self) -> bool {
        matches!(
            self,
            Outcome::Scrolled { .. } | Outcome::Clicked { .. } | Outcome::Submitted { .. }
        )
    }
}
