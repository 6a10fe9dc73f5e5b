use std::collections::VecDeque;
use std::io::{BufRead, Write};

use crate::agent::error::AgentError;

/// Everything the decision maker sees for one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionRequest {
    pub objective: String,
    pub url: String,
    pub previous_command: Option<String>,
    /// The rendered element list for the current page.
    pub browser_content: String,
}

/// Chooses the next command. `Ok(None)` ends the session.
pub trait Decider {
    fn decide(&mut self, request: &DecisionRequest) -> Result<Option<String>, AgentError>;
}

impl<D: Decider + ?Sized> Decider for Box<D> {
    fn decide(&mut self, request: &DecisionRequest) -> Result<Option<String>, AgentError> {
        (**self).decide(request)
    }
}

pub fn build_prompt(request: &DecisionRequest) -> String {
    format!(
        r#"You are an agent controlling a web browser. You see a simplified view of the
visible part of the current page, one element per line, and must issue exactly
one command that moves you closer to the objective.

Elements look like this:
<link id=1>About us</link>
<button id=2 aria-label="Search"/>
<input id=3 placeholder="Email"/>
<img id=4 alt="Logo"/>
<heading id=5>Pricing</heading>
<text id=6>Plans start at $10</text>

Commands:
SCROLL UP - scroll up one page
SCROLL DOWN - scroll down one page
CLICK X - click on the element with id X (links and buttons)
TYPESUBMIT X "TEXT" - type TEXT into the input with id X and press Enter
SAVE TEXT X "TEXT" - remember TEXT (taken from element X) for later
SAVE LINK X "URL" - remember URL (taken from element X) for later

Reply with the command only, on a single line.

OBJECTIVE: {objective}
CURRENT URL: {url}
PREVIOUS COMMAND: {previous}
CURRENT BROWSER CONTENT:
------------------
{content}
------------------
YOUR COMMAND:"#,
        objective = request.objective,
        url = request.url,
        previous = request.previous_command.as_deref().unwrap_or("(none)"),
        content = request.browser_content,
    )
}

/// First non-empty line of a reply, trimmed.
pub fn first_command_line(reply: &str) -> Option<String> {
    reply
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Scripted decider
// ============================================================================

/// Replays a fixed list of commands, one per cycle.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDecider {
    commands: VecDeque<String>,
    seen: Vec<DecisionRequest>,
}

impl ScriptedDecider {
    pub fn new<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedDecider {
            commands: commands.into_iter().map(Into::into).collect(),
            seen: Vec::new(),
        }
    }

    /// One command per non-empty line; lines starting with `#` are comments.
    pub fn from_script(script: &str) -> Self {
        Self::new(
            script
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> &[DecisionRequest] {
        &self.seen
    }
}

impl Decider for ScriptedDecider {
    fn decide(&mut self, request: &DecisionRequest) -> Result<Option<String>, AgentError> {
        self.seen.push(request.clone());
        Ok(self.commands.pop_front())
    }
}

// ============================================================================
// Operator-confirmed decider
// ============================================================================

/// Shows another decider's suggestion to a human, who accepts it with an
/// empty line or types a replacement. End of input stops the session.
pub struct OperatorDecider<D, R, W> {
    inner: D,
    input: R,
    output: W,
}

impl<D: Decider, R: BufRead, W: Write> OperatorDecider<D, R, W> {
    pub fn new(inner: D, input: R, output: W) -> Self {
        OperatorDecider {
            inner,
            input,
            output,
        }
    }
}

impl<D: Decider, R: BufRead, W: Write> Decider for OperatorDecider<D, R, W> {
    fn decide(&mut self, request: &DecisionRequest) -> Result<Option<String>, AgentError> {
        let suggestion = self.inner.decide(request)?;

        writeln!(self.output, "URL: {}", request.url).map_err(AgentError::OperatorIO)?;
        writeln!(self.output, "Objective: {}", request.objective).map_err(AgentError::OperatorIO)?;
        let asked = match &suggestion {
            Some(command) => write!(
                self.output,
                "Suggested command: {}\n(Enter to accept, or type a command) > ",
                command
            ),
            None => write!(self.output, "No suggestion. Type a command > "),
        };
        asked.map_err(AgentError::OperatorIO)?;
        self.output.flush().map_err(AgentError::OperatorIO)?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(AgentError::OperatorIO)?;
        if read == 0 {
            return Ok(None);
        }

        let typed = line.trim();
        if typed.is_empty() {
            Ok(suggestion)
        } else {
            Ok(Some(typed.to_string()))
        }
    }
}
