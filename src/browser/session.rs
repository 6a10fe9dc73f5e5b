use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::agent::error::AgentError;
use crate::browser::driver::{BrowserDriver, PageCapture};
use crate::command::command_model::ScrollDirection;
use crate::snapshot::snapshot_model::Snapshot;
use crate::snapshot::viewport::ViewportMetrics;

pub const DEFAULT_SERVER_SCRIPT: &str = "node/browser_server.js";

/// Request sent to browser_server.js over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BrowserRequest {
    Navigate {
        cmd: &'static str,
        url: String,
    },
    Snapshot {
        cmd: &'static str,
    },
    CurrentUrl {
        cmd: &'static str,
    },
    Click {
        cmd: &'static str,
        x: i64,
        y: i64,
    },
    Type {
        cmd: &'static str,
        text: String,
    },
    Press {
        cmd: &'static str,
        key: &'static str,
    },
    Scroll {
        cmd: &'static str,
        direction: ScrollDirection,
    },
    Quit {
        cmd: &'static str,
    },
}

impl BrowserRequest {
    pub fn navigate(url: &str) -> Self {
        BrowserRequest::Navigate {
            cmd: "navigate",
            url: url.to_string(),
        }
    }

    pub fn snapshot() -> Self {
        BrowserRequest::Snapshot { cmd: "snapshot" }
    }

    pub fn current_url() -> Self {
        BrowserRequest::CurrentUrl { cmd: "current_url" }
    }

    pub fn click(x: i64, y: i64) -> Self {
        BrowserRequest::Click { cmd: "click", x, y }
    }

    pub fn type_text(text: &str) -> Self {
        BrowserRequest::Type {
            cmd: "type",
            text: text.to_string(),
        }
    }

    pub fn press_enter() -> Self {
        BrowserRequest::Press {
            cmd: "press",
            key: "Enter",
        }
    }

    pub fn scroll(direction: ScrollDirection) -> Self {
        BrowserRequest::Scroll {
            cmd: "scroll",
            direction,
        }
    }

    pub fn quit() -> Self {
        BrowserRequest::Quit { cmd: "quit" }
    }
}

/// Response received from browser_server.js over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    /// Raw DOMSnapshot capture.
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub metrics: Option<ViewportMetrics>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
}

/// A persistent browser session backed by browser_server.js.
///
/// Launches a long-lived Node.js process that keeps a Chromium page open.
/// Commands are sent as NDJSON over stdin, responses read from stdout.
pub struct BrowserSession {
    child: Child,
    stdin: std::process::ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
    closed: bool,
}

impl BrowserSession {
    /// Launch a new browser session by spawning the helper script.
    pub fn launch(script: &str) -> Result<Self, AgentError> {
        info!(script, "launching browser helper");

        let mut child = Command::new("node")
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| AgentError::SubprocessSpawn {
                script: script.into(),
                source: e,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            AgentError::SessionIO(format!("Failed to capture stdin of {}", script))
        })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            AgentError::SessionIO(format!("Failed to capture stdout of {}", script))
        })?;

        let mut reader = BufReader::new(stdout);

        // Wait for the ready signal
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| AgentError::SessionIO(format!("Failed to read ready signal: {}", e)))?;

        let response: BrowserResponse =
            serde_json::from_str(line.trim()).map_err(|e| AgentError::JsonParse {
                context: "browser helper ready signal".into(),
                source: e,
            })?;

        if !response.ok || response.ready != Some(true) {
            return Err(AgentError::SessionProtocol {
                command: "launch".into(),
                error: "Did not receive ready signal from browser helper".into(),
            });
        }

        Ok(BrowserSession {
            child,
            stdin,
            reader,
            closed: false,
        })
    }

    /// Send a request and read the response.
    fn send(&mut self, request: &BrowserRequest) -> Result<BrowserResponse, AgentError> {
        let json = serde_json::to_string(request).map_err(|e| AgentError::JsonSerialize {
            context: "BrowserRequest".into(),
            source: e,
        })?;
        debug!(request = %json, "browser request");

        writeln!(self.stdin, "{}", json).map_err(|e| {
            AgentError::SessionIO(format!("Failed to write to browser helper stdin: {}", e))
        })?;

        self.stdin.flush().map_err(|e| {
            AgentError::SessionIO(format!("Failed to flush browser helper stdin: {}", e))
        })?;

        let mut line = String::new();
        self.reader.read_line(&mut line).map_err(|e| {
            AgentError::SessionIO(format!("Failed to read from browser helper stdout: {}", e))
        })?;

        if line.trim().is_empty() {
            return Err(AgentError::SessionIO(
                "Empty response from browser helper (process may have died)".into(),
            ));
        }

        serde_json::from_str(line.trim()).map_err(|e| AgentError::JsonParse {
            context: "browser helper response".into(),
            source: e,
        })
    }

    /// Send a request and verify it succeeded.
    fn send_ok(
        &mut self,
        request: &BrowserRequest,
        command_name: &str,
    ) -> Result<BrowserResponse, AgentError> {
        let response = self.send(request)?;
        if !response.ok {
            return Err(AgentError::SessionProtocol {
                command: command_name.into(),
                error: response.error.unwrap_or_else(|| "Unknown error".into()),
            });
        }
        Ok(response)
    }

    /// Quit the browser session. Safe to call more than once.
    pub fn quit(&mut self) -> Result<(), AgentError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        info!("closing browser helper");
        // Best-effort quit; the process may already be gone
        let _ = self.send(&BrowserRequest::quit());
        let _ = self.child.wait();
        Ok(())
    }
}

impl BrowserDriver for BrowserSession {
    fn navigate(&mut self, url: &str) -> Result<(), AgentError> {
        info!(url, "navigating");
        self.send_ok(&BrowserRequest::navigate(url), "navigate")?;
        Ok(())
    }

    fn capture(&mut self) -> Result<PageCapture, AgentError> {
        let response = self.send_ok(&BrowserRequest::snapshot(), "snapshot")?;

        let data = response.data.ok_or_else(|| AgentError::SessionProtocol {
            command: "snapshot".into(),
            error: "No data in snapshot response".into(),
        })?;
        let metrics = response.metrics.ok_or_else(|| AgentError::SessionProtocol {
            command: "snapshot".into(),
            error: "No metrics in snapshot response".into(),
        })?;

        Ok(PageCapture {
            snapshot: Snapshot::from_json(data)?,
            metrics,
        })
    }

    fn current_url(&mut self) -> Result<String, AgentError> {
        let response = self.send_ok(&BrowserRequest::current_url(), "current_url")?;
        response.url.ok_or_else(|| AgentError::SessionProtocol {
            command: "current_url".into(),
            error: "No URL in current_url response".into(),
        })
    }

    fn click_at(&mut self, x: i64, y: i64) -> Result<(), AgentError> {
        self.send_ok(&BrowserRequest::click(x, y), "click")?;
        Ok(())
    }

    fn type_text(&mut self, text: &str) -> Result<(), AgentError> {
        self.send_ok(&BrowserRequest::type_text(text), "type")?;
        Ok(())
    }

    fn press_enter(&mut self) -> Result<(), AgentError> {
        self.send_ok(&BrowserRequest::press_enter(), "press")?;
        Ok(())
    }

    fn scroll(&mut self, direction: ScrollDirection) -> Result<(), AgentError> {
        self.send_ok(&BrowserRequest::scroll(direction), "scroll")?;
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let _ = self.quit();
    }
}
