use screen_crawler::agent::error::AgentError;
use screen_crawler::browser::driver::{BrowserDriver, PageCapture};
use screen_crawler::command::command_model::ScrollDirection;
use screen_crawler::snapshot::snapshot_model::Snapshot;
use screen_crawler::snapshot::viewport::ViewportMetrics;

#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    Navigate(String),
    Capture,
    CurrentUrl,
    Click(i64, i64),
    Type(String),
    Enter,
    Scroll(ScrollDirection),
}

/// Records every call; serves captures in order, repeating the last one.
pub struct RecordingDriver {
    pub calls: Vec<DriverCall>,
    pub url: String,
    captures: Vec<PageCapture>,
    served: usize,
}

impl RecordingDriver {
    pub fn new(snapshots: Vec<Snapshot>) -> Self {
        RecordingDriver {
            calls: Vec::new(),
            url: "about:blank".into(),
            captures: snapshots
                .into_iter()
                .map(|snapshot| PageCapture {
                    snapshot,
                    metrics: ViewportMetrics::default(),
                })
                .collect(),
            served: 0,
        }
    }

    /// Calls that change browser state (everything except reads).
    pub fn actions(&self) -> Vec<DriverCall> {
        self.calls
            .iter()
            .filter(|c| !matches!(c, DriverCall::Capture | DriverCall::CurrentUrl))
            .cloned()
            .collect()
    }
}

impl BrowserDriver for RecordingDriver {
    fn navigate(&mut self, url: &str) -> Result<(), AgentError> {
        self.calls.push(DriverCall::Navigate(url.to_string()));
        self.url = url.to_string();
        Ok(())
    }

    fn capture(&mut self) -> Result<PageCapture, AgentError> {
        self.calls.push(DriverCall::Capture);
        let index = self.served.min(self.captures.len().saturating_sub(1));
        self.served += 1;
        self.captures
            .get(index)
            .cloned()
            .ok_or_else(|| AgentError::SessionIO("no capture configured".into()))
    }

    fn current_url(&mut self) -> Result<String, AgentError> {
        self.calls.push(DriverCall::CurrentUrl);
        Ok(self.url.clone())
    }

    fn click_at(&mut self, x: i64, y: i64) -> Result<(), AgentError> {
        self.calls.push(DriverCall::Click(x, y));
        Ok(())
    }

    fn type_text(&mut self, text: &str) -> Result<(), AgentError> {
        self.calls.push(DriverCall::Type(text.to_string()));
        Ok(())
    }

    fn press_enter(&mut self) -> Result<(), AgentError> {
        self.calls.push(DriverCall::Enter);
        Ok(())
    }

    fn scroll(&mut self, direction: ScrollDirection) -> Result<(), AgentError> {
        self.calls.push(DriverCall::Scroll(direction));
        Ok(())
    }
}
