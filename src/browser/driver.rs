use crate::agent::error::AgentError;
use crate::command::command_model::ScrollDirection;
use crate::snapshot::snapshot_model::Snapshot;
use crate::snapshot::viewport::ViewportMetrics;

/// A snapshot together with the window metrics it was taken under.
#[derive(Debug, Clone)]
pub struct PageCapture {
    pub snapshot: Snapshot,
    pub metrics: ViewportMetrics,
}

/// What the crawler needs from a browser.
///
/// Every call blocks until the browser has answered.
pub trait BrowserDriver {
    fn navigate(&mut self, url: &str) -> Result<(), AgentError>;

    fn capture(&mut self) -> Result<PageCapture, AgentError>;

    fn current_url(&mut self) -> Result<String, AgentError>;

    /// Synthetic pointer click at CSS-pixel page coordinates.
    fn click_at(&mut self, x: i64, y: i64) -> Result<(), AgentError>;

    fn type_text(&mut self, text: &str) -> Result<(), AgentError>;

    fn press_enter(&mut self) -> Result<(), AgentError>;

    /// Scroll by one viewport height.
    fn scroll(&mut self, direction: ScrollDirection) -> Result<(), AgentError>;
}
