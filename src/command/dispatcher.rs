use tracing::{info, warn};

use crate::agent::error::AgentError;
use crate::browser::driver::BrowserDriver;
use crate::command::command_model::{Command, Outcome};
use crate::command::scratchpad::Scratchpad;
use crate::crawl::crawl_model::{ElementBuffer, ElementRecord};

/// Execute a command against this cycle's buffer.
///
/// An id missing from the buffer yields [`Outcome::ElementNotFound`] without
/// touching the browser. Only browser transport failures are errors.
pub fn dispatch(
    command: &Command,
    buffer: &ElementBuffer,
    scratchpad: &mut Scratchpad,
    driver: &mut dyn BrowserDriver,
) -> Result<Outcome, AgentError> {
    match command {
        Command::Scroll { direction } => {
            info!(?direction, "scrolling");
            driver.scroll(*direction)?;
            Ok(Outcome::Scrolled {
                direction: *direction,
            })
        }

        Command::Click { id } => {
            let Some(target) = resolve(buffer, *id) else {
                return Ok(Outcome::ElementNotFound { id: *id });
            };
            click(target, driver)?;
            Ok(Outcome::Clicked { id: *id })
        }

        Command::TypeSubmit { id, text } => {
            let Some(target) = resolve(buffer, *id) else {
                return Ok(Outcome::ElementNotFound { id: *id });
            };
            click(target, driver)?;
            info!(id, text = %text, "typing and submitting");
            driver.type_text(text)?;
            driver.press_enter()?;
            Ok(Outcome::Submitted { id: *id })
        }

        // The saved value is the literal text, whatever the id points at.
        Command::SaveText { text, .. } => {
            info!(text = %text, "saving text");
            scratchpad.save_text(text.clone());
            Ok(Outcome::SavedText)
        }

        Command::SaveLink { text, .. } => {
            info!(link = %text, "saving link");
            scratchpad.save_link(text.clone());
            Ok(Outcome::SavedLink)
        }
    }
}

fn resolve(buffer: &ElementBuffer, id: usize) -> Option<&ElementRecord> {
    let target = buffer.get(id);
    if target.is_none() {
        warn!(id, available = buffer.len(), "element not found in current page");
    }
    target
}

fn click(target: &ElementRecord, driver: &mut dyn BrowserDriver) -> Result<(), AgentError> {
    info!(
        id = target.id,
        kind = %target.kind,
        x = target.center.x,
        y = target.center.y,
        "clicking element"
    );
    driver.click_at(target.center.x, target.center.y)
}
