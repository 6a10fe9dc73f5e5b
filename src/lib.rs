use serde::Serialize;
use tracing::{info, warn};

use crate::{
    agent::{
        decider::{Decider, DecisionRequest},
        error::AgentError,
    },
    browser::driver::BrowserDriver,
    command::{
        command_model::Outcome, dispatcher::dispatch, parser::parse_command,
        scratchpad::Scratchpad,
    },
    crawl::crawler::crawl,
    trace::{
        logger::TraceLogger,
        trace::{page_fingerprint, TraceEvent},
    },
};

pub mod agent;
pub mod browser;
pub mod cli;
pub mod command;
pub mod crawl;
pub mod snapshot;
pub mod trace;

pub const DEFAULT_MAX_CYCLES: u32 = 20;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub objective: String,
    /// Page to open before the first cycle; `None` keeps the current page.
    pub start_url: Option<String>,
    pub max_cycles: u32,
}

/// What a finished session leaves behind.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionReport {
    pub cycles: u32,
    pub last_url: Option<String>,
    pub invalid_commands: u32,
    pub scratchpad: Scratchpad,
}

/// Drive the browser until the decider stops or the cycle budget runs out.
///
/// Each cycle captures the page, crawls it into a fresh element buffer, asks
/// the decider for one command and dispatches it. Bad commands and unknown
/// ids are logged and the loop moves on; only browser or decider transport
/// failures end the session early.
pub fn run_session(
    driver: &mut dyn BrowserDriver,
    decider: &mut dyn Decider,
    options: &SessionOptions,
    tracer: &TraceLogger,
) -> Result<SessionReport, AgentError> {
    if let Some(url) = &options.start_url {
        driver.navigate(url)?;
    }

    let mut report = SessionReport::default();
    let mut previous_command: Option<String> = None;
    let mut previous_fingerprint: Option<String> = None;
    let mut previous_acted = false;

    for cycle in 0..options.max_cycles {
        let capture = driver.capture()?;
        let page = crawl(&capture.snapshot, &capture.metrics);
        let rendered = page.render();
        let url = driver.current_url()?;

        info!(cycle, url = %url, elements = page.buffer.len(), "page captured");

        let fingerprint = page_fingerprint(&rendered);
        if previous_acted && previous_fingerprint.as_deref() == Some(fingerprint.as_str()) {
            info!(
                previous = previous_command.as_deref().unwrap_or_default(),
                "page unchanged after previous command"
            );
        }
        previous_fingerprint = Some(fingerprint);

        let mut trace = TraceEvent::now(cycle as u64).with_page(&url, &rendered, page.buffer.len());
        report.last_url = Some(url.clone());

        let request = DecisionRequest {
            objective: options.objective.clone(),
            url,
            previous_command: previous_command.clone(),
            browser_content: rendered,
        };

        let Some(reply) = decider.decide(&request)? else {
            info!(cycle, "decider has no further commands");
            tracer.log(&trace);
            break;
        };
        trace = trace.with_command(&reply);
        report.cycles += 1;

        match parse_command(&reply) {
            Ok(command) => {
                let outcome = dispatch(&command, &page.buffer, &mut report.scratchpad, driver)?;
                if !outcome.is_success() {
                    warn!(command = %command, ?outcome, "command had no effect");
                }

                previous_acted =
                    matches!(outcome, Outcome::Clicked { .. } | Outcome::Submitted { .. });
                previous_command = Some(command.to_string());
                trace = trace.with_outcome(&outcome);
            }
            Err(e) => {
                warn!(command = %reply, error = %e, "invalid command");
                report.invalid_commands += 1;
                previous_acted = false;
                previous_command = Some(reply);
                trace = trace.with_error(&e);
            }
        }

        tracer.log(&trace);
    }

    info!(
        cycles = report.cycles,
        saved_text = report.scratchpad.texts().len(),
        saved_links = report.scratchpad.links().len(),
        "session finished"
    );

    Ok(report)
}
