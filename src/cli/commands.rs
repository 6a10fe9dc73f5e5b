use std::io::{self, BufRead, Write};

use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::agent::decider::{Decider, OperatorDecider, ScriptedDecider};
use crate::agent::ollama::OllamaDecider;
use crate::browser::session::BrowserSession;
use crate::cli::config::Settings;
use crate::crawl::crawler::crawl;
use crate::snapshot::snapshot_model::Snapshot;
use crate::snapshot::viewport::ViewportMetrics;
use crate::trace::logger::TraceLogger;
use crate::{run_session, SessionOptions, SessionReport};

// ============================================================================
// run subcommand
// ============================================================================

pub fn cmd_run(
    url: &str,
    settings: &Settings,
    script: Option<&str>,
    report_path: Option<&str>,
) -> Result<SessionReport, Box<dyn std::error::Error>> {
    let objective = match &settings.objective {
        Some(objective) => objective.clone(),
        None => ask_objective()?,
    };

    let mut decider = build_decider(settings, script)?;
    let tracer = TraceLogger::new(&settings.trace_file);
    let mut session = BrowserSession::launch(&settings.browser_script)?;

    let options = SessionOptions {
        objective,
        start_url: Some(url.to_string()),
        max_cycles: settings.max_cycles,
    };

    info!(url, max_cycles = settings.max_cycles, "starting session");
    let result = run_session(&mut session, decider.as_mut(), &options, &tracer);
    session.quit()?;
    let report = result?;

    if !report.scratchpad.is_empty() {
        print!("{}", report.scratchpad.summary());
    }

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)?;
        info!(path, "wrote session report");
    }

    Ok(report)
}

fn ask_objective() -> Result<String, Box<dyn std::error::Error>> {
    print!("Objective: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let objective = line.trim().to_string();
    if objective.is_empty() {
        return Err("an objective is required".into());
    }
    Ok(objective)
}

/// Pick the decision backend: a replay script or the model, optionally
/// wrapped for operator confirmation.
fn build_decider(
    settings: &Settings,
    script: Option<&str>,
) -> Result<Box<dyn Decider>, Box<dyn std::error::Error>> {
    let inner: Box<dyn Decider> = match script {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            Box::new(ScriptedDecider::from_script(&content))
        }
        None => Box::new(OllamaDecider::new(
            &settings.ollama_endpoint,
            &settings.ollama_model,
        )),
    };

    if settings.interactive {
        let stdin = io::BufReader::new(io::stdin());
        Ok(Box::new(OperatorDecider::new(inner, stdin, io::stdout())))
    } else {
        Ok(inner)
    }
}

// ============================================================================
// crawl subcommand
// ============================================================================

/// Saved capture, same shape as the browser helper's snapshot response.
#[derive(Debug, Deserialize)]
pub struct CaptureFile {
    pub data: Value,
    #[serde(default)]
    pub metrics: Option<ViewportMetrics>,
}

/// Crawl a saved capture and return the rendered element list.
pub fn cmd_crawl(path: &str) -> Result<String, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    let capture: CaptureFile = serde_json::from_str(&content)?;

    let snapshot = Snapshot::from_json(capture.data)?;
    let metrics = capture.metrics.unwrap_or_default();
    let page = crawl(&snapshot, &metrics);

    Ok(page.render())
}
