use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::DEFAULT_MAX_CYCLES;
use crate::agent::ollama::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use crate::browser::session::DEFAULT_SERVER_SCRIPT;

pub const DEFAULT_CONFIG_FILE: &str = "screen-crawler.yaml";
pub const DEFAULT_TRACE_FILE: &str = "crawler_trace.jsonl";

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "screen-crawler",
    version,
    about = "Turns browser snapshots into compact element lists and drives the page from short commands"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Ollama API endpoint
    #[arg(long, global = true)]
    pub ollama_endpoint: Option<String>,

    /// Ollama model name
    #[arg(long, global = true)]
    pub ollama_model: Option<String>,

    /// Path to the Node.js browser helper script
    #[arg(long, global = true)]
    pub browser_script: Option<String>,

    /// JSONL file receiving one trace record per cycle
    #[arg(long, global = true)]
    pub trace: Option<String>,

    /// Path to config file (default: screen-crawler.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Browse towards an objective, one command per cycle
    Run {
        /// URL to open first
        #[arg(long)]
        url: String,

        /// What the agent should achieve
        #[arg(long)]
        objective: Option<String>,

        /// Maximum number of cycles
        #[arg(long)]
        max_cycles: Option<u32>,

        /// Confirm or override every command on the terminal
        #[arg(long)]
        interactive: bool,

        /// Replay commands from a file instead of asking the model
        #[arg(long)]
        script: Option<String>,

        /// Write the session report (JSON) to this file
        #[arg(short, long)]
        report: Option<String>,
    },

    /// Print the element list of a captured snapshot file
    Crawl {
        /// JSON file with `data` (DOMSnapshot capture) and optional `metrics`
        #[arg(long)]
        snapshot: String,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `screen-crawler.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub ollama: OllamaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_max_cycles")]
    pub max_cycles: u32,

    pub objective: Option<String>,

    #[serde(default)]
    pub interactive: bool,

    pub trace_file: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            max_cycles: DEFAULT_MAX_CYCLES,
            objective: None,
            interactive: false,
            trace_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_script")]
    pub script: String,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            script: DEFAULT_SERVER_SCRIPT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OllamaConfig {
    pub endpoint: Option<String>,
    pub model: Option<String>,
}

// Serde default helpers
fn default_max_cycles() -> u32 { DEFAULT_MAX_CYCLES }
fn default_script() -> String { DEFAULT_SERVER_SCRIPT.to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or(DEFAULT_CONFIG_FILE);
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_else(|e| {
            warn!(path = config_path, error = %e, "ignoring malformed config file");
            AppConfig::default()
        }),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Resolved settings (CLI > config file > defaults)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub ollama_endpoint: String,
    pub ollama_model: String,
    pub browser_script: String,
    pub trace_file: String,
    pub max_cycles: u32,
    pub interactive: bool,
    pub objective: Option<String>,
}

pub fn resolve_settings(
    cli: &Cli,
    config: &AppConfig,
    max_cycles: Option<u32>,
    interactive: bool,
    objective: Option<&str>,
) -> Settings {
    Settings {
        ollama_endpoint: cli
            .ollama_endpoint
            .clone()
            .or_else(|| config.ollama.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        ollama_model: cli
            .ollama_model
            .clone()
            .or_else(|| config.ollama.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        browser_script: cli
            .browser_script
            .clone()
            .unwrap_or_else(|| config.browser.script.clone()),
        trace_file: cli
            .trace
            .clone()
            .or_else(|| config.run.trace_file.clone())
            .unwrap_or_else(|| DEFAULT_TRACE_FILE.to_string()),
        max_cycles: max_cycles.unwrap_or(config.run.max_cycles),
        interactive: interactive || config.run.interactive,
        objective: objective
            .map(str::to_string)
            .or_else(|| config.run.objective.clone()),
    }
}
