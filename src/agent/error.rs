use thiserror::Error;

use crate::snapshot::snapshot_model::SnapshotError;

#[derive(Debug, Error)]
pub enum AgentError {
    /// Browser helper process failed to spawn
    #[error("Failed to spawn {script} (is Node.js installed?): {source}")]
    SubprocessSpawn {
        script: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the helper process failed
    #[error("Browser session I/O: {0}")]
    SessionIO(String),

    /// Helper process answered a command with an error
    #[error("Browser command '{command}' failed: {error}")]
    SessionProtocol { command: String, error: String },

    #[error("JSON parse error ({context}): {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON serialize error ({context}): {source}")]
    JsonSerialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Snapshot did not have the expected structure
    #[error("Unexpected snapshot structure: {0}")]
    Snapshot(#[from] SnapshotError),

    /// Decision backend could not be reached
    #[error("Decision backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Reading the operator's answer failed
    #[error("Operator input: {0}")]
    OperatorIO(#[source] std::io::Error),
}
