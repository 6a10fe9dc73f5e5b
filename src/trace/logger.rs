use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::Path,
    sync::Mutex,
};

use tracing::warn;

use crate::trace::trace::TraceEvent;

/// Appends one JSON line per [`TraceEvent`]. A logger whose file could not be
/// opened is disabled; write failures are reported and otherwise ignored.
pub struct TraceLogger {
    sink: Option<Mutex<File>>,
}

impl TraceLogger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let sink = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                warn!(path = %path.display(), error = %e, "trace file unavailable, tracing disabled");
            })
            .ok()
            .map(Mutex::new);

        TraceLogger { sink }
    }

    pub fn disabled() -> Self {
        TraceLogger { sink: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn log(&self, event: &TraceEvent) {
        let Some(sink) = &self.sink else {
            return;
        };

        if let Err(e) = append(sink, event) {
            warn!(cycle = event.cycle, error = %e, "dropping trace event");
        }
    }
}

fn append(sink: &Mutex<File>, event: &TraceEvent) -> io::Result<()> {
    let line = serde_json::to_string(event)?;
    let mut file = sink
        .lock()
        .map_err(|_| io::Error::other("trace file lock poisoned"))?;
    writeln!(file, "{}", line)
}
