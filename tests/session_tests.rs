use serde_json::Value;

use screen_crawler::{
    agent::{decider::ScriptedDecider, error::AgentError},
    run_session,
    snapshot::snapshot_model::Snapshot,
    trace::{
        logger::TraceLogger,
        trace::{page_fingerprint, TraceEvent},
    },
    SessionOptions,
};

use crate::common::{
    driver::{DriverCall, RecordingDriver},
    snapshot::page,
};

mod common;

/// Search page: `<link id=0>Docs</link>` and `<input id=1 placeholder="Search"/>`.
fn search_page() -> Snapshot {
    let (mut b, body) = page();
    let link = b.element("a", Some(body));
    let text = b.text("Docs", link);
    let input = b.element("input", Some(body));
    b.visible(link).visible(text);
    b.attr(input, "placeholder", "Search")
        .bounds(input, 10.0, 50.0, 100.0, 20.0);
    b.build()
}

fn results_page() -> Snapshot {
    let (mut b, body) = page();
    let heading = b.element("h1", Some(body));
    let text = b.text("Results", heading);
    b.visible(heading).visible(text);
    b.build()
}

fn options(max_cycles: u32) -> SessionOptions {
    SessionOptions {
        objective: "search for rust".into(),
        start_url: Some("https://example.com".into()),
        max_cycles,
    }
}

#[test]
fn session_runs_script_to_completion() {
    let mut driver = RecordingDriver::new(vec![search_page(), results_page()]);
    let mut decider = ScriptedDecider::new([
        "TYPESUBMIT 1 \"rust\"",
        "SAVE TEXT 1 \"Results\"",
        "SAVE LINK 0 \"https://example.com/docs\"",
    ]);

    let report = run_session(
        &mut driver,
        &mut decider,
        &options(10),
        &TraceLogger::disabled(),
    )
    .unwrap();

    assert_eq!(report.cycles, 3);
    assert_eq!(report.invalid_commands, 0);
    assert_eq!(report.last_url.as_deref(), Some("https://example.com"));
    assert_eq!(report.scratchpad.texts(), ["Results".to_string()]);
    assert_eq!(report.scratchpad.links(), ["https://example.com/docs".to_string()]);

    assert_eq!(
        driver.actions(),
        vec![
            DriverCall::Navigate("https://example.com".into()),
            DriverCall::Click(60, 60),
            DriverCall::Type("rust".into()),
            DriverCall::Enter,
        ]
    );

    // Three commands plus the final request that ended the script.
    let seen = decider.requests();
    assert_eq!(seen.len(), 4);
    assert_eq!(seen[0].objective, "search for rust");
    assert_eq!(
        seen[0].browser_content,
        "<link id=0>Docs</link>\n<input id=1 placeholder=\"Search\"/>"
    );
    assert_eq!(seen[1].browser_content, "<heading id=0/>\n<text id=1>Results</text>");
}

#[test]
fn previous_command_is_fed_back() {
    let mut driver = RecordingDriver::new(vec![search_page()]);
    let mut decider = ScriptedDecider::new(["click   0", "WAIT 5", "SCROLL DOWN"]);

    let report = run_session(
        &mut driver,
        &mut decider,
        &options(10),
        &TraceLogger::disabled(),
    )
    .unwrap();

    assert_eq!(report.cycles, 3);
    assert_eq!(report.invalid_commands, 1);

    let previous: Vec<Option<&str>> = decider
        .requests()
        .iter()
        .map(|r| r.previous_command.as_deref())
        .collect();
    assert_eq!(
        previous,
        vec![None, Some("CLICK 0"), Some("WAIT 5"), Some("SCROLL DOWN")]
    );
}

#[test]
fn unknown_element_id_does_not_stop_the_session() {
    let mut driver = RecordingDriver::new(vec![search_page()]);
    let mut decider = ScriptedDecider::new(["CLICK 7", "CLICK 0"]);

    let report = run_session(
        &mut driver,
        &mut decider,
        &options(10),
        &TraceLogger::disabled(),
    )
    .unwrap();

    assert_eq!(report.cycles, 2);
    assert_eq!(report.invalid_commands, 0);
    assert_eq!(
        driver.actions(),
        vec![
            DriverCall::Navigate("https://example.com".into()),
            DriverCall::Click(60, 20),
        ]
    );
}

#[test]
fn cycle_budget_limits_the_session() {
    let mut driver = RecordingDriver::new(vec![search_page()]);
    let mut decider = ScriptedDecider::new(["SCROLL DOWN"; 5]);

    let report = run_session(
        &mut driver,
        &mut decider,
        &options(2),
        &TraceLogger::disabled(),
    )
    .unwrap();

    assert_eq!(report.cycles, 2);
    assert_eq!(decider.requests().len(), 2);
    let captures = driver
        .calls
        .iter()
        .filter(|c| **c == DriverCall::Capture)
        .count();
    assert_eq!(captures, 2);
}

#[test]
fn zero_cycles_only_navigates() {
    let mut driver = RecordingDriver::new(vec![search_page()]);
    let mut decider = ScriptedDecider::new(["CLICK 0"]);

    let report = run_session(
        &mut driver,
        &mut decider,
        &options(0),
        &TraceLogger::disabled(),
    )
    .unwrap();

    assert_eq!(report.cycles, 0);
    assert_eq!(report.last_url, None);
    assert_eq!(
        driver.calls,
        vec![DriverCall::Navigate("https://example.com".into())]
    );
}

#[test]
fn without_start_url_the_current_page_is_used() {
    let mut driver = RecordingDriver::new(vec![search_page()]);
    let mut decider = ScriptedDecider::new(["SCROLL UP"]);
    let options = SessionOptions {
        start_url: None,
        ..options(5)
    };

    let report = run_session(&mut driver, &mut decider, &options, &TraceLogger::disabled())
        .unwrap();

    assert_eq!(report.last_url.as_deref(), Some("about:blank"));
    assert!(!driver
        .calls
        .iter()
        .any(|c| matches!(c, DriverCall::Navigate(_))));
}

#[test]
fn browser_failure_ends_the_session() {
    let mut driver = RecordingDriver::new(vec![]);
    let mut decider = ScriptedDecider::new(["CLICK 0"]);

    let err = run_session(
        &mut driver,
        &mut decider,
        &options(3),
        &TraceLogger::disabled(),
    )
    .unwrap_err();

    assert!(matches!(err, AgentError::SessionIO(_)));
    assert!(decider.requests().is_empty());
}

// =========================================================================
// Trace
// =========================================================================

fn read_trace(path: &std::path::Path) -> Vec<Value> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn every_cycle_is_traced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");
    let tracer = TraceLogger::new(&path);
    assert!(tracer.is_enabled());

    let mut driver = RecordingDriver::new(vec![search_page()]);
    let mut decider = ScriptedDecider::new(["CLICK 0", "CLICK zero"]);

    run_session(&mut driver, &mut decider, &options(10), &tracer).unwrap();

    let events = read_trace(&path);
    assert_eq!(events.len(), 3, "two commands plus the stop");

    assert_eq!(events[0]["cycle"], 0);
    assert_eq!(events[0]["url"], "https://example.com");
    assert_eq!(events[0]["element_count"], 2);
    assert_eq!(events[0]["command"], "CLICK 0");
    assert_eq!(events[0]["outcome"]["outcome"], "clicked");
    assert_eq!(events[0]["outcome"]["id"], 0);
    assert!(events[0]["error"].is_null());

    assert_eq!(events[1]["command"], "CLICK zero");
    assert!(events[1]["outcome"].is_null());
    assert_eq!(events[1]["error"], "'zero' is not a valid element id");

    assert!(events[2]["command"].is_null());
    assert_eq!(events[0]["page_fingerprint"], events[2]["page_fingerprint"]);
}

#[test]
fn trace_file_is_appended() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.jsonl");

    TraceLogger::new(&path).log(&TraceEvent::now(0).with_command("SCROLL UP"));
    TraceLogger::new(&path).log(&TraceEvent::now(1).with_error("boom"));

    let events = read_trace(&path);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["command"], "SCROLL UP");
    assert_eq!(events[1]["error"], "boom");
}

#[test]
fn unwritable_trace_path_disables_logging() {
    let dir = tempfile::tempdir().unwrap();
    let tracer = TraceLogger::new(dir.path().join("missing").join("trace.jsonl"));

    assert!(!tracer.is_enabled());
    tracer.log(&TraceEvent::now(0));
    assert!(!TraceLogger::disabled().is_enabled());
}

#[test]
fn fingerprint_is_stable_sha1() {
    assert_eq!(
        page_fingerprint(""),
        "da39a3ee5e6b4b0d3255bfef95601890afd80709"
    );
    assert_eq!(page_fingerprint("<text id=0>a</text>"), page_fingerprint("<text id=0>a</text>"));
    assert_ne!(page_fingerprint("<text id=0>a</text>"), page_fingerprint("<text id=0>b</text>"));
}

#[test]
fn trace_event_records_page_details() {
    let event = TraceEvent::now(4).with_page("https://example.com", "<text id=0>a</text>", 1);

    assert_eq!(event.cycle, 4);
    assert_eq!(event.url.as_deref(), Some("https://example.com"));
    assert_eq!(event.element_count, 1);
    assert_eq!(
        event.page_fingerprint,
        Some(page_fingerprint("<text id=0>a</text>"))
    );
}
