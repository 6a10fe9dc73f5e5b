use std::io::Cursor;

use screen_crawler::agent::{
    decider::{
        build_prompt, first_command_line, Decider, DecisionRequest, OperatorDecider,
        ScriptedDecider,
    },
    error::AgentError,
    ollama::{OllamaDecider, DEFAULT_ENDPOINT, DEFAULT_MODEL},
};

fn request(previous: Option<&str>) -> DecisionRequest {
    DecisionRequest {
        objective: "find the pricing page".into(),
        url: "https://example.com/".into(),
        previous_command: previous.map(str::to_string),
        browser_content: "<link id=0>Pricing</link>\n<text id=1>Welcome</text>".into(),
    }
}

// =========================================================================
// Prompt
// =========================================================================

#[test]
fn prompt_carries_the_whole_request() {
    let prompt = build_prompt(&request(Some("SCROLL DOWN")));

    assert!(prompt.contains("OBJECTIVE: find the pricing page"));
    assert!(prompt.contains("CURRENT URL: https://example.com/"));
    assert!(prompt.contains("PREVIOUS COMMAND: SCROLL DOWN"));
    assert!(prompt.contains("<link id=0>Pricing</link>\n<text id=1>Welcome</text>"));
    assert!(prompt.trim_end().ends_with("YOUR COMMAND:"));
}

#[test]
fn prompt_lists_every_command() {
    let prompt = build_prompt(&request(None));

    assert!(prompt.contains("PREVIOUS COMMAND: (none)"));
    for keyword in ["SCROLL UP", "SCROLL DOWN", "CLICK X", "TYPESUBMIT X", "SAVE TEXT X", "SAVE LINK X"] {
        assert!(prompt.contains(keyword), "missing {}", keyword);
    }
}

#[test]
fn first_command_line_skips_blank_lines() {
    assert_eq!(
        first_command_line("\n   CLICK 3  \nbecause it is the link"),
        Some("CLICK 3".to_string())
    );
    assert_eq!(first_command_line("  \n\t\n"), None);
    assert_eq!(first_command_line(""), None);
}

// =========================================================================
// Scripted decider
// =========================================================================

#[test]
fn scripted_decider_replays_then_stops() {
    let mut decider = ScriptedDecider::from_script(
        "# search first\nTYPESUBMIT 1 \"rust\"\n\n   CLICK 4  \n# done\n",
    );

    assert_eq!(
        decider.decide(&request(None)).unwrap(),
        Some("TYPESUBMIT 1 \"rust\"".to_string())
    );
    assert_eq!(
        decider.decide(&request(Some("TYPESUBMIT 1 \"rust\""))).unwrap(),
        Some("CLICK 4".to_string())
    );
    assert_eq!(decider.decide(&request(Some("CLICK 4"))).unwrap(), None);

    let seen = decider.requests();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0].previous_command, None);
    assert_eq!(seen[2].previous_command.as_deref(), Some("CLICK 4"));
}

#[test]
fn boxed_decider_delegates() {
    let mut decider: Box<dyn Decider> = Box::new(ScriptedDecider::new(["SCROLL UP"]));
    assert_eq!(
        decider.decide(&request(None)).unwrap(),
        Some("SCROLL UP".to_string())
    );
}

// =========================================================================
// Operator decider
// =========================================================================

fn operator_reply(suggestions: Vec<&str>, typed: &str) -> (Option<String>, String) {
    let mut output = Vec::new();
    let reply = {
        let mut decider = OperatorDecider::new(
            ScriptedDecider::new(suggestions),
            Cursor::new(typed.as_bytes().to_vec()),
            &mut output,
        );
        decider.decide(&request(None)).unwrap()
    };
    (reply, String::from_utf8(output).unwrap())
}

#[test]
fn operator_accepts_suggestion_on_empty_line() {
    let (reply, shown) = operator_reply(vec!["CLICK 0"], "\n");

    assert_eq!(reply, Some("CLICK 0".to_string()));
    assert!(shown.contains("URL: https://example.com/"));
    assert!(shown.contains("Objective: find the pricing page"));
    assert!(shown.contains("Suggested command: CLICK 0"));
}

#[test]
fn operator_can_override_suggestion() {
    let (reply, _) = operator_reply(vec!["CLICK 0"], "  SCROLL DOWN \n");
    assert_eq!(reply, Some("SCROLL DOWN".to_string()));
}

#[test]
fn operator_types_command_when_nothing_is_suggested() {
    let (reply, shown) = operator_reply(vec![], "CLICK 1\n");

    assert_eq!(reply, Some("CLICK 1".to_string()));
    assert!(shown.contains("No suggestion"));
}

#[test]
fn operator_end_of_input_stops() {
    let (reply, _) = operator_reply(vec!["CLICK 0"], "");
    assert_eq!(reply, None);
}

// =========================================================================
// Ollama decider
// =========================================================================

#[test]
fn ollama_defaults() {
    let decider = OllamaDecider::default();

    assert_eq!(decider.endpoint, DEFAULT_ENDPOINT);
    assert_eq!(decider.model, DEFAULT_MODEL);
    assert_eq!(decider.max_tokens, 50);
}

#[test]
fn unreachable_ollama_is_an_http_error() {
    let mut decider = OllamaDecider::new("http://127.0.0.1:9/api/generate", DEFAULT_MODEL);

    let err = decider.decide(&request(None)).unwrap_err();
    assert!(matches!(err, AgentError::Http(_)), "got {:?}", err);
}
