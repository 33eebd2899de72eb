//! End-to-End Tests
//!
//! Notes directory -> OpenAI-compatible API -> artifact -> Slack, with both
//! services mocked over HTTP.

use meeting_actions::adapters::{OpenAiBackend, SlackClient};
use meeting_actions::core::{ActionExtractor, CorpusAggregator};
use meeting_actions::notify::NotificationDispatcher;
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_notes_to_slack() {
    let temp = TempDir::new().unwrap();
    let notes = temp.path().join("meeting-notes");
    std::fs::create_dir_all(notes.join("2024")).unwrap();
    std::fs::write(
        notes.join("2024").join("standup.md"),
        "# Standup\n- Alice to send the Q4 report by 2024-01-05",
    )
    .unwrap();

    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/completions"))
        .and(body_string_contains("Alice to send the Q4 report"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "text": "```json\n{\n\t\"items\": [{\"action\": \"Send Q4 report\", \"owner\": \"Alice\", \"due_date\": \"2024-01-05\", \"status\": \"open\"}]\n}\n```"
            }]
        })))
        .expect(1)
        .mount(&openai)
        .await;

    let backend = OpenAiBackend::new("sk-test").with_base_url(openai.uri());
    let output = temp.path().join("output").join("actions.json");
    let report = CorpusAggregator::new(ActionExtractor::new(Box::new(backend)))
        .run(&notes, &output)
        .await
        .unwrap();
    assert_eq!(report.total_actions, 1);

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(written["actions"][0]["owner"], "Alice");

    let slack = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat.postMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(2)
        .mount(&slack)
        .await;

    let dispatcher = NotificationDispatcher::new(Box::new(
        SlackClient::new("xoxb-test").with_base_url(slack.uri()),
    ));
    let sent = dispatcher.run(&output, "#actions").await;

    assert_eq!(sent.sent, 2);
    let requests = slack.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(body["channel"], "#actions");
    assert!(body["text"]
        .as_str()
        .unwrap()
        .contains(">*Description:* Send Q4 report\n"));
}

#[tokio::test]
async fn test_api_failure_leaves_empty_artifact() {
    let temp = TempDir::new().unwrap();
    let notes = temp.path().join("notes");
    std::fs::create_dir_all(&notes).unwrap();
    std::fs::write(notes.join("retro.md"), "We should fix the build.").unwrap();

    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&openai)
        .await;

    let backend = OpenAiBackend::new("sk-test").with_base_url(openai.uri());
    let output = temp.path().join("actions.json");
    let report = CorpusAggregator::new(ActionExtractor::new(Box::new(backend)))
        .run(&notes, &output)
        .await
        .unwrap();

    assert_eq!(report.files_failed, 1);
    assert_eq!(
        std::fs::read_to_string(&output).unwrap(),
        "{\n  \"actions\": []\n}"
    );
}
