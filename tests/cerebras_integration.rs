use std::sync::Arc;

use serde_json::json;

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shipsmart::chat::{FlowController, SessionEvent};
use shipsmart::config::{CompletionConfig, Config};
use shipsmart::error::{Result, ShipsmartError};
use shipsmart::providers::{CerebrasClient, ChatTurn, Completion, CompletionClient, ToolDefinition};

fn client_for(server: &MockServer) -> CerebrasClient {
    let config = CompletionConfig {
        api_base: server.uri(),
        model: "test-model".to_string(),
        ..Default::default()
    };
    CerebrasClient::new(config, "test-key").unwrap()
}

fn turns() -> Vec<ChatTurn> {
    vec![
        ChatTurn::system("You are SHIPSmart"),
        ChatTurn::user("Is dental covered?"),
    ]
}

fn sse_body(events: &[serde_json::Value]) -> Vec<u8> {
    let mut body = String::new();
    for event in events {
        body.push_str(&format!("data: {}\n\n", event));
    }
    body.push_str("data: [DONE]\n\n");
    body.into_bytes()
}

fn content_event(text: &str) -> serde_json::Value {
    json!({"choices": [{"index": 0, "delta": {"content": text}, "finish_reason": null}]})
}

async fn mount_stream(server: &MockServer, body: Vec<u8>) {
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"stream": true})))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
        .mount(server)
        .await;
}

async fn stream_deltas(server: &MockServer) -> (Result<Completion>, Vec<String>) {
    let mut deltas = Vec::new();
    let result = client_for(server)
        .complete_streaming(&turns(), &[], &mut |delta: &str| -> Result<()> {
            deltas.push(delta.to_string());
            Ok(())
        })
        .await;
    (result, deltas)
}

async fn error_for(server: &MockServer) -> ShipsmartError {
    let err = client_for(server).complete(&turns(), &[]).await.unwrap_err();
    err.downcast::<ShipsmartError>()
        .expect("remote failures are ShipsmartError")
}

/// Successful completion sends the bearer key and request options
#[tokio::test]
async fn test_completion_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "stream": false,
            "parallel_tool_calls": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-1",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Yes, dental is covered."},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 40, "completion_tokens": 6, "total_tokens": 46}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let completion = client_for(&server)
        .complete(&turns(), &[ToolDefinition::search_policy()])
        .await
        .unwrap();

    assert_eq!(completion.content, "Yes, dental is covered.");
    assert!(completion.tool_calls.is_empty());
    assert_eq!(completion.usage.unwrap().total_tokens, 46);
}

#[tokio::test]
async fn test_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    assert!(matches!(
        error_for(&server).await,
        ShipsmartError::RemoteUnauthorized
    ));
}

#[tokio::test]
async fn test_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    assert!(matches!(
        error_for(&server).await,
        ShipsmartError::RemoteRateLimited
    ));
}

#[tokio::test]
async fn test_server_error_keeps_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert!(matches!(
        error_for(&server).await,
        ShipsmartError::RemoteServerError(503)
    ));
}

#[tokio::test]
async fn test_undecodable_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    assert!(matches!(
        error_for(&server).await,
        ShipsmartError::RemoteDecoding(_)
    ));
}

#[tokio::test]
async fn test_missing_choices_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    assert!(matches!(
        error_for(&server).await,
        ShipsmartError::MalformedResponse(_)
    ));
}

#[tokio::test]
async fn test_connection_failure_is_network_error() {
    let config = CompletionConfig {
        api_base: "http://127.0.0.1:9".to_string(),
        connect_timeout_seconds: 1,
        request_timeout_seconds: 2,
        ..Default::default()
    };
    let client = CerebrasClient::new(config, "test-key").unwrap();

    let err = client.complete(&turns(), &[]).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ShipsmartError>(),
        Some(ShipsmartError::RemoteNetwork(_))
    ));
}

/// Streamed replies arrive as several deltas
#[tokio::test]
async fn test_streaming_delivers_deltas() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        sse_body(&[
            json!({"choices": [{"index": 0, "delta": {"role": "assistant"}}]}),
            content_event("Yes, "),
            content_event("dental is "),
            content_event("covered."),
            json!({"choices": [], "usage": {"prompt_tokens": 40, "completion_tokens": 6}}),
        ]),
    )
    .await;

    let (result, deltas) = stream_deltas(&server).await;
    let completion = result.unwrap();

    assert_eq!(deltas, vec!["Yes, ", "dental is ", "covered."]);
    assert_eq!(completion.content, "Yes, dental is covered.");
    assert_eq!(completion.usage.unwrap().total_tokens, 46);
}

#[tokio::test]
async fn test_streaming_assembles_tool_calls() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        sse_body(&[
            json!({"choices": [{"index": 0, "delta": {"tool_calls": [{
                "index": 0, "id": "call_7", "type": "function",
                "function": {"name": "search_policy", "arguments": "{\"query\":"}
            }]}}]}),
            json!({"choices": [{"index": 0, "delta": {"tool_calls": [{
                "index": 0, "function": {"arguments": "\"vision\"}"}
            }]}, "finish_reason": "tool_calls"}]}),
        ]),
    )
    .await;

    let (result, deltas) = stream_deltas(&server).await;
    let completion = result.unwrap();

    assert!(deltas.is_empty());
    assert_eq!(completion.tool_calls[0].id, "call_7");
    assert_eq!(
        completion.tool_calls[0].function.arguments,
        r#"{"query":"vision"}"#
    );
}

#[tokio::test]
async fn test_streaming_bad_event_is_decoding_error() {
    let server = MockServer::start().await;
    let mut body = format!("data: {}\n\n", content_event("Yes, ")).into_bytes();
    body.extend_from_slice(b"data: {truncated\n\n");
    mount_stream(&server, body).await;

    let (result, deltas) = stream_deltas(&server).await;

    assert_eq!(deltas, vec!["Yes, "]);
    assert!(matches!(
        result.unwrap_err().downcast_ref::<ShipsmartError>(),
        Some(ShipsmartError::RemoteDecoding(_))
    ));
}

#[tokio::test]
async fn test_streaming_request_answered_with_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Vision is covered.", "tool_calls": null}}]
        })))
        .mount(&server)
        .await;

    let (result, deltas) = stream_deltas(&server).await;

    assert_eq!(result.unwrap().content, "Vision is covered.");
    assert_eq!(deltas, vec!["Vision is covered."]);
}

/// The flow controller fills the placeholder once per streamed delta
#[tokio::test]
async fn test_flow_fills_reply_from_stream() {
    let server = MockServer::start().await;
    mount_stream(
        &server,
        sse_body(&[
            content_event("Urgent care "),
            content_event("is covered "),
            content_event("at the Student Health Center."),
        ]),
    )
    .await;

    let config = Config {
        completion: CompletionConfig {
            api_base: server.uri(),
            ..Default::default()
        },
        ..Default::default()
    };
    let client = CerebrasClient::new(config.completion.clone(), "test-key").unwrap();
    let controller = FlowController::new(&config, Some(Arc::new(client)));
    let mut session = controller.open_session();
    controller.send(&mut session, "hello").await.unwrap();
    let mut events = session.subscribe();

    let outcome = controller
        .send(&mut session, "I need help with something")
        .await
        .unwrap();

    let updates = std::iter::from_fn(|| events.try_recv().ok())
        .filter(|event| *event == SessionEvent::MessageUpdated(outcome.reply))
        .count();
    assert_eq!(updates, 3);
    assert!(!outcome.remote_failed);
    assert_eq!(
        session.message(outcome.reply).unwrap().content(),
        "Urgent care is covered at the Student Health Center."
    );
}

/// A broken stream replaces the partial reply with one error message
#[tokio::test]
async fn test_flow_replaces_broken_stream_with_error() {
    let server = MockServer::start().await;
    let mut body = format!("data: {}\n\n", content_event("Urgent care ")).into_bytes();
    body.extend_from_slice(b"data: {truncated\n\n");
    mount_stream(&server, body).await;

    let config = Config {
        completion: CompletionConfig {
            api_base: server.uri(),
            ..Default::default()
        },
        ..Default::default()
    };
    let client = CerebrasClient::new(config.completion.clone(), "test-key").unwrap();
    let controller = FlowController::new(&config, Some(Arc::new(client)));
    let mut session = controller.open_session();
    controller.send(&mut session, "hello").await.unwrap();
    let before = session.len();

    let outcome = controller
        .send(&mut session, "I need help with something")
        .await
        .unwrap();

    assert!(outcome.remote_failed);
    assert_eq!(session.len(), before + 2);
    assert!(session.message(outcome.reply).unwrap().is_error());
    assert!(session
        .messages()
        .iter()
        .all(|m| !m.content().contains("Urgent care")));
}
