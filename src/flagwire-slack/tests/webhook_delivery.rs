//! Delivery behavior against a mock Slack webhook endpoint.

use std::time::Duration;

use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use flagwire_slack::{SlackConfig, SlackMessage, WebhookClient};

fn client() -> WebhookClient {
    WebhookClient::new(&SlackConfig::default())
}

fn message() -> SlackMessage {
    SlackMessage::sectioned(
        "The feature my-flag has been updated by an unknown user",
        "The feature *my-flag* has been updated by an unknown user.",
    )
}

#[tokio::test]
async fn test_acknowledged_delivery_returns_true() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/T/B/x"))
        .and(body_partial_json(serde_json::json!({
            "text": "The feature my-flag has been updated by an unknown user"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/services/T/B/x", server.uri());
    assert!(client().send_message(&message(), &url).await);
}

#[tokio::test]
async fn test_rejected_delivery_returns_false() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no_service"))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/services/T/B/x", server.uri());
    assert!(!client().send_message(&message(), &url).await);
}

#[tokio::test]
async fn test_server_error_returns_false_without_panicking() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let url = format!("{}/hook", server.uri());
    assert!(!client().send_message(&message(), &url).await);
}

#[tokio::test]
async fn test_unreachable_endpoint_returns_false() {
    // Reserved port with nothing listening.
    let url = "http://127.0.0.1:9/hook";
    assert!(!client().send_message(&message(), url).await);
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let config = SlackConfig::default().with_delivery_timeout(Duration::from_millis(100));
    let client = WebhookClient::new(&config);

    let url = format!("{}/hook", server.uri());
    assert!(!client.send_message(&message(), &url).await);
}

#[tokio::test]
async fn test_oversized_response_body_does_not_change_outcome() {
    let server = MockServer::start().await;
    // Well past the 500-byte read cap.
    let huge = "x".repeat(64 * 1024);
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(huge.clone()))
        .mount(&server)
        .await;

    let url = format!("{}/hook", server.uri());
    assert!(client().send_message(&message(), &url).await);

    // Same oversized body on a rejection still yields a clean false.
    let rejecting = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_string(huge))
        .mount(&rejecting)
        .await;

    let url = format!("{}/hook", rejecting.uri());
    assert!(!client().send_message(&message(), &url).await);
}

#[tokio::test]
async fn test_message_is_posted_as_block_kit_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "blocks": [{
                "type": "section",
                "text": { "type": "mrkdwn" }
            }]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/hook", server.uri());
    assert!(client().send_message(&message(), &url).await);
}
