#![allow(clippy::unwrap_used)]
// Integration tests for `GenAiClient` and `CareGuideClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use potpal_api::{CareGuideClient, Error, GenAiClient, GenAiParams, TransportConfig};

async fn genai_setup() -> (MockServer, GenAiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = GenAiClient::new(
        base_url,
        "leafwise-1",
        secrecy::SecretString::from("key-123".to_string()),
        GenAiParams::default(),
        &TransportConfig::default(),
    )
    .unwrap();
    (server, client)
}

#[tokio::test]
async fn generate_content_returns_first_candidate_text() {
    let (server, client) = genai_setup().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/leafwise-1:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "Water basil every " },
                    { "text": "2-3 days." },
                ]}
            }]
        })))
        .mount(&server)
        .await;

    let reply = client.generate_content("How often do I water basil?").await.unwrap();
    assert_eq!(reply, "Water basil every 2-3 days.");
}

#[tokio::test]
async fn generate_content_maps_quota_exhaustion() {
    let (server, client) = genai_setup().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/leafwise-1:generateContent"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "30"))
        .mount(&server)
        .await;

    let err = client.generate_content("hello").await.unwrap_err();
    assert!(matches!(
        err,
        Error::RateLimited {
            retry_after_secs: Some(30)
        }
    ));
}

#[tokio::test]
async fn generate_content_maps_rejected_key() {
    let (server, client) = genai_setup().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/leafwise-1:generateContent"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = client.generate_content("hello").await.unwrap_err();
    assert!(matches!(err, Error::Authentication { .. }));
}

#[tokio::test]
async fn generate_content_rejects_empty_candidates() {
    let (server, client) = genai_setup().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/leafwise-1:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let err = client.generate_content("hello").await.unwrap_err();
    assert!(matches!(err, Error::Api { .. }));
}

// ── Care guide ──────────────────────────────────────────────────────

#[tokio::test]
async fn plant_info_parses_care_sheet() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = CareGuideClient::new(base_url, &TransportConfig::default()).unwrap();

    Mock::given(method("POST"))
        .and(path("/plantinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "plant": "Tomato",
            "sun": "Full sun",
            "water": "1 inch per week",
            "soil": "Well-drained, fertile",
            "harvest": "When ripe and red",
            "extra_care": "Stake the plant and prune suckers",
        })))
        .mount(&server)
        .await;

    let guide = client.plant_info("Tomato").await.unwrap();
    assert_eq!(guide.plant, "Tomato");
    assert_eq!(guide.water, "1 inch per week");
}
