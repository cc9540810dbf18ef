//! Integration tests for the extraction service
//!
//! These run the real chat-completions backend against a WireMock server.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use mindmap_extractor::ExtractorConfig;
use mindmap_server::{
    build_extractor, cors_layer,
    handlers::{create_router, AppState, ErrorResponse, HealthResponse},
};
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt; // for oneshot
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

const GOVERNMENT_TEXT: &str =
    "தமிழ்நாடு அரசின் நிர்வாகம் சென்னையில் உள்ள தலைமை செயலகம் மூலம் நடைபெறுகிறது.";

/// Helper to build an app whose backend points at the mock server
fn create_test_app(server: &MockServer, timeout_secs: u64) -> Router {
    let mut config = ExtractorConfig::local(format!("{}{}", server.uri(), COMPLETIONS_PATH));
    config.timeout_secs = timeout_secs;
    let extractor = build_extractor(&config).unwrap();
    create_router(AppState::new(extractor))
}

fn completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "meta-llama-3.1-8b-instruct",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ]
    })
}

async fn mount_reply(server: &MockServer, template: ResponseTemplate, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(template)
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn extract_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/extract_keywords")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let server = MockServer::start().await;
    let app = create_test_app(&server, 5);

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let health: HealthResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_fenced_reply_end_to_end() {
    let server = MockServer::start().await;
    let reply = "```\n{\"title\":\"அரசு கட்டமைப்பு\",\"keywords\":[\"தமிழ்நாடு\",\"தலைமை செயலகம்\"]}\n```";
    mount_reply(&server, ResponseTemplate::new(200).set_body_json(completion(reply)), 1).await;
    let app = create_test_app(&server, 5);

    let body = json!({ "text": GOVERNMENT_TEXT }).to_string();
    let response = app.oneshot(extract_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "title": "அரசு கட்டமைப்பு",
            "keywords": ["தமிழ்நாடு", "தலைமை செயலகம்"]
        })
    );
}

#[tokio::test]
async fn test_paragraph_key_is_accepted() {
    let server = MockServer::start().await;
    let reply = r#"{"title":"அரசு","keywords":[{"level1":"தமிழ்நாடு","level2":["சென்னை"]}]}"#;
    mount_reply(&server, ResponseTemplate::new(200).set_body_json(completion(reply)), 1).await;
    let app = create_test_app(&server, 5);

    let body = json!({ "paragraph": GOVERNMENT_TEXT }).to_string();
    let response = app.oneshot(extract_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["keywords"][0]["level1"], "தமிழ்நாடு");
    assert_eq!(json["keywords"][0]["level2"][0], "சென்னை");
}

#[tokio::test]
async fn test_missing_text_never_calls_backend() {
    let server = MockServer::start().await;
    mount_reply(&server, ResponseTemplate::new(200).set_body_json(completion("{}")), 0).await;

    for body in [r#"{}"#, r#"{"text": ""}"#, r#"{"text": "   ", "paragraph": ""}"#, "not json"] {
        let app = create_test_app(&server, 5);
        let response = app.oneshot(extract_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        let error: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(error.error, "Missing text");
        assert!(error.raw_output.is_none());
    }
}

#[tokio::test]
async fn test_unreadable_body_reports_reason() {
    let server = MockServer::start().await;
    mount_reply(&server, ResponseTemplate::new(200).set_body_json(completion("{}")), 0).await;

    // Tamil text present but sent without a JSON content type
    let app = create_test_app(&server, 5);
    let request = Request::builder()
        .method("POST")
        .uri("/extract_keywords")
        .body(Body::from(json!({ "text": "தமிழ்நாடு அரசு" }).to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(error.error, "Missing text");
    assert!(!error.details.contains("empty"), "details: {}", error.details);
    assert!(error.details.contains("Content-Type"), "details: {}", error.details);

    // Wrong type for the text field
    let app = create_test_app(&server, 5);
    let response = app.oneshot(extract_request(r#"{"text": 42}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let error: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert!(!error.details.contains("empty"), "details: {}", error.details);
    assert!(error.details.contains("text"), "details: {}", error.details);
}

#[tokio::test]
async fn test_backend_500_is_backend_error() {
    let server = MockServer::start().await;
    mount_reply(
        &server,
        ResponseTemplate::new(500).set_body_string("model crashed"),
        1,
    )
    .await;
    let app = create_test_app(&server, 5);

    let body = json!({ "text": GOVERNMENT_TEXT }).to_string();
    let response = app.oneshot(extract_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let error: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(error.error, "Backend API error");
    assert_eq!(error.status, Some(500));
    assert!(error.details.contains("500"));
    assert!(error.details.contains("model crashed"));
    assert!(error.raw_output.is_none());
}

#[tokio::test]
async fn test_malformed_output_includes_raw() {
    let server = MockServer::start().await;
    mount_reply(
        &server,
        ResponseTemplate::new(200).set_body_json(completion("{not json")),
        1,
    )
    .await;
    let app = create_test_app(&server, 5);

    let body = json!({ "text": GOVERNMENT_TEXT }).to_string();
    let response = app.oneshot(extract_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(error.error, "Malformed model output");
    assert_eq!(error.raw_output.as_deref(), Some("{not json"));
}

#[tokio::test]
async fn test_schema_violation_names_field() {
    let server = MockServer::start().await;
    mount_reply(
        &server,
        ResponseTemplate::new(200).set_body_json(completion(r#"{"keywords":["தமிழ்நாடு"]}"#)),
        1,
    )
    .await;
    let app = create_test_app(&server, 5);

    let body = json!({ "text": GOVERNMENT_TEXT }).to_string();
    let response = app.oneshot(extract_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(error.error, "Schema violation");
    assert!(error.details.contains("'title'"));
}

#[tokio::test]
async fn test_slow_backend_is_gateway_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion(r#"{"title":"t","keywords":[]}"#))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    let app = create_test_app(&server, 1);

    let body = json!({ "text": GOVERNMENT_TEXT }).to_string();
    let response = app.oneshot(extract_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    let error: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(error.error, "Backend timeout");
}

#[tokio::test]
async fn test_unreachable_backend_is_service_unavailable() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = ExtractorConfig::local(format!("http://127.0.0.1:{}{}", port, COMPLETIONS_PATH));
    let app = create_router(AppState::new(build_extractor(&config).unwrap()));

    let body = json!({ "text": GOVERNMENT_TEXT }).to_string();
    let response = app.oneshot(extract_request(&body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let error: ErrorResponse = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(error.error, "Backend unavailable");
}

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() {
    let server = MockServer::start().await;
    let app = create_test_app(&server, 5).layer(cors_layer(&["*".to_string()]).unwrap());

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .header("origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}
