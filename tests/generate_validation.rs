//! Request validation for the cover letter endpoint.
//!
//! None of these requests reach the upstream: the configured base URL points
//! at a port nothing listens on.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use letterpress::{
    config::{ApiKey, Config, UpstreamConfig},
    handlers::{self, AppState},
    metrics::Outcome,
};
use proptest::prelude::*;
use std::sync::Arc;
use tower::ServiceExt;

fn create_test_config() -> Config {
    Config {
        upstream: UpstreamConfig::with_base_url("http://127.0.0.1:9/v1"),
        ..Config::default()
    }
}

fn create_state(api_key: Option<&str>) -> AppState {
    AppState::new(Arc::new(create_test_config()), api_key.map(ApiKey::new))
        .expect("AppState::new should succeed")
}

async fn post_raw(app: Router, content_type: Option<&str>, body: String) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method("POST").uri("/api/generate");
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    let request = builder.body(Body::from(body)).unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).expect("response should be JSON");
    (status, json)
}

async fn post_json(app: Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    post_raw(app, Some("application/json"), body.to_string()).await
}

#[tokio::test]
async fn test_missing_resume_text_is_400() {
    let app = handlers::router(create_state(Some("sk-test")));
    let (status, body) = post_json(
        app,
        serde_json::json!({ "vacancyDescription": "Rust engineer", "tone": "formal" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, serde_json::json!({ "error": "Missing required fields" }));
}

#[tokio::test]
async fn test_missing_vacancy_description_is_400() {
    let app = handlers::router(create_state(Some("sk-test")));
    let (status, body) = post_json(app, serde_json::json!({ "resumeText": "cv" })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");
}

#[tokio::test]
async fn test_empty_required_field_is_400() {
    let app = handlers::router(create_state(Some("sk-test")));
    let (status, _) = post_json(
        app,
        serde_json::json!({ "resumeText": "", "vacancyDescription": "jd" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unparseable_bodies_are_400() {
    let cases: [(Option<&str>, &str); 4] = [
        (Some("application/json"), "{not json"),
        (Some("application/json"), ""),
        (Some("application/json"), r#"["cv", "jd"]"#),
        (None, r#"{"resumeText": "cv", "vacancyDescription": "jd"}"#),
    ];

    for (content_type, body) in cases {
        let app = handlers::router(create_state(Some("sk-test")));
        let (status, json) = post_raw(app, content_type, body.to_string()).await;
        assert_eq!(
            status,
            StatusCode::BAD_REQUEST,
            "body {body:?} with content type {content_type:?} should be 400"
        );
        assert_eq!(json["error"], "Missing required fields");
    }
}

#[tokio::test]
async fn test_falsy_required_values_are_400() {
    for resume in [serde_json::json!(0), serde_json::json!(false), serde_json::Value::Null] {
        let app = handlers::router(create_state(Some("sk-test")));
        let (status, body) = post_json(
            app,
            serde_json::json!({ "resumeText": resume, "vacancyDescription": "jd" }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "resumeText {resume} should be 400");
        assert_eq!(body["error"], "Missing required fields");
    }
}

#[tokio::test]
async fn test_oversized_body_is_413() {
    let state = create_state(Some("sk-test"));
    let app = handlers::router(state.clone());
    let body = serde_json::json!({
        "resumeText": "x".repeat(3 * 1024 * 1024),
        "vacancyDescription": "jd"
    });

    let (status, json) = post_json(app, body).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json, serde_json::json!({ "error": "Request body too large" }));
    assert_eq!(state.metrics().outcome_count(Outcome::PayloadTooLarge), 1);
}

#[tokio::test]
async fn test_missing_credential_is_500() {
    let state = create_state(None);
    let app = handlers::router(state.clone());
    let (status, body) = post_json(
        app,
        serde_json::json!({ "resumeText": "cv", "vacancyDescription": "jd" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        serde_json::json!({ "error": "OpenRouter API key not configured" })
    );
    assert_eq!(state.metrics().outcome_count(Outcome::Misconfigured), 1);
}

#[tokio::test]
async fn test_field_check_runs_before_credential_check() {
    let app = handlers::router(create_state(None));
    let (status, body) = post_json(app, serde_json::json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required fields");
}

#[tokio::test]
async fn test_bad_request_is_counted() {
    let state = create_state(Some("sk-test"));
    let app = handlers::router(state.clone());
    let _ = post_json(app, serde_json::json!({ "resumeText": "cv" })).await;

    assert_eq!(state.metrics().outcome_count(Outcome::BadRequest), 1);
    assert_eq!(state.metrics().outcome_count(Outcome::Success), 0);
}

/// Request body with at least one required field absent or empty
fn incomplete_body() -> impl Strategy<Value = serde_json::Value> {
    let field = prop_oneof![Just(None), Just(Some(String::new())), "[a-z ]{1,20}".prop_map(Some)];
    (field.clone(), field, any::<Option<String>>())
        .prop_filter("one required field must be unusable", |(resume, vacancy, _)| {
            let usable = |f: &Option<String>| f.as_deref().is_some_and(|s| !s.is_empty());
            !(usable(resume) && usable(vacancy))
        })
        .prop_map(|(resume, vacancy, tone)| {
            let mut body = serde_json::Map::new();
            if let Some(resume) = resume {
                body.insert("resumeText".to_string(), resume.into());
            }
            if let Some(vacancy) = vacancy {
                body.insert("vacancyDescription".to_string(), vacancy.into());
            }
            if let Some(tone) = tone {
                body.insert("tone".to_string(), tone.into());
            }
            serde_json::Value::Object(body)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_incomplete_requests_are_400(body in incomplete_body()) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let app = handlers::router(create_state(Some("sk-test")));
        let (status, _) = runtime.block_on(post_json(app, body));
        prop_assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
