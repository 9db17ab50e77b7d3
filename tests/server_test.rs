mod common;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use tastebud::server::{ServiceState, router};

fn loaded_app() -> Router {
    router(ServiceState::new(common::trained_predictor()))
}

fn unloaded_app() -> Router {
    router(ServiceState::unloaded())
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_root() {
    let (status, body) = send(unloaded_app(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sentiment Analysis API");
    assert_eq!(body["status"], "running");
    assert_eq!(body["endpoints"]["predict"], "/predict");
    assert_eq!(body["version"], tastebud::VERSION);
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(loaded_app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "healthy", "model_loaded": true, "vectorizer_loaded": true})
    );

    let (status, body) = send(unloaded_app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"status": "unhealthy", "model_loaded": false, "vectorizer_loaded": false})
    );
}

#[tokio::test]
async fn test_predict() {
    let request = post_json("/predict", json!({"review": "Great food and amazing service!"}));
    let (status, body) = send(loaded_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["review"], "Great food and amazing service!");
    assert_eq!(body["sentiment"], "positive");
    assert_eq!(body["prediction"], 1);
    let confidence = body["confidence"].as_f64().unwrap();
    assert!((0.5..=1.0).contains(&confidence));
}

#[tokio::test]
async fn test_predict_label_matches_prediction() {
    let app = loaded_app();
    for review in ["Terrible and rude", "Delicious and fresh", "the and of", "ok"] {
        let (status, body) = send(app.clone(), post_json("/predict", json!({"review": review}))).await;
        assert_eq!(status, StatusCode::OK);
        let positive = body["sentiment"] == "positive";
        assert_eq!(positive, body["prediction"] == 1, "{review}");
    }
}

#[tokio::test]
async fn test_predict_blank_review() {
    for review in ["", "   "] {
        let (status, body) = send(loaded_app(), post_json("/predict", json!({"review": review}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Review text cannot be empty");
    }
}

#[tokio::test]
async fn test_predict_without_model() {
    let (status, body) = send(
        unloaded_app(),
        post_json("/predict", json!({"review": "Great food"})),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["detail"],
        "Model not loaded. Please ensure the model files exist."
    );
}

#[tokio::test]
async fn test_batch_without_model() {
    let (status, body) = send(
        unloaded_app(),
        post_json("/predict/batch", json!(["Great food"])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["detail"],
        "Model not loaded. Please ensure the model files exist."
    );
}

#[tokio::test]
async fn test_predict_missing_field() {
    let (status, _) = send(loaded_app(), post_json("/predict", json!({"text": "hi"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_batch() {
    let request = post_json(
        "/predict/batch",
        json!(["Great food", "", "Terrible service"]),
    );
    let (status, body) = send(loaded_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["review"], "Great food");
    assert_eq!(results[0]["sentiment"], "positive");
    assert_eq!(results[1], json!({"review": "", "error": "Empty review text"}));
    assert_eq!(results[2]["review"], "Terrible service");
    assert_eq!(results[2]["sentiment"], "negative");
}

#[tokio::test]
async fn test_batch_empty_list() {
    let (status, body) = send(loaded_app(), post_json("/predict/batch", json!([]))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Reviews list cannot be empty");
}

#[tokio::test]
async fn test_cors_headers() {
    let request = Request::builder()
        .uri("/health")
        .header("origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = loaded_app().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}
