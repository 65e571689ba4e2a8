use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use safecross_core::config::ProximityConfig;
use safecross_core::mocks::{MockSynthesizer, FAKE_MP3};
use safecross_core::SignalLocation;
use safecross_gateway::{GatewayConfig, GatewayServer};
use safecross_proximity::ProximityMonitor;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn signals() -> Vec<SignalLocation> {
    vec![
        SignalLocation::new(1, -22.2210, -54.8060, "Av. Marcelino Pires"),
        SignalLocation::new(2, -22.2231, -54.8121, "Rua Hayel Bon Faker"),
    ]
}

fn app_with(synthesizer: Arc<MockSynthesizer>) -> Router {
    let monitor = ProximityMonitor::new(ProximityConfig::default(), signals());
    GatewayServer::new(GatewayConfig::default(), synthesizer, monitor).build_router()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
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
async fn test_health_endpoint() {
    let app = app_with(Arc::new(MockSynthesizer::mp3()));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_tts_returns_mp3_bytes() {
    let synth = Arc::new(MockSynthesizer::mp3());
    let app = app_with(synth.clone());

    let response = app
        .oneshot(post_json("/api/tts", &json!({"text": "Olá"}).to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(
        response.headers()[header::CONTENT_LENGTH],
        FAKE_MP3.len().to_string().as_str()
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], FAKE_MP3);

    let requests = synth.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].text, "Olá");
    assert_eq!(requests[0].speaking_rate, None);
}

#[tokio::test]
async fn test_tts_forwards_delivery_parameters() {
    let synth = Arc::new(MockSynthesizer::mp3());
    let app = app_with(synth.clone());

    let response = app
        .oneshot(post_json(
            "/api/tts",
            &json!({"text": "Atenção", "speaking_rate": 1.25, "pitch": 4.0}).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let requests = synth.requests();
    assert_eq!(requests[0].speaking_rate, Some(1.25));
    assert_eq!(requests[0].pitch, Some(4.0));
}

#[tokio::test]
async fn test_tts_rejects_missing_text() {
    let synth = Arc::new(MockSynthesizer::mp3());

    for body in ["{}", r#"{"text": ""}"#, r#"{"text": "   "}"#, r#"{"text": 42}"#, "not json"] {
        let response = app_with(synth.clone())
            .oneshot(post_json("/api/tts", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(body_json(response).await["error"], "Texto não fornecido");
    }

    assert!(synth.requests().is_empty());
}

#[tokio::test]
async fn test_tts_backend_failure_is_500() {
    let app = app_with(Arc::new(MockSynthesizer::failing("PERMISSION_DENIED")));

    let response = app
        .oneshot(post_json("/api/tts", r#"{"text": "Olá"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let message = body_json(response).await["error"].as_str().unwrap().to_string();
    assert!(!message.is_empty());
    assert!(message.contains("PERMISSION_DENIED"));
}

#[tokio::test]
async fn test_tts_rejection_from_chained_backend_is_500() {
    let app = app_with(Arc::new(MockSynthesizer::rejecting("Texto não fornecido")));

    let response = app
        .oneshot(post_json("/api/tts", r#"{"text": "Olá"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let message = body_json(response).await["error"].as_str().unwrap().to_string();
    assert!(message.contains("Texto não fornecido"));
}

#[tokio::test]
async fn test_tts_empty_audio_is_500() {
    let app = app_with(Arc::new(MockSynthesizer::returning(Vec::<u8>::new())));

    let response = app
        .oneshot(post_json("/api/tts", r#"{"text": "Olá"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(response).await["error"].as_str().unwrap().contains("No audio"));
}

#[tokio::test]
async fn test_signals_endpoint() {
    let app = app_with(Arc::new(MockSynthesizer::mp3()));

    let response = app
        .oneshot(Request::builder().uri("/api/signals").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 2);
    assert_eq!(json[0]["name"], "Av. Marcelino Pires");
}

#[tokio::test]
async fn test_proximity_endpoint() {
    let app = app_with(Arc::new(MockSynthesizer::mp3()));

    let response = app
        .oneshot(post_json("/api/proximity", r#"{"lat": -22.2231, "lng": -54.8124}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["location_unavailable"], false);
    assert_eq!(json["alert"]["signal_id"], 2);
    assert_eq!(json["alert"]["direction"], "right");
    assert_eq!(json["alert"]["tier"], "approaching");
    assert_eq!(json["utterance"], "Rua Hayel Bon Faker at 31 meters right");
}

#[tokio::test]
async fn test_proximity_without_fix_uses_default_position() {
    let app = app_with(Arc::new(MockSynthesizer::mp3()));

    let response = app
        .oneshot(post_json("/api/proximity", "{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["location_unavailable"], true);
    assert_eq!(json["position"]["lat"], -22.2231);
    assert_eq!(json["alert"]["signal_id"], 2);
}

#[tokio::test]
async fn test_proximity_with_no_signals() {
    let monitor = ProximityMonitor::new(ProximityConfig::default(), Vec::new());
    let app = GatewayServer::new(
        GatewayConfig::default(),
        Arc::new(MockSynthesizer::mp3()),
        monitor,
    )
    .build_router();

    let response = app
        .oneshot(post_json("/api/proximity", r#"{"lat": 0.0, "lng": 0.0}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["alert"].is_null());
    assert!(json["utterance"].is_null());
}
