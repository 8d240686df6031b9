// ==========================================
// Insight client against a local fake endpoint
// ==========================================

mod common;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::*;
use supply_chain_ops::config::InsightConfig;
use supply_chain_ops::error::InsightError;
use supply_chain_ops::insights::{
    DisabledProvider, HttpInsightClient, InsightPrompt, InsightProvider, Narrative,
};
use supply_chain_ops::logging;

#[derive(Clone, Copy)]
enum Behavior {
    Answer,
    Fail,
    FailOnce,
    Hang,
    Garbage,
}

#[derive(Clone)]
struct Fake {
    behavior: Behavior,
    calls: Arc<AtomicUsize>,
}

async fn chat(
    State(fake): State<Fake>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let call = fake.calls.fetch_add(1, Ordering::SeqCst);
    let user = body["messages"][1]["content"].as_str().unwrap_or_default();
    let answer = json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": format!(
                    "auth={} model={} mentions_slowco={}",
                    headers.get("authorization").is_some(),
                    body["model"].as_str().unwrap_or_default(),
                    user.contains("SlowCo")
                )
            }
        }]
    });
    match fake.behavior {
        Behavior::Answer => (StatusCode::OK, Json(answer)),
        Behavior::Fail => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "boom"})),
        ),
        Behavior::FailOnce if call == 0 => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "busy"})),
        ),
        Behavior::FailOnce => (StatusCode::OK, Json(answer)),
        Behavior::Hang => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            (StatusCode::OK, Json(answer))
        }
        Behavior::Garbage => (StatusCode::OK, Json(json!({"unexpected": true}))),
    }
}

/// Start the fake on an ephemeral port; returns its URL and call counter
async fn spawn_fake(behavior: Behavior) -> (String, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/v1/chat/completions", post(chat))
        .with_state(Fake {
            behavior,
            calls: calls.clone(),
        });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/v1/chat/completions", addr), calls)
}

fn client(endpoint: &str, timeout: Duration) -> HttpInsightClient {
    logging::init_test();
    let mut config = InsightConfig::new(endpoint).with_timeout(timeout);
    config.api_key = Some("test-key".into());
    config.model = "fake-model".into();
    HttpInsightClient::new(config)
        .unwrap()
        .with_retry_delay(Duration::from_millis(10))
}

fn prompt() -> InsightPrompt {
    InsightPrompt {
        system: "analyst".into(),
        user: "SlowCo delays 75%".into(),
    }
}

#[tokio::test]
async fn returns_first_choice_text() {
    let (url, calls) = spawn_fake(Behavior::Answer).await;
    let text = client(&url, Duration::from_secs(2))
        .generate(&prompt())
        .await
        .unwrap();
    assert_eq!(text, "auth=true model=fake-model mentions_slowco=true");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn server_error_is_retried_once_then_reported() {
    let (url, calls) = spawn_fake(Behavior::Fail).await;
    let err = client(&url, Duration::from_secs(2))
        .generate(&prompt())
        .await
        .unwrap_err();
    assert!(matches!(err, InsightError::Status { status: 500, .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn transient_failure_recovers_on_retry() {
    let (url, calls) = spawn_fake(Behavior::FailOnce).await;
    let text = client(&url, Duration::from_secs(2))
        .generate(&prompt())
        .await
        .unwrap();
    assert!(text.starts_with("auth=true"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn slow_service_times_out_within_one_deadline() {
    let (url, calls) = spawn_fake(Behavior::Hang).await;
    let limit = Duration::from_millis(400);
    let started = Instant::now();
    let err = client(&url, limit).generate(&prompt()).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, InsightError::Timeout(_)));
    // The retry shares the first attempt's deadline
    assert!(elapsed < limit + Duration::from_millis(250), "took {:?}", elapsed);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unexpected_body_is_malformed_and_not_retried() {
    let (url, calls) = spawn_fake(Behavior::Garbage).await;
    let err = client(&url, Duration::from_secs(2))
        .generate(&prompt())
        .await
        .unwrap_err();
    assert!(matches!(err, InsightError::Malformed(_)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_narrative_leaves_metrics_identical() {
    let file = sample_csv();

    let (ok_url, _) = spawn_fake(Behavior::Answer).await;
    let working = service(file.path(), Arc::new(client(&ok_url, Duration::from_secs(2))));
    let (bad_url, _) = spawn_fake(Behavior::Fail).await;
    let failing = service(file.path(), Arc::new(client(&bad_url, Duration::from_secs(2))));

    let good = working.insights(None).await.unwrap();
    let bad = failing.insights(None).await.unwrap();

    assert!(good.narrative.is_available());
    assert!(matches!(bad.narrative, Narrative::Unavailable { .. }));
    assert_eq!(good.metrics, bad.metrics);
    assert_eq!(good.risk, bad.risk);
    assert_eq!(good.cost, bad.cost);
    assert_eq!(good.abc, bad.abc);

    let disabled = service(file.path(), Arc::new(DisabledProvider))
        .insights(None)
        .await
        .unwrap();
    assert_eq!(disabled.metrics, good.metrics);
}
