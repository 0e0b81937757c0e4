use std::time::Duration;

use axum::{http::StatusCode, routing::post, Json, Router};
use harvest_core::{AskError, AskService, AssistantView, QaClient, ViewMode};
use serde_json::{json, Value};

async fn spawn_service(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn harvest_answers(Json(body): Json<Value>) -> Json<Value> {
    let question = body["question"].as_str().unwrap_or_default().to_lowercase();
    let answer = if question.contains("wheat") {
        "Check moisture ≤ 13%."
    } else if question.contains("tomato") {
        "Pick when uniformly red and slightly soft."
    } else {
        ""
    };
    Json(json!({ "answer": answer }))
}

fn harvest_router() -> Router {
    Router::new().route("/ask", post(harvest_answers))
}

#[tokio::test]
async fn test_submit_question_end_to_end() {
    let url = spawn_service(harvest_router()).await;
    let client = QaClient::new(&url);
    let mut view = AssistantView::new();

    *view.question_mut() = "When should I harvest wheat?".to_string();
    let id = view.submit_with(&client).await.unwrap();

    assert_eq!(view.mode(), ViewMode::Viewing(id));
    let item = view.selected().unwrap();
    assert_eq!(item.question, "When should I harvest wheat?");
    assert_eq!(item.answer, "Check moisture ≤ 13%.");
    assert_eq!(view.question(), "");
}

#[tokio::test]
async fn test_request_carries_question_field() {
    let router = Router::new().route(
        "/ask",
        post(|Json(body): Json<Value>| async move {
            Json(json!({ "answer": format!("you asked: {}", body["question"].as_str().unwrap_or("?")) }))
        }),
    );
    let url = spawn_service(router).await;

    let answer = QaClient::new(&url).ask("Is my barley ready?").await.unwrap();
    assert_eq!(answer.text, "you asked: Is my barley ready?");
}

#[tokio::test]
async fn test_empty_answer_leaves_history_unchanged() {
    let url = spawn_service(harvest_router()).await;
    let client = QaClient::new(&url);
    let mut view = AssistantView::new();

    *view.question_mut() = "What about quinoa?".to_string();
    assert!(view.submit_with(&client).await.is_none());
    assert!(view.history().is_empty());
    assert_eq!(view.failure(), None);
}

#[tokio::test]
async fn test_missing_answer_field_is_empty() {
    let router = Router::new().route("/ask", post(|| async { Json(json!({ "detail": "no" })) }));
    let url = spawn_service(router).await;

    let answer = QaClient::new(&url).ask("wheat?").await.unwrap();
    assert_eq!(answer.text, "");
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let router = Router::new().route(
        "/ask",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let url = spawn_service(router).await;

    let err = QaClient::new(&url).ask("wheat?").await.unwrap_err();
    assert!(matches!(err, AskError::Status(500)));
}

#[tokio::test]
async fn test_non_json_body_is_an_error() {
    let router = Router::new().route("/ask", post(|| async { "plain text" }));
    let url = spawn_service(router).await;
    let client = QaClient::new(&url);
    let mut view = AssistantView::new();

    *view.question_mut() = "wheat?".to_string();
    assert!(view.submit_with(&client).await.is_none());
    assert_eq!(view.question(), "wheat?");
    assert!(view.failure().unwrap().contains("malformed body"));

    let err = client.ask("wheat?").await.unwrap_err();
    assert!(matches!(err, AskError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = QaClient::new(&format!("http://{}", addr))
        .ask("wheat?")
        .await
        .unwrap_err();
    assert!(matches!(err, AskError::Transport(_)));
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let router = Router::new().route(
        "/ask",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "answer": "too late" }))
        }),
    );
    let url = spawn_service(router).await;

    let client = QaClient::with_timeout(&url, Duration::from_millis(100)).unwrap();
    let err = client.ask("wheat?").await.unwrap_err();
    assert!(matches!(err, AskError::Transport(ref e) if e.is_timeout()));
}
