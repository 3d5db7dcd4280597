use std::path::PathBuf;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use riquer_api::build_app;
use serde_json::json;
use tower::ServiceExt;

fn kb_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../kb")
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_is_public() {
    let app = build_app(kb_root()).await.expect("app should build");

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn chat_requires_api_key() {
    let app = build_app(kb_root()).await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "message": "Quin és l'horari de secretaria?"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn absence_intent_answers_with_the_form_action() {
    let app = build_app(kb_root()).await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .header("content-type", "application/json")
        .header("x-api-key", "dev-riquer-key")
        .body(Body::from(
            json!({
                "message": "Vull justificar una falta del meu fill"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = body_json(response).await;
    assert_eq!(parsed["status"], "success");
    assert_eq!(parsed["action"], "show_absence_form");
    assert_eq!(parsed["intent"], "absence");
    assert!(parsed["session_id"].as_str().is_some());
}

#[tokio::test]
async fn unconfigured_backend_yields_the_localized_error_reply() {
    let app = build_app(kb_root()).await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/chat")
        .header("content-type", "application/json")
        .header("x-api-key", "dev-riquer-key")
        .body(Body::from(
            json!({
                "message": "Quin és l'horari de secretaria?"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = body_json(response).await;
    assert_eq!(parsed["status"], "success");
    assert_eq!(parsed["intent"], "none");
    assert_eq!(
        parsed["response"],
        "Ho sento, hi ha hagut un error. Si us plau, torna-ho a intentar."
    );
}

#[tokio::test]
async fn absence_form_rejects_blank_required_fields() {
    let app = build_app(kb_root()).await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/forms/absence")
        .header("content-type", "application/json")
        .header("x-api-key", "dev-riquer-key")
        .body(Body::from(
            json!({
                "alumne": "",
                "curs": "2n ESO A",
                "data": "2024-01-01",
                "motiu": "x"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let parsed = body_json(response).await;
    assert_eq!(parsed["status"], "error");
    assert_eq!(parsed["field"], "alumne");
}

#[tokio::test]
async fn teacher_form_round_trips_to_the_resolved_recipient() {
    let app = build_app(kb_root()).await.expect("app should build");

    let request = Request::builder()
        .method("POST")
        .uri("/v1/forms/teacher")
        .header("content-type", "application/json")
        .header("x-api-key", "dev-riquer-key")
        .body(Body::from(
            json!({
                "professor": "Roger Codina",
                "assumpte": "reunio",
                "missatge": "hola",
                "disponibilitat": ""
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Mailer is unconfigured in tests: delivery fails but the reply still
    // names the resolved teacher address and the flow stays recoverable.
    let parsed = body_json(response).await;
    assert_eq!(parsed["status"], "success");
    assert!(parsed["response"]
        .as_str()
        .unwrap()
        .contains("roger.codina@inscalaf.cat"));
}

#[tokio::test]
async fn teacher_roster_is_listed() {
    let app = build_app(kb_root()).await.expect("app should build");

    let request = Request::builder()
        .uri("/v1/teachers")
        .header("x-api-key", "dev-riquer-key")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = body_json(response).await;
    let teachers = parsed["teachers"].as_array().unwrap();
    assert_eq!(teachers.len(), 4);
    assert!(teachers
        .iter()
        .any(|teacher| teacher["name"] == "Jordi Pipó"));
}

#[tokio::test]
async fn string_table_is_localized_with_catalan_fallback() {
    let app = build_app(kb_root()).await.expect("app should build");

    let request = Request::builder()
        .uri("/v1/strings?lang=es")
        .header("x-api-key", "dev-riquer-key")
        .body(Body::empty())
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed = body_json(response).await;
    assert_eq!(parsed["language"], "spanish");
    assert_eq!(
        parsed["strings"]["chatTitle"],
        "Chat con el Instituto Alexandre de Riquer"
    );

    let request = Request::builder()
        .uri("/v1/strings?lang=klingon")
        .header("x-api-key", "dev-riquer-key")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let parsed = body_json(response).await;
    assert_eq!(parsed["language"], "catalan");
}
