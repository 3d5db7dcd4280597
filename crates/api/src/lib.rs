mod rate_limit;

use std::env;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::{Json, Query, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use riquer_agent::AssistantAgent;
use riquer_core::{
    i18n, localize, AbsenceForm, ChatInput, Language, MessageKey, TeacherContactForm,
    ValidationError,
};
use riquer_gateway::{ChatBackend, InstituteContext, Mailer};
use riquer_observability::AppMetrics;
use riquer_storage::Store;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::rate_limit::IpRateLimiter;

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<AssistantAgent<Store>>,
    pub metrics: Arc<AppMetrics>,
    pub api_key: String,
    pub limiter: IpRateLimiter,
    pub allowed_origins: Arc<Vec<String>>,
    pub database_configured: bool,
    pub context_files_loaded: usize,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    timestamp_utc: String,
    metrics: riquer_observability::MetricsSnapshot,
    capabilities: HealthCapabilities,
}

#[derive(Debug, Serialize)]
struct HealthCapabilities {
    backend_configured: bool,
    mailer_configured: bool,
    database_configured: bool,
    context_files_loaded: usize,
}

#[derive(Debug, Clone, Deserialize)]
struct StringsQuery {
    lang: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct AbsenceFormRequest {
    #[serde(flatten)]
    form: AbsenceForm,
    session_id: Option<String>,
    language: Option<String>,
    user_name: Option<String>,
    user_contact: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct TeacherFormRequest {
    #[serde(flatten)]
    form: TeacherContactForm,
    session_id: Option<String>,
    language: Option<String>,
    user_name: Option<String>,
    user_contact: Option<String>,
}

pub async fn build_app(kb_root: impl AsRef<Path>) -> Result<Router> {
    let metrics = AppMetrics::shared();

    let context = Arc::new(InstituteContext::load(kb_root).context("failed loading institute context")?);

    let backend = match env::var("RIQUER_BACKEND_URL") {
        Ok(url) if !url.trim().is_empty() => ChatBackend::http(
            url,
            env::var("RIQUER_BACKEND_API_KEY").ok(),
            context.clone(),
        )?,
        _ => ChatBackend::disabled(),
    };

    let mailer = match (
        env::var("RIQUER_MAILGUN_API_KEY"),
        env::var("RIQUER_MAILGUN_DOMAIN"),
    ) {
        (Ok(api_key), Ok(domain)) => {
            let from = env::var("RIQUER_MAIL_FROM").unwrap_or_else(|_| {
                "Institut Alexandre de Riquer <riquer@inscalaf.cat>".to_string()
            });
            Mailer::mailgun(api_key, domain, from)?
        }
        _ => Mailer::disabled(),
    };

    let store = if let Ok(database_url) = env::var("RIQUER_DATABASE_URL") {
        Store::sqlite(&database_url).await?
    } else {
        Store::memory()
    };
    let database_configured = matches!(store, Store::Sqlite(_));

    let absence_recipient = env::var("RIQUER_ABSENCE_RECIPIENT")
        .unwrap_or_else(|_| "consergeria@inscalaf.cat".to_string());

    let agent = Arc::new(AssistantAgent::new(
        backend,
        mailer,
        Arc::new(store),
        metrics.clone(),
        absence_recipient,
    ));

    let api_key = env::var("RIQUER_API_KEY").unwrap_or_else(|_| "dev-riquer-key".to_string());
    let rate_limit_window = Duration::from_secs(
        env::var("RIQUER_RATE_LIMIT_WINDOW_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(60),
    );
    let rate_limit_max = env::var("RIQUER_RATE_LIMIT_MAX")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(80);

    let state = ApiState {
        agent,
        metrics,
        api_key,
        limiter: IpRateLimiter::new(rate_limit_window, rate_limit_max),
        allowed_origins: Arc::new(parse_allowed_origins()),
        database_configured,
        context_files_loaded: context.files().len(),
    };

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/chat", post(chat))
        .route("/v1/teachers", get(teachers))
        .route("/v1/forms/absence", post(submit_absence_form))
        .route("/v1/forms/teacher", post(submit_teacher_form))
        .route("/v1/strings", get(ui_strings))
        .layer(build_cors_layer(&state.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(64 * 1024))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api_key_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        service: "Riquer Assistant",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        metrics: state.metrics.snapshot(),
        capabilities: HealthCapabilities {
            backend_configured: state.agent.backend_configured(),
            mailer_configured: state.agent.mailer_configured(),
            database_configured: state.database_configured,
            context_files_loaded: state.context_files_loaded,
        },
    };
    (StatusCode::OK, Json(payload))
}

async fn chat(State(state): State<ApiState>, Json(input): Json<ChatInput>) -> Response {
    match state.agent.handle_message(input).await {
        Ok(reply) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "success",
                "response": reply.reply_text,
                "action": reply.action,
                "language": reply.language,
                "intent": reply.intent,
                "session_id": reply.session_id,
            })),
        )
            .into_response(),
        Err(error) => {
            tracing::error!(%error, "chat handling failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "status": "error",
                    "error": "Error processant la consulta"
                })),
            )
                .into_response()
        }
    }
}

async fn teachers(State(state): State<ApiState>) -> Response {
    match state.agent.teachers().await {
        Ok(teachers) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "success",
                "teachers": teachers,
            })),
        )
            .into_response(),
        Err(error) => {
            tracing::error!(%error, "teacher listing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "status": "error",
                    "error": "Error obtenint professors"
                })),
            )
                .into_response()
        }
    }
}

async fn submit_absence_form(
    State(state): State<ApiState>,
    Json(request): Json<AbsenceFormRequest>,
) -> Response {
    let language = Language::from_optional_str(request.language.as_deref()).unwrap_or_default();

    let serialized = match request.form.serialize() {
        Ok(serialized) => serialized,
        Err(error) => return validation_response(error, language),
    };

    chat(
        State(state),
        Json(ChatInput {
            session_id: request.session_id,
            message: serialized,
            language: request.language,
            user_name: request.user_name,
            user_contact: request.user_contact,
        }),
    )
    .await
}

async fn submit_teacher_form(
    State(state): State<ApiState>,
    Json(request): Json<TeacherFormRequest>,
) -> Response {
    let language = Language::from_optional_str(request.language.as_deref()).unwrap_or_default();

    let serialized = match request.form.serialize() {
        Ok(serialized) => serialized,
        Err(error) => return validation_response(error, language),
    };

    chat(
        State(state),
        Json(ChatInput {
            session_id: request.session_id,
            message: serialized,
            language: request.language,
            user_name: request.user_name,
            user_contact: request.user_contact,
        }),
    )
    .await
}

fn validation_response(error: ValidationError, language: Language) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(serde_json::json!({
            "status": "error",
            "error": localize(language, MessageKey::FillAllFields),
            "field": error.field,
        })),
    )
        .into_response()
}

async fn ui_strings(Query(query): Query<StringsQuery>) -> impl IntoResponse {
    let language =
        Language::from_optional_str(query.lang.as_deref()).unwrap_or_default();

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "success",
            "language": language,
            "strings": i18n::ui_strings(language),
        })),
    )
}

fn parse_allowed_origins() -> Vec<String> {
    env::var("RIQUER_ALLOWED_ORIGINS")
        .map(|raw| {
            raw.split(',')
                .map(|origin| origin.trim().trim_end_matches('/').to_string())
                .filter(|origin| !origin.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn build_cors_layer(allowed_origins: &Arc<Vec<String>>) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();
    let origins = if origins.is_empty() {
        vec![HeaderValue::from_static("http://localhost:8000")]
    } else {
        origins
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-api-key"),
        ])
}

fn is_public_endpoint(path: &str) -> bool {
    matches!(path, "/health")
}

async fn api_key_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if request.method() == Method::OPTIONS || is_public_endpoint(path.as_str()) {
        return next.run(request).await;
    }

    let header_key = request
        .headers()
        .get("x-api-key")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if header_key != state.api_key {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "error": "unauthorized",
                "message": "missing or invalid x-api-key"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS
        || is_public_endpoint(request.uri().path())
    {
        return next.run(request).await;
    }

    let ip = request_ip(&request);
    if !state.limiter.allow(&ip) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "error": "rate_limited",
                "message": "rate limit exceeded for this IP"
            })),
        )
            .into_response();
    }

    next.run(request).await
}

fn request_ip(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(',')
                .next()
                .unwrap_or("unknown")
                .trim()
                .to_string()
        })
        .unwrap_or_else(|| "local".to_string())
}
