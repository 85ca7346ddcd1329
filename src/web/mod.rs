// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! JSON API over the auto-fill pipeline

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::autofill::{Autofill, AutofillOutcome, FormState};
use crate::config::{AppConfig, UploadConfig};
use crate::inference::{InferredDetails, Rule};
use crate::upload::Upload;
use crate::{CertscanError, Result};

/// Shared application state
pub struct AppState {
    pub autofill: Autofill,
    pub config: AppConfig,
}

/// Request body limit that still admits the largest accepted upload.
///
/// Content arrives base64 encoded inside JSON, so the raw limit grows by
/// 4/3 plus room for the file name and form fields.
pub fn body_limit(upload: &UploadConfig) -> usize {
    const JSON_SLACK: u64 = 64 * 1024;
    let encoded = upload.max_bytes.saturating_add(2) / 3 * 4;
    usize::try_from(encoded.saturating_add(JSON_SLACK)).unwrap_or(usize::MAX)
}

/// Create the web application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let limit = body_limit(&state.config.upload);

    Router::new()
        .route("/api/health", get(api_health))
        .route("/api/rules", get(api_rules))
        .route("/api/infer", post(api_infer))
        .route("/api/autofill", post(api_autofill))
        .layer(DefaultBodyLimit::max(limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the web server
pub async fn start_server(config: AppConfig, autofill: Autofill) -> Result<()> {
    let addr = format!("{}:{}", config.web.host, config.web.port);
    let state = Arc::new(AppState { autofill, config });

    let app = create_router(state);

    info!("Web API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Error body for rejected requests
struct ApiError(StatusCode, String);

impl From<CertscanError> for ApiError {
    fn from(e: CertscanError) -> Self {
        let status = if e.is_rejection() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else if matches!(e, CertscanError::Decode(_)) {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        ApiError(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(serde_json::json!({ "error": self.1 }))).into_response()
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    ocr: Option<&'static str>,
}

async fn api_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        ocr: state.autofill.recognizer_name(),
    })
}

async fn api_rules(State(state): State<Arc<AppState>>) -> Json<&'static [Rule]> {
    Json(state.autofill.rules().rules())
}

#[derive(Deserialize)]
struct InferRequest {
    #[serde(default)]
    text: String,
}

async fn api_infer(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InferRequest>,
) -> Json<InferredDetails> {
    Json(state.autofill.rules().infer(&request.text))
}

#[derive(Deserialize)]
struct AutofillRequest {
    file_name: String,
    /// Base64 file content
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    form: FormState,
}

async fn api_autofill(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AutofillRequest>,
) -> std::result::Result<Json<AutofillOutcome>, ApiError> {
    let bytes = match request.content {
        Some(ref content) => general_purpose::STANDARD.decode(content.trim())?,
        None => Vec::new(),
    };
    let upload = Upload::new(request.file_name, bytes);
    let outcome = state.autofill.autofill(&upload, request.form).await?;
    Ok(Json(outcome))
}

impl From<base64::DecodeError> for ApiError {
    fn from(e: base64::DecodeError) -> Self {
        CertscanError::from(e).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn app() -> Router {
        app_with(AppConfig::default())
    }

    fn app_with(config: AppConfig) -> Router {
        create_router(Arc::new(AppState {
            autofill: Autofill::new(None),
            config,
        }))
    }

    async fn post_json(uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        send_json(app(), uri, body).await
    }

    async fn send_json(
        app: Router,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null))
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok", "ocr": null}));
    }

    #[tokio::test]
    async fn test_rules_listed_in_order() {
        let response = app()
            .oneshot(Request::builder().uri("/api/rules").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let rules = json.as_array().unwrap();
        assert_eq!(rules[0]["name"], "google");
        assert_eq!(rules[0]["stage"], "organization");
        assert_eq!(rules.last().unwrap()["name"], "fifty-days");
    }

    #[tokio::test]
    async fn test_infer() {
        let (status, json) = post_json("/api/infer", serde_json::json!({"text": "python_test_2022"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, serde_json::json!({
            "title": "Python Programming",
            "category": "Certification",
            "year": "2022",
        }));
    }

    #[tokio::test]
    async fn test_autofill_keeps_typed_title() {
        let (status, json) = post_json("/api/autofill", serde_json::json!({
            "file_name": "aws_python_2023.pdf",
            "content": general_purpose::STANDARD.encode(b"%PDF-1.4"),
            "form": {"title": "My own title"},
        })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["source"], "file_name");
        assert_eq!(json["form"]["title"], "My own title");
        assert_eq!(json["form"]["organization"], "AWS");
        assert_eq!(json["form"]["duration"], "2023");
        assert_eq!(json["notice"]["kind"], "filled");
    }

    #[tokio::test]
    async fn test_autofill_rejects_unsupported_type() {
        let (status, json) = post_json("/api/autofill", serde_json::json!({
            "file_name": "virus.exe",
        })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json["error"].as_str().unwrap().contains("virus.exe"));
    }

    #[tokio::test]
    async fn test_autofill_bad_base64() {
        let (status, _) = post_json("/api/autofill", serde_json::json!({
            "file_name": "cert.png",
            "content": "%%% not base64 %%%",
        })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_autofill_accepts_upload_near_size_limit() {
        let content = general_purpose::STANDARD.encode(vec![0u8; 3 * 1024 * 1024]);
        let (status, json) = post_json("/api/autofill", serde_json::json!({
            "file_name": "aws_certificate_2023.pdf",
            "content": content,
        })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["form"]["organization"], "AWS");
        assert_eq!(json["form"]["duration"], "2023");
    }

    #[tokio::test]
    async fn test_body_limit_follows_upload_config() {
        let mut config = AppConfig::default();
        config.upload.max_bytes = 1024;
        assert!(body_limit(&config.upload) < 128 * 1024);

        let content = general_purpose::STANDARD.encode(vec![0u8; 512 * 1024]);
        let (status, _) = send_json(app_with(config), "/api/autofill", serde_json::json!({
            "file_name": "cert.pdf",
            "content": content,
        })).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

        let default_limit = body_limit(&AppConfig::default().upload);
        assert!(default_limit >= 5 * 1024 * 1024 / 3 * 4);
    }
}
