//! HTTP surface: routing, middleware and the two generation endpoints.

use crate::ai::mime::resolve_upload_mime;
use crate::app::App;
use crate::avatar::{FIELD_NAME, MAX_UPLOAD_BYTES};
use crate::models::{AvatarResult, ErrorBody, SkillRequest, SkillResult, UploadedImage};
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, get_service, post};
use axum::{Json, Router};
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

pub const SKILL_FAILURE_MESSAGE: &str = "AI request failed";
pub const AVATAR_FAILURE_MESSAGE: &str = "avatar generation failed";

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

const DEFAULT_UPLOAD_NAME: &str = "photo.png";

/// Errors returned to the browser as `{ "error": ... }`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

pub fn router(app: Arc<App>) -> Router {
    let index = get_service(ServeFile::new(app.index_html()));

    Router::new()
        .route("/", index)
        .route("/healthz", get(healthz))
        .route("/api/generate-skill", post(generate_skill))
        .route(
            "/api/generate-avatar",
            post(generate_avatar)
                .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES)),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn generate_skill(
    State(app): State<Arc<App>>,
    payload: Result<Json<SkillRequest>, JsonRejection>,
) -> Result<Json<SkillResult>, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("Unreadable skill request body: {}", rejection.body_text());
            SkillRequest::default()
        }
    };

    let intro = request
        .intro()
        .ok_or_else(|| ApiError::BadRequest("intro is required".to_string()))?;

    match app.skill().generate(intro).await {
        Ok(skill) => Ok(Json(skill)),
        Err(e) => {
            error!("AI error while generating skill: {}", e);
            Err(ApiError::Internal(SKILL_FAILURE_MESSAGE.to_string()))
        }
    }
}

async fn generate_avatar(
    State(app): State<Arc<App>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AvatarResult>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!("Avatar request is not multipart: {}", rejection.body_text());
        missing_photo()
    })?;

    let photo = read_photo(&mut multipart).await?.ok_or_else(missing_photo)?;

    match app.avatar().generate(&photo).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            error!("Avatar generation failed: {:?}", e);
            Err(ApiError::Internal(e.client_message(AVATAR_FAILURE_MESSAGE)))
        }
    }
}

fn missing_photo() -> ApiError {
    ApiError::BadRequest(format!(
        "No file uploaded. Send the image in the \"{}\" field",
        FIELD_NAME
    ))
}

fn too_large() -> ApiError {
    ApiError::PayloadTooLarge(format!(
        "File too large. The \"{}\" field accepts up to {} MB",
        FIELD_NAME,
        MAX_UPLOAD_BYTES / (1024 * 1024)
    ))
}

fn upload_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("Rejected oversized upload: {}", err.body_text());
        too_large()
    } else {
        error!("Failed to read multipart upload: {}", err.body_text());
        ApiError::Internal(format!("Failed to read upload: {}", err.body_text()))
    }
}

/// Buffers the `photo` field, enforcing the size cap while streaming.
async fn read_photo(multipart: &mut Multipart) -> Result<Option<UploadedImage>, ApiError> {
    while let Some(mut field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some(FIELD_NAME) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_UPLOAD_NAME)
            .to_string();
        let declared_mime = field.content_type().map(str::to_string);

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(upload_error)? {
            if bytes.len() + chunk.len() > MAX_UPLOAD_BYTES {
                warn!("Rejected upload {}: exceeds {} bytes", file_name, MAX_UPLOAD_BYTES);
                return Err(too_large());
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Ok(None);
        }

        let mime_type = resolve_upload_mime(declared_mime.as_deref(), &bytes);
        debug!(
            "Received upload {} ({} bytes, {})",
            file_name,
            bytes.len(),
            mime_type
        );

        return Ok(Some(UploadedImage {
            bytes,
            file_name,
            mime_type,
        }));
    }

    Ok(None)
}
