use std::io::Cursor;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use docstore_core::{DocumentId, DocumentService};
use serde_json::{json, Value};
use tracing::warn;

use crate::error::ApiError;

/// Multipart field carrying the document identifier.
pub const ID_FIELD: &str = "Id";
/// Multipart field carrying the file.
pub const FILE_FIELD: &str = "uploadFile";

const STORED: &str = "File stored successfully";
const BAD_ID_FIELD: &str = "Id must be an integer.";
const BAD_ID_PARAM: &str = "id param type is invalid";
const UNREADABLE_FILE: &str = "could not read uploaded file.";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DocumentService>,
    /// Human-readable upload limit used in the too-big message.
    pub max_upload_label: String,
}

impl AppState {
    pub fn new(service: Arc<DocumentService>, max_upload_label: impl Into<String>) -> Self {
        Self {
            service,
            max_upload_label: max_upload_label.into(),
        }
    }

    fn multipart_error(&self, err: MultipartError) -> ApiError {
        warn!(error = %err, "failed to read multipart body");
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::bad_request(format!(
                "The uploaded file is too big. Maximum file size is {}.",
                self.max_upload_label
            ))
        } else {
            ApiError::bad_request(UNREADABLE_FILE)
        }
    }
}

/// `POST /file`: store the `uploadFile` part under the `Id` part.
pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let mut raw_id: Option<String> = None;
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| state.multipart_error(e))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(ID_FIELD) => {
                raw_id = Some(field.text().await.map_err(|e| state.multipart_error(e))?);
            }
            Some(FILE_FIELD) => {
                let filename = field.file_name().unwrap_or_default().to_owned();
                let data = field.bytes().await.map_err(|e| state.multipart_error(e))?;
                file = Some((filename, data));
            }
            _ => {}
        }
    }

    let id: DocumentId = raw_id
        .as_deref()
        .unwrap_or_default()
        .parse()
        .map_err(|_| ApiError::bad_request(BAD_ID_FIELD))?;
    let (filename, data) = file.ok_or_else(|| ApiError::bad_request(UNREADABLE_FILE))?;

    let service = Arc::clone(&state.service);
    tokio::task::spawn_blocking(move || service.upload(id, &filename, &mut Cursor::new(data)))
        .await
        .map_err(|e| ApiError::internal(format!("upload task failed: {e}")))??;

    Ok((StatusCode::CREATED, Json(json!({ "message": STORED }))))
}

/// `GET /file/:id`: return the stored bytes as an attachment.
pub async fn download_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError> {
    let id: DocumentId = raw_id
        .parse()
        .map_err(|_| ApiError::bad_request(BAD_ID_PARAM))?;

    let service = Arc::clone(&state.service);
    let (content_type, disposition, body) = tokio::task::spawn_blocking(move || {
        let document = service.get(id)?;
        let content_type = document.content_type.clone();
        let disposition = document.content_disposition();
        let body = document
            .into_bytes()
            .map_err(|e| {
                warn!(%id, error = %e, "failed to read stored file");
                ApiError::internal(format!("failed to read file with ID {id}"))
            })?;
        Ok::<_, ApiError>((content_type, disposition, body))
    })
    .await
    .map_err(|e| ApiError::internal(format!("download task failed: {e}")))??;

    let content_type = HeaderValue::from_str(&content_type)
        .map_err(|_| ApiError::internal("invalid content type"))?;
    let disposition = HeaderValue::from_bytes(disposition.as_bytes())
        .map_err(|_| ApiError::internal("filename cannot be sent in a header"))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// Health check handler.
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
