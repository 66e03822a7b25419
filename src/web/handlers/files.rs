//! File handlers for the web API.

use axum::{
    body::Body,
    extract::{multipart::MultipartRejection, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::Response,
    Json,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::store::{NewFile, TagFilter};
use crate::web::dto::{FileRecordResponse, ListQuery, UploadForm, UploadResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

/// Build a Content-Disposition header value for a download.
///
/// Control characters, quotes and backslashes are replaced in the plain
/// `filename` parameter; non-ASCII names also get an RFC 5987 `filename*`.
fn content_disposition_header(filename: &str) -> String {
    let needs_escaping = filename
        .chars()
        .any(|c| c.is_control() || c == '"' || c == '\\');

    if filename.is_ascii() && !needs_escaping {
        return format!("attachment; filename=\"{}\"", filename);
    }

    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            _ => c,
        })
        .collect();
    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// POST /files - Upload a file with metadata.
///
/// Request body: multipart/form-data with a `file` field; every other text
/// field becomes a metadata entry.
#[utoipa::path(
    post,
    path = "/files",
    tag = "files",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "File stored", body = UploadResponse),
        (status = 400, description = "Missing file, empty filename or disallowed extension"),
        (status = 401, description = "Unauthorized"),
        (status = 413, description = "Upload too large")
    ),
    security(
        ("basic_auth" = [])
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    AuthUser(username): AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut multipart = multipart.map_err(|e| {
        tracing::debug!("Rejected multipart request: {}", e);
        ApiError::bad_request("Expected multipart/form-data")
    })?;

    let mut file: Option<(String, Vec<u8>)> = None;
    let mut fields: Vec<(String, String)> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();

        if name == "file" {
            let filename = field.file_name().unwrap_or("").to_string();
            let content = field.bytes().await.map_err(multipart_error)?;
            // Only the first `file` part counts.
            if file.is_none() {
                file = Some((filename, content.to_vec()));
            }
        } else if field.file_name().is_none() {
            let value = field.text().await.map_err(multipart_error)?;
            fields.push((name, value));
        }
    }

    let (filename, content) =
        file.ok_or_else(|| ApiError::bad_request("No file found in request"))?;

    let new_file = fields
        .into_iter()
        .fold(NewFile::new(filename, content), |f, (k, v)| f.with_metadata(k, v));

    let record = state.store.put(new_file).await?;
    tracing::info!(file_id = %record.id, user = %username, "Upload accepted");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse { file_id: record.id }),
    ))
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("Upload too large")
    } else {
        tracing::debug!("Failed to read multipart field: {}", e);
        ApiError::bad_request("Invalid multipart data")
    }
}

/// GET /files/:id - Download a file.
#[utoipa::path(
    get,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(
        ("basic_auth" = [])
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Path(file_id): Path<String>,
) -> Result<Response<Body>, ApiError> {
    let record = state
        .store
        .get(&file_id)
        .await
        .ok_or_else(|| ApiError::not_found("File not found"))?;

    let file = state.store.open_blob(&record).await?;
    let length = file.metadata().await.ok().map(|m| m.len());

    let mut builder = Response::builder()
        .header(header::CONTENT_TYPE, record.content_type())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(&record.filename),
        );
    if let Some(length) = length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    builder
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// GET /files - List files, optionally filtered by `tags=key:value`.
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    params(
        ("tags" = Option<String>, Query, description = "Metadata filter in key:value form")
    ),
    responses(
        (status = 200, description = "Matching files", body = Vec<FileRecordResponse>),
        (status = 400, description = "Malformed tag filter"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("basic_auth" = [])
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    AuthUser(_user): AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<FileRecordResponse>>, ApiError> {
    let filter = match query.tags.as_deref() {
        None | Some("") => None,
        Some(tags) => Some(TagFilter::parse(tags)?),
    };

    let records = state.store.list(filter.as_ref()).await;

    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// DELETE /files/:id - Delete a file.
#[utoipa::path(
    delete,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 204, description = "File deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(
        ("basic_auth" = [])
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    AuthUser(username): AuthUser,
    Path(file_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .store
        .delete(&file_id)
        .await?
        .ok_or_else(|| ApiError::not_found("File not found"))?;

    tracing::info!(file_id = %file_id, user = %username, "Delete accepted");
    Ok(StatusCode::NO_CONTENT)
}
