//! Image upload API
//!
//! POST /api/images — multipart upload → validate → JPEG compress → SHA256 → storage
//!
//! Images are stored at `{tenant_id}/{folder}/{hash}.jpg`, so identical
//! uploads land on the same object.

use axum::{
    Extension, Json,
    extract::{Multipart, State},
};
use image::codecs::jpeg::JpegEncoder;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Cursor;

use shared::error::{AppError, ErrorCode};

use crate::api::ApiResult;
use crate::auth::TenantIdentity;
use crate::state::AppState;

/// Maximum file size (20MB)
pub const MAX_FILE_SIZE: usize = 20 * 1024 * 1024;

const JPEG_QUALITY: u8 = 85;

const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// Upload folders under the tenant's prefix
const FOLDERS: &[&str] = &["items", "promotions", "branding"];
const DEFAULT_FOLDER: &str = "items";

#[derive(Debug, Serialize)]
pub struct ImageUploadResponse {
    pub url: String,
    pub hash: String,
}

#[derive(Debug, Deserialize)]
pub struct ImageDeleteRequest {
    pub url: String,
}

fn file_extension(filename: &str) -> String {
    std::path::Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// Re-encode any supported image as JPEG and return it with its SHA256 hex
fn compress_to_jpeg(data: &[u8]) -> Result<(Vec<u8>, String), AppError> {
    let img = image::load_from_memory(data).map_err(|e| {
        AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            format!("Invalid image: {e}"),
        )
    })?;

    let mut buffer = Vec::new();
    {
        let mut cursor = Cursor::new(&mut buffer);
        let rgb_img = img.to_rgb8();
        let encoder = JpegEncoder::new_with_quality(&mut cursor, JPEG_QUALITY);
        rgb_img.write_with_encoder(encoder).map_err(|e| {
            AppError::with_message(
                ErrorCode::InternalError,
                format!("Image compression failed: {e}"),
            )
        })?;
    }

    let mut hasher = Sha256::new();
    hasher.update(&buffer);
    let hash = hex::encode(hasher.finalize());
    Ok((buffer, hash))
}

/// POST /api/images — fields `file` and optional `folder`
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    mut multipart: Multipart,
) -> ApiResult<ImageUploadResponse> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut original_filename: Option<String> = None;
    let mut folder = DEFAULT_FOLDER.to_string();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::with_message(ErrorCode::InvalidRequest, format!("Multipart error: {e}"))
    })? {
        match field.name() {
            Some("file") => {
                original_filename = field.file_name().map(|s| s.to_string());
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::with_message(ErrorCode::InvalidRequest, format!("Read error: {e}"))
                })?;
                file_data = Some(bytes.to_vec());
            }
            Some("folder") => {
                folder = field.text().await.map_err(|e| {
                    AppError::with_message(ErrorCode::InvalidRequest, format!("Read error: {e}"))
                })?;
            }
            _ => {}
        }
    }

    if !FOLDERS.contains(&folder.as_str()) {
        return Err(AppError::validation(format!(
            "Unknown folder: {folder}. Supported: items, promotions, branding"
        ))
        .with_detail("field", "folder"));
    }

    let data = file_data.ok_or_else(|| AppError::new(ErrorCode::NoFileProvided))?;
    if data.is_empty() {
        return Err(AppError::new(ErrorCode::EmptyFile));
    }
    if data.len() > MAX_FILE_SIZE {
        return Err(AppError::with_message(
            ErrorCode::FileTooLarge,
            format!("File too large: {} bytes (max {MAX_FILE_SIZE})", data.len()),
        ));
    }

    let ext = file_extension(original_filename.as_deref().unwrap_or_default());
    if !SUPPORTED_FORMATS.contains(&ext.as_str()) {
        return Err(AppError::with_message(
            ErrorCode::UnsupportedFileFormat,
            format!("Unsupported format: {ext}. Supported: png, jpg, jpeg, webp"),
        ));
    }

    let (buffer, hash) = compress_to_jpeg(&data)?;

    let url = state
        .storage
        .upload(
            buffer,
            "image/jpeg",
            &format!("{}/{folder}", identity.tenant_id),
            &format!("{hash}.jpg"),
        )
        .await
        .map_err(|e| {
            tracing::error!(hash = %hash, error = %e, "Image upload failed");
            AppError::upload_failed("Image upload failed")
        })?;

    tracing::info!(
        tenant_id = %identity.tenant_id,
        folder = %folder,
        hash = %hash,
        "Image uploaded"
    );

    Ok(Json(ImageUploadResponse { url, hash }))
}

/// DELETE /api/images — only objects under the caller's own prefix
pub async fn delete_image(
    State(state): State<AppState>,
    Extension(identity): Extension<TenantIdentity>,
    Json(req): Json<ImageDeleteRequest>,
) -> ApiResult<bool> {
    if !req.url.contains(&format!("/{}/", identity.tenant_id)) {
        return Err(AppError::not_found("Image"));
    }
    state.storage.delete(&req.url).await.map_err(|e| {
        tracing::warn!(url = %req.url, error = %e, "Image delete failed");
        AppError::not_found("Image")
    })?;
    tracing::info!(tenant_id = %identity.tenant_id, url = %req.url, "Image deleted");
    Ok(Json(true))
}
