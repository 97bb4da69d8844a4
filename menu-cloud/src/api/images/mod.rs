//! Image API — item photos, promotion banners, branding

mod handler;

use axum::{Router, extract::DefaultBodyLimit, routing::post};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/images",
            post(handler::upload_image).delete(handler::delete_image),
        )
        // Room for the multipart framing around a maximum-size file
        .layer(DefaultBodyLimit::max(handler::MAX_FILE_SIZE + 64 * 1024))
}
