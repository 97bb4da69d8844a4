//! Category API

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/categories", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        // Batch sort order update (must be before /{id} to avoid path conflicts)
        .route("/sort-order", put(handler::batch_update_sort_order))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
}
