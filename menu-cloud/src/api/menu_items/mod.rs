//! Menu Item API

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/menu-items", routes())
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
        .route("/{id}/availability", put(handler::set_availability))
        .route(
            "/{id}/modifier-groups",
            get(handler::list_modifier_groups).put(handler::assign_modifier_groups),
        )
        .route(
            "/{id}/modifier-options/{option_id}",
            put(handler::set_option_enabled),
        )
        .route("/{id}/quote", post(handler::quote))
}
