mod docs;
mod public;
mod rest;
mod rpc;

use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use crate::{auth::require_token, state::AppState};

/// Build the full API router.
pub fn router(state: AppState) -> Router {
    let private = Router::new()
        .merge(rpc::routes())
        .merge(rest::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token));

    Router::new()
        .merge(public::routes())
        .merge(docs::routes())
        .merge(private)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
