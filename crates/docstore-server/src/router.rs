use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all docstore endpoints.
///
/// Upload bodies over `max_upload_size` bytes are refused before anything
/// is written.
pub fn build_router(state: AppState, max_upload_size: usize) -> Router {
    Router::new()
        .route(
            "/file",
            post(handler::upload_handler).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/file/:id", get(handler::download_handler))
        .route("/health", get(handler::health_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}
