use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::SharedState;

/// Build the axum router with every docvault endpoint.
///
/// `get` routes answer `HEAD` as well, with the body stripped.
pub fn build_router(state: SharedState) -> Router {
    let max_upload = state.config.max_upload_bytes;
    Router::new()
        .route("/api/health", get(handler::health_handler))
        .route("/api/register", post(handler::register_handler))
        .route(
            "/api/auth",
            post(handler::login_handler).delete(handler::logout_handler),
        )
        .route(
            "/api/docs",
            get(handler::list_documents_handler).post(handler::create_document_handler),
        )
        .route(
            "/api/docs/:id",
            get(handler::get_document_handler).delete(handler::delete_document_handler),
        )
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
