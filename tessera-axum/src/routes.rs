use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::State,
    http::HeaderMap,
    middleware::from_fn_with_state,
    response::IntoResponse,
    routing::{get, post},
};
use tessera::Tessera;
use tessera_core::config::SIGNOUT_API_PATH;

use crate::{
    clear::clear_session_all_transfer_methods,
    codec::ResponseHeaders,
    error::Result,
    middleware::{TesseraState, require_dashboard_access},
    types::{BundleResponse, HealthResponse, StatusResponse},
};

pub fn create_router(tessera: Arc<Tessera>) -> Router {
    let session_config = tessera.session_config().clone();
    let state = TesseraState { tessera };

    let dashboard_routes = Router::new()
        .route("/dashboard/bundle", get(dashboard_bundle_handler))
        .route_layer(from_fn_with_state(state.clone(), require_dashboard_access));

    Router::new()
        .route("/health", get(health_handler))
        .route(SIGNOUT_API_PATH, post(signout_handler))
        .merge(dashboard_routes)
        .layer(Extension(session_config))
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn signout_handler(
    State(state): State<TesseraState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse> {
    let mut response = ResponseHeaders::new();
    clear_session_all_transfer_methods(state.tessera.session_config(), &headers, &mut response)?;

    Ok((response, Json(StatusResponse::ok())))
}

async fn dashboard_bundle_handler(
    State(state): State<TesseraState>,
) -> Result<Json<BundleResponse>> {
    let location = state.tessera.dashboard().bundle_location().await?;
    Ok(Json(BundleResponse { location }))
}
