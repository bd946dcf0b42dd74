use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tessera::Tessera;

use crate::{codec::read_header, error::AuthError, headers::AUTHORIZATION};

#[derive(Clone)]
pub struct TesseraState {
    pub tessera: Arc<Tessera>,
}

/// Only let requests through that the dashboard recipe admits.
///
/// Denials answer 401; a failing core call answers 500, since there is no
/// safe default verification result.
pub async fn require_dashboard_access(
    State(state): State<TesseraState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let authorization = read_header(request.headers(), AUTHORIZATION.as_str());

    match state
        .tessera
        .dashboard()
        .should_allow_access(authorization.as_deref())
        .await
    {
        Ok(true) => Ok(next.run(request).await),
        Ok(false) => {
            tracing::debug!(path = %request.uri().path(), "Dashboard access denied");
            Err(AuthError::Unauthorized)
        }
        Err(e) => {
            tracing::error!(error = %e, "Dashboard access check failed");
            Err(e.into())
        }
    }
}
