use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failures while staging session state on a response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Value for header {0} is not a valid header value")]
    InvalidHeaderValue(String),

    #[error("Expiry {0}ms is outside the representable date range")]
    InvalidExpiry(u64),

    #[error(transparent)]
    Core(#[from] tessera_core::Error),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl From<TransportError> for AuthError {
    fn from(err: TransportError) -> Self {
        AuthError::InternalError(err.to_string())
    }
}

impl From<tessera_core::Error> for AuthError {
    fn from(err: tessera_core::Error) -> Self {
        AuthError::InternalError(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized"),
            AuthError::InternalError(ref msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.as_str()),
        };

        let body = Json(json!({
            "error": error_message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(error: AuthError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_error_responses() {
        assert_eq!(
            body_of(AuthError::Unauthorized).await,
            (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized", "code": 401 }))
        );

        let transport = TransportError::InvalidExpiry(u64::MAX);
        let (status, body) = body_of(transport.into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], 500);
    }
}
