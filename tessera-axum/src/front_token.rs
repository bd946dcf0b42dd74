//! Announcing session state to front-end code through the `front-token` header

use axum::http::header::ACCESS_CONTROL_EXPOSE_HEADERS;
use tessera_core::{TokenInfo, front_token::FRONT_TOKEN_REMOVED};

use crate::{
    codec::{ResponseHeaders, write_header},
    error::TransportError,
    headers::FRONT_TOKEN,
};

/// Tell the client who is signed in and when the access token expires.
pub fn announce_front_token(
    response: &mut ResponseHeaders,
    user_id: &str,
    access_token_expiry_ms: u64,
    payload: serde_json::Value,
) -> Result<(), TransportError> {
    let info = TokenInfo::new(user_id, access_token_expiry_ms, payload);
    write_front_token(response, &info.encode())
}

/// Tell the client to drop any cached session state.
pub fn announce_front_token_removed(response: &mut ResponseHeaders) -> Result<(), TransportError> {
    write_front_token(response, FRONT_TOKEN_REMOVED)
}

fn write_front_token(response: &mut ResponseHeaders, value: &str) -> Result<(), TransportError> {
    write_header(response, FRONT_TOKEN, value, false)?;
    write_header(response, ACCESS_CONTROL_EXPOSE_HEADERS, FRONT_TOKEN.as_str(), true)
}
