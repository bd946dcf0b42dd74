//! Clearing a session from the client

use axum::http::HeaderMap;
use tessera_core::{SessionConfig, TokenType, TransferMethod};

use crate::{
    codec::{ResponseHeaders, remove_header},
    error::TransportError,
    front_token::announce_front_token_removed,
    headers::ANTI_CSRF,
    tokens::set_token,
    transfer::select_transfer_method,
};

/// Clear both tokens under one transfer method, drop the anti-CSRF header and
/// announce the front token as removed.
pub fn clear_session(
    config: &SessionConfig,
    response: &mut ResponseHeaders,
    method: TransferMethod,
) -> Result<(), TransportError> {
    for token_type in TokenType::ALL {
        set_token(config, response, token_type, "", 0, method)?;
    }
    remove_header(response, ANTI_CSRF);
    announce_front_token_removed(response)
}

/// Clear the session under every transfer method.
///
/// Which method the client actually stores its tokens with is not reliably
/// known (cookies may already be staged when a handler rejects a sign-in), so
/// all of them are cleared regardless of what the request declares.
pub fn clear_session_all_transfer_methods(
    config: &SessionConfig,
    request: &HeaderMap,
    response: &mut ResponseHeaders,
) -> Result<(), TransportError> {
    tracing::debug!(
        declared = ?select_transfer_method(request),
        "Clearing session under all transfer methods"
    );
    for method in TransferMethod::ALL {
        clear_session(config, response, method)?;
    }
    Ok(())
}
