//! Anti-CSRF token propagation and checks

use axum::http::{HeaderMap, header::ACCESS_CONTROL_EXPOSE_HEADERS};
use tessera_core::{AntiCsrfMode, TransferMethod};

use crate::{
    codec::{ResponseHeaders, read_header, write_header},
    error::TransportError,
    headers::{ANTI_CSRF, RID},
};

pub fn get_anti_csrf_token(headers: &HeaderMap) -> Option<String> {
    read_header(headers, ANTI_CSRF.as_str())
}

pub fn set_anti_csrf_token(response: &mut ResponseHeaders, token: &str) -> Result<(), TransportError> {
    write_header(response, ANTI_CSRF, token, false)?;
    write_header(response, ACCESS_CONTROL_EXPOSE_HEADERS, ANTI_CSRF.as_str(), true)
}

/// Whether a request passes the configured anti-CSRF protection.
///
/// Only cookie-carried sessions can be forged cross-site, so header transport
/// always passes. `expected` is the anti-CSRF token bound to the session and
/// is only consulted under [`AntiCsrfMode::ViaToken`].
pub fn verify_anti_csrf(
    mode: AntiCsrfMode,
    method: TransferMethod,
    headers: &HeaderMap,
    expected: Option<&str>,
) -> bool {
    if method == TransferMethod::Header {
        return true;
    }

    match mode {
        AntiCsrfMode::None => true,
        AntiCsrfMode::ViaCustomHeader => read_header(headers, RID.as_str()).is_some(),
        AntiCsrfMode::ViaToken => match (expected, get_anti_csrf_token(headers)) {
            (Some(expected), Some(received)) => expected == received,
            _ => false,
        },
    }
}
