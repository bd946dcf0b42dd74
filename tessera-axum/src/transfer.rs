//! Which transfer method the client asked for

use axum::http::HeaderMap;
use tessera_core::TransferMethod;

use crate::{codec::read_header, headers::AUTH_MODE};

/// The transfer method declared in the `st-auth-mode` request header.
///
/// Absent, empty and unrecognized values all yield `None`: the client simply
/// did not state a usable preference.
pub fn select_transfer_method(headers: &HeaderMap) -> Option<TransferMethod> {
    let mode = read_header(headers, AUTH_MODE.as_str())?;
    match mode.parse() {
        Ok(method) => Some(method),
        Err(e) => {
            tracing::debug!(auth_mode = %mode, error = %e, "Ignoring unrecognized auth mode");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn with_mode(mode: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTH_MODE, HeaderValue::from_static(mode));
        headers
    }

    #[test]
    fn test_select_transfer_method() {
        assert_eq!(select_transfer_method(&HeaderMap::new()), None);
        assert_eq!(
            select_transfer_method(&with_mode("cookie")),
            Some(TransferMethod::Cookie)
        );
        assert_eq!(
            select_transfer_method(&with_mode("Header")),
            Some(TransferMethod::Header)
        );
        assert_eq!(select_transfer_method(&with_mode("smoke-signal")), None);
    }
}
