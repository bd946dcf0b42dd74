//! Reading and writing access and refresh tokens under either transfer method

use axum::http::{HeaderMap, HeaderName, header::ACCESS_CONTROL_EXPOSE_HEADERS};
use axum_extra::extract::cookie::{Cookie, SameSite};
use tessera_core::{CookieSameSite, SessionConfig, TokenType, TransferMethod};
use time::OffsetDateTime;

use crate::{
    codec::{ResponseHeaders, escape, read_cookie, read_header, write_cookie, write_header},
    error::TransportError,
    headers::{
        ACCESS_TOKEN_COOKIE, ACCESS_TOKEN_HEADER, AUTHORIZATION, REFRESH_TOKEN_COOKIE,
        REFRESH_TOKEN_HEADER,
    },
};

pub fn cookie_name_for(token_type: TokenType) -> &'static str {
    match token_type {
        TokenType::AccessToken => ACCESS_TOKEN_COOKIE,
        TokenType::RefreshToken => REFRESH_TOKEN_COOKIE,
    }
}

pub fn response_header_name_for(token_type: TokenType) -> HeaderName {
    match token_type {
        TokenType::AccessToken => ACCESS_TOKEN_HEADER,
        TokenType::RefreshToken => REFRESH_TOKEN_HEADER,
    }
}

/// Read a token from the request under one transfer method.
///
/// Under [`TransferMethod::Header`] the token comes from `authorization`,
/// which must start with `Bearer `; any other scheme reads as no token.
pub fn get_token(
    headers: &HeaderMap,
    token_type: TokenType,
    method: TransferMethod,
) -> Option<String> {
    match method {
        TransferMethod::Cookie => read_cookie(headers, cookie_name_for(token_type)),
        TransferMethod::Header => {
            let authorization = read_header(headers, AUTHORIZATION.as_str())?;
            let token = authorization.strip_prefix("Bearer ")?.trim();
            (!token.is_empty()).then(|| token.to_string())
        }
    }
}

/// Read a token under whichever method carries one, headers first.
pub fn get_token_any(
    headers: &HeaderMap,
    token_type: TokenType,
) -> Option<(String, TransferMethod)> {
    [TransferMethod::Header, TransferMethod::Cookie]
        .into_iter()
        .find_map(|method| get_token(headers, token_type, method).map(|token| (token, method)))
}

/// Stage a token on the response.
///
/// `expires_at_ms` is milliseconds since the epoch and only applies to
/// cookies, at second resolution. An empty value with expiry `0` clears the
/// token.
pub fn set_token(
    config: &SessionConfig,
    response: &mut ResponseHeaders,
    token_type: TokenType,
    value: &str,
    expires_at_ms: u64,
    method: TransferMethod,
) -> Result<(), TransportError> {
    match method {
        TransferMethod::Cookie => {
            let path = match token_type {
                TokenType::AccessToken => "/".to_string(),
                TokenType::RefreshToken => config.refresh_token_path.clone(),
            };
            let expires = i64::try_from(expires_at_ms / 1000)
                .ok()
                .and_then(|seconds| OffsetDateTime::from_unix_timestamp(seconds).ok())
                .ok_or(TransportError::InvalidExpiry(expires_at_ms))?;

            let mut cookie = Cookie::build((cookie_name_for(token_type), escape(value)))
                .path(path)
                .http_only(true)
                .secure(config.cookie_secure)
                .same_site(same_site(config.cookie_same_site))
                .expires(expires);
            if let Some(domain) = &config.cookie_domain {
                cookie = cookie.domain(domain.clone());
            }

            write_cookie(response, cookie.build())
        }
        TransferMethod::Header => {
            let name = response_header_name_for(token_type);
            write_header(response, name.clone(), value, false)?;
            write_header(response, ACCESS_CONTROL_EXPOSE_HEADERS, name.as_str(), true)
        }
    }
}

fn same_site(policy: CookieSameSite) -> SameSite {
    match policy {
        CookieSameSite::Strict => SameSite::Strict,
        CookieSameSite::Lax => SameSite::Lax,
        CookieSameSite::None => SameSite::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use tessera_core::AppInfo;

    fn config() -> SessionConfig {
        let app_info =
            AppInfo::new("Demo", "https://api.example.com", "https://example.com").unwrap();
        SessionConfig::builder(&app_info)
            .cookie_domain(".example.com")
            .build()
            .unwrap()
    }

    fn bearer(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_get_token_from_bearer_header() {
        let headers = bearer("Bearer  abc.def ");
        assert_eq!(
            get_token(&headers, TokenType::AccessToken, TransferMethod::Header).as_deref(),
            Some("abc.def")
        );
    }

    #[test]
    fn test_get_token_ignores_other_schemes() {
        for value in ["Basic dXNlcjpwYXNz", "bearer abc", "Bearer", "Bearer    "] {
            let headers = bearer(value);
            assert_eq!(
                get_token(&headers, TokenType::AccessToken, TransferMethod::Header),
                None,
                "{value}"
            );
        }
    }

    #[test]
    fn test_get_token_any_prefers_header() {
        let mut headers = bearer("Bearer from-header");
        headers.insert("cookie", HeaderValue::from_static("sAccessToken=from-cookie"));
        assert_eq!(
            get_token_any(&headers, TokenType::AccessToken),
            Some(("from-header".to_string(), TransferMethod::Header))
        );

        headers.remove(AUTHORIZATION);
        assert_eq!(
            get_token_any(&headers, TokenType::AccessToken),
            Some(("from-cookie".to_string(), TransferMethod::Cookie))
        );
    }

    #[test]
    fn test_set_token_cookie_attributes() {
        let config = config();
        let mut response = ResponseHeaders::new();

        set_token(
            &config,
            &mut response,
            TokenType::RefreshToken,
            "r/1",
            1_700_000_000_999,
            TransferMethod::Cookie,
        )
        .unwrap();

        let cookie = response.cookie(REFRESH_TOKEN_COOKIE).unwrap();
        assert_eq!(cookie.value(), "r%2F1");
        assert_eq!(cookie.path(), Some("/auth/session/refresh"));
        assert_eq!(
            cookie.domain().map(|domain| domain.trim_start_matches('.')),
            Some("example.com")
        );
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(
            cookie.expires_datetime().map(|at| at.unix_timestamp()),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn test_set_token_header_exposes_name() {
        let config = config();
        let mut response = ResponseHeaders::new();

        for token_type in TokenType::ALL {
            set_token(&config, &mut response, token_type, "t", 0, TransferMethod::Header).unwrap();
        }

        assert_eq!(response.header("st-access-token"), Some("t"));
        assert_eq!(response.header("st-refresh-token"), Some("t"));
        assert_eq!(
            response.header("access-control-expose-headers"),
            Some("st-access-token, st-refresh-token")
        );
        assert!(response.cookies().is_empty());
    }

    #[test]
    fn test_set_token_rejects_unrepresentable_expiry() {
        let config = config();
        let mut response = ResponseHeaders::new();
        let result = set_token(
            &config,
            &mut response,
            TokenType::AccessToken,
            "t",
            u64::MAX,
            TransferMethod::Cookie,
        );
        assert!(matches!(result, Err(TransportError::InvalidExpiry(_))));
    }
}
