//! Header and cookie names on the wire, and the CORS helpers built from them

use axum::http::HeaderName;

pub const AUTHORIZATION: HeaderName = HeaderName::from_static("authorization");
pub const ANTI_CSRF: HeaderName = HeaderName::from_static("anti-csrf");
pub const RID: HeaderName = HeaderName::from_static("rid");
pub const AUTH_MODE: HeaderName = HeaderName::from_static("st-auth-mode");
pub const FRONT_TOKEN: HeaderName = HeaderName::from_static("front-token");
pub const SDK_NAME: HeaderName = HeaderName::from_static("supertokens-sdk-name");
pub const SDK_VERSION: HeaderName = HeaderName::from_static("supertokens-sdk-version");

pub const ACCESS_TOKEN_HEADER: HeaderName = HeaderName::from_static("st-access-token");
pub const REFRESH_TOKEN_HEADER: HeaderName = HeaderName::from_static("st-refresh-token");

pub const ACCESS_TOKEN_COOKIE: &str = "sAccessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "sRefreshToken";

/// Request headers the host's CORS layer must allow for session requests.
pub fn allowed_cors_headers() -> Vec<HeaderName> {
    vec![ANTI_CSRF, RID, AUTHORIZATION, AUTH_MODE]
}

/// [`allowed_cors_headers`] plus the headers frontend SDKs identify themselves with.
pub fn allowed_cors_headers_with_sdk() -> Vec<HeaderName> {
    let mut headers = allowed_cors_headers();
    headers.extend([SDK_NAME, SDK_VERSION]);
    headers
}
