//! Session token transport over a response turned into the next request

use axum::http::{
    HeaderMap, HeaderValue,
    header::{AUTHORIZATION, COOKIE, SET_COOKIE},
};
use axum_extra::extract::cookie::Cookie;
use base64::{Engine, prelude::BASE64_STANDARD};
use serde_json::json;
use tessera::{AppInfo, SessionConfig, TokenType, TransferMethod};
use tessera_axum::{
    ResponseHeaders, announce_front_token, clear_session_all_transfer_methods,
    get_anti_csrf_token, get_token, set_anti_csrf_token, set_token, write_cookie,
};
use time::OffsetDateTime;

const FAR_FUTURE_MS: u64 = 4_102_444_800_000; // 2100-01-01

fn config() -> SessionConfig {
    let app_info = AppInfo::new("Demo", "https://api.example.com", "https://example.com").unwrap();
    SessionConfig::builder(&app_info).build().unwrap()
}

fn flush(response: ResponseHeaders) -> HeaderMap {
    let mut headers = HeaderMap::new();
    response.finalize(&mut headers);
    headers
}

fn set_cookies(headers: &HeaderMap) -> Vec<Cookie<'static>> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .map(|value| Cookie::parse(value.to_str().unwrap().to_string()).unwrap())
        .collect()
}

/// Build the request a well-behaved client sends next: live cookies go back in
/// `Cookie`, and the token header named by `header_token` goes back as a
/// bearer token.
fn next_request(response: ResponseHeaders, header_token: &str) -> HeaderMap {
    let flushed = flush(response);
    let now = OffsetDateTime::now_utc();
    let mut request = HeaderMap::new();

    let live: Vec<String> = set_cookies(&flushed)
        .into_iter()
        .filter(|cookie| cookie.expires_datetime().is_none_or(|at| at > now))
        .map(|cookie| format!("{}={}", cookie.name(), cookie.value()))
        .collect();
    if !live.is_empty() {
        request.insert(COOKIE, HeaderValue::from_str(&live.join("; ")).unwrap());
    }

    if let Some(token) = flushed
        .get(header_token)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
    {
        request.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
    }

    request
}

fn header_name(token_type: TokenType) -> &'static str {
    match token_type {
        TokenType::AccessToken => "st-access-token",
        TokenType::RefreshToken => "st-refresh-token",
    }
}

#[test]
fn test_token_round_trip_for_every_method() {
    let config = config();
    let value = "eyJhbGciOi.J9+/x y=;z";

    for method in TransferMethod::ALL {
        for token_type in TokenType::ALL {
            let mut response = ResponseHeaders::new();
            set_token(&config, &mut response, token_type, value, FAR_FUTURE_MS, method).unwrap();

            let request = next_request(response, header_name(token_type));
            assert_eq!(
                get_token(&request, token_type, method).as_deref(),
                Some(value),
                "{method} {token_type:?}"
            );
        }
    }
}

#[test]
fn test_clearing_removes_tokens_under_every_method() {
    let config = config();

    for issued_with in TransferMethod::ALL {
        let mut response = ResponseHeaders::new();
        for token_type in TokenType::ALL {
            set_token(&config, &mut response, token_type, "live", FAR_FUTURE_MS, issued_with)
                .unwrap();
        }
        set_anti_csrf_token(&mut response, "csrf").unwrap();

        clear_session_all_transfer_methods(&config, &HeaderMap::new(), &mut response).unwrap();

        assert_eq!(response.header("anti-csrf"), None);
        assert_eq!(response.header("front-token"), Some("remove"));

        for token_type in TokenType::ALL {
            let request = next_request(response.clone(), header_name(token_type));
            for method in TransferMethod::ALL {
                assert_eq!(
                    get_token(&request, token_type, method),
                    None,
                    "issued with {issued_with}, read {token_type:?} with {method}"
                );
            }
        }
    }
}

#[test]
fn test_clearing_writes_each_cookie_once() {
    let config = config();
    let mut response = ResponseHeaders::new();
    set_token(
        &config,
        &mut response,
        TokenType::AccessToken,
        "live",
        FAR_FUTURE_MS,
        TransferMethod::Cookie,
    )
    .unwrap();

    clear_session_all_transfer_methods(&config, &HeaderMap::new(), &mut response).unwrap();

    let cookies = set_cookies(&flush(response));
    let names: Vec<&str> = cookies.iter().map(Cookie::name).collect();
    assert_eq!(names, vec!["sAccessToken", "sRefreshToken"]);
    assert!(cookies.iter().all(|cookie| cookie.value().is_empty()));
}

#[test]
fn test_same_cookie_name_yields_one_set_cookie() {
    let mut response = ResponseHeaders::new();
    write_cookie(&mut response, Cookie::new("sAccessToken", "first")).unwrap();
    write_cookie(&mut response, Cookie::new("sAccessToken", "second")).unwrap();

    let cookies = set_cookies(&flush(response));
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].value(), "second");
}

#[test]
fn test_expired_cookie_clears_access_token() {
    let config = config();
    let mut response = ResponseHeaders::new();
    set_token(
        &config,
        &mut response,
        TokenType::AccessToken,
        "tok123",
        0,
        TransferMethod::Cookie,
    )
    .unwrap();

    let flushed = flush(response);
    let raw = flushed.get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(raw.starts_with("sAccessToken=tok123"), "{raw}");
    assert!(raw.contains("Path=/"), "{raw}");
    assert!(raw.contains("HttpOnly"), "{raw}");
    assert!(raw.contains("Expires=Thu, 01 Jan 1970 00:00:00 GMT"), "{raw}");
}

#[test]
fn test_front_token_is_byte_exact() {
    let mut response = ResponseHeaders::new();
    announce_front_token(&mut response, "user-1", 1_700_000_000_000, json!({"sub": "x"})).unwrap();

    let flushed = flush(response);
    let encoded = flushed.get("front-token").unwrap().to_str().unwrap();
    let decoded = BASE64_STANDARD.decode(encoded).unwrap();
    assert_eq!(
        String::from_utf8(decoded).unwrap(),
        r#"{"uid":"user-1","ate":1700000000000,"up":{"sub":"x"}}"#
    );
    assert_eq!(
        flushed.get("access-control-expose-headers").unwrap(),
        "front-token"
    );
}

#[test]
fn test_anti_csrf_round_trip() {
    let mut response = ResponseHeaders::new();
    set_anti_csrf_token(&mut response, "a9f2-csrf").unwrap();

    let flushed = flush(response);
    let mut request = HeaderMap::new();
    request.insert("anti-csrf", flushed.get("anti-csrf").unwrap().clone());

    assert_eq!(get_anti_csrf_token(&request).as_deref(), Some("a9f2-csrf"));
    assert_eq!(
        flushed.get("access-control-expose-headers").unwrap(),
        "anti-csrf"
    );
}
