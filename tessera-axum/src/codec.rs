//! Reading and writing single header and cookie values
//!
//! Responses are staged in a [`ResponseHeaders`] rather than written straight
//! into the outgoing `HeaderMap`. Cookies are keyed by name: staging a cookie
//! whose name is already staged replaces it, so a response never carries two
//! `Set-Cookie` entries for the same cookie. The staged state is flushed once,
//! when the response is assembled.

use std::{borrow::Cow, collections::HashSet, convert::Infallible};

use axum::{
    http::{
        HeaderMap, HeaderName, HeaderValue,
        header::{ACCESS_CONTROL_EXPOSE_HEADERS, COOKIE, SET_COOKIE},
    },
    response::{IntoResponseParts, ResponseParts},
};
use axum_extra::extract::cookie::Cookie;

use crate::error::TransportError;

/// Headers and cookies staged for one response.
///
/// Owned by the handler producing the response; return it from the handler
/// (it implements [`IntoResponseParts`]) or call [`ResponseHeaders::finalize`].
#[derive(Debug, Default, Clone)]
pub struct ResponseHeaders {
    headers: HeaderMap,
    removed: Vec<HeaderName>,
    cookies: Vec<Cookie<'static>>,
}

impl ResponseHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A staged header as a string, if present and valid UTF-8.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).and_then(|value| value.to_str().ok())
    }

    /// Staged cookies, in the order their names were first staged.
    pub fn cookies(&self) -> &[Cookie<'static>] {
        &self.cookies
    }

    pub fn cookie(&self, name: &str) -> Option<&Cookie<'static>> {
        self.cookies.iter().find(|cookie| cookie.name() == name)
    }

    /// Flush the staged state into an outgoing header map.
    ///
    /// Staged headers replace existing ones, except `Access-Control-Expose-Headers`
    /// which is appended to. Existing `Set-Cookie` entries for a staged cookie
    /// name are dropped before the staged cookies are added.
    pub fn finalize(mut self, target: &mut HeaderMap) {
        for name in &self.removed {
            target.remove(name);
        }

        if let Some(exposed) = self.headers.remove(ACCESS_CONTROL_EXPOSE_HEADERS) {
            let merged = match target
                .get(ACCESS_CONTROL_EXPOSE_HEADERS)
                .and_then(|existing| existing.to_str().ok())
                .filter(|existing| !existing.is_empty())
            {
                Some(existing) => exposed
                    .to_str()
                    .ok()
                    .and_then(|exposed| HeaderValue::from_str(&format!("{existing}, {exposed}")).ok())
                    .unwrap_or(exposed),
                None => exposed,
            };
            target.insert(ACCESS_CONTROL_EXPOSE_HEADERS, merged);
        }
        target.extend(self.headers);

        if self.cookies.is_empty() {
            return;
        }

        let staged: HashSet<&str> = self.cookies.iter().map(|cookie| cookie.name()).collect();
        let kept: Vec<HeaderValue> = target
            .get_all(SET_COOKIE)
            .iter()
            .filter(|value| {
                value
                    .to_str()
                    .ok()
                    .and_then(set_cookie_name)
                    .is_none_or(|name| !staged.contains(name))
            })
            .cloned()
            .collect();

        target.remove(SET_COOKIE);
        for value in kept {
            target.append(SET_COOKIE, value);
        }
        for cookie in &self.cookies {
            match HeaderValue::from_str(&cookie.to_string()) {
                Ok(value) => {
                    target.append(SET_COOKIE, value);
                }
                Err(_) => tracing::error!(cookie.name = cookie.name(), "Dropping unencodable cookie"),
            }
        }
    }
}

impl IntoResponseParts for ResponseHeaders {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.finalize(res.headers_mut());
        Ok(res)
    }
}

/// The value of a request header, or `None` when absent, empty or not UTF-8.
pub fn read_header(headers: &HeaderMap, key: &str) -> Option<String> {
    headers
        .get(key)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Stage a header on the response.
///
/// With `allow_duplicate`, a value already staged under `key` is kept and the
/// new one appended as `existing, value`; otherwise the last write wins.
pub fn write_header(
    response: &mut ResponseHeaders,
    key: HeaderName,
    value: &str,
    allow_duplicate: bool,
) -> Result<(), TransportError> {
    let existing = response
        .headers
        .get(&key)
        .and_then(|existing| existing.to_str().ok())
        .filter(|existing| !existing.is_empty());

    let value = match existing {
        Some(existing) if allow_duplicate => format!("{existing}, {value}"),
        _ => value.to_string(),
    };
    let value = HeaderValue::from_str(&value)
        .map_err(|_| TransportError::InvalidHeaderValue(key.to_string()))?;

    response.removed.retain(|removed| *removed != key);
    response.headers.insert(key, value);
    Ok(())
}

/// Remove a header from the response, including one set outside of this
/// staging area before the response is finalized.
pub fn remove_header(response: &mut ResponseHeaders, key: HeaderName) {
    response.headers.remove(&key);
    if !response.removed.contains(&key) {
        response.removed.push(key);
    }
}

/// The decoded value of the first request cookie named `name`.
///
/// A value that does not decode is treated as absent.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .and_then(|cookie| unescape(cookie.value()))
}

/// Stage a cookie on the response, replacing any staged cookie with the same name.
pub fn write_cookie(response: &mut ResponseHeaders, cookie: Cookie<'static>) -> Result<(), TransportError> {
    HeaderValue::from_str(&cookie.to_string())
        .map_err(|_| TransportError::InvalidHeaderValue(format!("set-cookie {}", cookie.name())))?;

    match response
        .cookies
        .iter_mut()
        .find(|staged| staged.name() == cookie.name())
    {
        Some(staged) => *staged = cookie,
        None => response.cookies.push(cookie),
    }
    Ok(())
}

/// Percent-encode a cookie value.
pub fn escape(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Reverse of [`escape`]. `+` decodes to a space; a malformed escape yields `None`.
pub fn unescape(raw: &str) -> Option<String> {
    let malformed = raw.match_indices('%').any(|(i, _)| {
        raw.get(i + 1..i + 3)
            .is_none_or(|hex| !hex.bytes().all(|b| b.is_ascii_hexdigit()))
    });
    if malformed {
        return None;
    }

    urlencoding::decode(&raw.replace('+', " "))
        .ok()
        .map(Cow::into_owned)
}

fn set_cookie_name(header: &str) -> Option<&str> {
    let pair = header.trim().split(';').next()?;
    let name = pair.split('=').next()?.trim();
    (!name.is_empty()).then_some(name)
}
