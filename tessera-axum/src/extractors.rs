use std::{convert::Infallible, sync::Arc};

use axum::{
    Extension, RequestPartsExt,
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use tessera_core::{SessionConfig, TokenType, TransferMethod};

use crate::{
    anti_csrf::get_anti_csrf_token,
    codec::read_header,
    error::AuthError,
    headers::{RID, SDK_NAME, SDK_VERSION},
    tokens::{get_token, get_token_any},
    transfer::select_transfer_method,
};

/// The transfer method the client declared in `st-auth-mode`, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthMode(pub Option<TransferMethod>);

impl<S> FromRequestParts<S> for AuthMode
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(AuthMode(select_transfer_method(&parts.headers)))
    }
}

/// The session tokens carried by a request.
///
/// The access token is read under the transfer method the configured policy
/// settles on for this request; when neither the policy nor the client fixes
/// one, it is looked up in the `authorization` header first and in cookies
/// second. The bearer credential is an access token everywhere except on the
/// refresh endpoint, so the refresh token only comes from its cookie here; use
/// [`RefreshToken`] on the refresh endpoint. Requires an
/// `Extension<Arc<SessionConfig>>` layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub anti_csrf: Option<String>,
    /// The method the access token was found under.
    pub transfer_method: Option<TransferMethod>,
}

impl<S> FromRequestParts<S> for SessionTokens
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Extension(config): Extension<Arc<SessionConfig>> = parts
            .extract()
            .await
            .map_err(|_| AuthError::InternalError("Session configuration missing".to_string()))?;

        let headers = &parts.headers;
        let policy = config.token_transfer;
        let effective = policy.effective(select_transfer_method(headers), false);

        let access = read_token(headers, TokenType::AccessToken, effective)
            .filter(|(_, method)| policy.allows(*method));
        let refresh_token = match effective {
            Some(TransferMethod::Header) => None,
            _ if policy.allows(TransferMethod::Cookie) => {
                get_token(headers, TokenType::RefreshToken, TransferMethod::Cookie)
            }
            _ => None,
        };

        Ok(SessionTokens {
            transfer_method: access.as_ref().map(|(_, method)| *method),
            access_token: access.map(|(token, _)| token),
            refresh_token,
            anti_csrf: get_anti_csrf_token(headers),
        })
    }
}

/// The refresh token sent to the refresh endpoint, with the method it came under.
///
/// Only meaningful on that endpoint, where the bearer credential is the
/// refresh token. Rejects with 401 when the request carries none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshToken {
    pub token: String,
    pub transfer_method: TransferMethod,
}

impl<S> FromRequestParts<S> for RefreshToken
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Extension(config): Extension<Arc<SessionConfig>> = parts
            .extract()
            .await
            .map_err(|_| AuthError::InternalError("Session configuration missing".to_string()))?;

        let headers = &parts.headers;
        let policy = config.token_transfer;
        let effective = policy.effective(select_transfer_method(headers), false);

        read_token(headers, TokenType::RefreshToken, effective)
            .filter(|(_, method)| policy.allows(*method))
            .map(|(token, transfer_method)| RefreshToken {
                token,
                transfer_method,
            })
            .ok_or(AuthError::Unauthorized)
    }
}

fn read_token(
    headers: &HeaderMap,
    token_type: TokenType,
    method: Option<TransferMethod>,
) -> Option<(String, TransferMethod)> {
    match method {
        Some(method) => get_token(headers, token_type, method).map(|token| (token, method)),
        None => get_token_any(headers, token_type),
    }
}

/// What the frontend SDK says about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontendSdk {
    pub name: Option<String>,
    pub version: Option<String>,
    /// Recipe id the request is addressed to.
    pub rid: Option<String>,
}

impl<S> FromRequestParts<S> for FrontendSdk
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(FrontendSdk {
            name: read_header(&parts.headers, SDK_NAME.as_str()),
            version: read_header(&parts.headers, SDK_VERSION.as_str()),
            rid: read_header(&parts.headers, RID.as_str()),
        })
    }
}
