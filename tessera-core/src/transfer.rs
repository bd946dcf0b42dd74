//! Token classes and the wire mechanisms that carry them
//!
//! A session is made of two tokens, an access token and a refresh token. Each
//! can travel either as a cookie or as a header; which one is in effect is
//! decided per request.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::TokenError;

/// The wire representation carrying a token for a request/response pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMethod {
    Cookie,
    Header,
}

impl TransferMethod {
    /// Every transfer method a deployment can use, in the order they are cleared.
    pub const ALL: [TransferMethod; 2] = [TransferMethod::Cookie, TransferMethod::Header];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransferMethod::Cookie => "cookie",
            TransferMethod::Header => "header",
        }
    }
}

impl fmt::Display for TransferMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferMethod {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("cookie") {
            Ok(TransferMethod::Cookie)
        } else if s.eq_ignore_ascii_case("header") {
            Ok(TransferMethod::Header)
        } else {
            Err(TokenError::UnknownTransferMethod(s.to_string()))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenType {
    AccessToken,
    RefreshToken,
}

impl TokenType {
    pub const ALL: [TokenType; 2] = [TokenType::AccessToken, TokenType::RefreshToken];

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::AccessToken => "access",
            TokenType::RefreshToken => "refresh",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenType {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" | "accessToken" => Ok(TokenType::AccessToken),
            "refresh" | "refreshToken" => Ok(TokenType::RefreshToken),
            other => Err(TokenError::UnknownTokenType(other.to_string())),
        }
    }
}

/// Which transfer methods a deployment accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferPolicy {
    /// Follow the client's declared mode; headers are preferred otherwise.
    #[default]
    Any,
    Cookie,
    Header,
}

impl TransferPolicy {
    /// The method to use for writing tokens, or `None` when reads should try
    /// every method.
    ///
    /// A fixed policy always wins. Under [`TransferPolicy::Any`] the mode the
    /// client declared wins, and a brand new session with no declared mode
    /// goes out as headers.
    pub fn effective(
        &self,
        requested: Option<TransferMethod>,
        for_new_session: bool,
    ) -> Option<TransferMethod> {
        match self {
            TransferPolicy::Cookie => Some(TransferMethod::Cookie),
            TransferPolicy::Header => Some(TransferMethod::Header),
            TransferPolicy::Any => match requested {
                Some(method) => Some(method),
                None if for_new_session => Some(TransferMethod::Header),
                None => None,
            },
        }
    }

    pub fn allows(&self, method: TransferMethod) -> bool {
        match self {
            TransferPolicy::Any => true,
            TransferPolicy::Cookie => method == TransferMethod::Cookie,
            TransferPolicy::Header => method == TransferMethod::Header,
        }
    }
}

/// How cookie-carried sessions are protected against cross-site forgery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AntiCsrfMode {
    #[serde(rename = "VIA_TOKEN")]
    ViaToken,
    #[serde(rename = "VIA_CUSTOM_HEADER")]
    ViaCustomHeader,
    #[serde(rename = "NONE")]
    None,
}

impl FromStr for AntiCsrfMode {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VIA_TOKEN" => Ok(AntiCsrfMode::ViaToken),
            "VIA_CUSTOM_HEADER" => Ok(AntiCsrfMode::ViaCustomHeader),
            "NONE" => Ok(AntiCsrfMode::None),
            other => Err(TokenError::UnknownAntiCsrfMode(other.to_string())),
        }
    }
}
