//! Front-token payload
//!
//! The front token is a client-readable summary of the session, so front-end
//! code knows who is logged in and when the access token expires without
//! polling the API. It is not secret and not signed.

use base64::{Engine, prelude::BASE64_STANDARD};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;

/// Header value telling the client to drop its cached session state.
pub const FRONT_TOKEN_REMOVED: &str = "remove";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// User id
    pub uid: String,
    /// Access token expiry in milliseconds since the epoch
    pub ate: u64,
    /// Access token payload
    pub up: serde_json::Value,
}

impl TokenInfo {
    pub fn new(user_id: impl Into<String>, access_token_expiry: u64, payload: serde_json::Value) -> Self {
        Self {
            uid: user_id.into(),
            ate: access_token_expiry,
            up: payload,
        }
    }

    /// Standard base64 of the JSON encoding.
    pub fn encode(&self) -> String {
        // Serializing a String, a u64 and a Value cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        BASE64_STANDARD.encode(json)
    }

    pub fn decode(value: &str) -> Result<Self, TokenError> {
        let bytes = BASE64_STANDARD
            .decode(value.trim())
            .map_err(|e| TokenError::MalformedFrontToken(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| TokenError::MalformedFrontToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_encode_is_byte_exact() {
        let info = TokenInfo::new("user-1", 1700000000000, json!({"sub": "x"}));
        let decoded = BASE64_STANDARD.decode(info.encode()).unwrap();
        assert_eq!(
            String::from_utf8(decoded).unwrap(),
            r#"{"uid":"user-1","ate":1700000000000,"up":{"sub":"x"}}"#
        );
    }

    #[test]
    fn test_decode() {
        let info = TokenInfo::new("user-2", 42, json!(null));
        assert_eq!(TokenInfo::decode(&info.encode()).unwrap(), info);
        assert!(TokenInfo::decode(FRONT_TOKEN_REMOVED).is_err());
    }
}
