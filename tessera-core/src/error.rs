use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Core request failed: {0}")]
    Querier(#[from] QuerierError),

    #[error("Recipe error: {0}")]
    Recipe(#[from] RecipeError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid domain: {0}")]
    InvalidDomain(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Missing required setting: {0}")]
    Missing(String),

    #[error(
        "API and website domains are on different sites, so cookies must use SameSite=None together with Secure"
    )]
    InsecureCrossSite,
}

/// Raised when a token type or transfer method is parsed from a string that
/// does not name a known variant. Code holding the enums never sees these.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Unknown token type: {0}")]
    UnknownTokenType(String),

    #[error("Unknown transfer method: {0}")]
    UnknownTransferMethod(String),

    #[error("Unknown anti-csrf mode: {0}")]
    UnknownAntiCsrfMode(String),

    #[error("Unknown same-site policy: {0}")]
    UnknownSameSite(String),

    #[error("Malformed front token: {0}")]
    MalformedFrontToken(String),
}

#[derive(Debug, Error)]
pub enum QuerierError {
    #[error("No core hosts configured")]
    NoHosts,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Core responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed core response: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("Unknown user id")]
    UnknownUserId,

    #[error("Unexpected core status: {0}")]
    UnexpectedStatus(String),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl Error {
    /// Whether the error came from reaching the authentication core, as
    /// opposed to local misconfiguration or bad input.
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Error::Querier(_))
    }

    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = Error::Token(TokenError::UnknownTokenType("idToken".to_string()));
        assert_eq!(error.to_string(), "Token error: Unknown token type: idToken");

        let error = Error::Querier(QuerierError::Status {
            status: 500,
            body: "boom".to_string(),
        });
        assert_eq!(
            error.to_string(),
            "Core request failed: Core responded with 500: boom"
        );

        let error = Error::Recipe(RecipeError::UnknownUserId);
        assert_eq!(error.to_string(), "Recipe error: Unknown user id");
    }

    #[test]
    fn test_is_transport_failure() {
        assert!(Error::Querier(QuerierError::NoHosts).is_transport_failure());
        assert!(Error::Querier(QuerierError::Decode("eof".to_string())).is_transport_failure());
        assert!(!Error::Config(ConfigError::InsecureCrossSite).is_transport_failure());
    }

    #[test]
    fn test_error_from_conversions() {
        let error: Error = ConfigError::InvalidPath("a b".to_string()).into();
        assert!(error.is_config_error());

        let error: Error = ValidationError::MissingField("email".to_string()).into();
        assert!(matches!(
            error,
            Error::Validation(ValidationError::MissingField(_))
        ));
    }
}
