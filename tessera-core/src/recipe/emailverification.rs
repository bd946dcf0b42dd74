//! Email verification recipe
//!
//! Tokens are minted and consumed by the authentication core. The backend
//! only knows how to find a user's email, where the verification page lives,
//! and how to deliver the link.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    Error,
    config::AppInfo,
    error::RecipeError,
    querier::{Querier, status_of},
    recipe::email_delivery::{EmailDeliveryService, EmailType, LogOnlyDelivery},
    validation::{validate_email, validate_user_id},
};

pub const RECIPE_ID: &str = "emailverification";

const VERIFY_TOKEN_PATH: &str = "/recipe/user/email/verify/token";
const VERIFY_PATH: &str = "/recipe/user/email/verify";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateTokenResponse {
    Ok { token: String },
    EmailAlreadyVerified,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyEmailResponse {
    Ok { user: User },
    InvalidToken,
}

#[async_trait]
pub trait EmailVerificationRecipe: Send + Sync {
    async fn create_email_verification_token(
        &self,
        user_id: &str,
        email: &str,
    ) -> Result<CreateTokenResponse, Error>;

    async fn verify_email_using_token(&self, token: &str) -> Result<VerifyEmailResponse, Error>;

    async fn is_email_verified(&self, user_id: &str, email: &str) -> Result<bool, Error>;
}

pub struct CoreEmailVerificationRecipe {
    querier: Arc<dyn Querier>,
}

impl CoreEmailVerificationRecipe {
    pub fn new(querier: Arc<dyn Querier>) -> Self {
        Self { querier }
    }
}

#[async_trait]
impl EmailVerificationRecipe for CoreEmailVerificationRecipe {
    async fn create_email_verification_token(
        &self,
        user_id: &str,
        email: &str,
    ) -> Result<CreateTokenResponse, Error> {
        let response = self
            .querier
            .send_post_request(VERIFY_TOKEN_PATH, json!({ "userId": user_id, "email": email }))
            .await?;

        match status_of(&response) {
            Some("OK") => {
                let token = response
                    .get("token")
                    .and_then(Value::as_str)
                    .ok_or_else(|| RecipeError::UnexpectedStatus("OK without token".to_string()))?;
                Ok(CreateTokenResponse::Ok {
                    token: token.to_string(),
                })
            }
            Some("EMAIL_ALREADY_VERIFIED_ERROR") => Ok(CreateTokenResponse::EmailAlreadyVerified),
            other => Err(RecipeError::UnexpectedStatus(other.unwrap_or_default().to_string()).into()),
        }
    }

    async fn verify_email_using_token(&self, token: &str) -> Result<VerifyEmailResponse, Error> {
        let response = self
            .querier
            .send_post_request(VERIFY_PATH, json!({ "method": "token", "token": token }))
            .await?;

        match status_of(&response) {
            Some("OK") => {
                let field = |name: &str| {
                    response
                        .get(name)
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .ok_or_else(|| RecipeError::UnexpectedStatus(format!("OK without {name}")))
                };
                Ok(VerifyEmailResponse::Ok {
                    user: User {
                        id: field("userId")?,
                        email: field("email")?,
                    },
                })
            }
            Some("EMAIL_VERIFICATION_INVALID_TOKEN_ERROR") => Ok(VerifyEmailResponse::InvalidToken),
            other => Err(RecipeError::UnexpectedStatus(other.unwrap_or_default().to_string()).into()),
        }
    }

    async fn is_email_verified(&self, user_id: &str, email: &str) -> Result<bool, Error> {
        let response = self
            .querier
            .send_get_request(VERIFY_PATH, &[("userId", user_id), ("email", email)])
            .await?;

        match status_of(&response) {
            Some("OK") => Ok(response
                .get("isVerified")
                .and_then(Value::as_bool)
                .unwrap_or(false)),
            other => Err(RecipeError::UnexpectedStatus(other.unwrap_or_default().to_string()).into()),
        }
    }
}

/// Application-provided lookups the recipe cannot do on its own.
#[async_trait]
pub trait EmailVerificationHooks: Send + Sync {
    async fn email_for_user_id(&self, user_id: &str) -> Result<String, Error>;

    /// URL of the page that consumes the token. Defaults to the configured one.
    async fn verification_url(&self, _user: &User, default_url: &str) -> Result<String, Error> {
        Ok(default_url.to_string())
    }
}

/// Normalized email verification settings.
pub struct EmailVerificationConfig {
    pub app_name: String,
    pub verification_url: String,
    pub hooks: Arc<dyn EmailVerificationHooks>,
    pub delivery: Arc<dyn EmailDeliveryService>,
}

impl EmailVerificationConfig {
    /// Verification page defaults to `<website domain><website base path>/verify-email`;
    /// delivery defaults to logging.
    pub fn new(app_info: &AppInfo, hooks: Arc<dyn EmailVerificationHooks>) -> Self {
        Self {
            app_name: app_info.app_name.clone(),
            verification_url: format!(
                "{}{}/verify-email",
                app_info.website_origin(),
                app_info.website_base_path
            ),
            hooks,
            delivery: Arc::new(LogOnlyDelivery::new(app_info.app_name.clone())),
        }
    }

    pub fn with_delivery(mut self, delivery: Arc<dyn EmailDeliveryService>) -> Self {
        self.delivery = delivery;
        self
    }
}

/// Outcome of [`send_verification_email`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendVerificationEmailResponse {
    Sent { link: String },
    EmailAlreadyVerified,
}

/// Mint a token for the user and email them a link carrying it.
pub async fn send_verification_email(
    recipe: &dyn EmailVerificationRecipe,
    config: &EmailVerificationConfig,
    user_id: &str,
) -> Result<SendVerificationEmailResponse, Error> {
    validate_user_id(user_id)?;
    let email = config.hooks.email_for_user_id(user_id).await?;
    validate_email(&email)?;

    let token = match recipe.create_email_verification_token(user_id, &email).await? {
        CreateTokenResponse::Ok { token } => token,
        CreateTokenResponse::EmailAlreadyVerified => {
            tracing::debug!(user.id = user_id, "Email already verified, nothing to send");
            return Ok(SendVerificationEmailResponse::EmailAlreadyVerified);
        }
    };

    let user = User {
        id: user_id.to_string(),
        email,
    };
    let base_url = config
        .hooks
        .verification_url(&user, &config.verification_url)
        .await?;
    let link = format!(
        "{base_url}?token={}&rid={RECIPE_ID}",
        urlencode_component(&token)
    );

    config
        .delivery
        .send_email(EmailType::EmailVerification {
            user,
            link: link.clone(),
        })
        .await?;

    Ok(SendVerificationEmailResponse::Sent { link })
}

fn urlencode_component(value: &str) -> String {
    reqwest::Url::parse_with_params("http://x/", [("v", value)])
        .ok()
        .and_then(|url| url.query().map(|q| q.trim_start_matches("v=").to_string()))
        .unwrap_or_default()
}

/// Selective replacement of email verification operations; see
/// [`crate::recipe::dashboard::DashboardOverride`].
#[async_trait]
pub trait EmailVerificationOverride: Send + Sync {
    async fn create_email_verification_token(
        &self,
        base: &dyn EmailVerificationRecipe,
        user_id: &str,
        email: &str,
    ) -> Result<CreateTokenResponse, Error> {
        base.create_email_verification_token(user_id, email).await
    }

    async fn verify_email_using_token(
        &self,
        base: &dyn EmailVerificationRecipe,
        token: &str,
    ) -> Result<VerifyEmailResponse, Error> {
        base.verify_email_using_token(token).await
    }

    async fn is_email_verified(
        &self,
        base: &dyn EmailVerificationRecipe,
        user_id: &str,
        email: &str,
    ) -> Result<bool, Error> {
        base.is_email_verified(user_id, email).await
    }
}

pub struct OverriddenEmailVerification<O> {
    base: Arc<dyn EmailVerificationRecipe>,
    overrides: O,
}

impl<O: EmailVerificationOverride> OverriddenEmailVerification<O> {
    pub fn new(base: Arc<dyn EmailVerificationRecipe>, overrides: O) -> Self {
        Self { base, overrides }
    }
}

#[async_trait]
impl<O: EmailVerificationOverride> EmailVerificationRecipe for OverriddenEmailVerification<O> {
    async fn create_email_verification_token(
        &self,
        user_id: &str,
        email: &str,
    ) -> Result<CreateTokenResponse, Error> {
        self.overrides
            .create_email_verification_token(self.base.as_ref(), user_id, email)
            .await
    }

    async fn verify_email_using_token(&self, token: &str) -> Result<VerifyEmailResponse, Error> {
        self.overrides
            .verify_email_using_token(self.base.as_ref(), token)
            .await
    }

    async fn is_email_verified(&self, user_id: &str, email: &str) -> Result<bool, Error> {
        self.overrides
            .is_email_verified(self.base.as_ref(), user_id, email)
            .await
    }
}
