//! Combined third-party and email/password recipe
//!
//! Users of the combined recipe may have signed up either way. Code written
//! against the plain [`EmailPasswordRecipe`] interface gets a view through
//! [`EmailPasswordAdapter`] that hides third-party users.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    recipe::{
        emailpassword::{
            self, CreateResetPasswordTokenResponse, EmailPasswordRecipe,
            ResetPasswordUsingTokenResponse, UpdateEmailOrPasswordResponse,
        },
        thirdparty::ThirdPartyInfo,
    },
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub time_joined: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub third_party: Option<ThirdPartyInfo>,
}

impl From<User> for emailpassword::User {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            time_joined: user.time_joined,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpResponse {
    Ok { user: User },
    EmailAlreadyExists,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInResponse {
    Ok { user: User },
    WrongCredentials,
}

#[async_trait]
pub trait ThirdPartyEmailPasswordRecipe: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResponse, Error>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse, Error>;

    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, Error>;

    async fn get_users_by_email(&self, email: &str) -> Result<Vec<User>, Error>;

    async fn create_reset_password_token(
        &self,
        user_id: &str,
    ) -> Result<CreateResetPasswordTokenResponse, Error>;

    async fn reset_password_using_token(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<ResetPasswordUsingTokenResponse, Error>;

    async fn update_email_or_password(
        &self,
        user_id: &str,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<UpdateEmailOrPasswordResponse, Error>;
}

/// Exposes a combined recipe through the email/password interface.
pub struct EmailPasswordAdapter {
    inner: Arc<dyn ThirdPartyEmailPasswordRecipe>,
}

impl EmailPasswordAdapter {
    pub fn new(inner: Arc<dyn ThirdPartyEmailPasswordRecipe>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl EmailPasswordRecipe for EmailPasswordAdapter {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<emailpassword::SignUpResponse, Error> {
        Ok(match self.inner.sign_up(email, password).await? {
            SignUpResponse::Ok { user } => emailpassword::SignUpResponse::Ok { user: user.into() },
            SignUpResponse::EmailAlreadyExists => emailpassword::SignUpResponse::EmailAlreadyExists,
        })
    }

    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<emailpassword::SignInResponse, Error> {
        Ok(match self.inner.sign_in(email, password).await? {
            SignInResponse::Ok { user } => emailpassword::SignInResponse::Ok { user: user.into() },
            SignInResponse::WrongCredentials => emailpassword::SignInResponse::WrongCredentials,
        })
    }

    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<emailpassword::User>, Error> {
        Ok(self
            .inner
            .get_user_by_id(user_id)
            .await?
            .filter(|user| user.third_party.is_none())
            .map(Into::into))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<emailpassword::User>, Error> {
        Ok(self
            .inner
            .get_users_by_email(email)
            .await?
            .into_iter()
            .find(|user| user.third_party.is_none())
            .map(Into::into))
    }

    async fn create_reset_password_token(
        &self,
        user_id: &str,
    ) -> Result<CreateResetPasswordTokenResponse, Error> {
        self.inner.create_reset_password_token(user_id).await
    }

    async fn reset_password_using_token(
        &self,
        token: &str,
        new_password: &str,
    ) -> Result<ResetPasswordUsingTokenResponse, Error> {
        self.inner
            .reset_password_using_token(token, new_password)
            .await
    }

    async fn update_email_or_password(
        &self,
        user_id: &str,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<UpdateEmailOrPasswordResponse, Error> {
        self.inner
            .update_email_or_password(user_id, email, password)
            .await
    }
}
