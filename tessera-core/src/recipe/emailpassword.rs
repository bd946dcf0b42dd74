//! Email/password recipe interface

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub time_joined: u64,
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateResetPasswordTokenResponse {
    Ok { token: String },
    UnknownUserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetPasswordUsingTokenResponse {
    Ok { user_id: Option<String> },
    InvalidToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateEmailOrPasswordResponse {
    Ok,
    UnknownUserId,
    EmailAlreadyExists,
}

#[async_trait]
pub trait EmailPasswordRecipe: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<SignUpResponse, Error>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<SignInResponse, Error>;

    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, Error>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, Error>;

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
