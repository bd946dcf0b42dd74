//! Third-party sign-in recipe
//!
//! The OAuth exchange with the provider happens elsewhere; by the time this
//! recipe is called the provider's user id and email are known, and the core
//! links them to a user of record.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    Error,
    error::RecipeError,
    querier::{CoreResponse, Querier, status_of},
    validation::validate_email,
};

const USER_PATH: &str = "/recipe/user";
const USERS_BY_EMAIL_PATH: &str = "/recipe/users/by-email";
const SIGN_IN_UP_PATH: &str = "/recipe/signinup";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThirdPartyInfo {
    pub id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub time_joined: u64,
    pub third_party: ThirdPartyInfo,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInUpResponse {
    pub created_new_user: bool,
    pub user: User,
}

#[async_trait]
pub trait ThirdPartyRecipe: Send + Sync {
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, Error>;

    async fn get_users_by_email(&self, email: &str) -> Result<Vec<User>, Error>;

    async fn get_user_by_third_party_info(
        &self,
        third_party_id: &str,
        third_party_user_id: &str,
    ) -> Result<Option<User>, Error>;

    async fn sign_in_up(
        &self,
        third_party_id: &str,
        third_party_user_id: &str,
        email: &str,
    ) -> Result<SignInUpResponse, Error>;
}

pub struct CoreThirdPartyRecipe {
    querier: Arc<dyn Querier>,
}

impl CoreThirdPartyRecipe {
    pub fn new(querier: Arc<dyn Querier>) -> Self {
        Self { querier }
    }

    async fn get_single_user(&self, query: &[(&str, &str)]) -> Result<Option<User>, Error> {
        let response = self.querier.send_get_request(USER_PATH, query).await?;
        match status_of(&response) {
            Some("OK") => Ok(Some(user_from(&response)?)),
            Some("UNKNOWN_USER_ID_ERROR") | Some("UNKNOWN_THIRD_PARTY_USER_ERROR") => Ok(None),
            other => Err(RecipeError::UnexpectedStatus(other.unwrap_or_default().to_string()).into()),
        }
    }
}

fn user_from(response: &CoreResponse) -> Result<User, Error> {
    let user = response
        .get("user")
        .cloned()
        .ok_or_else(|| RecipeError::UnexpectedStatus("OK without user".to_string()))?;
    parse_user(user)
}

fn parse_user(user: Value) -> Result<User, Error> {
    serde_json::from_value(user)
        .map_err(|e| RecipeError::UnexpectedStatus(format!("malformed user: {e}")).into())
}

#[async_trait]
impl ThirdPartyRecipe for CoreThirdPartyRecipe {
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, Error> {
        self.get_single_user(&[("userId", user_id)]).await
    }

    async fn get_users_by_email(&self, email: &str) -> Result<Vec<User>, Error> {
        let response = self
            .querier
            .send_get_request(USERS_BY_EMAIL_PATH, &[("email", email)])
            .await?;

        match status_of(&response) {
            Some("OK") => response
                .get("users")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default()
                .into_iter()
                .map(parse_user)
                .collect(),
            other => Err(RecipeError::UnexpectedStatus(other.unwrap_or_default().to_string()).into()),
        }
    }

    async fn get_user_by_third_party_info(
        &self,
        third_party_id: &str,
        third_party_user_id: &str,
    ) -> Result<Option<User>, Error> {
        self.get_single_user(&[
            ("thirdPartyId", third_party_id),
            ("thirdPartyUserId", third_party_user_id),
        ])
        .await
    }

    async fn sign_in_up(
        &self,
        third_party_id: &str,
        third_party_user_id: &str,
        email: &str,
    ) -> Result<SignInUpResponse, Error> {
        validate_email(email)?;

        let response = self
            .querier
            .send_post_request(
                SIGN_IN_UP_PATH,
                json!({
                    "thirdPartyId": third_party_id,
                    "thirdPartyUserId": third_party_user_id,
                    "email": { "id": email },
                }),
            )
            .await?;

        match status_of(&response) {
            Some("OK") => Ok(SignInUpResponse {
                created_new_user: response
                    .get("createdNewUser")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                user: user_from(&response)?,
            }),
            other => Err(RecipeError::UnexpectedStatus(other.unwrap_or_default().to_string()).into()),
        }
    }
}

/// Selective replacement of third-party operations; see
/// [`crate::recipe::dashboard::DashboardOverride`].
#[async_trait]
pub trait ThirdPartyOverride: Send + Sync {
    async fn get_user_by_id(
        &self,
        base: &dyn ThirdPartyRecipe,
        user_id: &str,
    ) -> Result<Option<User>, Error> {
        base.get_user_by_id(user_id).await
    }

    async fn get_users_by_email(
        &self,
        base: &dyn ThirdPartyRecipe,
        email: &str,
    ) -> Result<Vec<User>, Error> {
        base.get_users_by_email(email).await
    }

    async fn get_user_by_third_party_info(
        &self,
        base: &dyn ThirdPartyRecipe,
        third_party_id: &str,
        third_party_user_id: &str,
    ) -> Result<Option<User>, Error> {
        base.get_user_by_third_party_info(third_party_id, third_party_user_id)
            .await
    }

    async fn sign_in_up(
        &self,
        base: &dyn ThirdPartyRecipe,
        third_party_id: &str,
        third_party_user_id: &str,
        email: &str,
    ) -> Result<SignInUpResponse, Error> {
        base.sign_in_up(third_party_id, third_party_user_id, email)
            .await
    }
}

pub struct OverriddenThirdParty<O> {
    base: Arc<dyn ThirdPartyRecipe>,
    overrides: O,
}

impl<O: ThirdPartyOverride> OverriddenThirdParty<O> {
    pub fn new(base: Arc<dyn ThirdPartyRecipe>, overrides: O) -> Self {
        Self { base, overrides }
    }
}

#[async_trait]
impl<O: ThirdPartyOverride> ThirdPartyRecipe for OverriddenThirdParty<O> {
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, Error> {
        self.overrides.get_user_by_id(self.base.as_ref(), user_id).await
    }

    async fn get_users_by_email(&self, email: &str) -> Result<Vec<User>, Error> {
        self.overrides
            .get_users_by_email(self.base.as_ref(), email)
            .await
    }

    async fn get_user_by_third_party_info(
        &self,
        third_party_id: &str,
        third_party_user_id: &str,
    ) -> Result<Option<User>, Error> {
        self.overrides
            .get_user_by_third_party_info(self.base.as_ref(), third_party_id, third_party_user_id)
            .await
    }

    async fn sign_in_up(
        &self,
        third_party_id: &str,
        third_party_user_id: &str,
        email: &str,
    ) -> Result<SignInUpResponse, Error> {
        self.overrides
            .sign_in_up(self.base.as_ref(), third_party_id, third_party_user_id, email)
            .await
    }
}
