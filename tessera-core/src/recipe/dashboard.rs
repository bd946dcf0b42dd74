//! Admin dashboard recipe
//!
//! The dashboard itself is a static bundle served from a CDN; the backend only
//! decides who may use its API.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::{
    Error,
    config::DashboardConfig,
    querier::{Querier, is_ok},
};

/// Version of the dashboard bundle the backend points browsers at.
pub const DASHBOARD_VERSION: &str = "0.7";

pub const DASHBOARD_SESSION_VERIFY_PATH: &str = "/recipe/dashboard/session/verify";

#[async_trait]
pub trait DashboardRecipe: Send + Sync {
    /// Base URL of the dashboard bundle.
    async fn bundle_location(&self) -> Result<String, Error>;

    /// Decide whether a dashboard API request may proceed, given the raw
    /// `authorization` header if the request had one.
    async fn should_allow_access(&self, authorization: Option<&str>) -> Result<bool, Error>;
}

/// The default implementation, backed by the authentication core.
pub struct CoreDashboardRecipe {
    querier: Arc<dyn Querier>,
    config: DashboardConfig,
}

impl CoreDashboardRecipe {
    pub fn new(querier: Arc<dyn Querier>, config: DashboardConfig) -> Self {
        Self { querier, config }
    }
}

#[async_trait]
impl DashboardRecipe for CoreDashboardRecipe {
    async fn bundle_location(&self) -> Result<String, Error> {
        Ok(format!(
            "https://cdn.jsdelivr.net/gh/supertokens/dashboard@v{DASHBOARD_VERSION}/build/"
        ))
    }

    async fn should_allow_access(&self, authorization: Option<&str>) -> Result<bool, Error> {
        let credential = last_credential_part(authorization.unwrap_or_default());

        match &self.config.api_key {
            Some(api_key) => Ok(constant_time_eq(credential.as_bytes(), api_key.as_bytes())),
            None => {
                let response = self
                    .querier
                    .send_post_request(
                        DASHBOARD_SESSION_VERIFY_PATH,
                        json!({ "sessionId": credential }),
                    )
                    .await?;
                Ok(is_ok(&response))
            }
        }
    }
}

// Credentials arrive as `Bearer <value>`; only the value matters.
fn last_credential_part(header: &str) -> &str {
    header.split(' ').next_back().unwrap_or_default()
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Selective replacement of dashboard operations.
///
/// Every method defaults to the base implementation, so an override only
/// implements what it changes.
#[async_trait]
pub trait DashboardOverride: Send + Sync {
    async fn bundle_location(&self, base: &dyn DashboardRecipe) -> Result<String, Error> {
        base.bundle_location().await
    }

    async fn should_allow_access(
        &self,
        base: &dyn DashboardRecipe,
        authorization: Option<&str>,
    ) -> Result<bool, Error> {
        base.should_allow_access(authorization).await
    }
}

/// A dashboard recipe with an override applied on top of a base instance.
pub struct OverriddenDashboard<O> {
    base: Arc<dyn DashboardRecipe>,
    overrides: O,
}

impl<O: DashboardOverride> OverriddenDashboard<O> {
    pub fn new(base: Arc<dyn DashboardRecipe>, overrides: O) -> Self {
        Self { base, overrides }
    }
}

#[async_trait]
impl<O: DashboardOverride> DashboardRecipe for OverriddenDashboard<O> {
    async fn bundle_location(&self) -> Result<String, Error> {
        self.overrides.bundle_location(self.base.as_ref()).await
    }

    async fn should_allow_access(&self, authorization: Option<&str>) -> Result<bool, Error> {
        self.overrides
            .should_allow_access(self.base.as_ref(), authorization)
            .await
    }
}
