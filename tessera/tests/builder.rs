//! Tests for the Tessera builder pattern

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tessera::{
    AppInfo, CookieSameSite, CoreConfig, DashboardConfig, Error, Querier, Tessera,
    TesseraBuilderError, TransferPolicy,
    recipe::{DashboardOverride, DashboardRecipe},
};
use tessera_core::querier::CoreResponse;

struct OkCore;

#[async_trait]
impl Querier for OkCore {
    async fn send_post_request(&self, _path: &str, _body: Value) -> Result<CoreResponse, Error> {
        Ok(json!({ "status": "OK" }).as_object().unwrap().clone())
    }

    async fn send_get_request(
        &self,
        _path: &str,
        _query: &[(&str, &str)],
    ) -> Result<CoreResponse, Error> {
        Ok(json!({ "status": "OK", "isVerified": true })
            .as_object()
            .unwrap()
            .clone())
    }
}

fn app_info() -> AppInfo {
    AppInfo::new("Demo", "https://api.example.com", "https://example.com").unwrap()
}

#[test]
fn test_builder_with_querier() {
    let tessera = Tessera::builder(app_info())
        .with_querier(Arc::new(OkCore))
        .build()
        .expect("Failed to build Tessera");

    let config = tessera.session_config();
    assert_eq!(config.cookie_same_site, CookieSameSite::Lax);
    assert_eq!(config.refresh_token_path, "/auth/session/refresh");
    assert_eq!(config.token_transfer, TransferPolicy::Any);
}

#[test]
fn test_builder_session_customization() {
    let tessera = Tessera::builder(app_info())
        .with_session(|session| {
            session
                .cookie_same_site(CookieSameSite::Strict)
                .token_transfer(TransferPolicy::Cookie)
        })
        .with_querier(Arc::new(OkCore))
        .build()
        .unwrap();

    assert_eq!(
        tessera.session_config().cookie_same_site,
        CookieSameSite::Strict
    );
    assert_eq!(
        tessera.session_config().token_transfer,
        TransferPolicy::Cookie
    );
}

#[test]
fn test_builder_rejects_insecure_cross_site() {
    let app_info =
        AppInfo::new("Demo", "http://api.example.com", "https://app.other.org").unwrap();
    let result = Tessera::builder(app_info)
        .with_querier(Arc::new(OkCore))
        .build();

    assert!(matches!(
        result,
        Err(TesseraBuilderError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_builder_with_core_requires_hosts() {
    let result = Tessera::builder(app_info()).with_core(CoreConfig::new(""));
    assert!(matches!(result, Err(TesseraBuilderError::CoreConnection(_))));

    assert!(
        Tessera::builder(app_info())
            .with_core(CoreConfig::new("http://localhost:3567"))
            .is_ok()
    );
}

struct ReadOnlyDashboard;

#[async_trait]
impl DashboardOverride for ReadOnlyDashboard {
    async fn bundle_location(&self, _base: &dyn DashboardRecipe) -> Result<String, Error> {
        Ok("https://cdn.example.com/dashboard/".to_string())
    }
}

#[tokio::test]
async fn test_builder_applies_overrides() {
    let tessera = Tessera::builder(app_info())
        .with_dashboard(DashboardConfig::with_api_key("k3y"))
        .override_dashboard(ReadOnlyDashboard)
        .with_querier(Arc::new(OkCore))
        .build()
        .unwrap();

    assert_eq!(
        tessera.dashboard().bundle_location().await.unwrap(),
        "https://cdn.example.com/dashboard/"
    );
    // Operations the override does not name still reach the base recipe.
    assert!(
        tessera
            .dashboard()
            .should_allow_access(Some("Bearer k3y"))
            .await
            .unwrap()
    );
    assert!(
        tessera
            .email_verification()
            .is_email_verified("u-1", "ada@example.com")
            .await
            .unwrap()
    );
}
