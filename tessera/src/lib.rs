//! # Tessera
//!
//! Tessera embeds session management, email verification, third-party sign-in
//! and an admin dashboard into a backend, against a central authentication
//! core that issues, verifies and rotates sessions.
//!
//! This crate bundles the normalized configuration, the core client and the
//! recipe instances into one [`Tessera`] value that the web integration
//! (`tessera-axum`) shares between handlers.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tessera::{AppInfo, CoreConfig, Tessera};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let tessera = Arc::new(
//!     Tessera::builder(AppInfo::from_env()?)
//!         .with_core(CoreConfig::from_env()?)?
//!         .build()?,
//! );
//! # Ok(())
//! # }
//! ```
use std::sync::Arc;

use tessera_core::recipe::{DashboardRecipe, EmailVerificationRecipe, ThirdPartyRecipe};

pub mod builder;

pub use builder::{NoCore, TesseraBuilder, TesseraBuilderError, WithCore};

/// Re-export core types from tessera_core
pub use tessera_core::{
    AntiCsrfMode, AppInfo, CookieSameSite, CoreConfig, DashboardConfig, Error, HttpQuerier,
    Querier, SessionConfig, TokenInfo, TokenType, TransferMethod, TransferPolicy, recipe,
};

/// The configured SDK: immutable settings plus the recipe instances.
///
/// Cheap to share behind an `Arc`; nothing in it is mutated after
/// [`TesseraBuilder::build`].
pub struct Tessera {
    app_info: Arc<AppInfo>,
    session_config: Arc<SessionConfig>,
    querier: Arc<dyn Querier>,
    dashboard: Arc<dyn DashboardRecipe>,
    email_verification: Arc<dyn EmailVerificationRecipe>,
    third_party: Arc<dyn ThirdPartyRecipe>,
}

impl Tessera {
    pub fn builder(app_info: AppInfo) -> TesseraBuilder<NoCore> {
        TesseraBuilder::new(app_info)
    }

    pub fn app_info(&self) -> &AppInfo {
        &self.app_info
    }

    pub fn session_config(&self) -> &Arc<SessionConfig> {
        &self.session_config
    }

    pub fn querier(&self) -> &Arc<dyn Querier> {
        &self.querier
    }

    pub fn dashboard(&self) -> &dyn DashboardRecipe {
        self.dashboard.as_ref()
    }

    pub fn email_verification(&self) -> &dyn EmailVerificationRecipe {
        self.email_verification.as_ref()
    }

    pub fn third_party(&self) -> &dyn ThirdPartyRecipe {
        self.third_party.as_ref()
    }
}
