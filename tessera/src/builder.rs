//! Builder pattern for constructing Tessera instances
//!
//! The builder uses a type-state to make sure the authentication core is
//! configured before building.
//!
//! # Example
//!
//! ```rust,no_run
//! use tessera::{AppInfo, CoreConfig, TesseraBuilder};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app_info = AppInfo::new("My App", "https://api.example.com", "https://example.com")?;
//!
//! let tessera = TesseraBuilder::new(app_info)
//!     .with_core(CoreConfig::new("http://localhost:3567"))?
//!     .with_session(|session| session.cookie_domain(".example.com"))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tessera_core::{
    AppInfo, CoreConfig, DashboardConfig, HttpQuerier, Querier, SessionConfig,
    config::SessionConfigBuilder,
    recipe::{
        CoreDashboardRecipe, CoreEmailVerificationRecipe, CoreThirdPartyRecipe, DashboardOverride,
        DashboardRecipe, EmailVerificationOverride, EmailVerificationRecipe, OverriddenDashboard,
        OverriddenEmailVerification, OverriddenThirdParty, ThirdPartyOverride, ThirdPartyRecipe,
    },
};

use crate::Tessera;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur when building a Tessera instance.
#[derive(Debug, thiserror::Error)]
pub enum TesseraBuilderError {
    /// The core client could not be set up
    #[error("Core connection setup failed: {0}")]
    CoreConnection(String),

    /// Invalid configuration provided
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

// ============================================================================
// Type-State Markers
// ============================================================================

/// Marker type indicating no core has been configured yet.
pub struct NoCore;

/// Marker type indicating the core client is configured.
pub struct WithCore {
    querier: Arc<dyn Querier>,
}

type SessionCustomizer = Box<dyn FnOnce(SessionConfigBuilder) -> SessionConfigBuilder>;
type Decorator<R> = Box<dyn FnOnce(Arc<R>) -> Arc<R>>;

// ============================================================================
// Builder Implementation
// ============================================================================

/// A type-safe builder for constructing [`Tessera`] instances.
///
/// - [`NoCore`]: initial state, a core must be configured
/// - [`WithCore`]: ready to build or add more configuration
pub struct TesseraBuilder<Core> {
    core: Core,
    app_info: AppInfo,
    session: Option<SessionCustomizer>,
    dashboard_config: DashboardConfig,
    dashboard_override: Option<Decorator<dyn DashboardRecipe>>,
    email_verification_override: Option<Decorator<dyn EmailVerificationRecipe>>,
    third_party_override: Option<Decorator<dyn ThirdPartyRecipe>>,
}

impl TesseraBuilder<NoCore> {
    pub fn new(app_info: AppInfo) -> Self {
        Self {
            core: NoCore,
            app_info,
            session: None,
            dashboard_config: DashboardConfig::default(),
            dashboard_override: None,
            email_verification_override: None,
            third_party_override: None,
        }
    }

    /// Connect to the authentication core over HTTP.
    pub fn with_core(
        self,
        config: CoreConfig,
    ) -> Result<TesseraBuilder<WithCore>, TesseraBuilderError> {
        let querier = HttpQuerier::new(&config)
            .map_err(|e| TesseraBuilderError::CoreConnection(e.to_string()))?;
        Ok(self.with_querier(Arc::new(querier)))
    }

    /// Use an existing core client, e.g. an in-process fake in tests.
    pub fn with_querier(self, querier: Arc<dyn Querier>) -> TesseraBuilder<WithCore> {
        TesseraBuilder {
            core: WithCore { querier },
            app_info: self.app_info,
            session: self.session,
            dashboard_config: self.dashboard_config,
            dashboard_override: self.dashboard_override,
            email_verification_override: self.email_verification_override,
            third_party_override: self.third_party_override,
        }
    }
}

impl<Core> TesseraBuilder<Core> {
    /// Adjust session settings on top of the defaults derived from [`AppInfo`].
    pub fn with_session(
        mut self,
        customize: impl FnOnce(SessionConfigBuilder) -> SessionConfigBuilder + 'static,
    ) -> Self {
        self.session = Some(Box::new(customize));
        self
    }

    pub fn with_dashboard(mut self, config: DashboardConfig) -> Self {
        self.dashboard_config = config;
        self
    }

    pub fn override_dashboard(mut self, overrides: impl DashboardOverride + 'static) -> Self {
        self.dashboard_override = Some(Box::new(
            move |base: Arc<dyn DashboardRecipe>| -> Arc<dyn DashboardRecipe> {
                Arc::new(OverriddenDashboard::new(base, overrides))
            },
        ));
        self
    }

    pub fn override_email_verification(
        mut self,
        overrides: impl EmailVerificationOverride + 'static,
    ) -> Self {
        self.email_verification_override = Some(Box::new(
            move |base: Arc<dyn EmailVerificationRecipe>| -> Arc<dyn EmailVerificationRecipe> {
                Arc::new(OverriddenEmailVerification::new(base, overrides))
            },
        ));
        self
    }

    pub fn override_third_party(mut self, overrides: impl ThirdPartyOverride + 'static) -> Self {
        self.third_party_override = Some(Box::new(
            move |base: Arc<dyn ThirdPartyRecipe>| -> Arc<dyn ThirdPartyRecipe> {
                Arc::new(OverriddenThirdParty::new(base, overrides))
            },
        ));
        self
    }
}

impl TesseraBuilder<WithCore> {
    /// Normalize the configuration and assemble the recipes.
    pub fn build(self) -> Result<Tessera, TesseraBuilderError> {
        let mut session = SessionConfig::builder(&self.app_info);
        if let Some(customize) = self.session {
            session = customize(session);
        }
        let session_config = session
            .build()
            .map_err(|e| TesseraBuilderError::InvalidConfiguration(e.to_string()))?;

        let querier = self.core.querier;

        let mut dashboard: Arc<dyn DashboardRecipe> = Arc::new(CoreDashboardRecipe::new(
            querier.clone(),
            self.dashboard_config,
        ));
        if let Some(decorate) = self.dashboard_override {
            dashboard = decorate(dashboard);
        }

        let mut email_verification: Arc<dyn EmailVerificationRecipe> =
            Arc::new(CoreEmailVerificationRecipe::new(querier.clone()));
        if let Some(decorate) = self.email_verification_override {
            email_verification = decorate(email_verification);
        }

        let mut third_party: Arc<dyn ThirdPartyRecipe> =
            Arc::new(CoreThirdPartyRecipe::new(querier.clone()));
        if let Some(decorate) = self.third_party_override {
            third_party = decorate(third_party);
        }

        tracing::info!(
            app.name = %self.app_info.app_name,
            api.origin = %self.app_info.api_origin(),
            cookie.same_site = ?session_config.cookie_same_site,
            cookie.secure = session_config.cookie_secure,
            "Tessera configured"
        );

        Ok(Tessera {
            app_info: Arc::new(self.app_info),
            session_config: Arc::new(session_config),
            querier,
            dashboard,
            email_verification,
            third_party,
        })
    }
}
