//! Recipes
//!
//! A recipe is a named set of operations, mostly thin delegations to the
//! authentication core. Each recipe is a trait with a core-backed default
//! implementation. Applications change behaviour by wrapping a base instance
//! in an `Overridden*` decorator with an override that replaces only the
//! operations it names.

pub mod dashboard;
pub mod email_delivery;
pub mod emailpassword;
pub mod emailverification;
pub mod thirdparty;
pub mod thirdpartyemailpassword;

pub use dashboard::{CoreDashboardRecipe, DashboardOverride, DashboardRecipe, OverriddenDashboard};
pub use email_delivery::{EmailContent, EmailDeliveryService, EmailType, LogOnlyDelivery};
pub use emailpassword::EmailPasswordRecipe;
pub use emailverification::{
    CoreEmailVerificationRecipe, EmailVerificationConfig, EmailVerificationHooks,
    EmailVerificationOverride, EmailVerificationRecipe, OverriddenEmailVerification,
};
pub use thirdparty::{CoreThirdPartyRecipe, OverriddenThirdParty, ThirdPartyOverride, ThirdPartyRecipe};
pub use thirdpartyemailpassword::{EmailPasswordAdapter, ThirdPartyEmailPasswordRecipe};
