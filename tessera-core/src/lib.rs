//! Core functionality for the tessera session SDK
//!
//! This crate holds everything that does not depend on a web framework: the
//! normalized configuration, the error types, the token and transfer-method
//! enums, the front-token payload, the client for the authentication core and
//! the recipe interfaces.
//!
//! Application code usually depends on `tessera` and `tessera-axum` instead.
//!
//! See [`SessionConfig`] for the session settings, [`Querier`] for the core
//! client, and the [`recipe`] module for the recipes.
//!
pub mod config;
pub mod error;
pub mod front_token;
pub mod querier;
pub mod recipe;
pub mod transfer;
pub mod validation;

pub use config::{AppInfo, CookieSameSite, CoreConfig, DashboardConfig, SessionConfig};
pub use error::Error;
pub use front_token::TokenInfo;
pub use querier::{HttpQuerier, Querier};
pub use transfer::{AntiCsrfMode, TokenType, TransferMethod, TransferPolicy};
