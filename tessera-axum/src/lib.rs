//! # Tessera Axum Integration
//!
//! Session token transport for Axum: reading access and refresh tokens from
//! requests, and writing them, the anti-CSRF token and the front token onto
//! responses, over either cookies or headers.
//!
//! Responses are staged in a [`ResponseHeaders`], which keeps at most one
//! `Set-Cookie` per cookie name and is returned from the handler as response
//! parts.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::Router;
//! use tessera::{AppInfo, CoreConfig, Tessera};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let tessera = Arc::new(
//!         Tessera::builder(AppInfo::from_env()?)
//!             .with_core(CoreConfig::from_env()?)?
//!             .build()?,
//!     );
//!
//!     let app = Router::new().nest("/auth", tessera_axum::routes(tessera));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

mod anti_csrf;
mod clear;
mod codec;
mod error;
mod extractors;
mod front_token;
pub mod headers;
mod middleware;
mod routes;
mod tokens;
mod transfer;
mod types;

pub use anti_csrf::{get_anti_csrf_token, set_anti_csrf_token, verify_anti_csrf};
pub use clear::{clear_session, clear_session_all_transfer_methods};
pub use codec::{
    ResponseHeaders, escape, read_cookie, read_header, remove_header, unescape, write_cookie,
    write_header,
};
pub use error::{AuthError, Result, TransportError};
pub use extractors::{AuthMode, FrontendSdk, RefreshToken, SessionTokens};
pub use front_token::{announce_front_token, announce_front_token_removed};
pub use headers::{allowed_cors_headers, allowed_cors_headers_with_sdk};
pub use middleware::{TesseraState, require_dashboard_access};
pub use routes::create_router;
pub use tokens::{cookie_name_for, get_token, get_token_any, response_header_name_for, set_token};
pub use transfer::select_transfer_method;
pub use types::{BundleResponse, HealthResponse, StatusResponse};

use std::sync::Arc;

use axum::Router;
use tessera::Tessera;

/// Routes for signing out, the dashboard bundle and health checks.
///
/// Nest the router under the API base path, e.g. `/auth`. Handlers inside it
/// can use the [`SessionTokens`] extractor.
pub fn routes(tessera: Arc<Tessera>) -> Router {
    create_router(tessera)
}
