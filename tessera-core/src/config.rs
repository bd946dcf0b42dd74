//! Configuration normalization
//!
//! Configuration is normalized exactly once, when the application starts, and
//! is immutable afterwards. Components receive it by reference (usually behind
//! an `Arc`) rather than reading a global.

use std::{net::IpAddr, str::FromStr, time::Duration};

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    error::{ConfigError, TokenError},
    transfer::{AntiCsrfMode, TransferPolicy},
};

/// Path of the refresh endpoint, relative to the API base path. The refresh
/// token cookie is scoped to it.
pub const REFRESH_API_PATH: &str = "/session/refresh";
pub const SIGNOUT_API_PATH: &str = "/signout";

const DEFAULT_BASE_PATH: &str = "/auth";
const DEFAULT_CORE_TIMEOUT: Duration = Duration::from_secs(10);

/// The `SameSite` attribute applied to session cookies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CookieSameSite {
    Strict,
    Lax,
    None,
}

impl FromStr for CookieSameSite {
    type Err = TokenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(CookieSameSite::Strict),
            "lax" => Ok(CookieSameSite::Lax),
            "none" => Ok(CookieSameSite::None),
            _ => Err(TokenError::UnknownSameSite(s.to_string())),
        }
    }
}

/// Where the API and the website live.
#[derive(Debug, Clone)]
pub struct AppInfo {
    pub app_name: String,
    pub api_domain: Url,
    pub website_domain: Url,
    pub api_base_path: String,
    pub website_base_path: String,
}

impl AppInfo {
    pub fn new(app_name: &str, api_domain: &str, website_domain: &str) -> Result<Self, Error> {
        Ok(Self {
            app_name: app_name.to_string(),
            api_domain: normalise_domain(api_domain)?,
            website_domain: normalise_domain(website_domain)?,
            api_base_path: DEFAULT_BASE_PATH.to_string(),
            website_base_path: DEFAULT_BASE_PATH.to_string(),
        })
    }

    pub fn with_api_base_path(mut self, path: &str) -> Result<Self, Error> {
        self.api_base_path = normalise_path(path)?;
        Ok(self)
    }

    pub fn with_website_base_path(mut self, path: &str) -> Result<Self, Error> {
        self.website_base_path = normalise_path(path)?;
        Ok(self)
    }

    /// Reads `TESSERA_APP_NAME`, `TESSERA_API_DOMAIN`, `TESSERA_WEBSITE_DOMAIN`
    /// and the optional `TESSERA_API_BASE_PATH` / `TESSERA_WEBSITE_BASE_PATH`.
    pub fn from_env() -> Result<Self, Error> {
        let var = |name: &str| {
            std::env::var(name).map_err(|_| Error::Config(ConfigError::Missing(name.to_string())))
        };

        let mut app_info = Self::new(
            &var("TESSERA_APP_NAME")?,
            &var("TESSERA_API_DOMAIN")?,
            &var("TESSERA_WEBSITE_DOMAIN")?,
        )?;
        if let Ok(path) = std::env::var("TESSERA_API_BASE_PATH") {
            app_info = app_info.with_api_base_path(&path)?;
        }
        if let Ok(path) = std::env::var("TESSERA_WEBSITE_BASE_PATH") {
            app_info = app_info.with_website_base_path(&path)?;
        }
        Ok(app_info)
    }

    /// `scheme://host[:port]` of the API, without a trailing slash.
    pub fn api_origin(&self) -> String {
        self.api_domain.origin().ascii_serialization()
    }

    pub fn website_origin(&self) -> String {
        self.website_domain.origin().ascii_serialization()
    }

    /// Whether the API and the website share a site, so browsers treat their
    /// requests as same-site.
    pub fn is_same_site(&self) -> bool {
        match (self.api_domain.host_str(), self.website_domain.host_str()) {
            (Some(api), Some(website)) => site_of(api) == site_of(website),
            _ => false,
        }
    }

    fn involves_localhost(&self) -> bool {
        [&self.api_domain, &self.website_domain]
            .iter()
            .any(|url| url.host_str().is_some_and(is_local_host))
    }
}

/// Normalized, immutable session settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_domain: Option<String>,
    pub cookie_secure: bool,
    pub cookie_same_site: CookieSameSite,
    pub refresh_token_path: String,
    pub anti_csrf: AntiCsrfMode,
    pub token_transfer: TransferPolicy,
}

impl SessionConfig {
    pub fn builder(app_info: &AppInfo) -> SessionConfigBuilder {
        SessionConfigBuilder {
            app_info: app_info.clone(),
            cookie_domain: None,
            cookie_secure: None,
            cookie_same_site: None,
            anti_csrf: None,
            token_transfer: TransferPolicy::default(),
        }
    }
}

pub struct SessionConfigBuilder {
    app_info: AppInfo,
    cookie_domain: Option<String>,
    cookie_secure: Option<bool>,
    cookie_same_site: Option<CookieSameSite>,
    anti_csrf: Option<AntiCsrfMode>,
    token_transfer: TransferPolicy,
}

impl SessionConfigBuilder {
    pub fn cookie_domain(mut self, domain: impl Into<String>) -> Self {
        self.cookie_domain = Some(domain.into());
        self
    }

    pub fn cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = Some(secure);
        self
    }

    pub fn cookie_same_site(mut self, same_site: CookieSameSite) -> Self {
        self.cookie_same_site = Some(same_site);
        self
    }

    pub fn anti_csrf(mut self, mode: AntiCsrfMode) -> Self {
        self.anti_csrf = Some(mode);
        self
    }

    pub fn token_transfer(mut self, policy: TransferPolicy) -> Self {
        self.token_transfer = policy;
        self
    }

    pub fn build(self) -> Result<SessionConfig, Error> {
        let cookie_domain = self
            .cookie_domain
            .as_deref()
            .map(normalise_cookie_domain)
            .transpose()?;

        let cookie_same_site = self.cookie_same_site.unwrap_or(if self.app_info.is_same_site() {
            CookieSameSite::Lax
        } else {
            CookieSameSite::None
        });

        let cookie_secure = self
            .cookie_secure
            .unwrap_or(self.app_info.api_domain.scheme() == "https");

        if cookie_same_site == CookieSameSite::None
            && !cookie_secure
            && !self.app_info.involves_localhost()
        {
            return Err(ConfigError::InsecureCrossSite.into());
        }

        let anti_csrf = self.anti_csrf.unwrap_or(match cookie_same_site {
            CookieSameSite::None => AntiCsrfMode::ViaCustomHeader,
            _ => AntiCsrfMode::None,
        });

        Ok(SessionConfig {
            cookie_domain,
            cookie_secure,
            cookie_same_site,
            refresh_token_path: format!("{}{}", self.app_info.api_base_path, REFRESH_API_PATH),
            anti_csrf,
            token_transfer: self.token_transfer,
        })
    }
}

/// Connection settings for the authentication core.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// One or more base URIs separated by `;`.
    pub connection_uri: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl CoreConfig {
    pub fn new(connection_uri: impl Into<String>) -> Self {
        Self {
            connection_uri: connection_uri.into(),
            api_key: None,
            timeout: DEFAULT_CORE_TIMEOUT,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_env() -> Result<Self, Error> {
        let uri = std::env::var("TESSERA_CORE_URI")
            .map_err(|_| ConfigError::Missing("TESSERA_CORE_URI".to_string()))?;
        let mut config = Self::new(uri);
        config.api_key = std::env::var("TESSERA_CORE_API_KEY").ok();
        Ok(config)
    }

    /// The configured hosts, each without a trailing slash.
    pub fn hosts(&self) -> Result<Vec<Url>, Error> {
        self.connection_uri
            .split(';')
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
            .map(|uri| {
                Url::parse(uri.trim_end_matches('/'))
                    .map_err(|e| Error::from(ConfigError::InvalidDomain(format!("{uri}: {e}"))))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DashboardConfig {
    /// When unset, dashboard access is verified as a dashboard session against the core.
    pub api_key: Option<String>,
}

impl DashboardConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
        }
    }
}

/// Leading `/`, no trailing `/`; the root path normalizes to the empty string.
pub fn normalise_path(path: &str) -> Result<String, ConfigError> {
    let mut path = path.trim().to_string();

    if path.starts_with("http://") || path.starts_with("https://") {
        path = Url::parse(&path)
            .map_err(|e| ConfigError::InvalidPath(format!("{path}: {e}")))?
            .path()
            .to_string();
    }

    if path.contains(|c: char| c.is_whitespace() || c == '?' || c == '#') {
        return Err(ConfigError::InvalidPath(path));
    }

    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        Ok(String::new())
    } else {
        Ok(format!("/{trimmed}"))
    }
}

fn normalise_domain(domain: &str) -> Result<Url, ConfigError> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(ConfigError::InvalidDomain(domain.to_string()));
    }

    let with_scheme = if domain.contains("://") {
        domain.to_string()
    } else {
        let host = domain.split([':', '/']).next().unwrap_or_default();
        let scheme = if is_local_host(host) { "http" } else { "https" };
        format!("{scheme}://{domain}")
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| ConfigError::InvalidDomain(format!("{domain}: {e}")))?;
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidDomain(domain.to_string()));
    }
    Ok(url)
}

fn normalise_cookie_domain(domain: &str) -> Result<String, ConfigError> {
    let domain = domain.trim().to_ascii_lowercase();
    let (dot, rest) = match domain.strip_prefix('.') {
        Some(rest) => (".", rest),
        None => ("", domain.as_str()),
    };
    let with_scheme = if rest.contains("://") {
        rest.to_string()
    } else {
        format!("http://{rest}")
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| ConfigError::InvalidDomain(format!("{domain}: {e}")))?;
    let host = url
        .host_str()
        .ok_or_else(|| ConfigError::InvalidDomain(domain.clone()))?;
    Ok(format!("{dot}{host}"))
}

fn is_local_host(host: &str) -> bool {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    host == "localhost"
        || host
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback())
}

// The registrable domain (eTLD+1); IPs and bare suffixes are their own site.
fn site_of(host: &str) -> &str {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.parse::<IpAddr>().is_ok() {
        return host;
    }
    psl::domain_str(host).unwrap_or(host)
}
