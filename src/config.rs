// Configuration: the base URL, credentials and auth scheme the client is
// built from. Values come from the environment, optionally seeded from a
// `.env` file so a local run needs no shell exports.

use crate::auth::AuthScheme;
use crate::error::{Error, Result};
use std::path::PathBuf;

pub const BASE_URL_VAR: &str = "PHENOML_BASE_URL";
pub const EMAIL_VAR: &str = "PHENOML_EMAIL";
pub const PASSWORD_VAR: &str = "PHENOML_PASSWORD";
pub const AUTH_SCHEME_VAR: &str = "PHENOML_AUTH_SCHEME";

/// Connection settings handed to `ApiClient`. Immutable once loaded.
#[derive(Clone)]
pub struct Config {
    pub base_url: String,
    pub identity: String,
    pub password: String,
    pub auth_scheme: AuthScheme,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("identity", &self.identity)
            .field("password", &"********")
            .field("auth_scheme", &self.auth_scheme)
            .finish()
    }
}

impl Config {
    pub fn new(
        base_url: impl Into<String>,
        identity: impl Into<String>,
        password: impl Into<String>,
        auth_scheme: AuthScheme,
    ) -> Self {
        let base_url: String = base_url.into();
        Config {
            base_url: base_url.trim_end_matches('/').to_string(),
            identity: identity.into(),
            password: password.into(),
            auth_scheme,
        }
    }

    /// Load `.env` files (working directory first, then the user config
    /// directory) and read the settings from the process environment.
    /// Variables already set in the environment are never overridden.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }
        if let Some(path) = user_env_file() {
            if path.is_file() && dotenvy::from_path(&path).is_ok() {
                tracing::debug!(path = %path.display(), "loaded user .env");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Only presence is checked:
    /// an unset or blank variable is reported as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::MissingConfig(key.to_string()))
        };

        let base_url = required(BASE_URL_VAR)?;
        let identity = required(EMAIL_VAR)?;
        let password = required(PASSWORD_VAR)?;
        let auth_scheme = match lookup(AUTH_SCHEME_VAR).filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw.parse()?,
            None => AuthScheme::default(),
        };

        Ok(Config::new(base_url, identity, password, auth_scheme))
    }
}

/// `<config_dir>/phenoml/.env`, if the platform has a config directory.
fn user_env_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("phenoml").join(".env"))
}
