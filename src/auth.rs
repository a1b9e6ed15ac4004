// Authentication strategies. The service exposes two mutually exclusive
// login flows; the one in use is picked by configuration.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::transport::{HttpRequest, Method};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};
use std::str::FromStr;

pub const PASSWORD_GRANT_PATH: &str = "/api/collections/users/auth-with-password?fields=token";
pub const TOKEN_PATH: &str = "/auth/token";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthScheme {
    /// JSON `{identity, password}` against the password-grant endpoint.
    #[default]
    PasswordGrant,
    /// `Authorization: Basic base64(identity:password)` against `/auth/token`.
    BasicToken,
}

impl FromStr for AuthScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "password" | "password-grant" => Ok(AuthScheme::PasswordGrant),
            "basic" | "token" => Ok(AuthScheme::BasicToken),
            other => Err(Error::InvalidAuthScheme(other.to_string())),
        }
    }
}

impl AuthScheme {
    /// Build the login request for this scheme.
    pub fn login_request(&self, config: &Config) -> HttpRequest {
        match self {
            AuthScheme::PasswordGrant => {
                HttpRequest::new(Method::Post, format!("{}{}", config.base_url, PASSWORD_GRANT_PATH))
                    .header("Content-Type", "application/json")
                    .json(json!({
                        "identity": config.identity,
                        "password": config.password,
                    }))
            }
            AuthScheme::BasicToken => {
                HttpRequest::new(Method::Post, format!("{}{}", config.base_url, TOKEN_PATH))
                    .header("Authorization", basic_credentials(&config.identity, &config.password))
                    .header("Content-Type", "application/json")
            }
        }
    }

    /// Pull the bearer token out of a successful login body.
    pub fn extract_token(&self, body: &Value) -> Option<String> {
        let keys: &[&str] = match self {
            AuthScheme::PasswordGrant => &["token"],
            AuthScheme::BasicToken => &["token", "access_token"],
        };
        keys.iter()
            .find_map(|k| body.get(*k).and_then(Value::as_str).filter(|t| !t.is_empty()))
            .map(str::to_string)
    }
}

pub fn basic_credentials(identity: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", identity, password)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(scheme: AuthScheme) -> Config {
        Config::new("https://api.example.org", "doc@example.org", "pw", scheme)
    }

    #[test]
    fn password_grant_sends_json_credentials() {
        let req = AuthScheme::PasswordGrant.login_request(&config(AuthScheme::PasswordGrant));
        assert_eq!(
            req.url,
            "https://api.example.org/api/collections/users/auth-with-password?fields=token"
        );
        assert_eq!(
            req.body,
            Some(json!({"identity": "doc@example.org", "password": "pw"}))
        );
        assert!(req.header_value("authorization").is_none());
    }

    #[test]
    fn basic_token_encodes_credentials() {
        let req = AuthScheme::BasicToken.login_request(&config(AuthScheme::BasicToken));
        assert_eq!(req.url, "https://api.example.org/auth/token");
        assert!(req.body.is_none());
        // base64("doc@example.org:pw")
        assert_eq!(
            req.header_value("Authorization"),
            Some("Basic ZG9jQGV4YW1wbGUub3JnOnB3")
        );
    }

    #[test]
    fn basic_token_falls_back_to_access_token() {
        let body = json!({"access_token": "abc"});
        assert_eq!(AuthScheme::BasicToken.extract_token(&body), Some("abc".into()));
        assert_eq!(AuthScheme::PasswordGrant.extract_token(&body), None);
        assert_eq!(
            AuthScheme::PasswordGrant.extract_token(&json!({"token": "t"})),
            Some("t".into())
        );
    }

    #[test]
    fn empty_token_does_not_hide_access_token() {
        let body = json!({"token": "", "access_token": "abc"});
        assert_eq!(AuthScheme::BasicToken.extract_token(&body), Some("abc".into()));
        assert_eq!(AuthScheme::PasswordGrant.extract_token(&body), None);
    }
}
