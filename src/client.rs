// API client module: a small blocking client that logs in once and then
// issues bearer-authenticated JSON calls against the service.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::transport::{HttpRequest, HttpTransport, Method, Transport};
use serde_json::Value;
use tracing::{debug, error, info, warn};

/// Holds the connection settings, the transport and the bearer token
/// obtained by `authenticate`. The token lives as long as the client and
/// is never refreshed.
pub struct ApiClient<T: Transport = HttpTransport> {
    transport: T,
    config: Config,
    token: Option<String>,
}

impl ApiClient<HttpTransport> {
    /// Create a client that talks to the network over reqwest.
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self::with_transport(config, HttpTransport::new()?))
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(config: Config, transport: T) -> Self {
        ApiClient {
            transport,
            config,
            token: None,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns whether a token is present in the client.
    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Log in with the configured scheme. Returns false on any failure,
    /// in which case a previously stored token is kept as is.
    pub fn authenticate(&mut self) -> bool {
        match self.try_authenticate() {
            Ok(()) => {
                info!(scheme = ?self.config.auth_scheme, "authentication successful");
                true
            }
            Err(Error::AuthRejected(status)) => {
                error!(status, "authentication failed");
                false
            }
            Err(e) => {
                error!(error = %e, "authentication error");
                false
            }
        }
    }

    pub fn try_authenticate(&mut self) -> Result<()> {
        let scheme = self.config.auth_scheme;
        let req = scheme.login_request(&self.config);
        let res = self.transport.send(&req)?;
        if res.status != 200 {
            return Err(Error::AuthRejected(res.status));
        }
        let token = scheme
            .extract_token(&res.json()?)
            .ok_or(Error::MissingToken)?;
        self.token = Some(token);
        Ok(())
    }

    /// Send an authenticated call and return the decoded JSON body
    /// whatever the HTTP status; callers look at `success` themselves.
    /// Returns `None` without sending anything when no token is held.
    pub fn request(&self, method: Method, endpoint: &str, body: Option<&Value>) -> Option<Value> {
        match self.try_request(method, endpoint, body) {
            Ok(value) => Some(value),
            Err(Error::NotAuthenticated) => {
                warn!(%method, endpoint, "no authentication token available");
                None
            }
            Err(e) => {
                error!(%method, endpoint, error = %e, "request error");
                None
            }
        }
    }

    pub fn try_request(&self, method: Method, endpoint: &str, body: Option<&Value>) -> Result<Value> {
        let token = self.token.as_deref().ok_or(Error::NotAuthenticated)?;

        let mut req = HttpRequest::new(method, format!("{}{}", self.config.base_url, endpoint))
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json");
        if let (Method::Post, Some(body)) = (method, body) {
            req = req.json(body.clone());
        }

        let res = self.transport.send(&req)?;
        debug!(%method, endpoint, status = res.status, "response received");
        res.json()
    }
}
