//! Client credential configuration
//!
//! The original gateway scripts kept credentials in process-wide mutable
//! globals; here they are an explicit, immutable configuration value passed
//! to the client constructor.

use std::env;

use serde::{Deserialize, Serialize};

use crate::errors::{FloorLinkError, Result};

/// Default username associated with gateway-issued API keys.
pub const DEFAULT_USERNAME: &str = "FloorLink Gateway API User";

/// Credentials and addressing for one FloorLink API session.
///
/// Immutable after construction; the client holds it for the process
/// lifetime and never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server name, i.e. the `{server}` in
    /// `https://{server}.example-cloud.com/api/1.0/`.
    pub server_name: String,
    /// API authentication key.
    #[serde(skip_serializing)]
    pub auth_key: String,
    /// Site number the gateway reports against.
    pub site: u32,
    /// Username associated with the auth key; attributed on dispatches.
    pub username: String,
    /// Full base URL override for self-hosted gateways and tests. When set,
    /// `server_name` is not used to build the URL.
    pub base_url: Option<String>,
}

impl ClientConfig {
    /// Build a config with the default username and no URL override.
    pub fn new(
        server_name: impl Into<String>,
        auth_key: impl Into<String>,
        site: u32,
    ) -> Self {
        Self {
            server_name: server_name.into(),
            auth_key: auth_key.into(),
            site,
            username: DEFAULT_USERNAME.to_string(),
            base_url: None,
        }
    }

    /// Replace the default username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    /// Point the client at an explicit base URL instead of the hosted
    /// `example-cloud.com` domain.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Load configuration from `FLOORLINK_*` environment variables.
    ///
    /// `FLOORLINK_SERVER`, `FLOORLINK_AUTH_KEY` and `FLOORLINK_SITE` are
    /// required; `FLOORLINK_USERNAME` and `FLOORLINK_BASE_URL` are optional.
    pub fn from_env() -> Result<Self> {
        let server_name = require_env("FLOORLINK_SERVER")?;
        let auth_key = require_env("FLOORLINK_AUTH_KEY")?;
        let site = require_env("FLOORLINK_SITE")?.parse::<u32>().map_err(|err| {
            FloorLinkError::Config(format!("FLOORLINK_SITE is not a site number: {err}"))
        })?;

        let mut config = Self::new(server_name, auth_key, site);
        if let Ok(username) = env::var("FLOORLINK_USERNAME") {
            config = config.with_username(username);
        }
        if let Ok(base_url) = env::var("FLOORLINK_BASE_URL") {
            config = config.with_base_url(base_url);
        }
        Ok(config)
    }

    /// Resolve the API base URL, always with a trailing slash.
    pub fn api_base(&self) -> String {
        match &self.base_url {
            Some(url) if url.ends_with('/') => url.clone(),
            Some(url) => format!("{url}/"),
            None => format!("https://{}.example-cloud.com/api/1.0/", self.server_name),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    env::var(key)
        .map_err(|_| FloorLinkError::Config(format!("{key} environment variable is not set")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_base_builds_hosted_url() {
        let config = ClientConfig::new("acme", "key", 25);
        assert_eq!(config.api_base(), "https://acme.example-cloud.com/api/1.0/");
    }

    #[test]
    fn api_base_override_gets_trailing_slash() {
        let config = ClientConfig::new("acme", "key", 25).with_base_url("http://127.0.0.1:8080");
        assert_eq!(config.api_base(), "http://127.0.0.1:8080/");

        let config = ClientConfig::new("acme", "key", 25).with_base_url("http://127.0.0.1:8080/");
        assert_eq!(config.api_base(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn username_defaults_and_overrides() {
        let config = ClientConfig::new("acme", "key", 1);
        assert_eq!(config.username, DEFAULT_USERNAME);

        let config = config.with_username("gateway-7");
        assert_eq!(config.username, "gateway-7");
    }
}
