//! Blocking HTTP transport
//!
//! Two request primitives shared by every endpoint method: `get` sends all
//! parameters (auth included) in the query string, `post` keeps only the
//! auth key in the query string and sends the parameters as a URL-encoded
//! form body. Both decode the body as a JSON envelope and turn
//! `success=false` into a `Request` error.

use std::time::Duration;

use floorlink_domain::{Envelope, FloorLinkError, Params, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use tracing::{debug, error};

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug)]
pub(crate) struct Transport {
    http: Client,
    base_url: String,
    auth_key: String,
}

impl Transport {
    /// Build the underlying HTTP client with the fixed header set: the
    /// gateway user-agent, form content-type, and cache-bypass headers so
    /// every call fetches live data.
    pub fn new(base_url: String, auth_key: String, user_agent: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let http = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|err| FloorLinkError::Network(format!("failed to build HTTP client: {err}")))?;

        Ok(Self { http, base_url, auth_key })
    }

    /// GET an endpoint with the given query parameters.
    pub fn get(&self, api: &str, mut params: Params) -> Result<Envelope> {
        debug!(api, params = ?params.pairs(), "GET request");
        params.set("auth", &self.auth_key);

        let url = format!("{}{}", self.base_url, api);
        let response = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .map_err(|err| self.network_error("GET", api, err))?;

        self.decode("GET", api, response)
    }

    /// POST an endpoint with the given parameters as a form body.
    pub fn post(&self, api: &str, params: Params) -> Result<Envelope> {
        debug!(api, params = ?params.pairs(), "POST request");

        let url = format!("{}{}", self.base_url, api);
        let response = self
            .http
            .post(&url)
            .query(&[("auth", self.auth_key.as_str())])
            .form(&params)
            .send()
            .map_err(|err| self.network_error("POST", api, err))?;

        self.decode("POST", api, response)
    }

    fn network_error(&self, verb: &str, api: &str, err: reqwest::Error) -> FloorLinkError {
        error!(api, error = %err, "{verb} request failed");
        FloorLinkError::Network(format!("{verb} {api}: {err}"))
    }

    fn decode(&self, verb: &str, api: &str, response: Response) -> Result<Envelope> {
        let status = response.status();
        let body = response
            .text()
            .map_err(|err| self.network_error(verb, api, err))?;

        let envelope: Envelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            // Non-success statuses usually come with a non-envelope body
            // (proxy error pages and the like).
            Err(_) if !status.is_success() => {
                error!(api, %status, "{verb} request returned a non-envelope response");
                return Err(FloorLinkError::Network(format!(
                    "{verb} {api} returned status {status}"
                )));
            }
            Err(err) => {
                error!(api, error = %err, "{verb} response is not a JSON envelope");
                return Err(FloorLinkError::Decode(format!(
                    "{verb} {api}: response is not a JSON envelope: {err}"
                )));
            }
        };

        debug!(api, success = envelope.success, "decoded response envelope");

        if !envelope.success {
            let message = format!("{verb} {api}: {}", envelope.error_message());
            error!(api, error = envelope.error_message(), "{verb} request rejected");
            return Err(FloorLinkError::Request(message));
        }

        Ok(envelope)
    }
}
