/*!
 * Collector Transport
 * Blocking HTTP client shared by every delivery worker
 */

use crate::config::MonitorConfig;
use crate::core::TransportError;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use std::time::Duration;
use tracing::warn;

/// Outbound calls to the collector, reduced to status codes
#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    /// POST a JSON body; returns the response status
    fn post_json(&self, url: &str, body: Vec<u8>) -> Result<u16, TransportError>;

    /// GET with a per-request timeout; returns the response status
    fn get(&self, url: &str, timeout: Duration) -> Result<u16, TransportError>;
}

/// reqwest-backed transport with a pooled connection set
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Must not be called from inside an async runtime
    pub fn new(config: &MonitorConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if !config.api_token.is_empty() {
            let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_token))
                .map_err(|_| TransportError::InvalidHeader("Authorization"))?;
            bearer.set_sensitive(true);
            headers.insert(AUTHORIZATION, bearer);
        }

        let mut builder = Client::builder()
            .default_headers(headers)
            .connect_timeout(config.http_timeout)
            .timeout(config.http_timeout)
            .pool_max_idle_per_host(config.http_pool_size)
            .user_agent(concat!("orb-monitor-agent/", env!("CARGO_PKG_VERSION")));

        if config.ssl_trust_all {
            warn!("TLS certificate and hostname verification DISABLED (monitor.ssl.trust.all=true); use only for development");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, url: &str, body: Vec<u8>) -> Result<u16, TransportError> {
        self.client
            .post(url)
            .body(body)
            .send()
            .map(|response| response.status().as_u16())
            .map_err(|e| request_error(url, e))
    }

    fn get(&self, url: &str, timeout: Duration) -> Result<u16, TransportError> {
        self.client
            .get(url)
            .timeout(timeout)
            .send()
            .map(|response| response.status().as_u16())
            .map_err(|e| request_error(url, e))
    }
}

fn request_error(url: &str, e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
        }
    } else {
        TransportError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}
