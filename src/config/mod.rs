/*!
 * Agent Configuration
 *
 * A static snapshot built once at startup and handed to every component.
 * Resolution order: process property > environment variable > properties file > default.
 */

mod properties;
mod resolver;

pub use properties::{load_properties, parse_properties};
pub use resolver::{properties_from_args, ConfigResolver};

use crate::core::limits::DEFAULT_QUEUE_CAPACITY;
use crate::core::ConfigError;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Default properties file name, looked up in the working directory
pub const PROPERTIES_FILE: &str = "monitor.properties";

/// Environment variable overriding the properties file location
pub const CONFIG_FILE_ENV: &str = "MONITOR_CONFIG_FILE";

/// Monitor agent configuration
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Collector base URL, without trailing slash
    pub api_base_url: String,
    /// Bearer token; empty disables the Authorization header
    pub api_token: String,
    pub batch_size: usize,
    pub flush_interval: Duration,
    /// Connect and read timeout for collector requests
    pub http_timeout: Duration,
    pub http_pool_size: usize,
    pub enabled: bool,
    pub capture_request_data: bool,
    pub capture_response_data: bool,
    pub max_payload_bytes: usize,
    pub nameserver_host: String,
    pub nameserver_port: u16,
    pub scan_interval: Duration,
    pub scan_enabled: bool,
    /// Development only: accept any TLS certificate and hostname
    pub ssl_trust_all: bool,
    pub queue_capacity: usize,
    /// Unmatched correlation entries older than this are swept
    pub correlation_ttl: Duration,
}

impl MonitorConfig {
    /// Resolve every key through the given resolver
    pub fn resolve(r: &ConfigResolver) -> Result<Self, ConfigError> {
        let api_base_url = r
            .string("monitor.api.url", "CORBA_MONITOR_API_URL", "http://localhost:8080/api")
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_base_url,
            api_token: r.string("monitor.api.token", "CORBA_MONITOR_API_TOKEN", ""),
            batch_size: r.positive("monitor.batch.size", "CORBA_MONITOR_BATCH_SIZE", 50)?,
            flush_interval: Duration::from_millis(r.positive(
                "monitor.flush.interval.ms",
                "CORBA_MONITOR_FLUSH_MS",
                1000u64,
            )?),
            http_timeout: Duration::from_millis(r.positive(
                "monitor.http.timeout.ms",
                "CORBA_MONITOR_HTTP_TIMEOUT",
                5000u64,
            )?),
            http_pool_size: r.positive("monitor.http.pool.size", "CORBA_MONITOR_HTTP_POOL", 4)?,
            enabled: r.flag("monitor.enabled", "CORBA_MONITOR_ENABLED", true)?,
            capture_request_data: r.flag(
                "monitor.capture.request",
                "CORBA_MONITOR_CAPTURE_REQ",
                true,
            )?,
            capture_response_data: r.flag(
                "monitor.capture.response",
                "CORBA_MONITOR_CAPTURE_RES",
                true,
            )?,
            max_payload_bytes: r.parse(
                "monitor.max.payload.bytes",
                "CORBA_MONITOR_MAX_PAYLOAD",
                65_536,
            )?,
            nameserver_host: r.string("monitor.nameserver.host", "CORBA_NAMESERVER_HOST", "localhost"),
            nameserver_port: r.parse("monitor.nameserver.port", "CORBA_NAMESERVER_PORT", 2809)?,
            scan_interval: Duration::from_secs(r.positive(
                "monitor.scan.interval.seconds",
                "CORBA_MONITOR_SCAN_INTERVAL",
                30u64,
            )?),
            scan_enabled: r.flag("monitor.scan.enabled", "CORBA_MONITOR_SCAN_ENABLED", true)?,
            ssl_trust_all: r.flag("monitor.ssl.trust.all", "CORBA_MONITOR_SSL_TRUST_ALL", false)?,
            queue_capacity: r.positive(
                "monitor.queue.capacity",
                "CORBA_MONITOR_QUEUE_CAPACITY",
                DEFAULT_QUEUE_CAPACITY,
            )?,
            correlation_ttl: Duration::from_secs(r.positive(
                "monitor.correlation.ttl.seconds",
                "CORBA_MONITOR_CORRELATION_TTL",
                300u64,
            )?),
        })
    }

    /// Load from process properties, the real environment and a properties file
    ///
    /// The file path comes from `MONITOR_CONFIG_FILE`, else `monitor.properties`
    /// in the working directory. A missing file is not an error.
    pub fn load(properties: HashMap<String, String>) -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_FILE_ENV).unwrap_or_else(|_| PROPERTIES_FILE.to_string());
        let file = load_properties(Path::new(&path))?;
        Self::resolve(&ConfigResolver::new(properties, file))
    }

    /// Defaults only, no environment or file lookups
    pub fn defaults() -> Self {
        let resolver = ConfigResolver::with_env(HashMap::new(), HashMap::new(), |_| None);
        // Every default is valid, resolution cannot fail
        match Self::resolve(&resolver) {
            Ok(config) => config,
            Err(e) => unreachable!("default configuration rejected: {e}"),
        }
    }

    pub fn traffic_endpoint(&self) -> String {
        format!("{}/traffic", self.api_base_url)
    }

    pub fn batch_endpoint(&self) -> String {
        format!("{}/traffic/batch", self.api_base_url)
    }

    pub fn nameserver_report_endpoint(&self) -> String {
        format!("{}/nameserver/report", self.api_base_url)
    }

    pub fn health_endpoint(&self) -> String {
        format!("{}/health", self.api_base_url)
    }

    /// Fallback addressing for the naming service root
    pub fn nameserver_corbaloc(&self) -> String {
        format!(
            "corbaloc:iiop:{}:{}/NameService",
            self.nameserver_host, self.nameserver_port
        )
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

impl fmt::Display for MonitorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MonitorConfig{{api={}, batch={}, flush={}ms, capture_req={}, capture_res={}, ns={}:{}, scan={}/{}s}}",
            self.api_base_url,
            self.batch_size,
            self.flush_interval.as_millis(),
            self.capture_request_data,
            self.capture_response_data,
            self.nameserver_host,
            self.nameserver_port,
            self.scan_enabled,
            self.scan_interval.as_secs()
        )
    }
}
