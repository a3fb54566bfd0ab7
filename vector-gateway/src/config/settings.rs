//! Runtime settings for the vector gateway, read from the environment.

use std::env;
use std::time::Duration;

use url::Url;

use crate::ServerError;

/// Default Elasticsearch URL.
const DEFAULT_ELASTICSEARCH_HOST: &str = "http://localhost:9200";

/// Default index for batch items that name none.
const DEFAULT_INDEX: &str = "documents";

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 90;

/// Default address the HTTP server binds to.
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Default cap on concurrent engine requests.
const DEFAULT_MAX_CONCURRENT_CONNECTIONS: usize = 32;

/// Resolved gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// URL of the Elasticsearch node.
    pub elasticsearch_url: Url,
    /// Index used for batch items that carry no index name.
    pub default_index: String,
    /// Per-request timeout against the engine.
    pub timeout: Duration,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Cap on concurrent engine requests.
    pub max_concurrent_connections: usize,
}

impl GatewayConfig {
    /// Read the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ELASTICSEARCH_HOST`: Elasticsearch URL (default: http://localhost:9200)
    /// - `ELASTICSEARCH_PORT`: Port override applied to the host URL
    /// - `ELASTICSEARCH_INDEX`: Default index name (default: documents)
    /// - `TIMEOUT`: Engine request timeout in seconds (default: 90)
    /// - `BIND_ADDR`: HTTP bind address (default: 0.0.0.0:8000)
    /// - `MAX_CONCURRENT_CONNECTIONS`: Engine request cap (default: 32)
    ///
    /// # Returns
    ///
    /// * `Ok(GatewayConfig)` - Resolved configuration
    /// * `Err(ServerError)` - If a variable is present but not parseable
    pub fn from_env() -> Result<Self, ServerError> {
        let host = env::var("ELASTICSEARCH_HOST")
            .unwrap_or_else(|_| DEFAULT_ELASTICSEARCH_HOST.to_string());
        let port = parse_port(env::var("ELASTICSEARCH_PORT").ok())?;
        let elasticsearch_url = build_engine_url(&host, port)?;

        let default_index =
            env::var("ELASTICSEARCH_INDEX").unwrap_or_else(|_| DEFAULT_INDEX.to_string());
        let timeout = parse_timeout(env::var("TIMEOUT").ok())?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let max_concurrent_connections =
            parse_concurrency(env::var("MAX_CONCURRENT_CONNECTIONS").ok())?;

        Ok(Self {
            elasticsearch_url,
            default_index,
            timeout,
            bind_addr,
            max_concurrent_connections,
        })
    }
}

/// Parse the host URL and apply the optional port override.
fn build_engine_url(host: &str, port: Option<u16>) -> Result<Url, ServerError> {
    let mut url = Url::parse(host)
        .map_err(|e| ServerError::config(format!("ELASTICSEARCH_HOST is not a valid URL: {}", e)))?;

    if let Some(port) = port {
        url.set_port(Some(port))
            .map_err(|_| ServerError::config("ELASTICSEARCH_HOST does not accept a port"))?;
    }

    Ok(url)
}

fn parse_port(value: Option<String>) -> Result<Option<u16>, ServerError> {
    match value {
        Some(raw) => raw
            .parse::<u16>()
            .map(Some)
            .map_err(|_| ServerError::config(format!("ELASTICSEARCH_PORT is not a valid port: {}", raw))),
        None => Ok(None),
    }
}

fn parse_timeout(value: Option<String>) -> Result<Duration, ServerError> {
    let secs = match value {
        Some(raw) => raw.parse::<u64>().map_err(|_| {
            ServerError::config(format!("TIMEOUT is not a valid number of seconds: {}", raw))
        })?,
        None => DEFAULT_TIMEOUT_SECS,
    };

    if secs == 0 {
        return Err(ServerError::config("TIMEOUT must be at least 1 second"));
    }

    Ok(Duration::from_secs(secs))
}

fn parse_concurrency(value: Option<String>) -> Result<usize, ServerError> {
    let limit = match value {
        Some(raw) => raw.parse::<usize>().map_err(|_| {
            ServerError::config(format!(
                "MAX_CONCURRENT_CONNECTIONS is not a valid number: {}",
                raw
            ))
        })?,
        None => DEFAULT_MAX_CONCURRENT_CONNECTIONS,
    };

    if limit == 0 {
        return Err(ServerError::config(
            "MAX_CONCURRENT_CONNECTIONS must be at least 1",
        ));
    }

    Ok(limit)
}
