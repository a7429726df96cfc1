use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_UPSTREAM_URL: &str = "https://hatchways.io/api/assessment/blog/posts";

#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Listener and admin listener cannot share {0}")]
    ListenerConflict(String),

    #[error("Upstream timeout must be greater than 0")]
    InvalidTimeout,

    #[error("Unsupported upstream URL scheme: {0}")]
    UnsupportedScheme(String),
}

/// How the per-tag upstream requests of a single call are issued
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    // All tags are fetched concurrently and reassembled in tag order
    #[default]
    Parallel,
    // Tags are fetched one at a time, in tag order
    Sequential,
}

/// Aggregator configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Main listener serving the `/api` endpoints
    #[serde(default)]
    pub listener: Listener,
    /// Admin listener for health and readiness probes
    #[serde(default = "Listener::admin")]
    pub admin_listener: Listener,
    /// Blog post source queried once per requested tag
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

impl Config {
    /// Validates the aggregator configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;

        if self.listener == self.admin_listener {
            return Err(ValidationError::ListenerConflict(self.listener.addr()));
        }

        self.upstream.validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listener: Listener::default(),
            admin_listener: Listener::admin(),
            upstream: UpstreamConfig::default(),
        }
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Listener {
    fn admin() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3001,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Validates the listener configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

/// Upstream blog post API configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct UpstreamConfig {
    /// Endpoint queried with `?tag=<tag>`
    #[serde(default = "default_upstream_url")]
    pub url: Url,
    /// Applies to each upstream request, including reading the body
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub execution_mode: ExecutionMode,
}

impl UpstreamConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }

        match self.url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ValidationError::UnsupportedScheme(other.to_string())),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            url: default_upstream_url(),
            timeout_secs: default_timeout_secs(),
            execution_mode: ExecutionMode::default(),
        }
    }
}

fn default_upstream_url() -> Url {
    Url::parse(DEFAULT_UPSTREAM_URL).expect("default upstream URL is valid")
}

fn default_timeout_secs() -> u64 {
    10
}
