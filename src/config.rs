//! Client configuration.
//!
//! Built with a builder or read from the environment:
//!
//! | Variable            | Field                   | Default                 |
//! |---------------------|-------------------------|-------------------------|
//! | `WEFT_API_URL`      | `base_url`              | `http://localhost:8000` |
//! | `WEFT_EAGER_THREAD` | `eager_thread_creation` | off                     |
//! | `WEFT_DATA_DIR`     | `data_dir`              | see [`default_data_dir`] |
//! | `WEFT_TIMEOUT_SECS` | `request_timeout`       | none                    |

use std::path::PathBuf;
use std::time::Duration;

use crate::client::DEFAULT_BASE_URL;

pub const ENV_API_URL: &str = "WEFT_API_URL";
pub const ENV_EAGER_THREAD: &str = "WEFT_EAGER_THREAD";
pub const ENV_DATA_DIR: &str = "WEFT_DATA_DIR";
pub const ENV_TIMEOUT_SECS: &str = "WEFT_TIMEOUT_SECS";

/// Configuration for a [`crate::session::Session`].
///
/// # Example
///
/// ```
/// use weft::config::ClientConfig;
///
/// let config = ClientConfig::default()
///     .with_base_url("http://agent.internal:8000")
///     .with_eager_thread_creation(true);
/// assert!(config.eager_thread_creation);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Agent service base URL, no trailing slash
    pub base_url: String,
    /// Create a thread on attach instead of on first submit
    pub eager_thread_creation: bool,
    /// Timeout for buffered requests; streams are never timed out
    pub request_timeout: Option<Duration>,
    /// Directory holding the persisted key-value file
    pub data_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            eager_thread_creation: false,
            request_timeout: None,
            data_dir: default_data_dir(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_eager_thread_creation(mut self, eager: bool) -> Self {
        self.eager_thread_creation = eager;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Read configuration from `WEFT_*` environment variables.
    ///
    /// Unset or unparsable values keep their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            config = config.with_base_url(url.trim());
        }
        if let Some(flag) = lookup(ENV_EAGER_THREAD) {
            config.eager_thread_creation = parse_flag(&flag);
        }
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            match secs.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.request_timeout = Some(Duration::from_secs(secs)),
                _ => tracing::warn!(value = %secs, "Ignoring invalid {}", ENV_TIMEOUT_SECS),
            }
        }

        config
    }
}

/// `weft` under the platform's local data directory, or `./data` when the
/// platform has none.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("weft"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
