use crate::coerce::CoercionPolicy;
use crate::layout::{LayoutParams, Viewport};
use crate::matrix::ResizePolicy;
use log::warn;
use std::time::Duration;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000/check";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const ENV_BACKEND_URL: &str = "RAGVIZ_BACKEND_URL";
pub const ENV_TIMEOUT_SECS: &str = "RAGVIZ_TIMEOUT_SECS";
pub const ENV_RESIZE: &str = "RAGVIZ_RESIZE";
pub const ENV_STRICT_CELLS: &str = "RAGVIZ_STRICT_CELLS";

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GatewayConfig {
    pub url: String,
    /// `None` waits for the backend indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BACKEND_URL.to_string(),
            timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    pub viewport: Viewport,
    pub layout: LayoutParams,
    pub resize: ResizePolicy,
    pub coercion: CoercionPolicy,
    pub gateway: GatewayConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from `lookup`, which maps a variable name to its value. Values
    /// that do not parse are reported and replaced by the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Config::default();

        if let Some(url) = lookup(ENV_BACKEND_URL) {
            let url = url.trim();
            if url.is_empty() {
                warn!("{} is empty; using {}", ENV_BACKEND_URL, DEFAULT_BACKEND_URL);
            } else {
                config.gateway.url = url.to_string();
            }
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(0) => config.gateway.timeout = None,
                Ok(secs) => config.gateway.timeout = Some(Duration::from_secs(secs)),
                Err(_) => warn!(
                    "{}={:?} is not a number of seconds; using {}",
                    ENV_TIMEOUT_SECS, raw, DEFAULT_TIMEOUT_SECS
                ),
            }
        }

        if let Some(raw) = lookup(ENV_RESIZE) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "preserve" => config.resize = ResizePolicy::Preserve,
                "reset" => config.resize = ResizePolicy::Reset,
                _ => warn!(
                    "{}={:?} is not `preserve` or `reset`; using preserve",
                    ENV_RESIZE, raw
                ),
            }
        }

        if let Some(raw) = lookup(ENV_STRICT_CELLS) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => config.coercion = CoercionPolicy::Strict,
                "0" | "false" | "no" | "" => config.coercion = CoercionPolicy::Lenient,
                _ => warn!("{}={:?} is not a boolean; ignoring", ENV_STRICT_CELLS, raw),
            }
        }

        config
    }
}
