use std::env;

pub const DEFAULT_MAX_IN_FLIGHT: usize = 8;

/// Configuration for fetch dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchConfig {
    /// Maximum concurrently running fetches (backpressure).
    pub max_in_flight: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

impl FetchConfig {
    /// Reads `SITEMAP_MAX_IN_FLIGHT`; unset or unparsable values fall back to
    /// the default, and zero is raised to one.
    pub fn from_env() -> Self {
        Self {
            max_in_flight: env_var_usize("SITEMAP_MAX_IN_FLIGHT", DEFAULT_MAX_IN_FLIGHT).max(1),
        }
    }
}

fn env_var_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
