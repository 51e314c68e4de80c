use std::str::FromStr;
use std::time::Duration;

use contracts::ScenarioBounds;
use scenario_core::identity::DEFAULT_FINGERPRINT_LENGTH;
use tracing::warn;

use crate::cache::{DEFAULT_MAX_SIZE, DEFAULT_TTL};

pub const ENV_CACHE_MAX_SIZE: &str = "SCENARIO_CACHE_MAX_SIZE";
pub const ENV_CACHE_TTL_HOURS: &str = "SCENARIO_CACHE_TTL_HOURS";
pub const ENV_FINGERPRINT_LENGTH: &str = "SCENARIO_FINGERPRINT_LENGTH";
pub const ENV_SQLITE_PATH: &str = "SCENARIO_SQLITE_PATH";
pub const ENV_BASELINE_DIR: &str = "SCENARIO_BASELINE_DIR";

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub cache_max_size: usize,
    pub cache_ttl: Duration,
    pub fingerprint_length: usize,
    pub sqlite_path: Option<String>,
    pub baseline_dir: Option<String>,
    pub bounds: ScenarioBounds,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            cache_max_size: DEFAULT_MAX_SIZE,
            cache_ttl: DEFAULT_TTL,
            fingerprint_length: DEFAULT_FINGERPRINT_LENGTH,
            sqlite_path: None,
            baseline_dir: None,
            bounds: ScenarioBounds::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Blank or unparsable
    /// values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).filter(|raw| !raw.trim().is_empty());

        let cache_max_size = parsed(ENV_CACHE_MAX_SIZE, value(ENV_CACHE_MAX_SIZE))
            .filter(|size: &usize| *size > 0)
            .unwrap_or(defaults.cache_max_size);

        let cache_ttl = parsed::<f64>(ENV_CACHE_TTL_HOURS, value(ENV_CACHE_TTL_HOURS))
            .filter(|hours| hours.is_finite() && *hours > 0.0)
            .and_then(|hours| match Duration::try_from_secs_f64(hours * 3600.0) {
                Ok(ttl) => Some(ttl),
                Err(_) => {
                    warn!(key = ENV_CACHE_TTL_HOURS, hours, "ignoring out-of-range setting");
                    None
                }
            })
            .unwrap_or(defaults.cache_ttl);

        let fingerprint_length = parsed(ENV_FINGERPRINT_LENGTH, value(ENV_FINGERPRINT_LENGTH))
            .unwrap_or(defaults.fingerprint_length);

        Self {
            cache_max_size,
            cache_ttl,
            fingerprint_length,
            sqlite_path: value(ENV_SQLITE_PATH).map(|raw| raw.trim().to_string()),
            baseline_dir: value(ENV_BASELINE_DIR).map(|raw| raw.trim().to_string()),
            bounds: defaults.bounds,
        }
    }
}

fn parsed<T: FromStr>(key: &str, raw: Option<String>) -> Option<T> {
    let raw = raw?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable setting");
            None
        }
    }
}
