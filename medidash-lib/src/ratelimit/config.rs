use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default quiet period before a search edit is sent
const DEFAULT_SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Default minimum time between two page changes
const DEFAULT_PAGE_THROTTLE: Duration = Duration::from_millis(800);

/// Timing of the rate limiters in front of the patient list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Quiet period a search edit must survive before it is sent
    #[serde(default = "default_search_debounce", with = "humantime_serde")]
    pub search_debounce: Duration,

    /// Minimum time between two accepted page changes
    #[serde(default = "default_page_throttle", with = "humantime_serde")]
    pub page_throttle: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            search_debounce: default_search_debounce(),
            page_throttle: default_page_throttle(),
        }
    }
}

const fn default_search_debounce() -> Duration {
    DEFAULT_SEARCH_DEBOUNCE
}

const fn default_page_throttle() -> Duration {
    DEFAULT_PAGE_THROTTLE
}

impl RateLimitConfig {
    /// Create a `RateLimitConfig` from CLI options, using defaults for missing values
    #[must_use]
    pub fn from_options(search_debounce: Option<Duration>, page_throttle: Option<Duration>) -> Self {
        Self {
            search_debounce: search_debounce.unwrap_or(DEFAULT_SEARCH_DEBOUNCE),
            page_throttle: page_throttle.unwrap_or(DEFAULT_PAGE_THROTTLE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rate_limit_config() {
        let config = RateLimitConfig::default();
        assert_eq!(config.search_debounce, Duration::from_millis(500));
        assert_eq!(config.page_throttle, Duration::from_millis(800));
    }

    #[test]
    fn test_from_options() {
        let config = RateLimitConfig::from_options(Some(Duration::from_millis(250)), None);
        assert_eq!(config.search_debounce, Duration::from_millis(250));
        assert_eq!(config.page_throttle, DEFAULT_PAGE_THROTTLE);
    }

    #[test]
    fn test_config_serialization() {
        let config = RateLimitConfig {
            search_debounce: Duration::from_millis(300),
            page_throttle: Duration::from_secs(1),
        };

        let toml = toml::to_string(&config).unwrap();
        let deserialized: RateLimitConfig = toml::from_str(&toml).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: RateLimitConfig = toml::from_str(r#"search_debounce = "1s""#).unwrap();
        assert_eq!(config.search_debounce, Duration::from_secs(1));
        assert_eq!(config.page_throttle, DEFAULT_PAGE_THROTTLE);
    }
}
