// Centralized Rate Limiting Configuration
// Single configurable set of limits per endpoint class, loaded from env.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::services::rate_limit::RateLimitConfig;

/// Rate limiting configuration shared across handlers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitingConfig {
    /// Default configuration for endpoints without a specific entry
    pub default: RateLimitConfig,

    /// Endpoint-class specific configurations (auth, workflow, etc.)
    pub endpoints: HashMap<String, RateLimitConfig>,
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for RateLimitingConfig {
    fn default() -> Self {
        let mut endpoints = HashMap::new();

        // Auth endpoints - stricter limits
        let auth_config = RateLimitConfig {
            max_requests: env_u32("RATE_LIMIT_AUTH_MAX", 10),
            window_seconds: env_u32("RATE_LIMIT_AUTH_WINDOW", 900),
            block_duration: 1800,
        };
        endpoints.insert("auth:login".to_string(), auth_config);

        // Token refresh - moderate limits
        endpoints.insert(
            "auth:refresh".to_string(),
            RateLimitConfig {
                max_requests: 30,
                window_seconds: 3600,
                block_duration: 600,
            },
        );

        // Workflow transitions and other authenticated writes
        endpoints.insert(
            "workflow:write".to_string(),
            RateLimitConfig {
                max_requests: env_u32("RATE_LIMIT_WRITE_MAX", 120),
                window_seconds: env_u32("RATE_LIMIT_WRITE_WINDOW", 60),
                block_duration: 60,
            },
        );

        Self {
            default: RateLimitConfig {
                max_requests: env_u32("RATE_LIMIT_DEFAULT_MAX", 600),
                window_seconds: env_u32("RATE_LIMIT_DEFAULT_WINDOW", 60),
                block_duration: 60,
            },
            endpoints,
        }
    }
}

impl RateLimitingConfig {
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Config for a named endpoint class, falling back to the default
    pub fn for_endpoint(&self, class: &str) -> &RateLimitConfig {
        self.endpoints.get(class).unwrap_or(&self.default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_lookup_falls_back_to_default() {
        let config = RateLimitingConfig::default();
        assert_eq!(
            config.for_endpoint("no-such-class").max_requests,
            config.default.max_requests
        );
    }

    #[test]
    fn test_login_class_is_stricter_than_default() {
        let config = RateLimitingConfig::default();
        assert!(
            config.for_endpoint("auth:login").max_requests < config.default.max_requests
        );
    }
}
