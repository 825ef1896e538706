use std::env;

/// Cookie sessions opened by login, next to the bearer tokens.
///
/// - `SESSION_TTL_SECONDS` (default 86400): idle time before a session expires
/// - `SESSION_COOKIE_SECURE` (default false): send the cookie over HTTPS only
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub ttl_seconds: i64,
    pub secure_cookie: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 24 * 60 * 60,
            secure_cookie: false,
        }
    }
}

impl SessionConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ttl_seconds: env::var("SESSION_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|ttl: &i64| *ttl > 0)
                .unwrap_or(defaults.ttl_seconds),
            secure_cookie: env::var("SESSION_COOKIE_SECURE")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.secure_cookie),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.ttl_seconds, 86400);
        assert!(!config.secure_cookie);
    }
}
