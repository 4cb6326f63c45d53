/// Security configuration
use base64::{engine::general_purpose::STANDARD as base64_engine, Engine as _};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct TotpConfig {
    /// Code length in decimal digits (6-8).
    pub digits: u32,
    /// Time-step length in seconds.
    pub period: u64,
    /// Adjacent time-steps accepted on either side of "now".
    pub window: u32,
    /// Issuer label shown in authenticator apps.
    pub issuer: String,
}

impl Default for TotpConfig {
    fn default() -> Self {
        Self {
            digits: 6,
            period: 30,
            window: 1,
            issuer: "Pantube".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThrottleConfig {
    /// Failures after which an identifier is locked out.
    pub max_attempts: i64,
    /// Lockout window; each failure re-arms it (sliding).
    pub lockout_seconds: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout_seconds: 900,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Idle time after which a session is destroyed on its next check.
    pub timeout_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 7200,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CsrfConfig {
    /// Application key the token hash is keyed with. A `base64:` prefix
    /// marks a base64-encoded binary key.
    pub app_key: String,
    /// Request header consulted when no form token is supplied.
    pub header_name: String,
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self {
            app_key: "default-key-change-in-production".to_string(),
            header_name: "X-CSRF-TOKEN".to_string(),
        }
    }
}

impl CsrfConfig {
    /// Key bytes for HMAC, decoding the `base64:` form when present.
    pub fn key_bytes(&self) -> Vec<u8> {
        match self.app_key.strip_prefix("base64:") {
            Some(encoded) => base64_engine
                .decode(encoded)
                .unwrap_or_else(|_| self.app_key.clone().into_bytes()),
            None => self.app_key.clone().into_bytes(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    pub totp: TotpConfig,
    pub throttle: ThrottleConfig,
    pub session: SessionConfig,
    pub csrf: CsrfConfig,
}

impl SecurityConfig {
    /// Load configuration from environment variables, falling back to the
    /// defaults above for anything unset or unparsable.
    pub fn from_env() -> Self {
        Self {
            totp: TotpConfig {
                digits: env_parsed("TWOFA_DIGITS", 6),
                period: env_parsed("TWOFA_PERIOD", 30),
                window: env_parsed("TWOFA_WINDOW", 1),
                issuer: env::var("TWOFA_ISSUER").unwrap_or_else(|_| "Pantube".to_string()),
            },
            throttle: ThrottleConfig {
                max_attempts: env_parsed("AUTH_MAX_ATTEMPTS", 5),
                lockout_seconds: env_parsed("AUTH_LOCKOUT_SECONDS", 900),
            },
            session: SessionConfig {
                timeout_seconds: env_parsed("SESSION_TIMEOUT_SECONDS", 7200),
            },
            csrf: CsrfConfig {
                app_key: env::var("APP_KEY")
                    .unwrap_or_else(|_| "default-key-change-in-production".to_string()),
                header_name: env::var("CSRF_HEADER_NAME")
                    .unwrap_or_else(|_| "X-CSRF-TOKEN".to_string()),
            },
        }
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_platform_policy() {
        let config = SecurityConfig::default();
        assert_eq!(config.totp.digits, 6);
        assert_eq!(config.totp.period, 30);
        assert_eq!(config.totp.window, 1);
        assert_eq!(config.throttle.max_attempts, 5);
        assert_eq!(config.throttle.lockout_seconds, 900);
        assert_eq!(config.session.timeout_seconds, 7200);
    }

    #[test]
    fn base64_prefixed_app_key_decodes() {
        let config = CsrfConfig {
            app_key: "base64:c2VjcmV0LWtleQ==".to_string(),
            ..CsrfConfig::default()
        };
        assert_eq!(config.key_bytes(), b"secret-key");
    }

    #[test]
    fn plain_app_key_used_verbatim() {
        let config = CsrfConfig::default();
        assert_eq!(config.key_bytes(), b"default-key-change-in-production");
    }
}
