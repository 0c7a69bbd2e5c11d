use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("Port cannot be 0")]
    InvalidPort,
}

pub const DEFAULT_PORT: u16 = 3000;

/// Upper bound on request body size. Payloads past this point are rejected
/// before authentication or business logic run.
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

const DEFAULT_STATSD_PORT: u16 = 8125;

/// Network listener configuration
#[derive(Clone, Debug, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

/// StatsD metrics sink, when one is deployed alongside the gateway
#[derive(Clone, Debug, PartialEq)]
pub struct StatsdConfig {
    pub host: String,
    pub port: u16,
}

/// Process configuration, built once at startup and read-only afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Main listener for incoming requests
    pub listener: Listener,
    /// Shared secret for bearer authentication.
    ///
    /// Absence is tolerated at startup so the process can come up and answer
    /// liveness probes, but every authenticated route fails with 500 until
    /// the secret is configured.
    pub auth_token: Option<String>,
    /// Request body size cap in bytes
    pub max_body_bytes: usize,
    /// Optional StatsD target for the metrics recorder
    pub statsd: Option<StatsdConfig>,
}

impl Config {
    /// Builds the configuration from process environment variables:
    /// `INTERNAL_AUTH_TOKEN`, `PORT`, `MAX_BODY_BYTES`, `STATSD_HOST`,
    /// `STATSD_PORT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Tests use this
    /// to avoid mutating process-wide environment state.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match get("PORT") {
            Some(raw) => parse_number("PORT", &raw)?,
            None => DEFAULT_PORT,
        };
        if port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        let max_body_bytes = match get("MAX_BODY_BYTES") {
            Some(raw) => parse_number("MAX_BODY_BYTES", &raw)?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        let auth_token = get("INTERNAL_AUTH_TOKEN").filter(|token| !token.is_empty());

        let statsd = match get("STATSD_HOST") {
            Some(host) => {
                let port = match get("STATSD_PORT") {
                    Some(raw) => parse_number("STATSD_PORT", &raw)?,
                    None => DEFAULT_STATSD_PORT,
                };
                Some(StatsdConfig { host, port })
            }
            None => None,
        };

        Ok(Config {
            listener: Listener {
                host: "0.0.0.0".to_string(),
                port,
            },
            auth_token,
            max_body_bytes,
            statsd,
        })
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |name| map.get(name).map(|v| v.to_string())
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.listener.port, DEFAULT_PORT);
        assert_eq!(config.max_body_bytes, DEFAULT_MAX_BODY_BYTES);
        assert_eq!(config.auth_token, None);
        assert_eq!(config.statsd, None);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("INTERNAL_AUTH_TOKEN", "s3cret"),
            ("MAX_BODY_BYTES", "1024"),
            ("STATSD_HOST", "127.0.0.1"),
            ("STATSD_PORT", "9125"),
        ]))
        .unwrap();

        assert_eq!(config.listener.port, 8080);
        assert_eq!(config.auth_token.as_deref(), Some("s3cret"));
        assert_eq!(config.max_body_bytes, 1024);
        assert_eq!(
            config.statsd,
            Some(StatsdConfig {
                host: "127.0.0.1".to_string(),
                port: 9125,
            })
        );
    }

    #[test]
    fn test_empty_token_is_treated_as_absent() {
        let config = Config::from_lookup(lookup(&[("INTERNAL_AUTH_TOKEN", "")])).unwrap();
        assert_eq!(config.auth_token, None);
    }

    #[test]
    fn test_statsd_port_defaults() {
        let config = Config::from_lookup(lookup(&[("STATSD_HOST", "metrics.internal")])).unwrap();
        assert_eq!(
            config.statsd,
            Some(StatsdConfig {
                host: "metrics.internal".to_string(),
                port: 8125,
            })
        );
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("PORT", "not_a_number")])).unwrap_err(),
            ConfigError::InvalidNumber { name: "PORT", .. }
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("PORT", "0")])).unwrap_err(),
            ConfigError::InvalidPort
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("MAX_BODY_BYTES", "-1")])).unwrap_err(),
            ConfigError::InvalidNumber {
                name: "MAX_BODY_BYTES",
                ..
            }
        ));
    }
}
