use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validator::ValidationMode;

pub const DEFAULT_SMTP_PORT: u16 = 25;
pub const DEFAULT_HELO_DOMAIN: &str = "example.com";
pub const DEFAULT_PROBE_SENDER: &str = "verify@example.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(15_000);

/// Environment keys read by [`ProbeOptions::from_env`].
pub mod env_keys {
    pub const SMTP_PORT: &str = "SMTP_PORT";
    pub const HELLO_DOMAIN: &str = "HELLO_DOMAIN";
    pub const PROBE_SENDER: &str = "PROBE_SENDER";
    pub const PROBE_TIMEOUT_MS: &str = "PROBE_TIMEOUT_MS";
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key}={value:?} is not a valid number: {source}")]
    InvalidNumber {
        key: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },
}

/// Configuration knobs for a probe and for the verification pipeline around
/// it.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Destination port on every mail exchanger.
    pub port: u16,
    /// Identity sent in `HELO`.
    pub helo_domain: String,
    /// Envelope sender used in `MAIL FROM`.
    pub probe_sender: String,
    /// Budget for one whole SMTP session, connection included.
    pub timeout: Duration,
    /// Upper bound on exchangers contacted per verification. `None` tries
    /// them all.
    pub max_hosts: Option<usize>,
    pub validation_mode: ValidationMode,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_SMTP_PORT,
            helo_domain: DEFAULT_HELO_DOMAIN.to_string(),
            probe_sender: DEFAULT_PROBE_SENDER.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_hosts: None,
            validation_mode: ValidationMode::Strict,
        }
    }
}

impl ProbeOptions {
    /// Reads `SMTP_PORT`, `HELLO_DOMAIN`, `PROBE_SENDER` and
    /// `PROBE_TIMEOUT_MS`. Unset or blank variables keep their default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let mut options = Self::default();
        if let Some(raw) = value(env_keys::SMTP_PORT) {
            options.port = parse_number(env_keys::SMTP_PORT, &raw)?;
            if options.port == 0 {
                return Err(ConfigError::Zero {
                    key: env_keys::SMTP_PORT,
                });
            }
        }
        if let Some(helo) = value(env_keys::HELLO_DOMAIN) {
            options.helo_domain = helo;
        }
        if let Some(sender) = value(env_keys::PROBE_SENDER) {
            options.probe_sender = sender;
        }
        if let Some(raw) = value(env_keys::PROBE_TIMEOUT_MS) {
            let millis: u64 = parse_number(env_keys::PROBE_TIMEOUT_MS, &raw)?;
            if millis == 0 {
                return Err(ConfigError::Zero {
                    key: env_keys::PROBE_TIMEOUT_MS,
                });
            }
            options.timeout = Duration::from_millis(millis);
        }
        Ok(options)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn parse_number<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr<Err = std::num::ParseIntError>,
{
    raw.parse().map_err(|source| ConfigError::InvalidNumber {
        key,
        value: raw.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let options = ProbeOptions::from_lookup(lookup(&[])).expect("defaults");
        assert_eq!(options, ProbeOptions::default());
        assert_eq!(options.port, 25);
        assert_eq!(options.helo_domain, "example.com");
        assert_eq!(options.probe_sender, "verify@example.com");
        assert_eq!(options.timeout, Duration::from_secs(15));
    }

    #[test]
    fn environment_overrides_defaults() {
        let options = ProbeOptions::from_lookup(lookup(&[
            ("SMTP_PORT", "2525"),
            ("HELLO_DOMAIN", "probe.example.net"),
            ("PROBE_SENDER", "bounce@example.net"),
            ("PROBE_TIMEOUT_MS", "3000"),
        ]))
        .expect("parsed");
        assert_eq!(options.port, 2525);
        assert_eq!(options.helo_domain, "probe.example.net");
        assert_eq!(options.probe_sender, "bounce@example.net");
        assert_eq!(options.timeout, Duration::from_secs(3));
    }

    #[test]
    fn blank_values_fall_back() {
        let options =
            ProbeOptions::from_lookup(lookup(&[("HELLO_DOMAIN", "  "), ("SMTP_PORT", "")]))
                .expect("parsed");
        assert_eq!(options.helo_domain, DEFAULT_HELO_DOMAIN);
        assert_eq!(options.port, DEFAULT_SMTP_PORT);
    }

    #[test]
    fn padded_numbers_are_trimmed() {
        let options = ProbeOptions::from_lookup(lookup(&[
            ("SMTP_PORT", " 2525 "),
            ("PROBE_TIMEOUT_MS", "\t800\n"),
        ]))
        .expect("parsed");
        assert_eq!(options.port, 2525);
        assert_eq!(options.timeout, Duration::from_millis(800));
    }

    #[test]
    fn invalid_port_is_reported() {
        let err = ProbeOptions::from_lookup(lookup(&[("SMTP_PORT", "smtp")]))
            .expect_err("not a number");
        match err {
            ConfigError::InvalidNumber { key, value, .. } => {
                assert_eq!(key, "SMTP_PORT");
                assert_eq!(value, "smtp");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = ProbeOptions::from_lookup(lookup(&[("PROBE_TIMEOUT_MS", "0")]))
            .expect_err("zero timeout");
        assert!(matches!(
            err,
            ConfigError::Zero {
                key: "PROBE_TIMEOUT_MS"
            }
        ));
    }
}
