use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_MAX_LISTENERS: usize = 1024;
pub const MAX_LISTENERS_ENV: &str = "EMITKIT_MAX_LISTENERS";

/// Per-emitter options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitterOptions {
    /// Soft cap on listeners per event name. Going past it logs a warning;
    /// the registration still happens.
    #[serde(default = "default_max_listeners")]
    pub max_listeners: usize,
}

impl Default for EmitterOptions {
    fn default() -> Self {
        Self {
            max_listeners: default_max_listeners(),
        }
    }
}

impl EmitterOptions {
    pub fn with_max_listeners(mut self, max_listeners: usize) -> Self {
        self.max_listeners = max_listeners;
        self
    }

    /// Defaults overridden by `EMITKIT_MAX_LISTENERS` when it is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut options = Self::default();
        if let Ok(raw) = std::env::var(MAX_LISTENERS_ENV) {
            options.max_listeners = parse_max_listeners(&raw)?;
        }
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_listeners == 0 {
            return Err(ConfigError::Invalid(
                "max_listeners must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_max_listeners(raw: &str) -> Result<usize, ConfigError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| ConfigError::InvalidValue {
            key: MAX_LISTENERS_ENV.to_string(),
            value: raw.to_string(),
        })
}

fn default_max_listeners() -> usize {
    DEFAULT_MAX_LISTENERS
}

/// Flags carried by events dispatched onto a native target. Ignored by
/// in-memory emission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitOptions {
    #[serde(default)]
    pub bubbles: bool,
    #[serde(default)]
    pub cancelable: bool,
}

impl EmitOptions {
    pub const fn new(bubbles: bool, cancelable: bool) -> Self {
        Self {
            bubbles,
            cancelable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_1024_listeners() {
        assert_eq!(EmitterOptions::default().max_listeners, 1024);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let options: EmitterOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, EmitterOptions::default());

        let flags: EmitOptions = serde_json::from_str(r#"{"bubbles": true}"#).unwrap();
        assert_eq!(flags, EmitOptions::new(true, false));
    }

    #[test]
    fn zero_cap_is_rejected() {
        let err = EmitterOptions::default()
            .with_max_listeners(0)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_max_listeners(" 16 ").unwrap(), 16);
        match parse_max_listeners("lots") {
            Err(ConfigError::InvalidValue { key, value }) => {
                assert_eq!(key, MAX_LISTENERS_ENV);
                assert_eq!(value, "lots");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }
}
