//! Session settings read from the environment.
//!
//! Every value has a default; unusable values are logged and replaced by it.

use crate::models::GestationalWeek;
use std::env;
use tracing::warn;

pub const DEFAULT_WEEK: GestationalWeek = GestationalWeek::saturating(12);
pub const DEFAULT_CENTER: &str = "Hospital Rebagliati";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Reject confirmations with missing fields instead of filling defaults.
    pub strict_validation: bool,
    pub default_week: GestationalWeek,
    pub default_center: String,
    pub output: OutputFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            strict_validation: true,
            default_week: DEFAULT_WEEK,
            default_center: DEFAULT_CENTER.to_string(),
            output: OutputFormat::Text,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup, falling back to defaults
    /// for unset or unusable values.
    pub fn from_vars<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let strict_validation = match lookup("VIDA_STRICT_VALIDATION") {
            Some(value) => match value.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    warn!(value = %value, "VIDA_STRICT_VALIDATION not a boolean, using default");
                    defaults.strict_validation
                }
            },
            None => defaults.strict_validation,
        };

        let default_week = match lookup("VIDA_DEFAULT_WEEK") {
            Some(value) => match GestationalWeek::parse(&value) {
                Ok(week) => week,
                Err(_) => {
                    warn!(value = %value, "VIDA_DEFAULT_WEEK out of range, using default");
                    defaults.default_week
                }
            },
            None => defaults.default_week,
        };

        let default_center = lookup("VIDA_DEFAULT_CENTER")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.default_center);

        let output = match lookup("VIDA_OUTPUT") {
            Some(value) => match value.trim().to_lowercase().as_str() {
                "text" => OutputFormat::Text,
                "json" => OutputFormat::Json,
                _ => {
                    warn!(value = %value, "VIDA_OUTPUT must be 'text' or 'json', using default");
                    defaults.output
                }
            },
            None => defaults.output,
        };

        Self {
            strict_validation,
            default_week,
            default_center,
            output,
        }
    }
}
