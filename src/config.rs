//! Configuration module
//!
//! All policy constants, rates, and calendar endpoints are external
//! configuration: TOML file at `~/.config/parking-service/config.toml`
//! (overridable via `PARKING_CONFIG`), with the Google private key also
//! accepted from the `GOOGLE_PRIVATE_KEY` environment variable so the
//! secret can stay out of the file.

use std::path::{Path, PathBuf};

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::WindowPolicy;
use crate::domain::{RateCard, Spot};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("utc_offset_minutes out of range: {0}")]
    InvalidOffset(i32),
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub google: GoogleConfig,
    pub policy: PolicyConfig,
    pub pricing: PricingConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Bound on every outbound call to the calendar store and feed.
    /// The store can be rate-limited or slow; a hung call must not
    /// hang the request handler.
    pub http_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            http_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// Service account email.
    pub client_email: String,
    /// PEM private key. Literal `\n` sequences are accepted (pasted
    /// single-line keys) and expanded on use.
    pub private_key: String,
    pub calendar_id_northern: String,
    pub calendar_id_southern: String,
    pub ics_url_northern: String,
    pub ics_url_southern: String,
    /// Advisory payment target shown in event descriptions.
    pub owner_email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub max_advance_days: i64,
    pub max_duration_days: i64,
    pub grace_minutes: i64,
    /// Application timezone as a fixed UTC offset in minutes.
    /// Default −240 (America/Toronto, daylight time). Only affects
    /// interpretation of offset-less timestamps; storage is UTC.
    pub utc_offset_minutes: i32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_advance_days: 30,
            max_duration_days: 90,
            grace_minutes: 5,
            utc_offset_minutes: -240,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub day_cents: i64,
    pub week_cents: i64,
    pub month_cents: i64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            day_cents: 1500,
            week_cents: 5000,
            month_cents: 10000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&text)?;
        if FixedOffset::east_opt(config.policy.utc_offset_minutes * 60).is_none() {
            return Err(ConfigError::InvalidOffset(config.policy.utc_offset_minutes));
        }
        config.google.ics_url_northern = sanitize_url(&config.google.ics_url_northern);
        config.google.ics_url_southern = sanitize_url(&config.google.ics_url_southern);
        config.google.client_email = config.google.client_email.trim().to_string();
        config.google.calendar_id_northern = config.google.calendar_id_northern.trim().to_string();
        config.google.calendar_id_southern = config.google.calendar_id_southern.trim().to_string();
        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn window_policy(&self) -> WindowPolicy {
        WindowPolicy {
            max_advance_days: self.policy.max_advance_days,
            max_duration_days: self.policy.max_duration_days,
            grace_minutes: self.policy.grace_minutes,
        }
    }

    pub fn rate_card(&self) -> RateCard {
        RateCard {
            day_cents: self.pricing.day_cents,
            week_cents: self.pricing.week_cents,
            month_cents: self.pricing.month_cents,
        }
    }

    pub fn app_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.policy.utc_offset_minutes * 60)
            .unwrap_or_else(|| FixedOffset::east_opt(0).unwrap())
    }

    pub fn calendar_id(&self, spot: Spot) -> &str {
        match spot {
            Spot::Northern => &self.google.calendar_id_northern,
            Spot::Southern => &self.google.calendar_id_southern,
        }
    }

    pub fn ics_url(&self, spot: Spot) -> &str {
        match spot {
            Spot::Northern => &self.google.ics_url_northern,
            Spot::Southern => &self.google.ics_url_southern,
        }
    }

    /// The service-account key, preferring the environment over the
    /// file and expanding pasted `\n` sequences into real newlines.
    pub fn google_private_key(&self) -> String {
        std::env::var("GOOGLE_PRIVATE_KEY")
            .unwrap_or_else(|_| self.google.private_key.clone())
            .replace("\\n", "\n")
    }
}

/// Clean up an ICS URL pasted from chat or quoted by mistake.
fn sanitize_url(value: &str) -> String {
    let mut s = value.trim();
    if let Some(rest) = s.strip_prefix('@') {
        s = rest.trim();
    }
    if (s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')) {
        s = s[1..s.len() - 1].trim();
    }
    s.to_string()
}

/// Default config file location.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("parking-service")
        .join("config.toml")
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_policy() {
        let config = AppConfig::default();
        assert_eq!(config.policy.max_advance_days, 30);
        assert_eq!(config.policy.max_duration_days, 90);
        assert_eq!(config.policy.grace_minutes, 5);
        assert_eq!(config.pricing.day_cents, 1500);
        assert_eq!(config.pricing.week_cents, 5000);
        assert_eq!(config.pricing.month_cents, 10000);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9090

            [pricing]
            day_cents = 2000
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.pricing.day_cents, 2000);
        assert_eq!(config.pricing.week_cents, 5000);
    }

    #[test]
    fn sanitize_url_strips_paste_artifacts() {
        assert_eq!(sanitize_url("  https://x/basic.ics "), "https://x/basic.ics");
        assert_eq!(sanitize_url("@https://x/basic.ics"), "https://x/basic.ics");
        assert_eq!(sanitize_url("\"https://x/basic.ics\""), "https://x/basic.ics");
        assert_eq!(sanitize_url("'https://x/basic.ics'"), "https://x/basic.ics");
        assert_eq!(sanitize_url(""), "");
    }

    #[test]
    fn private_key_expands_escaped_newlines() {
        let mut config = AppConfig::default();
        config.google.private_key = "-----BEGIN\\nKEY-----".into();
        assert_eq!(config.google_private_key(), "-----BEGIN\nKEY-----");
    }

    #[test]
    fn app_offset_is_toronto_by_default() {
        let config = AppConfig::default();
        assert_eq!(config.app_offset().local_minus_utc(), -240 * 60);
    }

    #[test]
    fn policy_and_rates_map_through() {
        let config = AppConfig::default();
        let policy = config.window_policy();
        assert_eq!(policy.max_advance_days, 30);
        let rates = config.rate_card();
        assert_eq!(rates.month_cents, 10000);
    }
}
