use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fetch::FetchSettings;
use crate::proxy::{ProxyEndpoint, RaceSettings};
use crate::scheduler::SchedulePolicy;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),
    #[error("jpeg quality must be within 1..=100, got {0}")]
    JpegQuality(u8),
    #[error("compression level must be within 0..=9, got {0}")]
    CompressionLevel(i64),
    #[error("proxy endpoint {endpoint:?} is not a valid url: {reason}")]
    InvalidProxy { endpoint: String, reason: String },
}

/// Engine settings. Every duration is expressed in milliseconds so the
/// struct stays readable in config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub proxies: Vec<ProxyEndpoint>,
    pub schedule: SchedulePolicy,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub direct_timeout_ms: u64,
    pub proxy_leg_timeout_ms: u64,
    pub race_timeout_ms: u64,
    pub render_timeout_ms: u64,
    pub task_timeout_ms: u64,
    pub redirect_limit: usize,
    pub max_bytes: u64,
    pub enforce_direct_content_type: bool,
    pub rendered_fallback: bool,
    pub origin: Option<String>,
    pub user_agent: String,
    pub jpeg_quality: u8,
    pub compression_level: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            proxies: ProxyEndpoint::public_relays(),
            schedule: SchedulePolicy::Ceiling { limit: 5 },
            connect_timeout_ms: 10_000,
            request_timeout_ms: 30_000,
            direct_timeout_ms: 10_000,
            proxy_leg_timeout_ms: 5_000,
            race_timeout_ms: 30_000,
            render_timeout_ms: 15_000,
            task_timeout_ms: 60_000,
            redirect_limit: 5,
            max_bytes: 25 * 1024 * 1024,
            enforce_direct_content_type: true,
            rendered_fallback: true,
            origin: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            jpeg_quality: 95,
            compression_level: 6,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.schedule.concurrency() == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        for (name, value) in [
            ("connect_timeout_ms", self.connect_timeout_ms),
            ("request_timeout_ms", self.request_timeout_ms),
            ("direct_timeout_ms", self.direct_timeout_ms),
            ("proxy_leg_timeout_ms", self.proxy_leg_timeout_ms),
            ("race_timeout_ms", self.race_timeout_ms),
            ("render_timeout_ms", self.render_timeout_ms),
            ("task_timeout_ms", self.task_timeout_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroTimeout(name));
            }
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::JpegQuality(self.jpeg_quality));
        }
        if !(0..=9).contains(&self.compression_level) {
            return Err(ConfigError::CompressionLevel(self.compression_level));
        }
        for proxy in &self.proxies {
            proxy.validate()?;
        }
        Ok(())
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            redirect_limit: self.redirect_limit,
            max_bytes: self.max_bytes,
            user_agent: self.user_agent.clone(),
        }
    }

    pub fn race_settings(&self) -> RaceSettings {
        RaceSettings {
            leg_timeout: Duration::from_millis(self.proxy_leg_timeout_ms),
            race_timeout: Duration::from_millis(self.race_timeout_ms),
        }
    }

    pub fn direct_timeout(&self) -> Duration {
        Duration::from_millis(self.direct_timeout_ms)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_millis(self.task_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.proxies.len(), 8);
        assert_eq!(config.race_settings().leg_timeout, Duration::from_secs(5));
        assert_eq!(config.race_settings().race_timeout, Duration::from_secs(30));
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let config = EngineConfig {
            schedule: SchedulePolicy::Windowed { size: 0 },
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroConcurrency));
    }

    #[test]
    fn zero_timeout_names_the_field() {
        let config = EngineConfig {
            race_timeout_ms: 0,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroTimeout("race_timeout_ms"))
        );
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"rendered_fallback": false, "proxies": []}"#).unwrap();
        assert!(!config.rendered_fallback);
        assert!(config.proxies.is_empty());
        assert_eq!(config.jpeg_quality, 95);
    }
}
