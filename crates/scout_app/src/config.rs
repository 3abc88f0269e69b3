use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::TimeDelta;
use scout_core::{CycleSettings, RecordPolicy, DEFAULT_SITE_ORIGIN};
use scout_engine::{NotifySettings, SourceSettings, DEFAULT_FIRECRAWL_ENDPOINT, DEFAULT_LISTING_URL};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_SEEN_STORE: &str = "sent_bounties.txt";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("missing required setting `{0}`")]
    Missing(&'static str),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Everything a cycle needs, loaded from an optional RON file and then
/// overridden by flags and environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub firecrawl_api_key: Option<String>,
    pub slack_webhook_url: Option<String>,
    pub firecrawl_endpoint: String,
    pub listing_url: String,
    pub site_origin: String,
    pub window_hours: u32,
    pub seen_store: PathBuf,
    pub record_policy: RecordPolicy,
    pub wait_for_ms: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub max_response_bytes: u64,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            firecrawl_api_key: None,
            slack_webhook_url: None,
            firecrawl_endpoint: DEFAULT_FIRECRAWL_ENDPOINT.to_string(),
            listing_url: DEFAULT_LISTING_URL.to_string(),
            site_origin: DEFAULT_SITE_ORIGIN.to_string(),
            window_hours: 24,
            seen_store: PathBuf::from(DEFAULT_SEEN_STORE),
            record_policy: RecordPolicy::Always,
            wait_for_ms: 2000,
            connect_timeout_secs: 10,
            request_timeout_secs: 60,
            max_response_bytes: 5 * 1024 * 1024,
            log_file: None,
        }
    }
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub firecrawl_api_key: Option<String>,
    pub slack_webhook_url: Option<String>,
    pub window_hours: Option<u32>,
    pub seen_store: Option<PathBuf>,
    pub log_file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Reads `path` when given; defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&text)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(key) = overrides.firecrawl_api_key {
            self.firecrawl_api_key = Some(key);
        }
        if let Some(url) = overrides.slack_webhook_url {
            self.slack_webhook_url = Some(url);
        }
        if let Some(hours) = overrides.window_hours {
            self.window_hours = hours;
        }
        if let Some(path) = overrides.seen_store {
            self.seen_store = path;
        }
        if let Some(path) = overrides.log_file {
            self.log_file = Some(path);
        }
    }

    /// Checks the settings and normalizes the site origin.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if self
            .firecrawl_api_key
            .as_deref()
            .map_or(true, |key| key.trim().is_empty())
        {
            return Err(ConfigError::Missing("firecrawl_api_key"));
        }
        if self.window_hours == 0 {
            return Err(ConfigError::Invalid {
                field: "window_hours",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.seen_store.as_os_str().is_empty() {
            return Err(ConfigError::Missing("seen_store"));
        }
        check_absolute_url("site_origin", &self.site_origin)?;
        check_absolute_url("listing_url", &self.listing_url)?;
        check_absolute_url("firecrawl_endpoint", &self.firecrawl_endpoint)?;

        self.site_origin = self.site_origin.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn cycle_settings(&self) -> CycleSettings {
        CycleSettings {
            site_origin: self.site_origin.clone(),
            window: TimeDelta::hours(i64::from(self.window_hours)),
            record_policy: self.record_policy,
        }
    }

    pub fn source_settings(&self) -> Result<SourceSettings, ConfigError> {
        let api_key = self
            .firecrawl_api_key
            .clone()
            .ok_or(ConfigError::Missing("firecrawl_api_key"))?;
        Ok(SourceSettings {
            endpoint: self.firecrawl_endpoint.clone(),
            listing_url: self.listing_url.clone(),
            wait_for: Duration::from_millis(self.wait_for_ms),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            max_bytes: self.max_response_bytes,
            ..SourceSettings::new(api_key)
        })
    }

    pub fn notify_settings(&self) -> NotifySettings {
        NotifySettings {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}

fn check_absolute_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let parsed = url::Url::parse(value).map_err(|err| ConfigError::Invalid {
        field,
        reason: err.to_string(),
    })?;
    if parsed.cannot_be_a_base() || parsed.host_str().is_none() {
        return Err(ConfigError::Invalid {
            field,
            reason: format!("{value:?} is not an absolute http(s) url"),
        });
    }
    Ok(())
}
