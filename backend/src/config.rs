use std::collections::HashSet;
use std::num::NonZeroU64;
use std::path::PathBuf;
use std::time::Duration;
use rocket::figment::Figment;
use serde::Deserialize;
use shared::{Nominee, Nominees, RaceRules};
use time::UtcOffset;

pub const CONFIG_TABLE: &str = "tracker";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Figment(#[from] Box<rocket::figment::Error>),
    #[error("At least one nominee must be configured")]
    NoNominees,
    #[error("Duplicate nominee id: {0}")]
    DuplicateNominee(String),
    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),
    #[error("Invalid UTC offset: {0} hours")]
    InvalidOffset(i8),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub endpoint: String,
    pub referer: String,
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.fchoice.vn/vote-token.htm".into(),
            referer: "https://fchoice.vn/".into(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub contest_name: String,
    pub click_url: Option<String>,
    pub nominees: Vec<Nominee>,
    pub source: SourceConfig,
    pub poll_interval_secs: u64,
    pub notify_interval_secs: u64,
    pub summary_interval_secs: u64,
    pub milestone_unit: NonZeroU64,
    pub utc_offset_hours: i8,
    pub history_path: PathBuf,
    pub subscribers_url: String,
    pub delivery_timeout_secs: u64,
    pub push_ttl_secs: u32,
    pub vapid_subject: String,
    pub allowed_origins: Vec<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        let rules = RaceRules::default();
        Self {
            contest_name: "FChoice 2025".into(),
            click_url: None,
            nominees: Vec::new(),
            source: SourceConfig::default(),
            poll_interval_secs: 10,
            notify_interval_secs: 10,
            summary_interval_secs: rules.summary_interval.as_secs(),
            milestone_unit: rules.milestone_unit,
            utc_offset_hours: 7,
            history_path: PathBuf::from("vote_history.json"),
            subscribers_url: "sqlite://subscribers.db".into(),
            delivery_timeout_secs: 10,
            push_ttl_secs: 60,
            vapid_subject: "mailto:admin@example.com".into(),
            allowed_origins: vec!["http://127.0.0.1:3000".into()],
        }
    }
}

impl TrackerConfig {
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment
            .extract_inner(CONFIG_TABLE)
            .map_err(|e| ConfigError::Figment(Box::new(e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nominees.is_empty() {
            return Err(ConfigError::NoNominees);
        }

        let mut seen = HashSet::new();
        for nominee in &self.nominees {
            if !seen.insert(nominee.id.as_str()) {
                return Err(ConfigError::DuplicateNominee(nominee.id.to_string()));
            }
        }

        for (name, value) in [
            ("poll_interval_secs", self.poll_interval_secs),
            ("notify_interval_secs", self.notify_interval_secs),
            ("summary_interval_secs", self.summary_interval_secs),
            ("delivery_timeout_secs", self.delivery_timeout_secs),
            ("source.timeout_secs", self.source.timeout_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroInterval(name));
            }
        }

        self.utc_offset().map(|_| ())
    }

    pub fn nominees(&self) -> Nominees {
        Nominees::new(self.nominees.clone())
    }

    pub fn utc_offset(&self) -> Result<UtcOffset, ConfigError> {
        UtcOffset::from_hms(self.utc_offset_hours, 0, 0)
            .map_err(|_| ConfigError::InvalidOffset(self.utc_offset_hours))
    }

    pub fn race_rules(&self) -> RaceRules {
        RaceRules {
            summary_interval: Duration::from_secs(self.summary_interval_secs),
            milestone_unit: self.milestone_unit,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn notify_interval(&self) -> Duration {
        Duration::from_secs(self.notify_interval_secs)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_secs)
    }
}

/// VAPID key pair, read from the environment rather than `Rocket.toml`.
#[derive(Clone)]
pub struct VapidKeys {
    pub private_key: String,
    pub public_key: String,
}

impl VapidKeys {
    pub fn from_env() -> Option<Self> {
        let private_key = std::env::var("VAPID_PRIVATE_KEY").ok()?;
        let public_key = std::env::var("VAPID_PUBLIC_KEY").ok()?;
        if private_key.trim().is_empty() || public_key.trim().is_empty() {
            return None;
        }
        Some(Self { private_key, public_key })
    }
}
