use chrono::Duration;
use dropclub_types::{default_mystery_rewards, default_point_packs, MysteryReward, PointPack};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration for the [crate::Service].
///
/// Every field has a default so an empty YAML file (or no file at all) yields
/// a working local setup.
#[derive(Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Shared secret used to verify payment webhook signatures.
    #[serde(default = "default_webhook_secret")]
    pub webhook_secret: String,
    /// Maximum age (in seconds) of a webhook signature timestamp.
    #[serde(default = "default_webhook_tolerance_secs")]
    pub webhook_tolerance_secs: i64,
    /// Base URL of the hosted checkout page. The pack id and account id are
    /// appended as query parameters.
    #[serde(default = "default_checkout_url")]
    pub checkout_url: String,

    /// Hours between free arcade plays. Zero disables the cooldown.
    #[serde(default = "default_arcade_cooldown_hours")]
    pub arcade_cooldown_hours: u64,

    /// Emails that receive admin rights at registration.
    #[serde(default)]
    pub admin_emails: Vec<String>,

    /// Directory uploaded images are written to (and served from).
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    /// Whether accounts may wipe their own balance and history.
    #[serde(default)]
    pub enable_reset: bool,

    #[serde(default = "default_point_packs")]
    pub packs: Vec<PointPack>,
    #[serde(default = "default_mystery_rewards")]
    pub mystery_rewards: Vec<MysteryReward>,
}

fn default_port() -> u16 {
    8080
}

fn default_webhook_secret() -> String {
    "whsec_dev".into()
}

fn default_webhook_tolerance_secs() -> i64 {
    300
}

fn default_checkout_url() -> String {
    "https://pay.dropclub.dev/checkout".into()
}

fn default_arcade_cooldown_hours() -> u64 {
    24
}

fn default_upload_dir() -> String {
    "uploads".into()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_yaml::from_str(&raw)?)
    }

    /// Cooldown between free arcade plays, if any.
    pub fn arcade_cooldown(&self) -> Option<Duration> {
        match self.arcade_cooldown_hours {
            0 => None,
            hours => Some(Duration::hours(hours as i64)),
        }
    }

    pub fn is_admin(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(email))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            webhook_secret: default_webhook_secret(),
            webhook_tolerance_secs: default_webhook_tolerance_secs(),
            checkout_url: default_checkout_url(),
            arcade_cooldown_hours: default_arcade_cooldown_hours(),
            admin_emails: Vec::new(),
            upload_dir: default_upload_dir(),
            enable_reset: false,
            packs: default_point_packs(),
            mystery_rewards: default_mystery_rewards(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}
