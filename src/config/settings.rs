use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub state_root: PathBuf,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub dedup: DedupConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectoryConfig {
    #[serde(default = "default_directory_api_base")]
    pub api_base: String,
    #[serde(default = "default_directory_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationConfig {
    #[serde(default = "default_webhook_url")]
    pub webhook_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_audit_channel")]
    pub audit_channel: String,
    #[serde(default = "default_approvers_channel")]
    pub approvers_channel: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DedupConfig {
    #[serde(default = "default_dedup_ttl_secs")]
    pub ttl_secs: i64,
}

fn default_directory_api_base() -> String {
    "https://directory.internal/api".to_string()
}

fn default_directory_timeout_secs() -> u64 {
    30
}

fn default_search_limit() -> usize {
    8
}

fn default_webhook_url() -> String {
    "https://chat.internal/hooks/opsdesk".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_audit_channel() -> String {
    "#it-audit".to_string()
}

fn default_approvers_channel() -> String {
    "#it-approvals".to_string()
}

fn default_dedup_ttl_secs() -> i64 {
    900
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            api_base: default_directory_api_base(),
            timeout_secs: default_directory_timeout_secs(),
            search_limit: default_search_limit(),
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_url: default_webhook_url(),
            timeout_secs: default_timeout_secs(),
            audit_channel: default_audit_channel(),
            approvers_channel: default_approvers_channel(),
        }
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_dedup_ttl_secs(),
        }
    }
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.state_root.as_os_str().is_empty() {
            return Err(ConfigError::Settings(
                "state_root must be non-empty".to_string(),
            ));
        }
        if self.directory.api_base.trim().is_empty() {
            return Err(ConfigError::Settings(
                "directory.api_base must be non-empty".to_string(),
            ));
        }
        if self.directory.timeout_secs == 0 {
            return Err(ConfigError::Settings(
                "directory.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.notifications.webhook_url.trim().is_empty() {
            return Err(ConfigError::Settings(
                "notifications.webhook_url must be non-empty".to_string(),
            ));
        }
        if self.notifications.audit_channel.trim().is_empty() {
            return Err(ConfigError::Settings(
                "notifications.audit_channel must be non-empty".to_string(),
            ));
        }
        if self.notifications.approvers_channel.trim().is_empty() {
            return Err(ConfigError::Settings(
                "notifications.approvers_channel must be non-empty".to_string(),
            ));
        }
        if self.dedup.ttl_secs <= 0 {
            return Err(ConfigError::Settings(
                "dedup.ttl_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_parse_with_defaults() {
        let settings: Settings =
            serde_yaml::from_str("state_root: /tmp/opsdesk\n").expect("parse settings");
        assert_eq!(settings.directory.timeout_secs, 30);
        assert_eq!(settings.dedup.ttl_secs, 900);
        assert_eq!(settings.notifications.audit_channel, "#it-audit");
        settings.validate().expect("valid");
    }

    #[test]
    fn validation_rejects_zero_timeout() {
        let settings: Settings = serde_yaml::from_str(
            r#"
state_root: /tmp/opsdesk
directory:
  timeout_secs: 0
"#,
        )
        .expect("parse settings");
        let err = settings.validate().expect_err("invalid");
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn validation_rejects_non_positive_dedup_ttl() {
        let settings: Settings = serde_yaml::from_str(
            r#"
state_root: /tmp/opsdesk
dedup:
  ttl_secs: 0
"#,
        )
        .expect("parse settings");
        assert!(settings.validate().is_err());
    }
}
