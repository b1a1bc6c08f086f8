//! Top-level application configuration.
//!
//! Configuration is stored in `.jira-wizard/config.yaml` and includes:
//! - Defaults pre-filled into new profiles (server, email)
//! - The Jira API token (overridable through `JIRA_API_TOKEN`)
//! - Timing for name checks and remote calls

use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, WizardError};
use crate::paths::wizard_root;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server URL used when a new profile does not specify one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_server: Option<String>,

    /// Account email used when a new profile does not specify one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_email: Option<String>,

    /// Authentication tokens
    #[serde(default)]
    pub auth: AuthConfig,

    /// Idle window before a profile name is sent for an availability check
    #[serde(default = "default_name_check_debounce_ms")]
    pub name_check_debounce_ms: u64,

    /// Remote operation timeout in seconds (default: 30)
    #[serde(default = "default_remote_timeout")]
    pub remote_timeout: u64,
}

fn default_name_check_debounce_ms() -> u64 {
    300
}

fn default_remote_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_server: None,
            default_email: None,
            auth: AuthConfig::default(),
            name_check_debounce_ms: default_name_check_debounce_ms(),
            remote_timeout: default_remote_timeout(),
        }
    }
}

/// Authentication configuration
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        wizard_root().join("config.yaml")
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            WizardError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        let content = serde_yaml_ng::to_string(self)?;
        crate::utils::write_private(&path, &content)?;
        Ok(())
    }

    /// Get the API token from the environment or the config file
    pub fn api_token(&self) -> Option<String> {
        if let Ok(token) = env::var("JIRA_API_TOKEN")
            && !token.is_empty()
        {
            return Some(token);
        }

        self.auth.api_token.clone()
    }

    /// Set the stored API token
    pub fn set_api_token(&mut self, token: String) {
        self.auth.api_token = Some(token);
    }

    /// Debounce window applied to profile name availability checks
    pub fn name_check_debounce(&self) -> Duration {
        Duration::from_millis(self.name_check_debounce_ms)
    }

    /// Get the remote operation timeout duration
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout)
    }
}
