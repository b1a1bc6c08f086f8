//! YAML-backed storage of saved profiles.
//!
//! All profiles live in one file (`.jira-wizard/profiles.yaml` by default).
//! Names are compared trimmed and case-insensitively, so "Team Board" and
//! "team board " collide.

use std::fs;
use std::path::{Path, PathBuf};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, WizardError};
use crate::paths::profiles_path;
use crate::remote::ProfilePayload;
use crate::types::FormData;
use crate::wizard::InitialConfig;

/// A profile as persisted on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredProfile {
    pub id: String,
    #[serde(flatten)]
    pub data: FormData,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl StoredProfile {
    pub fn name(&self) -> &str {
        &self.data.name
    }

    /// Seed for editing this profile in the wizard
    pub fn initial_config(&self) -> InitialConfig {
        InitialConfig::edit(self.id.clone(), self.data.clone())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    profiles: Vec<StoredProfile>,
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Profile file handle
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location under the wizard root
    pub fn open_default() -> Self {
        Self::new(profiles_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all profiles, in creation order. A missing file means no profiles.
    pub fn load(&self) -> Result<Vec<StoredProfile>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            WizardError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read profiles at {}: {}", self.path.display(), e),
            ))
        })?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        let file: ProfileFile = serde_yaml_ng::from_str(&content)?;
        Ok(file.profiles)
    }

    fn save_all(&self, profiles: Vec<StoredProfile>) -> Result<()> {
        let content = serde_yaml_ng::to_string(&ProfileFile { profiles })?;
        crate::utils::write_private(&self.path, &content)
    }

    pub fn find_by_name(&self, name: &str) -> Result<Option<StoredProfile>> {
        let wanted = normalize_name(name);
        Ok(self
            .load()?
            .into_iter()
            .find(|p| normalize_name(p.name()) == wanted))
    }

    /// Whether `name` is free, ignoring the profile with id `exclude_id`
    pub fn is_name_available(&self, name: &str, exclude_id: Option<&str>) -> Result<bool> {
        let wanted = normalize_name(name);
        Ok(!self.load()?.iter().any(|p| {
            normalize_name(p.name()) == wanted && Some(p.id.as_str()) != exclude_id
        }))
    }

    pub fn create(&self, payload: &ProfilePayload) -> Result<StoredProfile> {
        validate_name(payload.name())?;

        let mut profiles = self.load()?;
        let wanted = normalize_name(payload.name());
        if profiles.iter().any(|p| normalize_name(p.name()) == wanted) {
            return Err(WizardError::NameTaken(payload.name().to_string()));
        }

        let now = Timestamp::now();
        let profile = StoredProfile {
            id: Uuid::new_v4().to_string(),
            data: payload.data.clone(),
            created_at: now,
            updated_at: now,
        };
        profiles.push(profile.clone());
        self.save_all(profiles)?;
        Ok(profile)
    }

    pub fn update(&self, id: &str, payload: &ProfilePayload) -> Result<StoredProfile> {
        validate_name(payload.name())?;

        let mut profiles = self.load()?;
        let wanted = normalize_name(payload.name());
        if profiles
            .iter()
            .any(|p| p.id != id && normalize_name(p.name()) == wanted)
        {
            return Err(WizardError::NameTaken(payload.name().to_string()));
        }

        let profile = profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| WizardError::ProfileNotFound(id.to_string()))?;
        profile.data = payload.data.clone();
        profile.updated_at = Timestamp::now();
        let updated = profile.clone();

        self.save_all(profiles)?;
        Ok(updated)
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(WizardError::InvalidInput(
            "profile name cannot be empty".to_string(),
        ));
    }
    if name.chars().any(char::is_control) {
        return Err(WizardError::InvalidInput(
            "profile name cannot contain control characters".to_string(),
        ));
    }
    Ok(())
}
