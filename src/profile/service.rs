//! [`ProfileService`] backed by the Jira REST API and the local profile store.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::Result;
use crate::remote::{CredentialsRequest, JiraClient, ProfilePayload, ProfileService};
use crate::types::JiraProject;

use super::ProfileStore;

/// Checks credentials against Jira and saves profiles to disk
pub struct LocalProfileService {
    store: ProfileStore,
    timeout: Duration,
    /// Profile being edited; its own name never counts as taken
    current_id: Option<String>,
    write_lock: Mutex<()>,
}

impl LocalProfileService {
    pub fn new(store: ProfileStore, timeout: Duration) -> Self {
        Self {
            store,
            timeout,
            current_id: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Service using the default store and the configured remote timeout
    pub fn from_config(config: &Config) -> Self {
        Self::new(ProfileStore::open_default(), config.remote_timeout())
    }

    /// Exclude the profile with `id` from name collisions
    pub fn with_current_profile(mut self, id: impl Into<String>) -> Self {
        self.current_id = Some(id.into());
        self
    }

    pub fn store(&self) -> &ProfileStore {
        &self.store
    }
}

#[async_trait]
impl ProfileService for LocalProfileService {
    async fn check_name_availability(&self, name: &str) -> Result<bool> {
        self.store
            .is_name_available(name, self.current_id.as_deref())
    }

    async fn check_credentials(&self, request: &CredentialsRequest) -> Result<()> {
        let client = JiraClient::new(request, self.timeout)?;
        client.verify_credentials().await?;
        if !request.query.is_empty() {
            client.validate_query(&request.query).await?;
        }
        Ok(())
    }

    async fn fetch_projects(&self, request: &CredentialsRequest) -> Result<Vec<JiraProject>> {
        JiraClient::new(request, self.timeout)?.list_projects().await
    }

    async fn create_profile(&self, payload: &ProfilePayload) -> Result<String> {
        let _guard = self.write_lock.lock();
        let profile = self.store.create(payload)?;
        tracing::info!("created profile '{}' ({})", profile.name(), profile.id);
        Ok(profile.data.name)
    }

    async fn update_profile(&self, id: &str, payload: &ProfilePayload) -> Result<String> {
        let _guard = self.write_lock.lock();
        let profile = self.store.update(id, payload)?;
        tracing::info!("updated profile '{}' ({})", profile.name(), profile.id);
        Ok(profile.data.name)
    }
}
