//! Remote collaborators of the profile wizard.
//!
//! The wizard only knows the [`ProfileService`] contract: name availability,
//! credential check, project listing, and saving. [`jira`] talks to the Jira
//! REST API for the credential and project calls; the profile store in
//! [`crate::profile`] covers names and saving.

pub mod error;
pub mod jira;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{FormData, JiraProject};

pub use error::ApiError;
pub use jira::JiraClient;

/// Everything sent to the server when checking credentials
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialsRequest {
    pub server: String,
    pub email: String,
    pub api_token: String,
    /// Issue query (JQL), empty when unset
    pub query: String,
}

impl CredentialsRequest {
    pub fn from_form(form: &FormData) -> Self {
        Self {
            server: form.jira_server.trim().to_string(),
            email: form.jira_email.trim().to_string(),
            api_token: form.jira_api_token.clone(),
            query: form.jira_query.trim().to_string(),
        }
    }
}

impl fmt::Debug for CredentialsRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialsRequest")
            .field("server", &self.server)
            .field("email", &self.email)
            .field("api_token", &"[REDACTED]")
            .field("query", &self.query)
            .finish()
    }
}

/// Data handed to the save operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePayload {
    #[serde(flatten)]
    pub data: FormData,
}

impl ProfilePayload {
    /// Build a payload from the form, trimming identifying fields.
    pub fn from_form(form: &FormData) -> Self {
        let mut data = form.clone();
        data.name = data.name.trim().to_string();
        data.jira_server = data.jira_server.trim().trim_end_matches('/').to_string();
        data.jira_email = data.jira_email.trim().to_string();
        data.jira_query = data.jira_query.trim().to_string();
        data.project_key = data.project_key.trim().to_string();
        Self { data }
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }
}

/// Operations the wizard needs from the outside world.
///
/// Every call may fail; the wizard turns failures into step or submit errors
/// and never propagates them to its caller.
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Whether no other saved profile uses `name`
    async fn check_name_availability(&self, name: &str) -> Result<bool>;

    /// Verify server, email, token and (when set) the issue query
    async fn check_credentials(&self, request: &CredentialsRequest) -> Result<()>;

    /// List projects visible to the credentials, in server order
    async fn fetch_projects(&self, request: &CredentialsRequest) -> Result<Vec<JiraProject>>;

    /// Save a new profile, returning its saved name
    async fn create_profile(&self, payload: &ProfilePayload) -> Result<String>;

    /// Replace the profile with identifier `id`, returning its saved name
    async fn update_profile(&self, id: &str, payload: &ProfilePayload) -> Result<String>;
}
