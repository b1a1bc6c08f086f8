use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::WizardError;

/// One phase of the profile wizard, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Step {
    Credentials,
    Project,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Credentials => write!(f, "credentials"),
            Step::Project => write!(f, "project"),
        }
    }
}

impl FromStr for Step {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "credentials" => Ok(Step::Credentials),
            "project" => Ok(Step::Project),
            _ => Err(WizardError::InvalidInput(format!("unknown step '{s}'"))),
        }
    }
}

/// A form field of the profile being edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    JiraServer,
    JiraEmail,
    JiraApiToken,
    JiraQuery,
    ProjectKey,
    LeadTimeStartState,
    LeadTimeEndState,
    CycleTimeStartState,
    CycleTimeEndState,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Name,
        Field::JiraServer,
        Field::JiraEmail,
        Field::JiraApiToken,
        Field::JiraQuery,
        Field::ProjectKey,
        Field::LeadTimeStartState,
        Field::LeadTimeEndState,
        Field::CycleTimeStartState,
        Field::CycleTimeEndState,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::JiraServer => "jira_server",
            Field::JiraEmail => "jira_email",
            Field::JiraApiToken => "jira_api_token",
            Field::JiraQuery => "jira_query",
            Field::ProjectKey => "project_key",
            Field::LeadTimeStartState => "lead_time_start_state",
            Field::LeadTimeEndState => "lead_time_end_state",
            Field::CycleTimeStartState => "cycle_time_start_state",
            Field::CycleTimeEndState => "cycle_time_end_state",
        }
    }

    /// Fields sent with a credential check. Changing one invalidates it.
    pub fn affects_credentials(&self) -> bool {
        matches!(
            self,
            Field::JiraServer | Field::JiraEmail | Field::JiraApiToken | Field::JiraQuery
        )
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Field {
    type Err = WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.as_str() == s)
            .ok_or_else(|| WizardError::UnknownField(s.to_string()))
    }
}

/// Values of the profile form. Empty strings mean "unset".
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub jira_server: String,
    #[serde(default)]
    pub jira_email: String,
    #[serde(default)]
    pub jira_api_token: String,
    #[serde(default)]
    pub jira_query: String,
    #[serde(default)]
    pub project_key: String,
    #[serde(default)]
    pub lead_time_start_state: String,
    #[serde(default)]
    pub lead_time_end_state: String,
    #[serde(default)]
    pub cycle_time_start_state: String,
    #[serde(default)]
    pub cycle_time_end_state: String,
}

impl FormData {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::JiraServer => &self.jira_server,
            Field::JiraEmail => &self.jira_email,
            Field::JiraApiToken => &self.jira_api_token,
            Field::JiraQuery => &self.jira_query,
            Field::ProjectKey => &self.project_key,
            Field::LeadTimeStartState => &self.lead_time_start_state,
            Field::LeadTimeEndState => &self.lead_time_end_state,
            Field::CycleTimeStartState => &self.cycle_time_start_state,
            Field::CycleTimeEndState => &self.cycle_time_end_state,
        }
    }

    /// Set a field, returning whether the stored value changed.
    pub fn set(&mut self, field: Field, value: impl Into<String>) -> bool {
        let value = value.into();
        let slot = match field {
            Field::Name => &mut self.name,
            Field::JiraServer => &mut self.jira_server,
            Field::JiraEmail => &mut self.jira_email,
            Field::JiraApiToken => &mut self.jira_api_token,
            Field::JiraQuery => &mut self.jira_query,
            Field::ProjectKey => &mut self.project_key,
            Field::LeadTimeStartState => &mut self.lead_time_start_state,
            Field::LeadTimeEndState => &mut self.lead_time_end_state,
            Field::CycleTimeStartState => &mut self.cycle_time_start_state,
            Field::CycleTimeEndState => &mut self.cycle_time_end_state,
        };
        if *slot == value {
            return false;
        }
        *slot = value;
        true
    }
}

impl fmt::Debug for FormData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.jira_api_token.is_empty() {
            ""
        } else {
            "[REDACTED]"
        };
        f.debug_struct("FormData")
            .field("name", &self.name)
            .field("jira_server", &self.jira_server)
            .field("jira_email", &self.jira_email)
            .field("jira_api_token", &token)
            .field("jira_query", &self.jira_query)
            .field("project_key", &self.project_key)
            .field("lead_time_start_state", &self.lead_time_start_state)
            .field("lead_time_end_state", &self.lead_time_end_state)
            .field("cycle_time_start_state", &self.cycle_time_start_state)
            .field("cycle_time_end_state", &self.cycle_time_end_state)
            .finish()
    }
}

/// A Jira project as listed by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JiraProject {
    pub key: String,
    pub name: String,
}

impl JiraProject {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }
}
