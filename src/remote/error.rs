//! Error mapping for Jira REST responses.
//!
//! Jira answers failures with a JSON body of the form
//! `{"errorMessages": [...], "errors": {"field": "message"}}`. This module
//! turns those bodies and transport failures into [`WizardError`]s that keep
//! invalid credentials, bad queries, and network trouble apart.

use std::fmt;

use serde::Deserialize;

use crate::error::WizardError;

/// A failed call against the Jira API.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code, absent for transport failures
    pub status: Option<reqwest::StatusCode>,
    /// Human-readable error message
    pub message: String,
    /// Whether the request never produced a response (DNS, connect, timeout)
    pub transport: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraErrorBody {
    #[serde(default)]
    error_messages: Vec<String>,
    #[serde(default)]
    errors: std::collections::BTreeMap<String, String>,
}

impl ApiError {
    /// Build an error from a non-success response.
    pub fn from_response(status: reqwest::StatusCode, body: &str) -> Self {
        Self {
            status: Some(status),
            message: describe_body(status, body),
            transport: false,
        }
    }

    /// Build an error from a request that failed before a response arrived.
    pub fn from_transport(error: reqwest::Error) -> Self {
        let transport = error.is_connect() || error.is_timeout() || error.is_request();
        Self {
            status: error.status(),
            message: error.to_string(),
            transport,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status
            .is_some_and(|s| s.as_u16() == 401 || s.as_u16() == 403)
    }

    pub fn is_bad_request(&self) -> bool {
        self.status.is_some_and(|s| s.as_u16() == 400)
    }

    pub fn is_transient(&self) -> bool {
        self.transport || self.status.is_some_and(|s| s.is_server_error())
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<ApiError> for WizardError {
    fn from(error: ApiError) -> Self {
        if error.is_unauthorized() {
            return WizardError::InvalidCredentials(error.message);
        }
        if error.is_transient() {
            return WizardError::Network(error.message);
        }
        WizardError::Api(format!("Jira API error: {}", error.message))
    }
}

fn describe_body(status: reqwest::StatusCode, body: &str) -> String {
    let status_text = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown")
    );

    let parsed: JiraErrorBody = serde_json::from_str(body).unwrap_or_default();
    let mut details: Vec<String> = parsed.error_messages;
    details.extend(
        parsed
            .errors
            .into_iter()
            .map(|(field, message)| format!("{field}: {message}")),
    );

    if details.is_empty() {
        status_text
    } else {
        format!("{status_text}: {}", details.join("; "))
    }
}
