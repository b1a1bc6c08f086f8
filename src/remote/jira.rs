//! Jira Cloud REST client (API v3) used to verify credentials and list projects.
//!
//! Requests authenticate with HTTP basic auth (account email + API token).
//! The token is held in a [`SecretBox`] and only exposed while building the
//! request, so it never ends up in `Debug` output or logs.

use std::time::Duration;

use reqwest::Client;
use reqwest::header;
use secrecy::{ExposeSecret, SecretBox};
use serde::Deserialize;
use url::Url;

use crate::error::{Result, WizardError};
use crate::types::JiraProject;

use super::{ApiError, CredentialsRequest};

const API_PREFIX: &str = "rest/api/3/";
const PROJECT_PAGE_SIZE: usize = 50;

/// Parse a Jira server URL, requiring an `http(s)` scheme and a host.
///
/// The returned URL always ends with `/` so API paths join under it, which
/// keeps context paths such as `https://host/jira/` intact.
pub fn parse_server_url(server: &str) -> Result<Url> {
    let mut url = Url::parse(server.trim())?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(WizardError::InvalidInput(format!(
            "server URL must use http or https, got '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(WizardError::InvalidInput(
            "server URL has no host".to_string(),
        ));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectPage {
    #[serde(default)]
    values: Vec<ProjectEntry>,
    #[serde(default)]
    is_last: Option<bool>,
    #[serde(default)]
    total: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ProjectEntry {
    key: String,
    name: String,
}

/// Client bound to one server and one set of credentials
pub struct JiraClient {
    client: Client,
    base_url: Url,
    email: String,
    api_token: SecretBox<String>,
}

impl JiraClient {
    /// Create a client for the credentials in `request`.
    ///
    /// `timeout` bounds each request; connecting is bounded by the same value.
    pub fn new(request: &CredentialsRequest, timeout: Duration) -> Result<Self> {
        let base_url = parse_server_url(&request.server)?;

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            email: request.email.clone(),
            api_token: SecretBox::new(Box::new(request.api_token.clone())),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(API_PREFIX)?.join(path)?)
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<reqwest::Response, ApiError> {
        let url = self
            .endpoint(path)
            .map_err(|e| ApiError {
                status: None,
                message: e.to_string(),
                transport: false,
            })?;

        let response = self
            .client
            .get(url)
            .basic_auth(&self.email, Some(self.api_token.expose_secret()))
            .header(
                header::ACCEPT,
                header::HeaderValue::from_static("application/json"),
            )
            .query(query)
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_response(status, &body));
        }

        Ok(response)
    }

    /// Verify that the server accepts the email/token pair.
    pub async fn verify_credentials(&self) -> Result<()> {
        self.get("myself", &[]).await?;
        tracing::debug!("Jira accepted credentials for {}", self.email);
        Ok(())
    }

    /// Ask the server to run `jql` without returning issues.
    pub async fn validate_query(&self, jql: &str) -> Result<()> {
        match self
            .get(
                "search/jql",
                &[("jql", jql.to_string()), ("maxResults", "0".to_string())],
            )
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.is_bad_request() => Err(WizardError::InvalidQuery(e.message)),
            Err(e) => Err(e.into()),
        }
    }

    /// List every project visible to the account, in server order.
    pub async fn list_projects(&self) -> Result<Vec<JiraProject>> {
        let mut projects = Vec::new();
        let mut start_at = 0usize;

        loop {
            let response = self
                .get(
                    "project/search",
                    &[
                        ("startAt", start_at.to_string()),
                        ("maxResults", PROJECT_PAGE_SIZE.to_string()),
                    ],
                )
                .await?;
            let page: ProjectPage = response.json().await?;

            let fetched = page.values.len();
            projects.extend(
                page.values
                    .into_iter()
                    .map(|entry| JiraProject::new(entry.key, entry.name)),
            );
            start_at += fetched;

            let done = match (page.is_last, page.total) {
                (Some(is_last), _) => is_last,
                (None, Some(total)) => start_at >= total,
                (None, None) => fetched < PROJECT_PAGE_SIZE,
            };
            if done || fetched == 0 {
                break;
            }
        }

        tracing::debug!("fetched {} Jira projects", projects.len());
        Ok(projects)
    }
}
