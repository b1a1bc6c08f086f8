//! Asynchronous checks: name availability, credentials, and project listing.
//!
//! Each check issues a token synchronously when it is called, so the order of
//! calls (not the order in which futures are first polled) decides which
//! result wins.

use std::future::Future;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use regex::Regex;

use crate::error::WizardError;
use crate::remote::CredentialsRequest;
use crate::remote::jira::parse_server_url;
use crate::types::Step;

use super::errors::{StepError, StepErrorKind};
use super::tokens::ValidationToken;
use super::{Core, ProfileWizard};

/// Result of a name availability check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameCheck {
    /// The result was applied to the wizard
    Applied(bool),
    /// The service failed; availability is unknown
    Unknown,
    /// The name is empty, nothing was sent
    Skipped,
    /// A newer check or a name edit replaced this one
    Superseded,
}

/// Result of a credential check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialCheck {
    Valid,
    Invalid(StepError),
    /// A credential field changed or a newer check was issued
    Superseded,
}

impl CredentialCheck {
    pub fn is_valid(&self) -> bool {
        matches!(self, CredentialCheck::Valid)
    }
}

/// Result of a project fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectFetch {
    /// Projects were stored; holds how many
    Loaded(usize),
    Failed(StepError),
    Superseded,
    /// Credentials have not been validated
    NotReady,
}

pub(crate) type CredentialOutcome = Shared<BoxFuture<'static, CredentialCheck>>;

/// The credential check currently running, shared by coalesced callers
pub(crate) struct CredentialFlight {
    pub(crate) snapshot: CredentialsRequest,
    pub(crate) token: ValidationToken,
    pub(crate) outcome: CredentialOutcome,
}

enum NameIssue {
    Resolved(NameCheck),
    Pending(ValidationToken, String),
}

/// Clears `is_checking_name` when a pending name check is dropped unfinished.
struct PendingNameCheck {
    wizard: ProfileWizard,
    token: ValidationToken,
}

impl Drop for PendingNameCheck {
    fn drop(&mut self) {
        let token = self.token;
        self.wizard.update(|core| {
            if core.tokens.name.is_current(token) {
                core.state.is_checking_name = false;
            }
        });
    }
}

fn email_pattern() -> Regex {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex should be valid")
}

/// Local checks done before any request leaves the machine.
fn precheck_credentials(request: &CredentialsRequest) -> Result<(), StepError> {
    if request.server.is_empty() {
        return Err(StepError::validation("server URL is required"));
    }
    if let Err(e) = parse_server_url(&request.server) {
        return Err(StepError::validation(format!("invalid server URL: {e}")));
    }
    if request.email.is_empty() {
        return Err(StepError::validation("account email is required"));
    }
    if !email_pattern().is_match(&request.email) {
        return Err(StepError::validation(format!(
            "'{}' is not a valid email address",
            request.email
        )));
    }
    if request.api_token.trim().is_empty() {
        return Err(StepError::validation("API token is required"));
    }
    Ok(())
}

impl Core {
    fn owns_credential_flight(&self, token: ValidationToken) -> bool {
        self.credential_flight
            .as_ref()
            .is_some_and(|flight| flight.token == token)
    }
}

impl ProfileWizard {
    /// Check whether the current profile name is free.
    ///
    /// The name is captured and a token issued when this is called. The request
    /// waits for the debounce window first and is never sent if another check
    /// or a name edit happens meanwhile.
    pub fn check_name_availability(&self) -> impl Future<Output = NameCheck> + Send + 'static {
        let own_name = self
            .inner
            .initial
            .as_ref()
            .filter(|initial| initial.id.is_some())
            .map(|initial| initial.data.name.trim().to_string());

        let issued = self.update(|core| {
            let token = core.tokens.name.issue();
            let name = core.state.form.name.trim().to_string();

            if name.is_empty() {
                core.state.is_name_available = None;
                core.state.is_checking_name = false;
                return NameIssue::Resolved(NameCheck::Skipped);
            }
            if own_name.as_deref() == Some(name.as_str()) {
                core.state.is_name_available = Some(true);
                core.state.is_checking_name = false;
                return NameIssue::Resolved(NameCheck::Applied(true));
            }

            core.state.is_checking_name = true;
            NameIssue::Pending(token, name)
        });

        let pending = match &issued {
            NameIssue::Pending(token, _) => Some(PendingNameCheck {
                wizard: self.clone(),
                token: *token,
            }),
            NameIssue::Resolved(_) => None,
        };
        let wizard = self.clone();
        async move {
            let _pending = pending;
            let (token, name) = match issued {
                NameIssue::Resolved(check) => return check,
                NameIssue::Pending(token, name) => (token, name),
            };

            let debounce = wizard.inner.options.name_check_debounce;
            if !debounce.is_zero() {
                tokio::time::sleep(debounce).await;
                if !wizard.read(|core| core.tokens.name.is_current(token)) {
                    tracing::debug!("name check for '{name}' superseded before sending");
                    return NameCheck::Superseded;
                }
            }

            let result = wizard.inner.service.check_name_availability(&name).await;

            wizard.update(|core| {
                if !core.tokens.name.is_current(token) {
                    tracing::debug!("discarding stale name check for '{name}'");
                    return NameCheck::Superseded;
                }
                core.state.is_checking_name = false;
                match result {
                    Ok(available) => {
                        core.state.is_name_available = Some(available);
                        NameCheck::Applied(available)
                    }
                    Err(e) => {
                        tracing::warn!("name availability check failed: {e}");
                        core.state.is_name_available = None;
                        NameCheck::Unknown
                    }
                }
            })
        }
    }

    /// Verify the credential fields against the server.
    ///
    /// A call made while a check for the same values is in flight joins that
    /// check instead of sending another request. On success the project list
    /// is fetched before the returned future completes. Must be called from
    /// within a Tokio runtime: the check runs as its own task so dropping the
    /// returned future does not abandon it.
    pub fn check_credentials(&self) -> impl Future<Output = CredentialCheck> + Send + 'static {
        let issued: Result<CredentialOutcome, CredentialCheck> = self.update(|core| {
            let snapshot = CredentialsRequest::from_form(&core.state.form);

            if let Some(flight) = &core.credential_flight
                && flight.snapshot == snapshot
                && core.tokens.credentials.is_current(flight.token)
            {
                tracing::debug!("joining credential check already in flight");
                return Ok(flight.outcome.clone());
            }

            if let Err(error) = precheck_credentials(&snapshot) {
                core.state.credentials_valid = false;
                core.state.step_errors.set(Step::Credentials, error.clone());
                return Err(CredentialCheck::Invalid(error));
            }

            let token = core.tokens.credentials.issue();
            core.state.checking_credentials = true;

            let wizard = self.clone();
            let request = snapshot.clone();
            let task = tokio::spawn(async move { wizard.run_credential_check(token, request).await });
            let outcome = async move {
                task.await.unwrap_or_else(|e| {
                    tracing::warn!("credential check task failed: {e}");
                    CredentialCheck::Superseded
                })
            }
            .boxed()
            .shared();

            core.credential_flight = Some(CredentialFlight {
                snapshot,
                token,
                outcome: outcome.clone(),
            });
            Ok(outcome)
        });

        async move {
            match issued {
                Ok(outcome) => outcome.await,
                Err(rejected) => rejected,
            }
        }
    }

    async fn run_credential_check(
        &self,
        token: ValidationToken,
        request: CredentialsRequest,
    ) -> CredentialCheck {
        let result = self.inner.service.check_credentials(&request).await;

        let outcome = self.update(|core| {
            let owned = core.owns_credential_flight(token);
            if owned {
                core.state.checking_credentials = false;
            }

            if !core.tokens.credentials.is_current(token) {
                tracing::debug!("discarding stale credential check for {}", request.server);
                if owned {
                    core.credential_flight = None;
                }
                return CredentialCheck::Superseded;
            }

            match result {
                Ok(()) => {
                    core.state.credentials_valid = true;
                    core.state.step_errors.clear(Step::Credentials);
                    CredentialCheck::Valid
                }
                Err(e) => {
                    tracing::warn!("credential check against {} failed: {e}", request.server);
                    let error = StepError::from(&e);
                    core.state.credentials_valid = false;
                    core.state.step_errors.set(Step::Credentials, error.clone());
                    if owned {
                        core.credential_flight = None;
                    }
                    CredentialCheck::Invalid(error)
                }
            }
        });

        if !outcome.is_valid() {
            return outcome;
        }

        self.load_projects(&request).await;
        self.update(|core| {
            if core.owns_credential_flight(token) {
                core.credential_flight = None;
            }
            if core.tokens.credentials.is_current(token) {
                outcome
            } else {
                tracing::debug!(
                    "credentials for {} changed while loading projects",
                    request.server
                );
                CredentialCheck::Superseded
            }
        })
    }

    /// Fetch the project list again with the validated credentials.
    pub async fn refresh_projects(&self) -> ProjectFetch {
        let request = self.read(|core| {
            core.state
                .credentials_valid
                .then(|| CredentialsRequest::from_form(&core.state.form))
        });
        match request {
            Some(request) => self.load_projects(&request).await,
            None => ProjectFetch::NotReady,
        }
    }

    async fn load_projects(&self, request: &CredentialsRequest) -> ProjectFetch {
        let token = self.update(|core| {
            core.state.loading_projects = true;
            core.tokens.projects.issue()
        });

        let result = self.inner.service.fetch_projects(request).await;

        self.update(|core| {
            if !core.tokens.projects.is_current(token) {
                tracing::debug!("discarding stale project list for {}", request.server);
                return ProjectFetch::Superseded;
            }
            core.state.loading_projects = false;

            match result {
                Ok(projects) => {
                    let count = projects.len();
                    core.state.projects = projects;
                    if core
                        .state
                        .step_errors
                        .get(Step::Project)
                        .is_some_and(|e| e.kind != StepErrorKind::Validation)
                    {
                        core.state.step_errors.clear(Step::Project);
                    }
                    ProjectFetch::Loaded(count)
                }
                Err(e) => {
                    tracing::warn!("fetching projects from {} failed: {e}", request.server);
                    let error = project_fetch_error(&e);
                    core.state.projects.clear();
                    core.state.step_errors.set(Step::Project, error.clone());
                    ProjectFetch::Failed(error)
                }
            }
        })
    }
}

fn project_fetch_error(error: &WizardError) -> StepError {
    let base = StepError::from(error);
    StepError::new(base.kind, format!("could not load projects: {}", base.message))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(server: &str, email: &str, token: &str) -> CredentialsRequest {
        CredentialsRequest {
            server: server.to_string(),
            email: email.to_string(),
            api_token: token.to_string(),
            query: String::new(),
        }
    }

    #[test]
    fn test_precheck_accepts_complete_request() {
        assert!(precheck_credentials(&request("https://x.atlassian.net", "a@b.com", "tok")).is_ok());
    }

    #[test]
    fn test_precheck_reports_first_missing_field() {
        let err = precheck_credentials(&request("", "a@b.com", "tok")).unwrap_err();
        assert_eq!(err.message, "server URL is required");

        let err = precheck_credentials(&request("https://x.atlassian.net", "", "tok")).unwrap_err();
        assert_eq!(err.message, "account email is required");

        let err = precheck_credentials(&request("https://x.atlassian.net", "a@b.com", " ")).unwrap_err();
        assert_eq!(err.message, "API token is required");
        assert_eq!(err.kind, StepErrorKind::Validation);
    }

    #[test]
    fn test_precheck_rejects_malformed_values() {
        let err = precheck_credentials(&request("x.atlassian.net", "a@b.com", "tok")).unwrap_err();
        assert!(err.message.starts_with("invalid server URL"));

        let err = precheck_credentials(&request("https://x.atlassian.net", "not-an-email", "tok"))
            .unwrap_err();
        assert!(err.message.contains("not a valid email"));
    }

    #[test]
    fn test_project_fetch_error_keeps_kind() {
        let error = project_fetch_error(&WizardError::Network("connection refused".into()));
        assert_eq!(error.kind, StepErrorKind::Network);
        assert_eq!(
            error.message,
            "could not load projects: network error: connection refused"
        );
    }
}
