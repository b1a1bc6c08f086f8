//! Step sequencer and the validators of the built-in steps.

use async_trait::async_trait;

use crate::types::Step;

use super::errors::{StepError, StepErrorKind};
use super::{ProfileWizard, WizardState};

/// Decides whether the wizard may leave a step.
///
/// Validators record their own step errors on the wizard; the sequencer only
/// looks at the returned verdict.
#[async_trait]
pub trait StepValidator: Send + Sync {
    async fn validate(&self, wizard: &ProfileWizard) -> bool;

    /// Checked under the state lock at the moment the step is left. Returning
    /// `false` abandons the transition after a passed validation.
    fn still_holds(&self, _state: &WizardState) -> bool {
        true
    }
}

/// One entry of the ordered step list
pub struct StepDescriptor {
    pub step: Step,
    pub title: &'static str,
    pub validator: Box<dyn StepValidator>,
}

impl StepDescriptor {
    pub fn new(step: Step, title: &'static str, validator: impl StepValidator + 'static) -> Self {
        Self {
            step,
            title,
            validator: Box::new(validator),
        }
    }
}

/// Passes once the credentials were verified, running the check if needed.
pub struct CredentialsStep;

#[async_trait]
impl StepValidator for CredentialsStep {
    async fn validate(&self, wizard: &ProfileWizard) -> bool {
        if wizard.credentials_valid() {
            return true;
        }
        wizard.check_credentials().await.is_valid()
    }

    fn still_holds(&self, state: &WizardState) -> bool {
        state.credentials_valid
    }
}

/// Passes when a project is selected and, if a list was loaded, is part of it.
pub struct ProjectStep;

#[async_trait]
impl StepValidator for ProjectStep {
    async fn validate(&self, wizard: &ProfileWizard) -> bool {
        wizard.update(|core| {
            let key = core.state.form.project_key.trim().to_string();
            let projects = &core.state.projects;

            let error = if key.is_empty() {
                Some(StepError::validation("select a project"))
            } else if !projects.is_empty() && !projects.iter().any(|p| p.key == key) {
                Some(StepError::validation(format!(
                    "project '{key}' is not available with these credentials"
                )))
            } else {
                None
            };

            match error {
                Some(error) => {
                    core.state.step_errors.set(Step::Project, error);
                    false
                }
                None => {
                    core.state
                        .step_errors
                        .clear_kind(Step::Project, StepErrorKind::Validation);
                    true
                }
            }
        })
    }
}

/// Credentials first, then project selection
pub fn default_steps() -> Vec<StepDescriptor> {
    vec![
        StepDescriptor::new(Step::Credentials, "Jira credentials", CredentialsStep),
        StepDescriptor::new(Step::Project, "Project", ProjectStep),
    ]
}

impl ProfileWizard {
    fn step_index(&self, step: Step) -> usize {
        self.inner
            .steps
            .iter()
            .position(|d| d.step == step)
            .unwrap_or(0)
    }

    pub fn is_first_step(&self) -> bool {
        self.step_index(self.current_step()) == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.step_index(self.current_step()) + 1 == self.inner.steps.len()
    }

    /// Title of the current step
    pub fn current_step_title(&self) -> &'static str {
        self.inner.steps[self.step_index(self.current_step())].title
    }

    /// Validate the current step and move to the next one.
    ///
    /// Returns `true` when the step passed validation. On the last step the
    /// pointer stays where it is. If the step changed while validation was
    /// pending, or the validated fields were edited, the transition is
    /// abandoned and `false` is returned.
    pub async fn go_to_next_step(&self) -> bool {
        let from = self.current_step();
        let index = self.step_index(from);

        if !self.inner.steps[index].validator.validate(self).await {
            tracing::debug!("step '{from}' did not pass validation");
            return false;
        }

        let next = self.inner.steps.get(index + 1).map(|d| d.step);
        self.update(|core| {
            if core.state.current_step != from {
                tracing::debug!("abandoning transition from '{from}', step changed meanwhile");
                return false;
            }
            if !self.inner.steps[index].validator.still_holds(&core.state) {
                tracing::debug!("abandoning transition from '{from}', form changed meanwhile");
                return false;
            }
            if let Some(next) = next {
                core.state.current_step = next;
            }
            true
        })
    }

    /// Go back one step. Errors recorded on the step being left are kept.
    pub fn go_to_previous_step(&self) {
        self.update(|core| {
            let index = self
                .inner
                .steps
                .iter()
                .position(|d| d.step == core.state.current_step)
                .unwrap_or(0);
            if index > 0 {
                core.state.current_step = self.inner.steps[index - 1].step;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::{Result, WizardError};
    use crate::remote::{CredentialsRequest, ProfilePayload, ProfileService};
    use crate::types::{Field, JiraProject};

    struct OfflineService;

    #[async_trait]
    impl ProfileService for OfflineService {
        async fn check_name_availability(&self, _name: &str) -> Result<bool> {
            Ok(true)
        }

        async fn check_credentials(&self, _request: &CredentialsRequest) -> Result<()> {
            Err(WizardError::Network("offline".into()))
        }

        async fn fetch_projects(&self, _request: &CredentialsRequest) -> Result<Vec<JiraProject>> {
            Ok(Vec::new())
        }

        async fn create_profile(&self, payload: &ProfilePayload) -> Result<String> {
            Ok(payload.name().to_string())
        }

        async fn update_profile(&self, _id: &str, payload: &ProfilePayload) -> Result<String> {
            Ok(payload.name().to_string())
        }
    }

    struct AlwaysPass;

    #[async_trait]
    impl StepValidator for AlwaysPass {
        async fn validate(&self, _wizard: &ProfileWizard) -> bool {
            true
        }
    }

    fn wizard() -> ProfileWizard {
        ProfileWizard::new(Arc::new(OfflineService))
    }

    #[test]
    fn test_starts_on_first_step() {
        let wizard = wizard();
        assert_eq!(wizard.current_step(), Step::Credentials);
        assert!(wizard.is_first_step());
        assert!(!wizard.is_last_step());
        assert_eq!(wizard.current_step_title(), "Jira credentials");
    }

    #[test]
    fn test_previous_on_first_step_stays() {
        let wizard = wizard();
        wizard.go_to_previous_step();
        assert_eq!(wizard.current_step(), Step::Credentials);
    }

    #[tokio::test]
    async fn test_custom_steps_drive_sequence() {
        let wizard = ProfileWizard::builder(Arc::new(OfflineService))
            .steps(vec![
                StepDescriptor::new(Step::Credentials, "Login", AlwaysPass),
                StepDescriptor::new(Step::Project, "Project", ProjectStep),
            ])
            .build();

        assert!(wizard.go_to_next_step().await);
        assert_eq!(wizard.current_step(), Step::Project);
        assert!(wizard.is_last_step());

        wizard.go_to_previous_step();
        assert_eq!(wizard.current_step(), Step::Credentials);
    }

    #[tokio::test]
    async fn test_project_step_requires_key() {
        let wizard = ProfileWizard::builder(Arc::new(OfflineService))
            .steps(vec![
                StepDescriptor::new(Step::Credentials, "Login", AlwaysPass),
                StepDescriptor::new(Step::Project, "Project", ProjectStep),
            ])
            .build();
        wizard.go_to_next_step().await;

        assert!(!wizard.go_to_next_step().await);
        let error = wizard.step_error(Step::Project).unwrap();
        assert_eq!(error.message, "select a project");

        wizard.update_field(Field::ProjectKey, "OPS");
        assert!(wizard.step_error(Step::Project).is_none());
        assert!(wizard.go_to_next_step().await);
        assert_eq!(wizard.current_step(), Step::Project);
    }

    #[tokio::test]
    async fn test_credentials_step_blocks_on_failed_check() {
        let wizard = wizard();
        wizard.update_field(Field::JiraServer, "https://acme.atlassian.net");
        wizard.update_field(Field::JiraEmail, "dev@acme.io");
        wizard.update_field(Field::JiraApiToken, "tok");

        assert!(!wizard.go_to_next_step().await);
        assert_eq!(wizard.current_step(), Step::Credentials);
        let error = wizard.step_error(Step::Credentials).unwrap();
        assert_eq!(error.kind, StepErrorKind::Network);
    }
}
