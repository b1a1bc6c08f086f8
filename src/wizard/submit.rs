//! Submission controller.

use std::fmt;

use crate::remote::ProfilePayload;
use crate::types::Step;

use super::ProfileWizard;
use super::errors::StepError;

/// Why a submission was refused before reaching the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitBlock {
    MissingName,
    MissingProject,
    CredentialsNotValidated,
    NameUnavailable,
}

impl fmt::Display for SubmitBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitBlock::MissingName => write!(f, "enter a profile name"),
            SubmitBlock::MissingProject => write!(f, "select a project"),
            SubmitBlock::CredentialsNotValidated => {
                write!(f, "the Jira credentials have not been validated")
            }
            SubmitBlock::NameUnavailable => write!(f, "this profile name is already in use"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Saved under the returned name
    Saved(String),
    /// The service rejected the save; the message is also in `submit_error`
    Failed(String),
    Blocked(SubmitBlock),
    /// A save is already running; nothing was done
    InProgress,
    NotOnLastStep,
}

enum Admission {
    Proceed(ProfilePayload),
    Refused(SubmitOutcome),
}

impl ProfileWizard {
    /// Save the profile.
    ///
    /// Only acts on the last step and when no other save is running. The form
    /// and the current step are left untouched whatever the outcome.
    pub async fn handle_submit(&self) -> SubmitOutcome {
        let last_step = self.inner.steps.last().map(|d| d.step);

        let admission = self.update(|core| {
            let state = &mut core.state;
            if state.is_loading {
                return Admission::Refused(SubmitOutcome::InProgress);
            }
            if Some(state.current_step) != last_step {
                return Admission::Refused(SubmitOutcome::NotOnLastStep);
            }

            let block = if state.form.name.trim().is_empty() {
                Some(SubmitBlock::MissingName)
            } else if state.form.project_key.trim().is_empty() {
                state.step_errors.set(
                    Step::Project,
                    StepError::validation(SubmitBlock::MissingProject.to_string()),
                );
                Some(SubmitBlock::MissingProject)
            } else if !state.credentials_valid {
                Some(SubmitBlock::CredentialsNotValidated)
            } else if state.is_name_available == Some(false) {
                Some(SubmitBlock::NameUnavailable)
            } else {
                None
            };

            if let Some(block) = block {
                state.submit_error = Some(block.to_string());
                return Admission::Refused(SubmitOutcome::Blocked(block));
            }

            state.is_loading = true;
            state.submit_error = None;
            Admission::Proceed(ProfilePayload::from_form(&state.form))
        });

        let payload = match admission {
            Admission::Proceed(payload) => payload,
            Admission::Refused(outcome) => {
                tracing::debug!("submission refused: {outcome:?}");
                return outcome;
            }
        };

        let result = match self.profile_id() {
            Some(id) => self.inner.service.update_profile(id, &payload).await,
            None => self.inner.service.create_profile(&payload).await,
        };

        let outcome = self.update(|core| {
            core.state.is_loading = false;
            match result {
                Ok(name) => SubmitOutcome::Saved(name),
                Err(e) => {
                    tracing::warn!("saving profile '{}' failed: {e}", payload.name());
                    let message = e.to_string();
                    core.state.submit_error = Some(message.clone());
                    SubmitOutcome::Failed(message)
                }
            }
        });

        if let SubmitOutcome::Saved(name) = &outcome
            && let Some(on_saved) = &self.inner.on_saved
        {
            on_saved(name);
        }
        outcome
    }
}
