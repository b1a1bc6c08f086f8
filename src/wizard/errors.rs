//! Per-step error store.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::WizardError;
use crate::types::Step;

/// Category of a step error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepErrorKind {
    /// Missing or malformed input the user can fix
    Validation,
    /// The server rejected the email/token pair
    InvalidCredentials,
    /// The server could not be reached or failed; retrying may help
    Network,
    /// Any other failure reported by the server
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepError {
    pub kind: StepErrorKind,
    pub message: String,
}

impl StepError {
    pub fn new(kind: StepErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StepErrorKind::Validation, message)
    }
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<&WizardError> for StepError {
    fn from(error: &WizardError) -> Self {
        let kind = match error {
            WizardError::InvalidCredentials(_) => StepErrorKind::InvalidCredentials,
            WizardError::InvalidQuery(_)
            | WizardError::InvalidInput(_)
            | WizardError::Url(_) => StepErrorKind::Validation,
            e if e.is_network() => StepErrorKind::Network,
            _ => StepErrorKind::Remote,
        };
        Self::new(kind, error.to_string())
    }
}

/// Last error of each step; at most one per step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepErrors {
    errors: BTreeMap<Step, StepError>,
}

impl StepErrors {
    pub fn get(&self, step: Step) -> Option<&StepError> {
        self.errors.get(&step)
    }

    /// Replace the error of `step`
    pub fn set(&mut self, step: Step, error: StepError) {
        self.errors.insert(step, error);
    }

    pub fn clear(&mut self, step: Step) {
        self.errors.remove(&step);
    }

    /// Clear the error of `step` only when it has the given kind
    pub fn clear_kind(&mut self, step: Step, kind: StepErrorKind) {
        if self.errors.get(&step).is_some_and(|e| e.kind == kind) {
            self.errors.remove(&step);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Step, &StepError)> {
        self.errors.iter().map(|(step, error)| (*step, error))
    }
}
