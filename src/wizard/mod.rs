//! Form-workflow engine for creating and editing Jira integration profiles.
//!
//! A [`ProfileWizard`] owns the form values, the per-step errors, and the
//! results of the remote checks. It walks the user through an ordered list of
//! steps ([`StepDescriptor`]), validating each before moving on, and finally
//! submits the profile through a [`ProfileService`].
//!
//! Remote checks may overlap. Every check kind carries its own issue counter
//! and only the result of the most recently issued call is applied; older
//! results are dropped silently. All state lives behind one lock that is never
//! held across an `.await`, and every change is published to subscribers as a
//! [`WizardState`] snapshot.

mod errors;
mod steps;
mod submit;
mod tokens;
mod validation;

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::config::Config;
use crate::remote::ProfileService;
use crate::types::{Field, FormData, JiraProject, Step};

pub use errors::{StepError, StepErrorKind, StepErrors};
pub use steps::{CredentialsStep, ProjectStep, StepDescriptor, StepValidator, default_steps};
pub use submit::{SubmitBlock, SubmitOutcome};
pub use tokens::ValidationToken;
pub use validation::{CredentialCheck, NameCheck, ProjectFetch};

use tokens::IssueTokens;
use validation::CredentialFlight;

/// Default idle window before a profile name is checked remotely
pub const DEFAULT_NAME_CHECK_DEBOUNCE: Duration = Duration::from_millis(300);

/// Values used to seed the wizard.
///
/// With an `id` the wizard edits that profile (saving updates it, and its
/// original name is always available); without one it only pre-fills a new
/// profile.
#[derive(Debug, Clone, Default)]
pub struct InitialConfig {
    pub id: Option<String>,
    pub data: FormData,
}

impl InitialConfig {
    /// Edit the saved profile `id`
    pub fn edit(id: impl Into<String>, data: FormData) -> Self {
        Self {
            id: Some(id.into()),
            data,
        }
    }

    /// Pre-fill a new profile
    pub fn template(data: FormData) -> Self {
        Self { id: None, data }
    }
}

/// Tunables of the wizard
#[derive(Debug, Clone)]
pub struct WizardOptions {
    /// Idle window for name availability checks; zero checks immediately
    pub name_check_debounce: Duration,
}

impl Default for WizardOptions {
    fn default() -> Self {
        Self {
            name_check_debounce: DEFAULT_NAME_CHECK_DEBOUNCE,
        }
    }
}

impl WizardOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            name_check_debounce: config.name_check_debounce(),
        }
    }
}

/// Everything a renderer needs to draw the wizard
#[derive(Debug, Clone, PartialEq)]
pub struct WizardState {
    pub form: FormData,
    pub current_step: Step,
    pub step_errors: StepErrors,
    /// True only after the latest credential check succeeded and no
    /// credential field changed since
    pub credentials_valid: bool,
    pub checking_credentials: bool,
    /// Projects offered on the project step, in server order
    pub projects: Vec<JiraProject>,
    pub loading_projects: bool,
    /// `None` until a name check completes
    pub is_name_available: Option<bool>,
    pub is_checking_name: bool,
    /// A save is in flight
    pub is_loading: bool,
    pub submit_error: Option<String>,
}

impl WizardState {
    fn new(form: FormData, first_step: Step) -> Self {
        Self {
            form,
            current_step: first_step,
            step_errors: StepErrors::default(),
            credentials_valid: false,
            checking_credentials: false,
            projects: Vec::new(),
            loading_projects: false,
            is_name_available: None,
            is_checking_name: false,
            is_loading: false,
            submit_error: None,
        }
    }
}

/// Callback invoked with the saved profile name
pub type SavedCallback = Box<dyn Fn(&str) + Send + Sync>;

struct Core {
    state: WizardState,
    tokens: IssueTokens,
    credential_flight: Option<CredentialFlight>,
}

impl Core {
    /// Field store write: set one field and drop whatever depended on it.
    fn apply_field(&mut self, field: Field, value: String) {
        if !self.state.form.set(field, value) {
            return;
        }

        if field.affects_credentials() {
            self.state.credentials_valid = false;
            self.state.projects.clear();
            self.state.loading_projects = false;
            self.tokens.credentials.invalidate();
            self.tokens.projects.invalidate();
        }

        match field {
            Field::Name => {
                self.state.is_name_available = None;
                self.state.is_checking_name = false;
                self.tokens.name.invalidate();
            }
            Field::ProjectKey if !self.state.form.project_key.trim().is_empty() => {
                self.state
                    .step_errors
                    .clear_kind(Step::Project, StepErrorKind::Validation);
            }
            _ => {}
        }
    }
}

struct Inner {
    service: Arc<dyn ProfileService>,
    steps: Vec<StepDescriptor>,
    options: WizardOptions,
    initial: Option<InitialConfig>,
    on_saved: Option<SavedCallback>,
    core: Mutex<Core>,
    notifier: watch::Sender<WizardState>,
}

/// Handle to one wizard instance.
///
/// Cloning is cheap and every clone drives the same wizard, so futures
/// returned by the checks can be spawned.
#[derive(Clone)]
pub struct ProfileWizard {
    inner: Arc<Inner>,
}

/// Builder for [`ProfileWizard`]
pub struct WizardBuilder {
    service: Arc<dyn ProfileService>,
    steps: Option<Vec<StepDescriptor>>,
    options: WizardOptions,
    initial: Option<InitialConfig>,
    on_saved: Option<SavedCallback>,
}

impl WizardBuilder {
    /// Seed the form, entering edit mode when the config has an id
    pub fn initial_config(mut self, initial: InitialConfig) -> Self {
        self.initial = Some(initial);
        self
    }

    pub fn options(mut self, options: WizardOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the default step list. An empty list keeps the defaults.
    pub fn steps(mut self, steps: Vec<StepDescriptor>) -> Self {
        self.steps = Some(steps);
        self
    }

    /// Called with the saved name after a successful submission
    pub fn on_configuration_saved(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_saved = Some(Box::new(callback));
        self
    }

    pub fn build(self) -> ProfileWizard {
        let steps = match self.steps {
            Some(steps) if !steps.is_empty() => steps,
            _ => default_steps(),
        };
        let form = self
            .initial
            .as_ref()
            .map(|initial| initial.data.clone())
            .unwrap_or_default();
        let state = WizardState::new(form, steps[0].step);
        let (notifier, _) = watch::channel(state.clone());

        ProfileWizard {
            inner: Arc::new(Inner {
                service: self.service,
                steps,
                options: self.options,
                initial: self.initial,
                on_saved: self.on_saved,
                core: Mutex::new(Core {
                    state,
                    tokens: IssueTokens::default(),
                    credential_flight: None,
                }),
                notifier,
            }),
        }
    }
}

impl ProfileWizard {
    pub fn builder(service: Arc<dyn ProfileService>) -> WizardBuilder {
        WizardBuilder {
            service,
            steps: None,
            options: WizardOptions::default(),
            initial: None,
            on_saved: None,
        }
    }

    /// Wizard for a new profile with default options
    pub fn new(service: Arc<dyn ProfileService>) -> Self {
        Self::builder(service).build()
    }

    fn read<R>(&self, f: impl FnOnce(&Core) -> R) -> R {
        f(&self.inner.core.lock())
    }

    /// Mutate the state and publish the new snapshot if anything visible changed.
    fn update<R>(&self, f: impl FnOnce(&mut Core) -> R) -> R {
        let mut core = self.inner.core.lock();
        let result = f(&mut core);
        self.inner.notifier.send_if_modified(|published| {
            if *published == core.state {
                false
            } else {
                *published = core.state.clone();
                true
            }
        });
        result
    }

    /// Receive a snapshot after every visible change
    pub fn subscribe(&self) -> watch::Receiver<WizardState> {
        self.inner.notifier.subscribe()
    }

    pub fn snapshot(&self) -> WizardState {
        self.read(|core| core.state.clone())
    }

    /// Set one form field. Never triggers a remote call.
    pub fn update_field(&self, field: Field, value: impl Into<String>) {
        let value = value.into();
        self.update(|core| core.apply_field(field, value));
    }

    pub fn form(&self) -> FormData {
        self.read(|core| core.state.form.clone())
    }

    pub fn field(&self, field: Field) -> String {
        self.read(|core| core.state.form.get(field).to_string())
    }

    pub fn is_edit_mode(&self) -> bool {
        self.profile_id().is_some()
    }

    /// Identifier of the profile being edited
    pub fn profile_id(&self) -> Option<&str> {
        self.inner.initial.as_ref().and_then(|i| i.id.as_deref())
    }

    pub fn current_step(&self) -> Step {
        self.read(|core| core.state.current_step)
    }

    pub fn steps(&self) -> impl Iterator<Item = Step> + '_ {
        self.inner.steps.iter().map(|d| d.step)
    }

    pub fn credentials_valid(&self) -> bool {
        self.read(|core| core.state.credentials_valid)
    }

    pub fn checking_credentials(&self) -> bool {
        self.read(|core| core.state.checking_credentials)
    }

    pub fn projects(&self) -> Vec<JiraProject> {
        self.read(|core| core.state.projects.clone())
    }

    pub fn loading_projects(&self) -> bool {
        self.read(|core| core.state.loading_projects)
    }

    pub fn is_name_available(&self) -> Option<bool> {
        self.read(|core| core.state.is_name_available)
    }

    pub fn is_checking_name(&self) -> bool {
        self.read(|core| core.state.is_checking_name)
    }

    pub fn is_loading(&self) -> bool {
        self.read(|core| core.state.is_loading)
    }

    pub fn step_error(&self, step: Step) -> Option<StepError> {
        self.read(|core| core.state.step_errors.get(step).cloned())
    }

    pub fn submit_error(&self) -> Option<String> {
        self.read(|core| core.state.submit_error.clone())
    }
}
