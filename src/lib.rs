pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod paths;
pub mod profile;
pub mod remote;
pub mod types;
pub mod utils;
pub mod wizard;

pub use config::Config;
pub use error::{Result, WizardError};
pub use profile::{LocalProfileService, ProfileStore, StoredProfile};
pub use remote::{CredentialsRequest, JiraClient, ProfilePayload, ProfileService};
pub use types::{Field, FormData, JiraProject, Step};
pub use wizard::{
    CredentialCheck, InitialConfig, NameCheck, ProfileWizard, ProjectFetch, StepError,
    StepErrorKind, SubmitBlock, SubmitOutcome, WizardOptions, WizardState,
};
