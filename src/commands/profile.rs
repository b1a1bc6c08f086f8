//! Profile commands.
//!
//! `create` and `edit` drive a [`ProfileWizard`] non-interactively: the flags
//! fill the form, then the wizard checks the name, validates the credentials,
//! loads the projects, validates the selected project, and submits.

use std::sync::Arc;

use owo_colors::OwoColorize;
use serde_json::{Value, json};

use super::CommandOutput;
use crate::cli::{CredentialArgs, OutputOptions, ProfileFields};
use crate::config::Config;
use crate::error::{Result, WizardError};
use crate::profile::{LocalProfileService, ProfileStore, StoredProfile};
use crate::types::{Field, FormData, Step};
use crate::utils::mask_sensitive_value;
use crate::wizard::{
    CredentialCheck, InitialConfig, NameCheck, ProfileWizard, SubmitOutcome, WizardOptions,
};

fn optional(value: &str) -> Value {
    if value.is_empty() {
        Value::Null
    } else {
        json!(value)
    }
}

fn profile_json(profile: &StoredProfile) -> Value {
    let data = &profile.data;
    json!({
        "id": profile.id,
        "name": data.name,
        "jira_server": optional(&data.jira_server),
        "jira_email": optional(&data.jira_email),
        "jira_api_token": (!data.jira_api_token.is_empty())
            .then(|| mask_sensitive_value(&data.jira_api_token)),
        "jira_query": optional(&data.jira_query),
        "project_key": optional(&data.project_key),
        "lead_time_start_state": optional(&data.lead_time_start_state),
        "lead_time_end_state": optional(&data.lead_time_end_state),
        "cycle_time_start_state": optional(&data.cycle_time_start_state),
        "cycle_time_end_state": optional(&data.cycle_time_end_state),
        "created_at": profile.created_at.to_string(),
        "updated_at": profile.updated_at.to_string(),
    })
}

/// List saved profiles
pub fn cmd_profile_ls(output: OutputOptions) -> Result<()> {
    let profiles = ProfileStore::open_default().load()?;

    let json_output = Value::Array(profiles.iter().map(profile_json).collect());
    let text_output = if profiles.is_empty() {
        "No profiles".dimmed().to_string()
    } else {
        profiles
            .iter()
            .map(|p| {
                format!(
                    "{:24} {} [{}]",
                    p.name().cyan(),
                    p.data.jira_server,
                    p.data.project_key
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output)
}

/// Show one profile. The API token is masked.
pub fn cmd_profile_show(name: &str, output: OutputOptions) -> Result<()> {
    let profile = ProfileStore::open_default()
        .find_by_name(name)?
        .ok_or_else(|| WizardError::ProfileNotFound(name.to_string()))?;

    let mut text_output = format!("{}\n", profile.name().cyan().bold());
    text_output.push_str(&format!("{}\n", format!("id: {}", profile.id).dimmed()));
    for field in Field::ALL.into_iter().skip(1) {
        let value = profile.data.get(field);
        let shown = match field {
            Field::JiraApiToken if !value.is_empty() => mask_sensitive_value(value),
            _ if value.is_empty() => "-".dimmed().to_string(),
            _ => value.to_string(),
        };
        text_output.push_str(&format!("  {}: {}\n", field, shown));
    }
    text_output.push_str(&format!(
        "{}",
        format!("updated {}", profile.updated_at).dimmed()
    ));

    CommandOutput::new(profile_json(&profile))
        .with_text(text_output)
        .print(output)
}

/// Credential fields from flags, falling back to the configured defaults
fn credential_form(credentials: &CredentialArgs, config: &Config) -> FormData {
    let mut form = FormData::default();
    let values = [
        (
            Field::JiraServer,
            credentials
                .server
                .clone()
                .or_else(|| config.default_server.clone()),
        ),
        (
            Field::JiraEmail,
            credentials
                .email
                .clone()
                .or_else(|| config.default_email.clone()),
        ),
        (
            Field::JiraApiToken,
            credentials.token.clone().or_else(|| config.api_token()),
        ),
    ];
    for (field, value) in values {
        if let Some(value) = value {
            form.set(field, value);
        }
    }
    form
}

/// Copy every given flag into the wizard form
fn apply_fields(wizard: &ProfileWizard, fields: &ProfileFields) {
    let values = [
        (Field::JiraServer, &fields.credentials.server),
        (Field::JiraEmail, &fields.credentials.email),
        (Field::JiraApiToken, &fields.credentials.token),
        (Field::JiraQuery, &fields.query),
        (Field::ProjectKey, &fields.project),
        (Field::LeadTimeStartState, &fields.lead_time_start),
        (Field::LeadTimeEndState, &fields.lead_time_end),
        (Field::CycleTimeStartState, &fields.cycle_time_start),
        (Field::CycleTimeEndState, &fields.cycle_time_end),
    ];
    for (field, value) in values {
        if let Some(value) = value {
            wizard.update_field(field, value.as_str());
        }
    }
}

fn step_failure(wizard: &ProfileWizard, step: Step) -> WizardError {
    match wizard.step_error(step) {
        Some(error) => WizardError::Other(format!("{step} step: {}", error.message)),
        None => WizardError::Other(format!("{step} step did not pass validation")),
    }
}

/// Walk the wizard from the first step to submission.
async fn run_wizard(wizard: &ProfileWizard) -> Result<String> {
    if wizard.check_name_availability().await == NameCheck::Applied(false) {
        return Err(WizardError::NameTaken(
            wizard.field(Field::Name).trim().to_string(),
        ));
    }

    if !wizard.go_to_next_step().await {
        return Err(step_failure(wizard, Step::Credentials));
    }

    if wizard.field(Field::ProjectKey).trim().is_empty() {
        if let Some(error) = wizard.step_error(Step::Project) {
            return Err(WizardError::Other(error.message));
        }
        let keys: Vec<String> = wizard.projects().into_iter().map(|p| p.key).collect();
        return Err(WizardError::InvalidInput(if keys.is_empty() {
            "no projects are visible with these credentials".to_string()
        } else {
            format!("select a project with --project (available: {})", keys.join(", "))
        }));
    }

    if !wizard.go_to_next_step().await {
        return Err(step_failure(wizard, Step::Project));
    }

    match wizard.handle_submit().await {
        SubmitOutcome::Saved(name) => Ok(name),
        SubmitOutcome::Failed(message) => Err(WizardError::Other(message)),
        SubmitOutcome::Blocked(block) => Err(WizardError::InvalidInput(block.to_string())),
        other => Err(WizardError::Other(format!(
            "profile was not saved: {other:?}"
        ))),
    }
}

fn saved_output(action: &str, wizard: &ProfileWizard, name: &str) -> CommandOutput {
    let project_key = wizard.field(Field::ProjectKey);
    let verb = if action == "profile_created" {
        "Created"
    } else {
        "Updated"
    };
    CommandOutput::new(json!({
        "action": action,
        "name": name,
        "project_key": project_key,
        "success": true,
    }))
    .with_text(format!(
        "{} profile {} ({})",
        verb,
        name.cyan(),
        project_key
    ))
}

/// Create a profile through the wizard
pub async fn cmd_profile_create(
    name: &str,
    fields: &ProfileFields,
    output: OutputOptions,
) -> Result<()> {
    let config = Config::load()?;
    let service = Arc::new(LocalProfileService::from_config(&config));

    let mut form = credential_form(&fields.credentials, &config);
    form.set(Field::Name, name);

    let wizard = ProfileWizard::builder(service)
        .options(WizardOptions::from_config(&config))
        .initial_config(InitialConfig::template(form))
        .on_configuration_saved(|name| tracing::debug!("configuration '{name}' saved"))
        .build();
    apply_fields(&wizard, fields);

    let saved = run_wizard(&wizard).await?;
    saved_output("profile_created", &wizard, &saved).print(output)
}

/// Edit a saved profile through the wizard
pub async fn cmd_profile_edit(
    profile_name: &str,
    rename: Option<&str>,
    fields: &ProfileFields,
    output: OutputOptions,
) -> Result<()> {
    let config = Config::load()?;
    let store = ProfileStore::open_default();
    let profile = store
        .find_by_name(profile_name)?
        .ok_or_else(|| WizardError::ProfileNotFound(profile_name.to_string()))?;

    let service = Arc::new(
        LocalProfileService::new(store, config.remote_timeout())
            .with_current_profile(profile.id.clone()),
    );
    let wizard = ProfileWizard::builder(service)
        .options(WizardOptions::from_config(&config))
        .initial_config(profile.initial_config())
        .build();

    if let Some(name) = rename {
        wizard.update_field(Field::Name, name);
    }
    apply_fields(&wizard, fields);

    let saved = run_wizard(&wizard).await?;
    saved_output("profile_updated", &wizard, &saved).print(output)
}

/// List the projects visible to a set of credentials
pub async fn cmd_profile_projects(credentials: &CredentialArgs, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let service = Arc::new(LocalProfileService::from_config(&config));
    let wizard = ProfileWizard::builder(service)
        .initial_config(InitialConfig::template(credential_form(credentials, &config)))
        .build();

    match wizard.check_credentials().await {
        CredentialCheck::Valid => {}
        CredentialCheck::Invalid(error) => return Err(WizardError::Other(error.message)),
        CredentialCheck::Superseded => {
            return Err(WizardError::Other(
                "credential check was interrupted".to_string(),
            ));
        }
    }
    if let Some(error) = wizard.step_error(Step::Project) {
        return Err(WizardError::Other(error.message));
    }

    let projects = wizard.projects();
    let json_output = json!(
        projects
            .iter()
            .map(|p| json!({ "key": p.key, "name": p.name }))
            .collect::<Vec<_>>()
    );
    let text_output = if projects.is_empty() {
        "No projects".dimmed().to_string()
    } else {
        projects
            .iter()
            .map(|p| format!("{:10} {}", p.key.cyan(), p.name))
            .collect::<Vec<_>>()
            .join("\n")
    };

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output)
}
