use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use jira_wizard::cli::{Cli, Commands, ConfigAction, ProfileAction};
use jira_wizard::commands::{
    cmd_config_get, cmd_config_set, cmd_config_show, cmd_profile_create, cmd_profile_edit,
    cmd_profile_ls, cmd_profile_projects, cmd_profile_show,
};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse();
    let output = cli.output();

    let result = match cli.command {
        Commands::Profile { action } => match action {
            ProfileAction::Ls => cmd_profile_ls(output),
            ProfileAction::Show { name } => cmd_profile_show(&name, output),
            ProfileAction::Create { name, fields } => {
                cmd_profile_create(&name, &fields, output).await
            }
            ProfileAction::Edit {
                profile,
                name,
                fields,
            } => cmd_profile_edit(&profile, name.as_deref(), &fields, output).await,
            ProfileAction::Projects { credentials } => {
                cmd_profile_projects(&credentials, output).await
            }
        },

        Commands::Config { action } => match action {
            ConfigAction::Show => cmd_config_show(output),
            ConfigAction::Set { key, value } => cmd_config_set(&key, &value, output),
            ConfigAction::Get { key } => cmd_config_get(&key, output),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
