mod config;
mod profile;

pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use profile::{
    cmd_profile_create, cmd_profile_edit, cmd_profile_ls, cmd_profile_projects, cmd_profile_show,
};

use serde_json::Value;

use crate::cli::OutputOptions;
use crate::error::Result;

/// Result of a command, printable as text or JSON
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn print(self, output: OutputOptions) -> Result<()> {
        match (output.json, self.text) {
            (false, Some(text)) => println!("{text}"),
            _ => println!("{}", serde_json::to_string_pretty(&self.json)?),
        }
        Ok(())
    }
}
