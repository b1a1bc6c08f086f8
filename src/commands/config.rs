//! Configuration commands.
//!
//! - `config show`: Display current configuration
//! - `config get`: Print one value
//! - `config set`: Set a configuration value

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::error::{Result, WizardError};
use crate::remote::jira::parse_server_url;
use crate::utils::mask_sensitive_value;

const VALID_KEYS: &str =
    "default_server, default_email, auth.api_token, name_check_debounce_ms, remote_timeout";

fn unknown_key(key: &str) -> WizardError {
    WizardError::Config(format!("unknown config key '{key}'. Valid keys: {VALID_KEYS}"))
}

fn parse_number(key: &str, value: &str) -> Result<u64> {
    value.parse::<u64>().map_err(|_| {
        WizardError::Config(format!(
            "invalid value '{value}' for {key}. Expected a non-negative integer"
        ))
    })
}

fn not_configured() -> String {
    "not configured".dimmed().to_string()
}

/// Show current configuration
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let token = config.api_token();

    let json_output = json!({
        "default_server": config.default_server,
        "default_email": config.default_email,
        "auth": {
            "api_token_configured": token.is_some(),
        },
        "name_check_debounce_ms": config.name_check_debounce_ms,
        "remote_timeout": config.remote_timeout,
        "config_file": Config::config_path().to_string_lossy(),
    });

    let mut text_output = String::new();
    text_output.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));

    text_output.push_str(&format!(
        "{}: {}\n",
        "default_server".cyan(),
        config.default_server.clone().unwrap_or_else(not_configured)
    ));
    text_output.push_str(&format!(
        "{}: {}\n",
        "default_email".cyan(),
        config.default_email.clone().unwrap_or_else(not_configured)
    ));

    // Never print the token itself
    let token_status = match &token {
        Some(token) => format!("{} ({})", "configured".green(), mask_sensitive_value(token)),
        None => not_configured(),
    };
    text_output.push_str(&format!("{}:\n", "auth".cyan()));
    text_output.push_str(&format!("  api_token: {token_status}\n"));

    text_output.push_str(&format!(
        "{}: {}\n",
        "name_check_debounce_ms".cyan(),
        config.name_check_debounce_ms
    ));
    text_output.push_str(&format!(
        "{}: {}\n\n",
        "remote_timeout".cyan(),
        config.remote_timeout
    ));
    text_output.push_str(&format!(
        "{}",
        format!("Config file: {}", Config::config_path().display()).dimmed()
    ));

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output: OutputOptions) -> Result<()> {
    let mut config = Config::load()?;

    let shown_value = match key {
        "default_server" => {
            parse_server_url(value)?;
            config.default_server = Some(value.trim().trim_end_matches('/').to_string());
            json!(config.default_server)
        }
        "default_email" => {
            config.default_email = Some(value.trim().to_string());
            json!(config.default_email)
        }
        "auth.api_token" => {
            config.set_api_token(value.to_string());
            json!(mask_sensitive_value(value))
        }
        "name_check_debounce_ms" => {
            config.name_check_debounce_ms = parse_number(key, value)?;
            json!(config.name_check_debounce_ms)
        }
        "remote_timeout" => {
            let seconds = parse_number(key, value)?;
            if seconds == 0 {
                return Err(WizardError::Config(
                    "remote_timeout must be at least 1 second".to_string(),
                ));
            }
            config.remote_timeout = seconds;
            json!(seconds)
        }
        _ => return Err(unknown_key(key)),
    };
    config.save()?;

    let text_output = match shown_value.as_str() {
        Some(s) => format!("Set {} to {}", key.cyan(), s),
        None => format!("Set {} to {}", key.cyan(), shown_value),
    };
    let json_output = json!({
        "action": "config_set",
        "key": key,
        "value": shown_value,
        "success": true,
    });

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output)
}

/// Get a specific configuration value
pub fn cmd_config_get(key: &str, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;

    let (json_output, text_output) = match key {
        "default_server" | "default_email" => {
            let value = if key == "default_server" {
                config.default_server
            } else {
                config.default_email
            };
            let value = value.ok_or_else(|| WizardError::Config(format!("{key} not set")))?;
            (json!({ "key": key, "value": value.clone() }), value)
        }
        "auth.api_token" => {
            let token = config
                .api_token()
                .ok_or_else(|| WizardError::Config("auth.api_token not set".to_string()))?;
            let masked = mask_sensitive_value(&token);
            let json = json!({
                "key": key,
                "value": masked,
                "configured": true,
                "masked": true,
            });
            let text = format!("{masked} (masked - showing first 2 and last 2 characters)");
            (json, text)
        }
        "name_check_debounce_ms" => (
            json!({ "key": key, "value": config.name_check_debounce_ms }),
            config.name_check_debounce_ms.to_string(),
        ),
        "remote_timeout" => (
            json!({ "key": key, "value": config.remote_timeout }),
            config.remote_timeout.to_string(),
        ),
        _ => return Err(unknown_key(key)),
    };

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output)
}
