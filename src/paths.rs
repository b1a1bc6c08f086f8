use std::path::PathBuf;

/// Returns the root directory holding configuration and saved profiles.
///
/// Resolution order:
/// 1. `JIRA_WIZARD_ROOT` environment variable (if set)
/// 2. Current working directory + `.jira-wizard`
pub fn wizard_root() -> PathBuf {
    if let Ok(root) = std::env::var("JIRA_WIZARD_ROOT") {
        PathBuf::from(root)
    } else {
        PathBuf::from(".jira-wizard")
    }
}

/// Returns the path to the saved profiles file.
pub fn profiles_path() -> PathBuf {
    wizard_root().join("profiles.yaml")
}
