//! Small filesystem and formatting helpers shared by the store, config and CLI.

use std::fs;
use std::path::Path;

use crate::error::{Result, WizardError};

/// Ensure the parent directory of a path exists, creating it if necessary.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            WizardError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create directory at {}: {}", parent.display(), e),
            ))
        })?;
    }
    Ok(())
}

/// Write a file that may hold credentials.
///
/// On Unix the file is restricted to owner read/write.
pub fn write_private(path: &Path, content: &str) -> Result<()> {
    ensure_parent_dir(path)?;

    fs::write(path, content).map_err(|e| {
        WizardError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to write {}: {}", path.display(), e),
        ))
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = fs::Permissions::from_mode(0o600);
        fs::set_permissions(path, permissions).map_err(|e| {
            WizardError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to set permissions on {}: {}", path.display(), e),
            ))
        })?;
    }

    Ok(())
}

/// Mask a sensitive value by showing only the first 2 and last 2 characters
pub fn mask_sensitive_value(value: &str) -> String {
    let char_count = value.chars().count();
    if char_count > 4 {
        let first: String = value.chars().take(2).collect();
        let last: String = value.chars().skip(char_count - 2).collect();
        format!("{first}...{last}")
    } else {
        "****".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mask_sensitive_value() {
        assert_eq!(mask_sensitive_value("abcdefgh"), "ab...gh");
        assert_eq!(mask_sensitive_value("abcd"), "****");
        assert_eq!(mask_sensitive_value(""), "****");
    }

    #[test]
    fn test_write_private_creates_parent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("secret.yaml");

        write_private(&path, "token: x\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "token: x\n");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
