use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// Resolve the application home directory.
///
/// - `Some(path)`: a leading `~` is expanded to the user's home, relative
///   paths are made absolute against the current directory.
/// - `None`: `$HOME/<default_subdir>`.
///
/// When `create` is set the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let resolved = match configured {
        Some(raw) => expand_path(raw.trim())?,
        None => dirs::home_dir()
            .ok_or_else(|| anyhow!("Unable to determine user home directory"))?
            .join(default_subdir),
    };

    let absolute = if resolved.is_absolute() {
        resolved
    } else {
        std::env::current_dir()
            .context("Failed to read current directory")?
            .join(resolved)
    };

    if create {
        std::fs::create_dir_all(&absolute)
            .with_context(|| format!("Failed to create home dir {}", absolute.display()))?;
    }

    Ok(absolute)
}

fn expand_path(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return dirs::home_dir().ok_or_else(|| anyhow!("Unable to determine user home directory"));
    }
    if let Some(rest) = raw.strip_prefix("~/") {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow!("Unable to determine user home directory"))?;
        return Ok(home.join(rest));
    }
    Ok(Path::new(raw).to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn explicit_absolute_dir_is_created() {
        let tmp = tempdir().unwrap();
        let target = tmp.path().join("nested/home");

        let resolved =
            resolve_home_dir(Some(target.to_string_lossy().to_string()), ".propdesk", true)
                .unwrap();

        assert_eq!(resolved, target);
        assert!(target.is_dir());
    }

    #[test]
    fn tilde_expands_to_user_home() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let resolved = resolve_home_dir(Some("~/.propdesk-test".into()), ".propdesk", false)
            .unwrap();
        assert_eq!(resolved, home.join(".propdesk-test"));
    }

    #[test]
    fn relative_dir_becomes_absolute() {
        let resolved = resolve_home_dir(Some("relative/dir".into()), ".propdesk", false).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("relative/dir"));
    }
}
