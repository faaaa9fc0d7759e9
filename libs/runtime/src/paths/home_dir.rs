use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomeDirError {
    #[error("cannot determine the user home directory")]
    NoHome,

    #[error("cannot determine the current working directory: {0}")]
    Cwd(#[source] std::io::Error),

    #[error("failed to create directory '{path}': {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Platform base directory used when no explicit home_dir is configured.
/// Windows: %APPDATA%, everything else: $HOME.
fn platform_base() -> Result<PathBuf, HomeDirError> {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return Ok(PathBuf::from(appdata));
        }
    }
    dirs::home_dir().ok_or(HomeDirError::NoHome)
}

/// Expand a leading `~` or `~/` against the user home directory.
fn expand_tilde(raw: &str) -> Result<PathBuf, HomeDirError> {
    if raw == "~" {
        return dirs::home_dir().ok_or(HomeDirError::NoHome);
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        let home = dirs::home_dir().ok_or(HomeDirError::NoHome)?;
        return Ok(home.join(rest));
    }
    Ok(PathBuf::from(raw))
}

fn absolutize(p: PathBuf) -> Result<PathBuf, HomeDirError> {
    if p.is_absolute() {
        return Ok(p);
    }
    let cwd = std::env::current_dir().map_err(HomeDirError::Cwd)?;
    Ok(cwd.join(p))
}

/// Resolve the server home directory into an absolute path.
///
/// - `None` (or blank) resolves to `<platform base>/<default_subdir>`.
/// - `~` prefixes are expanded; relative paths are joined onto the cwd.
/// - With `create`, the directory is created if it does not exist yet.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf, HomeDirError> {
    let resolved = match configured.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => absolutize(expand_tilde(raw)?)?,
        _ => platform_base()?.join(default_subdir),
    };

    if create {
        ensure_dir(&resolved)?;
    }
    Ok(resolved)
}

fn ensure_dir(path: &Path) -> Result<(), HomeDirError> {
    std::fs::create_dir_all(path).map_err(|source| HomeDirError::Create {
        path: path.to_path_buf(),
        source,
    })
}
