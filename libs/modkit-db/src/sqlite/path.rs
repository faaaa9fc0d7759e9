//! SQLite database file preparation.

use std::io;
use std::path::PathBuf;

use super::is_memory_dsn;

/// Make a file-backed SQLite DSN connectable.
///
/// With `create`, the parent directory is created and `mode=rwc` is added when
/// the DSN does not pin a mode, so the database file is created on first use.
/// In-memory DSNs are returned unchanged.
pub(crate) fn prepare_sqlite_path(dsn: &str, create: bool) -> io::Result<String> {
    if is_memory_dsn(dsn) || !create {
        return Ok(dsn.to_string());
    }

    if let Some(parent) = extract_file_path_from_dsn(dsn)
        .as_deref()
        .and_then(|p| p.parent())
    {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    Ok(with_create_mode(dsn))
}

fn with_create_mode(dsn: &str) -> String {
    let has_mode = url::Url::parse(dsn)
        .map(|u| u.query_pairs().any(|(k, _)| k.eq_ignore_ascii_case("mode")))
        .unwrap_or(false);
    if has_mode {
        dsn.to_string()
    } else if dsn.contains('?') {
        format!("{dsn}&mode=rwc")
    } else {
        format!("{dsn}?mode=rwc")
    }
}

/// File path behind a SQLite DSN:
/// - `sqlite:///absolute/path/to/db.sqlite`
/// - `sqlite:relative/path/to/db.sqlite`
fn extract_file_path_from_dsn(dsn: &str) -> Option<PathBuf> {
    if is_memory_dsn(dsn) {
        return None;
    }

    if let Ok(url) = url::Url::parse(dsn) {
        if url.scheme() == "sqlite" && url.path().starts_with('/') {
            let path = url.path();
            if path == "/" {
                return None;
            }
            return Some(PathBuf::from(path));
        }
    }

    let rest = dsn.strip_prefix("sqlite:")?;
    let rest = rest.split('?').next().unwrap_or_default();
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    if rest.is_empty() {
        None
    } else {
        Some(PathBuf::from(rest))
    }
}
