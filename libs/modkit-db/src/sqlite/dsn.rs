//! SQLite DSN parsing and cleaning.

use std::collections::HashMap;

/// Query parameters consumed as PRAGMAs rather than passed on to sqlx.
const SQLITE_PRAGMA_PARAMS: &[&str] = &["wal", "synchronous", "busy_timeout", "journal_mode"];

/// Split PRAGMA parameters off the DSN.
///
/// Returns the DSN without the PRAGMA parameters and the extracted pairs with
/// lowercase keys. A DSN that does not parse as a URL is returned unchanged.
pub(crate) fn extract_sqlite_pragmas(dsn: &str) -> (String, HashMap<String, String>) {
    let Ok(mut url) = url::Url::parse(dsn) else {
        return (dsn.to_string(), HashMap::new());
    };

    let mut extracted = HashMap::new();
    let mut remaining = Vec::new();
    for (key, value) in url.query_pairs() {
        let key_lower = key.to_lowercase();
        if SQLITE_PRAGMA_PARAMS.contains(&key_lower.as_str()) {
            extracted.insert(key_lower, value.into_owned());
        } else {
            remaining.push(format!("{key}={value}"));
        }
    }

    if extracted.is_empty() {
        return (dsn.to_string(), extracted);
    }

    url.set_query(None);
    if !remaining.is_empty() {
        url.set_query(Some(&remaining.join("&")));
    }
    (url.to_string(), extracted)
}

/// `sqlite::memory:`, `sqlite://memory:` or any DSN with `mode=memory`.
pub(crate) fn is_memory_dsn(dsn: &str) -> bool {
    if dsn == "sqlite::memory:" || dsn == "sqlite://memory:" {
        return true;
    }
    match url::Url::parse(dsn) {
        Ok(url) => url.query_pairs().any(|(key, value)| {
            key.eq_ignore_ascii_case("mode") && value.eq_ignore_ascii_case("memory")
        }),
        Err(_) => false,
    }
}
