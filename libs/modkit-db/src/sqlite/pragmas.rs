//! SQLite PRAGMA parameters taken from the DSN query string.

use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum JournalMode {
    Delete,
    Wal,
    Memory,
    Truncate,
    Persist,
    Off,
}

impl JournalMode {
    pub(crate) fn as_sql(&self) -> &'static str {
        match self {
            JournalMode::Delete => "DELETE",
            JournalMode::Wal => "WAL",
            JournalMode::Memory => "MEMORY",
            JournalMode::Truncate => "TRUNCATE",
            JournalMode::Persist => "PERSIST",
            JournalMode::Off => "OFF",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "DELETE" => Some(JournalMode::Delete),
            "WAL" => Some(JournalMode::Wal),
            "MEMORY" => Some(JournalMode::Memory),
            "TRUNCATE" => Some(JournalMode::Truncate),
            "PERSIST" => Some(JournalMode::Persist),
            "OFF" => Some(JournalMode::Off),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SyncMode {
    Off,
    Normal,
    Full,
    Extra,
}

impl SyncMode {
    pub(crate) fn as_sql(&self) -> &'static str {
        match self {
            SyncMode::Off => "OFF",
            SyncMode::Normal => "NORMAL",
            SyncMode::Full => "FULL",
            SyncMode::Extra => "EXTRA",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "OFF" => Some(SyncMode::Off),
            "NORMAL" => Some(SyncMode::Normal),
            "FULL" => Some(SyncMode::Full),
            "EXTRA" => Some(SyncMode::Extra),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Pragmas {
    pub journal_mode: Option<JournalMode>,
    pub synchronous: Option<SyncMode>,
    pub busy_timeout_ms: Option<i64>,
    /// Shorthand `wal=true|false|1|0`; `journal_mode` wins when both are set.
    pub wal_toggle: Option<bool>,
}

impl Pragmas {
    /// Invalid values are logged and ignored.
    pub(crate) fn from_pairs(pairs: &HashMap<String, String>) -> Self {
        let mut pragmas = Pragmas::default();

        for (key, value) in pairs {
            match key.to_lowercase().as_str() {
                "journal_mode" => match JournalMode::parse(value) {
                    Some(mode) => pragmas.journal_mode = Some(mode),
                    None => tracing::warn!(%value, "invalid 'journal_mode' PRAGMA value, ignoring"),
                },
                "synchronous" => match SyncMode::parse(value) {
                    Some(mode) => pragmas.synchronous = Some(mode),
                    None => tracing::warn!(%value, "invalid 'synchronous' PRAGMA value, ignoring"),
                },
                "busy_timeout" => match value.parse::<i64>() {
                    Ok(ms) if ms >= 0 => pragmas.busy_timeout_ms = Some(ms),
                    _ => tracing::warn!(%value, "invalid 'busy_timeout' PRAGMA value, ignoring"),
                },
                "wal" => match value.to_lowercase().as_str() {
                    "true" | "1" => pragmas.wal_toggle = Some(true),
                    "false" | "0" => pragmas.wal_toggle = Some(false),
                    _ => tracing::warn!(%value, "invalid 'wal' PRAGMA value, ignoring"),
                },
                other => tracing::debug!(key = other, "unknown SQLite PRAGMA parameter"),
            }
        }

        pragmas
    }

    /// PRAGMA statements to run on every new connection.
    ///
    /// In-memory databases always use `DELETE` journaling and no busy timeout.
    pub(crate) fn statements(&self, in_memory: bool, default_busy_timeout_ms: i64) -> Vec<String> {
        let journal = if in_memory {
            JournalMode::Delete
        } else {
            match (self.journal_mode, self.wal_toggle) {
                (Some(mode), _) => mode,
                (None, Some(false)) => JournalMode::Delete,
                _ => JournalMode::Wal,
            }
        };
        let sync = self.synchronous.unwrap_or(SyncMode::Normal);

        let mut out = vec![
            format!("PRAGMA journal_mode = {}", journal.as_sql()),
            format!("PRAGMA synchronous = {}", sync.as_sql()),
        ];
        if !in_memory {
            let ms = self.busy_timeout_ms.unwrap_or(default_busy_timeout_ms);
            out.push(format!("PRAGMA busy_timeout = {ms}"));
        }
        out
    }
}
