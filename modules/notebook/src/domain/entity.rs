//! The `Entity` abstraction shared by every resource, plus the field rules
//! for `NoteBook` and `Share`.
use crate::contract::{NoteBook, Share};
use crate::domain::error::FieldViolation;

/// A persisted record with a server-assigned identity.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Entity name used in messages and alert headers (`noteBook`, `share`).
    const NAME: &'static str;

    fn id(&self) -> Option<i64>;

    /// Check required fields and length constraints.
    fn validate(&self) -> Result<(), Vec<FieldViolation>>;

    /// Merge-patch: every non-null field of `patch` overwrites the field of `self`.
    fn merge(&mut self, patch: Self);
}

pub const NOTEBOOK_NAME_MIN: usize = 3;
pub const NOTEBOOK_HANDLE_MIN: usize = 2;

fn require_min_len(
    out: &mut Vec<FieldViolation>,
    field: &'static str,
    value: Option<&str>,
    min: usize,
) {
    match value {
        None => out.push(FieldViolation::new(field, "must not be null")),
        Some(v) if v.chars().count() < min => out.push(FieldViolation::new(
            field,
            format!("size must be at least {min}"),
        )),
        Some(_) => {}
    }
}

fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

impl Entity for NoteBook {
    const NAME: &'static str = "noteBook";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        let mut violations = Vec::new();
        require_min_len(
            &mut violations,
            "name",
            self.name.as_deref(),
            NOTEBOOK_NAME_MIN,
        );
        require_min_len(
            &mut violations,
            "handle",
            self.handle.as_deref(),
            NOTEBOOK_HANDLE_MIN,
        );
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    fn merge(&mut self, patch: Self) {
        overwrite(&mut self.name, patch.name);
        overwrite(&mut self.handle, patch.handle);
        overwrite(&mut self.user, patch.user);
    }
}

impl Entity for Share {
    const NAME: &'static str = "share";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn validate(&self) -> Result<(), Vec<FieldViolation>> {
        if self.invite.is_none() {
            return Err(vec![FieldViolation::new("invite", "must not be null")]);
        }
        Ok(())
    }

    fn merge(&mut self, patch: Self) {
        overwrite(&mut self.invite, patch.invite);
        overwrite(&mut self.author, patch.author);
        overwrite(&mut self.with_user, patch.with_user);
        overwrite(&mut self.sharing, patch.sharing);
    }
}
