//! Catalog-driven Problem building.
//!
//! Modules declare their error catalog as `ErrDef` constants and turn them into
//! RFC 9457 problems at the REST boundary.
use http::StatusCode;
use modkit::api::problem::Problem;

/// Static error definition from a module catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub code: &'static str,
    pub type_url: &'static str,
}

impl ErrDef {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Convert this error definition into a Problem with the given detail
    #[inline]
    pub fn to_problem(&self, detail: impl Into<String>) -> Problem {
        Problem::new(self.status_code(), self.title, detail.into())
            .with_code(self.code)
            .with_type(self.type_url)
    }

    /// Same as [`ErrDef::to_problem`], bound to the request path that failed.
    #[inline]
    pub fn to_problem_at(&self, detail: impl Into<String>, instance: impl Into<String>) -> Problem {
        self.to_problem(detail).with_instance(instance)
    }
}
