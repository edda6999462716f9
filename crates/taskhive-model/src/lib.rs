#![forbid(unsafe_code)]
//! Taskhive domain model SSOT.
//!
//! Validated newtypes only exist through their parse constructors:
//!
//! ```compile_fail
//! let u = taskhive_model::Username("sam".to_string());
//! ```

mod catalog;
mod report;
mod task;
mod user;

pub use catalog::{Category, Tag, DESCRIPTION_MAX_LEN, NAME_MAX_LEN};
pub use report::{Report, COMMENT_MAX_LEN};
pub use task::{Task, TaskStatus, TITLE_MAX_LEN};
pub use user::{
    Role, User, Username, CITY_MAX_LEN, PHONE_MAX_LEN, USERNAME_MAX_LEN,
};

pub const CRATE_NAME: &str = "taskhive-model";

use std::fmt::{Display, Formatter};

/// Identifiers are SQLite rowids; zero is never issued.
pub type CategoryId = i64;
pub type ReportId = i64;
pub type TagId = i64;
pub type TaskId = i64;
pub type UserId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    Empty(&'static str),
    Trimmed(&'static str),
    TooLong(&'static str, usize),
    InvalidValue(&'static str),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty(name) => write!(f, "{name} must not be empty"),
            Self::Trimmed(name) => {
                write!(f, "{name} must not contain leading/trailing whitespace")
            }
            Self::TooLong(name, max) => write!(f, "{name} exceeds max length {max}"),
            Self::InvalidValue(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for ParseError {}

impl ParseError {
    /// The form-field name this error attaches to, for inline validation output.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Empty(name) | Self::Trimmed(name) | Self::TooLong(name, _) => name,
            Self::InvalidValue(_) => "value",
        }
    }
}
