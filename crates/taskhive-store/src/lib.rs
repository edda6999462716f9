#![forbid(unsafe_code)]
//! SQLite persistence for taskhive.
//!
//! Scoped queries are built as WHERE-part lists with positional
//! parameters; the visibility scope from `taskhive-policies` is compiled
//! into the clause alongside the optional search filters, so records
//! outside a requester's scope never leave the database layer.

use rusqlite::Connection;
use std::fmt::{Display, Formatter};
use std::path::Path;

mod catalog;
mod dashboard;
mod filters;
mod reports;
mod schema;
mod tasks;
mod users;

pub use catalog::{CategoryDraft, TagDraft};
pub use dashboard::{CoordinatorSummary, VolunteerSummary};
pub use filters::{
    escape_like_term, CategorySearch, ReportSearch, TagSearch, TaskSearch, VolunteerSearch,
};
pub use reports::{ReportDraft, ReportRow};
pub use tasks::{TaskDetail, TaskDraft, TaskUpdateOutcome};
pub use users::{UserDraft, UserUpdate, VolunteerStats};

pub const CRATE_NAME: &str = "taskhive-store";

/// Fixed list page size, everywhere.
pub const PAGE_SIZE: u32 = 5;

#[derive(Debug)]
#[non_exhaustive]
pub enum StoreError {
    /// Missing, or outside the requester's visibility scope. The two are
    /// deliberately indistinguishable.
    NotFound(&'static str),
    /// Unique constraint or protected reference violated.
    Conflict(String),
    /// A field failed a store-level invariant; carries the field name.
    Invalid(&'static str, String),
    Sqlite(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(what) => write!(f, "{what} not found"),
            Self::Conflict(msg) => f.write_str(msg),
            Self::Invalid(field, msg) => write!(f, "{field}: {msg}"),
            Self::Sqlite(msg) => write!(f, "sqlite error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Sqlite(e.to_string())
    }
}

impl From<taskhive_model::ParseError> for StoreError {
    fn from(e: taskhive_model::ParseError) -> Self {
        Self::Invalid(e.field(), e.to_string())
    }
}

/// One fixed-size slice of an ordered result set.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Page<T> {
    pub rows: Vec<T>,
    pub page: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub(crate) fn new(rows: Vec<T>, page: u32, total: u64) -> Self {
        let total_pages = (total.div_ceil(u64::from(PAGE_SIZE))).max(1) as u32;
        Self {
            rows,
            page,
            total,
            total_pages,
        }
    }
}

pub(crate) fn page_offset(page: u32) -> i64 {
    i64::from(page.saturating_sub(1)) * i64::from(PAGE_SIZE)
}

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys=ON; PRAGMA journal_mode=WAL;")?;
        schema::ensure_schema(&conn)?;
        Ok(Self { conn })
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }
}

pub(crate) fn encode_ts(ts: chrono::DateTime<chrono::Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

pub(crate) fn decode_ts(raw: &str) -> Result<chrono::DateTime<chrono::Utc>, StoreError> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| StoreError::Sqlite(format!("bad timestamp {raw:?}: {e}")))
}
