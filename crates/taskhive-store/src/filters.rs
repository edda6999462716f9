// SPDX-License-Identifier: Apache-2.0

//! Optional search criteria, composed with AND onto the scoped base
//! query. Absent values are no-ops; the parameter-parsing layer has
//! already dropped unknown or malformed values.

use chrono::NaiveDate;
use taskhive_model::{CategoryId, TagId, TaskStatus, UserId};

/// Escape `%`, `_`, and the escape character itself for a `LIKE ?
/// ESCAPE '!'` pattern.
#[must_use]
pub fn escape_like_term(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        match c {
            '!' | '%' | '_' => {
                out.push('!');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

/// Case-insensitive substring pattern for a LIKE clause.
pub(crate) fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like_term(&term.to_lowercase()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VolunteerSearch {
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySearch {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSearch {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSearch {
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
    pub category_id: Option<CategoryId>,
    pub tag_id: Option<TagId>,
    pub assigned_to: Option<UserId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSearch {
    /// Substring match on the author's username.
    pub author: Option<String>,
    pub author_id: Option<UserId>,
    /// Matches the UTC calendar date of `created_at`.
    pub created_date: Option<NaiveDate>,
}
