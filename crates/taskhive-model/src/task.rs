// SPDX-License-Identifier: Apache-2.0

use crate::catalog::DESCRIPTION_MAX_LEN;
use crate::{CategoryId, ParseError, TagId, TaskId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const TITLE_MAX_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Active,
    InProgress,
    Completed,
    Suspended,
}

impl TaskStatus {
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        match raw {
            "active" => Ok(Self::Active),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "suspended" => Ok(Self::Suspended),
            _ => Err(ParseError::InvalidValue(
                "status must be one of 'active', 'in_progress', 'completed', 'suspended'",
            )),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Suspended => "suspended",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The entity with the most state: creator, optional assignee,
/// lifecycle status, deadline, category, and a tag set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub created_by: UserId,
    pub assigned_to: Option<UserId>,
    pub status: TaskStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub category_id: Option<CategoryId>,
    pub tag_ids: Vec<TagId>,
}

impl Task {
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.title.is_empty() {
            return Err(ParseError::Empty("title"));
        }
        if self.title.trim() != self.title {
            return Err(ParseError::Trimmed("title"));
        }
        if self.title.len() > TITLE_MAX_LEN {
            return Err(ParseError::TooLong("title", TITLE_MAX_LEN));
        }
        if self.description.len() > DESCRIPTION_MAX_LEN {
            return Err(ParseError::TooLong("description", DESCRIPTION_MAX_LEN));
        }
        Ok(())
    }
}
