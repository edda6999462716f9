// SPDX-License-Identifier: Apache-2.0

use crate::{ParseError, ReportId, TaskId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const COMMENT_MAX_LEN: usize = 500;

/// A volunteer's record of work performed against a task. Two states:
/// unverified (verified_by null) and verified (verified_by and
/// verified_at both set, always together). There is no transition back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Report {
    pub id: ReportId,
    pub comment: String,
    pub author: Option<UserId>,
    pub task_id: TaskId,
    pub verified_by: Option<UserId>,
    pub verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.verified_by.is_some()
    }

    pub fn validate(&self) -> Result<(), ParseError> {
        if self.comment.is_empty() {
            return Err(ParseError::Empty("comment"));
        }
        if self.comment.len() > COMMENT_MAX_LEN {
            return Err(ParseError::TooLong("comment", COMMENT_MAX_LEN));
        }
        if self.verified_by.is_some() != self.verified_at.is_some() {
            return Err(ParseError::InvalidValue(
                "verified_by and verified_at must be set together",
            ));
        }
        Ok(())
    }
}
