// SPDX-License-Identifier: Apache-2.0

use crate::{CategoryId, ParseError, TagId};
use serde::{Deserialize, Serialize};

pub const NAME_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 500;

fn check_name(name: &str) -> Result<(), ParseError> {
    if name.is_empty() {
        return Err(ParseError::Empty("name"));
    }
    if name.trim() != name {
        return Err(ParseError::Trimmed("name"));
    }
    if name.len() > NAME_MAX_LEN {
        return Err(ParseError::TooLong("name", NAME_MAX_LEN));
    }
    Ok(())
}

/// Flat reference data: a task classification bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
}

impl Category {
    pub fn validate(&self) -> Result<(), ParseError> {
        check_name(&self.name)?;
        if self.description.len() > DESCRIPTION_MAX_LEN {
            return Err(ParseError::TooLong("description", DESCRIPTION_MAX_LEN));
        }
        Ok(())
    }
}

/// Flat reference data: a free-form label. Name is globally unique;
/// uniqueness lives in the store, not here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

impl Tag {
    pub fn validate(&self) -> Result<(), ParseError> {
        check_name(&self.name)
    }
}
