// SPDX-License-Identifier: Apache-2.0

use crate::{ParseError, UserId};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub const USERNAME_MAX_LEN: usize = 150;
pub const PHONE_MAX_LEN: usize = 15;
pub const CITY_MAX_LEN: usize = 50;

/// Closed role set. Everything the service authorizes hangs off this
/// distinction, so the enum is deliberately not extensible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Coordinator,
    Volunteer,
}

impl Role {
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        match raw {
            "coordinator" => Ok(Self::Coordinator),
            "volunteer" => Ok(Self::Volunteer),
            _ => Err(ParseError::InvalidValue(
                "role must be one of 'coordinator', 'volunteer'",
            )),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Coordinator => "coordinator",
            Self::Volunteer => "volunteer",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Volunteer
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct Username(String);

impl Username {
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        if input.is_empty() {
            return Err(ParseError::Empty("username"));
        }
        if input.trim() != input {
            return Err(ParseError::Trimmed("username"));
        }
        if input.len() > USERNAME_MAX_LEN {
            return Err(ParseError::TooLong("username", USERNAME_MAX_LEN));
        }
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Username {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: String,
}

impl User {
    pub fn validate(&self) -> Result<(), ParseError> {
        if let Some(phone) = &self.phone {
            if phone.len() > PHONE_MAX_LEN {
                return Err(ParseError::TooLong("phone", PHONE_MAX_LEN));
            }
        }
        if self.city.len() > CITY_MAX_LEN {
            return Err(ParseError::TooLong("city", CITY_MAX_LEN));
        }
        Ok(())
    }
}
