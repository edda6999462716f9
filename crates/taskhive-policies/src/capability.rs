// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use taskhive_model::{Role, UserId};

/// Closed capability tag carried on the authenticated-session value.
/// Handlers dispatch on this, never on raw role strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Coordinator,
    Volunteer,
}

impl From<Role> for Capability {
    fn from(role: Role) -> Self {
        match role {
            Role::Coordinator => Self::Coordinator,
            Role::Volunteer => Self::Volunteer,
        }
    }
}

impl Capability {
    #[must_use]
    pub const fn is_coordinator(self) -> bool {
        matches!(self, Self::Coordinator)
    }
}

/// The authenticated requester: identity plus capability, threaded
/// explicitly through every core operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub user_id: UserId,
    pub capability: Capability,
}

impl Requester {
    #[must_use]
    pub const fn new(user_id: UserId, capability: Capability) -> Self {
        Self {
            user_id,
            capability,
        }
    }
}
