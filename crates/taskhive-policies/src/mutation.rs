// SPDX-License-Identifier: Apache-2.0

use crate::Capability;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Volunteer,
    Category,
    Tag,
    Task,
    Report,
}

impl Resource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Volunteer => "volunteer",
            Self::Category => "category",
            Self::Tag => "tag",
            Self::Task => "task",
            Self::Report => "report",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl Action {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Denied {
    pub resource: Resource,
    pub action: Action,
    pub capability: Capability,
}

impl Display for Denied {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} may not {} {}",
            self.capability,
            self.action.as_str(),
            self.resource.as_str()
        )
    }
}

impl std::error::Error for Denied {}

/// The binary mutation gate. Coordinators own every mutation except
/// report filing, which belongs to volunteers alone. Stateless; the
/// caller has already established authentication.
pub fn authorize(capability: Capability, resource: Resource, action: Action) -> Result<(), Denied> {
    let allowed = match (resource, action) {
        (Resource::Report, Action::Create) => !capability.is_coordinator(),
        _ => capability.is_coordinator(),
    };
    if allowed {
        Ok(())
    } else {
        Err(Denied {
            resource,
            action,
            capability,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinator_owns_catalog_and_task_mutations() {
        for resource in [
            Resource::Volunteer,
            Resource::Category,
            Resource::Tag,
            Resource::Task,
        ] {
            for action in [Action::Create, Action::Update, Action::Delete] {
                assert!(authorize(Capability::Coordinator, resource, action).is_ok());
                assert!(authorize(Capability::Volunteer, resource, action).is_err());
            }
        }
    }

    #[test]
    fn report_create_is_volunteer_only() {
        assert!(authorize(Capability::Volunteer, Resource::Report, Action::Create).is_ok());
        assert!(authorize(Capability::Coordinator, Resource::Report, Action::Create).is_err());
    }

    #[test]
    fn report_verify_and_delete_are_coordinator_only() {
        for action in [Action::Update, Action::Delete] {
            assert!(authorize(Capability::Coordinator, Resource::Report, action).is_ok());
            assert!(authorize(Capability::Volunteer, Resource::Report, action).is_err());
        }
    }
}
