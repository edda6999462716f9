// SPDX-License-Identifier: Apache-2.0

use crate::Requester;
use serde::{Deserialize, Serialize};
use taskhive_model::UserId;

/// Which tasks a requester may see. Compiled into the query; never
/// checked after fetching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskScope {
    All,
    AssignedTo(UserId),
}

/// Which reports a requester may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportScope {
    All,
    AuthoredBy(UserId),
}

#[must_use]
pub fn task_scope(requester: Requester) -> TaskScope {
    if requester.capability.is_coordinator() {
        TaskScope::All
    } else {
        TaskScope::AssignedTo(requester.user_id)
    }
}

#[must_use]
pub fn report_scope(requester: Requester) -> ReportScope {
    if requester.capability.is_coordinator() {
        ReportScope::All
    } else {
        ReportScope::AuthoredBy(requester.user_id)
    }
}
