// SPDX-License-Identifier: Apache-2.0

use crate::{Db, StoreError};
use rusqlite::params;
use taskhive_model::{TaskStatus, UserId};

/// Site-wide counts for the coordinator dashboard.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CoordinatorSummary {
    pub num_volunteers: u64,
    pub num_tasks: u64,
    pub num_categories: u64,
    pub num_reports: u64,
    pub status_counts: Vec<(TaskStatus, u64)>,
}

/// Counts restricted to one volunteer's assignments.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct VolunteerSummary {
    pub num_tasks: u64,
    pub num_categories: u64,
}

impl Db {
    pub fn coordinator_summary(&self) -> Result<CoordinatorSummary, StoreError> {
        let count = |sql: &str| -> Result<u64, StoreError> {
            Ok(self.conn().query_row(sql, [], |r| r.get(0))?)
        };
        let num_volunteers = count("SELECT COUNT(*) FROM users WHERE role = 'volunteer'")?;
        let num_tasks = count("SELECT COUNT(*) FROM tasks")?;
        let num_categories = count("SELECT COUNT(*) FROM categories")?;
        let num_reports = count("SELECT COUNT(*) FROM reports")?;

        let mut status_counts = Vec::with_capacity(4);
        for status in [
            TaskStatus::Active,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Suspended,
        ] {
            let n: u64 = self.conn().query_row(
                "SELECT COUNT(*) FROM tasks WHERE status = ?1",
                params![status.as_str()],
                |r| r.get(0),
            )?;
            status_counts.push((status, n));
        }
        Ok(CoordinatorSummary {
            num_volunteers,
            num_tasks,
            num_categories,
            num_reports,
            status_counts,
        })
    }

    /// Category count is of distinct categories across the volunteer's
    /// assigned tasks, not of all categories.
    pub fn volunteer_summary(&self, volunteer: UserId) -> Result<VolunteerSummary, StoreError> {
        let num_tasks: u64 = self.conn().query_row(
            "SELECT COUNT(*) FROM tasks WHERE assigned_to = ?1",
            params![volunteer],
            |r| r.get(0),
        )?;
        let num_categories: u64 = self.conn().query_row(
            "SELECT COUNT(DISTINCT category_id) FROM tasks
             WHERE assigned_to = ?1 AND category_id IS NOT NULL",
            params![volunteer],
            |r| r.get(0),
        )?;
        Ok(VolunteerSummary {
            num_tasks,
            num_categories,
        })
    }
}
