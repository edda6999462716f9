// SPDX-License-Identifier: Apache-2.0

use crate::filters::{contains_pattern, ReportSearch};
use crate::{decode_ts, encode_ts, page_offset, Db, Page, StoreError, PAGE_SIZE};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use taskhive_model::{Report, ReportId, TaskId, UserId};
use taskhive_policies::ReportScope;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    pub comment: String,
    pub author: UserId,
    pub task_id: TaskId,
}

/// A report joined with its author's username and task title.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ReportRow {
    #[serde(flatten)]
    pub report: Report,
    pub author_username: Option<String>,
    pub task_title: String,
}

const REPORT_COLUMNS: &str = "r.id, r.comment, r.author, r.task_id, r.verified_by, r.verified_at, \
     r.created_at, r.updated_at, u.username, t.title";

const REPORT_FROM: &str = "reports r LEFT JOIN users u ON u.id = r.author \
     JOIN tasks t ON t.id = r.task_id";

fn decode_opt_ts(raw: Option<String>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    match raw {
        Some(raw) => decode_ts(&raw)
            .map(Some)
            .map_err(|e| into_column_err(idx, e)),
        None => Ok(None),
    }
}

fn into_column_err(idx: usize, e: StoreError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

fn map_report_row(row: &Row<'_>) -> rusqlite::Result<ReportRow> {
    let created_raw: String = row.get(6)?;
    let updated_raw: String = row.get(7)?;
    Ok(ReportRow {
        report: Report {
            id: row.get(0)?,
            comment: row.get(1)?,
            author: row.get(2)?,
            task_id: row.get(3)?,
            verified_by: row.get(4)?,
            verified_at: decode_opt_ts(row.get(5)?, 5)?,
            created_at: decode_ts(&created_raw).map_err(|e| into_column_err(6, e))?,
            updated_at: decode_ts(&updated_raw).map_err(|e| into_column_err(7, e))?,
        },
        author_username: row.get(8)?,
        task_title: row.get(9)?,
    })
}

fn scope_clause(scope: ReportScope, where_parts: &mut Vec<String>, params_list: &mut Vec<Value>) {
    match scope {
        ReportScope::All => {}
        ReportScope::AuthoredBy(user_id) => {
            where_parts.push("r.author = ?".to_string());
            params_list.push(Value::Integer(user_id));
        }
    }
}

impl Db {
    /// The author must be the task's current assignee.
    pub fn create_report(&self, draft: &ReportDraft, now: DateTime<Utc>) -> Result<ReportRow, StoreError> {
        let assignee: Option<UserId> = self
            .conn()
            .query_row(
                "SELECT assigned_to FROM tasks WHERE id = ?1",
                params![draft.task_id],
                |r| r.get(0),
            )
            .optional()?
            .ok_or(StoreError::NotFound("task"))?;
        if assignee != Some(draft.author) {
            return Err(StoreError::Invalid(
                "task_id",
                "reports may only be filed against the author's own assigned task".to_string(),
            ));
        }
        let stamp = encode_ts(now);
        self.conn().execute(
            "INSERT INTO reports (comment, author, task_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![draft.comment, draft.author, draft.task_id, stamp],
        )?;
        self.report_by_id(ReportScope::All, self.conn().last_insert_rowid())
    }

    pub fn update_report(
        &self,
        id: ReportId,
        comment: &str,
        now: DateTime<Utc>,
    ) -> Result<ReportRow, StoreError> {
        let changed = self.conn().execute(
            "UPDATE reports SET comment = ?1, updated_at = ?2 WHERE id = ?3",
            params![comment, encode_ts(now), id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound("report"));
        }
        self.report_by_id(ReportScope::All, id)
    }

    /// Stamps the verifier and the verification instant. Re-verifying an
    /// already-verified report overwrites the stamp.
    pub fn verify_report(
        &self,
        id: ReportId,
        verified_by: UserId,
        now: DateTime<Utc>,
    ) -> Result<ReportRow, StoreError> {
        let stamp = encode_ts(now);
        let changed = self.conn().execute(
            "UPDATE reports SET verified_by = ?1, verified_at = ?2, updated_at = ?2 WHERE id = ?3",
            params![verified_by, stamp, id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound("report"));
        }
        self.report_by_id(ReportScope::All, id)
    }

    pub fn delete_report(&self, id: ReportId) -> Result<(), StoreError> {
        let deleted = self
            .conn()
            .execute("DELETE FROM reports WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound("report"));
        }
        Ok(())
    }

    /// Scoped fetch; an out-of-scope id is NotFound, never Forbidden.
    pub fn report_by_id(&self, scope: ReportScope, id: ReportId) -> Result<ReportRow, StoreError> {
        let mut where_parts = vec!["r.id = ?".to_string()];
        let mut params_list: Vec<Value> = vec![Value::Integer(id)];
        scope_clause(scope, &mut where_parts, &mut params_list);
        self.conn()
            .query_row(
                &format!(
                    "SELECT {REPORT_COLUMNS} FROM {REPORT_FROM} WHERE {}",
                    where_parts.join(" AND ")
                ),
                params_from_iter(params_list.iter()),
                map_report_row,
            )
            .optional()?
            .ok_or(StoreError::NotFound("report"))
    }

    pub fn list_reports(
        &self,
        scope: ReportScope,
        search: &ReportSearch,
        page: u32,
    ) -> Result<Page<ReportRow>, StoreError> {
        let mut where_parts: Vec<String> = Vec::new();
        let mut params_list: Vec<Value> = Vec::new();
        scope_clause(scope, &mut where_parts, &mut params_list);

        if let Some(author) = search.author.as_deref().filter(|s| !s.is_empty()) {
            where_parts.push("lower(u.username) LIKE ? ESCAPE '!'".to_string());
            params_list.push(Value::Text(contains_pattern(author)));
        }
        if let Some(author_id) = search.author_id {
            where_parts.push("r.author = ?".to_string());
            params_list.push(Value::Integer(author_id));
        }
        if let Some(date) = search.created_date {
            where_parts.push("substr(r.created_at, 1, 10) = ?".to_string());
            params_list.push(Value::Text(date.format("%Y-%m-%d").to_string()));
        }

        let where_sql = if where_parts.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_parts.join(" AND "))
        };

        let total: u64 = self.conn().query_row(
            &format!("SELECT COUNT(*) FROM {REPORT_FROM}{where_sql}"),
            params_from_iter(params_list.iter()),
            |r| r.get(0),
        )?;

        params_list.push(Value::Integer(i64::from(PAGE_SIZE)));
        params_list.push(Value::Integer(page_offset(page)));
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {REPORT_COLUMNS} FROM {REPORT_FROM}{where_sql} ORDER BY r.id LIMIT ? OFFSET ?"
        ))?;
        let rows = stmt
            .query_map(params_from_iter(params_list.iter()), map_report_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(rows, page, total))
    }
}
