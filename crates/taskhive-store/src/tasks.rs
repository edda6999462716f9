// SPDX-License-Identifier: Apache-2.0

use crate::filters::{contains_pattern, TaskSearch};
use crate::{decode_ts, encode_ts, page_offset, Db, Page, StoreError, PAGE_SIZE};
use chrono::{DateTime, Utc};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use taskhive_model::{
    CategoryId, Role, TagId, Task, TaskId, TaskStatus, UserId,
};
use taskhive_policies::TaskScope;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub created_by: UserId,
    pub assigned_to: Option<UserId>,
    pub status: TaskStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub category_id: Option<CategoryId>,
    pub tag_ids: Vec<TagId>,
}

/// Result of a task update; `assignee_changed` compares the submitted
/// assignee against the prior persisted value so the caller can decide
/// whether to notify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUpdateOutcome {
    pub task: Task,
    pub assignee_changed: bool,
}

/// A task joined with the display names the detail page needs.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct TaskDetail {
    pub task: Task,
    pub created_by_username: String,
    pub assigned_to_username: Option<String>,
    pub category_name: Option<String>,
    pub tag_names: Vec<String>,
}

const TASK_COLUMNS: &str =
    "t.id, t.title, t.description, t.created_by, t.assigned_to, t.status, t.deadline, t.category_id";

fn map_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let status_raw: String = row.get(5)?;
    let deadline_raw: Option<String> = row.get(6)?;
    let deadline = match deadline_raw {
        Some(raw) => Some(decode_ts(&raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
        })?),
        None => None,
    };
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        created_by: row.get(3)?,
        assigned_to: row.get(4)?,
        status: TaskStatus::parse(&status_raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?,
        deadline,
        category_id: row.get(7)?,
        tag_ids: Vec::new(),
    })
}

fn scope_clause(scope: TaskScope, where_parts: &mut Vec<String>, params_list: &mut Vec<Value>) {
    match scope {
        TaskScope::All => {}
        TaskScope::AssignedTo(user_id) => {
            where_parts.push("t.assigned_to = ?".to_string());
            params_list.push(Value::Integer(user_id));
        }
    }
}

impl Db {
    /// created_by must be a coordinator and assigned_to a volunteer.
    /// Promoted from the original's form-layer dropdown restriction to a
    /// hard invariant so no write path can bypass it. Only a missing row
    /// becomes a validation error; database faults pass through.
    fn check_task_references(&self, draft: &TaskDraft) -> Result<(), StoreError> {
        let creator = match self.user_by_id(draft.created_by) {
            Ok(user) => user,
            Err(StoreError::NotFound(_)) => {
                return Err(StoreError::Invalid("created_by", "no such user".to_string()))
            }
            Err(e) => return Err(e),
        };
        if creator.role != Role::Coordinator {
            return Err(StoreError::Invalid(
                "created_by",
                "task creator must be a coordinator".to_string(),
            ));
        }
        if let Some(assignee_id) = draft.assigned_to {
            let assignee = match self.user_by_id(assignee_id) {
                Ok(user) => user,
                Err(StoreError::NotFound(_)) => {
                    return Err(StoreError::Invalid("assigned_to", "no such user".to_string()))
                }
                Err(e) => return Err(e),
            };
            if assignee.role != Role::Volunteer {
                return Err(StoreError::Invalid(
                    "assigned_to",
                    "task assignee must be a volunteer".to_string(),
                ));
            }
        }
        if let Some(category_id) = draft.category_id {
            match self.category_by_id(category_id) {
                Ok(_) => {}
                Err(StoreError::NotFound(_)) => {
                    return Err(StoreError::Invalid(
                        "category_id",
                        "no such category".to_string(),
                    ))
                }
                Err(e) => return Err(e),
            }
        }
        for tag_id in &draft.tag_ids {
            match self.tag_by_id(*tag_id) {
                Ok(_) => {}
                Err(StoreError::NotFound(_)) => {
                    return Err(StoreError::Invalid(
                        "tag_ids",
                        format!("no such tag {tag_id}"),
                    ))
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    pub fn create_task(&self, draft: &TaskDraft) -> Result<Task, StoreError> {
        self.check_task_references(draft)?;
        let tx = self.conn().unchecked_transaction()?;
        tx.execute(
            "INSERT INTO tasks (title, description, created_by, assigned_to, status, deadline, category_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                draft.title,
                draft.description,
                draft.created_by,
                draft.assigned_to,
                draft.status.as_str(),
                draft.deadline.map(encode_ts),
                draft.category_id,
            ],
        )?;
        let id = tx.last_insert_rowid();
        for tag_id in &draft.tag_ids {
            tx.execute(
                "INSERT OR IGNORE INTO task_tags (task_id, tag_id) VALUES (?1, ?2)",
                params![id, tag_id],
            )?;
        }
        tx.commit()?;
        self.task_by_id(TaskScope::All, id)
    }

    pub fn update_task(&self, id: TaskId, draft: &TaskDraft) -> Result<TaskUpdateOutcome, StoreError> {
        self.check_task_references(draft)?;
        let prior = self.task_by_id(TaskScope::All, id)?;
        let tx = self.conn().unchecked_transaction()?;
        tx.execute(
            "UPDATE tasks SET title = ?1, description = ?2, created_by = ?3, assigned_to = ?4,
                    status = ?5, deadline = ?6, category_id = ?7 WHERE id = ?8",
            params![
                draft.title,
                draft.description,
                draft.created_by,
                draft.assigned_to,
                draft.status.as_str(),
                draft.deadline.map(encode_ts),
                draft.category_id,
                id,
            ],
        )?;
        tx.execute("DELETE FROM task_tags WHERE task_id = ?1", params![id])?;
        for tag_id in &draft.tag_ids {
            tx.execute(
                "INSERT OR IGNORE INTO task_tags (task_id, tag_id) VALUES (?1, ?2)",
                params![id, tag_id],
            )?;
        }
        tx.commit()?;
        let task = self.task_by_id(TaskScope::All, id)?;
        Ok(TaskUpdateOutcome {
            assignee_changed: prior.assigned_to != task.assigned_to,
            task,
        })
    }

    /// Cascades the task's reports and tag links.
    pub fn delete_task(&self, id: TaskId) -> Result<(), StoreError> {
        let deleted = self
            .conn()
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound("task"));
        }
        Ok(())
    }

    /// Scoped fetch; an out-of-scope id is NotFound, never Forbidden.
    pub fn task_by_id(&self, scope: TaskScope, id: TaskId) -> Result<Task, StoreError> {
        let mut where_parts = vec!["t.id = ?".to_string()];
        let mut params_list: Vec<Value> = vec![Value::Integer(id)];
        scope_clause(scope, &mut where_parts, &mut params_list);
        let task = self
            .conn()
            .query_row(
                &format!(
                    "SELECT {TASK_COLUMNS} FROM tasks t WHERE {}",
                    where_parts.join(" AND ")
                ),
                params_from_iter(params_list.iter()),
                map_task,
            )
            .optional()?;
        match task {
            Some(task) => Ok(self.attach_tags(task)?),
            None => Err(StoreError::NotFound("task")),
        }
    }

    pub fn task_detail(&self, scope: TaskScope, id: TaskId) -> Result<TaskDetail, StoreError> {
        let task = self.task_by_id(scope, id)?;
        let created_by_username: String = self.conn().query_row(
            "SELECT username FROM users WHERE id = ?1",
            params![task.created_by],
            |r| r.get(0),
        )?;
        let assigned_to_username = match task.assigned_to {
            Some(uid) => self
                .conn()
                .query_row(
                    "SELECT username FROM users WHERE id = ?1",
                    params![uid],
                    |r| r.get(0),
                )
                .optional()?,
            None => None,
        };
        let category_name = match task.category_id {
            Some(cid) => self
                .conn()
                .query_row(
                    "SELECT name FROM categories WHERE id = ?1",
                    params![cid],
                    |r| r.get(0),
                )
                .optional()?,
            None => None,
        };
        let mut stmt = self.conn().prepare(
            "SELECT g.name FROM tags g JOIN task_tags tt ON tt.tag_id = g.id
             WHERE tt.task_id = ?1 ORDER BY g.name",
        )?;
        let tag_names = stmt
            .query_map(params![id], |r| r.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TaskDetail {
            task,
            created_by_username,
            assigned_to_username,
            category_name,
            tag_names,
        })
    }

    pub fn list_tasks(
        &self,
        scope: TaskScope,
        search: &TaskSearch,
        page: u32,
    ) -> Result<Page<Task>, StoreError> {
        let mut where_parts: Vec<String> = Vec::new();
        let mut params_list: Vec<Value> = Vec::new();
        scope_clause(scope, &mut where_parts, &mut params_list);

        if let Some(title) = search.title.as_deref().filter(|s| !s.is_empty()) {
            where_parts.push("lower(t.title) LIKE ? ESCAPE '!'".to_string());
            params_list.push(Value::Text(contains_pattern(title)));
        }
        if let Some(status) = search.status {
            where_parts.push("t.status = ?".to_string());
            params_list.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(category_id) = search.category_id {
            where_parts.push("t.category_id = ?".to_string());
            params_list.push(Value::Integer(category_id));
        }
        if let Some(tag_id) = search.tag_id {
            where_parts.push(
                "EXISTS (SELECT 1 FROM task_tags tt WHERE tt.task_id = t.id AND tt.tag_id = ?)"
                    .to_string(),
            );
            params_list.push(Value::Integer(tag_id));
        }
        if let Some(assignee) = search.assigned_to {
            where_parts.push("t.assigned_to = ?".to_string());
            params_list.push(Value::Integer(assignee));
        }

        let where_sql = if where_parts.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_parts.join(" AND "))
        };

        let total: u64 = self.conn().query_row(
            &format!("SELECT COUNT(*) FROM tasks t{where_sql}"),
            params_from_iter(params_list.iter()),
            |r| r.get(0),
        )?;

        params_list.push(Value::Integer(i64::from(PAGE_SIZE)));
        params_list.push(Value::Integer(page_offset(page)));
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks t{where_sql} ORDER BY t.id LIMIT ? OFFSET ?"
        ))?;
        let bare = stmt
            .query_map(params_from_iter(params_list.iter()), map_task)?
            .collect::<Result<Vec<_>, _>>()?;
        let rows = bare
            .into_iter()
            .map(|t| self.attach_tags(t))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(rows, page, total))
    }

    fn attach_tags(&self, mut task: Task) -> Result<Task, StoreError> {
        let mut stmt = self
            .conn()
            .prepare("SELECT tag_id FROM task_tags WHERE task_id = ?1 ORDER BY tag_id")?;
        task.tag_ids = stmt
            .query_map(params![task.id], |r| r.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskhive_model::Username;

    fn draft(created_by: UserId) -> TaskDraft {
        TaskDraft {
            title: "mow".to_string(),
            description: String::new(),
            created_by,
            assigned_to: None,
            status: TaskStatus::Active,
            deadline: None,
            category_id: None,
            tag_ids: Vec::new(),
        }
    }

    #[test]
    fn missing_creator_is_a_validation_error() {
        let db = Db::open_in_memory().unwrap();
        let err = db.create_task(&draft(999)).unwrap_err();
        assert!(matches!(err, StoreError::Invalid("created_by", _)), "{err}");
    }

    #[test]
    fn database_faults_are_not_reported_as_validation() {
        let db = Db::open_in_memory().unwrap();
        let coord = db
            .create_user(&crate::UserDraft {
                username: Username::parse("coord").unwrap(),
                password_hash: "x".to_string(),
                role: Role::Coordinator,
                first_name: String::new(),
                last_name: String::new(),
                email: None,
                phone: None,
                city: String::new(),
            })
            .unwrap()
            .id;
        db.conn().execute("DROP TABLE users", []).unwrap();

        let err = db.create_task(&draft(coord)).unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)), "{err}");
    }
}
