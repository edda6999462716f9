// SPDX-License-Identifier: Apache-2.0

use crate::filters::{contains_pattern, VolunteerSearch};
use crate::{page_offset, Db, Page, StoreError, PAGE_SIZE};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use taskhive_model::{Role, User, UserId, Username};

#[derive(Debug, Clone)]
pub struct UserDraft {
    pub username: Username,
    pub password_hash: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: String,
}

/// Update payload; the password is only touched when a new hash is given.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    pub username: Username,
    pub password_hash: Option<String>,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct VolunteerStats {
    pub tasks_count: u64,
    pub reports_count: u64,
    pub tasks_completed: u64,
    pub tasks_in_progress: u64,
}

const USER_COLUMNS: &str = "id, username, role, first_name, last_name, email, phone, city";

fn map_user(row: &Row<'_>) -> rusqlite::Result<User> {
    let username_raw: String = row.get(1)?;
    let role_raw: String = row.get(2)?;
    Ok(User {
        id: row.get(0)?,
        username: Username::parse(&username_raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(e))
        })?,
        role: Role::parse(&role_raw).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(2, rusqlite::types::Type::Text, Box::new(e))
        })?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        email: row.get(5)?,
        phone: row.get(6)?,
        city: row.get(7)?,
    })
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

impl Db {
    pub fn create_user(&self, draft: &UserDraft) -> Result<User, StoreError> {
        let inserted = self.conn().execute(
            "INSERT INTO users (username, password_hash, role, first_name, last_name, email, phone, city)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                draft.username.as_str(),
                draft.password_hash,
                draft.role.as_str(),
                draft.first_name,
                draft.last_name,
                draft.email,
                draft.phone,
                draft.city,
            ],
        );
        match inserted {
            Ok(_) => self.user_by_id(self.conn().last_insert_rowid()),
            Err(e) if is_unique_violation(&e) => Err(StoreError::Conflict(format!(
                "username {:?} is already taken",
                draft.username.as_str()
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<User, StoreError> {
        let changed = if let Some(hash) = &update.password_hash {
            self.conn().execute(
                "UPDATE users SET username = ?1, password_hash = ?2, role = ?3, first_name = ?4,
                        last_name = ?5, email = ?6, phone = ?7, city = ?8 WHERE id = ?9",
                params![
                    update.username.as_str(),
                    hash,
                    update.role.as_str(),
                    update.first_name,
                    update.last_name,
                    update.email,
                    update.phone,
                    update.city,
                    id,
                ],
            )
        } else {
            self.conn().execute(
                "UPDATE users SET username = ?1, role = ?2, first_name = ?3, last_name = ?4,
                        email = ?5, phone = ?6, city = ?7 WHERE id = ?8",
                params![
                    update.username.as_str(),
                    update.role.as_str(),
                    update.first_name,
                    update.last_name,
                    update.email,
                    update.phone,
                    update.city,
                    id,
                ],
            )
        };
        match changed {
            Ok(0) => Err(StoreError::NotFound("user")),
            Ok(_) => self.user_by_id(id),
            Err(e) if is_unique_violation(&e) => Err(StoreError::Conflict(format!(
                "username {:?} is already taken",
                update.username.as_str()
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Deleting a user nulls their task assignments and report references
    /// (schema SET NULL), but a user who created tasks is protected.
    pub fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        let created: u64 = self.conn().query_row(
            "SELECT COUNT(*) FROM tasks WHERE created_by = ?1",
            params![id],
            |r| r.get(0),
        )?;
        if created > 0 {
            return Err(StoreError::Conflict(
                "user has created tasks and cannot be deleted".to_string(),
            ));
        }
        let deleted = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound("user"));
        }
        Ok(())
    }

    pub fn user_by_id(&self, id: UserId) -> Result<User, StoreError> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
                params![id],
                map_user,
            )
            .optional()?
            .ok_or(StoreError::NotFound("user"))
    }

    pub fn user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
                params![username],
                map_user,
            )
            .optional()?)
    }

    pub fn password_hash(&self, username: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .conn()
            .query_row(
                "SELECT password_hash FROM users WHERE username = ?1",
                params![username],
                |r| r.get(0),
            )
            .optional()?)
    }

    /// The volunteer roster is not role-scoped; both roles may browse it.
    pub fn volunteer_by_id(&self, id: UserId) -> Result<User, StoreError> {
        self.conn()
            .query_row(
                &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1 AND role = 'volunteer'"),
                params![id],
                map_user,
            )
            .optional()?
            .ok_or(StoreError::NotFound("volunteer"))
    }

    pub fn list_volunteers(
        &self,
        search: &VolunteerSearch,
        page: u32,
    ) -> Result<Page<User>, StoreError> {
        let mut where_parts = vec!["role = 'volunteer'".to_string()];
        let mut params_list: Vec<Value> = Vec::new();
        if let Some(username) = search.username.as_deref().filter(|s| !s.is_empty()) {
            where_parts.push("lower(username) LIKE ? ESCAPE '!'".to_string());
            params_list.push(Value::Text(contains_pattern(username)));
        }
        let where_sql = where_parts.join(" AND ");

        let total: u64 = self.conn().query_row(
            &format!("SELECT COUNT(*) FROM users WHERE {where_sql}"),
            params_from_iter(params_list.iter()),
            |r| r.get(0),
        )?;

        params_list.push(Value::Integer(i64::from(PAGE_SIZE)));
        params_list.push(Value::Integer(page_offset(page)));
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE {where_sql} ORDER BY id LIMIT ? OFFSET ?"
        ))?;
        let rows = stmt
            .query_map(params_from_iter(params_list.iter()), map_user)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(rows, page, total))
    }

    pub fn volunteer_stats(&self, id: UserId) -> Result<VolunteerStats, StoreError> {
        // Confirms the id really is a volunteer; otherwise NotFound.
        self.volunteer_by_id(id)?;
        let tasks_count: u64 = self.conn().query_row(
            "SELECT COUNT(*) FROM tasks WHERE assigned_to = ?1",
            params![id],
            |r| r.get(0),
        )?;
        let reports_count: u64 = self.conn().query_row(
            "SELECT COUNT(*) FROM reports WHERE author = ?1",
            params![id],
            |r| r.get(0),
        )?;
        let tasks_completed: u64 = self.conn().query_row(
            "SELECT COUNT(*) FROM tasks WHERE assigned_to = ?1 AND status = 'completed'",
            params![id],
            |r| r.get(0),
        )?;
        let tasks_in_progress: u64 = self.conn().query_row(
            "SELECT COUNT(*) FROM tasks WHERE assigned_to = ?1 AND status = 'in_progress'",
            params![id],
            |r| r.get(0),
        )?;
        Ok(VolunteerStats {
            tasks_count,
            reports_count,
            tasks_completed,
            tasks_in_progress,
        })
    }
}
