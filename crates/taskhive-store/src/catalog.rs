// SPDX-License-Identifier: Apache-2.0

use crate::filters::{contains_pattern, CategorySearch, TagSearch};
use crate::{page_offset, Db, Page, StoreError, PAGE_SIZE};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};
use taskhive_model::{Category, CategoryId, Tag, TagId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDraft {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDraft {
    pub name: String,
}

fn map_category(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

fn map_tag(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

impl Db {
    pub fn create_category(&self, draft: &CategoryDraft) -> Result<Category, StoreError> {
        self.conn().execute(
            "INSERT INTO categories (name, description) VALUES (?1, ?2)",
            params![draft.name, draft.description],
        )?;
        self.category_by_id(self.conn().last_insert_rowid())
    }

    pub fn update_category(
        &self,
        id: CategoryId,
        draft: &CategoryDraft,
    ) -> Result<Category, StoreError> {
        let changed = self.conn().execute(
            "UPDATE categories SET name = ?1, description = ?2 WHERE id = ?3",
            params![draft.name, draft.description, id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound("category"));
        }
        self.category_by_id(id)
    }

    pub fn delete_category(&self, id: CategoryId) -> Result<(), StoreError> {
        let deleted = self
            .conn()
            .execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound("category"));
        }
        Ok(())
    }

    pub fn category_by_id(&self, id: CategoryId) -> Result<Category, StoreError> {
        self.conn()
            .query_row(
                "SELECT id, name, description FROM categories WHERE id = ?1",
                params![id],
                map_category,
            )
            .optional()?
            .ok_or(StoreError::NotFound("category"))
    }

    pub fn list_categories(
        &self,
        search: &CategorySearch,
        page: u32,
    ) -> Result<Page<Category>, StoreError> {
        let mut where_parts: Vec<String> = Vec::new();
        let mut params_list: Vec<Value> = Vec::new();
        if let Some(name) = search.name.as_deref().filter(|s| !s.is_empty()) {
            where_parts.push("lower(name) LIKE ? ESCAPE '!'".to_string());
            params_list.push(Value::Text(contains_pattern(name)));
        }
        let where_sql = if where_parts.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_parts.join(" AND "))
        };

        let total: u64 = self.conn().query_row(
            &format!("SELECT COUNT(*) FROM categories{where_sql}"),
            params_from_iter(params_list.iter()),
            |r| r.get(0),
        )?;

        params_list.push(Value::Integer(i64::from(PAGE_SIZE)));
        params_list.push(Value::Integer(page_offset(page)));
        let mut stmt = self.conn().prepare(&format!(
            "SELECT id, name, description FROM categories{where_sql} ORDER BY id LIMIT ? OFFSET ?"
        ))?;
        let rows = stmt
            .query_map(params_from_iter(params_list.iter()), map_category)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(rows, page, total))
    }

    pub fn create_tag(&self, draft: &TagDraft) -> Result<Tag, StoreError> {
        match self
            .conn()
            .execute("INSERT INTO tags (name) VALUES (?1)", params![draft.name])
        {
            Ok(_) => self.tag_by_id(self.conn().last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Conflict(format!(
                    "tag {:?} already exists",
                    draft.name
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn update_tag(&self, id: TagId, draft: &TagDraft) -> Result<Tag, StoreError> {
        match self.conn().execute(
            "UPDATE tags SET name = ?1 WHERE id = ?2",
            params![draft.name, id],
        ) {
            Ok(0) => Err(StoreError::NotFound("tag")),
            Ok(_) => self.tag_by_id(id),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::Conflict(format!(
                    "tag {:?} already exists",
                    draft.name
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn delete_tag(&self, id: TagId) -> Result<(), StoreError> {
        let deleted = self
            .conn()
            .execute("DELETE FROM tags WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound("tag"));
        }
        Ok(())
    }

    pub fn tag_by_id(&self, id: TagId) -> Result<Tag, StoreError> {
        self.conn()
            .query_row(
                "SELECT id, name FROM tags WHERE id = ?1",
                params![id],
                map_tag,
            )
            .optional()?
            .ok_or(StoreError::NotFound("tag"))
    }

    pub fn list_tags(&self, search: &TagSearch, page: u32) -> Result<Page<Tag>, StoreError> {
        let mut where_parts: Vec<String> = Vec::new();
        let mut params_list: Vec<Value> = Vec::new();
        if let Some(name) = search.name.as_deref().filter(|s| !s.is_empty()) {
            where_parts.push("lower(name) LIKE ? ESCAPE '!'".to_string());
            params_list.push(Value::Text(contains_pattern(name)));
        }
        let where_sql = if where_parts.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", where_parts.join(" AND "))
        };

        let total: u64 = self.conn().query_row(
            &format!("SELECT COUNT(*) FROM tags{where_sql}"),
            params_from_iter(params_list.iter()),
            |r| r.get(0),
        )?;

        params_list.push(Value::Integer(i64::from(PAGE_SIZE)));
        params_list.push(Value::Integer(page_offset(page)));
        let mut stmt = self.conn().prepare(&format!(
            "SELECT id, name FROM tags{where_sql} ORDER BY id LIMIT ? OFFSET ?"
        ))?;
        let rows = stmt
            .query_map(params_from_iter(params_list.iter()), map_tag)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(rows, page, total))
    }
}
