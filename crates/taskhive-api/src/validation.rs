// SPDX-License-Identifier: Apache-2.0

//! Form validation with per-field errors. All failing fields are
//! reported in one pass, not just the first.

use chrono::{DateTime, Utc};
use serde::Serialize;
use taskhive_model::{
    CategoryId, ParseError, TagId, TaskStatus, UserId, Username, CITY_MAX_LEN, COMMENT_MAX_LEN,
    DESCRIPTION_MAX_LEN, NAME_MAX_LEN, PHONE_MAX_LEN, TITLE_MAX_LEN,
};
use taskhive_store::{CategoryDraft, TagDraft};

use crate::dto::{CategoryPayload, TagPayload, TaskPayload, VolunteerPayload};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl From<ParseError> for FieldError {
    fn from(e: ParseError) -> Self {
        Self::new(e.field(), e.to_string())
    }
}

/// A volunteer form that passed validation; the password is still
/// plaintext here, hashing happens at the auth layer.
#[derive(Debug, Clone)]
pub struct ValidatedVolunteer {
    pub username: Username,
    pub password: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: String,
}

#[derive(Debug, Clone)]
pub struct ValidatedTask {
    pub title: String,
    pub description: String,
    pub assigned_to: Option<UserId>,
    pub status: TaskStatus,
    pub deadline: Option<DateTime<Utc>>,
    pub category_id: Option<CategoryId>,
    pub tag_ids: Vec<TagId>,
}

fn check_len(
    errors: &mut Vec<FieldError>,
    field: &'static str,
    value: &str,
    max: usize,
    required: bool,
) {
    let trimmed = value.trim();
    if required && trimmed.is_empty() {
        errors.push(FieldError::new(field, "must not be empty"));
    } else if value.chars().count() > max {
        errors.push(FieldError::new(field, format!("longer than {max} characters")));
    }
}

fn finish<T>(errors: Vec<FieldError>, value: T) -> Result<T, Vec<FieldError>> {
    if errors.is_empty() {
        Ok(value)
    } else {
        Err(errors)
    }
}

pub fn validate_volunteer(
    payload: &VolunteerPayload,
    require_password: bool,
) -> Result<ValidatedVolunteer, Vec<FieldError>> {
    let mut errors = Vec::new();
    let username = match Username::parse(&payload.username) {
        Ok(u) => Some(u),
        Err(e) => {
            errors.push(e.into());
            None
        }
    };
    let password = payload
        .password
        .as_deref()
        .map(str::to_string)
        .filter(|p| !p.is_empty());
    if require_password && password.is_none() {
        errors.push(FieldError::new("password", "must not be empty"));
    }
    if let Some(email) = payload.email.as_deref().filter(|e| !e.is_empty()) {
        if !email.contains('@') {
            errors.push(FieldError::new("email", "not a valid address"));
        }
    }
    if let Some(phone) = payload.phone.as_deref() {
        if phone.chars().count() > PHONE_MAX_LEN {
            errors.push(FieldError::new(
                "phone",
                format!("longer than {PHONE_MAX_LEN} characters"),
            ));
        }
    }
    check_len(&mut errors, "city", &payload.city, CITY_MAX_LEN, false);

    let Some(username) = username else {
        return Err(errors);
    };
    finish(
        errors,
        ValidatedVolunteer {
            username,
            password,
            first_name: payload.first_name.clone(),
            last_name: payload.last_name.clone(),
            email: payload.email.clone().filter(|e| !e.is_empty()),
            phone: payload.phone.clone().filter(|p| !p.is_empty()),
            city: payload.city.clone(),
        },
    )
}

pub fn validate_category(payload: &CategoryPayload) -> Result<CategoryDraft, Vec<FieldError>> {
    let mut errors = Vec::new();
    check_len(&mut errors, "name", &payload.name, NAME_MAX_LEN, true);
    check_len(
        &mut errors,
        "description",
        &payload.description,
        DESCRIPTION_MAX_LEN,
        false,
    );
    finish(
        errors,
        CategoryDraft {
            name: payload.name.clone(),
            description: payload.description.clone(),
        },
    )
}

pub fn validate_tag(payload: &TagPayload) -> Result<TagDraft, Vec<FieldError>> {
    let mut errors = Vec::new();
    check_len(&mut errors, "name", &payload.name, NAME_MAX_LEN, true);
    finish(
        errors,
        TagDraft {
            name: payload.name.clone(),
        },
    )
}

pub fn validate_task(payload: &TaskPayload) -> Result<ValidatedTask, Vec<FieldError>> {
    let mut errors = Vec::new();
    check_len(&mut errors, "title", &payload.title, TITLE_MAX_LEN, true);
    check_len(
        &mut errors,
        "description",
        &payload.description,
        DESCRIPTION_MAX_LEN,
        false,
    );
    let status = match payload.status.as_deref() {
        None => TaskStatus::default(),
        Some(raw) => match TaskStatus::parse(raw) {
            Ok(s) => s,
            Err(_) => {
                errors.push(FieldError::new("status", format!("unknown status {raw:?}")));
                TaskStatus::default()
            }
        },
    };
    finish(
        errors,
        ValidatedTask {
            title: payload.title.clone(),
            description: payload.description.clone(),
            assigned_to: payload.assigned_to,
            status,
            deadline: payload.deadline,
            category_id: payload.category_id,
            tag_ids: payload.tag_ids.clone(),
        },
    )
}

pub fn validate_report_comment(comment: &str) -> Result<String, Vec<FieldError>> {
    let mut errors = Vec::new();
    check_len(&mut errors, "comment", comment, COMMENT_MAX_LEN, true);
    finish(errors, comment.to_string())
}
