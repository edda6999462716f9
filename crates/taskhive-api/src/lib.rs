#![forbid(unsafe_code)]
//! Wire contract for the taskhive HTTP API: error taxonomy with stable
//! codes, request/response DTOs, query-parameter parsing, and form
//! validation with per-field errors.

mod dto;
mod error_mapping;
mod errors;
mod params;
mod validation;

pub use dto::{
    CategoryPayload, LoginPayload, LoginResponse, ReportCreatePayload, ReportUpdatePayload,
    TagPayload, TaskPayload, VolunteerDetailResponse, VolunteerPayload,
};
pub use error_mapping::{denied_error, store_error};
pub use errors::{ApiError, ApiErrorCode};
pub use params::{
    parse_category_search, parse_page, parse_report_search, parse_tag_search, parse_task_search,
    parse_volunteer_search,
};
pub use validation::{
    validate_category, validate_report_comment, validate_tag, validate_task, validate_volunteer,
    FieldError, ValidatedTask, ValidatedVolunteer,
};

pub const CRATE_NAME: &str = "taskhive-api";
