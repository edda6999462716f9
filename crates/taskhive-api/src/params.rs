// SPDX-License-Identifier: Apache-2.0

//! Query-string parsing for list routes. Search criteria are lenient:
//! an absent, empty, or unparseable value simply does not filter.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use taskhive_model::TaskStatus;
use taskhive_store::{CategorySearch, ReportSearch, TagSearch, TaskSearch, VolunteerSearch};

fn text(query: &BTreeMap<String, String>, key: &str) -> Option<String> {
    query
        .get(key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn id(query: &BTreeMap<String, String>, key: &str) -> Option<i64> {
    query.get(key).and_then(|raw| raw.trim().parse().ok())
}

#[must_use]
pub fn parse_page(query: &BTreeMap<String, String>) -> u32 {
    query
        .get("page")
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1)
}

#[must_use]
pub fn parse_volunteer_search(query: &BTreeMap<String, String>) -> VolunteerSearch {
    VolunteerSearch {
        username: text(query, "username"),
    }
}

#[must_use]
pub fn parse_category_search(query: &BTreeMap<String, String>) -> CategorySearch {
    CategorySearch {
        name: text(query, "name"),
    }
}

#[must_use]
pub fn parse_tag_search(query: &BTreeMap<String, String>) -> TagSearch {
    TagSearch {
        name: text(query, "name"),
    }
}

#[must_use]
pub fn parse_task_search(query: &BTreeMap<String, String>) -> TaskSearch {
    TaskSearch {
        title: text(query, "title"),
        status: query
            .get("status")
            .and_then(|raw| TaskStatus::parse(raw.trim()).ok()),
        category_id: id(query, "category"),
        tag_id: id(query, "tag"),
        assigned_to: id(query, "assigned_to"),
    }
}

#[must_use]
pub fn parse_report_search(query: &BTreeMap<String, String>) -> ReportSearch {
    ReportSearch {
        author: text(query, "author"),
        author_id: id(query, "author_id"),
        created_date: query
            .get("created_date")
            .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()),
    }
}
