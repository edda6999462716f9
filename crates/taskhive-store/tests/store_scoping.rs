// SPDX-License-Identifier: Apache-2.0

//! Visibility scopes are compiled into the queries themselves, so a
//! record outside a volunteer's scope behaves exactly like a missing one.

use chrono::{NaiveDate, TimeZone, Utc};
use taskhive_model::{Role, TaskStatus, UserId, Username};
use taskhive_policies::{ReportScope, TaskScope};
use taskhive_store::{Db, ReportDraft, ReportSearch, StoreError, TaskDraft, TaskSearch, UserDraft};

fn seed(db: &Db, username: &str, role: Role) -> UserId {
    db.create_user(&UserDraft {
        username: Username::parse(username).unwrap(),
        password_hash: "x".to_string(),
        role,
        first_name: String::new(),
        last_name: String::new(),
        email: None,
        phone: None,
        city: "Springfield".to_string(),
    })
    .unwrap()
    .id
}

fn assigned_task(db: &Db, coord: UserId, assignee: Option<UserId>, title: &str) -> i64 {
    db.create_task(&TaskDraft {
        title: title.to_string(),
        description: String::new(),
        created_by: coord,
        assigned_to: assignee,
        status: TaskStatus::Active,
        deadline: None,
        category_id: None,
        tag_ids: Vec::new(),
    })
    .unwrap()
    .id
}

#[test]
fn assigned_scope_hides_other_tasks() {
    let db = Db::open_in_memory().unwrap();
    let coord = seed(&db, "coord", Role::Coordinator);
    let sam = seed(&db, "sam", Role::Volunteer);
    let kim = seed(&db, "kim", Role::Volunteer);
    let mine = assigned_task(&db, coord, Some(sam), "mine");
    let theirs = assigned_task(&db, coord, Some(kim), "theirs");
    assigned_task(&db, coord, None, "nobody's");

    let page = db
        .list_tasks(TaskScope::AssignedTo(sam), &TaskSearch::default(), 1)
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.rows[0].id, mine);

    db.task_by_id(TaskScope::AssignedTo(sam), mine).unwrap();
    let err = db.task_by_id(TaskScope::AssignedTo(sam), theirs).unwrap_err();
    assert!(matches!(err, StoreError::NotFound("task")), "{err}");
}

#[test]
fn authored_scope_hides_other_reports() {
    let db = Db::open_in_memory().unwrap();
    let coord = seed(&db, "coord", Role::Coordinator);
    let sam = seed(&db, "sam", Role::Volunteer);
    let kim = seed(&db, "kim", Role::Volunteer);
    let sam_task = assigned_task(&db, coord, Some(sam), "sam's");
    let kim_task = assigned_task(&db, coord, Some(kim), "kim's");

    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let sam_report = db
        .create_report(
            &ReportDraft {
                comment: "a".to_string(),
                author: sam,
                task_id: sam_task,
            },
            now,
        )
        .unwrap();
    let kim_report = db
        .create_report(
            &ReportDraft {
                comment: "b".to_string(),
                author: kim,
                task_id: kim_task,
            },
            now,
        )
        .unwrap();

    let page = db
        .list_reports(ReportScope::AuthoredBy(sam), &ReportSearch::default(), 1)
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.rows[0].report.id, sam_report.report.id);

    let err = db
        .report_by_id(ReportScope::AuthoredBy(sam), kim_report.report.id)
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound("report")), "{err}");
}

#[test]
fn report_rows_carry_author_and_task_names() {
    let db = Db::open_in_memory().unwrap();
    let coord = seed(&db, "coord", Role::Coordinator);
    let sam = seed(&db, "sam", Role::Volunteer);
    let task = assigned_task(&db, coord, Some(sam), "mow lawn");
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
    let row = db
        .create_report(
            &ReportDraft {
                comment: "done".to_string(),
                author: sam,
                task_id: task,
            },
            now,
        )
        .unwrap();
    assert_eq!(row.author_username.as_deref(), Some("sam"));
    assert_eq!(row.task_title, "mow lawn");

    // Deleting the author keeps the report but drops the name.
    db.delete_user(sam).unwrap();
    let row = db.report_by_id(ReportScope::All, row.report.id).unwrap();
    assert_eq!(row.report.author, None);
    assert_eq!(row.author_username, None);
}

#[test]
fn report_search_matches_created_date() {
    let db = Db::open_in_memory().unwrap();
    let coord = seed(&db, "coord", Role::Coordinator);
    let sam = seed(&db, "sam", Role::Volunteer);
    let task = assigned_task(&db, coord, Some(sam), "mow lawn");

    let may = Utc.with_ymd_and_hms(2024, 5, 1, 23, 30, 0).unwrap();
    let june = Utc.with_ymd_and_hms(2024, 6, 2, 0, 30, 0).unwrap();
    db.create_report(
        &ReportDraft {
            comment: "may".to_string(),
            author: sam,
            task_id: task,
        },
        may,
    )
    .unwrap();
    db.create_report(
        &ReportDraft {
            comment: "june".to_string(),
            author: sam,
            task_id: task,
        },
        june,
    )
    .unwrap();

    let page = db
        .list_reports(
            ReportScope::All,
            &ReportSearch {
                created_date: NaiveDate::from_ymd_opt(2024, 5, 1),
                ..ReportSearch::default()
            },
            1,
        )
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.rows[0].report.comment, "may");
}

#[test]
fn dashboards_count_by_role_and_assignment() {
    let db = Db::open_in_memory().unwrap();
    let coord = seed(&db, "coord", Role::Coordinator);
    let sam = seed(&db, "sam", Role::Volunteer);
    seed(&db, "kim", Role::Volunteer);

    let cat = db
        .create_category(&taskhive_store::CategoryDraft {
            name: "garden".to_string(),
            description: String::new(),
        })
        .unwrap();
    let mut draft = TaskDraft {
        title: "mow".to_string(),
        description: String::new(),
        created_by: coord,
        assigned_to: Some(sam),
        status: TaskStatus::InProgress,
        deadline: None,
        category_id: Some(cat.id),
        tag_ids: Vec::new(),
    };
    db.create_task(&draft).unwrap();
    draft.title = "paint".to_string();
    draft.assigned_to = None;
    draft.status = TaskStatus::Active;
    draft.category_id = None;
    db.create_task(&draft).unwrap();

    let summary = db.coordinator_summary().unwrap();
    assert_eq!(summary.num_volunteers, 2);
    assert_eq!(summary.num_tasks, 2);
    assert_eq!(summary.num_categories, 1);
    assert_eq!(summary.num_reports, 0);
    assert!(summary
        .status_counts
        .contains(&(TaskStatus::InProgress, 1)));

    let mine = db.volunteer_summary(sam).unwrap();
    assert_eq!(mine.num_tasks, 1);
    assert_eq!(mine.num_categories, 1);

    let stats = db.volunteer_stats(sam).unwrap();
    assert_eq!(stats.tasks_count, 1);
    assert_eq!(stats.tasks_in_progress, 1);
    assert_eq!(stats.tasks_completed, 0);
    assert_eq!(stats.reports_count, 0);
}
