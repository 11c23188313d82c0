//! Storage-level lifecycle tests: create, fetch, update, delete, and the
//! audit trail each of those leaves behind.

mod common;

use chrono::Utc;
use civitrack::error::CivicError;
use civitrack::model::{Status, UpdateType};
use civitrack::storage::{IssueChange, SUBMISSION_NOTE};
use common::{memory_storage, raw_issue};

#[test]
fn create_then_fetch_roundtrip() {
    let mut store = memory_storage();
    let mut issue = raw_issue("cv-round1", "Pothole", Utc::now());
    issue.latitude = Some(40.7128);
    issue.longitude = Some(-74.006);
    issue.reporter_phone = Some("555-0100".to_string());
    store.create_issue(&issue).unwrap();

    let fetched = store.get_issue("cv-round1").unwrap().unwrap();
    assert_eq!(fetched.title, "Pothole");
    assert_eq!(fetched.latitude, Some(40.7128));
    assert_eq!(fetched.reporter_phone.as_deref(), Some("555-0100"));
    assert_eq!(fetched.status, Status::Open);
    // Listings and plain fetches do not load the audit log
    assert!(fetched.updates.is_empty());

    let with_log = store.get_issue_with_updates("cv-round1").unwrap().unwrap();
    assert_eq!(with_log.updates.len(), 1);
    assert_eq!(with_log.updates[0].message, SUBMISSION_NOTE);
}

#[test]
fn status_transition_appends_attributed_entry() {
    let mut store = memory_storage();
    store
        .create_issue(&raw_issue("cv-s1", "Streetlight", Utc::now()))
        .unwrap();

    let change = IssueChange {
        status: Some(Status::InProgress),
        ..IssueChange::default()
    };
    let updated = store.apply_update("cv-s1", &change, Some("usr-7")).unwrap();
    assert_eq!(updated.status, Status::InProgress);
    assert!(updated.resolved_at.is_none());

    let updates = store.list_updates("cv-s1").unwrap();
    assert_eq!(updates.len(), 2);
    let entry = &updates[1];
    assert_eq!(entry.update_type, UpdateType::StatusChange);
    assert_eq!(entry.message, "Status changed from open to in_progress");
    assert_eq!(entry.user_id.as_deref(), Some("usr-7"));
}

#[test]
fn same_status_writes_no_entry() {
    let mut store = memory_storage();
    store
        .create_issue(&raw_issue("cv-s2", "Garbage", Utc::now()))
        .unwrap();

    let change = IssueChange {
        status: Some(Status::Open),
        ..IssueChange::default()
    };
    store.apply_update("cv-s2", &change, Some("usr-7")).unwrap();
    assert_eq!(store.list_updates("cv-s2").unwrap().len(), 1);
}

#[test]
fn priority_and_assignment_entries() {
    let mut store = memory_storage();
    store
        .create_issue(&raw_issue("cv-p1", "Water", Utc::now()))
        .unwrap();

    let change = IssueChange {
        priority: Some("high".to_string()),
        assigned_volunteer_id: Some(Some("vol-3".to_string())),
        admin_notes: Some("crew dispatched".to_string()),
        ..IssueChange::default()
    };
    let updated = store.apply_update("cv-p1", &change, Some("usr-2")).unwrap();
    assert_eq!(updated.priority, "high");
    assert_eq!(updated.assigned_volunteer_id.as_deref(), Some("vol-3"));
    assert_eq!(updated.admin_notes.as_deref(), Some("crew dispatched"));

    let updates = store.list_updates("cv-p1").unwrap();
    let messages: Vec<&str> = updates.iter().map(|u| u.message.as_str()).collect();
    assert!(messages.contains(&"Priority changed from medium to high"));
    assert!(messages.contains(&"Issue assigned to volunteer vol-3"));
    assert!(messages.contains(&"Admin notes updated"));
    assert_eq!(updates.len(), 4);

    // Clearing the assignment is observable too
    let clear = IssueChange {
        assigned_volunteer_id: Some(None),
        ..IssueChange::default()
    };
    let cleared = store.apply_update("cv-p1", &clear, Some("usr-2")).unwrap();
    assert!(cleared.assigned_volunteer_id.is_none());
    let updates = store.list_updates("cv-p1").unwrap();
    assert_eq!(updates.last().unwrap().message, "Volunteer assignment cleared");
}

#[test]
fn notes_change_leaves_an_admin_entry() {
    let mut store = memory_storage();
    store
        .create_issue(&raw_issue("cv-n1", "Graffiti", Utc::now()))
        .unwrap();

    let change = IssueChange {
        admin_notes: Some("crew dispatched".to_string()),
        ..IssueChange::default()
    };
    store.apply_update("cv-n1", &change, Some("usr-4")).unwrap();

    let updates = store.list_updates("cv-n1").unwrap();
    assert_eq!(updates.len(), 2);
    let entry = updates.last().unwrap();
    assert_eq!(entry.update_type, UpdateType::AdminUpdate);
    assert_eq!(entry.message, "Admin notes updated");
    assert_eq!(entry.user_id.as_deref(), Some("usr-4"));

    // Writing the same notes again changes nothing, so no new entry
    store.apply_update("cv-n1", &change, Some("usr-4")).unwrap();
    assert_eq!(store.list_updates("cv-n1").unwrap().len(), 2);
}

#[test]
fn resolved_at_survives_reopen() {
    let mut store = memory_storage();
    store
        .create_issue(&raw_issue("cv-r1", "Pothole", Utc::now()))
        .unwrap();

    let resolve = IssueChange {
        status: Some(Status::Resolved),
        ..IssueChange::default()
    };
    let stamp = store
        .apply_update("cv-r1", &resolve, Some("usr-1"))
        .unwrap()
        .resolved_at
        .unwrap();

    let reopen = IssueChange {
        status: Some(Status::Open),
        ..IssueChange::default()
    };
    let reopened = store.apply_update("cv-r1", &reopen, Some("usr-1")).unwrap();
    assert_eq!(reopened.status, Status::Open);
    assert_eq!(reopened.resolved_at, Some(stamp));
}

#[test]
fn delete_removes_issue_and_audit_log() {
    let mut store = memory_storage();
    let mut issue = raw_issue("cv-d1", "Pothole", Utc::now());
    issue.photo_path = Some("uploads/d1.jpg".to_string());
    store.create_issue(&issue).unwrap();
    store
        .apply_update(
            "cv-d1",
            &IssueChange {
                status: Some(Status::InProgress),
                ..IssueChange::default()
            },
            Some("usr-1"),
        )
        .unwrap();

    let photo = store.delete_issue("cv-d1").unwrap();
    assert_eq!(photo.as_deref(), Some("uploads/d1.jpg"));
    assert!(store.get_issue("cv-d1").unwrap().is_none());
    assert!(store.list_updates("cv-d1").unwrap().is_empty());

    let err = store.delete_issue("cv-d1").unwrap_err();
    assert!(matches!(err, CivicError::IssueNotFound { .. }));
}

#[test]
fn failed_update_leaves_no_trace() {
    let mut store = memory_storage();
    let err = store
        .apply_update(
            "cv-ghost",
            &IssueChange {
                status: Some(Status::Resolved),
                ..IssueChange::default()
            },
            Some("usr-1"),
        )
        .unwrap_err();
    assert!(matches!(err, CivicError::IssueNotFound { .. }));
    assert!(store.list_updates("cv-ghost").unwrap().is_empty());
}
