// thread_flow.rs — Integration tests for notes, replies, and fan-out.
//
// Runs the discussion service against a tempfile SQLite store and the
// mock push transport:
//
//   - add note → add reply → mark read leaves the user in every readBy
//   - mark read twice adds nothing
//   - the actor never receives their own notification
//   - one recipient's delivery failure stops neither the other
//     recipients nor the note itself

use std::sync::Arc;

use chrono::Utc;
use tempfile::tempdir;

use ops_discussion::DiscussionService;
use ops_model::{ProjectDetails, Report, ReportDetails, ReportType, Role, Team, User};
use ops_notify::{mock::MockTransport, DeliveryFailure, NotificationService};
use ops_store::Store;

struct Fixture {
    _dir: tempfile::TempDir,
    store: Store,
    transport: Arc<MockTransport>,
    service: DiscussionService,
}

fn fixture() -> Fixture {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path().join("ops.db")).unwrap();
    let transport = Arc::new(MockTransport::new());
    let notifier = NotificationService::new(store.clone(), Some(transport.clone()));
    let service = DiscussionService::new(store.clone(), notifier);

    for (id, role) in [
        ("owner", Role::Employee),
        ("admin1", Role::Admin),
        ("admin2", Role::Admin),
        ("lead", Role::TeamLead),
    ] {
        store
            .insert_user(&User {
                id: id.into(),
                username: id.into(),
                display_name: id.to_uppercase(),
                role,
                branch_id: None,
                can_import: false,
                can_export: false,
                credential: "x".into(),
                allowed_report_types: vec![],
            })
            .unwrap();
    }
    store
        .insert_team(&Team {
            id: "t1".into(),
            name: "Site A".into(),
            leader_id: "lead".into(),
        })
        .unwrap();
    store
        .insert_report(&Report {
            id: "r1".into(),
            employee_id: "owner".into(),
            branch_id: None,
            team_id: Some("t1".into()),
            report_type: ReportType::Project,
            details: ReportDetails::Project(ProjectDetails::default()),
            status: "open".into(),
            evaluation: None,
            modifications: vec![],
            workflow_status: None,
            admin_notes: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
        .unwrap();

    Fixture {
        _dir: dir,
        store,
        transport,
        service,
    }
}

#[tokio::test]
async fn note_reply_mark_read_leaves_user_everywhere() {
    let fx = fixture();

    let note = fx
        .service
        .add_note("r1", "admin1", "ADMIN1", "please re-check")
        .await
        .unwrap();
    fx.service
        .add_reply("r1", note.id, "owner", "OWNER", "done")
        .await
        .unwrap();

    fx.service.mark_read("r1", "lead").unwrap();
    fx.service.mark_read("r1", "lead").unwrap(); // idempotent

    let report = fx.store.get_report("r1").unwrap();
    for note in &report.admin_notes {
        assert_eq!(note.read_by.iter().filter(|r| *r == "lead").count(), 1);
        for reply in &note.replies {
            assert_eq!(reply.read_by.iter().filter(|r| *r == "lead").count(), 1);
        }
    }
}

#[tokio::test]
async fn authors_read_their_own_entries_from_creation() {
    let fx = fixture();
    let note = fx
        .service
        .add_note("r1", "admin1", "ADMIN1", "first")
        .await
        .unwrap();
    let reply = fx
        .service
        .add_reply("r1", note.id, "owner", "OWNER", "ack")
        .await
        .unwrap();

    assert!(note.read_by.contains(&"admin1".to_string()));
    assert!(reply.read_by.contains(&"owner".to_string()));
}

#[tokio::test]
async fn note_fans_out_to_owner_admins_and_lead_but_not_actor() {
    let fx = fixture();
    fx.service
        .add_note("r1", "admin1", "ADMIN1", "note body")
        .await
        .unwrap();

    // admin1 acted, so: owner, admin2, lead.
    for expected in ["owner", "admin2", "lead"] {
        assert_eq!(
            fx.store.list_notifications(expected).unwrap().len(),
            1,
            "expected one notification for {expected}"
        );
    }
    assert!(fx.store.list_notifications("admin1").unwrap().is_empty());
}

#[tokio::test]
async fn reply_notifies_thread_participants() {
    let fx = fixture();
    let note = fx
        .service
        .add_note("r1", "owner", "OWNER", "anyone?")
        .await
        .unwrap();
    fx.service
        .add_reply("r1", note.id, "admin1", "ADMIN1", "looking")
        .await
        .unwrap();
    fx.service
        .add_reply("r1", note.id, "admin2", "ADMIN2", "fixed")
        .await
        .unwrap();

    // owner was the actor for the note, so only the two replies reach
    // them (and only once each, despite matching as owner AND note
    // author).
    assert_eq!(fx.store.list_notifications("owner").unwrap().len(), 2);
    // admin2: the note and reply1, but not their own reply2.
    assert_eq!(fx.store.list_notifications("admin2").unwrap().len(), 2);
    // lead is on every event for this teamed project report.
    assert_eq!(fx.store.list_notifications("lead").unwrap().len(), 3);
}

#[tokio::test]
async fn reply_to_missing_note_is_not_found() {
    let fx = fixture();
    let err = fx
        .service
        .add_reply("r1", uuid::Uuid::new_v4(), "owner", "OWNER", "hello?")
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let err = fx
        .service
        .add_note("missing", "owner", "OWNER", "hello?")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn one_recipients_failure_is_isolated() {
    let fx = fixture();
    // owner's device is dead; admin2 and lead have live devices.
    fx.store.upsert_device_token("owner", "tok-owner").unwrap();
    fx.store.upsert_device_token("admin2", "tok-admin2").unwrap();
    fx.store.upsert_device_token("lead", "tok-lead").unwrap();
    fx.transport
        .fail_token("tok-owner", DeliveryFailure::UnregisteredToken);

    let note = fx
        .service
        .add_note("r1", "admin1", "ADMIN1", "note body")
        .await
        .unwrap();

    // The note committed despite the failure.
    let report = fx.store.get_report("r1").unwrap();
    assert_eq!(report.admin_notes.len(), 1);
    assert_eq!(report.admin_notes[0].id, note.id);

    // All three recipients got a push attempt (three independent sends).
    assert_eq!(fx.transport.send_count(), 3);

    // Every recipient still has the persisted in-app row.
    for recipient in ["owner", "admin2", "lead"] {
        assert_eq!(fx.store.list_notifications(recipient).unwrap().len(), 1);
    }

    // The dead registration was pruned; live ones remain.
    assert!(fx.store.device_tokens_for_user("owner").unwrap().is_empty());
    assert_eq!(fx.store.device_tokens_for_user("admin2").unwrap().len(), 1);
}
