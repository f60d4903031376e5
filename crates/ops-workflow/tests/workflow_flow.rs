// workflow_flow.rs — Integration tests for the package and stage machines.
//
// Exercises the full engine against a real (tempfile) SQLite store and the
// in-memory media store:
//
//   - every package action writes its exact status/progress pair,
//     regardless of the prior state (documented unguarded behavior)
//   - deletes cascade to attachments and audit entries
//   - stage confirmation mutates the typed Project details
//   - unknown stage ids fail without touching the report
//   - a failed upload in a batch aborts the whole transition

use std::sync::Arc;

use chrono::Utc;
use tempfile::tempdir;

use ops_media::{MemoryMediaStore, UploadPayload};
use ops_model::{
    PackageStatus, Priority, ProjectDetails, Report, ReportDetails, ReportType, Role, StageUpdate,
    User, WorkflowStatus,
};
use ops_store::Store;
use ops_workflow::{CreatePackage, PackageAction, WorkflowEngine, WorkflowError};

struct Fixture {
    _dir: tempfile::TempDir,
    store: Store,
    media: Arc<MemoryMediaStore>,
    engine: WorkflowEngine,
}

fn fixture() -> Fixture {
    let dir = tempdir().unwrap();
    let store = Store::open(dir.path().join("ops.db")).unwrap();
    let media = Arc::new(MemoryMediaStore::new());
    let engine = WorkflowEngine::new(store.clone(), media.clone());

    store
        .insert_user(&User {
            id: "u1".into(),
            username: "amal".into(),
            display_name: "Amal".into(),
            role: Role::Employee,
            branch_id: None,
            can_import: false,
            can_export: false,
            credential: "x".into(),
            allowed_report_types: vec![],
        })
        .unwrap();

    Fixture {
        _dir: dir,
        store,
        media,
        engine,
    }
}

fn create_request(engine: &WorkflowEngine, is_paid: bool) -> String {
    engine
        .create_package(CreatePackage {
            employee_id: "u1".into(),
            title: "Spare parts".into(),
            description: None,
            customer_name: "Harbor Co".into(),
            customer_phone: Some("555-0101".into()),
            priority: Priority::Medium,
            metadata: serde_json::Map::new(),
            is_paid,
        })
        .unwrap()
        .request
        .id
}

fn payload(name: &str) -> UploadPayload {
    UploadPayload {
        name: name.into(),
        bytes: b"bytes".to_vec(),
    }
}

fn project_report(id: &str) -> Report {
    Report {
        id: id.into(),
        employee_id: "u1".into(),
        branch_id: None,
        team_id: None,
        report_type: ReportType::Project,
        details: ReportDetails::Project(ProjectDetails {
            stage_updates: vec![StageUpdate {
                id: "concreteWorks".into(),
                name: Some("Concrete works".into()),
                completed: false,
                completed_at: None,
                comment: None,
                files: vec![],
            }],
            ..Default::default()
        }),
        status: "open".into(),
        evaluation: None,
        modifications: vec![],
        workflow_status: None,
        admin_notes: vec![],
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn every_action_writes_its_exact_pair_regardless_of_prior_state() {
    let fx = fixture();

    let cases = [
        (PackageAction::ConfirmPayment, PackageStatus::PaymentConfirmed, 20u8),
        (PackageAction::Start, PackageStatus::Processing, 50),
        (PackageAction::MarkReady, PackageStatus::ReadyForDelivery, 75),
        (PackageAction::ConfirmDelivery, PackageStatus::Delivered, 100),
    ];

    // Apply each action to a brand-new request: no guard rejects the jump.
    for (action, status, progress) in cases {
        let id = create_request(&fx.engine, false);
        let view = fx
            .engine
            .apply_action(&id, action, "amal", Some("ok".into()), vec![])
            .await
            .unwrap();
        assert_eq!(view.request.status, status);
        assert_eq!(view.request.progress, progress);
        assert_eq!(view.logs.len(), 1);
        assert_eq!(view.logs[0].action, action.audit_kind());
    }

    // And backwards: confirm-payment on a delivered request still lands
    // on PaymentConfirmed/20.
    let id = create_request(&fx.engine, false);
    fx.engine
        .apply_action(&id, PackageAction::ConfirmDelivery, "amal", None, vec![])
        .await
        .unwrap();
    let view = fx
        .engine
        .apply_action(&id, PackageAction::ConfirmPayment, "amal", None, vec![])
        .await
        .unwrap();
    assert_eq!(view.request.status, PackageStatus::PaymentConfirmed);
    assert_eq!(view.request.progress, 20);
}

#[tokio::test]
async fn paid_creation_starts_at_payment_confirmed_ten() {
    let fx = fixture();
    let id = create_request(&fx.engine, true);
    let view = fx.store.get_package_view(&id).unwrap();
    assert_eq!(view.request.status, PackageStatus::PaymentConfirmed);
    assert_eq!(view.request.progress, 10);

    let id = create_request(&fx.engine, false);
    let view = fx.store.get_package_view(&id).unwrap();
    assert_eq!(view.request.status, PackageStatus::New);
    assert_eq!(view.request.progress, 0);
}

#[tokio::test]
async fn unknown_actor_fails_with_not_found() {
    let fx = fixture();
    let id = create_request(&fx.engine, false);
    let err = fx
        .engine
        .apply_action(&id, PackageAction::Start, "ghost", None, vec![])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn delete_cascades_to_attachments_and_logs() {
    let fx = fixture();
    let id = create_request(&fx.engine, false);
    fx.engine
        .apply_action(
            &id,
            PackageAction::ConfirmPayment,
            "amal",
            None,
            vec![payload("receipt.pdf")],
        )
        .await
        .unwrap();

    let (attachments, logs) = fx.store.count_package_children(&id).unwrap();
    assert_eq!(attachments, 1);
    assert_eq!(logs, 1);

    fx.engine.delete_package(&id).unwrap();
    let (attachments, logs) = fx.store.count_package_children(&id).unwrap();
    assert_eq!(attachments, 0);
    assert_eq!(logs, 0);

    // Deleting again is NotFound.
    assert!(fx.engine.delete_package(&id).unwrap_err().is_not_found());
}

#[tokio::test]
async fn failed_upload_aborts_whole_transition() {
    let fx = fixture();
    let id = create_request(&fx.engine, false);
    fx.media.fail_uploads_matching("waybill");

    let err = fx
        .engine
        .apply_action(
            &id,
            PackageAction::MarkReady,
            "amal",
            None,
            vec![payload("packing-list.pdf"), payload("waybill.pdf")],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Upload(_)));

    // No attachment rows for either file, status/progress untouched.
    let view = fx.store.get_package_view(&id).unwrap();
    assert!(view.attachments.is_empty());
    assert!(view.logs.is_empty());
    assert_eq!(view.request.status, PackageStatus::New);
    assert_eq!(view.request.progress, 0);
}

#[tokio::test]
async fn concrete_works_confirmation_completes_stage_and_sets_status() {
    let fx = fixture();
    fx.store.insert_report(&project_report("r1")).unwrap();

    let report = fx
        .engine
        .confirm_stage("r1", "concreteWorks", Some("poured".into()), "amal", vec![])
        .await
        .unwrap();

    let entry = report.details.as_project().unwrap().stage("concreteWorks").unwrap();
    assert!(entry.completed);
    assert!(entry.completed_at.is_some());
    assert_eq!(report.workflow_status, Some(WorkflowStatus::ConcreteWorksDone));
}

#[tokio::test]
async fn technical_completion_overwrites_files_and_clears_legacy_field() {
    let fx = fixture();
    let mut report = project_report("r1");
    if let ReportDetails::Project(details) = &mut report.details {
        details.pending_snag_list = Some(serde_json::json!(["loose rail"]));
    }
    fx.store.insert_report(&report).unwrap();

    let report = fx
        .engine
        .confirm_stage(
            "r1",
            "technicalCompletion",
            None,
            "amal",
            vec![payload("certificate.pdf")],
        )
        .await
        .unwrap();

    let details = report.details.as_project().unwrap();
    let entry = details.stage("installationComplete").unwrap();
    assert!(entry.completed);
    assert_eq!(entry.files.len(), 1);
    assert!(details.pending_snag_list.is_none());
    assert_eq!(report.workflow_status, Some(WorkflowStatus::TechnicallyCompleted));
}

#[tokio::test]
async fn unknown_stage_id_fails_and_leaves_report_unmodified() {
    let fx = fixture();
    fx.store.insert_report(&project_report("r1")).unwrap();
    let before = fx.store.get_report("r1").unwrap();

    let err = fx
        .engine
        .confirm_stage("r1", "unknown_stage", None, "amal", vec![])
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());

    let after = fx.store.get_report("r1").unwrap();
    assert_eq!(
        serde_json::to_value(&before.details).unwrap(),
        serde_json::to_value(&after.details).unwrap()
    );
    assert_eq!(after.workflow_status, None);
    assert_eq!(after.updated_at, before.updated_at);
}

#[tokio::test]
async fn workflow_docs_append_without_status_change() {
    let fx = fixture();
    fx.store.insert_report(&project_report("r1")).unwrap();

    let report = fx
        .engine
        .confirm_stage("r1", "workflowDocs", None, "amal", vec![payload("permit.pdf")])
        .await
        .unwrap();

    let details = report.details.as_project().unwrap();
    assert_eq!(details.documents.len(), 1);
    assert_eq!(report.workflow_status, None);
}

#[tokio::test]
async fn exceptions_require_project_reports() {
    let fx = fixture();
    let mut report = project_report("r2");
    report.report_type = ReportType::Sales;
    report.details = ReportDetails::Sales(serde_json::Map::new());
    fx.store.insert_report(&report).unwrap();

    let err = fx
        .engine
        .add_exception("r2", "damaged crate".into(), "amal", vec![])
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());

    let err = fx
        .engine
        .add_exception("missing", "damaged crate".into(), "amal", vec![])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn exception_appends_to_project_log() {
    let fx = fixture();
    fx.store.insert_report(&project_report("r1")).unwrap();

    let report = fx
        .engine
        .add_exception("r1", "damaged crate".into(), "amal", vec![payload("photo.jpg")])
        .await
        .unwrap();

    let exceptions = &report.details.as_project().unwrap().exceptions;
    assert_eq!(exceptions.len(), 1);
    assert_eq!(exceptions[0].comment, "damaged crate");
    assert_eq!(exceptions[0].created_by, "u1");
    assert_eq!(exceptions[0].files.len(), 1);
    // Status untouched.
    assert_eq!(report.status, "open");
}
