// recipients.rs — Who gets told about a discussion update.
//
// The recipient set for a note or reply is computed fresh per event:
//
//   report owner
//   ∪ every admin
//   ∪ team leader (Project reports with an assigned team)
//   ∪ thread participants (replies only: note author + prior reply authors)
//   ∖ the acting user
//
// The result is a set — one notification per recipient per event, no
// matter how many rules matched them.

use std::collections::HashSet;

use ops_model::{AdminNote, Report, ReportType};
use ops_store::Store;

use crate::error::DiscussionError;

/// Compute the deduplicated recipient set for an update on `report`.
///
/// Pass the thread (`note`) for reply events so its participants are
/// included; pass `None` for top-level notes. `actor_id` is always
/// excluded, even when the actor is an admin, the owner, or a thread
/// participant.
pub fn resolve_recipients(
    store: &Store,
    report: &Report,
    note: Option<&AdminNote>,
    actor_id: &str,
) -> Result<HashSet<String>, DiscussionError> {
    let mut recipients = HashSet::new();

    recipients.insert(report.employee_id.clone());

    for admin in store.list_admins()? {
        recipients.insert(admin.id);
    }

    if report.report_type == ReportType::Project {
        if let Some(team_id) = &report.team_id {
            if let Some(team) = store.get_team(team_id)? {
                recipients.insert(team.leader_id);
            }
        }
    }

    if let Some(note) = note {
        recipients.insert(note.author_id.clone());
        for reply in &note.replies {
            recipients.insert(reply.author_id.clone());
        }
    }

    recipients.remove(actor_id);
    Ok(recipients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ops_model::{ProjectDetails, Reply, ReportDetails, Role, Team, User};
    use tempfile::tempdir;

    fn test_store() -> (tempfile::TempDir, Store) {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("ops.db")).unwrap();
        (dir, store)
    }

    fn user(id: &str, role: Role) -> User {
        User {
            id: id.into(),
            username: id.into(),
            display_name: id.into(),
            role,
            branch_id: None,
            can_import: false,
            can_export: false,
            credential: "x".into(),
            allowed_report_types: vec![],
        }
    }

    fn report(owner: &str, team_id: Option<&str>) -> Report {
        Report {
            id: "r1".into(),
            employee_id: owner.into(),
            branch_id: None,
            team_id: team_id.map(Into::into),
            report_type: ReportType::Project,
            details: ReportDetails::Project(ProjectDetails::default()),
            status: "open".into(),
            evaluation: None,
            modifications: vec![],
            workflow_status: None,
            admin_notes: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn owner_admins_and_team_lead_are_included() {
        let (_dir, store) = test_store();
        store.insert_user(&user("owner", Role::Employee)).unwrap();
        store.insert_user(&user("admin1", Role::Admin)).unwrap();
        store.insert_user(&user("lead", Role::TeamLead)).unwrap();
        store
            .insert_team(&Team {
                id: "t1".into(),
                name: "Site A".into(),
                leader_id: "lead".into(),
            })
            .unwrap();

        let recipients =
            resolve_recipients(&store, &report("owner", Some("t1")), None, "someone").unwrap();
        assert_eq!(
            recipients,
            ["owner", "admin1", "lead"]
                .into_iter()
                .map(String::from)
                .collect()
        );
    }

    #[test]
    fn actor_is_never_a_recipient_even_as_admin_owner_or_participant() {
        let (_dir, store) = test_store();
        store.insert_user(&user("admin1", Role::Admin)).unwrap();

        // Actor is the owner.
        let recipients = resolve_recipients(&store, &report("actor", None), None, "actor").unwrap();
        assert!(!recipients.contains("actor"));

        // Actor is an admin.
        let recipients =
            resolve_recipients(&store, &report("owner", None), None, "admin1").unwrap();
        assert!(!recipients.contains("admin1"));

        // Actor authored the thread note.
        let mut note = AdminNote::new("actor", "Actor", "hello");
        note.replies.push(Reply::new("other", "Other", "hi"));
        let recipients =
            resolve_recipients(&store, &report("owner", None), Some(&note), "actor").unwrap();
        assert!(!recipients.contains("actor"));
        assert!(recipients.contains("other"));
    }

    #[test]
    fn reply_threads_pull_in_prior_participants_once() {
        let (_dir, store) = test_store();
        let mut note = AdminNote::new("author", "Author", "first");
        note.replies.push(Reply::new("p1", "P1", "a"));
        note.replies.push(Reply::new("p1", "P1", "b"));
        note.replies.push(Reply::new("p2", "P2", "c"));

        let recipients =
            resolve_recipients(&store, &report("owner", None), Some(&note), "p2").unwrap();
        assert!(recipients.contains("author"));
        assert!(recipients.contains("p1"));
        assert!(recipients.contains("owner"));
        assert!(!recipients.contains("p2"));
        // Sets, not lists: p1 appears once no matter how many replies.
        assert_eq!(recipients.len(), 3);
    }
}
