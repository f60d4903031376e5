// thread.rs — Notes, replies, and read tracking on a report.
//
// Every mutation of the notes array runs inside the store's row-locked
// report transaction: two notes added concurrently to the same report
// serialize instead of losing one. Notification fan-out happens strictly
// after commit — the data mutation's outcome is already decided before
// the first send is attempted, and no delivery failure can undo it.

use futures::future::join_all;
use ops_model::{AdminNote, Report, Reply};
use ops_notify::NotificationService;
use ops_store::Store;
use uuid::Uuid;

use crate::error::DiscussionError;
use crate::recipients::resolve_recipients;

/// Discussion operations on reports.
#[derive(Clone)]
pub struct DiscussionService {
    store: Store,
    notifier: NotificationService,
}

impl DiscussionService {
    pub fn new(store: Store, notifier: NotificationService) -> Self {
        Self { store, notifier }
    }

    /// Append a note to the report and notify interested parties.
    ///
    /// The note is committed first; fan-out is best-effort and concurrent,
    /// and its failures never surface to the caller.
    pub async fn add_note(
        &self,
        report_id: &str,
        author_id: &str,
        author_name: &str,
        content: &str,
    ) -> Result<AdminNote, DiscussionError> {
        let note = AdminNote::new(author_id, author_name, content);

        let pushed = note.clone();
        let report = self.store.with_report_for_update(
            report_id,
            move |report| -> Result<Report, DiscussionError> {
                report.admin_notes.push(pushed);
                Ok(report.clone())
            },
        )?;

        let recipients = match resolve_recipients(&self.store, &report, None, author_id) {
            Ok(recipients) => recipients,
            Err(e) => {
                // The note is committed; a resolver failure only costs the
                // notifications.
                tracing::warn!(report_id, error = %e, "recipient resolution failed");
                return Ok(note);
            }
        };

        self.fan_out(
            recipients,
            format!("New note from {author_name}"),
            content.to_string(),
            serde_json::json!({ "reportId": report_id, "noteId": note.id }),
        )
        .await;

        Ok(note)
    }

    /// Append a reply to an existing note and notify the thread.
    ///
    /// Recipients additionally include the note's author and every prior
    /// reply author, minus the current actor.
    pub async fn add_reply(
        &self,
        report_id: &str,
        note_id: Uuid,
        author_id: &str,
        author_name: &str,
        content: &str,
    ) -> Result<Reply, DiscussionError> {
        let reply = Reply::new(author_id, author_name, content);

        let pushed = reply.clone();
        let (report, thread) = self.store.with_report_for_update(
            report_id,
            move |report| -> Result<(Report, AdminNote), DiscussionError> {
                let note = report
                    .admin_notes
                    .iter_mut()
                    .find(|n| n.id == note_id)
                    .ok_or(DiscussionError::NoteNotFound(note_id))?;
                note.replies.push(pushed);
                let thread = note.clone();
                Ok((report.clone(), thread))
            },
        )?;

        let recipients = match resolve_recipients(&self.store, &report, Some(&thread), author_id) {
            Ok(recipients) => recipients,
            Err(e) => {
                tracing::warn!(report_id, error = %e, "recipient resolution failed");
                return Ok(reply);
            }
        };

        self.fan_out(
            recipients,
            format!("New reply from {author_name}"),
            content.to_string(),
            serde_json::json!({ "reportId": report_id, "noteId": note_id, "replyId": reply.id }),
        )
        .await;

        Ok(reply)
    }

    /// Mark every note and reply on the report as read by `user_id`.
    /// Idempotent; no notification side effects.
    pub fn mark_read(&self, report_id: &str, user_id: &str) -> Result<(), DiscussionError> {
        let user_id = user_id.to_string();
        self.store.with_report_for_update(
            report_id,
            move |report| -> Result<(), DiscussionError> {
                for note in &mut report.admin_notes {
                    note.mark_read(&user_id);
                }
                Ok(())
            },
        )
    }

    /// Deliver one event to every recipient, concurrently and
    /// independently. `NotificationService::deliver` is infallible, so one
    /// recipient's dead tokens or provider hiccups cannot affect another's
    /// delivery.
    async fn fan_out(
        &self,
        recipients: std::collections::HashSet<String>,
        title: String,
        body: String,
        data: serde_json::Value,
    ) {
        let sends = recipients.iter().map(|recipient| {
            let notifier = self.notifier.clone();
            let title = title.clone();
            let body = body.clone();
            let data = data.clone();
            async move {
                notifier.deliver(recipient, &title, &body, data).await;
            }
        });
        join_all(sends).await;
    }
}
