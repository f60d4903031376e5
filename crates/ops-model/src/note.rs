// note.rs — Threaded discussion entries attached to a report.
//
// Notes and replies are never deleted, and read state only grows: a user
// id lands in `read_by` once and stays there. The author is a reader of
// their own entry from the moment it is created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A reply inside a note's thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub id: Uuid,
    pub author_id: String,
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read_by: Vec<String>,
}

impl Reply {
    pub fn new(
        author_id: impl Into<String>,
        author_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let author_id = author_id.into();
        Self {
            id: Uuid::new_v4(),
            read_by: vec![author_id.clone()],
            author_id,
            author_name: author_name.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Add `user_id` to the readers, idempotently.
    pub fn mark_read(&mut self, user_id: &str) {
        if !self.read_by.iter().any(|r| r == user_id) {
            self.read_by.push(user_id.to_string());
        }
    }
}

/// A top-level discussion note on a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminNote {
    pub id: Uuid,
    pub author_id: String,
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read_by: Vec<String>,
    #[serde(default)]
    pub replies: Vec<Reply>,
}

impl AdminNote {
    pub fn new(
        author_id: impl Into<String>,
        author_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        let author_id = author_id.into();
        Self {
            id: Uuid::new_v4(),
            read_by: vec![author_id.clone()],
            author_id,
            author_name: author_name.into(),
            content: content.into(),
            created_at: Utc::now(),
            replies: Vec::new(),
        }
    }

    /// Add `user_id` to the readers of the note and every reply,
    /// idempotently.
    pub fn mark_read(&mut self, user_id: &str) {
        if !self.read_by.iter().any(|r| r == user_id) {
            self.read_by.push(user_id.to_string());
        }
        for reply in &mut self.replies {
            reply.mark_read(user_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_reads_their_own_note() {
        let note = AdminNote::new("u1", "Huda", "please re-check the invoice");
        assert_eq!(note.read_by, vec!["u1".to_string()]);
    }

    #[test]
    fn mark_read_is_idempotent_across_replies() {
        let mut note = AdminNote::new("u1", "Huda", "first");
        note.replies.push(Reply::new("u2", "Omar", "on it"));

        note.mark_read("u3");
        note.mark_read("u3");

        assert_eq!(note.read_by.iter().filter(|r| *r == "u3").count(), 1);
        assert_eq!(
            note.replies[0].read_by.iter().filter(|r| *r == "u3").count(),
            1
        );
    }
}
