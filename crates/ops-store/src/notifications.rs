// notifications.rs — Persisted in-app notifications and push registrations.

use chrono::Utc;
use ops_model::{DeviceToken, Notification};
use rusqlite::params;
use uuid::Uuid;

use crate::convert::{json_from_sql, json_to_sql, ts_from_sql, ts_to_sql};
use crate::error::StoreError;
use crate::Store;

impl Store {
    pub fn insert_notification(&self, notification: &Notification) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO notifications (id, user_id, title, body, data, read, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                notification.id.to_string(),
                notification.user_id,
                notification.title,
                notification.body,
                json_to_sql(&notification.data)?,
                notification.read as i64,
                ts_to_sql(notification.created_at),
            ],
        )?;
        Ok(())
    }

    pub fn list_notifications(&self, user_id: &str) -> Result<Vec<Notification>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, title, body, data, read, created_at \
             FROM notifications WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, i64>(5)?,
                row.get::<_, String>(6)?,
            ))
        })?;
        let mut notifications = Vec::new();
        for row in rows {
            let (id, user_id, title, body, data, read, created_at) = row?;
            notifications.push(Notification {
                id: id
                    .parse::<Uuid>()
                    .map_err(|_| StoreError::not_found("notification", &id))?,
                user_id,
                title,
                body,
                data: json_from_sql(&data)?,
                read: read != 0,
                created_at: ts_from_sql("created_at", &created_at)?,
            });
        }
        Ok(notifications)
    }

    pub fn mark_notification_read(&self, id: Uuid) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE notifications SET read = 1 WHERE id = ?1",
            params![id.to_string()],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("notification", id.to_string()));
        }
        Ok(())
    }

    /// Register a device token, idempotently (re-registering refreshes the
    /// owner).
    pub fn upsert_device_token(&self, user_id: &str, token: &str) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO device_tokens (token, user_id, created_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(token) DO UPDATE SET user_id = excluded.user_id",
            params![token, user_id, ts_to_sql(Utc::now())],
        )?;
        Ok(())
    }

    pub fn device_tokens_for_user(&self, user_id: &str) -> Result<Vec<DeviceToken>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT token, user_id, created_at FROM device_tokens WHERE user_id = ?1",
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        let mut tokens = Vec::new();
        for row in rows {
            let (token, user_id, created_at) = row?;
            tokens.push(DeviceToken {
                token,
                user_id,
                created_at: ts_from_sql("created_at", &created_at)?,
            });
        }
        Ok(tokens)
    }

    /// Remove a dead push registration. Unknown tokens are a no-op: the
    /// provider may report the same token dead on concurrent sends.
    pub fn delete_device_token(&self, token: &str) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM device_tokens WHERE token = ?1", params![token])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn notification_round_trip_and_read_flag() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("ops.db")).unwrap();

        let n = Notification::new("u1", "New note", "Huda commented", serde_json::json!({"reportId": "r1"}));
        store.insert_notification(&n).unwrap();

        let listed = store.list_notifications("u1").unwrap();
        assert_eq!(listed.len(), 1);
        assert!(!listed[0].read);
        assert_eq!(listed[0].data["reportId"], "r1");

        store.mark_notification_read(n.id).unwrap();
        assert!(store.list_notifications("u1").unwrap()[0].read);
    }

    #[test]
    fn device_tokens_upsert_and_prune() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("ops.db")).unwrap();

        store.upsert_device_token("u1", "tok-a").unwrap();
        store.upsert_device_token("u1", "tok-a").unwrap();
        store.upsert_device_token("u1", "tok-b").unwrap();
        assert_eq!(store.device_tokens_for_user("u1").unwrap().len(), 2);

        store.delete_device_token("tok-a").unwrap();
        store.delete_device_token("tok-a").unwrap(); // idempotent
        assert_eq!(store.device_tokens_for_user("u1").unwrap().len(), 1);
    }
}
