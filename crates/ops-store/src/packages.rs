// packages.rs — Package-request rows, attachments, and the audit log.
//
// Workflow transitions are applied atomically: attachment rows, the
// status/progress write, and the audit entry land in one transaction or
// not at all. Deleting a request cascades to both child tables.

use chrono::Utc;
use ops_model::{
    PackageAttachment, PackageLogEntry, PackageRequest, PackageStatus, PackageView, Priority,
};
use rusqlite::{params, OptionalExtension, Row, Transaction};

use crate::convert::{enum_from_sql, enum_to_sql, json_from_sql, json_to_sql, ts_from_sql, ts_to_sql};
use crate::error::StoreError;
use crate::Store;

/// Field patch for `PUT /api/package-requests/{id}`. `None` leaves the
/// column untouched.
#[derive(Debug, Clone, Default)]
pub struct PackageUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub priority: Option<Priority>,
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl PackageUpdate {
    /// True when the patch would change nothing (rejected upstream as
    /// InvalidArgument).
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.customer_name.is_none()
            && self.customer_phone.is_none()
            && self.priority.is_none()
            && self.metadata.is_none()
    }
}

fn package_from_row(row: &Row<'_>) -> Result<PackageRequest, StoreError> {
    let raw_progress = row.get::<_, i64>(8)?;
    Ok(PackageRequest {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        customer_name: row.get(4)?,
        customer_phone: row.get(5)?,
        priority: enum_from_sql(&row.get::<_, String>(6)?)?,
        status: enum_from_sql(&row.get::<_, String>(7)?)?,
        progress: u8::try_from(raw_progress)
            .map_err(|_| StoreError::MalformedProgress(raw_progress))?,
        metadata: json_from_sql(&row.get::<_, String>(9)?)?,
        created_at: ts_from_sql("created_at", &row.get::<_, String>(10)?)?,
        updated_at: ts_from_sql("updated_at", &row.get::<_, String>(11)?)?,
    })
}

const PACKAGE_COLUMNS: &str = "id, employee_id, title, description, customer_name, \
                               customer_phone, priority, status, progress, metadata, \
                               created_at, updated_at";

impl Store {
    pub fn insert_package(&self, request: &PackageRequest) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO package_requests (id, employee_id, title, description, \
             customer_name, customer_phone, priority, status, progress, metadata, \
             created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                request.id,
                request.employee_id,
                request.title,
                request.description,
                request.customer_name,
                request.customer_phone,
                enum_to_sql(&request.priority)?,
                enum_to_sql(&request.status)?,
                request.progress as i64,
                json_to_sql(&request.metadata)?,
                ts_to_sql(request.created_at),
                ts_to_sql(request.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_package(&self, id: &str) -> Result<PackageRequest, StoreError> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {PACKAGE_COLUMNS} FROM package_requests WHERE id = ?1"),
            params![id],
            |row| Ok(package_from_row(row)),
        )
        .optional()?
        .transpose()?
        .ok_or_else(|| StoreError::not_found("package request", id))
    }

    /// Fetch a request joined with employee/branch display names plus its
    /// attachments and audit log, for API responses.
    pub fn get_package_view(&self, id: &str) -> Result<PackageView, StoreError> {
        let request = self.get_package(id)?;

        let conn = self.conn()?;
        let (employee_name, branch_name) = conn
            .query_row(
                "SELECT u.display_name, b.name \
                 FROM users u LEFT JOIN branches b ON b.id = u.branch_id \
                 WHERE u.id = ?1",
                params![request.employee_id],
                |row| {
                    Ok((
                        row.get::<_, Option<String>>(0)?,
                        row.get::<_, Option<String>>(1)?,
                    ))
                },
            )
            .optional()?
            .unwrap_or((None, None));

        let mut stmt = conn.prepare(
            "SELECT id, request_id, kind, url, file_id, file_name, uploaded_by, uploaded_at \
             FROM package_attachments WHERE request_id = ?1 ORDER BY uploaded_at",
        )?;
        let rows = stmt.query_map(params![id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
            ))
        })?;
        let mut attachments = Vec::new();
        for row in rows {
            let (aid, request_id, kind, url, file_id, file_name, uploaded_by, uploaded_at) = row?;
            attachments.push(PackageAttachment {
                id: aid.parse().map_err(|_| StoreError::not_found("attachment", &aid))?,
                request_id,
                kind: enum_from_sql(&kind)?,
                file: ops_model::StoredFile::new(url, file_id).with_name(file_name.clone()),
                file_name,
                uploaded_by,
                uploaded_at: ts_from_sql("uploaded_at", &uploaded_at)?,
            });
        }

        let mut stmt = conn.prepare(
            "SELECT id, request_id, action, comment, actor_id, created_at \
             FROM package_logs WHERE request_id = ?1 ORDER BY created_at",
        )?;
        let rows = stmt.query_map(params![id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;
        let mut logs = Vec::new();
        for row in rows {
            let (lid, request_id, action, comment, actor_id, created_at) = row?;
            logs.push(PackageLogEntry {
                id: lid.parse().map_err(|_| StoreError::not_found("log entry", &lid))?,
                request_id,
                action,
                comment,
                actor_id,
                created_at: ts_from_sql("created_at", &created_at)?,
            });
        }

        Ok(PackageView {
            request,
            employee_name,
            branch_name,
            attachments,
            logs,
        })
    }

    pub fn list_packages(&self) -> Result<Vec<PackageRequest>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PACKAGE_COLUMNS} FROM package_requests ORDER BY created_at DESC"
        ))?;
        let rows = stmt.query_map([], |row| Ok(package_from_row(row)))?;
        let mut requests = Vec::new();
        for row in rows {
            requests.push(row??);
        }
        Ok(requests)
    }

    /// Apply a field patch. The caller has already rejected empty patches.
    pub fn update_package(&self, id: &str, update: &PackageUpdate) -> Result<(), StoreError> {
        let mut request = self.get_package(id)?;
        if let Some(title) = &update.title {
            request.title = title.clone();
        }
        if let Some(description) = &update.description {
            request.description = Some(description.clone());
        }
        if let Some(customer_name) = &update.customer_name {
            request.customer_name = customer_name.clone();
        }
        if let Some(customer_phone) = &update.customer_phone {
            request.customer_phone = Some(customer_phone.clone());
        }
        if let Some(priority) = update.priority {
            request.priority = priority;
        }
        if let Some(metadata) = &update.metadata {
            request.metadata = metadata.clone();
        }

        let conn = self.conn()?;
        conn.execute(
            "UPDATE package_requests SET title = ?1, description = ?2, customer_name = ?3, \
             customer_phone = ?4, priority = ?5, metadata = ?6, updated_at = ?7 WHERE id = ?8",
            params![
                request.title,
                request.description,
                request.customer_name,
                request.customer_phone,
                enum_to_sql(&request.priority)?,
                json_to_sql(&request.metadata)?,
                ts_to_sql(Utc::now()),
                id,
            ],
        )?;
        Ok(())
    }

    /// Delete a request; attachments and log entries cascade away with it.
    pub fn delete_package(&self, id: &str) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let changed = conn.execute("DELETE FROM package_requests WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::not_found("package request", id));
        }
        Ok(())
    }

    /// Persist one workflow transition atomically: attachment rows, the
    /// status/progress write, and the audit entry commit together or not
    /// at all.
    pub fn apply_package_transition(
        &self,
        request_id: &str,
        status: PackageStatus,
        progress: u8,
        attachments: &[PackageAttachment],
        log: &PackageLogEntry,
    ) -> Result<(), StoreError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let changed = tx.execute(
            "UPDATE package_requests SET status = ?1, progress = ?2, updated_at = ?3 \
             WHERE id = ?4",
            params![
                enum_to_sql(&status)?,
                progress as i64,
                ts_to_sql(Utc::now()),
                request_id,
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found("package request", request_id));
        }

        for attachment in attachments {
            insert_attachment_tx(&tx, attachment)?;
        }
        tx.execute(
            "INSERT INTO package_logs (id, request_id, action, comment, actor_id, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                log.id.to_string(),
                log.request_id,
                log.action,
                log.comment,
                log.actor_id,
                ts_to_sql(log.created_at),
            ],
        )?;

        tx.commit()?;
        tracing::debug!(
            request_id,
            status = status.as_str(),
            progress,
            attachments = attachments.len(),
            "package transition committed"
        );
        Ok(())
    }

    /// Count child rows for a request (cascade verification in tests).
    pub fn count_package_children(&self, request_id: &str) -> Result<(usize, usize), StoreError> {
        let conn = self.conn()?;
        let attachments: i64 = conn.query_row(
            "SELECT COUNT(*) FROM package_attachments WHERE request_id = ?1",
            params![request_id],
            |row| row.get(0),
        )?;
        let logs: i64 = conn.query_row(
            "SELECT COUNT(*) FROM package_logs WHERE request_id = ?1",
            params![request_id],
            |row| row.get(0),
        )?;
        Ok((attachments as usize, logs as usize))
    }
}

fn insert_attachment_tx(
    tx: &Transaction<'_>,
    attachment: &PackageAttachment,
) -> Result<(), StoreError> {
    tx.execute(
        "INSERT INTO package_attachments (id, request_id, kind, url, file_id, file_name, \
         uploaded_by, uploaded_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            attachment.id.to_string(),
            attachment.request_id,
            enum_to_sql(&attachment.kind)?,
            attachment.file.url,
            attachment.file.id,
            attachment.file_name,
            attachment.uploaded_by,
            ts_to_sql(attachment.uploaded_at),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_store() -> (tempfile::TempDir, Store) {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("ops.db")).unwrap();
        (dir, store)
    }

    fn request(id: &str) -> PackageRequest {
        let now = Utc::now();
        PackageRequest {
            id: id.into(),
            employee_id: "u1".into(),
            title: "Spare parts".into(),
            description: None,
            customer_name: "Harbor Co".into(),
            customer_phone: None,
            priority: Priority::Medium,
            status: PackageStatus::New,
            progress: 0,
            metadata: serde_json::Map::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn out_of_range_progress_is_rejected_not_truncated() {
        let (_dir, store) = test_store();
        store.insert_package(&request("PKG-1")).unwrap();

        // A corrupted row must surface as an error, never wrap around.
        store
            .conn()
            .unwrap()
            .execute(
                "UPDATE package_requests SET progress = 300 WHERE id = 'PKG-1'",
                [],
            )
            .unwrap();

        let err = store.get_package("PKG-1").unwrap_err();
        assert!(matches!(err, StoreError::MalformedProgress(300)));
    }

    #[test]
    fn in_range_progress_round_trips() {
        let (_dir, store) = test_store();
        let mut req = request("PKG-2");
        req.progress = 75;
        store.insert_package(&req).unwrap();
        assert_eq!(store.get_package("PKG-2").unwrap().progress, 75);
    }
}
