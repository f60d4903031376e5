// imports.rs — Import/export request rows.

use ops_model::ImportExportRequest;
use rusqlite::params;
use uuid::Uuid;

use crate::convert::{enum_from_sql, enum_to_sql, json_from_sql, json_to_sql, ts_from_sql, ts_to_sql};
use crate::error::StoreError;
use crate::Store;

impl Store {
    pub fn insert_import_export(&self, request: &ImportExportRequest) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO import_export_requests (id, employee_id, kind, items, status, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                request.id.to_string(),
                request.employee_id,
                enum_to_sql(&request.kind)?,
                json_to_sql(&request.items)?,
                request.status,
                ts_to_sql(request.created_at),
            ],
        )?;
        Ok(())
    }

    pub fn list_import_exports(&self) -> Result<Vec<ImportExportRequest>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, employee_id, kind, items, status, created_at \
             FROM import_export_requests ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;
        let mut requests = Vec::new();
        for row in rows {
            let (id, employee_id, kind, items, status, created_at) = row?;
            requests.push(ImportExportRequest {
                id: id
                    .parse::<Uuid>()
                    .map_err(|_| StoreError::not_found("import/export request", &id))?,
                employee_id,
                kind: enum_from_sql(&kind)?,
                items: json_from_sql(&items)?,
                status,
                created_at: ts_from_sql("created_at", &created_at)?,
            });
        }
        Ok(requests)
    }
}
