// reports.rs — Report rows and the row-locked read-modify-write helper.
//
// A report's notes, details, and modification history live in JSON columns
// on the report row. Any operation that rewrites them is a read-modify-
// write, and two concurrent note-adds on the same report would otherwise
// lose one note. SQLite has no `SELECT … FOR UPDATE`, so
// `with_report_for_update` takes the database write lock up front with
// `BEGIN IMMEDIATE`, which serializes those writers for the span of the
// closure.

use chrono::Utc;
use ops_model::Report;
use rusqlite::{params, OptionalExtension, Row, TransactionBehavior};

use crate::convert::{enum_from_sql, enum_to_sql, json_from_sql, json_to_sql, ts_from_sql, ts_to_sql};
use crate::error::StoreError;
use crate::Store;

fn report_from_row(row: &Row<'_>) -> Result<Report, StoreError> {
    let workflow_status: Option<String> = row.get(9)?;
    Ok(Report {
        id: row.get(0)?,
        employee_id: row.get(1)?,
        branch_id: row.get(2)?,
        team_id: row.get(3)?,
        report_type: enum_from_sql(&row.get::<_, String>(4)?)?,
        details: json_from_sql(&row.get::<_, String>(5)?)?,
        status: row.get(6)?,
        evaluation: row
            .get::<_, Option<String>>(7)?
            .map(|s| json_from_sql(&s))
            .transpose()?,
        modifications: json_from_sql(&row.get::<_, String>(8)?)?,
        workflow_status: workflow_status.map(|s| enum_from_sql(&s)).transpose()?,
        admin_notes: json_from_sql(&row.get::<_, String>(10)?)?,
        created_at: ts_from_sql("created_at", &row.get::<_, String>(11)?)?,
        updated_at: ts_from_sql("updated_at", &row.get::<_, String>(12)?)?,
    })
}

const REPORT_COLUMNS: &str = "id, employee_id, branch_id, team_id, report_type, details, \
                              status, evaluation, modifications, workflow_status, \
                              admin_notes, created_at, updated_at";

impl Store {
    pub fn insert_report(&self, report: &Report) -> Result<(), StoreError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO reports (id, employee_id, branch_id, team_id, report_type, \
             details, status, evaluation, modifications, workflow_status, admin_notes, \
             created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                report.id,
                report.employee_id,
                report.branch_id,
                report.team_id,
                enum_to_sql(&report.report_type)?,
                json_to_sql(&report.details)?,
                report.status,
                report
                    .evaluation
                    .as_ref()
                    .map(json_to_sql)
                    .transpose()?,
                json_to_sql(&report.modifications)?,
                report
                    .workflow_status
                    .as_ref()
                    .map(enum_to_sql)
                    .transpose()?,
                json_to_sql(&report.admin_notes)?,
                ts_to_sql(report.created_at),
                ts_to_sql(report.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn get_report(&self, id: &str) -> Result<Report, StoreError> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?1"),
            params![id],
            |row| Ok(report_from_row(row)),
        )
        .optional()?
        .transpose()?
        .ok_or_else(|| StoreError::not_found("report", id))
    }

    /// Load a report under the database write lock, let `f` mutate it, and
    /// persist the result — all in one immediate transaction.
    ///
    /// This is the single-writer path for notes, replies, read marks, stage
    /// confirmations, and every other mutation of the report's JSON
    /// columns. If `f` fails, nothing is written. The error type is the
    /// caller's own, as long as store failures convert into it.
    pub fn with_report_for_update<T, E, F>(&self, id: &str, f: F) -> Result<T, E>
    where
        E: From<StoreError>,
        F: FnOnce(&mut Report) -> Result<T, E>,
    {
        let mut conn = self.conn().map_err(E::from)?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| E::from(StoreError::from(e)))?;

        let mut report = tx
            .query_row(
                &format!("SELECT {REPORT_COLUMNS} FROM reports WHERE id = ?1"),
                params![id],
                |row| Ok(report_from_row(row)),
            )
            .optional()
            .map_err(|e| E::from(StoreError::from(e)))?
            .transpose()
            .map_err(E::from)?
            .ok_or_else(|| E::from(StoreError::not_found("report", id)))?;

        let out = f(&mut report)?;
        report.updated_at = Utc::now();

        let row_write = || -> Result<(), StoreError> {
            tx.execute(
                "UPDATE reports SET details = ?1, status = ?2, evaluation = ?3, \
                 modifications = ?4, workflow_status = ?5, admin_notes = ?6, updated_at = ?7 \
                 WHERE id = ?8",
                params![
                    json_to_sql(&report.details)?,
                    report.status,
                    report
                        .evaluation
                        .as_ref()
                        .map(json_to_sql)
                        .transpose()?,
                    json_to_sql(&report.modifications)?,
                    report
                        .workflow_status
                        .as_ref()
                        .map(enum_to_sql)
                        .transpose()?,
                    json_to_sql(&report.admin_notes)?,
                    ts_to_sql(report.updated_at),
                    id,
                ],
            )?;
            Ok(())
        };
        row_write().map_err(E::from)?;

        tx.commit().map_err(|e| E::from(StoreError::from(e)))?;
        tracing::debug!(report_id = id, "report row updated under write lock");
        Ok(out)
    }
}
