// schema.rs — Idempotent schema bootstrap.
//
// Migration tooling is out of scope for this service; the schema is small
// enough that a single `CREATE TABLE IF NOT EXISTS` batch at startup keeps
// fresh databases and test databases in shape. Cascades enforce the
// "attachments and logs never outlive their parent" invariant at the SQL
// level (requires `PRAGMA foreign_keys = ON`, set per connection by the
// pool initializer).

use rusqlite::Connection;

use crate::error::StoreError;

pub(crate) fn init(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS branches (
            id         TEXT PRIMARY KEY,
            name       TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS teams (
            id         TEXT PRIMARY KEY,
            name       TEXT NOT NULL,
            leader_id  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS users (
            id                   TEXT PRIMARY KEY,
            username             TEXT NOT NULL UNIQUE,
            display_name         TEXT NOT NULL,
            role                 TEXT NOT NULL,
            branch_id            TEXT REFERENCES branches(id),
            can_import           INTEGER NOT NULL DEFAULT 0,
            can_export           INTEGER NOT NULL DEFAULT 0,
            credential           TEXT NOT NULL,
            allowed_report_types TEXT NOT NULL DEFAULT '[]'
        );

        CREATE TABLE IF NOT EXISTS package_requests (
            id             TEXT PRIMARY KEY,
            employee_id    TEXT NOT NULL,
            title          TEXT NOT NULL,
            description    TEXT,
            customer_name  TEXT NOT NULL,
            customer_phone TEXT,
            priority       TEXT NOT NULL,
            status         TEXT NOT NULL,
            progress       INTEGER NOT NULL,
            metadata       TEXT NOT NULL DEFAULT '{}',
            created_at     TEXT NOT NULL,
            updated_at     TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS package_attachments (
            id          TEXT PRIMARY KEY,
            request_id  TEXT NOT NULL REFERENCES package_requests(id) ON DELETE CASCADE,
            kind        TEXT NOT NULL,
            url         TEXT NOT NULL,
            file_id     TEXT NOT NULL,
            file_name   TEXT NOT NULL,
            uploaded_by TEXT NOT NULL,
            uploaded_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS package_logs (
            id         TEXT PRIMARY KEY,
            request_id TEXT NOT NULL REFERENCES package_requests(id) ON DELETE CASCADE,
            action     TEXT NOT NULL,
            comment    TEXT,
            actor_id   TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS reports (
            id              TEXT PRIMARY KEY,
            employee_id     TEXT NOT NULL,
            branch_id       TEXT,
            team_id         TEXT,
            report_type     TEXT NOT NULL,
            details         TEXT NOT NULL,
            status          TEXT NOT NULL,
            evaluation      TEXT,
            modifications   TEXT NOT NULL DEFAULT '[]',
            workflow_status TEXT,
            admin_notes     TEXT NOT NULL DEFAULT '[]',
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS notifications (
            id         TEXT PRIMARY KEY,
            user_id    TEXT NOT NULL,
            title      TEXT NOT NULL,
            body       TEXT NOT NULL,
            data       TEXT NOT NULL DEFAULT 'null',
            read       INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS device_tokens (
            token      TEXT PRIMARY KEY,
            user_id    TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS import_export_requests (
            id          TEXT PRIMARY KEY,
            employee_id TEXT NOT NULL,
            kind        TEXT NOT NULL,
            items       TEXT NOT NULL DEFAULT '[]',
            status      TEXT NOT NULL,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_attachments_request
            ON package_attachments(request_id);
        CREATE INDEX IF NOT EXISTS idx_logs_request
            ON package_logs(request_id);
        CREATE INDEX IF NOT EXISTS idx_notifications_user
            ON notifications(user_id);
        CREATE INDEX IF NOT EXISTS idx_device_tokens_user
            ON device_tokens(user_id);
        "#,
    )?;
    Ok(())
}
