//! # ops-store
//!
//! SQLite persistence for the operations-tracking backend.
//!
//! A [`Store`] wraps a bounded r2d2 connection pool over rusqlite. The pool
//! is built once at startup and shared process-wide; every connection runs
//! with `PRAGMA foreign_keys = ON` so attachment and log rows cascade away
//! with their parent package request.
//!
//! Report rows carry their discussion notes as a JSON column, so the
//! note/reply/mark-read operations are read-modify-write. SQLite has no
//! `SELECT … FOR UPDATE`; [`Store::with_report_for_update`] serializes those
//! writers with a `BEGIN IMMEDIATE` transaction instead, which is the
//! equivalent single-writer guarantee here.
//!
//! ## Quick Example
//!
//! ```rust,no_run
//! use ops_store::Store;
//!
//! let store = Store::open("/var/lib/opsd/ops.db").unwrap();
//! let admins = store.list_admins().unwrap();
//! ```

pub mod error;

mod convert;
mod imports;
mod notifications;
mod packages;
mod reports;
mod schema;
mod users;

pub use error::StoreError;
pub use packages::PackageUpdate;

use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

/// Default ceiling for the shared connection pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 8;

/// Handle to the backing database. Cheap to clone; all clones share one
/// bounded pool.
#[derive(Clone)]
pub struct Store {
    pool: Pool<SqliteConnectionManager>,
}

impl Store {
    /// Open (or create) the database at `path` with the default pool size.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_pool_size(path, DEFAULT_MAX_CONNECTIONS)
    }

    /// Open (or create) the database at `path` with an explicit pool
    /// ceiling. Bootstraps the schema idempotently.
    pub fn open_with_pool_size(
        path: impl AsRef<Path>,
        max_connections: u32,
    ) -> Result<Self, StoreError> {
        let manager = SqliteConnectionManager::file(path.as_ref()).with_init(|conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
        });
        let pool = Pool::builder().max_size(max_connections).build(manager)?;

        let conn = pool.get()?;
        schema::init(&conn)?;
        drop(conn);

        Ok(Self { pool })
    }

    /// Borrow a pooled connection.
    pub(crate) fn conn(
        &self,
    ) -> Result<r2d2::PooledConnection<SqliteConnectionManager>, StoreError> {
        Ok(self.pool.get()?)
    }
}
