//! SQLite connector helpers for the tfb store layer.

use crate::{Pool, PoolLimits, StatementPool};
use rusqlite::{Connection, OpenFlags};
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

const BUSY_TIMEOUT_MS: u64 = 100;
const STATEMENT_CACHE_CAPACITY: usize = 16;

#[derive(Clone, Copy, Debug)]
pub struct SqliteOptions {
    pub busy_timeout: Duration,
}

impl Default for SqliteOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(BUSY_TIMEOUT_MS),
        }
    }
}

pub struct SqliteConn {
    conn: Connection,
}

impl SqliteConn {
    /// Open an existing store read-write in WAL mode.
    pub fn open(path: &Path, options: SqliteOptions) -> Result<Self, rusqlite::Error> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)?;
        conn.busy_timeout(options.busy_timeout)?;
        conn.set_prepared_statement_cache_capacity(STATEMENT_CACHE_CAPACITY);
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Pool of SQLite connections whose statement caches are primed with
/// `statements` as each connection is opened.
pub fn sqlite_pool(
    path: &Path,
    limits: PoolLimits,
    options: SqliteOptions,
    statements: Arc<StatementPool>,
) -> Arc<Pool<SqliteConn>> {
    let path = path.to_path_buf();
    Pool::new(limits, move || {
        let conn = SqliteConn::open(&path, options)?;
        statements.prime(conn.connection())?;
        tracing::debug!(path = %path.display(), "opened store connection");
        Ok::<_, Box<dyn Error + Send + Sync>>(conn)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Session;
    use crate::testing::{ScriptedKeys, provision_file, provision_memory};

    #[test]
    fn connections_open_in_wal_mode() {
        let (_dir, path) = provision_file(10, &[(1, "only")]);
        let conn = SqliteConn::open(&path, SqliteOptions::default()).expect("open");
        let mode: String = conn
            .connection()
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .expect("journal_mode");
        assert_eq!(mode.to_ascii_lowercase(), "wal");
    }

    #[test]
    fn pooled_connections_share_prepared_statements() {
        let (_dir, path) = provision_file(10, &[(1, "only")]);
        let bootstrap = SqliteConn::open(&path, SqliteOptions::default()).expect("open");
        let statements =
            Arc::new(StatementPool::prepare(bootstrap.connection()).expect("prepare"));
        let pool = sqlite_pool(
            &path,
            PoolLimits {
                max_open: 2,
                max_idle: 2,
            },
            SqliteOptions::default(),
            Arc::clone(&statements),
        );
        let first = pool.acquire(Some(Duration::from_secs(1))).expect("first");
        let second = pool.acquire(Some(Duration::from_secs(1))).expect("second");
        for conn in [&first, &second] {
            let session = Session::new(conn.as_ref().connection(), &statements);
            let mut keys = ScriptedKeys::new([3]);
            assert_eq!(session.fetch_world(&mut keys).expect("fetch").id, 3);
        }
        assert_eq!(pool.in_flight(), 2);
    }

    #[test]
    fn pool_reports_missing_database() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing.db");
        let scratch = provision_memory(1, &[]);
        let statements = Arc::new(StatementPool::prepare(&scratch).expect("prepare"));
        let pool = sqlite_pool(
            &path,
            PoolLimits::default(),
            SqliteOptions::default(),
            statements,
        );
        let result = pool.acquire(Some(Duration::from_millis(50)));
        assert!(matches!(result, Err(crate::AcquireError::Create(_))));
        assert_eq!(pool.in_flight(), 0);
    }
}
