//! Named statements shared by every request, and the per-request session
//! that executes them.

use rusqlite::{CachedStatement, Connection};

use crate::QueryFailure;

/// One SQL template and the name it is logged under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Statement {
    pub name: &'static str,
    pub sql: &'static str,
}

pub(crate) const WORLD_SELECT: Statement = Statement {
    name: "world-select",
    sql: "SELECT id, randomNumber FROM World WHERE id = ?1",
};

pub(crate) const WORLD_UPDATE: Statement = Statement {
    name: "world-update",
    sql: "UPDATE World SET randomNumber = ?1 WHERE id = ?2",
};

pub(crate) const FORTUNE_SELECT: Statement = Statement {
    name: "fortune-select",
    sql: "SELECT id, message FROM Fortune",
};

/// The point-select, update and full-scan statements.
///
/// Built once at startup by [`StatementPool::prepare`], which fails if the
/// store cannot compile any of them. After that the pool is immutable and is
/// shared by reference across worker threads. Compiled handles live in each
/// connection's statement cache; [`StatementPool::prime`] fills that cache
/// when the connection pool opens a new connection, so the handles stay valid
/// across checkout and checkin.
#[derive(Debug)]
pub struct StatementPool {
    world_select: Statement,
    world_update: Statement,
    fortune_select: Statement,
}

impl StatementPool {
    pub fn prepare(conn: &Connection) -> Result<Self, QueryFailure> {
        let pool = Self {
            world_select: WORLD_SELECT,
            world_update: WORLD_UPDATE,
            fortune_select: FORTUNE_SELECT,
        };
        pool.prime(conn)?;
        for statement in pool.statements() {
            tracing::info!(name = statement.name, sql = statement.sql, "prepared statement");
        }
        Ok(pool)
    }

    /// Compile every statement into `conn`'s statement cache.
    pub fn prime(&self, conn: &Connection) -> Result<(), QueryFailure> {
        for statement in self.statements() {
            conn.prepare_cached(statement.sql)
                .map_err(|cause| QueryFailure::new(statement.name, cause))?;
        }
        Ok(())
    }

    pub fn statements(&self) -> [Statement; 3] {
        [self.world_select, self.world_update, self.fortune_select]
    }

    pub fn world_select(&self) -> Statement {
        self.world_select
    }

    pub fn world_update(&self) -> Statement {
        self.world_update
    }

    pub fn fortune_select(&self) -> Statement {
        self.fortune_select
    }
}

/// A checked-out connection paired with the shared statements.
///
/// The query operations are defined on this type in the `world` and
/// `fortune` modules.
#[derive(Clone, Copy)]
pub struct Session<'a> {
    conn: &'a Connection,
    statements: &'a StatementPool,
}

impl<'a> Session<'a> {
    pub fn new(conn: &'a Connection, statements: &'a StatementPool) -> Self {
        Self { conn, statements }
    }

    pub fn statements(&self) -> &'a StatementPool {
        self.statements
    }

    pub(crate) fn handle(&self, statement: Statement) -> Result<CachedStatement<'a>, QueryFailure> {
        self.conn
            .prepare_cached(statement.sql)
            .map_err(|cause| QueryFailure::new(statement.name, cause))
    }
}
