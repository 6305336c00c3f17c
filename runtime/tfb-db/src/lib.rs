//! Query-execution core for the tfb database benchmark service.
//!
//! The HTTP layer hands every request to one of four operations on a
//! [`Session`]: a single point query, a bounded batch of point queries, a
//! bounded batch of read-then-update pairs, or the fortunes listing. All of
//! them run against the three statements held by a [`StatementPool`], which
//! is prepared once at startup and shared read-only afterwards.

mod bounds;
mod error;
mod fortune;
mod pool;
mod sample;
mod sqlite;
mod statements;
mod world;

pub use bounds::{MAX_QUERIES, MIN_QUERIES, sanitize_queries};
pub use error::QueryFailure;
pub use fortune::{ADDITIONAL_FORTUNE, Fortune};
pub use pool::{AcquireError, Pool, PoolLimits, Pooled};
pub use sample::{KeySampler, RandomKeys};
pub use sqlite::{SqliteConn, SqliteOptions, sqlite_pool};
pub use statements::{Session, Statement, StatementPool};
pub use world::World;

/// Number of rows in the `World` table; identifiers run from 1 to this value.
pub const WORLD_ROW_COUNT: u16 = 10_000;

/// Default cap on open and idle store connections.
pub const MAX_CONNECTION_COUNT: usize = 256;

#[cfg(test)]
pub(crate) mod testing;
