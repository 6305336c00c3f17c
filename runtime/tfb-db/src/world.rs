//! Point reads and read-then-update batches over the `World` table.

use rusqlite::{Row, params};
use serde::{Deserialize, Serialize};

use crate::{KeySampler, QueryFailure, Session, Statement, sanitize_queries};

/// One `World` row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct World {
    pub id: u16,
    #[serde(rename = "randomNumber")]
    pub random_number: u16,
}

impl World {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            random_number: row.get(1)?,
        })
    }
}

impl Session<'_> {
    /// Point-select by identifier. A missing row is a failure.
    pub fn select_world(&self, id: u16) -> Result<World, QueryFailure> {
        let statement = self.statements().world_select();
        let mut handle = self.handle(statement)?;
        handle
            .query_row([id], World::from_row)
            .map_err(|cause| QueryFailure::new(statement.name, cause))
    }

    /// Point-select on a freshly sampled key.
    pub fn fetch_world<K: KeySampler>(&self, keys: &mut K) -> Result<World, QueryFailure> {
        self.select_world(keys.next_key())
    }

    /// Run `sanitize_queries(queries)` point-selects in order.
    ///
    /// Slot `i` holds the row for the `i`-th sampled key. The first failure
    /// ends the batch and the rows fetched so far are dropped.
    pub fn fetch_worlds<K: KeySampler>(
        &self,
        keys: &mut K,
        queries: Option<i64>,
    ) -> Result<Vec<World>, QueryFailure> {
        let n = sanitize_queries(queries);
        (0..n).try_fold(Vec::with_capacity(n), |mut worlds, _| {
            worlds.push(self.fetch_world(keys)?);
            Ok(worlds)
        })
    }

    /// Like [`Session::fetch_worlds`], but each fetched row gets a new
    /// sampled `randomNumber` which is written back before the next fetch.
    ///
    /// Write failures do not fail the batch: they are logged and the returned
    /// rows still carry the new values. Writes are independent statements
    /// with no transaction around the batch.
    pub fn update_worlds<K: KeySampler>(
        &self,
        keys: &mut K,
        queries: Option<i64>,
    ) -> Result<Vec<World>, QueryFailure> {
        let n = sanitize_queries(queries);
        let update = self.statements().world_update();
        (0..n).try_fold(Vec::with_capacity(n), |mut worlds, _| {
            let mut world = self.fetch_world(keys)?;
            world.random_number = keys.next_key();
            self.write_world(update, &world);
            worlds.push(world);
            Ok(worlds)
        })
    }

    fn write_world(&self, update: Statement, world: &World) {
        let result = self.handle(update).and_then(|mut handle| {
            handle
                .execute(params![world.random_number, world.id])
                .map_err(|cause| QueryFailure::new(update.name, cause))
        });
        if let Err(err) = result {
            tracing::warn!(
                statement = err.statement(),
                id = world.id,
                error = %err,
                "world update not applied"
            );
        }
    }
}
