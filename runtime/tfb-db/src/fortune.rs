//! The fortunes listing: full scan, one request-time entry, sorted.

use rusqlite::Row;
use serde::{Deserialize, Serialize};

use crate::{QueryFailure, Session};

/// Message of the entry added to every listing. It is never stored.
pub const ADDITIONAL_FORTUNE: &str = "Additional fortune added at request time.";

const LISTING_CAPACITY: usize = 16;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fortune {
    pub id: u16,
    pub message: String,
}

impl Fortune {
    /// The request-time entry, id 0.
    pub fn additional() -> Self {
        Self {
            id: 0,
            message: ADDITIONAL_FORTUNE.to_string(),
        }
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            message: row.get(1)?,
        })
    }
}

impl Session<'_> {
    /// Every stored fortune plus [`Fortune::additional`], sorted by message.
    ///
    /// Messages compare byte-wise. The sort is stable, so equal messages keep
    /// scan order and the request-time entry sorts after any stored row with
    /// the same text. Any scan or decode failure discards the whole listing.
    pub fn list_fortunes(&self) -> Result<Vec<Fortune>, QueryFailure> {
        let statement = self.statements().fortune_select();
        let mut handle = self.handle(statement)?;
        let rows = handle
            .query_map([], Fortune::from_row)
            .map_err(|cause| QueryFailure::new(statement.name, cause))?;

        let mut fortunes = Vec::with_capacity(LISTING_CAPACITY);
        for row in rows {
            fortunes.push(row.map_err(|cause| QueryFailure::new(statement.name, cause))?);
        }
        fortunes.push(Fortune::additional());
        fortunes.sort_by(|a, b| a.message.as_bytes().cmp(b.message.as_bytes()));
        Ok(fortunes)
    }
}
