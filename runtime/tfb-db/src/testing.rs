//! Fixtures shared by the unit tests.

use std::path::PathBuf;

use rusqlite::{Connection, params};
use tempfile::TempDir;

use crate::KeySampler;

/// Replays a fixed key sequence, cycling when exhausted, and counts draws.
pub(crate) struct ScriptedKeys {
    keys: Vec<u16>,
    drawn: usize,
}

impl ScriptedKeys {
    pub(crate) fn new(keys: impl IntoIterator<Item = u16>) -> Self {
        let keys: Vec<u16> = keys.into_iter().collect();
        assert!(!keys.is_empty(), "scripted keys need at least one entry");
        Self { keys, drawn: 0 }
    }

    pub(crate) fn drawn(&self) -> usize {
        self.drawn
    }
}

impl KeySampler for ScriptedKeys {
    fn next_key(&mut self) -> u16 {
        let key = self.keys[self.drawn % self.keys.len()];
        self.drawn += 1;
        key
    }
}

/// Create both tables; `World` rows get `randomNumber == id`.
pub(crate) fn provision(conn: &Connection, worlds: u16, fortunes: &[(u16, &str)]) {
    conn.execute_batch(
        "CREATE TABLE World (id INTEGER PRIMARY KEY, randomNumber INTEGER NOT NULL);
         CREATE TABLE Fortune (id INTEGER PRIMARY KEY, message TEXT NOT NULL);",
    )
    .expect("schema");
    let tx = conn.unchecked_transaction().expect("begin");
    for id in 1..=worlds {
        tx.execute("INSERT INTO World (id, randomNumber) VALUES (?1, ?1)", [id])
            .expect("insert world");
    }
    for (id, message) in fortunes {
        tx.execute(
            "INSERT INTO Fortune (id, message) VALUES (?1, ?2)",
            params![id, message],
        )
        .expect("insert fortune");
    }
    tx.commit().expect("commit");
}

pub(crate) fn provision_memory(worlds: u16, fortunes: &[(u16, &str)]) -> Connection {
    let conn = Connection::open_in_memory().expect("open");
    provision(&conn, worlds, fortunes);
    conn
}

pub(crate) fn provision_file(worlds: u16, fortunes: &[(u16, &str)]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tfb.db");
    let conn = Connection::open(&path).expect("open");
    provision(&conn, worlds, fortunes);
    (dir, path)
}
