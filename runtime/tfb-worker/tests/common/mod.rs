//! Store fixtures for the endpoint tests.

use std::path::{Path, PathBuf};

use clap::Parser;
use rusqlite::{Connection, params};
use tempfile::TempDir;
use tfb_worker::config::WorkerConfig;

pub const WORLD_ROWS: u16 = 10_000;

pub struct Store {
    _dir: TempDir,
    pub path: PathBuf,
}

/// A store with the full `World` table (`randomNumber == id`) and the given
/// fortunes.
pub fn provision(fortunes: &[(u16, &str)]) -> Store {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tfb.db");
    let mut conn = Connection::open(&path).expect("open");
    conn.execute_batch(
        "CREATE TABLE World (id INTEGER PRIMARY KEY, randomNumber INTEGER NOT NULL);
         CREATE TABLE Fortune (id INTEGER PRIMARY KEY, message TEXT NOT NULL);",
    )
    .expect("schema");
    let tx = conn.transaction().expect("begin");
    for id in 1..=WORLD_ROWS {
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
    Store { _dir: dir, path }
}

pub fn config(path: &Path) -> WorkerConfig {
    WorkerConfig::try_parse_from([
        "tfb-worker",
        "--database",
        path.to_str().expect("utf-8 path"),
        "--threads",
        "2",
        "--max-conns",
        "4",
        "--max-idle",
        "4",
    ])
    .expect("config")
}

pub fn stored_random_number(path: &Path, id: u16) -> u16 {
    let conn = Connection::open(path).expect("open");
    conn.query_row(
        "SELECT randomNumber FROM World WHERE id = ?1",
        [id],
        |row| row.get(0),
    )
    .expect("stored row")
}
