//! Command-line and environment configuration, read once at startup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tfb_db::{MAX_CONNECTION_COUNT, PoolLimits, SqliteOptions};

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// `timestamp LEVEL target: message`
    Compact,
    /// JSON lines.
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "tfb-worker", version, about = "Database micro-benchmark HTTP service")]
pub struct WorkerConfig {
    /// Address the HTTP listener binds to.
    #[arg(long, env = "TFB_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Path of the SQLite database holding the `World` and `Fortune` tables.
    #[arg(long, env = "TFB_DATABASE")]
    pub database: PathBuf,

    /// Worker threads executing store round-trips. Defaults to the number of CPUs.
    #[arg(long, env = "TFB_THREADS")]
    pub threads: Option<usize>,

    /// HTTP executor threads. Defaults to actix-web's choice.
    #[arg(long, env = "TFB_HTTP_WORKERS")]
    pub http_workers: Option<usize>,

    /// Jobs allowed to wait for a worker thread before requests are refused.
    #[arg(long, env = "TFB_MAX_QUEUE", default_value_t = 1024)]
    pub max_queue: usize,

    /// Upper bound on open store connections.
    #[arg(long, env = "TFB_DB_MAX_CONNS", default_value_t = MAX_CONNECTION_COUNT)]
    pub max_conns: usize,

    /// Upper bound on idle store connections kept for reuse.
    #[arg(long, env = "TFB_DB_MAX_IDLE", default_value_t = MAX_CONNECTION_COUNT)]
    pub max_idle: usize,

    /// How long a job waits for a store connection (ms). 0 waits forever.
    #[arg(long, env = "TFB_DB_ACQUIRE_TIMEOUT_MS", default_value_t = 1000)]
    pub acquire_timeout_ms: u64,

    /// SQLite busy timeout per statement (ms).
    #[arg(long, env = "TFB_DB_BUSY_TIMEOUT_MS", default_value_t = 100)]
    pub busy_timeout_ms: u64,

    /// Default log filter; `RUST_LOG` takes precedence when set.
    #[arg(long, env = "TFB_LOG", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "TFB_LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl WorkerConfig {
    pub fn worker_threads(&self) -> usize {
        self.threads.filter(|count| *count > 0).unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|count| count.get())
                .unwrap_or(4)
        })
    }

    pub fn pool_limits(&self) -> PoolLimits {
        PoolLimits {
            max_open: self.max_conns.max(1),
            max_idle: self.max_idle,
        }
    }

    pub fn acquire_timeout(&self) -> Option<Duration> {
        (self.acquire_timeout_ms > 0).then(|| Duration::from_millis(self.acquire_timeout_ms))
    }

    pub fn sqlite_options(&self) -> SqliteOptions {
        SqliteOptions {
            busy_timeout: Duration::from_millis(self.busy_timeout_ms),
        }
    }
}
