//! Bounded job queue served by worker threads that own every store
//! round-trip, so blocking SQLite calls never run on the HTTP executor.

use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use tfb_db::{AcquireError, Pool, Pooled, QueryFailure, Session, SqliteConn, StatementPool};
use thiserror::Error;
use tokio::sync::oneshot;

pub type DbPool = Arc<Pool<SqliteConn>>;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("worker queue full")]
    Busy,
    #[error("store pool exhausted")]
    PoolExhausted,
    #[error("store connection failed: {0}")]
    Connect(String),
    #[error(transparent)]
    Query(#[from] QueryFailure),
    #[error("worker pool shut down")]
    Shutdown,
}

type Job = Box<dyn FnOnce(&WorkerContext) + Send>;

struct QueuedJob {
    op: &'static str,
    queued_at: Instant,
    job: Job,
}

/// State shared by the worker threads.
pub struct WorkerContext {
    pool: DbPool,
    statements: Arc<StatementPool>,
    acquire_timeout: Option<Duration>,
}

impl WorkerContext {
    pub fn new(
        pool: DbPool,
        statements: Arc<StatementPool>,
        acquire_timeout: Option<Duration>,
    ) -> Self {
        Self {
            pool,
            statements,
            acquire_timeout,
        }
    }

    fn acquire_connection(&self) -> Result<Pooled<SqliteConn>, DispatchError> {
        self.pool
            .acquire(self.acquire_timeout)
            .map_err(|err| match err {
                AcquireError::Timeout => DispatchError::PoolExhausted,
                AcquireError::Create(message) => DispatchError::Connect(message),
            })
    }

    fn execute<T, F>(&self, op: F) -> Result<T, DispatchError>
    where
        F: FnOnce(Session<'_>) -> Result<T, QueryFailure>,
    {
        let conn = self.acquire_connection()?;
        let result = op(Session::new(conn.as_ref().connection(), &self.statements));
        match result {
            Err(failure) if failure.is_connection_fault() => {
                tracing::warn!(
                    statement = failure.statement(),
                    error = %failure,
                    "closing faulted store connection"
                );
                conn.discard();
                Err(failure.into())
            }
            result => Ok(result?),
        }
    }
}

/// Handle used by request handlers to queue store work.
#[derive(Clone)]
pub struct Dispatcher {
    tx: Sender<QueuedJob>,
    pool: DbPool,
}

impl Dispatcher {
    /// Spawn `threads` (at least one) workers draining a queue of at most `max_queue` jobs.
    pub fn start(context: WorkerContext, threads: usize, max_queue: usize) -> io::Result<Self> {
        let (tx, rx) = bounded::<QueuedJob>(max_queue.max(1));
        let pool = Arc::clone(&context.pool);
        let context = Arc::new(context);
        let threads = threads.max(1);
        for index in 0..threads {
            let rx = rx.clone();
            let context = Arc::clone(&context);
            thread::Builder::new()
                .name(format!("tfb-worker-{index}"))
                .spawn(move || worker_loop(rx, context))?;
        }
        tracing::info!(threads, max_queue, "worker threads started");
        Ok(Self { tx, pool })
    }

    /// Queue `op` without waiting. Fails with [`DispatchError::Busy`] when
    /// the queue is full.
    pub fn submit<T, F>(
        &self,
        name: &'static str,
        op: F,
    ) -> Result<oneshot::Receiver<Result<T, DispatchError>>, DispatchError>
    where
        T: Send + 'static,
        F: FnOnce(Session<'_>) -> Result<T, QueryFailure> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        let job: Job = Box::new(move |context| {
            let _ = reply_tx.send(context.execute(op));
        });
        let queued = QueuedJob {
            op: name,
            queued_at: Instant::now(),
            job,
        };
        match self.tx.try_send(queued) {
            Ok(()) => Ok(reply_rx),
            Err(TrySendError::Full(_)) => Err(DispatchError::Busy),
            Err(TrySendError::Disconnected(_)) => Err(DispatchError::Shutdown),
        }
    }

    /// Queue `op` and wait for its result.
    pub async fn run<T, F>(&self, name: &'static str, op: F) -> Result<T, DispatchError>
    where
        T: Send + 'static,
        F: FnOnce(Session<'_>) -> Result<T, QueryFailure> + Send + 'static,
    {
        let reply = self.submit(name, op)?;
        reply.await.map_err(|_| DispatchError::Shutdown)?
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn queue_depth(&self) -> usize {
        self.tx.len()
    }
}

fn millis(duration: Duration) -> u64 {
    duration.as_millis().min(u128::from(u64::MAX)) as u64
}

fn worker_loop(rx: Receiver<QueuedJob>, context: Arc<WorkerContext>) {
    while let Ok(queued) = rx.recv() {
        let exec_start = Instant::now();
        let queue_ms = millis(exec_start.duration_since(queued.queued_at));
        (queued.job)(&context);
        tracing::debug!(
            op = queued.op,
            queue_ms,
            exec_ms = millis(exec_start.elapsed()),
            queue_depth = rx.len(),
            pool_in_flight = context.pool.in_flight(),
            pool_idle = context.pool.idle_count(),
            "job finished"
        );
    }
    tracing::debug!("worker queue closed");
}
