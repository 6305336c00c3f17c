//! Startup and serving.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use anyhow::Context;
use tfb_db::{SqliteConn, StatementPool, sqlite_pool};

use crate::config::WorkerConfig;
use crate::dispatch::{Dispatcher, WorkerContext};
use crate::routes;

/// Prepare the statements against the store and start the worker threads.
///
/// Any preparation failure is returned before a listener exists, so a
/// service that cannot run its statements never accepts traffic.
pub fn bootstrap(config: &WorkerConfig) -> anyhow::Result<Dispatcher> {
    let options = config.sqlite_options();
    let statements = {
        let conn = SqliteConn::open(&config.database, options).with_context(|| {
            format!("failed to open store at {}", config.database.display())
        })?;
        StatementPool::prepare(conn.connection()).context("failed to prepare statements")?
    };
    let statements = Arc::new(statements);
    let limits = config.pool_limits();
    let pool = sqlite_pool(&config.database, limits, options, Arc::clone(&statements));
    let context = WorkerContext::new(pool, statements, config.acquire_timeout());
    let dispatcher = Dispatcher::start(context, config.worker_threads(), config.max_queue)
        .context("failed to spawn worker threads")?;
    tracing::info!(
        database = %config.database.display(),
        max_conns = limits.max_open,
        max_idle = limits.max_idle,
        "store ready"
    );
    Ok(dispatcher)
}

/// Serve HTTP on `config.listen` until shutdown.
pub async fn run(config: &WorkerConfig, dispatcher: Dispatcher) -> anyhow::Result<()> {
    let dispatcher = web::Data::new(dispatcher);
    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(dispatcher.clone())
            .configure(routes::configure)
    });
    if let Some(workers) = config.http_workers.filter(|count| *count > 0) {
        server = server.workers(workers);
    }
    let server = server
        .bind(config.listen)
        .with_context(|| format!("failed to bind {}", config.listen))?;
    tracing::info!(listen = %config.listen, "serving");
    server.run().await.context("http server failed")?;
    tracing::info!("server stopped");
    Ok(())
}
