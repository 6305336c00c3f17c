use clap::Parser;
use tfb_worker::config::WorkerConfig;
use tfb_worker::{lifecycle, logging};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = WorkerConfig::parse();
    logging::init_logging(&config.log_level, config.log_format)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting tfb-worker");

    let dispatcher = lifecycle::bootstrap(&config).inspect_err(|err| {
        tracing::error!(error = ?err, "startup failed");
    })?;
    lifecycle::run(&config, dispatcher).await
}
