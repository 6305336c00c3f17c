//! Logging setup, powered by tracing-subscriber.
//!
//! actix-web logs through the `log` crate; tracing-subscriber's `tracing-log`
//! bridge routes those records through the same subscriber.

use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;

/// Build the filter from `RUST_LOG` when set, otherwise from `level` with
/// the noisy HTTP internals held at `warn`.
fn build_env_filter(level: &str) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    let mut directives = vec![level.to_string()];
    for (target, lvl) in [("actix_server", "warn"), ("actix_web", "warn"), ("mio", "warn")] {
        directives.push(format!("{target}={lvl}"));
    }
    let filter_str = directives.join(",");
    EnvFilter::try_new(&filter_str)
        .map_err(|err| anyhow::anyhow!("invalid log filter '{filter_str}': {err}"))
}

pub fn init_logging(level: &str, format: LogFormat) -> anyhow::Result<()> {
    let filter = build_env_filter(level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(true);
    let installed = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|err| anyhow::anyhow!("failed to install log subscriber: {err}"))?;
    tracing::trace!(level, ?format, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_level() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        assert!(build_env_filter("info,tfb_worker=loudest").is_err());
    }

    #[test]
    fn accepts_level_with_targets() {
        assert!(build_env_filter("debug,tfb_db=trace").is_ok());
    }
}
