//! HTTP front end for the tfb database benchmark.
//!
//! `lifecycle::bootstrap` prepares the shared statements and starts the
//! worker threads; `lifecycle::run` serves the routes in [`routes`] until
//! the process is stopped.

pub mod config;
pub mod dispatch;
pub mod lifecycle;
pub mod logging;
pub mod render;
pub mod routes;
