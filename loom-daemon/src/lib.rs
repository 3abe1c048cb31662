//! `loom-daemon` is the daemon thread (C8): it owns the controller TCP
//! connection, the line-oriented wire protocol (spec §6.1), and command
//! dispatch into a [`loom_filters::FilterRegistry`].
//!
//! Nothing in this crate touches [`loom_core::Loom`]'s fast-path hooks —
//! those are called directly from instrumented application code, never
//! routed through the daemon.

mod commands;
mod config;
mod daemon;
mod error;
mod wire;

pub use config::Config;
pub use daemon::spawn;
pub use error::DaemonError;
