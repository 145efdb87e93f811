//! Logging facilities for proxylist.
//!
//! proxylist is instrumented with the `tracing` crate. Nothing is printed
//! unless the application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("proxylist=debug")
//!     .init();
//! ```
//!
//! Signal emission is traced at `trace` level, structural list edits at
//! `trace`, and view rebuilds and sort reconfiguration at `debug`. Source
//! list events use [`targets::SOURCE`] and view events [`targets::PROXY`],
//! so `RUST_LOG=proxylist::proxy=debug` shows only view activity.

/// Span names used for tracing.
pub mod span_names {
    /// Full rebuild of a proxy buffer.
    pub const REBUILD: &str = "proxylist::rebuild";
    /// Incremental reaction to a source notification.
    pub const REACT: &str = "proxylist::react";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "proxylist_core::signal";
    /// Source list target.
    pub const SOURCE: &str = "proxylist::source";
    /// Proxy list target.
    pub const PROXY: &str = "proxylist::proxy";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Used to measure the duration of operations such as a full rebuild.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "proxylist::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Trace-level event, under `target:` if given, else the `proxylist` target.
#[macro_export]
macro_rules! list_trace {
    (target: $target:expr, $($arg:tt)*) => {
        tracing::trace!(target: $target, $($arg)*)
    };
    ($($arg:tt)*) => {
        tracing::trace!(target: "proxylist", $($arg)*)
    };
}

/// Debug-level event, under `target:` if given, else the `proxylist` target.
#[macro_export]
macro_rules! list_debug {
    (target: $target:expr, $($arg:tt)*) => {
        tracing::debug!(target: $target, $($arg)*)
    };
    ($($arg:tt)*) => {
        tracing::debug!(target: "proxylist", $($arg)*)
    };
}

/// Warn-level event, under `target:` if given, else the `proxylist` target.
#[macro_export]
macro_rules! list_warn {
    (target: $target:expr, $($arg:tt)*) => {
        tracing::warn!(target: $target, $($arg)*)
    };
    ($($arg:tt)*) => {
        tracing::warn!(target: "proxylist", $($arg)*)
    };
}
