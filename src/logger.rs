//! Access log side channel. Fire-and-forget: callers never depend on a result.
//!
//! Emits on the `access` tracing target so deployments can route it to its own
//! appender, separate from error/exception events.

pub fn log_access(message: &str) {
    tracing::info!(target: "access", "{message}");
}

pub fn log_exception(message: &str) {
    tracing::error!(target: "exception", "{message}");
}
