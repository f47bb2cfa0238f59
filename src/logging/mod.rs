//! Logging infrastructure for console and run-log output.

mod logger;
mod subscriber;
mod types;
mod utils;

pub use logger::Logger;
pub use subscriber::init_subscriber;
pub use types::{Log, TaskEntry, TaskStatus};
pub use utils::log_file_path;

/// Create a Logger backed by an isolated per-thread tracing subscriber
/// that writes to a log file in a fresh temporary documents folder.
///
/// Returns a [`tracing::dispatcher::DefaultGuard`] that must be kept alive
/// for the duration of the test; dropping it restores the previous
/// thread-local dispatcher and closes the file.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let path = log_file_path(tmp.path());
    let guard = init_subscriber(true, Some(&path)).expect("failed to open log file");
    (Logger::new(Some(path)), tmp, guard)
}
