//! Structured logger with summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::STAGE_TARGET;
use super::types::{Log, TaskEntry, TaskStatus};

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger that emits [`tracing`] events and records task results.
///
/// Output routing (console and the run log at `<Documents>/Pixie/log.txt`)
/// is decided by the subscriber installed with
/// [`init_subscriber`](super::subscriber::init_subscriber); the logger only
/// remembers the log path so the summary can point at it.
#[derive(Debug, Default)]
pub struct Logger {
    tasks: Mutex<Vec<TaskEntry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger.
    #[must_use]
    pub fn new(log_file: Option<PathBuf>) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// Return the log file path, if any.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a copy of all recorded task entries.
    #[must_use]
    pub fn task_entries(&self) -> Vec<TaskEntry> {
        self.tasks.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Record a task result for the summary.
    pub fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.tasks.lock() {
            guard.push(TaskEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Return `true` if any recorded task has failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.count(TaskStatus::Failed) > 0
    }

    /// Count the recorded tasks with `status`.
    #[must_use]
    pub fn count(&self, status: TaskStatus) -> usize {
        self.tasks.lock().map_or(0, |guard| {
            guard.iter().filter(|t| t.status == status).count()
        })
    }

    /// Print the summary of all recorded tasks.
    pub fn print_summary(&self) {
        let tasks = self.task_entries();
        if tasks.is_empty() {
            return;
        }

        self.stage("Summary");

        for task in &tasks {
            let (icon, color) = match task.status {
                TaskStatus::Ok => ("✓", "\x1b[32m"),
                TaskStatus::NotApplicable => ("·", "\x1b[2m"),
                TaskStatus::Skipped => ("○", "\x1b[36m"),
                TaskStatus::Warned => ("!", "\x1b[33m"),
                TaskStatus::Failed => ("✗", "\x1b[31m"),
            };

            let suffix = task
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", task.name));
        }

        let ok = self.count(TaskStatus::Ok);
        let not_applicable = self.count(TaskStatus::NotApplicable);
        let skipped = self.count(TaskStatus::Skipped);
        let warned = self.count(TaskStatus::Warned);
        let failed = self.count(TaskStatus::Failed);
        self.info(&format!(
            "{} tasks: \x1b[32m{ok} ok\x1b[0m, \x1b[2m{not_applicable} n/a\x1b[0m, \x1b[36m{skipped} skipped\x1b[0m, \x1b[33m{warned} with warnings\x1b[0m, \x1b[31m{failed} failed\x1b[0m",
            tasks.len()
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error);

    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        self.record_task(name, status, message);
    }

    fn print_summary(&self) {
        self.print_summary();
    }
}
