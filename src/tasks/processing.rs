use anyhow::Result;

use super::context::Context;
use crate::resources::{Resource, ResourceChange, converge};

/// Result of a single task execution.
///
/// # Examples
///
/// ```
/// use pixie::tasks::TaskResult;
///
/// let ok = TaskResult::Ok;
/// let skipped = TaskResult::Skipped("already installed".into());
/// let degraded = TaskResult::Degraded("1 failed".into());
///
/// assert!(matches!(ok, TaskResult::Ok));
/// assert!(matches!(skipped, TaskResult::Skipped(_)));
/// assert!(matches!(degraded, TaskResult::Degraded(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task found nothing to do.
    Skipped(String),
    /// Task completed, but some of its items failed softly.
    Degraded(String),
}

/// Counters for tasks that process many items.
///
/// # Examples
///
/// ```
/// use pixie::tasks::TaskStats;
///
/// let stats = TaskStats { changed: 3, already_ok: 10, ..TaskStats::default() };
/// assert_eq!(stats.summary(), "3 changed, 10 already ok");
///
/// let stats = TaskStats { changed: 1, already_ok: 0, failed: 1 };
/// assert_eq!(stats.summary(), "1 changed, 0 already ok, 1 failed");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    /// Number of items changed or applied.
    pub changed: u32,
    /// Number of items already in the correct state.
    pub already_ok: u32,
    /// Number of items that failed softly.
    pub failed: u32,
}

impl TaskStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "3 changed, 10 already ok, 1 failed").
    #[must_use]
    pub fn summary(&self) -> String {
        let mut summary = format!("{} changed, {} already ok", self.changed, self.already_ok);
        if self.failed > 0 {
            summary.push_str(&format!(", {} failed", self.failed));
        }
        summary
    }

    /// Count one [`ResourceChange`].
    pub fn record(&mut self, change: &ResourceChange) {
        match change {
            ResourceChange::Applied => self.changed += 1,
            ResourceChange::AlreadyCorrect => self.already_ok += 1,
        }
    }

    /// Log the summary and return the appropriate `TaskResult`.
    #[must_use]
    pub fn finish(self, ctx: &Context) -> TaskResult {
        let summary = self.summary();
        ctx.log.info(&summary);
        if self.failed > 0 {
            TaskResult::Degraded(summary)
        } else {
            TaskResult::Ok
        }
    }
}

/// Bring one resource to its desired state, logging what happened.
///
/// # Errors
///
/// Propagates state-check and apply errors, including a resource whose
/// target can never be brought to the desired state.
pub fn process_resource(ctx: &Context, resource: &dyn Resource, verb: &str) -> Result<ResourceChange> {
    let desc = resource.description();
    let change = converge(resource)?;
    match &change {
        ResourceChange::Applied => ctx.log.info(&format!("{verb} {desc}")),
        ResourceChange::AlreadyCorrect => ctx.log.debug(&format!("ok: {desc}")),
    }
    Ok(change)
}

/// Write an external command's combined output to the run log verbatim.
pub fn log_output(ctx: &Context, what: &str, output: &str) {
    ctx.log.debug(&format!("{what} output: {output}"));
}

/// Apply the soft-failure policy inside a step: log `result`'s error with
/// `what` as context and carry on without a value.
pub fn soft<T>(ctx: &Context, what: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            ctx.log.error(&format!("{what} failed (continuing): {e:#}"));
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::fs::FileCopyResource;
    use crate::tasks::test_helpers::{empty_config, make_static_context};

    #[test]
    fn stats_record_changes() {
        let mut stats = TaskStats::new();
        stats.record(&ResourceChange::Applied);
        stats.record(&ResourceChange::AlreadyCorrect);
        stats.record(&ResourceChange::AlreadyCorrect);
        assert_eq!(
            stats,
            TaskStats {
                changed: 1,
                already_ok: 2,
                failed: 0
            }
        );
    }

    #[test]
    fn finish_is_degraded_when_items_failed() {
        let (ctx, _log) = make_static_context(empty_config());
        let stats = TaskStats {
            changed: 2,
            failed: 1,
            ..TaskStats::default()
        };
        assert_eq!(
            stats.finish(&ctx),
            TaskResult::Degraded("2 changed, 0 already ok, 1 failed".to_string())
        );
        assert_eq!(TaskStats::new().finish(&ctx), TaskResult::Ok);
    }

    #[test]
    fn soft_swallows_errors() {
        let (ctx, _log) = make_static_context(empty_config());
        assert_eq!(soft(&ctx, "refresh", Ok(3)), Some(3));
        assert_eq!(
            soft::<()>(&ctx, "refresh", Err(anyhow::anyhow!("registry locked"))),
            None
        );
    }

    #[test]
    fn process_resource_applies_then_reports_ok() {
        let (ctx, _log) = make_static_context(empty_config());
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("src"), "x").unwrap();
        let resource = FileCopyResource::new(dir.path().join("src"), dir.path().join("dst"));

        assert_eq!(
            process_resource(&ctx, &resource, "copied").unwrap(),
            ResourceChange::Applied
        );
        assert_eq!(
            process_resource(&ctx, &resource, "copied").unwrap(),
            ResourceChange::AlreadyCorrect
        );
    }
}
