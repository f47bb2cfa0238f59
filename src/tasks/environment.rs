//! Soft environment refresh between steps.
use super::{Context, soft};
use crate::environment;

/// Re-read `PATH` from the persistent environment so programs installed by
/// earlier steps resolve.  A failure is logged and the current environment
/// kept.
pub fn refresh_environment(ctx: &Context) {
    if let Some(env) = soft(
        ctx,
        "refreshing environment",
        environment::refresh(&*ctx.env_store, &ctx.env()),
    ) {
        ctx.set_env(env);
        ctx.log.debug("environment refreshed");
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::tasks::test_helpers::{FakeEnvStore, empty_config, make_context};
    use std::sync::Arc;

    #[test]
    fn refresh_updates_threaded_path() {
        let ctx = make_context(empty_config())
            .with_env_store(Arc::new(FakeEnvStore::with_machine_path("C:\\Tools")));
        refresh_environment(&ctx);
        assert_eq!(ctx.env().get("PATH").as_deref(), Some("C:\\Tools"));
    }

    #[test]
    fn refresh_failure_keeps_environment() {
        let ctx = make_context(empty_config())
            .with_env_store(Arc::new(FakeEnvStore::default()))
            .with_env(crate::environment::ProcessEnv::new().with_var("PATH", "before"));
        refresh_environment(&ctx);
        assert_eq!(ctx.env().get("PATH").as_deref(), Some("before"));
    }
}
