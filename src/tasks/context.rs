use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tempfile::TempDir;

use crate::config::Config;
use crate::environment::{EnvStore, ProcessEnv, RegistryEnvStore};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::Log;
use crate::operations::{FileSystemOps, SystemFileSystemOps};
use crate::platform::Platform;
use crate::prompt::{Prompter, StdinPrompter};
use crate::repository::{Git2Cloner, RepoCloner};

/// State of one provisioning run, passed by reference to every task.
pub struct Context {
    /// Configuration loaded from `pixie.toml`.
    pub config: Arc<Config>,
    /// Detected platform information.
    pub platform: Arc<Platform>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// The user's Documents folder; directories and assets land here.
    pub documents: PathBuf,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Persistent machine/user environment, read by environment refreshes.
    pub env_store: Arc<dyn EnvStore>,
    /// Clones the configuration repository.
    pub cloner: Arc<dyn RepoCloner>,
    /// Asks the restart question.
    pub prompter: Arc<dyn Prompter>,
    /// Filesystem operation abstraction (injectable for testing).
    pub fs_ops: Arc<dyn FileSystemOps>,
    env: Mutex<ProcessEnv>,
    clone: Mutex<Option<TempDir>>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &"<Config>")
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("documents", &self.documents)
            .field("executor", &"<dyn Executor>")
            .field("env_store", &"<dyn EnvStore>")
            .field("cloner", &"<dyn RepoCloner>")
            .field("prompter", &"<dyn Prompter>")
            .field("fs_ops", &"<dyn FileSystemOps>")
            .field("clone_dir", &self.clone_dir())
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Creates a context wired to the real system: process execution, the
    /// registry, libgit2, standard input and the local filesystem.
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        platform: Arc<Platform>,
        log: Arc<dyn Log>,
        documents: PathBuf,
    ) -> Self {
        Self {
            config,
            platform,
            log,
            documents,
            executor: Arc::new(SystemExecutor),
            env_store: Arc::new(RegistryEnvStore),
            cloner: Arc::new(Git2Cloner),
            prompter: Arc::new(StdinPrompter),
            fs_ops: Arc::new(SystemFileSystemOps),
            env: Mutex::new(ProcessEnv::new()),
            clone: Mutex::new(None),
        }
    }

    /// Replace the logger.
    #[must_use]
    pub fn with_log(mut self, log: Arc<dyn Log>) -> Self {
        self.log = log;
        self
    }

    /// Replace the command executor.
    #[must_use]
    pub fn with_executor(mut self, executor: Arc<dyn Executor>) -> Self {
        self.executor = executor;
        self
    }

    /// Replace the persistent environment store.
    #[must_use]
    pub fn with_env_store(mut self, env_store: Arc<dyn EnvStore>) -> Self {
        self.env_store = env_store;
        self
    }

    /// Replace the repository cloner.
    #[must_use]
    pub fn with_cloner(mut self, cloner: Arc<dyn RepoCloner>) -> Self {
        self.cloner = cloner;
        self
    }

    /// Replace the prompter.
    #[must_use]
    pub fn with_prompter(mut self, prompter: Arc<dyn Prompter>) -> Self {
        self.prompter = prompter;
        self
    }

    /// Replace the [`FileSystemOps`] implementation.
    #[must_use]
    pub fn with_fs_ops(mut self, fs_ops: Arc<dyn FileSystemOps>) -> Self {
        self.fs_ops = fs_ops;
        self
    }

    /// Start from `env` instead of an empty overlay.
    #[must_use]
    pub fn with_env(self, env: ProcessEnv) -> Self {
        self.set_env(env);
        self
    }

    /// Snapshot of the environment threaded through the run.
    #[must_use]
    pub fn env(&self) -> ProcessEnv {
        lock(&self.env).clone()
    }

    /// Replace the environment seen by later steps.
    pub fn set_env(&self, env: ProcessEnv) {
        *lock(&self.env) = env;
    }

    /// Root of the cloned configuration repository, once fetched.
    #[must_use]
    pub fn clone_dir(&self) -> Option<PathBuf> {
        lock(&self.clone).as_ref().map(|dir| dir.path().to_path_buf())
    }

    /// Take ownership of the clone directory for the rest of the run.
    pub fn hold_clone(&self, dir: TempDir) {
        *lock(&self.clone) = Some(dir);
    }

    /// Remove the clone directory, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be deleted.
    pub fn release_clone(&self) -> std::io::Result<()> {
        let dir = lock(&self.clone).take();
        dir.map_or(Ok(()), TempDir::close)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tasks::test_helpers::{empty_config, make_context};

    #[test]
    fn env_round_trips_through_context() {
        let ctx = make_context(empty_config());
        assert!(ctx.env().get("PIXIE_CTX_TEST").is_none());
        ctx.set_env(ProcessEnv::new().with_var("PIXIE_CTX_TEST", "1"));
        assert_eq!(ctx.env().get("PIXIE_CTX_TEST").as_deref(), Some("1"));
    }

    #[test]
    fn release_clone_removes_directory() {
        let ctx = make_context(empty_config());
        assert!(ctx.clone_dir().is_none());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_path_buf();
        ctx.hold_clone(dir);
        assert_eq!(ctx.clone_dir(), Some(path.clone()));

        ctx.release_clone().unwrap();
        assert!(ctx.clone_dir().is_none());
        assert!(!path.exists());
        ctx.release_clone().unwrap();
    }

    #[test]
    fn dropping_context_removes_clone() {
        let ctx = make_context(empty_config());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().to_path_buf();
        ctx.hold_clone(dir);
        drop(ctx);
        assert!(!path.exists());
    }

    #[test]
    fn debug_format_includes_key_fields() {
        let ctx = make_context(empty_config());
        let debug = format!("{ctx:?}");
        assert!(debug.contains("Context"));
        assert!(debug.contains("documents"));
        assert!(debug.contains("clone_dir"));
    }
}
