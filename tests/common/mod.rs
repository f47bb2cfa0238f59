// Shared helpers for integration tests.
//
// Provides recording and scripted stand-ins for the system seams (process
// execution, the persistent environment, the repository clone and the
// terminal prompt) plus a harness that lays out temporary Documents, clone
// fixture and AppData folders so each test runs in isolation.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Result, bail};

use pixie::config::Config;
use pixie::environment::{EnvStore, ProcessEnv};
use pixie::exec::{ExecResult, Executor};
use pixie::logging::{Log, Logger};
use pixie::operations::SystemFileSystemOps;
use pixie::platform::{Os, Platform};
use pixie::prompt::Prompter;
use pixie::repository::RepoCloner;
use pixie::tasks::Context;

/// [`Executor`] that records every command line and succeeds unless the line
/// contains one of the configured failure patterns.
///
/// `choco install` calls answer with Chocolatey's success phrase; everything
/// else answers with empty output.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    calls: Mutex<Vec<String>>,
    failing: Vec<String>,
    programs: HashSet<String>,
}

impl RecordingExecutor {
    /// An executor on which `choco`, `git` and `code` all resolve.
    pub fn new() -> Self {
        Self::default().with_programs(&["choco", "git", "code"])
    }

    /// Programs that [`Executor::which`] resolves.
    pub fn with_programs(mut self, programs: &[&str]) -> Self {
        self.programs = programs.iter().map(ToString::to_string).collect();
        self
    }

    /// Fail every command line containing `pattern`.
    pub fn failing_on(mut self, pattern: &str) -> Self {
        self.failing.push(pattern.to_string());
        self
    }

    /// Command lines run so far, as `"program arg1 arg2"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Package names passed to `choco install`, in order.
    pub fn installed_packages(&self) -> Vec<String> {
        self.calls()
            .iter()
            .filter_map(|line| line.strip_prefix("choco install "))
            .filter_map(|rest| rest.split(' ').next())
            .map(ToString::to_string)
            .collect()
    }

    fn respond(&self, program: &str, args: &[&str]) -> ExecResult {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.clone());

        let success = !self.failing.iter().any(|p| line.contains(p.as_str()));
        let stdout = match args {
            ["install", package, ..] if success => format!("{package} has been installed."),
            _ => String::new(),
        };
        ExecResult {
            stdout,
            stderr: if success { String::new() } else { "scripted failure".to_string() },
            success,
            code: Some(i32::from(!success)),
        }
    }
}

impl Executor for RecordingExecutor {
    fn run(&self, program: &str, args: &[&str], _env: &ProcessEnv) -> Result<ExecResult> {
        let result = self.respond(program, args);
        if !result.success {
            bail!("{program} failed (exit 1): {}", result.combined());
        }
        Ok(result)
    }

    fn run_unchecked(
        &self,
        program: &str,
        args: &[&str],
        _env: &ProcessEnv,
    ) -> Result<ExecResult> {
        Ok(self.respond(program, args))
    }

    fn which(&self, program: &str, _env: &ProcessEnv) -> Option<PathBuf> {
        self.programs.contains(program).then(|| PathBuf::from(program))
    }
}

/// [`EnvStore`] with a fixed machine `Path`.
#[derive(Debug)]
pub struct StaticEnvStore(pub String);

impl EnvStore for StaticEnvStore {
    fn machine_var(&self, name: &str) -> Result<Option<String>> {
        Ok(name.eq_ignore_ascii_case("Path").then(|| self.0.clone()))
    }

    fn user_var(&self, _name: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

/// [`RepoCloner`] that copies a local fixture tree and remembers where it
/// cloned to.
#[derive(Debug)]
pub struct DirCloner {
    fixture: PathBuf,
    destinations: Mutex<Vec<PathBuf>>,
}

impl DirCloner {
    pub fn new(fixture: &Path) -> Self {
        Self {
            fixture: fixture.to_path_buf(),
            destinations: Mutex::new(Vec::new()),
        }
    }

    /// Directories cloned into so far.
    pub fn destinations(&self) -> Vec<PathBuf> {
        self.destinations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RepoCloner for DirCloner {
    fn clone_into(&self, _url: &str, dest: &Path) -> Result<()> {
        self.destinations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(dest.to_path_buf());
        pixie::resources::fs::copy_tree(&self.fixture, dest, &mut |_| {})?;
        Ok(())
    }
}

/// [`RepoCloner`] whose clone always fails.
#[derive(Debug)]
pub struct FailingCloner;

impl RepoCloner for FailingCloner {
    fn clone_into(&self, url: &str, _dest: &Path) -> Result<()> {
        bail!("could not resolve host for {url}")
    }
}

/// [`Prompter`] returning a scripted answer; `None` simulates a read error.
#[derive(Debug)]
pub struct ScriptedPrompter {
    answer: Option<String>,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn answering(answer: Option<&str>) -> Self {
        Self {
            answer: answer.map(ToString::to_string),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Questions asked so far.
    pub fn asked(&self) -> Vec<String> {
        self.asked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, question: &str) -> io::Result<String> {
        self.asked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(question.to_string());
        self.answer
            .clone()
            .ok_or_else(|| io::Error::from(io::ErrorKind::UnexpectedEof))
    }
}

/// Temporary folders for one provisioning run.
///
/// - `documents`: the Documents folder
/// - `fixture`: contents of the configuration repository
/// - `appdata`: root for `%APPDATA%`, `%LOCALAPPDATA%` and `%ProgramData%`
pub struct Harness {
    pub documents: tempfile::TempDir,
    pub fixture: tempfile::TempDir,
    pub appdata: tempfile::TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            documents: tempfile::tempdir().expect("create documents dir"),
            fixture: tempfile::tempdir().expect("create fixture dir"),
            appdata: tempfile::tempdir().expect("create appdata dir"),
        }
    }

    /// Write `content` to `relative` inside the repository fixture.
    pub fn with_repo_file(self, relative: &str, content: &str) -> Self {
        let path = self.fixture.path().join(relative);
        std::fs::create_dir_all(path.parent().expect("file has a parent"))
            .expect("create fixture parent");
        std::fs::write(path, content).expect("write fixture file");
        self
    }

    /// Parse `toml` the way the CLI does, from a `pixie.toml` on disk.
    pub fn config(&self, toml: &str) -> Config {
        let path = self.documents.path().join("pixie.toml");
        std::fs::write(&path, toml).expect("write pixie.toml");
        Config::load(&path).expect("load pixie.toml")
    }

    /// A per-user startup folder under the fake `%APPDATA%`.
    pub fn user_startup(&self) -> PathBuf {
        startup_folder(&self.appdata.path().join("Roaming"))
    }

    /// The all-users startup folder under the fake `%ProgramData%`.
    pub fn common_startup(&self) -> PathBuf {
        startup_folder(&self.appdata.path().join("ProgramData"))
    }

    /// The environment the run starts from.
    pub fn env(&self) -> ProcessEnv {
        let root = self.appdata.path();
        ProcessEnv::new()
            .with_var("APPDATA", root.join("Roaming").to_string_lossy())
            .with_var("LOCALAPPDATA", root.join("Local").to_string_lossy())
            .with_var("ProgramData", root.join("ProgramData").to_string_lossy())
    }

    /// Build a Windows context for `config` with the given seams.
    pub fn context(
        &self,
        config: Config,
        executor: Arc<dyn Executor>,
        cloner: Arc<dyn RepoCloner>,
        prompter: Arc<dyn Prompter>,
    ) -> (Context, Arc<Logger>) {
        self.context_on(Os::Windows, config, executor, cloner, prompter)
    }

    /// Like [`context`](Self::context) on an arbitrary OS.
    pub fn context_on(
        &self,
        os: Os,
        config: Config,
        executor: Arc<dyn Executor>,
        cloner: Arc<dyn RepoCloner>,
        prompter: Arc<dyn Prompter>,
    ) -> (Context, Arc<Logger>) {
        let log = Arc::new(Logger::new(None));
        let ctx = Context::new(
            Arc::new(config),
            Arc::new(Platform::new(os)),
            Arc::clone(&log) as Arc<dyn Log>,
            self.documents.path().to_path_buf(),
        )
        .with_executor(executor)
        .with_env_store(Arc::new(StaticEnvStore("C:\\Windows".to_string())))
        .with_cloner(cloner)
        .with_prompter(prompter)
        .with_fs_ops(Arc::new(SystemFileSystemOps))
        .with_env(self.env());
        (ctx, log)
    }
}

fn startup_folder(root: &Path) -> PathBuf {
    ["Microsoft", "Windows", "Start Menu", "Programs", "Startup"]
        .iter()
        .fold(root.to_path_buf(), |path, part| path.join(part))
}
