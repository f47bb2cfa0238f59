//! Process environment threaded explicitly through the pipeline.
//!
//! Installers change the machine and user `PATH` while the run is in
//! progress.  Instead of mutating the process-wide table, each refresh
//! produces a new [`ProcessEnv`] overlay which the run context stores and
//! every subsequent command is spawned with.

use std::path::Path;

use anyhow::{Result, bail};

use crate::error::ResourceError;

/// Separator between entries of a `PATH`-style variable on this platform.
pub const PATH_SEPARATOR: char = if cfg!(windows) { ';' } else { ':' };

/// Overlay of environment variables applied on top of the inherited process
/// environment.
///
/// Names compare case-insensitively, matching how Windows treats them.
///
/// # Examples
///
/// ```
/// use pixie::environment::ProcessEnv;
///
/// let env = ProcessEnv::new().with_var("APPDATA", "/users/jane/appdata");
/// assert_eq!(env.get("appdata").as_deref(), Some("/users/jane/appdata"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessEnv {
    vars: Vec<(String, String)>,
}

impl ProcessEnv {
    /// Create an empty overlay that inherits everything from the process.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`set`](Self::set).
    #[must_use]
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Set `name` in the overlay, replacing any existing entry of the same
    /// name regardless of case.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.vars.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.vars.push((name, value.into()));
    }

    /// Look up `name`, preferring the overlay over the inherited environment.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        self.vars
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.clone())
            .or_else(|| std::env::var(name).ok())
    }

    /// Variables set on top of the inherited environment, in insertion order.
    pub fn overrides(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Append `dir` to `PATH` unless it is already listed.
    pub fn append_path(&mut self, dir: &Path) {
        let dir = dir.to_string_lossy();
        let current = self.get("PATH").unwrap_or_default();
        let already_listed = current
            .split(PATH_SEPARATOR)
            .any(|entry| entry.eq_ignore_ascii_case(&dir));
        if already_listed {
            return;
        }
        let updated = if current.is_empty() {
            dir.into_owned()
        } else {
            format!("{current}{PATH_SEPARATOR}{dir}")
        };
        self.set("PATH", updated);
    }

    /// Expand environment variable references in a configured path.
    ///
    /// Supports `%VAR%`, `$VAR`, `${VAR}` and a leading `~`.  A reference to
    /// a variable that is not set is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::UnknownVariable`] naming the first variable
    /// that could not be resolved.
    pub fn expand(&self, input: &str) -> Result<String, ResourceError> {
        let unknown = |var: &str| ResourceError::UnknownVariable {
            input: input.to_string(),
            var: var.to_string(),
        };

        let home = || self.get("USERPROFILE").or_else(|| self.get("HOME"));
        let posix = |text: &str, at_start: bool| -> Result<String, String> {
            let context =
                |name: &str| -> Result<Option<String>, ()> { self.get(name).map(Some).ok_or(()) };
            let expanded = if at_start {
                shellexpand::full_with_context(text, home, context)
            } else {
                shellexpand::env_with_context(text, context)
            };
            expanded.map(std::borrow::Cow::into_owned).map_err(|e| e.var_name)
        };

        expand_percent(input, |name| self.get(name), posix, true).map_err(|var| unknown(&var))
    }

    /// Expand `%VAR%` references, leaving unknown ones untouched.
    ///
    /// Used for registry values stored as `REG_EXPAND_SZ`.
    #[must_use]
    pub fn expand_lenient(&self, input: &str) -> String {
        expand_percent(input, |name| self.get(name), |text, _| Ok(text.to_string()), false)
            .unwrap_or_else(|_| input.to_string())
    }
}

/// Expand `%VAR%` references.  A lone `%` or `%%` is kept literally.
///
/// Text between references goes through `literal`, which is told whether the
/// text starts the input; substituted values are copied as-is and never
/// rescanned.  In strict mode the first unresolved name is returned as the
/// error; otherwise unresolved references are copied through unchanged.
fn expand_percent(
    input: &str,
    mut lookup: impl FnMut(&str) -> Option<String>,
    mut literal: impl FnMut(&str, bool) -> Result<String, String>,
    strict: bool,
) -> Result<String, String> {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('%') {
        let (before, after_start) = rest.split_at(start);
        if !before.is_empty() {
            out.push_str(&literal(before, rest.len() == input.len())?);
        }
        let tail = after_start.get(1..).unwrap_or_default();
        match tail.find('%') {
            Some(end) if end > 0 => {
                let name = tail.get(..end).unwrap_or_default();
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None if strict => return Err(name.to_string()),
                    None => {
                        out.push('%');
                        out.push_str(name);
                        out.push('%');
                    }
                }
                rest = tail.get(end + 1..).unwrap_or_default();
            }
            Some(_) => {
                out.push_str("%%");
                rest = tail.get(1..).unwrap_or_default();
            }
            None => {
                out.push('%');
                rest = tail;
            }
        }
    }
    if !rest.is_empty() {
        out.push_str(&literal(rest, rest.len() == input.len())?);
    }
    Ok(out)
}

/// Read access to the persistent machine and user environment.
pub trait EnvStore: Send + Sync {
    /// Read a machine-scope variable; `Ok(None)` when it is not defined.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn machine_var(&self, name: &str) -> Result<Option<String>>;

    /// Read a user-scope variable; `Ok(None)` when it is not defined.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn user_var(&self, name: &str) -> Result<Option<String>>;
}

/// [`EnvStore`] backed by the Windows registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryEnvStore;

#[cfg(windows)]
const MACHINE_ENV_KEY: &str = r"SYSTEM\CurrentControlSet\Control\Session Manager\Environment";

#[cfg(windows)]
const USER_ENV_KEY: &str = "Environment";

#[cfg(windows)]
fn read_registry_var(root: &winreg::RegKey, key_path: &str, name: &str) -> Result<Option<String>> {
    use anyhow::Context as _;
    use winreg::enums::KEY_READ;

    let key = root
        .open_subkey_with_flags(key_path, KEY_READ)
        .with_context(|| format!("opening registry key {key_path}"))?;
    match key.get_value::<String, _>(name) {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("reading {name} from {key_path}")),
    }
}

impl EnvStore for RegistryEnvStore {
    #[cfg(windows)]
    fn machine_var(&self, name: &str) -> Result<Option<String>> {
        read_registry_var(
            &winreg::RegKey::predef(winreg::enums::HKEY_LOCAL_MACHINE),
            MACHINE_ENV_KEY,
            name,
        )
    }

    #[cfg(windows)]
    fn user_var(&self, name: &str) -> Result<Option<String>> {
        read_registry_var(
            &winreg::RegKey::predef(winreg::enums::HKEY_CURRENT_USER),
            USER_ENV_KEY,
            name,
        )
    }

    #[cfg(not(windows))]
    fn machine_var(&self, _name: &str) -> Result<Option<String>> {
        Err(unsupported().into())
    }

    #[cfg(not(windows))]
    fn user_var(&self, _name: &str) -> Result<Option<String>> {
        Err(unsupported().into())
    }
}

#[cfg(not(windows))]
fn unsupported() -> crate::error::PlatformError {
    crate::error::PlatformError::Unsupported {
        platform: std::env::consts::OS.to_string(),
    }
}

/// Re-read `PATH` and `ChocolateyInstall` from the persistent store.
///
/// The new `PATH` is the machine value followed by the user value, with
/// `%VAR%` references expanded.  Everything else in `current` is kept.
///
/// # Errors
///
/// Returns an error if the store cannot be read or holds no `PATH` at all.
pub fn refresh(store: &dyn EnvStore, current: &ProcessEnv) -> Result<ProcessEnv> {
    let machine = store.machine_var("Path")?.unwrap_or_default();
    let user = store.user_var("Path")?.unwrap_or_default();
    if machine.trim().is_empty() && user.trim().is_empty() {
        bail!("no Path variable found in the machine or user environment");
    }

    let separator = PATH_SEPARATOR.to_string();
    let path = [machine, user]
        .iter()
        .map(|p| p.trim().trim_end_matches(PATH_SEPARATOR))
        .filter(|p| !p.is_empty())
        .map(|p| current.expand_lenient(p))
        .collect::<Vec<_>>()
        .join(separator.as_str());

    let mut env = current.clone();
    env.set("PATH", path);
    if let Some(choco) = store.machine_var("ChocolateyInstall")?
        && !choco.is_empty()
    {
        env.set("ChocolateyInstall", current.expand_lenient(&choco));
    }
    Ok(env)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapStore {
        machine: HashMap<String, String>,
        user: HashMap<String, String>,
    }

    impl EnvStore for MapStore {
        fn machine_var(&self, name: &str) -> Result<Option<String>> {
            Ok(self.machine.get(name).cloned())
        }

        fn user_var(&self, name: &str) -> Result<Option<String>> {
            Ok(self.user.get(name).cloned())
        }
    }

    struct BrokenStore;

    impl EnvStore for BrokenStore {
        fn machine_var(&self, _: &str) -> Result<Option<String>> {
            bail!("registry unavailable")
        }

        fn user_var(&self, _: &str) -> Result<Option<String>> {
            bail!("registry unavailable")
        }
    }

    #[test]
    fn set_replaces_case_insensitively() {
        let mut env = ProcessEnv::new().with_var("Path", "a");
        env.set("PATH", "b");
        assert_eq!(env.overrides().count(), 1);
        assert_eq!(env.get("path").as_deref(), Some("b"));
    }

    #[test]
    fn get_falls_back_to_process_environment() {
        let env = ProcessEnv::new();
        let key = if cfg!(windows) { "SystemRoot" } else { "PATH" };
        assert_eq!(env.get(key), std::env::var(key).ok());
    }

    #[test]
    fn append_path_skips_existing_entry() {
        let mut env = ProcessEnv::new().with_var("PATH", format!("/a{PATH_SEPARATOR}/b"));
        env.append_path(Path::new("/b"));
        assert_eq!(env.get("PATH").unwrap(), format!("/a{PATH_SEPARATOR}/b"));
        env.append_path(Path::new("/c"));
        assert_eq!(
            env.get("PATH").unwrap(),
            format!("/a{PATH_SEPARATOR}/b{PATH_SEPARATOR}/c")
        );
    }

    #[test]
    fn expand_supports_all_reference_forms() {
        let env = ProcessEnv::new()
            .with_var("PIXIE_TEST_APPDATA", "/data")
            .with_var("PIXIE_TEST_USER", "jane");
        assert_eq!(
            env.expand("%PIXIE_TEST_APPDATA%/Code/settings.json").unwrap(),
            "/data/Code/settings.json"
        );
        assert_eq!(
            env.expand("$PIXIE_TEST_APPDATA/${PIXIE_TEST_USER}.json").unwrap(),
            "/data/jane.json"
        );
    }

    #[test]
    fn expand_reports_unknown_variable() {
        let env = ProcessEnv::new();
        let err = env.expand("%PIXIE_TEST_UNSET_VAR%/x").unwrap_err();
        assert!(
            matches!(err, ResourceError::UnknownVariable { ref var, .. } if var == "PIXIE_TEST_UNSET_VAR"),
            "unexpected error: {err}"
        );

        let err = env.expand("$PIXIE_TEST_UNSET_VAR/x").unwrap_err();
        assert!(err.to_string().contains("PIXIE_TEST_UNSET_VAR"));
    }

    #[test]
    fn expand_does_not_rescan_substituted_values() {
        let env = ProcessEnv::new().with_var("PIXIE_TEST_BIN", "C:\\$Recycle.Bin");
        assert_eq!(
            env.expand("%PIXIE_TEST_BIN%\\config.json").unwrap(),
            "C:\\$Recycle.Bin\\config.json"
        );
    }

    #[test]
    fn expand_mixes_percent_and_dollar_references() {
        let env = ProcessEnv::new()
            .with_var("PIXIE_TEST_APPDATA", "/data")
            .with_var("PIXIE_TEST_USER", "jane");
        assert_eq!(
            env.expand("%PIXIE_TEST_APPDATA%/$PIXIE_TEST_USER/100%").unwrap(),
            "/data/jane/100%"
        );
    }

    #[test]
    fn expand_keeps_plain_paths() {
        let env = ProcessEnv::new();
        assert_eq!(env.expand("C:/Tools/app.json").unwrap(), "C:/Tools/app.json");
        assert_eq!(env.expand("100%").unwrap(), "100%");
    }

    #[test]
    fn expand_lenient_leaves_unknown_references() {
        let env = ProcessEnv::new().with_var("PIXIE_TEST_ROOT", "C:\\Windows");
        assert_eq!(
            env.expand_lenient("%PIXIE_TEST_ROOT%\\system32;%PIXIE_TEST_UNSET_VAR%\\bin"),
            "C:\\Windows\\system32;%PIXIE_TEST_UNSET_VAR%\\bin"
        );
    }

    #[test]
    fn refresh_joins_machine_and_user_path() {
        let mut store = MapStore::default();
        store.machine.insert("Path".into(), "/machine".into());
        store.user.insert("Path".into(), "/user".into());
        store
            .machine
            .insert("ChocolateyInstall".into(), "/choco".into());

        let current = ProcessEnv::new().with_var("KEEP", "me");
        let env = refresh(&store, &current).unwrap();
        assert_eq!(
            env.get("PATH").unwrap(),
            format!("/machine{PATH_SEPARATOR}/user")
        );
        assert_eq!(env.get("ChocolateyInstall").as_deref(), Some("/choco"));
        assert_eq!(env.get("KEEP").as_deref(), Some("me"));
    }

    #[test]
    fn refresh_with_only_machine_path() {
        let mut store = MapStore::default();
        store.machine.insert("Path".into(), "/machine".into());
        let env = refresh(&store, &ProcessEnv::new()).unwrap();
        assert_eq!(env.get("PATH").unwrap(), "/machine");
    }

    #[test]
    fn refresh_fails_without_any_path() {
        let err = refresh(&MapStore::default(), &ProcessEnv::new()).unwrap_err();
        assert!(err.to_string().contains("no Path variable"));
    }

    #[test]
    fn refresh_propagates_store_errors() {
        let err = refresh(&BrokenStore, &ProcessEnv::new()).unwrap_err();
        assert!(err.to_string().contains("registry unavailable"));
    }

    #[cfg(not(windows))]
    #[test]
    fn registry_store_is_unsupported_off_windows() {
        let err = RegistryEnvStore.machine_var("Path").unwrap_err();
        assert!(err.to_string().contains("only supported on Windows"));
    }
}
