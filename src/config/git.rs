//! Version-control identity configuration.
use serde::Deserialize;

/// Default name of the git package in the Chocolatey repository.
pub const DEFAULT_PACKAGE: &str = "git";

/// `[git]` section: the package to install first and the global identity
/// applied right after it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GitIdentity {
    /// Package name installed before every other package.
    pub package: String,
    /// Value for `user.name`; empty leaves the key untouched.
    pub user_name: String,
    /// Value for `user.email`; empty leaves the key untouched.
    pub user_email: String,
}

impl Default for GitIdentity {
    fn default() -> Self {
        Self {
            package: DEFAULT_PACKAGE.to_string(),
            user_name: String::new(),
            user_email: String::new(),
        }
    }
}

impl GitIdentity {
    /// The `(key, value)` pairs to set globally, skipping empty values.
    #[must_use]
    pub fn settings(&self) -> Vec<(&'static str, &str)> {
        [("user.name", self.user_name.as_str()), ("user.email", self.user_email.as_str())]
            .into_iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .collect()
    }
}
