//! Per-application configuration file mappings.
use serde::Deserialize;

/// One `[apps.<name>]` entry: a file in the cloned repository and where it
/// should be copied to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppEntry {
    /// Path relative to the root of the cloned repository.
    pub source: String,
    /// Destination path; may reference environment variables.
    pub destination: String,
}
