//! Utility functions for log paths, ANSI stripping, and time formatting.
use std::path::{Path, PathBuf};

/// Strip ANSI escape sequences from a string.
///
/// Handles SGR sequences (ending in `m`) and other CSI sequences (ending
/// in any letter in the `@`..`~` range).
pub(super) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            if let Some(next) = chars.next()
                && next == '['
            {
                for inner in chars.by_ref() {
                    if ('@'..='~').contains(&inner) {
                        break;
                    }
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Location of the run log inside the documents folder.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use pixie::logging::log_file_path;
///
/// let path = log_file_path(Path::new("/home/jane/Documents"));
/// assert!(path.ends_with("Pixie/log.txt"));
/// ```
#[must_use]
pub fn log_file_path(documents: &Path) -> PathBuf {
    documents.join("Pixie").join("log.txt")
}

/// Format the current local time as `YYYY/MM/DD HH:MM:SS.ffffff`.
pub(super) fn format_timestamp() -> String {
    chrono::Local::now()
        .format("%Y/%m/%d %H:%M:%S%.6f")
        .to_string()
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn strip_ansi_removes_colors() {
        assert_eq!(strip_ansi("\x1b[31mERROR\x1b[0m hello"), "ERROR hello");
        assert_eq!(strip_ansi("no codes here"), "no codes here");
        assert_eq!(
            strip_ansi("\x1b[1;34m==>\x1b[0m \x1b[1mstage\x1b[0m"),
            "==> stage"
        );
    }

    #[test]
    fn strip_ansi_handles_csi_sequences() {
        assert_eq!(strip_ansi("\x1b[2Jhello"), "hello");
        assert_eq!(strip_ansi("\x1b[Kworld"), "world");
        assert_eq!(strip_ansi("\x1bMtext"), "text");
    }

    #[test]
    fn log_file_lives_under_pixie_folder() {
        let path = log_file_path(Path::new("docs"));
        assert_eq!(path, Path::new("docs").join("Pixie").join("log.txt"));
    }

    #[test]
    fn timestamp_has_microseconds() {
        let s = format_timestamp();
        assert_eq!(s.len(), 26, "YYYY/MM/DD HH:MM:SS.ffffff is 26 chars: {s}");
        assert_eq!(&s[4..5], "/");
        assert_eq!(&s[10..11], " ");
        assert_eq!(&s[19..20], ".");
    }
}
