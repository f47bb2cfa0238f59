//! Interactive confirmation on the controlling terminal.
use std::io::{self, BufRead as _, Write as _};

/// Asks the user a question and returns the raw answer.
#[cfg_attr(test, mockall::automock)]
pub trait Prompter: Send + Sync {
    /// Show `question` and read one line of input.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal cannot be written or read.
    fn ask(&self, question: &str) -> io::Result<String>;
}

/// [`Prompter`] reading from standard input.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompter;

impl Prompter for StdinPrompter {
    fn ask(&self, question: &str) -> io::Result<String> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(question.as_bytes())?;
        stdout.write_all(b" ")?;
        stdout.flush()?;
        drop(stdout);

        let mut answer = String::new();
        let read = io::stdin().lock().read_line(&mut answer)?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no input available",
            ));
        }
        Ok(answer)
    }
}

/// Whether `answer` is a case-insensitive `y` or `yes`.
///
/// # Examples
///
/// ```
/// use pixie::prompt::is_affirmative;
///
/// assert!(is_affirmative("Y\n"));
/// assert!(is_affirmative(" yes "));
/// assert!(!is_affirmative("no"));
/// ```
#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Ask `question` and report whether the answer was affirmative.  A read
/// error counts as declining.
pub fn confirm(prompter: &dyn Prompter, question: &str) -> bool {
    prompter
        .ask(question)
        .is_ok_and(|answer| is_affirmative(&answer))
}
