//! Tracing subscriber setup: console formatter, file layer, and initialisation.
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use super::utils::{format_timestamp, strip_ansi};

/// Target used for stage headers.
pub(super) const STAGE_TARGET: &str = "pixie::stage";

/// Extracts the `message` field from a [`tracing::Event`].
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl tracing::field::Visit for MessageExtractor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

/// A [`tracing_subscriber::Layer`] that appends every event to the run log
/// as `<timestamp> [LEVEL] message`, with ANSI codes stripped.
///
/// The file is opened once in append mode and closed when the layer (and
/// the subscriber owning it) is dropped.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Open (or create) the log file at `path`, creating its directory.
    pub(super) fn open(path: &Path) -> std::io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

/// Render one log file line for an event.
fn file_line(level: tracing::Level, target: &str, msg: &str) -> String {
    let ts = format_timestamp();
    let msg = strip_ansi(msg);
    match (level, target) {
        (tracing::Level::INFO, STAGE_TARGET) => format!("{ts} [INFO] ==> {msg}"),
        (tracing::Level::ERROR, _) => format!("{ts} [ERROR] {msg}"),
        (tracing::Level::WARN, _) => format!("{ts} [WARN] {msg}"),
        (tracing::Level::INFO, _) => format!("{ts} [INFO] {msg}"),
        _ => format!("{ts} [DEBUG] {msg}"),
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let line = file_line(*metadata.level(), metadata.target(), &extractor.message);

        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// A [`tracing_subscriber::fmt::FormatEvent`] that emits pixie-style
/// console output.
struct PixieFormatter;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for PixieFormatter
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let level = *metadata.level();

        let mut extractor = MessageExtractor::default();
        event.record(&mut extractor);
        let msg = &extractor.message;

        match level {
            tracing::Level::ERROR => writeln!(writer, "\x1b[31mERROR\x1b[0m {msg}"),
            tracing::Level::WARN => writeln!(writer, "\x1b[33mWARN\x1b[0m  {msg}"),
            tracing::Level::INFO if metadata.target() == STAGE_TARGET => {
                writeln!(writer, "\x1b[1;35m==>\x1b[0m \x1b[1m{msg}\x1b[0m")
            }
            tracing::Level::INFO => writeln!(writer, "  {msg}"),
            _ => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Install the [`tracing`] subscriber for this thread of control.
///
/// The console layer writes warnings and errors to stderr and everything
/// else to stdout, showing `debug` events only when `verbose` is set.  When
/// `log_file` is given, a file layer appends every event (including
/// `debug`) to it.
///
/// The returned guard keeps the subscriber installed; dropping it at the end
/// of the run closes the log file.
///
/// # Errors
///
/// Returns an error if the log file or its directory cannot be created.
pub fn init_subscriber(
    verbose: bool,
    log_file: Option<&Path>,
) -> std::io::Result<tracing::dispatcher::DefaultGuard> {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _};

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = std::io::stderr
        .with_max_level(tracing::Level::WARN)
        .and(std::io::stdout.with_min_level(tracing::Level::INFO));

    let console_layer = fmt::layer()
        .event_format(PixieFormatter)
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer = log_file
        .map(FileLayer::open)
        .transpose()?
        .map(|l| l.with_filter(LevelFilter::DEBUG));

    let subscriber = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer);
    Ok(tracing::dispatcher::set_default(&tracing::Dispatch::new(
        subscriber,
    )))
}
