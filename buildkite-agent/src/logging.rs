//! Logging infrastructure for the agent.
//!
//! The library emits messages through the [`log`] facade. The CLI installs a
//! [`Logger`], which writes `LEVEL: message` lines to stderr.

use std::sync::atomic::{AtomicBool, Ordering};

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use owo_colors::{OwoColorize, Style};

/// A stderr logger with optional coloured level prefixes.
///
/// The level and colour can be changed after installation, so the CLI can
/// install it before configuration is resolved and adjust it afterwards.
///
/// # Examples
///
/// ```
/// use buildkite_agent::Logger;
/// use log::{Level, LevelFilter};
///
/// let logger = Logger::new(false, false);
/// assert_eq!(logger.level(), LevelFilter::Info);
/// assert_eq!(logger.format(Level::Warn, "disk is nearly full"), "WARN: disk is nearly full");
/// ```
#[derive(Debug)]
pub struct Logger {
    debug: AtomicBool,
    color: AtomicBool,
}

impl Logger {
    /// Create a logger showing debug messages when `debug` is set, and info
    /// and above otherwise.
    #[must_use]
    pub const fn new(debug: bool, color: bool) -> Self {
        Self {
            debug: AtomicBool::new(debug),
            color: AtomicBool::new(color),
        }
    }

    /// The most verbose level this logger shows.
    #[must_use]
    pub fn level(&self) -> LevelFilter {
        if self.debug.load(Ordering::Relaxed) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    /// Whether level prefixes are coloured.
    #[must_use]
    pub fn color(&self) -> bool {
        self.color.load(Ordering::Relaxed)
    }

    /// Switch the level and colour in place.
    ///
    /// If this is the installed logger, the global maximum level follows.
    pub fn configure(&self, debug: bool, no_color: bool) {
        self.debug.store(debug, Ordering::Relaxed);
        self.color.store(!no_color, Ordering::Relaxed);
        if std::ptr::addr_eq(log::logger(), self) {
            log::set_max_level(self.level());
        }
    }

    /// Render a single log line, without the trailing newline.
    #[must_use]
    pub fn format(&self, level: Level, message: &str) -> String {
        if self.color() {
            format!("{}: {message}", level.as_str().style(Self::style(level)))
        } else {
            format!("{}: {message}", level.as_str())
        }
    }

    fn style(level: Level) -> Style {
        match level {
            Level::Error => Style::new().red().bold(),
            Level::Warn => Style::new().yellow(),
            Level::Info => Style::new().green(),
            Level::Debug | Level::Trace => Style::new().dimmed(),
        }
    }

    /// Install as the global logger, returning the installed instance so it
    /// can be reconfigured later.
    ///
    /// # Errors
    ///
    /// Returns an error if a global logger is already installed.
    pub fn install(self) -> Result<&'static Logger, SetLoggerError> {
        let logger: &'static Logger = Box::leak(Box::new(self));
        log::set_logger(logger)?;
        log::set_max_level(logger.level());
        Ok(logger)
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level()
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata()) {
            eprintln!("{}", self.format(record.level(), &record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(false, true)
    }
}

/// Build the logger for the resolved `debug` and `no-color` settings.
///
/// # Examples
///
/// ```
/// use buildkite_agent::init_logger;
/// use log::LevelFilter;
///
/// assert_eq!(init_logger(false, false).level(), LevelFilter::Info);
/// assert_eq!(init_logger(true, false).level(), LevelFilter::Debug);
/// assert!(!init_logger(false, true).color());
/// ```
#[must_use]
pub fn init_logger(debug: bool, no_color: bool) -> Logger {
    Logger::new(debug, !no_color)
}
