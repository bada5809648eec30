//! Leveled console logging for conversion runs.
//!
//! Log lines go to stderr so stdout only carries the confirmation line.
//! Errors are reported by the caller, not through this logger.

use once_cell::sync::Lazy;
use std::sync::atomic::{AtomicU8, Ordering};

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Success,
}

/// How much of the log reaches the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Nothing.
    Quiet,
    /// Everything but debug lines.
    #[default]
    Normal,
    /// Everything.
    Verbose,
}

impl Verbosity {
    fn as_u8(self) -> u8 {
        match self {
            Verbosity::Quiet => 0,
            Verbosity::Normal => 1,
            Verbosity::Verbose => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => Verbosity::Quiet,
            1 => Verbosity::Normal,
            _ => Verbosity::Verbose,
        }
    }

    /// Whether an entry of `level` is printed at this verbosity.
    pub fn allows(self, level: LogLevel) -> bool {
        match self {
            Verbosity::Quiet => false,
            Verbosity::Normal => level != LogLevel::Debug,
            Verbosity::Verbose => true,
        }
    }
}

/// A single log entry
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting level for sub-steps
    pub indent: u8,
}

impl LogEntry {
    pub fn debug(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Debug, message: message.into(), indent: 0 }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    /// Console rendering of this entry.
    pub fn render(&self) -> String {
        let prefix = match self.level {
            LogLevel::Debug => "   ·",
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
        };
        let indent = "   ".repeat(self.indent as usize);
        format!("{}{} {}", indent, prefix, self.message)
    }
}

/// Global logger
pub static LOGGER: Lazy<Logger> = Lazy::new(Logger::new);

/// Prints entries to stderr when the verbosity allows.
pub struct Logger {
    verbosity: AtomicU8,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            verbosity: AtomicU8::new(Verbosity::Normal.as_u8()),
        }
    }

    pub fn set_verbosity(&self, verbosity: Verbosity) {
        self.verbosity.store(verbosity.as_u8(), Ordering::Relaxed);
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_u8(self.verbosity.load(Ordering::Relaxed))
    }

    pub fn log(&self, entry: LogEntry) {
        if self.verbosity().allows(entry.level) {
            eprintln!("{}", entry.render());
        }
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

/// Set the console verbosity of the global logger.
pub fn set_verbosity(verbosity: Verbosity) {
    LOGGER.set_verbosity(verbosity);
}

pub fn log_debug(msg: impl Into<String>) {
    LOGGER.log(LogEntry::debug(msg));
}

pub fn log_info(msg: impl Into<String>) {
    LOGGER.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOGGER.log(LogEntry::success(msg));
}

pub fn log_debug_indent(msg: impl Into<String>, indent: u8) {
    LOGGER.log(LogEntry::debug(msg).with_indent(indent));
}
