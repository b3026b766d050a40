//! Console logging for the collector
//!
//! Small leveled logger: info and below go to stdout, warnings and errors to
//! stderr so cron mail only carries problems. Per-run probe failures are
//! logged at warn level and never interrupt a collection cycle.

use crate::error::{AppError, Result};
use chrono::Local;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// Trace level - most detailed
    Trace = 0,
    /// Debug level - detailed information for debugging
    Debug = 1,
    /// Info level - general application information
    Info = 2,
    /// Warning level - potentially harmful situations
    Warn = 3,
    /// Error level - error events but application can continue
    Error = 4,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// Get ANSI color code for console output
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[37m", // White
            LogLevel::Debug => "\x1b[36m", // Cyan
            LogLevel::Info => "\x1b[32m",  // Green
            LogLevel::Warn => "\x1b[33m",  // Yellow
            LogLevel::Error => "\x1b[31m", // Red
        }
    }

    /// Reset ANSI color code
    pub fn reset_code() -> &'static str {
        "\x1b[0m"
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// Console logger with level filtering
#[derive(Debug)]
pub struct Logger {
    /// Logger name, shown in every line
    name: String,
    /// Minimum log level to output
    min_level: LogLevel,
    /// Whether to use colored output
    use_color: bool,
}

impl Logger {
    /// Create a new logger with default settings (warnings and errors only)
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            min_level: LogLevel::Warn,
            use_color: true,
        }
    }

    /// Create a logger from the usual verbosity flags
    pub fn with_flags<S: Into<String>>(name: S, verbose: bool, debug: bool, use_color: bool) -> Self {
        let min_level = if debug {
            LogLevel::Debug
        } else if verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        Self {
            name: name.into(),
            min_level,
            use_color,
        }
    }

    /// Set minimum log level
    pub fn set_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    /// Enable or disable colored output
    pub fn set_color(&mut self, use_color: bool) {
        self.use_color = use_color;
    }

    /// Check whether a message at this level would be emitted
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.min_level
    }

    /// Log a message at the given level
    pub fn log(&self, level: LogLevel, message: &str) {
        if !self.would_log(level) {
            return;
        }

        let line = self.format_console(level, message);
        if level >= LogLevel::Warn {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }

    /// Log a trace message
    pub fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, message);
    }

    /// Log a debug message
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    /// Log an info message
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    /// Log a warning message
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    /// Log an error message
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    fn format_console(&self, level: LogLevel, message: &str) -> String {
        let timestamp = Local::now().format("%H:%M:%S%.3f");

        if self.use_color {
            format!(
                "{} {}{:5}{} [{}] {}",
                timestamp,
                level.color_code(),
                level.as_str(),
                LogLevel::reset_code(),
                self.name,
                message
            )
        } else {
            format!("{} {:5} [{}] {}", timestamp, level.as_str(), self.name, message)
        }
    }
}
