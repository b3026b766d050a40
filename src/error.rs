//! Error handling for the ping-stats collector
//!
//! Only process-fatal conditions are modeled here. A failed probe run is
//! ordinary data (`models::RunFailure`) and never becomes an `AppError`.

use thiserror::Error;

/// Custom error types for the collector
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration file problems (missing, unreadable, malformed)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Semantic problems in an otherwise well-formed configuration
    #[error("Validation error: {0}")]
    Validation(String),

    /// The probe binary could not be found on the search path
    #[error("Binary not found: {0}")]
    BinaryNotFound(String),

    /// Report parsing invariant violations (not per-line skips)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// I/O errors (directory bootstrap, publication)
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create a new binary-not-found error
    pub fn binary_not_found<S: Into<String>>(message: S) -> Self {
        Self::BinaryNotFound(message.into())
    }

    /// Create a new parsing error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG",
            Self::Validation(_) => "VALIDATION",
            Self::BinaryNotFound(_) => "BINARY",
            Self::Parse(_) => "PARSE",
            Self::Io(_) => "IO",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Check if a later invocation could plausibly succeed without operator action
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Io(_) => true,
            Self::Config(_) | Self::Validation(_) | Self::BinaryNotFound(_) => false,
            Self::Parse(_) | Self::Internal(_) => false,
        }
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Config(msg) => {
                format!("Configuration problem: {}\n\nSuggestion: Check the YAML file passed via --config-file.", msg)
            }
            Self::Validation(msg) => {
                format!("Invalid input: {}\n\nSuggestion: Check target addresses, run counts, and output paths in the configuration file.", msg)
            }
            Self::BinaryNotFound(msg) => {
                format!("Probe binary missing: {}\n\nSuggestion: Install mtr and make sure it is on PATH for the user running the collector.", msg)
            }
            Self::Parse(msg) => {
                format!("Failed to parse data: {}\n\nThis is likely a bug. Please report it together with the raw mtr output.", msg)
            }
            Self::Io(msg) => {
                format!("File operation failed: {}\n\nSuggestion: Check directory permissions and disk space for the textfile collector paths.", msg)
            }
            Self::Internal(msg) => {
                format!("Internal error: {}\n\nThis is likely a bug. Please report this issue with the error details.", msg)
            }
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) => 2, // Invalid configuration/usage
            Self::BinaryNotFound(_) => 3,               // Environment not ready
            Self::Parse(_) => 4,                        // Report grammar violations
            Self::Io(_) => 5,                           // Bootstrap/publication issues
            Self::Internal(_) => 99,                    // Internal/unexpected errors
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::BinaryNotFound(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::Parse(_) => {
                    format!("[{}] {}", category.magenta().bold(), message.magenta())
                }
                Self::Io(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

// Standard library error conversions
impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::config(format!("YAML parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

impl From<regex::Error> for AppError {
    fn from(error: regex::Error) -> Self {
        Self::parse(format!("Pattern compile error: {}", error))
    }
}

impl From<std::net::AddrParseError> for AppError {
    fn from(error: std::net::AddrParseError) -> Self {
        Self::parse(format!("IP address parse error: {}", error))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::internal(format!("Worker task failed: {}", error))
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error reporter for structured error logging and user feedback
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    /// Create a new error reporter
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", error.format_for_console(self.use_color));

        if self.verbose {
            eprintln!();
            eprintln!("{}", error.user_friendly_message());

            if error.is_recoverable() {
                eprintln!();
                if self.use_color {
                    use colored::Colorize;
                    eprintln!(
                        "{}",
                        "This error might be temporary. The next collection cycle may succeed."
                            .green()
                    );
                } else {
                    eprintln!(
                        "This error might be temporary. The next collection cycle may succeed."
                    );
                }
            }
        }
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}
