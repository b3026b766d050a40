//! Configuration loading and lint checks

pub mod parser;
pub mod validation;

// Re-export main functionality
pub use parser::{display_config_summary, load_config, load_file, ConfigParser};
pub use validation::{validate_config, ConfigValidator, ValidationLevel, ValidationWarning};

// Re-export from models for convenience
pub use crate::models::Config;
