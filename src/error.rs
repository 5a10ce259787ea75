//! Error types for the edge extraction pipeline

use std::fmt;

/// Errors that can occur while loading, normalizing, triangulating or writing
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeError {
    /// Configuration validation failed
    InvalidConfig(String),
    /// The input file could not be opened
    InputUnreadable(String),
    /// Reading the input failed after it was opened
    InputReadFailed(String),
    /// The output file could not be created
    OutputUnwritable(String),
    /// Writing the output failed after it was created
    OutputWriteFailed(String),
    /// No points were read from the input
    EmptyInput,
    /// The bounding extent has zero width or is not finite
    DegenerateExtent(String),
    /// The triangulation engine reported a failure
    EngineFailed(String),
    /// Engine self-checks found an inconsistent triangulation
    ValidationFailed(String),
}

impl fmt::Display for EdgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            EdgeError::InputUnreadable(msg) => write!(f, "cannot open input file: {}", msg),
            EdgeError::InputReadFailed(msg) => write!(f, "cannot read input file: {}", msg),
            EdgeError::OutputUnwritable(msg) => write!(f, "cannot open output file: {}", msg),
            EdgeError::OutputWriteFailed(msg) => write!(f, "cannot write output file: {}", msg),
            EdgeError::EmptyInput => write!(f, "input contains no points"),
            EdgeError::DegenerateExtent(msg) => write!(f, "degenerate bounding extent: {}", msg),
            EdgeError::EngineFailed(msg) => write!(f, "triangulation failed: {}", msg),
            EdgeError::ValidationFailed(msg) => write!(f, "triangulation check failed: {}", msg),
        }
    }
}

impl std::error::Error for EdgeError {}

/// Result type alias for edge pipeline operations
pub type Result<T> = std::result::Result<T, EdgeError>;
