use thiserror::Error;

/// Main error type for the BSpec graph engine
#[derive(Error, Debug)]
pub enum BspecError {
    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Frontmatter / YAML parse errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Document parsed but failed required-field or format checks
    #[error("Invalid document {path}: {}", .errors.join("; "))]
    InvalidDocument {
        path: String,
        errors: Vec<String>,
    },

    /// Document not found
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// JSON serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// MCP protocol errors
    #[error("MCP protocol error: {0}")]
    McpProtocol(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Convenient Result type using BspecError
pub type Result<T> = std::result::Result<T, BspecError>;
