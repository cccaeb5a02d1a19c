/// Structured error types for juicectl-core.
///
/// Uses `thiserror` so library consumers get composable errors.
/// The binary (juicectl-cli) wraps these in `anyhow` for context.
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for juicectl-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// A setting is missing, or a config file or variable holds an invalid value
    #[error("Configuration error: {reason}")]
    Config { reason: String },

    /// Any failure reported by the database driver (connect, query, constraint)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Catalog file could not be read or parsed
    #[error("Catalog error in {path:?}: {reason}")]
    Catalog { path: PathBuf, reason: String },

    /// Row addressed by id does not exist
    #[error("Not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    /// Stock adjustment would leave a size with negative stock
    #[error("Insufficient stock for size {size_id}: have {available}, change {change}")]
    InsufficientStock {
        size_id: i32,
        available: i32,
        change: i32,
    },
}

/// Result type alias for juicectl-core operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Create a catalog error
    pub fn catalog(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Catalog {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}
