//! Error types for lvgen
//!
//! One error enum covers every stage of the generation pipeline. The variants
//! follow the pipeline's failure taxonomy: configuration, schema, template,
//! collision, filesystem, router patching, menu registration and timeouts.

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::types::Stage;

/// The main error type for lvgen
#[derive(Debug, Error)]
pub enum GenError {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Bad or unparseable table, module or database identifier
    #[error("Invalid configuration: {0}")]
    Config(String),

    // ========================================================================
    // Schema Errors
    // ========================================================================
    /// Metadata query against the schema store failed
    #[error("Schema query failed{}: {message}", table_suffix(.table))]
    Schema {
        table: Option<String>,
        message: String,
    },

    // ========================================================================
    // Template Errors
    // ========================================================================
    /// Template asset is malformed or a required binding is missing
    #[error("Template rendering failed for '{artifact}': {message}")]
    Template { artifact: String, message: String },

    // ========================================================================
    // File Synthesis Errors
    // ========================================================================
    /// Target artifact already exists and overwriting was not allowed
    #[error("File already exists: {0}")]
    Exists(PathBuf),

    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    /// Directory creation failed
    #[error("Failed to create directory '{path}': {message}")]
    DirectoryCreate { path: PathBuf, message: String },

    // ========================================================================
    // Router Errors
    // ========================================================================
    /// Router file no longer has the shape the patcher expects
    #[error("Router anchor '{anchor}' not found in '{path}'")]
    PatchAnchorNotFound { path: PathBuf, anchor: String },

    // ========================================================================
    // Menu Errors
    // ========================================================================
    /// The menu store rejected or failed the create/delete call
    #[error("Menu registration failed: {0}")]
    MenuRegistration(String),

    // ========================================================================
    // Deadline Errors
    // ========================================================================
    /// A blocking collaborator call exceeded its deadline
    #[error("{stage} timed out after {}ms", .after.as_millis())]
    Timeout { stage: Stage, after: Duration },

    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

fn table_suffix(table: &Option<String>) -> String {
    match table {
        Some(t) => format!(" for table '{}'", t),
        None => String::new(),
    }
}

/// Coarse classification of a [`GenError`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Config,
    Schema,
    Template,
    Exists,
    Io,
    PatchAnchorNotFound,
    MenuRegistration,
    Timeout,
    Other,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Config => "ConfigError",
            ErrorKind::Schema => "SchemaError",
            ErrorKind::Template => "TemplateError",
            ErrorKind::Exists => "ExistsError",
            ErrorKind::Io => "IOError",
            ErrorKind::PatchAnchorNotFound => "PatchAnchorNotFound",
            ErrorKind::MenuRegistration => "MenuRegistrationError",
            ErrorKind::Timeout => "TimeoutError",
            ErrorKind::Other => "Error",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl GenError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        GenError::Config(msg.into())
    }

    /// Create a schema error, optionally scoped to one table
    pub fn schema(table: Option<&str>, msg: impl Into<String>) -> Self {
        GenError::Schema {
            table: table.map(str::to_string),
            message: msg.into(),
        }
    }

    /// Create a template error for one artifact
    pub fn template(artifact: impl Into<String>, msg: impl Into<String>) -> Self {
        GenError::Template {
            artifact: artifact.into(),
            message: msg.into(),
        }
    }

    /// Create a menu registration error
    pub fn menu(msg: impl Into<String>) -> Self {
        GenError::MenuRegistration(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        GenError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenError::Config(_) => ErrorKind::Config,
            GenError::Schema { .. } => ErrorKind::Schema,
            GenError::Template { .. } => ErrorKind::Template,
            GenError::Exists(_) => ErrorKind::Exists,
            GenError::Io(_)
            | GenError::FileRead { .. }
            | GenError::FileWrite { .. }
            | GenError::DirectoryCreate { .. } => ErrorKind::Io,
            GenError::PatchAnchorNotFound { .. } => ErrorKind::PatchAnchorNotFound,
            GenError::MenuRegistration(_) => ErrorKind::MenuRegistration,
            GenError::Timeout { .. } => ErrorKind::Timeout,
            GenError::WithContext { .. } => ErrorKind::Other,
        }
    }

    /// Only deadline expiry is worth retrying; every other failure is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GenError::Timeout { .. })
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        self.kind() == ErrorKind::Io
    }

    /// Check if this error is an artifact collision
    pub fn is_exists(&self) -> bool {
        matches!(self, GenError::Exists(_))
    }
}

/// Result type alias using GenError
pub type GenResult<T> = Result<T, GenError>;

/// Attach pipeline context to a foreign error.
///
/// The path-taking methods produce the `FileRead` / `FileWrite` /
/// `DirectoryCreate` variants so call sites keep the offending path.
pub trait ResultExt<T> {
    /// Wrap the error as `GenError::WithContext`
    fn with_context<C: Into<String>>(self, context: C) -> GenResult<T>;

    fn read_context(self, path: &Path) -> GenResult<T>;

    fn write_context(self, path: &Path) -> GenResult<T>;

    fn create_context(self, path: &Path) -> GenResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> GenResult<T> {
        self.map_err(|e| GenError::WithContext {
            context: context.into(),
            message: e.to_string(),
        })
    }

    fn read_context(self, path: &Path) -> GenResult<T> {
        self.map_err(|e| GenError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn write_context(self, path: &Path) -> GenResult<T> {
        self.map_err(|e| GenError::FileWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn create_context(self, path: &Path) -> GenResult<T> {
        self.map_err(|e| GenError::DirectoryCreate {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
