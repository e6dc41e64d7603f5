//! Centralized error handling for the editor
//!
//! This module provides a unified error type covering every way a load, save,
//! export, backup, or configuration operation can fail. Workflow operations
//! convert these into a status message plus a log entry at the operation
//! boundary; nothing here is ever allowed to take the session down.

use log::warn;
use std::fmt;
use std::io;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the editor.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type for the editor.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Document Workflow Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// The requested document id is not in the registry
    UnknownDocument(String),

    /// Save or export was requested while no document owns the surface
    NoActiveDocument,

    /// A load or save is already outstanding for this document
    OperationInFlight { document: &'static str },

    /// Reading the document from the server failed
    LoadTransport { document: &'static str, cause: String },

    /// Structured content failed to parse before anything was sent
    LocalValidation {
        document: &'static str,
        message: String,
    },

    /// Writing the document to the server failed at the transport level
    SaveTransport { document: &'static str, cause: String },

    /// The server accepted the request but rejected the content at a stage
    PipelineStage {
        document: &'static str,
        stage: String,
        output: Option<String>,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Backup Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Restoring over a document with unsaved edits was refused
    UnsavedChanges { document: &'static str },

    /// A backup list, fetch, or restore request failed
    BackupTransport { document: &'static str, cause: String },

    // ─────────────────────────────────────────────────────────────────────────
    // File I/O Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic I/O error wrapper
    Io(io::Error),

    /// Failed to write an exported document
    FileWrite { path: PathBuf, source: io::Error },

    // ─────────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Failed to load configuration file
    ConfigLoad {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to save configuration file
    ConfigSave {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse configuration (invalid JSON/format)
    ConfigParse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration directory not found or inaccessible
    ConfigDirNotFound,

    // ─────────────────────────────────────────────────────────────────────────
    // Application Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic application error with a message
    Application(String),
}

impl Error {
    /// The registered document this error belongs to, if any.
    ///
    /// Used by the status presenter to decide which document's transient
    /// message slot the error lands in.
    pub fn document(&self) -> Option<&'static str> {
        match self {
            Error::OperationInFlight { document }
            | Error::LoadTransport { document, .. }
            | Error::LocalValidation { document, .. }
            | Error::SaveTransport { document, .. }
            | Error::PipelineStage { document, .. }
            | Error::UnsavedChanges { document }
            | Error::BackupTransport { document, .. } => Some(*document),
            _ => None,
        }
    }
}

// Implement From traits for convenient error conversion
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigParse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display trait implementation for user-friendly error messages
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Document Workflow Errors
            Error::UnknownDocument(id) => write!(f, "Unknown document: {}", id),
            Error::NoActiveDocument => write!(f, "No file selected"),
            Error::OperationInFlight { document } => {
                write!(f, "{}: another operation is still in progress", document)
            }
            Error::LoadTransport { cause, .. } => write!(f, "Error loading file: {}", cause),
            Error::LocalValidation { message, .. } => write!(f, "Invalid JSON: {}", message),
            Error::SaveTransport { .. } => write!(f, "Error saving file"),
            Error::PipelineStage { stage, output, .. } => match output {
                Some(output) => write!(f, "{} failed: {}", stage, output),
                None => write!(f, "{} failed", stage),
            },

            // Backup Errors
            Error::UnsavedChanges { document } => {
                write!(f, "'{}' has unsaved changes. Save or reload first.", document)
            }
            Error::BackupTransport { cause, .. } => write!(f, "Backup request failed: {}", cause),

            // File I/O Errors
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::FileWrite { path, source } => {
                write!(f, "Failed to write '{}': {}", path.display(), source)
            }

            // Configuration Errors
            Error::ConfigLoad { path, source } => {
                write!(
                    f,
                    "Failed to load configuration from '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigSave { path, source } => {
                write!(
                    f,
                    "Failed to save configuration to '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigParse { message, .. } => {
                write!(f, "Invalid configuration format: {}", message)
            }
            Error::ConfigDirNotFound => {
                write!(f, "Configuration directory not found")
            }

            // Application Errors
            Error::Application(msg) => write!(f, "{}", msg),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// std::error::Error trait implementation for error chaining
// ─────────────────────────────────────────────────────────────────────────────
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::FileWrite { source, .. } => Some(source),
            Error::ConfigLoad { source, .. } => Some(source.as_ref()),
            Error::ConfigSave { source, .. } => Some(source.as_ref()),
            Error::ConfigParse { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Result to support graceful degradation.
pub trait ResultExt<T> {
    /// If the result is an error, log it at warning level and return the provided default.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
