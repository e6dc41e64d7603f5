//! Document Export Module
//!
//! Exporting hands the user the active document's current surface content as
//! a download named after the document id. It never talks to the server and
//! never touches session state, so unsaved edits export as-is.

pub mod download;

pub use download::{write_to_dir, ExportedDocument};
