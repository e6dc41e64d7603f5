//! User settings
//!
//! This module defines the `Settings` struct that holds the connection and
//! workflow options, with serde support for JSON persistence.

use crate::documents;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Main Settings Struct
// ─────────────────────────────────────────────────────────────────────────────

/// Connection details and editor preferences.
///
/// This struct is serialized to JSON and persisted to the user's config directory.
/// All fields have sensible defaults via the `Default` trait and `#[serde(default)]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Server
    // ─────────────────────────────────────────────────────────────────────────
    /// Base URL of the caddyLander admin server
    pub server_url: String,

    /// Basic auth user name (the server only checks the password)
    pub username: String,

    /// Basic auth password for admin endpoints
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    // ─────────────────────────────────────────────────────────────────────────
    // Documents
    // ─────────────────────────────────────────────────────────────────────────
    /// Document opened when none is named
    pub default_document: String,

    /// Directory exported documents are written to (current directory if unset)
    pub export_directory: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Server
            server_url: String::from("http://localhost:8080"),
            username: String::from("admin"),
            password: None,
            request_timeout_secs: 30,

            // Documents
            default_document: String::from(documents::CONTENT_JSON.id),
            export_directory: None,
        }
    }
}

impl Settings {
    // ─────────────────────────────────────────────────────────────────────────
    // Validation Constants and Sanitization
    // ─────────────────────────────────────────────────────────────────────────

    /// Minimum request timeout.
    pub const MIN_TIMEOUT_SECS: u64 = 1;
    /// Maximum request timeout.
    pub const MAX_TIMEOUT_SECS: u64 = 300;

    /// Sanitize settings by clamping values to valid ranges.
    ///
    /// This is useful after loading settings from a file that might have
    /// been manually edited with invalid values.
    pub fn sanitize(&mut self) {
        self.request_timeout_secs = self
            .request_timeout_secs
            .clamp(Self::MIN_TIMEOUT_SECS, Self::MAX_TIMEOUT_SECS);

        // Trailing slashes would double up when joined with endpoint paths
        let trimmed = self.server_url.trim().trim_end_matches('/');
        self.server_url = if trimmed.is_empty() {
            Self::default().server_url
        } else {
            trimmed.to_string()
        };

        if !documents::is_registered(&self.default_document) {
            self.default_document = Self::default().default_document;
        }

        if self.password.as_deref() == Some("") {
            self.password = None;
        }
    }

    /// Load settings and sanitize them to ensure validity.
    ///
    /// This is a convenience method that deserializes and then sanitizes.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
