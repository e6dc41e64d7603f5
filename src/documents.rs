//! Document type registry
//!
//! The fixed set of server-managed documents this editor can open, together
//! with everything the workflow needs to know about each one: its syntax mode,
//! where to read and write it, how it travels over the wire, and where its
//! backups live. Lookup is exact-match only; there is no pattern matching on
//! ids and nothing can be registered at runtime.

use crate::editor::SyntaxMode;
use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Wire Format
// ─────────────────────────────────────────────────────────────────────────────

/// How a document's bytes travel to and from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    /// JSON: canonicalized on load, validated locally and form-encoded on save
    Structured,
    /// Raw text in both directions
    PlainText,
}

impl WireFormat {
    /// Check if this format is validated locally before saving.
    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backup Endpoints
// ─────────────────────────────────────────────────────────────────────────────

/// Admin endpoints exposing a document's rolling backup history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupEndpoints {
    /// `GET`, returns `{"backups": [...]}` newest first
    pub list: &'static str,
    /// `GET` with a `name` query parameter, returns the backup body
    pub fetch: &'static str,
    /// `POST` with `{"name": ...}`
    pub restore: &'static str,
}

// ─────────────────────────────────────────────────────────────────────────────
// Document Type
// ─────────────────────────────────────────────────────────────────────────────

/// Static description of one editable document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentType {
    /// Registry key, also the display name and the export file name
    pub id: &'static str,
    pub syntax_mode: SyntaxMode,
    pub read_endpoint: &'static str,
    pub write_endpoint: &'static str,
    pub wire_format: WireFormat,
    pub backups: BackupEndpoints,
    /// Message shown when the server acknowledges a save without pipeline detail
    pub saved_message: &'static str,
}

/// The structured data document served to the landing page.
pub const CONTENT_JSON: DocumentType = DocumentType {
    id: "content.json",
    syntax_mode: SyntaxMode::Json,
    read_endpoint: "/api/content",
    write_endpoint: "/api/upload",
    wire_format: WireFormat::Structured,
    backups: BackupEndpoints {
        list: "/api/admin/content/backups",
        fetch: "/api/admin/content/backup",
        restore: "/api/admin/content/restore",
    },
    saved_message: "Saved successfully.",
};

/// The reverse proxy configuration.
pub const CADDYFILE: DocumentType = DocumentType {
    id: "Caddyfile",
    syntax_mode: SyntaxMode::Caddyfile,
    read_endpoint: "/admin/caddyfile",
    write_endpoint: "/admin/caddyfile",
    wire_format: WireFormat::PlainText,
    backups: BackupEndpoints {
        list: "/api/admin/caddyfile/backups",
        fetch: "/api/admin/caddyfile/backup",
        restore: "/api/admin/caddyfile/restore",
    },
    saved_message: "Saved. Restart Caddy Required.",
};

static REGISTRY: [DocumentType; 2] = [CONTENT_JSON, CADDYFILE];

/// All registered documents, in display order.
pub fn all() -> &'static [DocumentType] {
    &REGISTRY
}

/// Resolve a document id to its static description.
///
/// # Errors
///
/// Returns `Error::UnknownDocument` if `id` is not an exact match for a
/// registered document.
pub fn resolve(id: &str) -> Result<&'static DocumentType> {
    REGISTRY
        .iter()
        .find(|doc| doc.id == id)
        .ok_or_else(|| Error::UnknownDocument(id.to_string()))
}

/// Check whether `id` names a registered document.
pub fn is_registered(id: &str) -> bool {
    resolve(id).is_ok()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_content_json() {
        let doc = resolve("content.json").unwrap();
        assert_eq!(doc.syntax_mode, SyntaxMode::Json);
        assert_eq!(doc.read_endpoint, "/api/content");
        assert_eq!(doc.write_endpoint, "/api/upload");
        assert!(doc.wire_format.is_structured());
    }

    #[test]
    fn test_resolve_caddyfile() {
        let doc = resolve("Caddyfile").unwrap();
        assert_eq!(doc.syntax_mode, SyntaxMode::Caddyfile);
        assert_eq!(doc.read_endpoint, "/admin/caddyfile");
        assert_eq!(doc.write_endpoint, "/admin/caddyfile");
        assert_eq!(doc.wire_format, WireFormat::PlainText);
    }

    #[test]
    fn test_resolve_is_exact_match() {
        assert!(matches!(
            resolve("caddyfile"),
            Err(Error::UnknownDocument(id)) if id == "caddyfile"
        ));
        assert!(resolve("content").is_err());
        assert!(resolve("content.json ").is_err());
        assert!(resolve("*.json").is_err());
        assert!(resolve("").is_err());
    }

    #[test]
    fn test_registry_ids_are_unique() {
        let ids: Vec<_> = all().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec!["content.json", "Caddyfile"]);
    }

    #[test]
    fn test_backup_endpoints_are_per_document() {
        assert_ne!(CONTENT_JSON.backups, CADDYFILE.backups);
        assert!(CADDYFILE.backups.list.contains("caddyfile"));
        assert!(CONTENT_JSON.backups.restore.contains("content"));
    }

    #[test]
    fn test_is_registered() {
        assert!(is_registered("Caddyfile"));
        assert!(!is_registered("nginx.conf"));
    }
}
