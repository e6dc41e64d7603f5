//! Session state management
//!
//! This module defines the per-document `SessionState` record and the
//! `SessionStore` that owns every record, the single active-document slot,
//! and the per-document in-flight guard. Records are created lazily on first
//! activation and live for the rest of the process.

use crate::editor::CursorPosition;
use log::{debug, warn};
use std::collections::{HashMap, HashSet};

// ─────────────────────────────────────────────────────────────────────────────
// Session State
// ─────────────────────────────────────────────────────────────────────────────

/// Bookkeeping for one document.
///
/// `dirty` always equals `current content != last_synced_content` for the
/// most recent content the store has been told about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Content as of the last successful load or save
    last_synced_content: String,
    /// Whether the surface content differs from `last_synced_content`
    dirty: bool,
    /// Cursor position, 0-indexed
    cursor: CursorPosition,
}

impl SessionState {
    /// Check if the document has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Content as of the last successful load or save.
    pub fn last_synced_content(&self) -> &str {
        &self.last_synced_content
    }

    pub fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    /// Reset to a clean state with `content` as the new baseline.
    pub fn mark_synced(&mut self, content: impl Into<String>) {
        self.last_synced_content = content.into();
        self.dirty = false;
    }

    /// Recompute the dirty flag from the surface's current content.
    pub fn record_content_change(&mut self, current_content: &str) {
        self.dirty = current_content != self.last_synced_content;
    }

    /// Overwrite the cursor position.
    pub fn record_cursor(&mut self, position: CursorPosition) {
        self.cursor = position;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Store
// ─────────────────────────────────────────────────────────────────────────────

/// Owner of all session records and of the active-document slot.
#[derive(Debug, Default)]
pub struct SessionStore {
    /// One record per document ever activated
    sessions: HashMap<&'static str, SessionState>,
    /// Document currently bound to the surface
    active: Option<&'static str>,
    /// Documents with a load or save outstanding
    in_flight: HashSet<&'static str>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Records
    // ─────────────────────────────────────────────────────────────────────────

    /// Get the record for `document`, creating a clean one if needed.
    pub fn get_or_create(&mut self, document: &'static str) -> &mut SessionState {
        self.sessions.entry(document).or_insert_with(|| {
            debug!("Created session for {}", document);
            SessionState::default()
        })
    }

    /// Get the record for `document` without creating it.
    pub fn get(&self, document: &str) -> Option<&SessionState> {
        self.sessions.get(document)
    }

    /// Set a new clean baseline for `document`.
    ///
    /// Callers must re-render the document's status line afterwards.
    pub fn mark_synced(&mut self, document: &'static str, content: impl Into<String>) {
        self.get_or_create(document).mark_synced(content);
        debug!("{} synced", document);
    }

    /// Recompute `document`'s dirty flag from its current content.
    pub fn record_content_change(&mut self, document: &'static str, current_content: &str) {
        self.get_or_create(document)
            .record_content_change(current_content);
    }

    /// Overwrite `document`'s cursor position.
    pub fn record_cursor(&mut self, document: &'static str, line: usize, column: usize) {
        self.get_or_create(document)
            .record_cursor(CursorPosition::new(line, column));
    }

    /// Check if any document has unsaved changes.
    pub fn has_unsaved_changes(&self) -> bool {
        self.sessions.values().any(|s| s.is_dirty())
    }

    /// Number of documents with a session record.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Active Document
    // ─────────────────────────────────────────────────────────────────────────

    /// The document currently bound to the surface.
    pub fn active(&self) -> Option<&'static str> {
        self.active
    }

    /// Bind `document` to the surface.
    pub fn set_active(&mut self, document: &'static str) {
        if self.active != Some(document) {
            debug!("Active document: {:?} -> {}", self.active, document);
        }
        self.active = Some(document);
    }


    // ─────────────────────────────────────────────────────────────────────────
    // In-Flight Guard
    // ─────────────────────────────────────────────────────────────────────────

    /// Claim `document` for a load or save.
    ///
    /// Returns `false` if another operation on it is still outstanding.
    pub fn begin_operation(&mut self, document: &'static str) -> bool {
        if !self.in_flight.insert(document) {
            warn!("{} already has an operation in flight", document);
            return false;
        }
        true
    }

    /// Release the claim taken by `begin_operation`.
    pub fn end_operation(&mut self, document: &'static str) {
        self.in_flight.remove(document);
    }

    /// Check if `document` has an operation outstanding.
    pub fn is_busy(&self, document: &str) -> bool {
        self.in_flight.contains(document)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_is_idempotent() {
        let mut store = SessionStore::new();
        store.get_or_create("content.json").record_content_change("x");
        let state = store.get_or_create("content.json");
        assert!(state.is_dirty());
        assert_eq!(store.session_count(), 1);
    }

    #[test]
    fn test_new_session_is_clean_and_empty() {
        let mut store = SessionStore::new();
        let state = store.get_or_create("Caddyfile");
        assert!(!state.is_dirty());
        assert_eq!(state.last_synced_content(), "");
        assert_eq!(state.cursor(), CursorPosition::default());
    }

    #[test]
    fn test_dirty_tracks_final_content_of_a_burst() {
        let mut store = SessionStore::new();
        store.mark_synced("Caddyfile", ":80 {\n}\n");

        for content in [":80 {", ":80 {\n}", ":80 {\n}\n\n", ":80 {\n}\n"] {
            store.record_content_change("Caddyfile", content);
        }
        assert!(!store.get("Caddyfile").unwrap().is_dirty());

        store.record_content_change("Caddyfile", ":8080 {\n}\n");
        assert!(store.get("Caddyfile").unwrap().is_dirty());
    }

    #[test]
    fn test_mark_synced_resets_dirty() {
        let mut store = SessionStore::new();
        store.record_content_change("content.json", "{}");
        assert!(store.has_unsaved_changes());

        store.mark_synced("content.json", "{}");
        let state = store.get("content.json").unwrap();
        assert!(!state.is_dirty());
        assert_eq!(state.last_synced_content(), "{}");
        assert!(!store.has_unsaved_changes());
    }

    #[test]
    fn test_record_cursor_overwrites() {
        let mut store = SessionStore::new();
        store.record_cursor("content.json", 3, 7);
        store.record_cursor("content.json", 0, 1);
        assert_eq!(
            store.get("content.json").unwrap().cursor(),
            CursorPosition::new(0, 1)
        );
    }

    #[test]
    fn test_records_are_independent() {
        let mut store = SessionStore::new();
        store.mark_synced("content.json", "{}");
        store.mark_synced("Caddyfile", ":80");
        store.record_content_change("content.json", "{\"a\":1}");
        store.record_cursor("content.json", 2, 2);

        let caddy = store.get("Caddyfile").unwrap();
        assert!(!caddy.is_dirty());
        assert_eq!(caddy.cursor(), CursorPosition::default());
    }

    #[test]
    fn test_active_slot() {
        let mut store = SessionStore::new();
        assert_eq!(store.active(), None);

        store.get_or_create("Caddyfile");
        store.set_active("Caddyfile");
        assert_eq!(store.active(), Some("Caddyfile"));
    }

    #[test]
    fn test_in_flight_guard() {
        let mut store = SessionStore::new();
        assert!(store.begin_operation("content.json"));
        assert!(store.is_busy("content.json"));
        assert!(!store.begin_operation("content.json"));
        // Other documents are unaffected
        assert!(store.begin_operation("Caddyfile"));

        store.end_operation("content.json");
        assert!(!store.is_busy("content.json"));
        assert!(store.begin_operation("content.json"));
    }
}
