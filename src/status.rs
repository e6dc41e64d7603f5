//! Status presentation
//!
//! Each document has a status line (`content.json · Dirty · Ln 3, Col 9`)
//! rendered from its session state, plus a transient one-line message left
//! by the last load/save/restore on that document. Messages stick around
//! until the next operation on the same document replaces or clears them;
//! cursor movement never touches them.

use crate::state::{SessionState, SessionStore};
use log::trace;
use std::collections::HashMap;

/// Separator between status line fields.
const SEPARATOR: &str = " · ";

/// Render a document's status line from its session state.
///
/// Cursor coordinates are shown 1-based.
pub fn render_line(document: &str, state: &SessionState) -> String {
    let cursor = state.cursor();
    format!(
        "{name}{sep}{flag}{sep}Ln {line}, Col {column}",
        name = document,
        sep = SEPARATOR,
        flag = if state.is_dirty() { "Dirty" } else { "Saved" },
        line = cursor.line + 1,
        column = cursor.column + 1,
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Status View
// ─────────────────────────────────────────────────────────────────────────────

/// What the status area shows for the active document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub document: &'static str,
    pub line: String,
    pub message: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Presenter
// ─────────────────────────────────────────────────────────────────────────────

/// Rendered status lines and transient messages, per document.
#[derive(Debug, Default)]
pub struct StatusPresenter {
    lines: HashMap<&'static str, String>,
    messages: HashMap<&'static str, String>,
}

impl StatusPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-render `document`'s status line from the store.
    pub fn refresh(&mut self, store: &SessionStore, document: &'static str) {
        if let Some(state) = store.get(document) {
            let line = render_line(document, state);
            trace!("Status: {}", line);
            self.lines.insert(document, line);
        }
    }

    /// Last rendered status line for `document`.
    pub fn line(&self, document: &str) -> Option<&str> {
        self.lines.get(document).map(String::as_str)
    }

    /// Replace `document`'s transient message.
    pub fn set_message(&mut self, document: &'static str, message: impl Into<String>) {
        self.messages.insert(document, message.into());
    }

    /// Clear `document`'s transient message.
    pub fn clear_message(&mut self, document: &str) {
        self.messages.remove(document);
    }

    /// Current transient message for `document`.
    pub fn message(&self, document: &str) -> Option<&str> {
        self.messages.get(document).map(String::as_str)
    }

    /// Status for the active document only; other documents stay hidden.
    pub fn view(&self, store: &SessionStore) -> Option<StatusView> {
        let document = store.active()?;
        Some(StatusView {
            document,
            line: self.line(document)?.to_string(),
            message: self.message(document).map(str::to_string),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_clean_at_origin() {
        let state = SessionState::default();
        assert_eq!(
            render_line("content.json", &state),
            "content.json · Saved · Ln 1, Col 1"
        );
    }

    #[test]
    fn test_render_dirty_with_cursor() {
        let mut store = SessionStore::new();
        store.mark_synced("Caddyfile", ":80");
        store.record_content_change("Caddyfile", ":8080");
        store.record_cursor("Caddyfile", 2, 8);
        assert_eq!(
            render_line("Caddyfile", store.get("Caddyfile").unwrap()),
            "Caddyfile · Dirty · Ln 3, Col 9"
        );
    }

    #[test]
    fn test_refresh_requires_session() {
        let store = SessionStore::new();
        let mut presenter = StatusPresenter::new();
        presenter.refresh(&store, "content.json");
        assert!(presenter.line("content.json").is_none());
    }

    #[test]
    fn test_messages_are_per_document() {
        let mut presenter = StatusPresenter::new();
        presenter.set_message("content.json", "Saved successfully.");
        presenter.set_message("Caddyfile", "Validate failed: boom");
        assert_eq!(presenter.message("content.json"), Some("Saved successfully."));

        presenter.clear_message("content.json");
        assert_eq!(presenter.message("content.json"), None);
        assert_eq!(presenter.message("Caddyfile"), Some("Validate failed: boom"));
    }

    #[test]
    fn test_refresh_keeps_message() {
        let mut store = SessionStore::new();
        store.mark_synced("Caddyfile", "");
        let mut presenter = StatusPresenter::new();
        presenter.set_message("Caddyfile", "Saved. Restart Caddy Required.");

        store.record_cursor("Caddyfile", 0, 4);
        presenter.refresh(&store, "Caddyfile");
        assert_eq!(presenter.message("Caddyfile"), Some("Saved. Restart Caddy Required."));
    }

    #[test]
    fn test_view_shows_only_active_document() {
        let mut store = SessionStore::new();
        store.mark_synced("content.json", "{}");
        store.mark_synced("Caddyfile", ":80");
        let mut presenter = StatusPresenter::new();
        presenter.refresh(&store, "content.json");
        presenter.refresh(&store, "Caddyfile");
        presenter.set_message("content.json", "hello");

        assert!(presenter.view(&store).is_none());

        store.set_active("Caddyfile");
        let view = presenter.view(&store).unwrap();
        assert_eq!(view.document, "Caddyfile");
        assert_eq!(view.line, "Caddyfile · Saved · Ln 1, Col 1");
        assert_eq!(view.message, None);
    }
}
