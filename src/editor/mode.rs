//! Language mode selection for the shared editing surface
//!
//! One surface is shared by every document, so switching documents means
//! switching highlighting. The selector tracks which mode the surface is in
//! and hands out reconfiguration effects that ride along in the same
//! transaction as the content swap, never as a surface rebuild.

use super::surface::{EditorSurface, Transaction};
use crate::documents::DocumentType;
use log::debug;

// ─────────────────────────────────────────────────────────────────────────────
// Syntax Mode
// ─────────────────────────────────────────────────────────────────────────────

/// Highlighting modes the surface can be reconfigured to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyntaxMode {
    /// No highlighting; the surface starts here before any document loads
    #[default]
    Plain,
    /// JSON grammar
    Json,
    /// Caddyfile directives, highlighted with an nginx-style grammar
    Caddyfile,
}

impl SyntaxMode {
    /// Get a display name for this mode.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Plain => "Plain Text",
            Self::Json => "JSON",
            Self::Caddyfile => "Caddyfile",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mode Selector
// ─────────────────────────────────────────────────────────────────────────────

/// Tracks the surface's current syntax mode.
#[derive(Debug, Default)]
pub struct ModeSelector {
    current: SyntaxMode,
    switches: u64,
}

impl ModeSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mode the surface was last reconfigured to.
    pub fn current(&self) -> SyntaxMode {
        self.current
    }

    /// Number of reconfigurations handed out so far.
    pub fn switch_count(&self) -> u64 {
        self.switches
    }

    /// Reconfiguration needed to show `document`, if the mode differs.
    ///
    /// The returned mode must go into the transaction that is dispatched next;
    /// the selector records it as current immediately.
    pub fn transition(&mut self, document: &DocumentType) -> Option<SyntaxMode> {
        if self.current == document.syntax_mode {
            return None;
        }

        debug!(
            "Syntax mode {} -> {} for {}",
            self.current.display_name(),
            document.syntax_mode.display_name(),
            document.id
        );
        self.current = document.syntax_mode;
        self.switches += 1;
        Some(self.current)
    }

    /// Reconfigure the surface for `document` without touching its content.
    ///
    /// Returns `true` if a reconfiguration was dispatched.
    pub fn activate<S: EditorSurface>(&mut self, surface: &mut S, document: &DocumentType) -> bool {
        match self.transition(document) {
            Some(mode) => {
                surface.dispatch(Transaction::reconfigure(mode));
                true
            }
            None => false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
