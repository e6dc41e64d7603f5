//! Contract with the text editing surface
//!
//! The surface owns the live buffer, the cursor, and highlighting. It knows
//! nothing about dirty state or servers. We talk to it in two directions:
//!
//! - **Down**: a [`Transaction`] applies a content replacement and/or a syntax
//!   mode reconfiguration as one update, so a frame can never show new content
//!   under the old mode or the reverse.
//! - **Up**: the surface reports edits and cursor movement as [`SurfaceEvent`]s
//!   on a channel which the session manager drains synchronously.
//!
//! [`MemorySurface`] is a headless implementation used by the command-line
//! driver and by tests.

use super::mode::SyntaxMode;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use log::trace;

// ─────────────────────────────────────────────────────────────────────────────
// Events
// ─────────────────────────────────────────────────────────────────────────────

/// Notifications emitted by the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// The buffer changed; carries the full content after the change
    ContentChanged { content: String },
    /// The primary cursor moved to a character offset
    SelectionChanged { offset: usize },
}

/// Receiving half of a surface's event channel.
pub type SurfaceEvents = UnboundedReceiver<SurfaceEvent>;

// ─────────────────────────────────────────────────────────────────────────────
// Transaction
// ─────────────────────────────────────────────────────────────────────────────

/// A single atomic update to the surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    /// Replace the entire buffer with this text
    pub content: Option<String>,
    /// Reconfigure highlighting to this mode
    pub syntax_mode: Option<SyntaxMode>,
}

impl Transaction {
    /// A transaction replacing all content.
    pub fn replace_all(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            syntax_mode: None,
        }
    }

    /// A transaction that only reconfigures the syntax mode.
    pub fn reconfigure(mode: SyntaxMode) -> Self {
        Self {
            content: None,
            syntax_mode: Some(mode),
        }
    }

    /// Attach an optional mode reconfiguration to this transaction.
    pub fn with_syntax_mode(mut self, mode: Option<SyntaxMode>) -> Self {
        self.syntax_mode = mode;
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Surface Trait
// ─────────────────────────────────────────────────────────────────────────────

/// What the workflow needs from an editing surface.
pub trait EditorSurface {
    /// Apply a transaction as one observable update.
    ///
    /// A content replacement emits `ContentChanged`; a mode reconfiguration
    /// on its own emits nothing.
    fn dispatch(&mut self, transaction: Transaction);

    /// Read the entire buffer.
    fn content(&self) -> String;

    /// Character offset of the primary cursor.
    fn cursor_offset(&self) -> usize;
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Surface
// ─────────────────────────────────────────────────────────────────────────────

/// Headless surface holding its buffer in memory.
#[derive(Debug)]
pub struct MemorySurface {
    content: String,
    cursor: usize,
    syntax_mode: SyntaxMode,
    events: UnboundedSender<SurfaceEvent>,
    transactions: Vec<Transaction>,
}

impl MemorySurface {
    /// Create an empty surface and the receiver for its events.
    pub fn new() -> (Self, SurfaceEvents) {
        Self::with_content("")
    }

    /// Create a surface with initial content, cursor at the start.
    pub fn with_content(initial: impl Into<String>) -> (Self, SurfaceEvents) {
        let (tx, rx) = mpsc::unbounded();
        let surface = Self {
            content: initial.into(),
            cursor: 0,
            syntax_mode: SyntaxMode::default(),
            events: tx,
            transactions: Vec::new(),
        };
        (surface, rx)
    }

    /// Current highlighting mode.
    pub fn syntax_mode(&self) -> SyntaxMode {
        self.syntax_mode
    }

    /// Every transaction dispatched so far, oldest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Replace the buffer the way a user would (select all, type), leaving the
    /// cursor at the end.
    pub fn edit(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.content.chars().count();
        self.emit(SurfaceEvent::ContentChanged {
            content: self.content.clone(),
        });
        self.emit(SurfaceEvent::SelectionChanged {
            offset: self.cursor,
        });
    }

    /// Move the cursor, clamped to the buffer.
    pub fn move_cursor(&mut self, offset: usize) {
        self.cursor = offset.min(self.content.chars().count());
        self.emit(SurfaceEvent::SelectionChanged {
            offset: self.cursor,
        });
    }

    fn emit(&self, event: SurfaceEvent) {
        trace!("Surface event: {:?}", event);
        // A dropped receiver just means nobody is listening any more
        let _ = self.events.unbounded_send(event);
    }
}

impl EditorSurface for MemorySurface {
    fn dispatch(&mut self, transaction: Transaction) {
        if let Some(mode) = transaction.syntax_mode {
            self.syntax_mode = mode;
        }
        if let Some(content) = &transaction.content {
            let changed = *content != self.content;
            self.content = content.clone();
            self.cursor = 0;
            if changed {
                self.emit(SurfaceEvent::ContentChanged {
                    content: self.content.clone(),
                });
            }
            self.emit(SurfaceEvent::SelectionChanged { offset: 0 });
        }
        self.transactions.push(transaction);
    }

    fn content(&self) -> String {
        self.content.clone()
    }

    fn cursor_offset(&self) -> usize {
        self.cursor
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
