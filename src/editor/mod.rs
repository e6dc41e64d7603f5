//! Editor module
//!
//! This module contains the contract with the text editing surface, the
//! syntax mode selector that reconfigures it, and cursor position helpers.

mod mode;
mod position;
mod surface;

pub use mode::{ModeSelector, SyntaxMode};
pub use position::{offset_to_position, CursorPosition};
pub use surface::{EditorSurface, MemorySurface, SurfaceEvent, SurfaceEvents, Transaction};
