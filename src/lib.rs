//! caddyLander editor sessions
//!
//! Editing workflow for the two server-managed documents of a caddyLander
//! deployment: the landing page's `content.json` and the proxy's `Caddyfile`.
//! One editing surface is shared between them; [`workflow::WorkflowController`]
//! tracks per-document dirty state and cursor, switches highlighting on
//! activation, and drives loads and saves through the server's
//! validate/format/commit pipeline.

pub mod admin;
pub mod config;
pub mod documents;
pub mod editor;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod state;
pub mod status;
pub mod transport;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
pub use workflow::WorkflowController;
