//! Load/save workflow controller
//!
//! The controller sits between the editing surface and the server. It owns the
//! session store, the syntax mode selector, and the status presenter, and is
//! the only place where surface content acquires a meaning (dirty, saved,
//! belonging to a particular document).
//!
//! Each network operation is split into a synchronous `begin_*` step that
//! captures everything the request needs (including the document id) and a
//! synchronous `finish_*` step that reconciles the answer. The async `load`
//! and `save` methods just await the transport in between. All state changes
//! happen inside `begin_*`/`finish_*`, never across an await.
//!
//! Errors are caught at the operation boundary: each one is logged once and
//! turned into the owning document's status message before being returned.

use crate::admin::{self, BackupEntry, RestoreReceipt};
use crate::documents::{self, DocumentType};
use crate::editor::{
    offset_to_position, EditorSurface, ModeSelector, SurfaceEvent, SurfaceEvents, Transaction,
};
use crate::error::{Error, Result};
use crate::export::ExportedDocument;
use crate::pipeline::PipelineResult;
use crate::state::SessionStore;
use crate::status::{StatusPresenter, StatusView};
use crate::transport::{RequestBody, Response, Transport, TransportError};
use futures::{FutureExt, StreamExt};
use log::{debug, error, info, warn};

/// Form field carrying structured content on save.
const CONTENT_FIELD: &str = "content";

/// Callback fired whenever a document's backup history may have changed.
pub type BackupObserver = Box<dyn FnMut()>;

// ─────────────────────────────────────────────────────────────────────────────
// Tickets
// ─────────────────────────────────────────────────────────────────────────────

/// An issued load request. Holds the document's in-flight claim.
#[derive(Debug)]
#[must_use = "a ticket must be passed to finish_load to release its document"]
pub struct LoadTicket {
    document: &'static DocumentType,
}

impl LoadTicket {
    pub fn document(&self) -> &'static DocumentType {
        self.document
    }
}

/// An issued save request.
///
/// The document and the content are captured when the request is issued; the
/// answer reconciles exactly this pair, whatever is active by then.
#[derive(Debug)]
#[must_use = "a ticket must be passed to finish_save to release its document"]
pub struct SaveTicket {
    document: &'static DocumentType,
    content: String,
}

impl SaveTicket {
    pub fn document(&self) -> &'static DocumentType {
        self.document
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Encode the captured content for the document's write endpoint.
    pub fn request_body(&self) -> RequestBody {
        if self.document.wire_format.is_structured() {
            RequestBody::Form(vec![(CONTENT_FIELD.to_string(), self.content.clone())])
        } else {
            RequestBody::Text(self.content.clone())
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Controller
// ─────────────────────────────────────────────────────────────────────────────

/// Session manager for one shared editing surface.
pub struct WorkflowController<S: EditorSurface, T: Transport> {
    surface: S,
    events: SurfaceEvents,
    transport: T,
    sessions: SessionStore,
    modes: ModeSelector,
    status: StatusPresenter,
    observers: Vec<BackupObserver>,
}

impl<S: EditorSurface, T: Transport> WorkflowController<S, T> {
    /// Create a controller around `surface`, consuming its event channel.
    pub fn new(surface: S, events: SurfaceEvents, transport: T) -> Self {
        Self {
            surface,
            events,
            transport,
            sessions: SessionStore::new(),
            modes: ModeSelector::new(),
            status: StatusPresenter::new(),
            observers: Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable surface access, standing in for the user typing.
    ///
    /// Events raised through it are applied on the next `pump_events`.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn active_document(&self) -> Option<&'static str> {
        self.sessions.active()
    }

    /// Status line and message of the active document.
    pub fn status_view(&self) -> Option<StatusView> {
        self.status.view(&self.sessions)
    }

    /// Transient message for `document`, shown or not.
    pub fn message(&self, document: &str) -> Option<&str> {
        self.status.message(document)
    }

    /// Rendered status line for `document`, shown or not.
    pub fn status_line(&self, document: &str) -> Option<&str> {
        self.status.line(document)
    }

    /// Check if any document has unsaved changes, counting pending edits.
    pub fn has_unsaved_changes(&mut self) -> bool {
        self.pump_events();
        self.sessions.has_unsaved_changes()
    }

    /// Register a callback fired after every synced save and every restore.
    pub fn on_backups_changed(&mut self, observer: impl FnMut() + 'static) {
        self.observers.push(Box::new(observer));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Surface Events
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply every pending surface event to the active document.
    ///
    /// Events arriving while nothing is active are dropped. A selection offset
    /// is measured against the content of the last `ContentChanged` before it
    /// in the batch, or the live buffer if none came first. Surfaces report a
    /// selection after every change, so the final cursor always matches the
    /// final content.
    pub fn pump_events(&mut self) {
        let mut latest: Option<String> = None;
        let mut touched = false;

        while let Some(Some(event)) = self.events.next().now_or_never() {
            let Some(document) = self.sessions.active() else {
                debug!("Dropping surface event with no active document: {:?}", event);
                continue;
            };
            match event {
                SurfaceEvent::ContentChanged { content } => {
                    self.sessions.record_content_change(document, &content);
                    latest = Some(content);
                }
                SurfaceEvent::SelectionChanged { offset } => {
                    let content = latest.get_or_insert_with(|| self.surface.content());
                    let position = offset_to_position(content, offset);
                    self.sessions
                        .record_cursor(document, position.line, position.column);
                }
            }
            touched = true;
        }

        if touched {
            if let Some(document) = self.sessions.active() {
                self.status.refresh(&self.sessions, document);
            }
        }
    }

    fn notify_backups_changed(&mut self) {
        debug!("Notifying {} backup observer(s)", self.observers.len());
        for observer in &mut self.observers {
            observer();
        }
    }

    /// Log `err` once and leave it as its document's status message.
    fn report<V>(&mut self, err: Error) -> Result<V> {
        match &err {
            Error::LoadTransport { document, cause }
            | Error::SaveTransport { document, cause }
            | Error::BackupTransport { document, cause } => {
                error!("{}: {} ({})", document, err, cause)
            }
            _ => warn!("{}", err),
        }
        if let Some(document) = err.document() {
            self.status.set_message(document, err.to_string());
            self.status.refresh(&self.sessions, document);
        }
        Err(err)
    }

    fn claim(&mut self, document: &'static DocumentType) -> Result<()> {
        if self.sessions.begin_operation(document.id) {
            Ok(())
        } else {
            self.report(Error::OperationInFlight {
                document: document.id,
            })
        }
    }

    fn resolve(&mut self, id: &str) -> Result<&'static DocumentType> {
        match documents::resolve(id) {
            Ok(document) => Ok(document),
            Err(err) => self.report(err),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Load
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch document `id` from the server and make it the active document.
    pub async fn load(&mut self, id: &str) -> Result<()> {
        let ticket = self.begin_load(id)?;
        let response = self.transport.get(ticket.document.read_endpoint).await;
        self.finish_load(ticket, response)
    }

    /// Resolve `id` and claim it for a load. Nothing else changes.
    pub fn begin_load(&mut self, id: &str) -> Result<LoadTicket> {
        let document = self.resolve(id)?;
        self.claim(document)?;
        debug!("Loading {} from {}", document.id, document.read_endpoint);
        Ok(LoadTicket { document })
    }

    /// Reconcile a load answer.
    ///
    /// On failure the surface and the active document stay as they were.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        response: std::result::Result<Response, TransportError>,
    ) -> Result<()> {
        let document = ticket.document;
        self.sessions.end_operation(document.id);

        let text = match decode_load(document, response) {
            Ok(text) => text,
            Err(err) => return self.report(err),
        };

        // Pending edits belong to whatever was active before the swap
        self.pump_events();

        let mode = self.modes.transition(document);
        self.surface
            .dispatch(Transaction::replace_all(text.clone()).with_syntax_mode(mode));
        self.sessions.set_active(document.id);
        self.sessions.mark_synced(document.id, text);
        self.pump_events();

        let position = offset_to_position(&self.surface.content(), self.surface.cursor_offset());
        self.sessions
            .record_cursor(document.id, position.line, position.column);

        self.status.clear_message(document.id);
        self.status.refresh(&self.sessions, document.id);
        info!("Loaded {}", document.id);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Save
    // ─────────────────────────────────────────────────────────────────────────

    /// Send the active document's content to the server.
    ///
    /// Returns the status message left on success.
    pub async fn save(&mut self) -> Result<String> {
        let ticket = self.begin_save()?;
        let response = self
            .transport
            .post(ticket.document.write_endpoint, ticket.request_body())
            .await;
        self.finish_save(ticket, response)
    }

    /// Capture the active document's content and claim it for a save.
    ///
    /// Structured content that does not parse is rejected here, before any
    /// request is made.
    pub fn begin_save(&mut self) -> Result<SaveTicket> {
        self.pump_events();

        let Some(id) = self.sessions.active() else {
            return self.report(Error::NoActiveDocument);
        };
        let document = self.resolve(id)?;
        let content = self.surface.content();

        if document.wire_format.is_structured() {
            if let Err(e) = serde_json::from_str::<serde_json::Value>(&content) {
                return self.report(Error::LocalValidation {
                    document: document.id,
                    message: e.to_string(),
                });
            }
        }

        self.claim(document)?;
        debug!(
            "Saving {} ({} bytes) to {}",
            document.id,
            content.len(),
            document.write_endpoint
        );
        Ok(SaveTicket { document, content })
    }

    /// Reconcile a save answer against the ticket's document.
    pub fn finish_save(
        &mut self,
        ticket: SaveTicket,
        response: std::result::Result<Response, TransportError>,
    ) -> Result<String> {
        let document = ticket.document;
        self.sessions.end_operation(document.id);

        let result = match decode_save(document, response) {
            Ok(result) => result,
            Err(err) => return self.report(err),
        };

        let message = match result {
            PipelineResult::Failed { stage, output } => {
                return self.report(Error::PipelineStage {
                    document: document.id,
                    stage: stage.display_name(),
                    output,
                });
            }
            PipelineResult::Complete { message } => {
                message.unwrap_or_else(|| document.saved_message.to_string())
            }
            PipelineResult::Accepted { stage } => {
                debug!("{} accepted at stage {:?}", document.id, stage);
                document.saved_message.to_string()
            }
            PipelineResult::Legacy => document.saved_message.to_string(),
        };

        self.pump_events();
        self.sessions.mark_synced(document.id, ticket.content);
        if self.sessions.active() == Some(document.id) {
            // Edits made while the request was out stay unsaved
            let current = self.surface.content();
            self.sessions.record_content_change(document.id, &current);
        }

        self.status.set_message(document.id, message.clone());
        self.status.refresh(&self.sessions, document.id);
        info!("Saved {}: {}", document.id, message);
        self.notify_backups_changed();
        Ok(message)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Export
    // ─────────────────────────────────────────────────────────────────────────

    /// Snapshot the active document's surface content for download.
    pub fn export_active(&mut self) -> Result<ExportedDocument> {
        let Some(id) = self.sessions.active() else {
            return self.report(Error::NoActiveDocument);
        };
        Ok(ExportedDocument::new(id, self.surface.content()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Backups
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn list_backups(&mut self, id: &str) -> Result<Vec<BackupEntry>> {
        let document = self.resolve(id)?;
        match admin::list_backups(&self.transport, document).await {
            Ok(backups) => Ok(backups),
            Err(err) => self.report(err),
        }
    }

    /// Fetch a backup's body for preview. Session state is not touched.
    pub async fn fetch_backup(&mut self, id: &str, name: &str) -> Result<String> {
        let document = self.resolve(id)?;
        match admin::fetch_backup(&self.transport, document, name).await {
            Ok(body) => Ok(body),
            Err(err) => self.report(err),
        }
    }

    /// Restore backup `name` over document `id` on the server.
    ///
    /// Refused while the document has unsaved changes. The active document is
    /// reloaded afterwards so the surface shows what the server now holds.
    pub async fn restore_backup(&mut self, id: &str, name: &str) -> Result<RestoreReceipt> {
        let document = self.resolve(id)?;
        self.pump_events();
        if self
            .sessions
            .get(document.id)
            .is_some_and(|state| state.is_dirty())
        {
            return self.report(Error::UnsavedChanges {
                document: document.id,
            });
        }

        self.claim(document)?;
        let receipt = admin::restore_backup(&self.transport, document, name).await;
        self.sessions.end_operation(document.id);
        let receipt = match receipt {
            Ok(receipt) => receipt,
            Err(err) => return self.report(err),
        };

        self.notify_backups_changed();
        if self.sessions.active() == Some(document.id) {
            self.load(document.id).await?;
        }

        let mut message = format!("Restored {}.", name);
        if receipt.restart_required {
            message.push_str(" Restart Caddy Required.");
        }
        self.status.set_message(document.id, message);
        self.status.refresh(&self.sessions, document.id);
        Ok(receipt)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Response Decoding
// ─────────────────────────────────────────────────────────────────────────────

/// Turn a read answer into the text to display.
///
/// Structured documents are re-serialized with canonical indentation.
fn decode_load(
    document: &'static DocumentType,
    response: std::result::Result<Response, TransportError>,
) -> Result<String> {
    let failed = |cause: String| Error::LoadTransport {
        document: document.id,
        cause,
    };
    let response = response.map_err(|e| failed(e.to_string()))?;
    if !response.is_success() {
        return Err(failed(response.describe_failure()));
    }
    if !document.wire_format.is_structured() {
        return Ok(response.body);
    }

    let value: serde_json::Value = serde_json::from_str(&response.body)
        .map_err(|e| failed(format!("Invalid JSON from server: {}", e)))?;
    serde_json::to_string_pretty(&value).map_err(|e| failed(e.to_string()))
}

fn decode_save(
    document: &'static DocumentType,
    response: std::result::Result<Response, TransportError>,
) -> Result<PipelineResult> {
    let failed = |cause: String| Error::SaveTransport {
        document: document.id,
        cause,
    };
    let response = response.map_err(|e| failed(e.to_string()))?;
    if !response.is_success() {
        return Err(failed(response.describe_failure()));
    }
    PipelineResult::decode(&response.body)
        .map_err(|e| failed(format!("Unreadable save response: {}", e)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
