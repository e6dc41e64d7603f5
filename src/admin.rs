//! Admin API client
//!
//! Backup history and server info live behind Basic-auth admin endpoints. The
//! server keeps a short rolling window of previous versions per document
//! (`content.json.old.1`, `Caddyfile.old.2`, ...) and can restore any of them
//! over the live file.

use crate::documents::DocumentType;
use crate::error::{Error, Result};
use crate::transport::{RequestBody, Response, Transport, TransportError};
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

/// Server info endpoint.
pub const INFO_ENDPOINT: &str = "/api/admin/info";

// ─────────────────────────────────────────────────────────────────────────────
// Wire Types
// ─────────────────────────────────────────────────────────────────────────────

/// One entry of a document's backup history.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BackupEntry {
    pub name: String,
    /// Modification time, seconds since the Unix epoch
    pub timestamp: f64,
}

impl BackupEntry {
    /// Modification time as a UTC timestamp, if representable.
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.timestamp.trunc();
        let nanos = ((self.timestamp - secs) * 1e9).round() as u32;
        DateTime::from_timestamp(secs as i64, nanos.min(999_999_999))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BackupList {
    #[serde(default)]
    pub backups: Vec<BackupEntry>,
}

/// Answer to a restore request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RestoreReceipt {
    #[serde(default)]
    pub status: Option<String>,
    /// Set for the proxy configuration: the restored file is not live yet
    #[serde(default)]
    pub restart_required: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AdminInfo {
    /// The server still runs with its shipped admin password
    #[serde(rename = "defaultPassword")]
    pub default_password: bool,
}

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

/// List `document`'s backups, newest first as the server orders them.
pub async fn list_backups<T: Transport + ?Sized>(
    transport: &T,
    document: &'static DocumentType,
) -> Result<Vec<BackupEntry>> {
    let response = transport.get(document.backups.list).await;
    let body = accept(document, response)?;
    let list: BackupList = parse(document, &body)?;
    debug!("{} has {} backup(s)", document.id, list.backups.len());
    Ok(list.backups)
}

/// Fetch the raw body of backup `name`.
pub async fn fetch_backup<T: Transport + ?Sized>(
    transport: &T,
    document: &'static DocumentType,
    name: &str,
) -> Result<String> {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("name", name)
        .finish();
    let path = format!("{}?{}", document.backups.fetch, query);
    let response = transport.get(&path).await;
    accept(document, response)
}

/// Restore backup `name` over the live document on the server.
pub async fn restore_backup<T: Transport + ?Sized>(
    transport: &T,
    document: &'static DocumentType,
    name: &str,
) -> Result<RestoreReceipt> {
    let response = transport
        .post(document.backups.restore, RequestBody::Json(json!({ "name": name })))
        .await;
    let body = accept(document, response)?;
    let receipt: RestoreReceipt = parse(document, &body)?;
    info!(
        "Restored {} from {} (restart required: {})",
        document.id, name, receipt.restart_required
    );
    Ok(receipt)
}

/// Ask the server whether the admin password is still the default.
pub async fn fetch_admin_info<T: Transport + ?Sized>(transport: &T) -> Result<AdminInfo> {
    let response = transport
        .get(INFO_ENDPOINT)
        .await
        .map_err(|e| Error::Application(format!("Admin info request failed: {}", e)))?;
    if !response.is_success() {
        return Err(Error::Application(format!(
            "Admin info request failed: {}",
            response.describe_failure()
        )));
    }
    serde_json::from_str(&response.body)
        .map_err(|e| Error::Application(format!("Unexpected admin info answer: {}", e)))
}

fn accept(
    document: &'static DocumentType,
    response: std::result::Result<Response, TransportError>,
) -> Result<String> {
    let failed = |cause: String| Error::BackupTransport {
        document: document.id,
        cause,
    };
    let response = response.map_err(|e| failed(e.to_string()))?;
    if !response.is_success() {
        return Err(failed(response.describe_failure()));
    }
    Ok(response.body)
}

fn parse<V: DeserializeOwned>(document: &'static DocumentType, body: &str) -> Result<V> {
    serde_json::from_str(body).map_err(|e| Error::BackupTransport {
        document: document.id,
        cause: format!("unexpected answer: {}", e),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::{CADDYFILE, CONTENT_JSON};
    use crate::testing::ScriptedTransport;
    use futures::executor::block_on;

    #[test]
    fn test_list_backups() {
        let transport = ScriptedTransport::new();
        transport.respond(
            200,
            r#"{"backups":[{"name":"Caddyfile.old.1","timestamp":1700000000.5},{"name":"Caddyfile.old.2","timestamp":1690000000}]}"#,
        );

        let backups = block_on(list_backups(&transport, &CADDYFILE)).unwrap();
        assert_eq!(backups.len(), 2);
        assert_eq!(backups[0].name, "Caddyfile.old.1");
        assert_eq!(transport.requests()[0].path, "/api/admin/caddyfile/backups");

        let at = backups[0].modified_at().unwrap();
        assert_eq!(at.timestamp(), 1_700_000_000);
        assert_eq!(at.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_list_backups_missing_field_is_empty() {
        let transport = ScriptedTransport::new();
        transport.respond(200, "{}");
        let backups = block_on(list_backups(&transport, &CONTENT_JSON)).unwrap();
        assert!(backups.is_empty());
    }

    #[test]
    fn test_list_backups_unauthorized() {
        let transport = ScriptedTransport::new();
        transport.respond(401, "Unauthorized");
        let err = block_on(list_backups(&transport, &CONTENT_JSON)).unwrap_err();
        assert!(matches!(
            err,
            Error::BackupTransport { document: "content.json", ref cause } if cause == "HTTP 401 (Unauthorized)"
        ));
    }

    #[test]
    fn test_fetch_backup_encodes_name() {
        let transport = ScriptedTransport::new();
        transport.respond(200, ":80 {\n}\n");

        let body = block_on(fetch_backup(&transport, &CADDYFILE, "Caddyfile.old 1")).unwrap();
        assert_eq!(body, ":80 {\n}\n");
        assert_eq!(
            transport.requests()[0].path,
            "/api/admin/caddyfile/backup?name=Caddyfile.old+1"
        );
    }

    #[test]
    fn test_restore_backup_posts_name() {
        let transport = ScriptedTransport::new();
        transport.respond(200, r#"{"status":"ok","restart_required":true}"#);

        let receipt = block_on(restore_backup(&transport, &CADDYFILE, "Caddyfile.old.1")).unwrap();
        assert!(receipt.restart_required);
        assert_eq!(receipt.status.as_deref(), Some("ok"));

        let request = &transport.requests()[0];
        assert_eq!(request.method, "POST");
        assert_eq!(request.path, "/api/admin/caddyfile/restore");
        assert_eq!(
            request.body,
            Some(RequestBody::Json(json!({ "name": "Caddyfile.old.1" })))
        );
    }

    #[test]
    fn test_restore_content_needs_no_restart() {
        let transport = ScriptedTransport::new();
        transport.respond(200, r#"{"status":"ok"}"#);
        let receipt =
            block_on(restore_backup(&transport, &CONTENT_JSON, "content.json.old.1")).unwrap();
        assert!(!receipt.restart_required);
    }

    #[test]
    fn test_restore_unreachable() {
        let transport = ScriptedTransport::new();
        transport.fail("connection refused");
        assert!(matches!(
            block_on(restore_backup(&transport, &CONTENT_JSON, "x")),
            Err(Error::BackupTransport { .. })
        ));
    }

    #[test]
    fn test_fetch_admin_info() {
        let transport = ScriptedTransport::new();
        transport.respond(200, r#"{"defaultPassword":true}"#);
        let info = block_on(fetch_admin_info(&transport)).unwrap();
        assert!(info.default_password);
        assert_eq!(transport.requests()[0].path, INFO_ENDPOINT);
    }

    #[test]
    fn test_fetch_admin_info_garbage() {
        let transport = ScriptedTransport::new();
        transport.respond(200, "<html>");
        assert!(matches!(
            block_on(fetch_admin_info(&transport)),
            Err(Error::Application(_))
        ));
    }
}
