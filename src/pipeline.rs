//! Save response decoding
//!
//! Write endpoints answer with JSON describing how far the server-side
//! pipeline (validate, format, commit) got. Older endpoints answer with
//! something like `{"status": "ok"}` and no pipeline fields at all. Both
//! shapes are resolved here, once, into a [`PipelineResult`]; nothing
//! downstream looks at the raw body again.

use serde_json::Value;

// ─────────────────────────────────────────────────────────────────────────────
// Pipeline Stage
// ─────────────────────────────────────────────────────────────────────────────

/// A step of the server-side save pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineStage {
    Validate,
    Format,
    Commit,
    Complete,
    /// A stage this client does not know about yet
    Other(String),
}

impl PipelineStage {
    /// Map a wire stage name to a stage.
    ///
    /// The server reports its formatter step as `fmt`.
    pub fn from_wire(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "validate" => Self::Validate,
            "fmt" | "format" => Self::Format,
            "commit" => Self::Commit,
            "complete" => Self::Complete,
            _ => Self::Other(name.to_string()),
        }
    }

    /// Capitalized name used in status messages.
    pub fn display_name(&self) -> String {
        match self {
            Self::Validate => "Validate".to_string(),
            Self::Format => "Format".to_string(),
            Self::Commit => "Commit".to_string(),
            Self::Complete => "Complete".to_string(),
            Self::Other(name) => capitalize(name),
        }
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pipeline Result
// ─────────────────────────────────────────────────────────────────────────────

/// Interpretation of a successful (2xx) save response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineResult {
    /// No `success`/`stage` fields: an endpoint that predates the pipeline
    Legacy,
    /// `success: false`; the content was rejected at `stage`
    Failed {
        stage: PipelineStage,
        output: Option<String>,
    },
    /// `success: true, stage: complete`; validated, formatted, and committed
    Complete { message: Option<String> },
    /// Any other successful combination; `stage` is whatever the server reported
    Accepted { stage: Option<PipelineStage> },
}

impl PipelineResult {
    /// Decode a response body.
    ///
    /// # Errors
    ///
    /// Returns the parser error if `body` is not JSON at all. Valid JSON
    /// without recognizable fields decodes as `Legacy`.
    pub fn decode(body: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(body)?;
        Ok(Self::from_value(&value))
    }

    fn from_value(value: &Value) -> Self {
        let success = value.get("success").and_then(Value::as_bool);
        let stage = value
            .get("stage")
            .and_then(Value::as_str)
            .map(PipelineStage::from_wire);
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);

        match (success, stage) {
            (None, None) => Self::Legacy,
            (Some(false), stage) => Self::Failed {
                stage: stage.unwrap_or_else(|| PipelineStage::Other("save".to_string())),
                output: text("output")
                    .map(|o| o.trim_end().to_string())
                    .filter(|o| !o.is_empty()),
            },
            (Some(true), Some(PipelineStage::Complete)) => Self::Complete {
                message: text("message"),
            },
            (_, stage) => Self::Accepted { stage },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_from_wire() {
        assert_eq!(PipelineStage::from_wire("validate"), PipelineStage::Validate);
        assert_eq!(PipelineStage::from_wire("fmt"), PipelineStage::Format);
        assert_eq!(PipelineStage::from_wire("format"), PipelineStage::Format);
        assert_eq!(PipelineStage::from_wire("commit"), PipelineStage::Commit);
        assert_eq!(PipelineStage::from_wire("Complete"), PipelineStage::Complete);
        assert_eq!(
            PipelineStage::from_wire("reload"),
            PipelineStage::Other("reload".to_string())
        );
    }

    #[test]
    fn test_stage_display_name_is_capitalized() {
        assert_eq!(PipelineStage::Validate.display_name(), "Validate");
        assert_eq!(PipelineStage::Format.display_name(), "Format");
        assert_eq!(PipelineStage::Other("reload".to_string()).display_name(), "Reload");
        assert_eq!(PipelineStage::Other(String::new()).display_name(), "");
    }

    #[test]
    fn test_decode_legacy_status_ok() {
        assert_eq!(
            PipelineResult::decode(r#"{"status": "ok"}"#).unwrap(),
            PipelineResult::Legacy
        );
        assert_eq!(PipelineResult::decode("{}").unwrap(), PipelineResult::Legacy);
        assert_eq!(PipelineResult::decode("[]").unwrap(), PipelineResult::Legacy);
    }

    #[test]
    fn test_decode_stage_failure() {
        let result = PipelineResult::decode(
            r#"{"success": false, "stage": "validate", "output": "line 4: unexpected token"}"#,
        )
        .unwrap();
        assert_eq!(
            result,
            PipelineResult::Failed {
                stage: PipelineStage::Validate,
                output: Some("line 4: unexpected token".to_string()),
            }
        );
    }

    #[test]
    fn test_decode_failure_trims_trailing_newline_only() {
        let result = PipelineResult::decode(
            r#"{"success": false, "stage": "fmt", "output": "  Error: bad block\n"}"#,
        )
        .unwrap();
        assert_eq!(
            result,
            PipelineResult::Failed {
                stage: PipelineStage::Format,
                output: Some("  Error: bad block".to_string()),
            }
        );
    }

    #[test]
    fn test_decode_failure_without_stage() {
        let result = PipelineResult::decode(r#"{"success": false}"#).unwrap();
        assert_eq!(
            result,
            PipelineResult::Failed {
                stage: PipelineStage::Other("save".to_string()),
                output: None,
            }
        );
    }

    #[test]
    fn test_decode_complete() {
        let result = PipelineResult::decode(
            r#"{"success": true, "stage": "complete", "message": "Caddyfile saved. Reload Caddy to apply changes."}"#,
        )
        .unwrap();
        assert_eq!(
            result,
            PipelineResult::Complete {
                message: Some("Caddyfile saved. Reload Caddy to apply changes.".to_string())
            }
        );
    }

    #[test]
    fn test_decode_unknown_success_combination() {
        let result = PipelineResult::decode(r#"{"success": true, "stage": "reload"}"#).unwrap();
        assert_eq!(
            result,
            PipelineResult::Accepted {
                stage: Some(PipelineStage::Other("reload".to_string())),
            }
        );

        let result = PipelineResult::decode(r#"{"stage": "commit"}"#).unwrap();
        assert!(matches!(result, PipelineResult::Accepted { .. }));
    }

    #[test]
    fn test_decode_non_json_is_error() {
        assert!(PipelineResult::decode("<html>oops</html>").is_err());
        assert!(PipelineResult::decode("").is_err());
    }
}
