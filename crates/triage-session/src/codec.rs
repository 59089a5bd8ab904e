use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use triage_core::{ArtifactIdentity, StatusStore, ValidationResult};

use crate::error::SessionError;

pub const SESSION_TYPE: &str = "sivi-session";
pub const SESSION_VERSION: u32 = 1;

/// Portable snapshot of one review.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFile {
    pub version: u32,
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: String,
    pub file_name: String,
    pub validation_result: ValidationResult,
    pub finding_statuses: StatusStore,
    pub xml_content: Option<String>,
}

/// Everything an import replaces, plus the identity the restored statuses
/// persist under from then on.
#[derive(Clone, Debug, PartialEq)]
pub struct RestoredSession {
    pub result: ValidationResult,
    pub statuses: StatusStore,
    pub source_document: Option<String>,
    pub identity: ArtifactIdentity,
}

pub fn export_session(
    result: &ValidationResult,
    statuses: &StatusStore,
    source_document: Option<&str>,
    selected_name: Option<&str>,
    now: DateTime<Utc>,
) -> SessionFile {
    SessionFile {
        version: SESSION_VERSION,
        kind: SESSION_TYPE.to_string(),
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        file_name: result.resolve_file_name(selected_name),
        validation_result: result.clone(),
        finding_statuses: statuses.clone(),
        xml_content: source_document.map(str::to_string),
    }
}

pub fn import_session(raw: &str) -> Result<RestoredSession, SessionError> {
    let mut value: Value = serde_json::from_str(raw)?;
    let Some(obj) = value.as_object_mut() else {
        return Err(SessionError::Malformed("top level is not an object".into()));
    };

    let kind = obj.get("type").and_then(Value::as_str);
    if kind != Some(SESSION_TYPE) {
        return Err(SessionError::WrongType {
            found: kind.map(str::to_string),
        });
    }
    match obj.get("version").and_then(Value::as_u64) {
        Some(v) if v == u64::from(SESSION_VERSION) => {}
        other => warn!(version = ?other, "unexpected session version; importing anyway"),
    }

    let result = match obj.remove("validationResult") {
        None | Some(Value::Null) => return Err(SessionError::MissingResult),
        Some(v) => ValidationResult::from_json(v)
            .map_err(|e| SessionError::Malformed(format!("validationResult: {e}")))?,
    };
    let statuses = match obj.remove("findingStatuses") {
        None | Some(Value::Null) => StatusStore::new(),
        Some(v) => serde_json::from_value::<StatusStore>(v)
            .map_err(|e| SessionError::Malformed(format!("findingStatuses: {e}")))?,
    };
    let source_document = obj.get("xmlContent").and_then(Value::as_str).map(str::to_string);
    let file_name = obj
        .get("fileName")
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| result.resolve_file_name(None));

    let identity = ArtifactIdentity::new(file_name, result.timestamp.clone());
    info!(
        file = %identity.file_name,
        findings = result.findings.len(),
        statuses = statuses.len(),
        "session imported"
    );
    Ok(RestoredSession {
        result,
        statuses,
        source_document,
        identity,
    })
}
