use std::path::Path;

use serde_json::Value;
use tracing::info;
use triage_core::ValidationResult;

use crate::error::ResultError;

/// Parses a validator report. The only structural requirement is a
/// `findings` array; everything else falls back to defaults.
pub fn parse_validation_result(raw: &str) -> Result<ValidationResult, ResultError> {
    let value: Value = serde_json::from_str(raw)?;
    if !value.get("findings").is_some_and(Value::is_array) {
        return Err(ResultError::MissingFindings);
    }
    Ok(ValidationResult::from_json(value)?)
}

pub fn load_validation_result(path: &Path) -> Result<ValidationResult, ResultError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ResultError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let result = parse_validation_result(&raw)?;
    info!(path = %path.display(), findings = result.findings.len(), "validation result loaded");
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn requires_findings_array() {
        assert!(matches!(parse_validation_result("{}"), Err(ResultError::MissingFindings)));
        assert!(matches!(
            parse_validation_result(r#"{"findings": {}}"#),
            Err(ResultError::MissingFindings)
        ));
        assert!(matches!(parse_validation_result("nope"), Err(ResultError::Json(_))));
    }

    #[test]
    fn minimal_report_loads_with_defaults() {
        let r = parse_validation_result(r#"{"findings": [{"code": "E1-002"}]}"#).unwrap();
        assert_eq!(r.findings.len(), 1);
        assert_eq!(r.timestamp, "");
        assert!(r.metadata.is_none());
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempdir().unwrap();
        let err = load_validation_result(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ResultError::Read { .. }));
    }
}
