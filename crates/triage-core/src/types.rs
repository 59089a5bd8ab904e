use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::de::{lenient_engine, lenient_string};
use crate::model::{Criticality, EngineRef};

/// File name used when neither the user nor the report names the validated file.
pub const UNKNOWN_FILE_NAME: &str = "onbekend.xml";

/// One reported defect instance, as produced by the external validator.
///
/// Every text field reads as `""` when absent or `null`; `criticality` reads
/// as AANDACHT. Keys this type does not know about are kept in `extra` so a
/// report survives a session round trip untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(default)]
    pub criticality: Criticality,
    #[serde(default, deserialize_with = "lenient_string")]
    pub severity: String,
    #[serde(default, deserialize_with = "lenient_engine")]
    pub engine: EngineRef,
    #[serde(default, deserialize_with = "lenient_string")]
    pub code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub contract: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub entiteit: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub label: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub waarde: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub verwacht: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub omschrijving: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub bron: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regel: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regeltype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branche: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriticalityCounts {
    #[serde(rename = "KRITIEK", default)]
    pub kritiek: u64,
    #[serde(rename = "AANDACHT", default)]
    pub aandacht: u64,
    #[serde(rename = "INFO", default)]
    pub info: u64,
}

impl CriticalityCounts {
    pub fn add(&mut self, c: Criticality) {
        match c {
            Criticality::Kritiek => self.kritiek += 1,
            Criticality::Aandacht => self.aandacht += 1,
            Criticality::Info => self.info += 1,
        }
    }

    pub fn get(&self, c: Criticality) -> u64 {
        match c {
            Criticality::Kritiek => self.kritiek,
            Criticality::Aandacht => self.aandacht,
            Criticality::Info => self.info,
        }
    }

    pub fn total(&self) -> u64 {
        self.kritiek + self.aandacht + self.info
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub by_criticality: CriticalityCounts,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub contracts_parsed: u64,
    #[serde(default)]
    pub engines_requested: Vec<EngineRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The validator's report. Read-only once a review has started.
///
/// A report read with [`ValidationResult::from_json`] serializes back to the
/// exact JSON it was read from, `null`s and number types included. Equality
/// compares the parsed fields only.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ValidationResult {
    #[serde(default)]
    pub findings: Vec<Finding>,
    #[serde(default)]
    pub summary: Summary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// The JSON this report was read from, if any.
    #[serde(skip)]
    pub original: Option<Value>,
}

fn is_none<T>(v: &&Option<T>) -> bool {
    v.is_none()
}

/// Serialized form of a report built in code rather than read from JSON.
#[derive(Serialize)]
struct ReportFields<'a> {
    findings: &'a [Finding],
    summary: &'a Summary,
    #[serde(skip_serializing_if = "is_none")]
    metadata: &'a Option<Metadata>,
    timestamp: &'a str,
    #[serde(skip_serializing_if = "is_none")]
    source_file: &'a Option<String>,
    #[serde(flatten)]
    extra: &'a Map<String, Value>,
}

impl Serialize for ValidationResult {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.original {
            Some(raw) => raw.serialize(s),
            None => ReportFields {
                findings: &self.findings,
                summary: &self.summary,
                metadata: &self.metadata,
                timestamp: &self.timestamp,
                source_file: &self.source_file,
                extra: &self.extra,
            }
            .serialize(s),
        }
    }
}

impl PartialEq for ValidationResult {
    fn eq(&self, other: &Self) -> bool {
        self.findings == other.findings
            && self.summary == other.summary
            && self.metadata == other.metadata
            && self.timestamp == other.timestamp
            && self.source_file == other.source_file
            && self.extra == other.extra
    }
}

impl ValidationResult {
    /// Parses `value` and keeps it as the report's serialized form.
    pub fn from_json(value: Value) -> serde_json::Result<Self> {
        let mut result: Self = serde_json::from_value(value.clone())?;
        result.original = Some(value);
        Ok(result)
    }

    /// Selected file name, else the name the report carries, else a placeholder.
    pub fn resolve_file_name(&self, selected: Option<&str>) -> String {
        selected
            .filter(|s| !s.trim().is_empty())
            .or(self.source_file.as_deref().filter(|s| !s.trim().is_empty()))
            .unwrap_or(UNKNOWN_FILE_NAME)
            .to_string()
    }
}

/// Identity of the validated artifact a review belongs to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactIdentity {
    pub file_name: String,
    pub validation_timestamp: String,
}

impl ArtifactIdentity {
    pub fn new(file_name: impl Into<String>, validation_timestamp: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            validation_timestamp: validation_timestamp.into(),
        }
    }

    pub fn of_result(result: &ValidationResult, selected: Option<&str>) -> Self {
        Self::new(result.resolve_file_name(selected), result.timestamp.clone())
    }

    /// `<namespace>-<fileName>-<validationTimestamp>`
    pub fn storage_key(&self, namespace: &str) -> String {
        format!("{}-{}-{}", namespace, self.file_name, self.validation_timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_defaults_and_extras() {
        let f: Finding = serde_json::from_str(
            r#"{"code":"E1-002","label":"AN_CODE","waarde":null,"engine":1,"regeltype":"ongeldige_code","ai_hint":"x"}"#,
        )
        .unwrap();
        assert_eq!(f.criticality, Criticality::Aandacht);
        assert_eq!(f.waarde, "");
        assert_eq!(f.contract, "");
        assert_eq!(f.engine, EngineRef::Number(1));
        assert_eq!(f.regeltype.as_deref(), Some("ongeldige_code"));
        assert_eq!(f.extra.get("ai_hint"), Some(&Value::String("x".into())));
    }

    #[test]
    fn result_keeps_unknown_keys() {
        let raw = r#"{
            "validator": "sivi-validator",
            "timestamp": "2025-01-01T10:00:00",
            "source_file": "batch.xml",
            "summary": {"total": 0, "by_criticality": {"KRITIEK": 0}, "by_severity": {}},
            "findings": []
        }"#;
        let r: ValidationResult = serde_json::from_str(raw).unwrap();
        assert_eq!(r.extra.get("validator"), Some(&Value::String("sivi-validator".into())));
        assert!(r.summary.extra.contains_key("by_severity"));
        let again: ValidationResult = serde_json::from_value(serde_json::to_value(&r).unwrap()).unwrap();
        assert_eq!(again, r);
    }

    #[test]
    fn read_report_serializes_as_read() {
        let raw = serde_json::json!({
            "timestamp": "2025-01-01T10:00:00",
            "findings": [{"code": "E1-002", "waarde": null, "verwacht": 12.5, "regeltype": null, "engine": "2"}]
        });
        let r = ValidationResult::from_json(raw.clone()).unwrap();
        assert_eq!(r.findings[0].waarde, "");
        assert_eq!(r.findings[0].verwacht, "12.5");
        assert_eq!(serde_json::to_value(&r).unwrap(), raw);

        let parsed: ValidationResult = serde_json::from_value(raw.clone()).unwrap();
        assert!(parsed.original.is_none());
        assert_eq!(parsed, r);
        let normalized = serde_json::to_value(&parsed).unwrap();
        assert_eq!(normalized["findings"][0]["waarde"], "");
        assert!(normalized["findings"][0].get("regeltype").is_none());
    }

    #[test]
    fn file_name_fallback_chain() {
        let mut r = ValidationResult::default();
        assert_eq!(r.resolve_file_name(None), UNKNOWN_FILE_NAME);
        r.source_file = Some("batch.xml".into());
        assert_eq!(r.resolve_file_name(None), "batch.xml");
        assert_eq!(r.resolve_file_name(Some("picked.xml")), "picked.xml");
        assert_eq!(r.resolve_file_name(Some("  ")), "batch.xml");
    }

    #[test]
    fn storage_key_format() {
        let id = ArtifactIdentity::new("batch.xml", "2025-01-01T10:00:00");
        assert_eq!(id.storage_key("sivi-findings"), "sivi-findings-batch.xml-2025-01-01T10:00:00");
    }
}
