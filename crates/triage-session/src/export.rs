//! Downstream artifacts of a review: the report enriched with each finding's
//! status, and a flat CSV for spreadsheets.

use serde_json::{json, Map, Value};
use triage_core::{derive_finding_id, Status, StatusStore, ValidationResult};

/// The original report with a `status` on every finding and
/// `summary.by_status` counting all four statuses.
pub fn enriched_json(result: &ValidationResult, statuses: &StatusStore) -> serde_json::Result<Value> {
    let mut value = serde_json::to_value(result)?;
    let mut by_status: Map<String, Value> = Status::ALL.iter().map(|s| (s.as_str().to_string(), json!(0))).collect();

    if let Some(findings) = value.get_mut("findings").and_then(Value::as_array_mut) {
        for (i, (slot, finding)) in findings.iter_mut().zip(&result.findings).enumerate() {
            let status = statuses.get(&derive_finding_id(finding, i));
            if let Some(obj) = slot.as_object_mut() {
                obj.insert("status".into(), json!(status.as_str()));
            }
            if let Some(n) = by_status.get_mut(status.as_str()) {
                *n = json!(n.as_u64().unwrap_or(0) + 1);
            }
        }
    }
    if let Some(obj) = value.as_object_mut() {
        let summary = obj.entry("summary").or_insert_with(|| json!({}));
        if let Some(summary) = summary.as_object_mut() {
            summary.insert("by_status".into(), Value::Object(by_status));
        }
    }
    Ok(value)
}

pub const CSV_HEADER: [&str; 14] = [
    "Criticaliteit",
    "Severity",
    "Engine",
    "Code",
    "Regeltype",
    "Contract",
    "Branche",
    "Entiteit",
    "Label",
    "Waarde",
    "Omschrijving",
    "Verwacht",
    "Bron",
    "Status",
];

fn csv_field(raw: &str) -> String {
    if raw.contains([';', '"', '\n', '\r']) {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

/// `;`-separated, header first, status always the last column.
pub fn to_csv(result: &ValidationResult, statuses: &StatusStore) -> String {
    let mut out = CSV_HEADER.join(";");
    out.push('\n');
    for (i, f) in result.findings.iter().enumerate() {
        let status = statuses.get(&derive_finding_id(f, i));
        let engine = f.engine.to_string();
        let row: [&str; 14] = [
            f.criticality.as_str(),
            &f.severity,
            &engine,
            &f.code,
            f.regeltype.as_deref().unwrap_or(""),
            &f.contract,
            f.branche.as_deref().unwrap_or(""),
            &f.entiteit,
            &f.label,
            &f.waarde,
            &f.omschrijving,
            &f.verwacht,
            &f.bron,
            status.as_str(),
        ];
        let line: Vec<String> = row.iter().map(|c| csv_field(c)).collect();
        out.push_str(&line.join(";"));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use triage_core::{Criticality, EngineRef, Finding};

    use super::*;

    fn result() -> ValidationResult {
        ValidationResult {
            findings: vec![
                Finding {
                    criticality: Criticality::Kritiek,
                    severity: "FOUT".into(),
                    engine: EngineRef::Number(2),
                    code: "E2-002".into(),
                    contract: "DL1".into(),
                    label: "PP_BTP".into(),
                    omschrijving: "Premie; \"bruto\" klopt niet".into(),
                    ..Default::default()
                },
                Finding {
                    code: "E1-002".into(),
                    contract: "DL2".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn enriched_json_adds_status_and_counts() {
        let r = result();
        let mut statuses = StatusStore::new();
        statuses.set(derive_finding_id(&r.findings[0], 0), Status::Opgelost);
        let v = enriched_json(&r, &statuses).unwrap();
        assert_eq!(v["findings"][0]["status"], "OPGELOST");
        assert_eq!(v["findings"][1]["status"], "OPEN");
        assert_eq!(v["summary"]["by_status"]["OPGELOST"], 1);
        assert_eq!(v["summary"]["by_status"]["OPEN"], 1);
        assert_eq!(v["summary"]["by_status"]["GENEGEERD"], 0);
    }

    #[test]
    fn enriched_json_keeps_report_values_and_adds_summary() {
        let raw = json!({"findings": [{"code": "E1-002", "waarde": null, "engine": 1}]});
        let r = ValidationResult::from_json(raw).unwrap();
        let v = enriched_json(&r, &StatusStore::new()).unwrap();
        assert!(v["findings"][0]["waarde"].is_null());
        assert_eq!(v["findings"][0]["engine"], 1);
        assert_eq!(v["findings"][0]["status"], "OPEN");
        assert_eq!(v["summary"]["by_status"]["OPEN"], 1);
    }

    #[test]
    fn csv_quotes_and_ends_with_status() {
        let r = result();
        let csv = to_csv(&r, &StatusStore::new());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Criticaliteit;Severity;Engine;Code"));
        assert!(lines[0].ends_with(";Status"));
        assert_eq!(
            lines[1],
            "KRITIEK;FOUT;2;E2-002;;DL1;;;PP_BTP;;\"Premie; \"\"bruto\"\" klopt niet\";;;OPEN"
        );
        assert!(lines[2].ends_with(";OPEN"));
        assert!(lines[2].starts_with("AANDACHT;;;E1-002"));
    }
}
