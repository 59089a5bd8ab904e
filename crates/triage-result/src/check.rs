use std::fmt;

use serde::Serialize;
use triage_core::{theme_of, CriticalityCounts, Theme, ValidationResult};

/// Something odd about a report that does not stop a review.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    TotalMismatch { reported: u64, actual: u64 },
    CriticalityMismatch { reported: CriticalityCounts, actual: CriticalityCounts },
    /// A `:` inside an id field makes ids of different findings able to collide.
    AmbiguousIdField { index: usize, field: &'static str },
    /// A `|` in code or label lets two different defects share a group.
    AmbiguousGroupField { index: usize, field: &'static str },
    MissingCode { index: usize },
    UnclassifiedCodes { codes: Vec<String> },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::TotalMismatch { reported, actual } => {
                write!(f, "summary.total is {reported} but the report has {actual} findings")
            }
            Diagnostic::CriticalityMismatch { reported, actual } => write!(
                f,
                "summary.by_criticality is {}/{}/{} but findings count {}/{}/{} (KRITIEK/AANDACHT/INFO)",
                reported.kritiek, reported.aandacht, reported.info, actual.kritiek, actual.aandacht, actual.info
            ),
            Diagnostic::AmbiguousIdField { index, field } => {
                write!(f, "finding {index}: `{field}` contains ':'")
            }
            Diagnostic::AmbiguousGroupField { index, field } => {
                write!(f, "finding {index}: `{field}` contains '|'")
            }
            Diagnostic::MissingCode { index } => write!(f, "finding {index} has no error code"),
            Diagnostic::UnclassifiedCodes { codes } => write!(f, "codes without a theme: {}", codes.join(", ")),
        }
    }
}

pub fn check_result(result: &ValidationResult) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let actual = result.findings.len() as u64;
    if result.summary.total != actual {
        out.push(Diagnostic::TotalMismatch {
            reported: result.summary.total,
            actual,
        });
    }

    let mut counts = CriticalityCounts::default();
    for f in &result.findings {
        counts.add(f.criticality);
    }
    let reported = result.summary.by_criticality;
    if reported.total() > 0 && reported != counts {
        out.push(Diagnostic::CriticalityMismatch {
            reported,
            actual: counts,
        });
    }

    let mut unclassified: Vec<String> = Vec::new();
    for (index, f) in result.findings.iter().enumerate() {
        for (field, value) in [("contract", &f.contract), ("entiteit", &f.entiteit), ("code", &f.code)] {
            if value.contains(':') {
                out.push(Diagnostic::AmbiguousIdField { index, field });
            }
        }
        for (field, value) in [("code", &f.code), ("label", &f.label)] {
            if value.contains('|') {
                out.push(Diagnostic::AmbiguousGroupField { index, field });
            }
        }
        if f.code.trim().is_empty() {
            out.push(Diagnostic::MissingCode { index });
        } else if theme_of(f) == Theme::Overig && !unclassified.contains(&f.code) {
            unclassified.push(f.code.clone());
        }
    }
    if !unclassified.is_empty() {
        unclassified.sort();
        out.push(Diagnostic::UnclassifiedCodes { codes: unclassified });
    }
    out
}
