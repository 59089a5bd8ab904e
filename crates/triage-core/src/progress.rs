use serde::{Deserialize, Serialize};

use crate::identity::derive_finding_id;
use crate::status::StatusStore;
use crate::{CriticalityCounts, Finding};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub handled: usize,
    pub total: usize,
    pub percentage: u32,
}

/// `handled` counts every finding that is no longer OPEN.
pub fn progress(findings: &[Finding], store: &StatusStore) -> Progress {
    let total = findings.len();
    let handled = findings
        .iter()
        .enumerate()
        .filter(|(i, f)| !store.get(&derive_finding_id(f, *i)).is_open())
        .count();
    let percentage = if total == 0 {
        0
    } else {
        (100.0 * handled as f64 / total as f64).round() as u32
    };
    Progress {
        handled,
        total,
        percentage,
    }
}

/// Headline counters: criticality of the findings that are still OPEN.
pub fn summary_counts(findings: &[Finding], store: &StatusStore) -> CriticalityCounts {
    let mut counts = CriticalityCounts::default();
    for (i, f) in findings.iter().enumerate() {
        if store.get(&derive_finding_id(f, i)).is_open() {
            counts.add(f.criticality);
        }
    }
    counts
}
