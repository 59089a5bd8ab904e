use std::collections::HashMap;

use crate::category::CategoryFilter;
use crate::identity::{derive_finding_id, derive_group_key};
use crate::status::{dominant_status, StatusStore};
use crate::theme::{theme_of, Theme};
use crate::{Criticality, Finding, FindingId, Status};

/// Generic finding predicate, applied before the category filter and before grouping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FindingFilter {
    pub criticality: Option<Criticality>,
    pub status: Option<Status>,
    pub severity: Option<String>,
    pub engine: Option<String>,
    pub text: Option<String>,
}

impl FindingFilter {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn matches(&self, finding: &Finding, status: Status) -> bool {
        if self.criticality.is_some_and(|c| c != finding.criticality) {
            return false;
        }
        if self.status.is_some_and(|s| s != status) {
            return false;
        }
        if let Some(sev) = &self.severity {
            if !finding.severity.eq_ignore_ascii_case(sev.trim()) {
                return false;
            }
        }
        if let Some(engine) = &self.engine {
            if finding.engine.to_string() != engine.trim() {
                return false;
            }
        }
        if let Some(text) = &self.text {
            let needle = text.trim().to_lowercase();
            if !needle.is_empty() && !searchable_fields(finding).any(|f| f.to_lowercase().contains(&needle)) {
                return false;
            }
        }
        true
    }
}

fn searchable_fields(f: &Finding) -> impl Iterator<Item = &str> {
    [
        f.code.as_str(),
        f.label.as_str(),
        f.omschrijving.as_str(),
        f.contract.as_str(),
        f.entiteit.as_str(),
        f.waarde.as_str(),
        f.verwacht.as_str(),
    ]
    .into_iter()
}

/// A finding together with its position in the report and the id derived from it.
#[derive(Clone, Debug)]
pub struct IndexedFinding<'a> {
    pub index: usize,
    pub id: FindingId,
    pub finding: &'a Finding,
}

pub fn index_findings(findings: &[Finding]) -> Vec<IndexedFinding<'_>> {
    findings
        .iter()
        .enumerate()
        .map(|(index, finding)| IndexedFinding {
            index,
            id: derive_finding_id(finding, index),
            finding,
        })
        .collect()
}

/// Generic filter, then category filter. Grouping always runs on this output.
pub fn filter_view<'a>(
    findings: &'a [Finding],
    store: &StatusStore,
    filter: &FindingFilter,
    category: CategoryFilter,
) -> Vec<IndexedFinding<'a>> {
    index_findings(findings)
        .into_iter()
        .filter(|f| filter.matches(f.finding, store.get(&f.id)))
        .filter(|f| category.matches(f.finding))
        .collect()
}

/// Findings that share code, field and description.
#[derive(Clone, Debug)]
pub struct Group<'a> {
    pub key: String,
    pub code: String,
    pub label: String,
    pub description: String,
    pub severity: String,
    pub criticality: Criticality,
    pub theme: Theme,
    pub members: Vec<IndexedFinding<'a>>,
}

impl<'a> Group<'a> {
    fn open(key: String, first: IndexedFinding<'a>) -> Self {
        let f = first.finding;
        Self {
            key,
            code: f.code.clone(),
            label: f.label.clone(),
            description: f.omschrijving.clone(),
            severity: f.severity.clone(),
            criticality: f.criticality,
            theme: theme_of(f),
            members: vec![first],
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn member_ids(&self) -> impl Iterator<Item = &FindingId> {
        self.members.iter().map(|m| &m.id)
    }

    pub fn dominant_status(&self, store: &StatusStore) -> Status {
        dominant_status(self.member_ids().map(|id| store.get(id)))
    }

    pub fn open_count(&self, store: &StatusStore) -> usize {
        self.member_ids().filter(|id| store.get(id).is_open()).count()
    }
}

/// Partition by `code|labelSuffix|omschrijving`, ordered by theme rank, then
/// by member count (largest first), then by first appearance.
pub fn group_findings(view: Vec<IndexedFinding<'_>>) -> Vec<Group<'_>> {
    let mut groups: Vec<Group<'_>> = Vec::new();
    let mut slot: HashMap<String, usize> = HashMap::new();

    for item in view {
        let key = derive_group_key(item.finding);
        match slot.get(&key) {
            Some(&i) => groups[i].members.push(item),
            None => {
                slot.insert(key.clone(), groups.len());
                groups.push(Group::open(key, item));
            }
        }
    }

    // stable: equal rank and size keep first-appearance order
    groups.sort_by(|a, b| a.theme.rank().cmp(&b.theme.rank()).then(b.len().cmp(&a.len())));
    groups
}
