use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::bulk::{set_all, BulkPropagator, BulkScope, EditOutcome, PendingBulk};
use crate::category::CategoryFilter;
use crate::error::ReviewError;
use crate::grouping::{filter_view, group_findings, index_findings, FindingFilter, Group, IndexedFinding};
use crate::identity::derive_finding_id;
use crate::progress::{progress, summary_counts, Progress};
use crate::status::{dominant_status, StatusChange, StatusStore};
use crate::theme::{theme_of, Theme};
use crate::{ArtifactIdentity, CriticalityCounts, Finding, FindingId, Status, ValidationResult};

/// Per-theme roll-up over every finding in the report, regardless of filters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ThemeSummary {
    pub theme: Theme,
    pub total: usize,
    pub open: usize,
    pub dominant: Status,
}

/// One loaded report under review: the result, its live status store, the
/// active filters, the bulk-confirmation state and what is expanded.
///
/// Every mutating method returns the writes it made so the caller can persist
/// them; the session itself does no I/O.
#[derive(Debug)]
pub struct ReviewSession {
    result: ValidationResult,
    identity: ArtifactIdentity,
    positions: HashMap<FindingId, usize>,
    store: StatusStore,
    filter: FindingFilter,
    category: CategoryFilter,
    bulk: BulkPropagator,
    expanded_groups: BTreeSet<String>,
    expanded_themes: BTreeSet<Theme>,
}

impl ReviewSession {
    pub fn new(result: ValidationResult, identity: ArtifactIdentity, store: StatusStore) -> Self {
        let positions = index_findings(&result.findings)
            .into_iter()
            .map(|f| (f.id, f.index))
            .collect();
        Self {
            result,
            identity,
            positions,
            store,
            filter: FindingFilter::default(),
            category: CategoryFilter::default(),
            bulk: BulkPropagator::new(),
            expanded_groups: BTreeSet::new(),
            expanded_themes: BTreeSet::new(),
        }
    }

    pub fn result(&self) -> &ValidationResult {
        &self.result
    }

    pub fn findings(&self) -> &[Finding] {
        &self.result.findings
    }

    pub fn identity(&self) -> &ArtifactIdentity {
        &self.identity
    }

    pub fn store(&self) -> &StatusStore {
        &self.store
    }

    pub fn status_of(&self, id: &FindingId) -> Status {
        self.store.get(id)
    }

    pub fn finding(&self, id: &FindingId) -> Option<(usize, &Finding)> {
        let index = *self.positions.get(id)?;
        self.result.findings.get(index).map(|f| (index, f))
    }

    pub fn filter(&self) -> &FindingFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: FindingFilter) {
        self.filter = filter;
    }

    pub fn category(&self) -> CategoryFilter {
        self.category
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.category = category;
    }

    pub fn visible(&self) -> Vec<IndexedFinding<'_>> {
        filter_view(&self.result.findings, &self.store, &self.filter, self.category)
    }

    /// Groups over the current filtered view; recomputed on every call.
    pub fn groups(&self) -> Vec<Group<'_>> {
        group_findings(self.visible())
    }

    pub fn group(&self, key: &str) -> Option<Group<'_>> {
        self.groups().into_iter().find(|g| g.key == key)
    }

    pub fn theme_overview(&self) -> Vec<ThemeSummary> {
        Theme::ALL
            .into_iter()
            .filter_map(|theme| {
                let statuses = self.theme_statuses(theme);
                if statuses.is_empty() {
                    return None;
                }
                Some(ThemeSummary {
                    theme,
                    total: statuses.len(),
                    open: statuses.iter().filter(|s| s.is_open()).count(),
                    dominant: dominant_status(statuses),
                })
            })
            .collect()
    }

    pub fn theme_dominant_status(&self, theme: Theme) -> Status {
        dominant_status(self.theme_statuses(theme))
    }

    fn theme_statuses(&self, theme: Theme) -> Vec<Status> {
        self.theme_members(theme).iter().map(|id| self.store.get(id)).collect()
    }

    fn theme_members(&self, theme: Theme) -> Vec<FindingId> {
        self.result
            .findings
            .iter()
            .enumerate()
            .filter(|(_, f)| theme_of(f) == theme)
            .map(|(i, f)| derive_finding_id(f, i))
            .collect()
    }

    pub fn pending_bulk(&self) -> Option<&PendingBulk> {
        self.bulk.pending()
    }

    /// Single-finding edit. May stop at a confirmation; see [`BulkPropagator`].
    pub fn request_status(&mut self, id: &FindingId, status: Status) -> Result<EditOutcome, ReviewError> {
        let index = *self
            .positions
            .get(id)
            .ok_or_else(|| ReviewError::UnknownFinding(id.clone()))?;
        self.bulk.request(&self.result.findings, &mut self.store, index, status)
    }

    pub fn confirm_bulk(&mut self, scope: BulkScope) -> Result<Vec<StatusChange>, ReviewError> {
        self.bulk.confirm(&mut self.store, scope)
    }

    pub fn cancel_bulk(&mut self) -> Result<Status, ReviewError> {
        self.bulk.cancel()
    }

    /// Sets every member of a visible group; no confirmation.
    pub fn set_group_status(&mut self, key: &str, status: Status) -> Result<Vec<StatusChange>, ReviewError> {
        self.ensure_idle()?;
        let members: Vec<FindingId> = self
            .group(key)
            .ok_or_else(|| ReviewError::UnknownGroup(key.to_string()))?
            .member_ids()
            .cloned()
            .collect();
        Ok(set_all(&mut self.store, &members, status))
    }

    /// Sets every finding of the theme, filtered or not; no confirmation.
    pub fn set_theme_status(&mut self, theme: Theme, status: Status) -> Result<Vec<StatusChange>, ReviewError> {
        self.ensure_idle()?;
        let members = self.theme_members(theme);
        Ok(set_all(&mut self.store, &members, status))
    }

    fn ensure_idle(&self) -> Result<(), ReviewError> {
        match self.bulk.pending() {
            Some(p) => Err(ReviewError::ConfirmationPending {
                target: p.target.clone(),
                status: p.status,
            }),
            None => Ok(()),
        }
    }

    pub fn progress(&self) -> Progress {
        progress(&self.result.findings, &self.store)
    }

    pub fn summary_counts(&self) -> CriticalityCounts {
        summary_counts(&self.result.findings, &self.store)
    }

    /// Returns whether the group is expanded afterwards.
    pub fn toggle_group(&mut self, key: &str) -> bool {
        if !self.expanded_groups.remove(key) {
            self.expanded_groups.insert(key.to_string());
            return true;
        }
        false
    }

    pub fn is_group_expanded(&self, key: &str) -> bool {
        self.expanded_groups.contains(key)
    }

    pub fn toggle_theme(&mut self, theme: Theme) -> bool {
        if !self.expanded_themes.remove(&theme) {
            self.expanded_themes.insert(theme);
            return true;
        }
        false
    }

    pub fn is_theme_expanded(&self, theme: Theme) -> bool {
        self.expanded_themes.contains(&theme)
    }

    pub fn into_parts(self) -> (ValidationResult, ArtifactIdentity, StatusStore) {
        (self.result, self.identity, self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Criticality;

    fn finding(code: &str, contract: &str, label: &str, omschrijving: &str) -> Finding {
        Finding {
            code: code.into(),
            contract: contract.into(),
            entiteit: "PP".into(),
            label: label.into(),
            omschrijving: omschrijving.into(),
            waarde: "1".into(),
            ..Default::default()
        }
    }

    fn session() -> ReviewSession {
        let result = ValidationResult {
            findings: vec![
                finding("E2-002", "DL1", "PP_BTP", "Premie klopt niet"),
                finding("E2-002", "DL2", "PP_BTP", "Premie klopt niet"),
                finding("E2-005", "DL1", "PP_BEDRAG", "Bedrag negatief"),
                finding("E1-002", "DL1", "AN_CODE", "Ongeldige code"),
            ],
            timestamp: "2026-03-01T10:00:00".into(),
            ..Default::default()
        };
        let identity = ArtifactIdentity::of_result(&result, Some("polis.xml"));
        ReviewSession::new(result, identity, StatusStore::new())
    }

    fn id_at(s: &ReviewSession, i: usize) -> FindingId {
        derive_finding_id(&s.findings()[i], i)
    }

    #[test]
    fn looks_up_findings_by_id() {
        let s = session();
        let id = id_at(&s, 2);
        let (index, f) = s.finding(&id).unwrap();
        assert_eq!(index, 2);
        assert_eq!(f.code, "E2-005");
        assert!(s.finding(&FindingId::from_str("nope")).is_none());
    }

    #[test]
    fn groups_follow_the_filter() {
        let mut s = session();
        assert_eq!(s.groups().len(), 3);
        s.set_filter(FindingFilter {
            text: Some("premie".into()),
            ..Default::default()
        });
        let groups = s.groups();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn group_edit_skips_confirmation() {
        let mut s = session();
        let key = s.groups().into_iter().find(|g| g.code == "E2-002").unwrap().key;
        let changes = s.set_group_status(&key, Status::Genegeerd).unwrap();
        assert_eq!(changes.len(), 2);
        assert!(s.pending_bulk().is_none());
        assert_eq!(s.group(&key).unwrap().dominant_status(s.store()), Status::Genegeerd);
        assert!(matches!(s.set_group_status("x|y|z", Status::Open), Err(ReviewError::UnknownGroup(_))));
    }

    #[test]
    fn theme_edit_covers_filtered_out_findings() {
        let mut s = session();
        s.set_filter(FindingFilter {
            text: Some("negatief".into()),
            ..Default::default()
        });
        let changes = s.set_theme_status(Theme::Premie, Status::Opgelost).unwrap();
        assert_eq!(changes.len(), 3);
        assert_eq!(s.theme_dominant_status(Theme::Premie), Status::Opgelost);
        assert_eq!(s.theme_dominant_status(Theme::Codes), Status::Open);
    }

    #[test]
    fn theme_overview_lists_present_themes_in_rank_order() {
        let mut s = session();
        s.request_status(&id_at(&s, 3), Status::Opgelost).unwrap();
        let overview = s.theme_overview();
        let themes: Vec<Theme> = overview.iter().map(|t| t.theme).collect();
        assert_eq!(themes, vec![Theme::Codes, Theme::Premie]);
        assert_eq!(overview[0].dominant, Status::Opgelost);
        assert_eq!((overview[1].total, overview[1].open), (3, 3));
    }

    #[test]
    fn pending_confirmation_blocks_other_edits() {
        let mut s = session();
        let out = s.request_status(&id_at(&s, 0), Status::Geaccepteerd).unwrap();
        assert_eq!(out, EditOutcome::NeedsConfirmation { similar: 1 });
        assert!(s.set_theme_status(Theme::Codes, Status::Opgelost).is_err());
        let changes = s.confirm_bulk(BulkScope::AllSimilar).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(s.progress().handled, 2);
    }

    #[test]
    fn unknown_finding_is_an_error() {
        let mut s = session();
        let err = s.request_status(&FindingId::from_str("x"), Status::Opgelost).unwrap_err();
        assert_eq!(err, ReviewError::UnknownFinding(FindingId::from_str("x")));
    }

    #[test]
    fn summary_counts_drop_handled_findings() {
        let mut s = session();
        assert_eq!(s.summary_counts().get(Criticality::Aandacht), 4);
        s.request_status(&id_at(&s, 2), Status::Opgelost).unwrap();
        assert_eq!(s.summary_counts().get(Criticality::Aandacht), 3);
    }

    #[test]
    fn expansion_toggles() {
        let mut s = session();
        assert!(s.toggle_group("k"));
        assert!(s.is_group_expanded("k"));
        assert!(!s.toggle_group("k"));
        assert!(!s.is_group_expanded("k"));
        assert!(s.toggle_theme(Theme::Premie));
        assert!(s.is_theme_expanded(Theme::Premie));
    }
}
