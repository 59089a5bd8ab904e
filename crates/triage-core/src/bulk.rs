use serde::{Deserialize, Serialize};

use crate::error::ReviewError;
use crate::identity::{derive_bulk_key, derive_finding_id};
use crate::status::{StatusChange, StatusStore};
use crate::{BulkKey, Finding, FindingId, Status};

/// Scope picked when confirming a pending edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BulkScope {
    ThisOnly,
    AllSimilar,
}

/// A single-finding edit held back until the reviewer picks a scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingBulk {
    pub target: FindingId,
    pub bulk_key: BulkKey,
    /// Status displayed for `target` before the edit; restored on cancel.
    pub previous: Status,
    pub status: Status,
    /// Other findings with the same bulk key that were OPEN when the edit was requested.
    pub similar: Vec<FindingId>,
}

impl PendingBulk {
    pub fn similar_count(&self) -> usize {
        self.similar.len()
    }

    /// Writes for the chosen scope. Similar findings that stopped being OPEN
    /// in the meantime are skipped.
    pub fn changes(&self, scope: BulkScope, store: &StatusStore) -> Vec<StatusChange> {
        let mut out = vec![StatusChange {
            id: self.target.clone(),
            previous: store.get(&self.target),
            status: self.status,
        }];
        if scope == BulkScope::AllSimilar {
            out.extend(
                self.similar
                    .iter()
                    .filter(|id| store.get(id).is_open())
                    .map(|id| StatusChange {
                        id: id.clone(),
                        previous: Status::Open,
                        status: self.status,
                    }),
            );
        }
        out
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum BulkState {
    #[default]
    Idle,
    PendingConfirmation(PendingBulk),
}

/// Result of requesting a single-finding edit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// Written straight to the store.
    Applied(Vec<StatusChange>),
    /// Held back; `similar` OPEN findings share the bulk key.
    NeedsConfirmation { similar: usize },
}

/// OPEN findings sharing the bulk key of `findings[index]`, excluding that finding.
pub fn similar_open(findings: &[Finding], store: &StatusStore, index: usize) -> Vec<FindingId> {
    let Some(target) = findings.get(index) else {
        return Vec::new();
    };
    let key = derive_bulk_key(target);
    findings
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .filter(|(_, f)| derive_bulk_key(f) == key)
        .map(|(i, f)| derive_finding_id(f, i))
        .filter(|id| store.get(id).is_open())
        .collect()
}

/// Unconditional write of `status` to every id; used by group and theme edits.
pub fn set_all<'a, I>(store: &mut StatusStore, ids: I, status: Status) -> Vec<StatusChange>
where
    I: IntoIterator<Item = &'a FindingId>,
{
    ids.into_iter()
        .map(|id| StatusChange {
            id: id.clone(),
            previous: store.set(id.clone(), status),
            status,
        })
        .collect()
}

/// `Idle -> PendingConfirmation -> Applied -> Idle` for single-finding edits.
#[derive(Clone, Debug, Default)]
pub struct BulkPropagator {
    state: BulkState,
}

impl BulkPropagator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &BulkState {
        &self.state
    }

    pub fn pending(&self) -> Option<&PendingBulk> {
        match &self.state {
            BulkState::PendingConfirmation(p) => Some(p),
            BulkState::Idle => None,
        }
    }

    /// Applies directly unless the new status offers bulk and at least one
    /// other finding with the same bulk key is OPEN.
    pub fn request(
        &mut self,
        findings: &[Finding],
        store: &mut StatusStore,
        index: usize,
        status: Status,
    ) -> Result<EditOutcome, ReviewError> {
        if let Some(p) = self.pending() {
            return Err(ReviewError::ConfirmationPending {
                target: p.target.clone(),
                status: p.status,
            });
        }
        let Some(finding) = findings.get(index) else {
            return Err(ReviewError::IndexOutOfRange(index));
        };
        let target = derive_finding_id(finding, index);

        let similar = if status.offers_bulk() {
            similar_open(findings, store, index)
        } else {
            Vec::new()
        };

        if similar.is_empty() {
            return Ok(EditOutcome::Applied(set_all(store, [&target], status)));
        }

        let count = similar.len();
        self.state = BulkState::PendingConfirmation(PendingBulk {
            previous: store.get(&target),
            bulk_key: derive_bulk_key(finding),
            target,
            status,
            similar,
        });
        Ok(EditOutcome::NeedsConfirmation { similar: count })
    }

    /// Commits the pending edit for `scope` as one batch and returns to idle.
    pub fn confirm(&mut self, store: &mut StatusStore, scope: BulkScope) -> Result<Vec<StatusChange>, ReviewError> {
        let BulkState::PendingConfirmation(pending) = std::mem::take(&mut self.state) else {
            return Err(ReviewError::NothingPending);
        };
        let changes = pending.changes(scope, store);
        store.apply(&changes);
        Ok(changes)
    }

    /// Drops the pending edit without touching the store. Returns the status
    /// the edited finding should display again.
    pub fn cancel(&mut self) -> Result<Status, ReviewError> {
        match std::mem::take(&mut self.state) {
            BulkState::PendingConfirmation(p) => Ok(p.previous),
            BulkState::Idle => Err(ReviewError::NothingPending),
        }
    }
}
