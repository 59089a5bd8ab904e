use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{FindingId, Status};

/// Tie-break among equally frequent non-OPEN statuses, strongest first.
pub const DOMINANCE_PRIORITY: [Status; 3] = [Status::Opgelost, Status::Geaccepteerd, Status::Genegeerd];

/// One applied (or to-be-applied) status write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusChange {
    pub id: FindingId,
    pub previous: Status,
    pub status: Status,
}

/// Mutable review state: `FindingId -> Status`. Ids that are absent are OPEN.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusStore {
    statuses: BTreeMap<FindingId, Status>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &FindingId) -> Status {
        self.statuses.get(id).copied().unwrap_or_default()
    }

    /// Overwrites and returns the status shown before.
    pub fn set(&mut self, id: FindingId, status: Status) -> Status {
        self.statuses.insert(id, status).unwrap_or_default()
    }

    pub fn apply(&mut self, changes: &[StatusChange]) {
        for c in changes {
            self.statuses.insert(c.id.clone(), c.status);
        }
    }

    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FindingId, &Status)> {
        self.statuses.iter()
    }

    pub fn clear(&mut self) {
        self.statuses.clear();
    }
}

impl FromIterator<(FindingId, Status)> for StatusStore {
    fn from_iter<T: IntoIterator<Item = (FindingId, Status)>>(iter: T) -> Self {
        Self {
            statuses: iter.into_iter().collect(),
        }
    }
}

/// Single status that represents a bucket of findings.
///
/// 1. all members agree: that status;
/// 2. any member OPEN: OPEN;
/// 3. otherwise the most frequent status, ties resolved by [`DOMINANCE_PRIORITY`].
///
/// An empty bucket is OPEN.
pub fn dominant_status<I>(statuses: I) -> Status
where
    I: IntoIterator<Item = Status>,
{
    let mut counts = [0usize; 4];
    for s in statuses {
        counts[s.ordinal()] += 1;
    }

    let distinct: Vec<Status> = Status::ALL.into_iter().filter(|s| counts[s.ordinal()] > 0).collect();
    match distinct.as_slice() {
        [] => return Status::Open,
        [only] => return *only,
        _ => {}
    }
    if counts[Status::Open.ordinal()] > 0 {
        return Status::Open;
    }

    let top = DOMINANCE_PRIORITY.iter().map(|s| counts[s.ordinal()]).max().unwrap_or(0);
    DOMINANCE_PRIORITY
        .into_iter()
        .find(|s| counts[s.ordinal()] == top)
        .unwrap_or(Status::Open)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> FindingId {
        FindingId::from_str(s)
    }

    #[test]
    fn absent_ids_are_open() {
        let store = StatusStore::new();
        assert_eq!(store.get(&id("x")), Status::Open);
    }

    #[test]
    fn set_returns_previous() {
        let mut store = StatusStore::new();
        assert_eq!(store.set(id("a"), Status::Genegeerd), Status::Open);
        assert_eq!(store.set(id("a"), Status::Opgelost), Status::Genegeerd);
        assert_eq!(store.get(&id("a")), Status::Opgelost);
    }

    #[test]
    fn serializes_as_plain_map() {
        let store: StatusStore = [(id("a:b:c:d:0"), Status::Geaccepteerd)].into_iter().collect();
        let json = serde_json::to_string(&store).unwrap();
        assert_eq!(json, r#"{"a:b:c:d:0":"GEACCEPTEERD"}"#);
        let back: StatusStore = serde_json::from_str(&json).unwrap();
        assert_eq!(back, store);
    }

    #[test]
    fn uniform_bucket_keeps_its_status() {
        assert_eq!(dominant_status([Status::Genegeerd, Status::Genegeerd]), Status::Genegeerd);
        assert_eq!(dominant_status([Status::Open]), Status::Open);
    }

    #[test]
    fn any_open_member_keeps_bucket_open() {
        assert_eq!(
            dominant_status([Status::Opgelost, Status::Opgelost, Status::Open]),
            Status::Open
        );
    }

    #[test]
    fn most_frequent_wins_without_open() {
        assert_eq!(
            dominant_status([Status::Genegeerd, Status::Genegeerd, Status::Opgelost]),
            Status::Genegeerd
        );
    }

    #[test]
    fn ties_follow_fixed_priority() {
        assert_eq!(dominant_status([Status::Genegeerd, Status::Opgelost]), Status::Opgelost);
        assert_eq!(dominant_status([Status::Opgelost, Status::Genegeerd]), Status::Opgelost);
        assert_eq!(dominant_status([Status::Genegeerd, Status::Geaccepteerd]), Status::Geaccepteerd);
        assert_eq!(
            dominant_status([Status::Geaccepteerd, Status::Genegeerd, Status::Opgelost]),
            Status::Opgelost
        );
    }

    #[test]
    fn empty_bucket_is_open() {
        assert_eq!(dominant_status(Vec::new()), Status::Open);
    }
}
