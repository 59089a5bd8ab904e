use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use triage_core::{
    derive_finding_id, ArtifactIdentity, CategoryFilter, Criticality, CriticalityCounts, EditOutcome, FindingFilter,
    Progress, ReviewSession, Status, Theme,
};
use triage_hitl::{parse_bulk_answer, BulkAnswer};
use triage_session::{export_session, import_session};
use triage_storage::{InMemoryStore, PersistenceAdapter, DEFAULT_NAMESPACE};

use crate::util::now_utc;

/// One reviewer step in `actions.yaml`.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    Set {
        index: usize,
        status: Status,
        /// Answer to the bulk prompt, if one appears: `this`, `all` or `cancel`.
        #[serde(default)]
        answer: Option<String>,
    },
    SetGroup {
        code: String,
        status: Status,
    },
    SetTheme {
        theme: Theme,
        status: Status,
    },
    Filter {
        #[serde(default)]
        criticality: Option<Criticality>,
        #[serde(default)]
        status: Option<Status>,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        category: Option<String>,
    },
    ClearFilter,
    /// Rebuild the session from persisted state only.
    Reload,
    /// Export a session file and import it again.
    RoundTrip,
}

#[derive(Debug, Deserialize)]
struct ScenarioActions {
    actions: Vec<Action>,
}

#[derive(Debug, Deserialize)]
pub struct ScenarioExpected {
    pub scenario_id: String,
    pub progress: Progress,
    #[serde(default)]
    pub summary_counts: Option<CriticalityCounts>,
    #[serde(default)]
    pub prompts: Vec<usize>,
    #[serde(default)]
    pub statuses: BTreeMap<usize, Status>,
    #[serde(default)]
    pub visible_groups: Option<usize>,
    #[serde(default)]
    pub theme_status: BTreeMap<Theme, Status>,
}

#[derive(Debug)]
pub struct ScenarioResult {
    pub progress: Progress,
    pub summary_counts: CriticalityCounts,
    /// Similar-finding count of every bulk prompt shown, in order.
    pub prompts: Vec<usize>,
    pub statuses: Vec<Status>,
    pub visible_groups: usize,
    pub theme_status: BTreeMap<Theme, Status>,
}

pub fn load_expected(dir: &Path) -> Result<ScenarioExpected> {
    let p = dir.join("expected.yaml");
    let s = std::fs::read_to_string(&p).with_context(|| format!("read expected.yaml: {}", p.display()))?;
    let exp: ScenarioExpected = serde_yaml::from_str(&s).with_context(|| "parse expected.yaml")?;
    Ok(exp)
}

fn load_actions(dir: &Path) -> Result<Vec<Action>> {
    let p = dir.join("actions.yaml");
    let s = std::fs::read_to_string(&p).with_context(|| format!("read actions.yaml: {}", p.display()))?;
    let a: ScenarioActions = serde_yaml::from_str(&s).with_context(|| "parse actions.yaml")?;
    Ok(a.actions)
}

/// Replays `actions.yaml` against `result.json` with in-memory persistence
/// that is written after every mutation, the way the CLI does it.
pub fn simulate(dir: &Path) -> Result<ScenarioResult> {
    let result = triage_result::load_validation_result(&dir.join("result.json"))?;
    let actions = load_actions(dir)?;

    let persistence = PersistenceAdapter::new(Box::new(InMemoryStore::new()), DEFAULT_NAMESPACE);
    let identity = ArtifactIdentity::of_result(&result, None);
    let statuses = persistence.load(&identity);
    let mut session = ReviewSession::new(result, identity, statuses);
    let mut prompts = Vec::new();

    for action in actions {
        match action {
            Action::Set { index, status, answer } => {
                let finding = session
                    .findings()
                    .get(index)
                    .ok_or_else(|| anyhow!("no finding at index {index}"))?;
                let id = derive_finding_id(finding, index);
                if let EditOutcome::NeedsConfirmation { similar } = session.request_status(&id, status)? {
                    prompts.push(similar);
                    let raw = answer.unwrap_or_default();
                    match parse_bulk_answer(&raw) {
                        Some(BulkAnswer::Apply(scope)) => {
                            session.confirm_bulk(scope)?;
                        }
                        Some(BulkAnswer::Cancel) => {
                            session.cancel_bulk()?;
                        }
                        None => return Err(anyhow!("unrecognised bulk answer {raw:?}")),
                    }
                }
                persistence.save(session.identity(), session.store());
            }
            Action::SetGroup { code, status } => {
                let key = session
                    .groups()
                    .into_iter()
                    .find(|g| g.code == code)
                    .map(|g| g.key)
                    .ok_or_else(|| anyhow!("no visible group for {code}"))?;
                session.set_group_status(&key, status)?;
                persistence.save(session.identity(), session.store());
            }
            Action::SetTheme { theme, status } => {
                session.set_theme_status(theme, status)?;
                persistence.save(session.identity(), session.store());
            }
            Action::Filter {
                criticality,
                status,
                text,
                category,
            } => {
                session.set_filter(FindingFilter {
                    criticality,
                    status,
                    text,
                    ..Default::default()
                });
                let category = match category {
                    Some(c) => c.parse::<CategoryFilter>().map_err(|e| anyhow!(e))?,
                    None => CategoryFilter::All,
                };
                session.set_category(category);
            }
            Action::ClearFilter => {
                session.set_filter(FindingFilter::default());
                session.set_category(CategoryFilter::All);
            }
            Action::Reload => {
                let (result, identity, _) = session.into_parts();
                let statuses = persistence.load(&identity);
                session = ReviewSession::new(result, identity, statuses);
            }
            Action::RoundTrip => {
                let file = export_session(
                    session.result(),
                    session.store(),
                    None,
                    Some(session.identity().file_name.as_str()),
                    now_utc(),
                );
                let raw = serde_json::to_string(&file)?;
                let restored = import_session(&raw)?;
                persistence.save(&restored.identity, &restored.statuses);
                session = ReviewSession::new(restored.result, restored.identity, restored.statuses);
            }
        }
    }

    let statuses = session
        .findings()
        .iter()
        .enumerate()
        .map(|(i, f)| session.status_of(&derive_finding_id(f, i)))
        .collect();
    let theme_status = session
        .theme_overview()
        .into_iter()
        .map(|t| (t.theme, t.dominant))
        .collect();
    Ok(ScenarioResult {
        progress: session.progress(),
        summary_counts: session.summary_counts(),
        prompts,
        statuses,
        visible_groups: session.groups().len(),
        theme_status,
    })
}
