use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::{debug, info, warn};
use triage_core::{
    ArtifactIdentity, ChatRequest, EditOutcome, Finding, FindingId, PendingBulk, ReviewSession, Status,
    StatusChange, Theme, ValidationResult,
};
use triage_hitl::BulkAnswer;
use triage_result::{check_result, result_fingerprint, Diagnostic};
use triage_session::{
    enriched_json, export_file_name, export_session, import_session, to_csv, ExportKind, ExportStore, FsExportStore,
};
use triage_storage::{InMemoryStore, JsonFileStore, PersistenceAdapter, StateStore};
use triage_storage_sqlite::SqliteStore;

use crate::config::{Backend, Config};
use crate::util::now_utc;
use crate::workspace::{ActivePointer, ReviewWorkspace};

pub fn open_state_store(root: &Path, cfg: &Config) -> Result<Box<dyn StateStore>> {
    Ok(match cfg.backend()? {
        Backend::Sqlite => Box::new(SqliteStore::open(&cfg.storage_path(root)?)?),
        Backend::Json => Box::new(JsonFileStore::open(&cfg.storage_path(root)?)?),
        Backend::Memory => Box::new(InMemoryStore::new()),
    })
}

/// Store used by a review. A backend that cannot be opened is logged and
/// replaced by an in-memory store, so the review still opens without saved
/// statuses.
pub fn open_review_store(root: &Path, cfg: &Config) -> Box<dyn StateStore> {
    match open_state_store(root, cfg) {
        Ok(store) => store,
        Err(e) => {
            warn!(error = %format!("{e:#}"), "state store unavailable; statuses are kept in memory only");
            Box::new(InMemoryStore::new())
        }
    }
}

/// How a single-finding edit ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SetOutcome {
    Applied(Vec<StatusChange>),
    Cancelled { restored: Status },
}

/// Imperative shell around a [`ReviewSession`]: loads the open review from
/// disk and writes the status map back after every mutation.
pub struct Reviewer {
    root: PathBuf,
    cfg: Config,
    workspace: ReviewWorkspace,
    persistence: PersistenceAdapter,
    session: ReviewSession,
    source: Option<String>,
    diagnostics: Vec<Diagnostic>,
}

impl Reviewer {
    /// Opens a freshly validated report, replacing any open review.
    pub fn start(
        root: PathBuf,
        cfg: Config,
        result: ValidationResult,
        selected_name: Option<&str>,
        source: Option<String>,
    ) -> Result<Self> {
        let identity = ArtifactIdentity::of_result(&result, selected_name);
        let workspace = ReviewWorkspace::new(&root);
        let fingerprint = result_fingerprint(&result);
        if let Some(prev) = workspace.active()? {
            if prev.identity == identity && prev.fingerprint != fingerprint {
                warn!(
                    file = %identity.file_name,
                    "report differs from the one last opened under this name and timestamp; saved statuses may point at other findings"
                );
            }
        }
        let persistence = PersistenceAdapter::new(open_review_store(&root, &cfg), cfg.project.namespace.clone());
        let statuses = persistence.load(&identity);
        let pointer = ActivePointer {
            identity: identity.clone(),
            fingerprint,
            has_source: source.is_some(),
        };
        workspace.store(&pointer, &result, source.as_deref())?;
        info!(file = %identity.file_name, findings = result.findings.len(), restored = statuses.len(), "review opened");
        Self::assemble(root, cfg, workspace, persistence, result, identity, statuses, source)
    }

    /// Reopens the review recorded in `.triage/active.json`.
    pub fn resume(root: PathBuf, cfg: Config) -> Result<Self> {
        let workspace = ReviewWorkspace::new(&root);
        let pointer = workspace
            .active()?
            .ok_or_else(|| anyhow!("no review is open; run `triage load <result.json>` first"))?;
        let result = workspace.load_result()?;
        let source = workspace.load_source()?;
        let persistence = PersistenceAdapter::new(open_review_store(&root, &cfg), cfg.project.namespace.clone());
        let statuses = persistence.load(&pointer.identity);
        Self::assemble(root, cfg, workspace, persistence, result, pointer.identity, statuses, source)
    }

    /// Replaces the open review with an exported session. Nothing changes on error.
    pub fn import(root: PathBuf, cfg: Config, raw: &str) -> Result<Self> {
        let restored = import_session(raw)?;
        let workspace = ReviewWorkspace::new(&root);
        let persistence = PersistenceAdapter::new(open_review_store(&root, &cfg), cfg.project.namespace.clone());
        let pointer = ActivePointer {
            identity: restored.identity.clone(),
            fingerprint: result_fingerprint(&restored.result),
            has_source: restored.source_document.is_some(),
        };
        workspace.store(&pointer, &restored.result, restored.source_document.as_deref())?;
        persistence.save(&restored.identity, &restored.statuses);
        Self::assemble(
            root,
            cfg,
            workspace,
            persistence,
            restored.result,
            restored.identity,
            restored.statuses,
            restored.source_document,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        root: PathBuf,
        cfg: Config,
        workspace: ReviewWorkspace,
        persistence: PersistenceAdapter,
        result: ValidationResult,
        identity: ArtifactIdentity,
        statuses: triage_core::StatusStore,
        source: Option<String>,
    ) -> Result<Self> {
        let diagnostics = check_result(&result);
        for d in &diagnostics {
            debug!(diagnostic = %d, "report check");
        }
        let mut session = ReviewSession::new(result, identity, statuses);
        session.set_category(cfg.default_category()?);
        Ok(Self {
            root,
            cfg,
            workspace,
            persistence,
            session,
            source,
            diagnostics,
        })
    }

    pub fn session(&self) -> &ReviewSession {
        &self.session
    }

    /// Filters and expansion only; status writes go through the methods below.
    pub fn session_mut(&mut self) -> &mut ReviewSession {
        &mut self.session
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    fn persist(&self) {
        self.persistence.save(self.session.identity(), self.session.store());
    }

    /// Single-finding edit. `decide` is asked only when similar OPEN
    /// findings exist.
    pub fn set_status<F>(&mut self, id: &FindingId, status: Status, decide: F) -> Result<SetOutcome>
    where
        F: FnOnce(&PendingBulk, &Finding) -> BulkAnswer,
    {
        let outcome = match self.session.request_status(id, status)? {
            EditOutcome::Applied(changes) => SetOutcome::Applied(changes),
            EditOutcome::NeedsConfirmation { .. } => {
                let (pending, finding) = match (self.session.pending_bulk(), self.session.finding(id)) {
                    (Some(p), Some((_, f))) => (p.clone(), f.clone()),
                    _ => return Err(anyhow!("bulk confirmation lost for {id}")),
                };
                match decide(&pending, &finding) {
                    BulkAnswer::Apply(scope) => SetOutcome::Applied(self.session.confirm_bulk(scope)?),
                    BulkAnswer::Cancel => SetOutcome::Cancelled {
                        restored: self.session.cancel_bulk()?,
                    },
                }
            }
        };
        if let SetOutcome::Applied(changes) = &outcome {
            debug!(%id, %status, written = changes.len(), "status set");
            self.persist();
        }
        Ok(outcome)
    }

    pub fn set_group_status(&mut self, key: &str, status: Status) -> Result<Vec<StatusChange>> {
        let changes = self.session.set_group_status(key, status)?;
        debug!(group = key, %status, written = changes.len(), "group status set");
        self.persist();
        Ok(changes)
    }

    pub fn set_theme_status(&mut self, theme: Theme, status: Status) -> Result<Vec<StatusChange>> {
        let changes = self.session.set_theme_status(theme, status)?;
        debug!(%theme, %status, written = changes.len(), "theme status set");
        self.persist();
        Ok(changes)
    }

    fn write_export(&self, kind: ExportKind, out: Option<&Path>, bytes: &[u8]) -> Result<PathBuf> {
        let path = match out {
            Some(p) => {
                std::fs::write(p, bytes).with_context(|| format!("write {}", p.display()))?;
                p.to_path_buf()
            }
            None => {
                let store = FsExportStore::new(self.cfg.export_dir(&self.root));
                store.write(&export_file_name(&self.session.identity().file_name, kind), bytes)?
            }
        };
        info!(path = %path.display(), ?kind, "exported");
        Ok(path)
    }

    pub fn export_session(&self, out: Option<&Path>) -> Result<PathBuf> {
        let file = export_session(
            self.session.result(),
            self.session.store(),
            self.source.as_deref(),
            Some(self.session.identity().file_name.as_str()),
            now_utc(),
        );
        self.write_export(ExportKind::Session, out, &serde_json::to_vec_pretty(&file)?)
    }

    pub fn export_json(&self, out: Option<&Path>) -> Result<PathBuf> {
        let value = enriched_json(self.session.result(), self.session.store())?;
        self.write_export(ExportKind::EnrichedJson, out, &serde_json::to_vec_pretty(&value)?)
    }

    pub fn export_csv(&self, out: Option<&Path>) -> Result<PathBuf> {
        let csv = to_csv(self.session.result(), self.session.store());
        self.write_export(ExportKind::Csv, out, csv.as_bytes())
    }

    pub fn chat_request(&self, id: &FindingId, message: &str) -> Result<ChatRequest> {
        let (_, finding) = self
            .session
            .finding(id)
            .ok_or_else(|| anyhow!("unknown finding: {id}"))?;
        Ok(ChatRequest::about_finding(
            message,
            finding,
            &self.session.identity().file_name,
        )?)
    }

    /// Drops the open review. Saved statuses stay unless `forget` is set.
    pub fn close(self, forget: bool) -> Result<()> {
        if forget {
            self.persistence.clear(self.session.identity());
        }
        self.workspace.clear()?;
        info!(file = %self.session.identity().file_name, forget, "review closed");
        Ok(())
    }
}
