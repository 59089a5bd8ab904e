use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use triage_core::{ArtifactIdentity, ValidationResult};

use crate::util::read_optional;

/// Points successive CLI invocations at the review that is currently open.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePointer {
    pub identity: ArtifactIdentity,
    pub fingerprint: String,
    #[serde(default)]
    pub has_source: bool,
}

/// Files of the open review under `.triage/current/`.
pub struct ReviewWorkspace {
    root: PathBuf,
}

impl ReviewWorkspace {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.join(".triage"),
        }
    }

    fn current_dir(&self) -> PathBuf {
        self.root.join("current")
    }

    pub fn active_path(&self) -> PathBuf {
        self.root.join("active.json")
    }

    fn result_path(&self) -> PathBuf {
        self.current_dir().join("result.json")
    }

    fn source_path(&self) -> PathBuf {
        self.current_dir().join("source.xml")
    }

    pub fn active(&self) -> Result<Option<ActivePointer>> {
        let path = self.active_path();
        match read_optional(&path)? {
            None => Ok(None),
            Some(raw) => {
                let p = serde_json::from_str(&raw).with_context(|| format!("parse {}", path.display()))?;
                Ok(Some(p))
            }
        }
    }

    /// Replaces whatever review was open.
    pub fn store(&self, pointer: &ActivePointer, result: &ValidationResult, source: Option<&str>) -> Result<()> {
        let dir = self.current_dir();
        std::fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        std::fs::write(self.result_path(), serde_json::to_vec_pretty(result)?)
            .with_context(|| format!("write {}", self.result_path().display()))?;
        match source {
            Some(doc) => std::fs::write(self.source_path(), doc)
                .with_context(|| format!("write {}", self.source_path().display()))?,
            None => {
                if self.source_path().exists() {
                    std::fs::remove_file(self.source_path())?;
                }
            }
        }
        std::fs::write(self.active_path(), serde_json::to_vec_pretty(pointer)?)
            .with_context(|| format!("write {}", self.active_path().display()))?;
        Ok(())
    }

    pub fn load_result(&self) -> Result<ValidationResult> {
        let raw = std::fs::read_to_string(self.result_path())
            .with_context(|| format!("read {}", self.result_path().display()))?;
        Ok(triage_result::parse_validation_result(&raw)?)
    }

    pub fn load_source(&self) -> Result<Option<String>> {
        read_optional(&self.source_path())
    }

    pub fn clear(&self) -> Result<()> {
        if self.current_dir().exists() {
            std::fs::remove_dir_all(self.current_dir())?;
        }
        if self.active_path().exists() {
            std::fs::remove_file(self.active_path())?;
        }
        Ok(())
    }
}
