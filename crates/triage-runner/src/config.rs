use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use triage_core::CategoryFilter;
use triage_storage::DEFAULT_NAMESPACE;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub project: ProjectConfig,
    pub storage: StorageConfig,
    pub export: ExportConfig,
    #[serde(default)]
    pub review: ReviewConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Prefix of every persisted status key.
    pub namespace: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    pub backend: String, // "sqlite" | "json" | "memory"
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportConfig {
    pub dir: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewConfig {
    #[serde(default)]
    pub default_category: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    Sqlite,
    Json,
    Memory,
}

impl Config {
    pub fn default_for_root() -> Self {
        Self {
            project: ProjectConfig {
                namespace: DEFAULT_NAMESPACE.to_string(),
            },
            storage: StorageConfig {
                backend: "sqlite".to_string(),
                path: None,
            },
            export: ExportConfig {
                dir: ".triage/exports".to_string(),
            },
            review: ReviewConfig::default(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let cfg: Config = toml::from_str(&s).with_context(|| "parse triage.toml")?;
        Ok(cfg)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let s = toml::to_string_pretty(self).with_context(|| "serialize toml")?;
        std::fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    /// Loads the config under `root`, writing the defaults first if there is none.
    pub fn load_or_init(root: &Path) -> Result<Self> {
        let path = Self::config_path(root);
        if path.exists() {
            return Self::load_from(&path);
        }
        let cfg = Self::default_for_root();
        cfg.save_to(&path)?;
        Ok(cfg)
    }

    pub fn backend(&self) -> Result<Backend> {
        match self.storage.backend.trim() {
            "sqlite" => Ok(Backend::Sqlite),
            "json" => Ok(Backend::Json),
            "memory" => Ok(Backend::Memory),
            other => Err(anyhow!("unknown storage backend {other:?} (expected sqlite, json or memory)")),
        }
    }

    /// Configured storage path, or the backend's default under `.triage/`.
    pub fn storage_path(&self, root: &Path) -> Result<PathBuf> {
        if let Some(p) = &self.storage.path {
            return Ok(resolve(root, p));
        }
        Ok(match self.backend()? {
            Backend::Sqlite => triage_storage_sqlite::default_db_path(root),
            Backend::Json | Backend::Memory => triage_storage::default_state_path(root),
        })
    }

    pub fn export_dir(&self, root: &Path) -> PathBuf {
        resolve(root, &self.export.dir)
    }

    pub fn default_category(&self) -> Result<CategoryFilter> {
        match &self.review.default_category {
            None => Ok(CategoryFilter::All),
            Some(c) => c.parse::<CategoryFilter>().map_err(|e| anyhow!(e)),
        }
    }

    pub fn config_path(root: &Path) -> PathBuf {
        root.join(".triage").join("triage.toml")
    }
}

/// `~` is expanded; relative paths are taken from `root`.
fn resolve(root: &Path, raw: &str) -> PathBuf {
    let expanded = PathBuf::from(shellexpand::tilde(raw).to_string());
    if expanded.is_absolute() {
        expanded
    } else {
        root.join(expanded)
    }
}
