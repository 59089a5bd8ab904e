use anyhow::{anyhow, Context, Result};
use std::path::Path;

use crate::config::{Backend, Config};
use crate::reviewer::open_state_store;
use crate::workspace::ReviewWorkspace;

const CHECK_KEY: &str = "__doctor_check__";

/// Checks the review root is usable. Returns one line per passed check;
/// the first failing check is the error.
pub fn doctor(root: &Path, cfg: &Config) -> Result<Vec<String>> {
    let mut ok = Vec::new();

    let backend = cfg.backend()?;
    ok.push(format!("config: {}", Config::config_path(root).display()));

    let store = open_state_store(root, cfg).context("open state store")?;
    store.put(CHECK_KEY, "{}").context("write check key")?;
    if store.get(CHECK_KEY)?.as_deref() != Some("{}") {
        return Err(anyhow!("state store did not return the check value"));
    }
    store.remove(CHECK_KEY)?;
    match backend {
        Backend::Memory => ok.push("storage: memory (statuses are lost between invocations)".to_string()),
        _ => ok.push(format!("storage: {:?} at {}", backend, cfg.storage_path(root)?.display())),
    }

    let export_dir = cfg.export_dir(root);
    std::fs::create_dir_all(&export_dir).with_context(|| format!("create export dir {}", export_dir.display()))?;
    ok.push(format!("exports: {}", export_dir.display()));

    cfg.default_category()?;

    let workspace = ReviewWorkspace::new(root);
    match workspace.active()? {
        Some(p) => {
            workspace.load_result().context("open review is unreadable")?;
            ok.push(format!(
                "open review: {} ({})",
                p.identity.file_name, p.identity.validation_timestamp
            ));
        }
        None => ok.push("open review: none".to_string()),
    }
    Ok(ok)
}
