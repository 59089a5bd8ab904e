use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Kinds of file a review can be exported to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportKind {
    Session,
    EnrichedJson,
    Csv,
}

impl ExportKind {
    fn suffix(self) -> &'static str {
        match self {
            ExportKind::Session => "sessie.json",
            ExportKind::EnrichedJson => "beoordeeld.json",
            ExportKind::Csv => "beoordeeld.csv",
        }
    }
}

/// `polis.xml` + Session -> `polis-sessie.json`.
pub fn export_file_name(file_name: &str, kind: ExportKind) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("review");
    format!("{stem}-{}", kind.suffix())
}

pub trait ExportStore: Send + Sync {
    fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf>;
}

#[derive(Clone)]
pub struct FsExportStore {
    pub root: PathBuf,
}

impl FsExportStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl ExportStore for FsExportStore {
    fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.root).with_context(|| format!("create export dir {}", self.root.display()))?;
        let path = self.root.join(name);
        std::fs::write(&path, bytes).with_context(|| format!("write export {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn names_follow_source_file() {
        assert_eq!(export_file_name("polis.xml", ExportKind::Session), "polis-sessie.json");
        assert_eq!(export_file_name("dir/a.b.xml", ExportKind::Csv), "a.b-beoordeeld.csv");
        assert_eq!(export_file_name("", ExportKind::EnrichedJson), "review-beoordeeld.json");
    }

    #[test]
    fn writes_into_nested_root() {
        let dir = tempdir().unwrap();
        let store = FsExportStore::new(dir.path().join("exports"));
        let path = store.write("x.csv", b"a;b\n").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "a;b\n");
    }
}
