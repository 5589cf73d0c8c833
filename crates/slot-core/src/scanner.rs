//! Directory scanner for discovering record dumps

use crate::dump::mod_key_from_path;
use crate::error::{Error, Result};
use crate::record::ModKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Record dumps found under a directory, keyed by mod
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DumpIndex {
    /// Directory that was scanned
    pub root: PathBuf,
    /// Dump file per mod, sorted by mod name
    pub dumps: BTreeMap<ModKey, PathBuf>,
}

impl DumpIndex {
    /// Find the dump for a mod
    pub fn find(&self, mod_key: &ModKey) -> Option<&Path> {
        self.dumps.get(mod_key).map(PathBuf::as_path)
    }

    /// Whether a mod has a dump
    pub fn contains(&self, mod_key: &ModKey) -> bool {
        self.dumps.contains_key(mod_key)
    }

    /// All mods with a dump, in name order
    pub fn mod_keys(&self) -> impl Iterator<Item = &ModKey> {
        self.dumps.keys()
    }

    /// Number of dumps found
    pub fn len(&self) -> usize {
        self.dumps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dumps.is_empty()
    }
}

/// Scan a directory tree for record dumps
///
/// Files that are not named `<Plugin>.json` are ignored. When two files
/// name the same mod (case differs, or nested directories), the one with
/// the smaller path wins.
pub fn scan_dumps<P: AsRef<Path>>(root: P) -> Result<DumpIndex> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(Error::DumpDirNotFound(root.to_path_buf()));
    }

    let mut dumps: BTreeMap<ModKey, PathBuf> = BTreeMap::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let Some(mod_key) = mod_key_from_path(path) else {
            continue;
        };

        if let Some(existing) = dumps.get(&mod_key) {
            if existing.as_path() <= path {
                tracing::warn!(
                    "Ignoring duplicate dump for {}: {} (using {})",
                    mod_key,
                    path.display(),
                    existing.display()
                );
                continue;
            }
        }

        dumps.insert(mod_key, path.to_path_buf());
    }

    tracing::debug!("Found {} record dumps under {}", dumps.len(), root.display());

    Ok(DumpIndex {
        root: root.to_path_buf(),
        dumps,
    })
}
