//! Load order parsing
//!
//! Reads `plugins.txt` / `loadorder.txt` style files into an ordered list
//! of mods. Later entries have higher priority.

use crate::error::{Error, Result};
use crate::record::ModKey;
use crate::scanner::DumpIndex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// File name of the active-plugins list
pub const PLUGINS_FILE: &str = "plugins.txt";

/// Layout of a load order file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrderFormat {
    /// `plugins.txt`: only entries marked with `*` are active
    Plugins,
    /// `loadorder.txt`: every entry is active, a leading `*` is ignored
    LoadOrder,
}

impl LoadOrderFormat {
    /// Pick the format from a file name; `plugins.txt` in any case means
    /// [`LoadOrderFormat::Plugins`]
    pub fn from_path(path: &Path) -> Self {
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) if name.eq_ignore_ascii_case(PLUGINS_FILE) => Self::Plugins,
            _ => Self::LoadOrder,
        }
    }
}

/// Mods in ascending priority order, without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOrder {
    mods: Vec<ModKey>,
}

impl LoadOrder {
    /// Build a load order from mods in priority order
    ///
    /// Later duplicates are dropped.
    pub fn from_mods<I: IntoIterator<Item = ModKey>>(mods: I) -> Self {
        let mut seen = HashSet::new();
        let mods = mods.into_iter().filter(|m| seen.insert(m.clone())).collect();
        Self { mods }
    }

    /// Parse load order text in the given format
    ///
    /// Implicit masters missing from the text are placed first.
    pub fn parse_str(
        content: &str,
        format: LoadOrderFormat,
        implicit_masters: &[ModKey],
    ) -> Result<Self> {
        let entries = content
            .lines()
            .map(|l| l.trim_start_matches('\u{feff}').trim())
            .filter(|l| !l.is_empty() && !l.starts_with('#'));

        let mut listed = Vec::new();
        for entry in entries {
            let name = match (entry.strip_prefix('*'), format) {
                (Some(active), _) => active.trim(),
                (None, LoadOrderFormat::Plugins) => {
                    tracing::debug!("Skipping inactive plugin {}", entry);
                    continue;
                }
                (None, LoadOrderFormat::LoadOrder) => entry,
            };
            listed.push(ModKey::new(name)?);
        }

        let implicit = implicit_masters
            .iter()
            .filter(|m| !listed.contains(m))
            .cloned()
            .collect::<Vec<_>>();

        Ok(Self::from_mods(implicit.into_iter().chain(listed)))
    }

    /// Read a load order file, taking the format from its name
    pub fn load<P: AsRef<Path>>(path: P, implicit_masters: &[ModKey]) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::LoadOrderNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let format = LoadOrderFormat::from_path(path);
        let order = Self::parse_str(&content, format, implicit_masters)?;
        tracing::info!(
            "Loaded {} plugins from {} ({:?})",
            order.len(),
            path.display(),
            format
        );
        Ok(order)
    }

    /// Derive a load order from the dumps that exist
    ///
    /// Implicit masters with a dump come first in their configured order,
    /// then the rest by name.
    pub fn from_index(index: &DumpIndex, implicit_masters: &[ModKey]) -> Self {
        let masters = implicit_masters.iter().filter(|m| index.contains(m)).cloned();
        let others = index
            .mod_keys()
            .filter(|m| !implicit_masters.contains(m))
            .cloned();
        Self::from_mods(masters.chain(others))
    }

    /// Mods in ascending priority
    pub fn iter(&self) -> impl Iterator<Item = &ModKey> {
        self.mods.iter()
    }

    /// Priority position of a mod (0 is lowest)
    pub fn position(&self, mod_key: &ModKey) -> Option<usize> {
        self.mods.iter().position(|m| m == mod_key)
    }

    pub fn contains(&self, mod_key: &ModKey) -> bool {
        self.mods.contains(mod_key)
    }

    pub fn len(&self) -> usize {
        self.mods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn keys(names: &[&str]) -> Vec<ModKey> {
        names.iter().map(|n| ModKey::new(*n).unwrap()).collect()
    }

    fn names(order: &LoadOrder) -> Vec<&str> {
        order.iter().map(|m| m.file_name()).collect()
    }

    #[test]
    fn test_parse_loadorder_style() {
        let text = "# comment\nSkyrim.esm\n\nModA.esp\nModB.esp\n";
        let order = LoadOrder::parse_str(text, LoadOrderFormat::LoadOrder, &[]).unwrap();
        assert_eq!(names(&order), vec!["Skyrim.esm", "ModA.esp", "ModB.esp"]);
    }

    #[test]
    fn test_parse_plugins_style_skips_inactive() {
        let text = "*ModA.esp\nDisabled.esp\n*ModB.esp\n";
        let order = LoadOrder::parse_str(text, LoadOrderFormat::Plugins, &[]).unwrap();
        assert_eq!(names(&order), vec!["ModA.esp", "ModB.esp"]);
    }

    #[test]
    fn test_implicit_masters_prepended() {
        let implicit = keys(&["Skyrim.esm", "Update.esm"]);
        let text = "*ModA.esp\n";
        let order = LoadOrder::parse_str(text, LoadOrderFormat::Plugins, &implicit).unwrap();
        assert_eq!(names(&order), vec!["Skyrim.esm", "Update.esm", "ModA.esp"]);
    }

    #[test]
    fn test_listed_master_keeps_its_position() {
        let implicit = keys(&["Skyrim.esm", "Update.esm"]);
        let text = "*ModA.esp\n*Update.esm\n";
        let order = LoadOrder::parse_str(text, LoadOrderFormat::Plugins, &implicit).unwrap();
        assert_eq!(names(&order), vec!["Skyrim.esm", "ModA.esp", "Update.esm"]);
    }

    #[test]
    fn test_duplicates_keep_first() {
        let text = "ModA.esp\nModB.esp\nmoda.esp\n";
        let order = LoadOrder::parse_str(text, LoadOrderFormat::LoadOrder, &[]).unwrap();
        assert_eq!(names(&order), vec!["ModA.esp", "ModB.esp"]);
        assert_eq!(order.position(&ModKey::new("MODB.ESP").unwrap()), Some(1));
    }

    #[test]
    fn test_parse_rejects_bad_entry() {
        let result = LoadOrder::parse_str("not a plugin\n", LoadOrderFormat::LoadOrder, &[]);
        assert!(result.is_err());
    }

    #[test]
    fn test_from_index() {
        let mut index = DumpIndex::default();
        for name in ["Zeta.esp", "Alpha.esp", "Update.esm", "Skyrim.esm"] {
            index
                .dumps
                .insert(ModKey::new(name).unwrap(), PathBuf::from(name));
        }
        let implicit = keys(&["Skyrim.esm", "Update.esm", "Dawnguard.esm"]);

        let order = LoadOrder::from_index(&index, &implicit);
        assert_eq!(
            names(&order),
            vec!["Skyrim.esm", "Update.esm", "Alpha.esp", "Zeta.esp"]
        );
    }

    #[test]
    fn test_all_disabled_plugins_leaves_implicit_masters() {
        let implicit = keys(&["Skyrim.esm", "Update.esm"]);
        let text = "ModA.esp\nModB.esp\n";
        let order = LoadOrder::parse_str(text, LoadOrderFormat::Plugins, &implicit).unwrap();
        assert_eq!(names(&order), vec!["Skyrim.esm", "Update.esm"]);
    }

    #[test]
    fn test_loadorder_style_tolerates_star() {
        let text = "Skyrim.esm\n*ModA.esp\nModB.esp\n";
        let order = LoadOrder::parse_str(text, LoadOrderFormat::LoadOrder, &[]).unwrap();
        assert_eq!(names(&order), vec!["Skyrim.esm", "ModA.esp", "ModB.esp"]);
    }

    #[test]
    fn test_format_from_file_name() {
        assert_eq!(
            LoadOrderFormat::from_path(Path::new("data/plugins.txt")),
            LoadOrderFormat::Plugins
        );
        assert_eq!(
            LoadOrderFormat::from_path(Path::new("Plugins.TXT")),
            LoadOrderFormat::Plugins
        );
        assert_eq!(
            LoadOrderFormat::from_path(Path::new("data/loadorder.txt")),
            LoadOrderFormat::LoadOrder
        );
    }

    #[test]
    fn test_load_all_disabled_plugins_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plugins.txt");
        fs::write(&path, "# disabled\nModA.esp\nModB.esp\n").unwrap();

        let implicit = keys(&["Skyrim.esm"]);
        let order = LoadOrder::load(&path, &implicit).unwrap();
        assert_eq!(names(&order), vec!["Skyrim.esm"]);

        let path = dir.path().join("loadorder.txt");
        fs::write(&path, "ModA.esp\nModB.esp\n").unwrap();
        let order = LoadOrder::load(&path, &implicit).unwrap();
        assert_eq!(names(&order), vec!["Skyrim.esm", "ModA.esp", "ModB.esp"]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LoadOrder::load(dir.path().join("plugins.txt"), &[]).unwrap_err();
        assert!(matches!(err, Error::LoadOrderNotFound(_)));
    }
}
