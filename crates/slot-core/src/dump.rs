//! Record dump reader
//!
//! A record dump is one JSON file per mod holding the armor and armor
//! addon records that mod defines or overrides.

use crate::error::{Error, Result};
use crate::record::{Armor, ArmorAddon, ModKey, Record};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File extension of record dumps
pub const DUMP_EXTENSION: &str = "json";

/// On-disk layout of a record dump
#[derive(Debug, Default, Serialize, Deserialize)]
struct DumpFile {
    #[serde(default)]
    armors: Vec<Armor>,
    #[serde(default)]
    armor_addons: Vec<ArmorAddon>,
}

/// The records contributed by one mod
#[derive(Debug, Clone)]
pub struct ModDump {
    /// The mod these records come from
    pub mod_key: ModKey,
    /// Armor records, new or overriding
    pub armors: Vec<Armor>,
    /// Armor addon records, new or overriding
    pub armor_addons: Vec<ArmorAddon>,
    /// Source file path
    pub source_path: PathBuf,
}

impl ModDump {
    /// Total number of records
    pub fn record_count(&self) -> usize {
        self.armors.len() + self.armor_addons.len()
    }

    /// Records in this dump that override another mod's records
    pub fn override_count(&self) -> usize {
        count_foreign(&self.armors, &self.mod_key)
            + count_foreign(&self.armor_addons, &self.mod_key)
    }
}

fn count_foreign<R: Record>(records: &[R], owner: &ModKey) -> usize {
    records
        .iter()
        .filter(|r| &r.form_key().mod_key != owner)
        .count()
}

/// Work out the mod key from a dump path (`ModA.esp.json` -> `ModA.esp`)
pub fn mod_key_from_path(path: &Path) -> Option<ModKey> {
    if !path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DUMP_EXTENSION))
    {
        return None;
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| ModKey::new(s).ok())
}

/// Read a record dump file
pub fn load_dump<P: AsRef<Path>>(path: P) -> Result<ModDump> {
    let path = path.as_ref();
    let mod_key = mod_key_from_path(path)
        .ok_or_else(|| Error::InvalidModKey(path.display().to_string()))?;

    let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut dump = parse_dump(&content, mod_key, path)?;
    dump.source_path = path.to_path_buf();
    Ok(dump)
}

/// Parse a record dump from a string (useful for testing)
pub fn parse_dump_str(content: &str, mod_name: &str) -> Result<ModDump> {
    let mod_key = ModKey::new(mod_name)?;
    let path = PathBuf::from(format!("{}.{}", mod_name, DUMP_EXTENSION));
    parse_dump(content, mod_key, &path)
}

fn parse_dump(content: &str, mod_key: ModKey, path: &Path) -> Result<ModDump> {
    let file: DumpFile = serde_json::from_str(content).map_err(|e| Error::DumpParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let dump = ModDump {
        mod_key,
        armors: file.armors,
        armor_addons: file.armor_addons,
        source_path: path.to_path_buf(),
    };

    tracing::debug!(
        "Parsed {}: {} armors, {} armor addons ({} overrides)",
        dump.mod_key,
        dump.armors.len(),
        dump.armor_addons.len(),
        dump.override_count()
    );

    Ok(dump)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_dump() {
        let json = r#"{
            "armors": [
                { "form_key": "000801:ModA.esp", "editor_id": "Cuirass",
                  "first_person_flags": 1, "armature": ["000802:ModA.esp"] }
            ],
            "armor_addons": [
                { "form_key": "000802:ModA.esp", "editor_id": "CuirassAA",
                  "first_person_flags": 2,
                  "world_model": { "male": "meshes/a.nif", "female": null } }
            ]
        }"#;
        let dump = parse_dump_str(json, "ModA.esp").unwrap();

        assert_eq!(dump.mod_key.file_name(), "ModA.esp");
        assert_eq!(dump.armors.len(), 1);
        assert_eq!(dump.armor_addons.len(), 1);
        assert_eq!(dump.record_count(), 2);
        assert_eq!(dump.override_count(), 0);
        assert_eq!(dump.armor_addons[0].male_path(), "meshes/a.nif");
        assert_eq!(dump.armor_addons[0].female_path(), "");
    }

    #[test]
    fn test_parse_missing_sections() {
        let dump = parse_dump_str("{}", "Empty.esp").unwrap();
        assert_eq!(dump.record_count(), 0);

        let dump = parse_dump_str(r#"{ "armors": [] }"#, "Empty.esp").unwrap();
        assert!(dump.armor_addons.is_empty());
    }

    #[test]
    fn test_parse_counts_overrides() {
        let json = r#"{
            "armors": [
                { "form_key": "012E49:Skyrim.esm" },
                { "form_key": "000800:Patch.esp" }
            ]
        }"#;
        let dump = parse_dump_str(json, "Patch.esp").unwrap();
        assert_eq!(dump.override_count(), 1);
    }

    #[test]
    fn test_parse_rejects_bad_form_key() {
        let json = r#"{ "armors": [ { "form_key": "nonsense" } ] }"#;
        let err = parse_dump_str(json, "ModA.esp").unwrap_err();
        assert!(matches!(err, Error::DumpParse { .. }));
    }

    #[test]
    fn test_mod_key_from_path() {
        let key = mod_key_from_path(Path::new("dumps/ModA.esp.json")).unwrap();
        assert_eq!(key.file_name(), "ModA.esp");
        assert!(mod_key_from_path(Path::new("dumps/ModA.esp")).is_none());
        assert!(mod_key_from_path(Path::new("dumps/notes.json")).is_none());
    }

    #[test]
    fn test_load_dump_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ModB.esm.json");
        fs::write(&path, r#"{ "armor_addons": [ { "form_key": "000D62:ModB.esm" } ] }"#).unwrap();

        let dump = load_dump(&path).unwrap();
        assert_eq!(dump.mod_key.file_name(), "ModB.esm");
        assert_eq!(dump.armor_addons.len(), 1);
        assert_eq!(dump.source_path, path);
    }

    #[test]
    fn test_load_dump_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dump(dir.path().join("Gone.esp.json")).unwrap_err();
        assert!(matches!(err, Error::FileRead { .. }));
    }
}
