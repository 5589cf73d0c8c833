//! Export configuration
//!
//! The configuration is a JSON file. Every field is optional and falls
//! back to the Skyrim Special Edition defaults.

use crate::error::{Error, Result};
use crate::record::ModKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Base game and official expansion plugins
pub const BASE_GAME_PLUGINS: &[&str] = &[
    "Skyrim.esm",
    "Update.esm",
    "Dawnguard.esm",
    "HearthFires.esm",
    "Dragonborn.esm",
];

/// Config file looked up in the data directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "slot-config.json";
/// Directory under the data directory holding record dumps
pub const DEFAULT_RECORDS_DIR: &str = "slotdump";
/// Directory under the data directory receiving the export
pub const DEFAULT_OUTPUT_DIR: &str = "slotdataTXT";
/// Export file name
pub const DEFAULT_OUTPUT_FILE: &str = "slotdata-Exported.txt";
/// Written in place of a missing editor id
pub const DEFAULT_MISSING_EDITOR_ID: &str = "NoEditorID";

fn base_game_plugins() -> Vec<ModKey> {
    BASE_GAME_PLUGINS
        .iter()
        .filter_map(|name| ModKey::new(*name).ok())
        .collect()
}

/// Origin mods whose records are never exported
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProtectedOrigins {
    mods: BTreeSet<ModKey>,
}

impl ProtectedOrigins {
    pub fn new<I: IntoIterator<Item = ModKey>>(mods: I) -> Self {
        Self {
            mods: mods.into_iter().collect(),
        }
    }

    /// The base game and its official expansions
    pub fn base_game() -> Self {
        Self::new(base_game_plugins())
    }

    pub fn contains(&self, mod_key: &ModKey) -> bool {
        self.mods.contains(mod_key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModKey> {
        self.mods.iter()
    }

    pub fn len(&self) -> usize {
        self.mods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mods.is_empty()
    }
}

/// Settings that shape the export file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    /// Directory under the data directory
    pub output_dir: String,
    /// File name inside `output_dir`
    pub output_file: String,
    /// Placeholder for records without an editor id
    pub missing_editor_id: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            missing_editor_id: DEFAULT_MISSING_EDITOR_ID.to_string(),
        }
    }
}

/// Configuration file contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Origins excluded from the export
    pub protected_mods: Vec<ModKey>,
    /// Plugins loaded first even when the load order omits them
    pub implicit_masters: Vec<ModKey>,
    /// Record dump directory, relative to the data directory
    pub records_dir: String,
    /// Output directory, relative to the data directory
    pub output_dir: String,
    /// Output file name
    pub output_file: String,
    /// Placeholder for records without an editor id
    pub missing_editor_id: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            protected_mods: base_game_plugins(),
            implicit_masters: base_game_plugins(),
            records_dir: DEFAULT_RECORDS_DIR.to_string(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            missing_editor_id: DEFAULT_MISSING_EDITOR_ID.to_string(),
        }
    }
}

impl ExportConfig {
    /// Load a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| Error::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load a configuration file, or the defaults if it does not exist
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Save the configuration as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), content).map_err(|e| Error::FileWrite {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        Ok(())
    }

    /// The protected origin set for this run
    pub fn protected_origins(&self) -> ProtectedOrigins {
        ProtectedOrigins::new(self.protected_mods.iter().cloned())
    }

    /// The output settings for this run
    pub fn output_settings(&self) -> OutputSettings {
        OutputSettings {
            output_dir: self.output_dir.clone(),
            output_file: self.output_file.clone(),
            missing_editor_id: self.missing_editor_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_game_protected() {
        let protected = ProtectedOrigins::base_game();
        assert_eq!(protected.len(), 5);
        assert!(protected.contains(&ModKey::new("skyrim.esm").unwrap()));
        assert!(protected.contains(&ModKey::new("Dragonborn.esm").unwrap()));
        assert!(!protected.contains(&ModKey::new("ModA.esp").unwrap()));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: ExportConfig =
            serde_json::from_str(r#"{ "protected_mods": ["Custom.esm"] }"#).unwrap();

        assert_eq!(config.protected_mods.len(), 1);
        assert_eq!(config.implicit_masters.len(), 5);
        assert_eq!(config.output_dir, "slotdataTXT");
        assert_eq!(config.output_file, "slotdata-Exported.txt");
        assert_eq!(config.missing_editor_id, "NoEditorID");
        assert!(config
            .protected_origins()
            .contains(&ModKey::new("Custom.esm").unwrap()));
    }

    #[test]
    fn test_config_rejects_bad_plugin_name() {
        let result: std::result::Result<ExportConfig, _> =
            serde_json::from_str(r#"{ "protected_mods": ["NotAPlugin"] }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slot-config.json");

        let config = ExportConfig {
            missing_editor_id: "None".to_string(),
            ..ExportConfig::default()
        };
        config.save(&path).unwrap();

        let loaded = ExportConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.output_settings().missing_editor_id, "None");
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExportConfig::load_or_default(dir.path().join("none.json")).unwrap();
        assert_eq!(config, ExportConfig::default());
    }

    #[test]
    fn test_load_malformed_config_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slot-config.json");
        fs::write(&path, "{ \"protected_mods\": [").unwrap();

        let err = ExportConfig::load(&path).unwrap_err();
        match &err {
            Error::ConfigParse { path: reported, .. } => assert_eq!(reported, &path),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("slot-config.json"));
    }
}
