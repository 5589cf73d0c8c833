//! End-to-end export run over a data directory

use crate::config::ExportConfig;
use crate::error::Result;
use crate::export::{build_rows, write_export, ExportSummary};
use crate::load_order::{LoadOrder, PLUGINS_FILE};
use crate::resolver::LayeredStore;
use crate::scanner::{scan_dumps, DumpIndex};
use std::path::PathBuf;

/// Load order file looked up in the data directory when none is given
pub const DEFAULT_LOAD_ORDER_FILE: &str = PLUGINS_FILE;

/// Inputs of an export run
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Base data directory
    pub data_dir: PathBuf,
    /// Explicit load order file
    pub load_order: Option<PathBuf>,
    /// Export configuration
    pub config: ExportConfig,
}

impl ExportOptions {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            load_order: None,
            config: ExportConfig::default(),
        }
    }

    /// Directory holding the record dumps
    pub fn records_dir(&self) -> PathBuf {
        self.data_dir.join(&self.config.records_dir)
    }
}

/// Index the record dumps of the data directory
pub fn scan(options: &ExportOptions) -> Result<DumpIndex> {
    scan_dumps(options.records_dir())
}

/// Work out the load order for a run
///
/// Uses the explicit file if given, then `plugins.txt` in the data
/// directory, and finally every dump found with implicit masters first.
pub fn resolve_load_order(options: &ExportOptions, index: &DumpIndex) -> Result<LoadOrder> {
    let implicit = &options.config.implicit_masters;

    if let Some(path) = &options.load_order {
        return LoadOrder::load(path, implicit);
    }

    let default_path = options.data_dir.join(DEFAULT_LOAD_ORDER_FILE);
    if default_path.is_file() {
        return LoadOrder::load(&default_path, implicit);
    }

    tracing::warn!(
        "No load order file found, using all {} record dumps in name order",
        index.len()
    );
    Ok(LoadOrder::from_index(index, implicit))
}

/// Scan, read the load order and load every active dump
pub fn open_store(options: &ExportOptions) -> Result<LayeredStore> {
    let index = scan(options)?;
    let load_order = resolve_load_order(options, &index)?;
    LayeredStore::load(&load_order, &index)
}

/// Run the whole export and write the output file
pub fn export_slot_data(options: &ExportOptions) -> Result<ExportSummary> {
    let layered = open_store(options)?;
    let resolved = layered.resolve();

    let protected = options.config.protected_origins();
    let settings = options.config.output_settings();

    let rows = build_rows(&resolved, &protected, &settings.missing_editor_id);
    write_export(&rows, &options.data_dir, &settings)
}
