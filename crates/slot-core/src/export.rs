//! Export rows: building, deduplication and serialization
//!
//! Each row links one armor to one of its armor addons:
//!
//! `Source;ARMA_ID;ARMA_EDID;ARMO_ID;ARMO_EDID;MalePath;FemalePath;ARMO_Slots;ARMA_Slots`

use crate::config::{OutputSettings, ProtectedOrigins};
use crate::error::{Error, Result};
use crate::record::{Armor, ArmorAddon};
use crate::resolver::ResolvedStore;
use crate::slots::{decode_slots, SlotList};
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Field separator in the export file
pub const FIELD_DELIMITER: u8 = b';';

/// One line of the export
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExportRow {
    /// Origin mod of the armor
    pub source: String,
    /// Armor addon id, 6-digit hex
    pub addon_id: String,
    /// Armor addon editor id
    pub addon_editor_id: String,
    /// Armor id, 6-digit hex
    pub armor_id: String,
    /// Armor editor id
    pub armor_editor_id: String,
    pub male_path: String,
    pub female_path: String,
    /// Slots covered by the armor
    pub armor_slots: SlotList,
    /// Slots covered by the armor addon
    pub addon_slots: SlotList,
}

impl ExportRow {
    /// Assemble the row for an armor and one resolved addon
    pub fn new(armor: &Armor, addon: &ArmorAddon, missing_editor_id: &str) -> Self {
        Self {
            source: armor.form_key.mod_key.file_name().to_string(),
            addon_id: addon.form_key.hex_id(),
            addon_editor_id: addon
                .editor_id
                .as_deref()
                .unwrap_or(missing_editor_id)
                .to_string(),
            armor_id: armor.form_key.hex_id(),
            armor_editor_id: armor
                .editor_id
                .as_deref()
                .unwrap_or(missing_editor_id)
                .to_string(),
            male_path: addon.male_path().to_string(),
            female_path: addon.female_path().to_string(),
            armor_slots: decode_slots(armor.first_person_flags),
            addon_slots: decode_slots(addon.first_person_flags),
        }
    }

    /// The nine fields in output order
    pub fn fields(&self) -> [String; 9] {
        [
            self.source.clone(),
            self.addon_id.clone(),
            self.addon_editor_id.clone(),
            self.armor_id.clone(),
            self.armor_editor_id.clone(),
            self.male_path.clone(),
            self.female_path.clone(),
            self.armor_slots.to_string(),
            self.addon_slots.to_string(),
        ]
    }

    /// The row as written to the export file, without line break
    pub fn to_line(&self) -> String {
        self.fields().join(";")
    }
}

/// Unordered, duplicate-free collection of rows
#[derive(Debug, Clone, Default)]
pub struct ExportSet {
    rows: HashSet<ExportRow>,
}

impl ExportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a row; returns false if an identical row is already present
    pub fn insert(&mut self, row: ExportRow) -> bool {
        self.rows.insert(row)
    }

    pub fn contains(&self, row: &ExportRow) -> bool {
        self.rows.contains(row)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows ordered by their output line, byte-wise
    pub fn sorted(&self) -> Vec<(String, &ExportRow)> {
        let mut lines: Vec<(String, &ExportRow)> =
            self.rows.iter().map(|row| (row.to_line(), row)).collect();
        lines.sort_by(|a, b| a.0.cmp(&b.0));
        lines
    }

    /// Output lines in sorted order
    pub fn sorted_lines(&self) -> Vec<String> {
        self.sorted().into_iter().map(|(line, _)| line).collect()
    }
}

fn is_blank(path: &str) -> bool {
    path.trim().is_empty()
}

/// Build the export rows from the winning records
///
/// Armors from protected origins are skipped entirely. Armature links that
/// do not resolve, and addons with no model path for either gender, add
/// nothing.
pub fn build_rows(
    store: &ResolvedStore,
    protected: &ProtectedOrigins,
    missing_editor_id: &str,
) -> ExportSet {
    let mut rows = ExportSet::new();
    let mut unresolved = 0usize;
    let mut modelless = 0usize;

    for armor in store.exportable_armors(protected) {
        for link in &armor.armature {
            let Some(addon) = link.try_resolve(&store.armor_addons) else {
                tracing::debug!(
                    "Unresolved armature link {} on {}",
                    link,
                    armor.form_key
                );
                unresolved += 1;
                continue;
            };

            if is_blank(addon.male_path()) && is_blank(addon.female_path()) {
                modelless += 1;
                continue;
            }

            rows.insert(ExportRow::new(armor, addon, missing_editor_id));
        }
    }

    tracing::info!(
        "Built {} rows ({} unresolved links, {} addons without models)",
        rows.len(),
        unresolved,
        modelless
    );

    rows
}

/// Write rows in sorted order, one `;`-joined line each
pub fn write_rows<W: Write>(rows: &ExportSet, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(FIELD_DELIMITER)
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .has_headers(false)
        .from_writer(writer);

    for (_, row) in rows.sorted() {
        csv_writer.write_record(row.fields())?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Result of writing the export file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// File that was written
    pub path: PathBuf,
    /// Number of rows written
    pub rows: usize,
}

/// Write the export file under the data directory, replacing any old one
pub fn write_export<P: AsRef<Path>>(
    rows: &ExportSet,
    data_dir: P,
    settings: &OutputSettings,
) -> Result<ExportSummary> {
    let output_dir = data_dir.as_ref().join(&settings.output_dir);

    fs::create_dir_all(&output_dir).map_err(|e| Error::FileWrite {
        path: output_dir.clone(),
        source: e,
    })?;

    let path = output_dir.join(&settings.output_file);
    let file = File::create(&path).map_err(|e| Error::FileWrite {
        path: path.clone(),
        source: e,
    })?;

    write_rows(rows, BufWriter::new(file))?;

    tracing::info!("Wrote {} rows to {}", rows.len(), path.display());

    Ok(ExportSummary {
        path,
        rows: rows.len(),
    })
}
