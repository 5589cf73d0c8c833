//! slot-core: Core library for exporting armor body slot data
//!
//! This library provides functionality to:
//! - Scan a directory for per-mod record dumps
//! - Read a load order and layer the dumps by priority
//! - Resolve the winning version of every armor and armor addon
//! - Follow armor -> armor addon links and decode body slot flags
//! - Write a deduplicated, sorted `;`-separated export file

pub mod config;
pub mod dump;
pub mod error;
pub mod export;
pub mod load_order;
pub mod pipeline;
pub mod record;
pub mod resolver;
pub mod scanner;
pub mod slots;

pub use config::{ExportConfig, OutputSettings, ProtectedOrigins};
pub use dump::{load_dump, parse_dump_str, ModDump};
pub use error::{Error, Result};
pub use export::{build_rows, write_export, write_rows, ExportRow, ExportSet, ExportSummary};
pub use load_order::{LoadOrder, LoadOrderFormat};
pub use pipeline::{export_slot_data, open_store, resolve_load_order, scan, ExportOptions};
pub use record::{
    Armor, ArmorAddon, FormKey, FormLink, GenderedModel, LinkCache, ModKey, Record,
};
pub use resolver::{
    resolve_winners, LayeredStore, RecordKind, RecordVersion, ResolvedStore, WinningView,
};
pub use scanner::{scan_dumps, DumpIndex};
pub use slots::{decode_slots, SlotList};
