//! Override resolution across a layered load order
//!
//! Every mod in the load order is a layer of records. Resolving the layers
//! yields one winning version per record identity: the version from the
//! highest-priority mod that defines or overrides it.

use crate::config::ProtectedOrigins;
use crate::dump::{load_dump, ModDump};
use crate::error::Result;
use crate::load_order::LoadOrder;
use crate::record::{Armor, ArmorAddon, FormKey, LinkCache, ModKey, Record};
use crate::scanner::DumpIndex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// The winning version of a record and the mod that supplied it
#[derive(Debug, Clone, PartialEq)]
pub struct Winner<R> {
    /// The record as the winning mod defines it
    pub record: R,
    /// Mod whose version won (not necessarily the origin)
    pub contributor: ModKey,
}

/// Winning records of one kind, keyed by identity
///
/// Iteration follows form key order, so it never depends on the order
/// records were read in.
#[derive(Debug, Clone, PartialEq)]
pub struct WinningView<R> {
    winners: BTreeMap<FormKey, Winner<R>>,
}

impl<R> Default for WinningView<R> {
    fn default() -> Self {
        Self {
            winners: BTreeMap::new(),
        }
    }
}

impl<R> WinningView<R> {
    /// Winning record for an identity
    pub fn get(&self, key: &FormKey) -> Option<&R> {
        self.winners.get(key).map(|w| &w.record)
    }

    /// Winning record with its contributing mod
    pub fn winner(&self, key: &FormKey) -> Option<&Winner<R>> {
        self.winners.get(key)
    }

    /// All winning records in form key order
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.winners.values().map(|w| &w.record)
    }

    pub fn len(&self) -> usize {
        self.winners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.winners.is_empty()
    }
}

impl<R> LinkCache<R> for WinningView<R> {
    fn lookup(&self, key: &FormKey) -> Option<&R> {
        self.get(key)
    }
}

/// Fold layers in ascending priority into a winning view
///
/// A later layer's version of an identity replaces any earlier one. An
/// identity whose winning version is flagged deleted is left out.
pub fn resolve_winners<'a, R, I>(layers: I) -> WinningView<R>
where
    R: Record + Clone + 'a,
    I: IntoIterator<Item = (&'a ModKey, &'a [R])>,
{
    let mut winners: BTreeMap<FormKey, Winner<R>> = BTreeMap::new();

    for (mod_key, records) in layers {
        for record in records {
            winners.insert(
                record.form_key().clone(),
                Winner {
                    record: record.clone(),
                    contributor: mod_key.clone(),
                },
            );
        }
    }

    winners.retain(|_, w| !w.record.is_deleted());

    WinningView { winners }
}

/// Which kind of record a version belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordKind {
    Armor,
    ArmorAddon,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Armor => write!(f, "ARMO"),
            RecordKind::ArmorAddon => write!(f, "ARMA"),
        }
    }
}

/// One mod's version of a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordVersion {
    /// Mod defining this version
    pub mod_key: ModKey,
    /// Record kind
    pub kind: RecordKind,
    /// Whether this version deletes the record
    pub deleted: bool,
}

/// The record dumps of a load order, lowest priority first
#[derive(Debug, Clone, Default)]
pub struct LayeredStore {
    layers: Vec<ModDump>,
}

impl LayeredStore {
    /// Load the dump of every mod in the load order
    ///
    /// Mods without a dump contribute nothing and are skipped.
    pub fn load(load_order: &LoadOrder, index: &DumpIndex) -> Result<Self> {
        let mut layers = Vec::new();

        for mod_key in load_order.iter() {
            match index.find(mod_key) {
                Some(path) => layers.push(load_dump(path)?),
                None => tracing::warn!("No record dump for {}, skipping", mod_key),
            }
        }

        for mod_key in index.mod_keys().filter(|m| !load_order.contains(m)) {
            tracing::debug!("Ignoring dump for {} (not in load order)", mod_key);
        }

        tracing::info!(
            "Loaded {} of {} plugins in load order",
            layers.len(),
            load_order.len()
        );

        Ok(Self { layers })
    }

    /// Build a store from dumps already in priority order
    pub fn from_dumps(layers: Vec<ModDump>) -> Self {
        Self { layers }
    }

    /// Layers in ascending priority
    pub fn layers(&self) -> &[ModDump] {
        &self.layers
    }

    /// Resolve the winning armors and armor addons
    pub fn resolve(&self) -> ResolvedStore {
        let armors = resolve_winners(
            self.layers
                .iter()
                .map(|d| (&d.mod_key, d.armors.as_slice())),
        );
        let armor_addons = resolve_winners(
            self.layers
                .iter()
                .map(|d| (&d.mod_key, d.armor_addons.as_slice())),
        );

        tracing::info!(
            "Resolved {} winning armors and {} winning armor addons",
            armors.len(),
            armor_addons.len()
        );

        ResolvedStore {
            armors,
            armor_addons,
        }
    }

    /// Every mod's version of a record, in priority order
    pub fn versions(&self, key: &FormKey) -> Vec<RecordVersion> {
        let mut versions = Vec::new();

        for layer in &self.layers {
            for armor in layer.armors.iter().filter(|r| &r.form_key == key) {
                versions.push(RecordVersion {
                    mod_key: layer.mod_key.clone(),
                    kind: RecordKind::Armor,
                    deleted: armor.deleted,
                });
            }
            for addon in layer.armor_addons.iter().filter(|r| &r.form_key == key) {
                versions.push(RecordVersion {
                    mod_key: layer.mod_key.clone(),
                    kind: RecordKind::ArmorAddon,
                    deleted: addon.deleted,
                });
            }
        }

        versions
    }
}

/// Winning views of both record kinds
///
/// Built once and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct ResolvedStore {
    pub armors: WinningView<Armor>,
    pub armor_addons: WinningView<ArmorAddon>,
}

impl ResolvedStore {
    /// Winning armors whose origin mod is not protected
    ///
    /// The check uses the mod that introduced the record, so a protected
    /// record stays excluded even when another mod overrides it.
    pub fn exportable_armors<'a>(
        &'a self,
        protected: &'a ProtectedOrigins,
    ) -> impl Iterator<Item = &'a Armor> + 'a {
        self.armors
            .iter()
            .filter(move |a| !protected.contains(&a.form_key.mod_key))
    }
}
