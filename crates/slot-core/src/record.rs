//! Core record types for armor and armor addon data

use crate::error::{Error, Result};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

/// Largest object index a form key can carry (24 bits)
pub const MAX_FORM_ID: u32 = 0x00FF_FFFF;

const PLUGIN_EXTENSIONS: &[&str] = &["esp", "esm", "esl"];

/// A plugin file name identifying a mod (e.g., "Skyrim.esm")
///
/// Comparison, hashing and ordering ignore ASCII case, matching how the
/// game treats plugin names. The spelling as given is kept for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ModKey {
    name: String,
}

impl ModKey {
    /// Create a mod key from a plugin file name
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let trimmed = name.trim();

        let valid = trimmed
            .rsplit_once('.')
            .is_some_and(|(stem, ext)| {
                !stem.is_empty()
                    && PLUGIN_EXTENSIONS
                        .iter()
                        .any(|known| ext.eq_ignore_ascii_case(known))
            })
            && !trimmed.contains(['/', '\\', ':']);

        if !valid {
            return Err(Error::InvalidModKey(name));
        }

        Ok(Self {
            name: trimmed.to_string(),
        })
    }

    /// The plugin file name as given
    pub fn file_name(&self) -> &str {
        &self.name
    }

    fn folded(&self) -> impl Iterator<Item = u8> + '_ {
        self.name.bytes().map(|b| b.to_ascii_lowercase())
    }
}

impl PartialEq for ModKey {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Eq for ModKey {}

impl Hash for ModKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.folded() {
            state.write_u8(b);
        }
        state.write_u8(0xff);
    }
}

impl PartialOrd for ModKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ModKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded().cmp(other.folded())
    }
}

impl fmt::Display for ModKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl FromStr for ModKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for ModKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<ModKey> for String {
    fn from(key: ModKey) -> Self {
        key.name
    }
}

/// Identity of a logical record: the mod that introduced it plus its
/// object index within that mod
///
/// Text form is `XXXXXX:Plugin.esp`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FormKey {
    /// The origin mod
    pub mod_key: ModKey,
    /// Object index within the origin mod
    pub id: u32,
}

impl FormKey {
    /// Create a form key, rejecting ids wider than 24 bits
    pub fn new(id: u32, mod_key: ModKey) -> Result<Self> {
        if id > MAX_FORM_ID {
            return Err(Error::InvalidFormKey {
                input: format!("{:X}:{}", id, mod_key),
                reason: "id does not fit in 24 bits".to_string(),
            });
        }
        Ok(Self { mod_key, id })
    }

    /// Six-digit uppercase hex rendering of the id
    pub fn hex_id(&self) -> String {
        format!("{:06X}", self.id)
    }
}

impl fmt::Display for FormKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06X}:{}", self.id, self.mod_key)
    }
}

impl FromStr for FormKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidFormKey {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let (id_part, mod_part) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| invalid("expected 'XXXXXX:Plugin.esp'"))?;

        let id_part = id_part.trim();
        let id_part = id_part
            .strip_prefix("0x")
            .or_else(|| id_part.strip_prefix("0X"))
            .unwrap_or(id_part);

        if id_part.is_empty() {
            return Err(invalid("missing id"));
        }

        let id = u32::from_str_radix(id_part, 16).map_err(|_| invalid("id is not hexadecimal"))?;
        if id > MAX_FORM_ID {
            return Err(invalid("id does not fit in 24 bits"));
        }

        let mod_key = ModKey::new(mod_part).map_err(|_| invalid("invalid plugin name"))?;

        Ok(Self { mod_key, id })
    }
}

impl TryFrom<String> for FormKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<FormKey> for String {
    fn from(key: FormKey) -> Self {
        key.to_string()
    }
}

/// Common accessors for records that take part in override resolution
pub trait Record {
    /// Identity of this record
    fn form_key(&self) -> &FormKey;

    /// Whether this version marks the record as deleted
    fn is_deleted(&self) -> bool {
        false
    }
}

/// Lookup from a form key to the currently visible version of a record
pub trait LinkCache<R> {
    /// Find the record for a key, if one is visible
    fn lookup(&self, key: &FormKey) -> Option<&R>;
}

/// A typed weak reference to another record
///
/// The link only holds the target's identity. It has to be resolved
/// against a [`LinkCache`] to reach the record, and resolution failing is
/// an ordinary outcome. A null or malformed reference becomes a link with
/// no identity, which never resolves.
pub struct FormLink<R> {
    key: Option<FormKey>,
    kind: PhantomData<fn() -> R>,
}

impl<R> FormLink<R> {
    /// Create a link to the given identity
    pub fn new(key: FormKey) -> Self {
        Self {
            key: Some(key),
            kind: PhantomData,
        }
    }

    /// A link that points at nothing
    pub fn null() -> Self {
        Self {
            key: None,
            kind: PhantomData,
        }
    }

    /// The identity this link points at, if it has one
    pub fn form_key(&self) -> Option<&FormKey> {
        self.key.as_ref()
    }

    pub fn is_null(&self) -> bool {
        self.key.is_none()
    }

    /// Resolve the link against a cache of winning records
    pub fn try_resolve<'a, C>(&self, cache: &'a C) -> Option<&'a R>
    where
        C: LinkCache<R> + ?Sized,
    {
        cache.lookup(self.key.as_ref()?)
    }
}

impl<R> Clone for FormLink<R> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            kind: PhantomData,
        }
    }
}

impl<R> fmt::Debug for FormLink<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FormLink").field(&self.key).finish()
    }
}

impl<R> fmt::Display for FormLink<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(key) => write!(f, "{}", key),
            None => f.write_str("Null"),
        }
    }
}

impl<R> PartialEq for FormLink<R> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<R> Eq for FormLink<R> {}

impl<R> Serialize for FormLink<R> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.key.serialize(serializer)
    }
}

/// Any JSON value an armature entry may hold
#[derive(Deserialize)]
#[serde(untagged)]
enum RawLink {
    Key(String),
    Other(IgnoredAny),
}

impl<'de, R> Deserialize<'de> for FormLink<R> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let key = match RawLink::deserialize(deserializer)? {
            RawLink::Key(text) => match text.parse::<FormKey>() {
                Ok(key) => Some(key),
                Err(e) => {
                    tracing::debug!("Treating link '{}' as null: {}", text, e);
                    None
                }
            },
            RawLink::Other(_) => None,
        };

        Ok(Self {
            key,
            kind: PhantomData,
        })
    }
}

/// An equipment piece ("ARMO")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Armor {
    /// Record identity
    pub form_key: FormKey,
    /// Editor id, if the record has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<String>,
    /// First-person body coverage flags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_person_flags: Option<u32>,
    /// Armor addons making up this piece, in record order
    #[serde(default)]
    pub armature: Vec<FormLink<ArmorAddon>>,
    /// Deleted-record flag
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
}

impl Armor {
    /// Create an armor with no addons
    pub fn new(form_key: FormKey) -> Self {
        Self {
            form_key,
            editor_id: None,
            first_person_flags: None,
            armature: Vec::new(),
            deleted: false,
        }
    }
}

impl Record for Armor {
    fn form_key(&self) -> &FormKey {
        &self.form_key
    }

    fn is_deleted(&self) -> bool {
        self.deleted
    }
}

/// Per-gender model file paths
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderedModel {
    #[serde(default)]
    pub male: Option<String>,
    #[serde(default)]
    pub female: Option<String>,
}

/// A constituent piece of an armor ("ARMA")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArmorAddon {
    /// Record identity
    pub form_key: FormKey,
    /// Editor id, if the record has one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_id: Option<String>,
    /// First-person body coverage flags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_person_flags: Option<u32>,
    /// Third-person model paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world_model: Option<GenderedModel>,
    /// Deleted-record flag
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deleted: bool,
}

impl ArmorAddon {
    /// Create an addon with no models
    pub fn new(form_key: FormKey) -> Self {
        Self {
            form_key,
            editor_id: None,
            first_person_flags: None,
            world_model: None,
            deleted: false,
        }
    }

    /// Male model path, or "" when absent
    pub fn male_path(&self) -> &str {
        self.world_model
            .as_ref()
            .and_then(|m| m.male.as_deref())
            .unwrap_or_default()
    }

    /// Female model path, or "" when absent
    pub fn female_path(&self) -> &str {
        self.world_model
            .as_ref()
            .and_then(|m| m.female.as_deref())
            .unwrap_or_default()
    }
}

impl Record for ArmorAddon {
    fn form_key(&self) -> &FormKey {
        &self.form_key
    }

    fn is_deleted(&self) -> bool {
        self.deleted
    }
}
