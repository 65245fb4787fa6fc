//! In-memory model of a yarn berry `yarn.lock`.
//!
//! ## File Format
//!
//! ```yaml
//! __metadata:
//!   version: 6
//!   cacheKey: 8
//!
//! "lodash@npm:^4.17.15, lodash@npm:^4.17.21":
//!   version: 4.17.21
//!   resolution: "lodash@npm:4.17.21"
//!   checksum: eb835a2e...
//!   languageName: node
//!   linkType: hard
//! ```
//!
//! Only `version` is interpreted. Every other field of an entry is carried
//! through verbatim and in its original order.

use super::fields::{Fields, Node, Shape};
use super::key;
use lockmend_util::fs::{atomic_write, read_to_string_lossy};
use lockmend_util::hash::blake3_bytes;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::Path;

/// Lockfile filename.
pub const LOCKFILE_NAME: &str = "yarn.lock";

/// Key of the lockfile's own metadata block.
pub const METADATA_KEY: &str = "__metadata";

const HEADER: &str = "# This file is generated by running \"yarn install\" inside your project.\n\
                      # Manual changes might be lost - proceed with caution!\n";

/// Lockfile error codes.
pub mod codes {
    /// Lockfile not found at the expected path.
    pub const LOCK_NOT_FOUND: &str = "LOCK_NOT_FOUND";
    /// Lockfile is not valid YAML or an entry is malformed.
    pub const LOCK_INVALID_YAML: &str = "LOCK_INVALID_YAML";
    /// Lockfile has no package entries.
    pub const LOCK_EMPTY: &str = "LOCK_EMPTY";
    /// Lockfile could not be serialized.
    pub const LOCK_SERIALIZE_FAILED: &str = "LOCK_SERIALIZE_FAILED";
    /// Lockfile write failed.
    pub const LOCK_WRITE_FAILED: &str = "LOCK_WRITE_FAILED";
}

/// One resolved package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockEntry {
    /// Resolved version string.
    pub version: String,
    /// Pass-through fields (`resolution`, `dependencies`, `checksum`, ...).
    pub fields: Fields,
}

impl LockEntry {
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            fields: Fields::new(),
        }
    }

    /// Add a pass-through string field.
    #[must_use]
    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.insert(name, value.into());
        self
    }

    /// The `resolution` field, if present.
    #[must_use]
    pub fn resolution(&self) -> Option<&str> {
        self.fields.get("resolution").and_then(Node::as_str)
    }
}

impl Serialize for LockEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("version", &self.version)?;
        for (name, value) in self.fields.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for LockEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(EntryVisitor)
    }
}

struct EntryVisitor;

impl<'de> Visitor<'de> for EntryVisitor {
    type Value = LockEntry;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a lockfile entry")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<LockEntry, A::Error> {
        let mut version = None;
        let mut fields = Fields::new();
        while let Some(name) = map.next_key::<String>()? {
            if name == "version" {
                version = Some(map.next_value::<String>()?);
            } else {
                let value = map.next_value_seed(Shape::of_field(&name))?;
                fields.insert(name, value);
            }
        }
        let version = version.ok_or_else(|| de::Error::missing_field("version"))?;
        Ok(LockEntry { version, fields })
    }
}

/// A whole document: `__metadata` plus entries, each read as its own shape.
struct Document {
    metadata: Option<Fields>,
    entries: BTreeMap<String, LockEntry>,
}

impl<'de> Deserialize<'de> for Document {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(DocumentVisitor)
    }
}

struct DocumentVisitor;

impl<'de> Visitor<'de> for DocumentVisitor {
    type Value = Document;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a yarn.lock mapping")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Document, A::Error> {
        let mut document = Document {
            metadata: None,
            entries: BTreeMap::new(),
        };
        while let Some(key) = map.next_key::<String>()? {
            if key == METADATA_KEY {
                document.metadata = map.next_value_seed(Shape::METADATA)?.as_map().cloned();
                continue;
            }
            let entry = map.next_value::<LockEntry>().map_err(|e| {
                de::Error::custom(format_args!("invalid yarn.lock entry {key:?}: {e}"))
            })?;
            document.entries.insert(key, entry);
        }
        Ok(document)
    }
}

/// The resolved entries of a lockfile, keyed by combined descriptor key.
///
/// Starts clean when loaded; any change to the key/value mapping marks it
/// dirty, and it stays dirty for the rest of its life.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lockfile {
    metadata: Option<Fields>,
    pub(crate) entries: BTreeMap<String, LockEntry>,
    pub(crate) dirty: bool,
}

impl Lockfile {
    /// Build a clean lockfile from existing entries.
    pub fn from_entries<K: Into<String>>(entries: impl IntoIterator<Item = (K, LockEntry)>) -> Self {
        Self {
            metadata: None,
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            dirty: false,
        }
    }

    /// Parse lockfile YAML.
    ///
    /// # Errors
    /// Returns an error if the YAML is invalid or holds no package entries.
    pub fn from_yaml(yaml: &str) -> Result<Self, LockfileError> {
        let blank = yaml
            .lines()
            .map(str::trim)
            .all(|line| line.is_empty() || line.starts_with('#'));
        if blank {
            return Err(LockfileError::new(codes::LOCK_EMPTY, "yarn.lock is empty"));
        }

        let document: Document = serde_yaml::from_str(yaml).map_err(|e| {
            LockfileError::new(
                codes::LOCK_INVALID_YAML,
                format!("Cannot deserialize yarn.lock: {e}"),
            )
        })?;

        let lockfile = Self {
            metadata: document.metadata,
            entries: document.entries,
            dirty: false,
        };

        if lockfile.entries.is_empty() {
            return Err(LockfileError::new(
                codes::LOCK_EMPTY,
                "No entries found in yarn.lock",
            ));
        }

        Ok(lockfile)
    }

    /// Read a lockfile from a path.
    ///
    /// # Errors
    /// Returns an error if the file is missing, unreadable or invalid.
    pub fn read_from(path: &Path) -> Result<Self, LockfileError> {
        let content = read_to_string_lossy(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                LockfileError::new(
                    codes::LOCK_NOT_FOUND,
                    format!("Lockfile not found: {}", path.display()),
                )
            } else {
                LockfileError::new(
                    codes::LOCK_INVALID_YAML,
                    format!("Cannot read yarn.lock: {e}"),
                )
            }
        })?;

        Self::from_yaml(&content)
    }

    /// Serialize in yarn's layout: header, `__metadata`, then entries in key
    /// order, separated by blank lines.
    ///
    /// # Errors
    /// Returns an error if an entry cannot be serialized.
    pub fn to_yaml(&self) -> Result<String, LockfileError> {
        let mut out = String::from(HEADER);

        if let Some(metadata) = &self.metadata {
            out.push('\n');
            out.push_str(&render_block(METADATA_KEY, metadata)?);
        }

        for (key, entry) in &self.entries {
            out.push('\n');
            out.push_str(&render_block(key, entry)?);
        }

        Ok(out)
    }

    /// Write the lockfile to a path atomically.
    ///
    /// # Errors
    /// Returns an error if the lockfile cannot be serialized or written.
    pub fn write_to(&self, path: &Path) -> Result<(), LockfileError> {
        let content = self.to_yaml()?;
        atomic_write(path, content.as_bytes()).map_err(|e| {
            LockfileError::new(
                codes::LOCK_WRITE_FAILED,
                format!("Failed to write lockfile: {e}"),
            )
        })
    }

    /// Write the lockfile only if something changed. Returns the dirty flag.
    ///
    /// # Errors
    /// Returns an error if a required write fails.
    pub fn try_save(&self, path: &Path) -> Result<bool, LockfileError> {
        if !self.dirty {
            return Ok(false);
        }
        self.write_to(path)?;
        Ok(true)
    }

    /// BLAKE3 digest of the serialized lockfile.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn content_hash(&self) -> Result<String, LockfileError> {
        Ok(blake3_bytes(self.to_yaml()?.as_bytes()))
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[must_use]
    pub fn entries(&self) -> &BTreeMap<String, LockEntry> {
        &self.entries
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&LockEntry> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace an entry, marking the lockfile dirty.
    pub fn insert(&mut self, key: impl Into<String>, entry: LockEntry) {
        self.entries.insert(key.into(), entry);
        self.dirty = true;
    }

    /// Whether any entry belongs to `package`.
    #[must_use]
    pub fn contains_package(&self, package: &str) -> bool {
        self.entries.keys().any(|k| key::belongs_to(k, package))
    }

    /// Number of entries per package name.
    #[must_use]
    pub fn package_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for name in self.entries.keys().filter_map(|k| key::package_name(k)) {
            *counts.entry(name.to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Two views over one package's entries: by individual descriptor and by
    /// resolved version within a protocol.
    #[must_use]
    pub fn package_entries(&self, package: &str) -> PackageEntries<'_> {
        let mut view = PackageEntries::default();
        for (k, entry) in &self.entries {
            if !key::belongs_to(k, package) {
                continue;
            }
            for specifier in key::specifiers(k) {
                view.by_specifier.insert(specifier.to_string(), entry);
                view.by_version.insert(Resolved::of(specifier, entry), entry);
            }
        }
        view
    }
}

/// Where an entry resolved to. A patched build and the registry release it
/// patches share a version but are different packages on disk.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Resolved {
    pub protocol: String,
    pub version: String,
}

impl Resolved {
    /// Protocol from the entry's `resolution`, else from the descriptor.
    #[must_use]
    pub fn of(specifier: &str, entry: &LockEntry) -> Self {
        let source = entry.resolution().unwrap_or(specifier);
        Self {
            protocol: key::protocol(source).to_string(),
            version: entry.version.clone(),
        }
    }
}

/// Views produced by [`Lockfile::package_entries`].
#[derive(Debug, Default)]
pub struct PackageEntries<'a> {
    pub by_specifier: BTreeMap<String, &'a LockEntry>,
    pub by_version: BTreeMap<Resolved, &'a LockEntry>,
}

fn render_block<T: Serialize>(key: &str, value: &T) -> Result<String, LockfileError> {
    let mut block = BTreeMap::new();
    block.insert(key, value);
    serde_yaml::to_string(&block).map_err(|e| {
        LockfileError::new(
            codes::LOCK_SERIALIZE_FAILED,
            format!("Cannot serialize yarn.lock entry {key:?}: {e}"),
        )
    })
}

/// Lockfile error.
#[derive(Debug)]
pub struct LockfileError {
    code: &'static str,
    message: String,
}

impl LockfileError {
    /// Create a new error.
    #[must_use]
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Get the error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for LockfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for LockfileError {}
