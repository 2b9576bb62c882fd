//! Data store and key resolution.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::alias::filepath_alias;
use crate::entry::{Entry, Leaf, Metadata, value_text};
use crate::path::parse_segment;

/// Error loading a data store file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The data store file could not be read.
    #[error("Failed to read data store {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The data store is not valid TOML.
    #[error("Data store parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Fatal lookup failure.
///
/// These signal malformed data rather than absence; a missing key is
/// reported as `Ok(None)` by [`DataStore::resolve`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LookupError {
    /// The path ended on a nested mapping with no `value` field.
    #[error("Malformed data store entry at '{path}': expected a value or a record with a `value` field")]
    Malformed { path: String },
    /// A bracketed index addressed a position past the end of the list.
    #[error("Index {index} out of range for '{path}' (length {len})")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },
    /// A bracketed index was applied to something that is not a list.
    #[error("Cannot index into '{path}': value is not a list")]
    NotAList { path: String },
    /// A bracketed index could not be parsed.
    #[error("Invalid path segment '{segment}' in '{path}'")]
    InvalidSegment { path: String, segment: String },
}

/// A resolved value and a copy of the record it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Resolved {
    pub value: Value,
    pub metadata: Metadata,
}

impl Resolved {
    /// Textual form of the value.
    #[must_use]
    pub fn text(&self) -> String {
        value_text(&self.value)
    }
}

impl From<Leaf> for Resolved {
    fn from(leaf: Leaf) -> Self {
        Self {
            value: leaf.value,
            metadata: leaf.metadata,
        }
    }
}

/// Nested key/value store of externally computed values.
///
/// Read once at the start of a build and never mutated while rendering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataStore {
    entries: BTreeMap<String, Entry>,
}

impl DataStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a parsed TOML table.
    #[must_use]
    pub fn from_table(table: Table) -> Self {
        let entries = table
            .into_iter()
            .map(|(key, value)| (key, Entry::from_value(value)))
            .collect();
        Self { entries }
    }

    /// Parse a store from TOML source.
    pub fn from_toml_str(source: &str) -> Result<Self, StoreError> {
        let table: Table = toml::from_str(source)?;
        Ok(Self::from_table(table))
    }

    /// Load a store from a TOML file.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let source = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), entries = store.len(), "Loaded data store");
        Ok(store)
    }

    /// Get a first-level entry.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Insert or replace a first-level entry.
    pub fn insert(&mut self, key: impl Into<String>, entry: Entry) {
        self.entries.insert(key.into(), entry);
    }

    /// Record a file entry under its filepath alias.
    ///
    /// `extra` fields (description, `published_url`, ...) are kept in the
    /// record; `type` and `filepath` are always set. Returns the alias.
    pub fn insert_file(&mut self, path: &str, mut extra: Table) -> String {
        let alias = filepath_alias(path);
        extra.insert("type".to_owned(), Value::String("file".to_owned()));
        extra.insert("filepath".to_owned(), Value::String(path.to_owned()));
        self.entries.insert(alias.clone(), Entry::from_table(extra));
        alias
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a dotted/indexed path to a value and its metadata.
    ///
    /// Resolution order:
    /// 1. exact first-level key (file records resolve to the path itself);
    /// 2. dotted walk with `[n]` list indexing;
    /// 3. filepath alias of the path (resolves to the record's `filepath`).
    ///
    /// Returns `Ok(None)` when nothing matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use repro_store::DataStore;
    ///
    /// let store = DataStore::from_toml_str(
    ///     "[stats.mean]\nvalue = 4.5\ndescription = \"Sample mean\"",
    /// )
    /// .unwrap();
    /// let resolved = store.resolve("stats.mean").unwrap().unwrap();
    /// assert_eq!(resolved.text(), "4.5");
    /// assert_eq!(resolved.metadata.description(), Some("Sample mean"));
    /// assert!(store.resolve("stats.median").unwrap().is_none());
    /// ```
    pub fn resolve(&self, path: &str) -> Result<Option<Resolved>, LookupError> {
        if let Some(Entry::Leaf(leaf)) = self.entries.get(path) {
            let value = if leaf.metadata.is_file() {
                Value::String(path.to_owned())
            } else {
                leaf.value.clone()
            };
            return Ok(Some(Resolved {
                value,
                metadata: leaf.metadata.clone(),
            }));
        }

        if let Some(resolved) = self.walk(path)? {
            return Ok(Some(resolved));
        }

        Ok(self.resolve_alias(path))
    }

    fn walk(&self, path: &str) -> Result<Option<Resolved>, LookupError> {
        let mut node: Option<Cow<'_, Entry>> = None;

        for raw in path.split('.') {
            let segment = parse_segment(path, raw)?;
            let next = match node {
                None => self.entries.get(segment.key).map(Cow::Borrowed),
                Some(parent) => child(parent, segment.key),
            };
            let Some(next) = next else {
                if segment.index.is_some() {
                    tracing::debug!(path, key = segment.key, "List key does not exist");
                }
                return Ok(None);
            };
            node = Some(match segment.index {
                Some(index) => element(&next, index, path)?,
                None => next,
            });
        }

        match node.map(Cow::into_owned) {
            Some(Entry::Leaf(leaf)) => Ok(Some(leaf.into())),
            Some(Entry::Nested(_)) => Err(LookupError::Malformed {
                path: path.to_owned(),
            }),
            None => Ok(None),
        }
    }

    fn resolve_alias(&self, path: &str) -> Option<Resolved> {
        let alias = filepath_alias(path);
        let leaf = self.entries.get(&alias)?.as_leaf()?;
        let value = leaf
            .metadata
            .get("filepath")
            .cloned()
            .unwrap_or_else(|| Value::String(path.to_owned()));
        tracing::debug!(path, alias = %alias, "Resolved through filepath alias");
        Some(Resolved {
            value,
            metadata: leaf.metadata.clone(),
        })
    }
}

/// Descend one key. Leaf records expose their metadata fields as children.
fn child<'a>(node: Cow<'a, Entry>, key: &str) -> Option<Cow<'a, Entry>> {
    match node {
        Cow::Borrowed(Entry::Nested(map)) => map.get(key).map(Cow::Borrowed),
        Cow::Borrowed(Entry::Leaf(leaf)) => leaf
            .metadata
            .get(key)
            .cloned()
            .map(|value| Cow::Owned(Entry::from_value(value))),
        Cow::Owned(Entry::Nested(mut map)) => map.remove(key).map(Cow::Owned),
        Cow::Owned(Entry::Leaf(leaf)) => leaf
            .metadata
            .into_table()
            .remove(key)
            .map(|value| Cow::Owned(Entry::from_value(value))),
    }
}

/// Select a list element.
fn element<'a>(node: &Entry, index: usize, path: &str) -> Result<Cow<'a, Entry>, LookupError> {
    let Entry::Leaf(Leaf {
        value: Value::Array(items),
        ..
    }) = node
    else {
        return Err(LookupError::NotAList {
            path: path.to_owned(),
        });
    };

    let item = items.get(index).ok_or_else(|| LookupError::IndexOutOfRange {
        path: path.to_owned(),
        index,
        len: items.len(),
    })?;

    Ok(Cow::Owned(Entry::from_value(item.clone())))
}
