//! Store entry model.
//!
//! A data store node is either a [`Leaf`] (a value plus the metadata record it
//! was declared with) or a nested mapping walked by dotted path segments.

use std::collections::BTreeMap;

use toml::{Table, Value};

/// A node of the data store.
#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    /// A value with its metadata record.
    Leaf(Leaf),
    /// A mapping traversed by dotted path segments.
    Nested(BTreeMap<String, Entry>),
}

impl Entry {
    /// Classify a raw TOML value.
    ///
    /// Tables carrying a `value` key, or tagged `type = "file"`, become leaf
    /// records whose metadata is the whole table. Other tables become nested
    /// mappings. Everything else is a bare primitive leaf with empty metadata.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Table(table) => Self::from_table(table),
            other => Self::Leaf(Leaf {
                value: other,
                metadata: Metadata::default(),
            }),
        }
    }

    /// Classify a TOML table (see [`Entry::from_value`]).
    #[must_use]
    pub fn from_table(table: Table) -> Self {
        if let Some(value) = table.get("value").cloned() {
            return Self::Leaf(Leaf {
                value,
                metadata: Metadata::new(table),
            });
        }

        let metadata = Metadata::new(table);
        if metadata.is_file() {
            let value = metadata
                .get("filepath")
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()));
            return Self::Leaf(Leaf { value, metadata });
        }

        Self::Nested(
            metadata
                .into_table()
                .into_iter()
                .map(|(key, value)| (key, Self::from_value(value)))
                .collect(),
        )
    }

    /// Return the leaf if this entry is one.
    #[must_use]
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Nested(_) => None,
        }
    }
}

/// A resolvable value and the record it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Leaf {
    /// The value substituted into documents.
    pub value: Value,
    /// Full copy of the declaring record (empty for bare primitives).
    pub metadata: Metadata,
}

/// Metadata record attached to a leaf value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metadata(Table);

impl Metadata {
    /// Wrap a TOML table.
    #[must_use]
    pub fn new(table: Table) -> Self {
        Self(table)
    }

    /// Get a raw field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Get a string field.
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Human-readable description of the value.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.get_str("description")
    }

    /// Link to the computation that produced the value.
    ///
    /// Falls back to the legacy `badge_link` field.
    #[must_use]
    pub fn published_url(&self) -> Option<&str> {
        self.get_str("published_url")
            .or_else(|| self.get_str("badge_link"))
    }

    /// Whether the entry is a legacy plot record.
    #[must_use]
    pub fn is_plot(&self) -> bool {
        self.get("plot").is_some_and(is_truthy)
    }

    /// Whether a plot figure should carry an attribution badge.
    #[must_use]
    pub fn wants_badge(&self) -> bool {
        self.get("badge").is_some_and(is_truthy)
    }

    /// Whether the record is tagged as a file entry.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.get_str("type") == Some("file")
    }

    /// Source path of a file entry.
    #[must_use]
    pub fn filepath(&self) -> Option<&str> {
        self.get_str("filepath")
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Borrow the underlying table.
    #[must_use]
    pub fn as_table(&self) -> &Table {
        &self.0
    }

    /// Consume into the underlying table.
    #[must_use]
    pub fn into_table(self) -> Table {
        self.0
    }
}

/// Truthiness of a metadata flag.
///
/// Zero, empty strings and empty collections are false; datetimes are true.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Boolean(b) => *b,
        Value::Integer(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Table(table) => !table.is_empty(),
        Value::Datetime(_) => true,
    }
}

/// Textual form of a value as it is spliced into a document.
///
/// # Examples
///
/// ```
/// use repro_store::value_text;
/// use toml::Value;
///
/// assert_eq!(value_text(&Value::String("42".to_owned())), "42");
/// assert_eq!(value_text(&Value::Float(3.0)), "3.0");
/// assert_eq!(
///     value_text(&Value::Array(vec![Value::Integer(1), Value::Integer(2)])),
///     "1, 2"
/// );
/// ```
#[must_use]
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => format_float(*f),
        Value::Boolean(b) => b.to_string(),
        Value::Datetime(dt) => dt.to_string(),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(", "),
        Value::Table(_) => value.to_string(),
    }
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}
