//! Per-source configuration layers.
//!
//! A layer records the values one source explicitly provided. A field that is
//! absent from the layer is unset for that source, which is distinct from an
//! explicit `false` or empty string.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::schema::{Field, Value};

/// Where a layer's values came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Command-line flags.
    CommandLine,
    /// Environment variables.
    Environment,
    /// A configuration file.
    File(PathBuf),
    /// Built-in defaults.
    Default,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommandLine => write!(f, "command line"),
            Self::Environment => write!(f, "environment"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Default => write!(f, "defaults"),
        }
    }
}

/// Values explicitly provided by a single source.
///
/// # Examples
///
/// ```
/// use buildkite_agent::config::{ConfigLayer, Field, Source, Value};
///
/// let layer = ConfigLayer::new(Source::Environment)
///     .with(Field::Token, Value::String("abc".to_string()));
///
/// assert!(layer.is_set(Field::Token));
/// assert!(!layer.is_set(Field::Name));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayer {
    source: Source,
    values: BTreeMap<Field, Value>,
}

impl ConfigLayer {
    /// Create an empty layer for `source`.
    #[must_use]
    pub fn new(source: Source) -> Self {
        Self {
            source,
            values: BTreeMap::new(),
        }
    }

    /// Create an empty layer for a configuration file.
    #[must_use]
    pub fn file(path: &Path) -> Self {
        Self::new(Source::File(path.to_path_buf()))
    }

    /// The source this layer was read from.
    #[must_use]
    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Set `field`, returning the value it replaces.
    pub fn set(&mut self, field: Field, value: Value) -> Option<Value> {
        self.values.insert(field, value)
    }

    /// Builder-style [`set`](Self::set).
    #[must_use]
    pub fn with(mut self, field: Field, value: Value) -> Self {
        self.set(field, value);
        self
    }

    /// The value this source provided for `field`, if any.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&Value> {
        self.values.get(&field)
    }

    /// Whether this source explicitly provided `field`.
    #[must_use]
    pub fn is_set(&self, field: Field) -> bool {
        self.values.contains_key(&field)
    }

    /// Number of fields provided.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the source provided nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over the provided fields in field order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &Value)> {
        self.values.iter().map(|(field, value)| (*field, value))
    }
}
