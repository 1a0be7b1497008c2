//! Configuration file discovery and loading.
//!
//! The loader walks the candidate paths in order and reads the first file
//! that exists. A file that exists but cannot be read or parsed stops the
//! search with an error; later candidates are never consulted.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_yaml::Value as Yaml;

use crate::config::layer::ConfigLayer;
use crate::config::schema::{parse_bool, parse_list, FieldKind, FieldSpec, Schema, Value};
use crate::error::{Error, Result};

/// A configuration file that was found and parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    /// Path the file was read from.
    pub path: PathBuf,
    /// Values the file provided.
    pub layer: ConfigLayer,
}

/// Loads configuration files according to a [`Schema`].
///
/// Files are flat YAML mappings keyed by flag name:
///
/// ```yaml
/// token: "xxx"
/// build-path: ~/.buildkite-agent/builds
/// disconnect-after-job: true
/// meta-data:
///   - queue=deploy
///   - os=linux
/// ```
///
/// # Examples
///
/// ```no_run
/// use buildkite_agent::config::{ConfigLoader, Schema};
/// use std::path::PathBuf;
///
/// let loader = ConfigLoader::new(Schema::agent_start());
/// let found = loader
///     .load_first(&[PathBuf::from("/etc/buildkite-agent/buildkite-agent.cfg")])
///     .unwrap();
/// println!("loaded: {:?}", found.map(|f| f.path));
/// ```
pub struct ConfigLoader {
    schema: Schema,
}

impl ConfigLoader {
    /// Create a loader for `schema`.
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// Load the first candidate that exists.
    ///
    /// Returns `Ok(None)` when none of the candidates exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Discovery`] if an existing candidate cannot be read,
    /// or [`Error::Parse`] if it is malformed.
    pub fn load_first(&self, candidates: &[PathBuf]) -> Result<Option<ConfigFile>> {
        for candidate in candidates {
            match fs::read_to_string(candidate) {
                Ok(contents) => {
                    log::debug!("Found configuration file {}", candidate.display());
                    return self.parse(candidate, &contents).map(Some);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    log::debug!("No configuration file at {}", candidate.display());
                }
                Err(source) => {
                    return Err(Error::Discovery {
                        path: candidate.clone(),
                        source,
                    })
                }
            }
        }

        Ok(None)
    }

    /// Load a file the operator asked for explicitly.
    ///
    /// # Errors
    ///
    /// Unlike [`load_first`](Self::load_first), a missing file is an
    /// [`Error::Discovery`].
    pub fn load_explicit(&self, path: &Path) -> Result<ConfigFile> {
        let contents = fs::read_to_string(path).map_err(|source| Error::Discovery {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse(path, &contents)
    }

    /// Parse the contents of a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] naming the file (and key, where known) if the
    /// YAML is invalid, is not a mapping, names an unknown key, or holds a
    /// value of the wrong type.
    pub fn parse(&self, path: &Path, contents: &str) -> Result<ConfigFile> {
        let mut layer = ConfigLayer::file(path);
        let origin = path.display().to_string();

        let document: Yaml = serde_yaml::from_str(contents)
            .map_err(|e| Error::parse(&origin, format!("invalid YAML: {e}")))?;

        let mapping = match document {
            Yaml::Null => {
                return Ok(ConfigFile {
                    path: path.to_path_buf(),
                    layer,
                })
            }
            Yaml::Mapping(mapping) => mapping,
            _ => {
                return Err(Error::parse(
                    &origin,
                    "expected a mapping of configuration keys to values",
                ))
            }
        };

        for (key, raw) in mapping {
            let Yaml::String(key) = key else {
                return Err(Error::parse(&origin, "configuration keys must be strings"));
            };
            let key_origin = format!("{origin}: {key}");
            let spec = self
                .schema
                .by_key(&key)
                .ok_or_else(|| Error::parse(&key_origin, "unknown configuration key"))?;

            if let Some(value) = Self::convert(spec, &key_origin, raw)? {
                layer.set(spec.field, value);
            }
        }

        Ok(ConfigFile {
            path: path.to_path_buf(),
            layer,
        })
    }

    /// Convert a YAML value to the kind `spec` declares.
    ///
    /// `null` means the key is present but unset.
    fn convert(spec: &FieldSpec, origin: &str, raw: Yaml) -> Result<Option<Value>> {
        let mismatch = || Error::parse(origin, format!("expected a {} value", spec.kind));

        let value = match (spec.kind, raw) {
            (_, Yaml::Null) => return Ok(None),
            (FieldKind::String | FieldKind::Path, raw) => {
                Value::String(Self::scalar(raw).ok_or_else(mismatch)?)
            }
            (FieldKind::Bool, Yaml::Bool(b)) => Value::Bool(b),
            (FieldKind::Bool, Yaml::String(s)) => Value::Bool(parse_bool(origin, &s)?),
            (FieldKind::Integer, Yaml::Number(n)) => {
                Value::Integer(n.as_u64().ok_or_else(|| {
                    Error::parse(origin, format!("invalid integer value: {n} (expected a non-negative number)"))
                })?)
            }
            (FieldKind::Integer, Yaml::String(s)) => spec.kind.parse(origin, &s)?,
            (FieldKind::List, Yaml::Sequence(items)) => Value::List(
                items
                    .into_iter()
                    .map(|item| Self::scalar(item).ok_or_else(mismatch))
                    .collect::<Result<_>>()?,
            ),
            (FieldKind::List, Yaml::String(s)) => Value::List(parse_list(&s)),
            _ => return Err(mismatch()),
        };

        Ok(Some(value))
    }

    /// Render a scalar YAML value as text.
    fn scalar(raw: Yaml) -> Option<String> {
        match raw {
            Yaml::String(s) => Some(s),
            Yaml::Number(n) => Some(n.to_string()),
            Yaml::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}
