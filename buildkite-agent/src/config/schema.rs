//! Configuration schema definitions.
//!
//! This module defines the fixed catalog of fields accepted by `agent start`.
//! Each entry names the field's flag/file key, its environment variable, its
//! value kind and its built-in default. The catalog is an immutable value that
//! is handed to every configuration source and to the merger, so all of them
//! agree on names and types.

use std::fmt;

use crate::error::{Error, Result};

/// Identifies a single configurable field of [`ResolvedConfig`].
///
/// [`ResolvedConfig`]: crate::config::ResolvedConfig
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Agent registration token.
    Token,
    /// Agent name.
    Name,
    /// Agent priority.
    Priority,
    /// Disconnect after running a single job.
    DisconnectAfterJob,
    /// Seconds to wait for a job when disconnecting after one.
    DisconnectAfterJobTimeout,
    /// Free-form `key=value` meta-data tags.
    MetaData,
    /// Include EC2 instance meta-data.
    MetaDataEc2,
    /// Include EC2 tags.
    MetaDataEc2Tags,
    /// Include Google Cloud meta-data.
    MetaDataGcp,
    /// Flags passed to `git clone`.
    GitCloneFlags,
    /// Flags passed to `git clean`.
    GitCleanFlags,
    /// Bootstrap script invoked for each job.
    BootstrapScript,
    /// Directory builds run from.
    BuildPath,
    /// Directory containing hook scripts.
    HooksPath,
    /// Directory plugins are saved to.
    PluginsPath,
    /// Do not run jobs within a pseudo terminal.
    NoPty,
    /// Do not verify SSH fingerprints automatically.
    NoSshFingerprintVerification,
    /// Do not allow arbitrary console commands.
    NoCommandEval,
    /// Experimental features to enable.
    Experiments,
    /// Agent API endpoint.
    Endpoint,
    /// Disable coloured log output.
    NoColor,
    /// Enable debug logging.
    Debug,
    /// Enable HTTP debug logging.
    DebugHttp,
}

/// The type of value a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free-form string.
    String,
    /// Filesystem path, normalized to an absolute path after merging.
    Path,
    /// Boolean flag.
    Bool,
    /// Unsigned integer.
    Integer,
    /// Ordered list of strings.
    List,
}

/// A built-in default, expressible as a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    /// Default for string and path fields.
    Str(&'static str),
    /// Default for boolean fields.
    Bool(bool),
    /// Default for integer fields.
    Integer(u64),
    /// Default for list fields (always empty).
    EmptyList,
}

/// A typed configuration value supplied by one source.
///
/// Path fields carry [`Value::String`]; they become paths during
/// normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// String or path value.
    String(String),
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Integer(u64),
    /// List value.
    List(Vec<String>),
}

/// Catalog entry describing one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// The field this entry describes.
    pub field: Field,
    /// Flag name and configuration file key.
    pub key: &'static str,
    /// Environment variable consulted for this field.
    pub env_var: &'static str,
    /// Value kind.
    pub kind: FieldKind,
    /// Built-in default.
    pub default: DefaultValue,
    /// Help text shown for the flag.
    pub help: &'static str,
}

/// Default agent API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://agent.buildkite.com/v3";

/// Default bootstrap script command.
pub const DEFAULT_BOOTSTRAP_SCRIPT: &str = "buildkite-agent bootstrap";

/// Default value of `disconnect-after-job-timeout`, in seconds.
pub const DEFAULT_DISCONNECT_AFTER_JOB_TIMEOUT: u64 = 120;

const AGENT_START_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        field: Field::Token,
        key: "token",
        env_var: "BUILDKITE_AGENT_TOKEN",
        kind: FieldKind::String,
        default: DefaultValue::Str(""),
        help: "Your account agent token",
    },
    FieldSpec {
        field: Field::Name,
        key: "name",
        env_var: "BUILDKITE_AGENT_NAME",
        kind: FieldKind::String,
        default: DefaultValue::Str(""),
        help: "The name of the agent",
    },
    FieldSpec {
        field: Field::Priority,
        key: "priority",
        env_var: "BUILDKITE_AGENT_PRIORITY",
        kind: FieldKind::String,
        default: DefaultValue::Str(""),
        help: "The priority of the agent (higher priorities are assigned work first)",
    },
    FieldSpec {
        field: Field::DisconnectAfterJob,
        key: "disconnect-after-job",
        env_var: "BUILDKITE_AGENT_DISCONNECT_AFTER_JOB",
        kind: FieldKind::Bool,
        default: DefaultValue::Bool(false),
        help: "Disconnect the agent after running a job",
    },
    FieldSpec {
        field: Field::DisconnectAfterJobTimeout,
        key: "disconnect-after-job-timeout",
        env_var: "BUILDKITE_AGENT_DISCONNECT_AFTER_JOB_TIMEOUT",
        kind: FieldKind::Integer,
        default: DefaultValue::Integer(DEFAULT_DISCONNECT_AFTER_JOB_TIMEOUT),
        help: "When --disconnect-after-job is specified, the number of seconds to wait for a job before shutting down",
    },
    FieldSpec {
        field: Field::MetaData,
        key: "meta-data",
        env_var: "BUILDKITE_AGENT_META_DATA",
        kind: FieldKind::List,
        default: DefaultValue::EmptyList,
        help: "Meta-data for the agent (default is \"queue=default\")",
    },
    FieldSpec {
        field: Field::MetaDataEc2,
        key: "meta-data-ec2",
        env_var: "BUILDKITE_AGENT_META_DATA_EC2",
        kind: FieldKind::Bool,
        default: DefaultValue::Bool(false),
        help: "Include the host's EC2 meta-data (instance-id, instance-type, and ami-id) as meta-data",
    },
    FieldSpec {
        field: Field::MetaDataEc2Tags,
        key: "meta-data-ec2-tags",
        env_var: "BUILDKITE_AGENT_META_DATA_EC2_TAGS",
        kind: FieldKind::Bool,
        default: DefaultValue::Bool(false),
        help: "Include the host's EC2 tags as meta-data",
    },
    FieldSpec {
        field: Field::MetaDataGcp,
        key: "meta-data-gcp",
        env_var: "BUILDKITE_AGENT_META_DATA_GCP",
        kind: FieldKind::Bool,
        default: DefaultValue::Bool(false),
        help: "Include the host's Google Cloud meta-data (instance-id, machine-type, preemptible, project-id, region, and zone) as meta-data",
    },
    FieldSpec {
        field: Field::GitCloneFlags,
        key: "git-clone-flags",
        env_var: "BUILDKITE_GIT_CLONE_FLAGS",
        kind: FieldKind::String,
        default: DefaultValue::Str("-v"),
        help: "Flags to pass to the \"git clone\" command",
    },
    FieldSpec {
        field: Field::GitCleanFlags,
        key: "git-clean-flags",
        env_var: "BUILDKITE_GIT_CLEAN_FLAGS",
        kind: FieldKind::String,
        default: DefaultValue::Str("-fxdq"),
        help: "Flags to pass to \"git clean\" command",
    },
    FieldSpec {
        field: Field::BootstrapScript,
        key: "bootstrap-script",
        env_var: "BUILDKITE_BOOTSTRAP_SCRIPT_PATH",
        kind: FieldKind::Path,
        default: DefaultValue::Str(DEFAULT_BOOTSTRAP_SCRIPT),
        help: "Path to the bootstrap script",
    },
    FieldSpec {
        field: Field::BuildPath,
        key: "build-path",
        env_var: "BUILDKITE_BUILD_PATH",
        kind: FieldKind::Path,
        default: DefaultValue::Str(""),
        help: "Path to where the builds will run from",
    },
    FieldSpec {
        field: Field::HooksPath,
        key: "hooks-path",
        env_var: "BUILDKITE_HOOKS_PATH",
        kind: FieldKind::Path,
        default: DefaultValue::Str(""),
        help: "Directory where the hook scripts are found",
    },
    FieldSpec {
        field: Field::PluginsPath,
        key: "plugins-path",
        env_var: "BUILDKITE_PLUGINS_PATH",
        kind: FieldKind::Path,
        default: DefaultValue::Str(""),
        help: "Directory where the plugins are saved to",
    },
    FieldSpec {
        field: Field::NoPty,
        key: "no-pty",
        env_var: "BUILDKITE_NO_PTY",
        kind: FieldKind::Bool,
        default: DefaultValue::Bool(false),
        help: "Do not run jobs within a pseudo terminal",
    },
    FieldSpec {
        field: Field::NoSshFingerprintVerification,
        key: "no-automatic-ssh-fingerprint-verification",
        env_var: "BUILDKITE_NO_AUTOMATIC_SSH_FINGERPRINT_VERIFICATION",
        kind: FieldKind::Bool,
        default: DefaultValue::Bool(false),
        help: "Don't automatically verify SSH fingerprints",
    },
    FieldSpec {
        field: Field::NoCommandEval,
        key: "no-command-eval",
        env_var: "BUILDKITE_NO_COMMAND_EVAL",
        kind: FieldKind::Bool,
        default: DefaultValue::Bool(false),
        help: "Don't allow this agent to run arbitrary console commands",
    },
    FieldSpec {
        field: Field::Experiments,
        key: "experiment",
        env_var: "BUILDKITE_AGENT_EXPERIMENT",
        kind: FieldKind::List,
        default: DefaultValue::EmptyList,
        help: "Enable experimental features within the buildkite-agent",
    },
    FieldSpec {
        field: Field::Endpoint,
        key: "endpoint",
        env_var: "BUILDKITE_AGENT_ENDPOINT",
        kind: FieldKind::String,
        default: DefaultValue::Str(DEFAULT_ENDPOINT),
        help: "The Agent API endpoint",
    },
    FieldSpec {
        field: Field::NoColor,
        key: "no-color",
        env_var: "BUILDKITE_AGENT_NO_COLOR",
        kind: FieldKind::Bool,
        default: DefaultValue::Bool(false),
        help: "Don't show colors in logging",
    },
    FieldSpec {
        field: Field::Debug,
        key: "debug",
        env_var: "BUILDKITE_AGENT_DEBUG",
        kind: FieldKind::Bool,
        default: DefaultValue::Bool(false),
        help: "Enable debug mode",
    },
    FieldSpec {
        field: Field::DebugHttp,
        key: "debug-http",
        env_var: "BUILDKITE_AGENT_DEBUG_HTTP",
        kind: FieldKind::Bool,
        default: DefaultValue::Bool(false),
        help: "Enable HTTP debug mode, which dumps all request and response bodies to the log",
    },
];

/// Immutable catalog of configurable fields.
///
/// # Examples
///
/// ```
/// use buildkite_agent::config::{Field, FieldKind, Schema};
///
/// let schema = Schema::agent_start();
/// let spec = schema.get(Field::NoPty).unwrap();
/// assert_eq!(spec.key, "no-pty");
/// assert_eq!(spec.env_var, "BUILDKITE_NO_PTY");
/// assert_eq!(spec.kind, FieldKind::Bool);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    fields: &'static [FieldSpec],
}

impl Schema {
    /// The catalog for the `start` command.
    #[must_use]
    pub const fn agent_start() -> Self {
        Self {
            fields: AGENT_START_FIELDS,
        }
    }

    /// All entries, in declaration order.
    #[must_use]
    pub const fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Look up the entry for `field`.
    #[must_use]
    pub fn get(&self, field: Field) -> Option<&'static FieldSpec> {
        let fields: &'static [FieldSpec] = self.fields;
        fields.iter().find(|spec| spec.field == field)
    }

    /// Look up an entry by its flag/file key.
    #[must_use]
    pub fn by_key(&self, key: &str) -> Option<&'static FieldSpec> {
        let fields: &'static [FieldSpec] = self.fields;
        fields.iter().find(|spec| spec.key == key)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::agent_start()
    }
}

impl FieldKind {
    /// Parse raw text (from an environment variable or a file string) into a
    /// value of this kind.
    ///
    /// `origin` names where the text came from and is used in errors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if the text is not a valid boolean or
    /// integer for those kinds.
    pub fn parse(self, origin: &str, raw: &str) -> Result<Value> {
        match self {
            Self::String | Self::Path => Ok(Value::String(raw.to_string())),
            Self::Bool => parse_bool(origin, raw).map(Value::Bool),
            Self::Integer => raw.trim().parse().map(Value::Integer).map_err(|_| {
                Error::parse(
                    origin,
                    format!("invalid integer value: '{raw}' (expected a non-negative number)"),
                )
            }),
            Self::List => Ok(Value::List(parse_list(raw))),
        }
    }

    /// Whether `value` has the shape this kind expects.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::String | Self::Path, Value::String(_))
                | (Self::Bool, Value::Bool(_))
                | (Self::Integer, Value::Integer(_))
                | (Self::List, Value::List(_))
        )
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Path => write!(f, "path"),
            Self::Bool => write!(f, "boolean"),
            Self::Integer => write!(f, "integer"),
            Self::List => write!(f, "list"),
        }
    }
}

impl DefaultValue {
    /// Materialize the default as a [`Value`].
    #[must_use]
    pub fn to_value(self) -> Value {
        match self {
            Self::Str(s) => Value::String(s.to_string()),
            Self::Bool(b) => Value::Bool(b),
            Self::Integer(n) => Value::Integer(n),
            Self::EmptyList => Value::List(Vec::new()),
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::EmptyList => Ok(()),
        }
    }
}

/// Parse a boolean value from a string.
///
/// Accepts: true/1/yes/on for true, false/0/no/off for false (case-insensitive).
///
/// # Errors
///
/// Returns [`Error::Parse`] naming `origin` for any other input.
pub fn parse_bool(origin: &str, s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(Error::parse(
            origin,
            format!("invalid boolean value: '{s}' (expected true/false/1/0/yes/no/on/off)"),
        )),
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
#[must_use]
pub fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(ToString::to_string)
        .collect()
}
