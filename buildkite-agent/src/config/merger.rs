//! Configuration merging and precedence handling.
//!
//! Each field takes its value from the highest-precedence layer that sets it,
//! falling back to the schema default. Lists are never combined across
//! layers: the winning layer's list is used wholesale.

use std::path::PathBuf;

use crate::config::layer::{ConfigLayer, Source};
use crate::config::resolved::ResolvedConfig;
use crate::config::schema::{Field, FieldSpec, Schema, Value};
use crate::error::{Error, Result};

/// Merges configuration layers according to precedence.
///
/// # Examples
///
/// ```
/// use buildkite_agent::config::{ConfigLayer, ConfigMerger, Field, Schema, Source, Value};
///
/// let cli = ConfigLayer::new(Source::CommandLine)
///     .with(Field::Name, Value::String("from-cli".into()));
/// let env = ConfigLayer::new(Source::Environment)
///     .with(Field::Name, Value::String("from-env".into()))
///     .with(Field::Token, Value::String("abc".into()));
///
/// let config = ConfigMerger::new(Schema::agent_start()).merge(&[cli, env]).unwrap();
/// assert_eq!(config.name, "from-cli");
/// assert_eq!(config.token, "abc");
/// assert_eq!(config.disconnect_after_job_timeout, 120);
/// ```
pub struct ConfigMerger {
    schema: Schema,
}

impl ConfigMerger {
    /// Create a merger for `schema`.
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    /// Merge `layers`, given from highest to lowest precedence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] naming the layer and key if a layer holds a
    /// value whose shape does not match the field's kind.
    pub fn merge(&self, layers: &[ConfigLayer]) -> Result<ResolvedConfig> {
        let mut config = ResolvedConfig::default();

        for spec in self.schema.fields() {
            let found = layers
                .iter()
                .find_map(|layer| layer.get(spec.field).map(|value| (layer.source(), value)));

            let (source, value) = match found {
                Some((source, value)) => (source.clone(), value.clone()),
                None => (Source::Default, spec.default.to_value()),
            };

            if spec.field != Field::Token {
                log::debug!("{} taken from {}", spec.key, source);
            }
            Self::assign(&mut config, spec, &source, value)?;
        }

        Ok(config)
    }

    fn assign(
        config: &mut ResolvedConfig,
        spec: &FieldSpec,
        source: &Source,
        value: Value,
    ) -> Result<()> {
        if !spec.kind.accepts(&value) {
            return Err(Error::parse(
                format!("{source}: {}", spec.key),
                format!("expected a {} value", spec.kind),
            ));
        }

        match (spec.field, value) {
            (Field::Token, Value::String(s)) => config.token = s,
            (Field::Name, Value::String(s)) => config.name = s,
            (Field::Priority, Value::String(s)) => config.priority = s,
            (Field::DisconnectAfterJob, Value::Bool(b)) => config.disconnect_after_job = b,
            (Field::DisconnectAfterJobTimeout, Value::Integer(n)) => {
                config.disconnect_after_job_timeout = n;
            }
            (Field::MetaData, Value::List(l)) => config.meta_data = l,
            (Field::MetaDataEc2, Value::Bool(b)) => config.meta_data_ec2 = b,
            (Field::MetaDataEc2Tags, Value::Bool(b)) => config.meta_data_ec2_tags = b,
            (Field::MetaDataGcp, Value::Bool(b)) => config.meta_data_gcp = b,
            (Field::GitCloneFlags, Value::String(s)) => config.git_clone_flags = s,
            (Field::GitCleanFlags, Value::String(s)) => config.git_clean_flags = s,
            (Field::BootstrapScript, Value::String(s)) => config.bootstrap_script = PathBuf::from(s),
            (Field::BuildPath, Value::String(s)) => config.build_path = PathBuf::from(s),
            (Field::HooksPath, Value::String(s)) => config.hooks_path = PathBuf::from(s),
            (Field::PluginsPath, Value::String(s)) => config.plugins_path = PathBuf::from(s),
            (Field::NoPty, Value::Bool(b)) => config.no_pty = b,
            (Field::NoSshFingerprintVerification, Value::Bool(b)) => {
                config.no_ssh_fingerprint_verification = b;
            }
            (Field::NoCommandEval, Value::Bool(b)) => config.no_command_eval = b,
            (Field::Experiments, Value::List(l)) => config.experiments = l,
            (Field::Endpoint, Value::String(s)) => config.endpoint = s,
            (Field::NoColor, Value::Bool(b)) => config.no_color = b,
            (Field::Debug, Value::Bool(b)) => config.debug = b,
            (Field::DebugHttp, Value::Bool(b)) => config.debug_http = b,
            (field, value) => {
                return Err(Error::parse(
                    format!("{source}: {}", spec.key),
                    format!("{field:?} cannot hold {value:?}"),
                ))
            }
        }

        Ok(())
    }
}
