//! Command-line flags derived from the schema.
//!
//! Every schema field becomes a `--<key>` flag. The flags carry no clap
//! defaults and no clap environment bindings: a flag that was not typed on
//! the command line is simply absent from the command-line layer, leaving
//! lower-precedence sources to fill it.

use clap::builder::BoolishValueParser;
use clap::parser::ValueSource;
use clap::{value_parser, Arg, ArgAction, ArgMatches};

use crate::config::layer::{ConfigLayer, Source};
use crate::config::schema::{DefaultValue, FieldKind, FieldSpec, Schema, Value};
use crate::error::{Error, Result};

/// Builds and reads the schema-driven command-line flags.
///
/// # Examples
///
/// ```
/// use buildkite_agent::config::{CommandLineConfig, Field, Schema, Value};
/// use clap::Command;
///
/// let schema = Schema::agent_start();
/// let matches = Command::new("start")
///     .args(CommandLineConfig::args(&schema))
///     .try_get_matches_from(["start", "--token", "abc", "--no-pty", "--meta-data", "a=1"])
///     .unwrap();
///
/// let layer = CommandLineConfig::from_matches(&schema, &matches).unwrap();
/// assert_eq!(layer.get(Field::Token), Some(&Value::String("abc".into())));
/// assert_eq!(layer.get(Field::NoPty), Some(&Value::Bool(true)));
/// assert!(!layer.is_set(Field::Name));
/// ```
pub struct CommandLineConfig;

impl CommandLineConfig {
    /// One clap argument per schema field, in schema order.
    #[must_use]
    pub fn args(schema: &Schema) -> Vec<Arg> {
        schema.fields().iter().map(Self::arg).collect()
    }

    fn arg(spec: &FieldSpec) -> Arg {
        let arg = Arg::new(spec.key)
            .long(spec.key)
            .help(Self::help(spec))
            .help_heading("Agent options");

        match spec.kind {
            FieldKind::String | FieldKind::Path => arg
                .value_name(if spec.kind == FieldKind::Path { "PATH" } else { "VALUE" })
                .action(ArgAction::Set)
                .allow_hyphen_values(true)
                .value_parser(value_parser!(String)),
            FieldKind::Integer => arg
                .value_name("SECONDS")
                .action(ArgAction::Set)
                .value_parser(value_parser!(u64)),
            FieldKind::Bool => arg
                .action(ArgAction::Set)
                .num_args(0..=1)
                .require_equals(true)
                .default_missing_value("true")
                .value_parser(BoolishValueParser::new()),
            FieldKind::List => arg
                .value_name("VALUE")
                .action(ArgAction::Append)
                .allow_hyphen_values(true)
                .value_parser(value_parser!(String)),
        }
    }

    fn help(spec: &FieldSpec) -> String {
        let mut help = spec.help.to_string();
        match spec.default {
            DefaultValue::Str("") | DefaultValue::Bool(false) | DefaultValue::EmptyList => {}
            default => help.push_str(&format!(" [default: {default}]")),
        }
        help.push_str(&format!(" [env: {}]", spec.env_var));
        help
    }

    /// Collect the flags that were typed on the command line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] naming the flag if clap holds a value of an
    /// unexpected type for it.
    pub fn from_matches(schema: &Schema, matches: &ArgMatches) -> Result<ConfigLayer> {
        let mut layer = ConfigLayer::new(Source::CommandLine);

        for spec in schema.fields() {
            if matches.value_source(spec.key) != Some(ValueSource::CommandLine) {
                continue;
            }

            let flag = format!("--{}", spec.key);
            let value = match spec.kind {
                FieldKind::String | FieldKind::Path => matches
                    .try_get_one::<String>(spec.key)
                    .map_err(|e| Error::parse(&flag, e.to_string()))?
                    .cloned()
                    .map(Value::String),
                FieldKind::Integer => matches
                    .try_get_one::<u64>(spec.key)
                    .map_err(|e| Error::parse(&flag, e.to_string()))?
                    .copied()
                    .map(Value::Integer),
                FieldKind::Bool => matches
                    .try_get_one::<bool>(spec.key)
                    .map_err(|e| Error::parse(&flag, e.to_string()))?
                    .copied()
                    .map(Value::Bool),
                FieldKind::List => matches
                    .try_get_many::<String>(spec.key)
                    .map_err(|e| Error::parse(&flag, e.to_string()))?
                    .map(|values| Value::List(values.cloned().collect())),
            };

            if let Some(value) = value {
                layer.set(spec.field, value);
            }
        }

        Ok(layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Field;
    use clap::Command;

    fn parse(args: &[&str]) -> ConfigLayer {
        let schema = Schema::agent_start();
        let matches = Command::new("start")
            .args(CommandLineConfig::args(&schema))
            .try_get_matches_from(std::iter::once("start").chain(args.iter().copied()))
            .unwrap();
        CommandLineConfig::from_matches(&schema, &matches).unwrap()
    }

    #[test]
    fn test_no_flags_gives_empty_layer() {
        assert!(parse(&[]).is_empty());
    }

    #[test]
    fn test_bool_flag_forms() {
        assert_eq!(parse(&["--debug"]).get(Field::Debug), Some(&Value::Bool(true)));
        assert_eq!(
            parse(&["--debug=false"]).get(Field::Debug),
            Some(&Value::Bool(false))
        );
        assert_eq!(
            parse(&["--no-pty=true"]).get(Field::NoPty),
            Some(&Value::Bool(true))
        );
    }

    #[test]
    fn test_integer_flag() {
        assert_eq!(
            parse(&["--disconnect-after-job-timeout", "60"]).get(Field::DisconnectAfterJobTimeout),
            Some(&Value::Integer(60))
        );
    }

    #[test]
    fn test_invalid_integer_is_rejected_by_clap() {
        let schema = Schema::agent_start();
        let result = Command::new("start")
            .args(CommandLineConfig::args(&schema))
            .try_get_matches_from(["start", "--disconnect-after-job-timeout", "soon"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_repeated_list_flag_keeps_order() {
        let layer = parse(&["--meta-data", "b=1", "--meta-data", "a=2", "--meta-data", "b=1"]);
        assert_eq!(
            layer.get(Field::MetaData),
            Some(&Value::List(vec!["b=1".into(), "a=2".into(), "b=1".into()]))
        );
    }

    #[test]
    fn test_flag_values_may_start_with_hyphen() {
        assert_eq!(
            parse(&["--git-clean-flags", "-fdq"]).get(Field::GitCleanFlags),
            Some(&Value::String("-fdq".into()))
        );
    }

    #[test]
    fn test_explicit_empty_string() {
        assert_eq!(
            parse(&["--git-clone-flags", ""]).get(Field::GitCloneFlags),
            Some(&Value::String(String::new()))
        );
    }

    #[test]
    fn test_help_lists_default_and_env() {
        let schema = Schema::agent_start();
        let endpoint = schema.get(Field::Endpoint).unwrap();
        let help = CommandLineConfig::help(endpoint);
        assert!(help.contains("[default: https://agent.buildkite.com/v3]"));
        assert!(help.contains("[env: BUILDKITE_AGENT_ENDPOINT]"));

        let name = schema.get(Field::Name).unwrap();
        assert!(!CommandLineConfig::help(name).contains("[default:"));
    }

    #[test]
    fn test_every_field_has_a_flag() {
        let schema = Schema::agent_start();
        let args = CommandLineConfig::args(&schema);
        assert_eq!(args.len(), schema.fields().len());
        for (arg, spec) in args.iter().zip(schema.fields()) {
            assert_eq!(arg.get_long(), Some(spec.key));
        }
    }
}
