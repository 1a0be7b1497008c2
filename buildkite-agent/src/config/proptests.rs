//! Property-based tests for configuration resolution.

use std::path::{Path, PathBuf};

use super::environment::EnvVars;
use super::layer::{ConfigLayer, Source};
use super::merger::ConfigMerger;
use super::normalize::Normalizer;
use super::policy::PlatformPolicy;
use super::resolved::ResolvedConfig;
use super::schema::{Field, Schema, Value};
use super::validator::{ConfigValidator, MIN_DISCONNECT_AFTER_JOB_TIMEOUT};
use crate::platform::Platform;
use proptest::prelude::*;

fn layer(source: Source, field: Field, value: Option<Value>) -> ConfigLayer {
    let mut layer = ConfigLayer::new(source);
    if let Some(value) = value {
        layer.set(field, value);
    }
    layer
}

fn layers(field: Field, cli: Option<Value>, env: Option<Value>, file: Option<Value>) -> Vec<ConfigLayer> {
    vec![
        layer(Source::CommandLine, field, cli),
        layer(Source::Environment, field, env),
        layer(Source::File(PathBuf::from("/etc/buildkite-agent/buildkite-agent.cfg")), field, file),
    ]
}

fn string_value() -> impl Strategy<Value = Option<Value>> {
    prop::option::of("[a-z0-9-]{0,12}".prop_map(Value::String))
}

fn bool_value() -> impl Strategy<Value = Option<Value>> {
    prop::option::of(any::<bool>().prop_map(Value::Bool))
}

fn list_value() -> impl Strategy<Value = Option<Value>> {
    prop::option::of(prop::collection::vec("[a-z]{1,5}=[a-z]{1,5}", 0..4).prop_map(Value::List))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 1000,
        .. ProptestConfig::default()
    })]

    // The highest layer that sets a field wins; otherwise the default applies.
    #[test]
    fn string_precedence(cli in string_value(), env in string_value(), file in string_value()) {
        let expected = match cli.clone().or_else(|| env.clone()).or_else(|| file.clone()) {
            Some(Value::String(s)) => s,
            _ => String::new(),
        };
        let config = ConfigMerger::new(Schema::agent_start())
            .merge(&layers(Field::Name, cli, env, file))
            .unwrap();
        prop_assert_eq!(config.name, expected);
    }

    // Explicit false is a value, not an absence.
    #[test]
    fn bool_precedence(cli in bool_value(), env in bool_value(), file in bool_value()) {
        let expected = match cli.clone().or_else(|| env.clone()).or_else(|| file.clone()) {
            Some(Value::Bool(b)) => b,
            _ => false,
        };
        let config = ConfigMerger::new(Schema::agent_start())
            .merge(&layers(Field::NoCommandEval, cli, env, file))
            .unwrap();
        prop_assert_eq!(config.no_command_eval, expected);
    }

    // Lists come wholesale from a single layer.
    #[test]
    fn list_precedence(cli in list_value(), env in list_value(), file in list_value()) {
        let expected = match cli.clone().or_else(|| env.clone()).or_else(|| file.clone()) {
            Some(Value::List(l)) => l,
            _ => Vec::new(),
        };
        let config = ConfigMerger::new(Schema::agent_start())
            .merge(&layers(Field::MetaData, cli, env, file))
            .unwrap();
        prop_assert_eq!(config.meta_data, expected);
    }

    #[test]
    fn windows_always_disables_pty(no_pty in any::<bool>(), debug in any::<bool>()) {
        let config = ResolvedConfig { no_pty, debug, ..ResolvedConfig::default() };
        let applied = PlatformPolicy::new(Platform::Windows).apply(config);
        prop_assert!(applied.no_pty);
        prop_assert_eq!(applied.debug, debug);
    }

    #[test]
    fn unix_policy_is_identity(no_pty in any::<bool>()) {
        let config = ResolvedConfig { no_pty, ..ResolvedConfig::default() };
        prop_assert_eq!(PlatformPolicy::new(Platform::Unix).apply(config.clone()), config);
    }

    #[test]
    fn timeout_floor(disconnect in any::<bool>(), timeout in 0u64..1000) {
        let config = ResolvedConfig {
            disconnect_after_job: disconnect,
            disconnect_after_job_timeout: timeout,
            ..ResolvedConfig::default()
        };
        let ok = ConfigValidator::validate_constraints(&config).is_ok();
        prop_assert_eq!(ok, !disconnect || timeout >= MIN_DISCONNECT_AFTER_JOB_TIMEOUT);
    }

    #[cfg(unix)]
    #[test]
    fn normalize_config_idempotent(
        build in "(~/|/)?[a-z]{1,6}(/(\\.|\\.\\.|[a-z]{1,6})){0,4}",
        hooks in "([a-z]{1,6}(/[a-z]{1,6}){0,3})?"
    ) {
        let env = EnvVars::default();
        let normalizer = Normalizer::new(&env, PathBuf::from("/work"))
            .with_home(Some(PathBuf::from("/home/ci")));
        let config = ResolvedConfig {
            build_path: PathBuf::from(&build),
            hooks_path: PathBuf::from(&hooks),
            ..ResolvedConfig::default()
        };

        let once = normalizer.normalize(config);
        let twice = normalizer.normalize(once.clone());
        prop_assert_eq!(&once, &twice);
        prop_assert!(once.build_path.is_absolute());
        prop_assert_eq!(hooks.is_empty(), once.hooks_path == Path::new(""));
    }
}
