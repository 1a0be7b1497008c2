//! Builder running the full configuration resolution pipeline.

use std::path::PathBuf;

use crate::config::environment::{EnvVars, EnvironmentConfig};
use crate::config::layer::{ConfigLayer, Source};
use crate::config::loader::{ConfigFile, ConfigLoader};
use crate::config::merger::ConfigMerger;
use crate::config::normalize::Normalizer;
use crate::config::paths::{candidate_paths, executable_dir};
use crate::config::policy::PlatformPolicy;
use crate::config::resolved::ResolvedConfig;
use crate::config::schema::{parse_bool, Field, Schema, Value};
use crate::config::validator::ConfigValidator;
use crate::error::Result;
use crate::platform::Platform;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "BUILDKITE_AGENT_CONFIG";

/// The outcome of configuration resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The validated configuration.
    pub config: ResolvedConfig,
    /// The configuration file that was loaded, if any.
    pub config_file: Option<PathBuf>,
}

/// Builder for resolving the `agent start` configuration.
///
/// Resolution runs in a fixed order: read the environment, load the first
/// existing configuration file, merge (command line > environment > file >
/// defaults), normalize paths, check required fields, apply platform
/// policy, then check cross-field constraints.
///
/// # Examples
///
/// ```
/// use buildkite_agent::config::{ConfigBuilder, ConfigLayer, EnvVars, Field, Source, Value};
/// use std::path::PathBuf;
///
/// let env: EnvVars = [("BUILDKITE_AGENT_TOKEN", "abc")].into_iter().collect();
/// let cli = ConfigLayer::new(Source::CommandLine)
///     .with(Field::BuildPath, Value::String("/var/builds".into()))
///     .with(Field::BootstrapScript, Value::String("/usr/bin/bootstrap".into()));
///
/// let resolution = ConfigBuilder::new()
///     .with_env(env)
///     .with_command_line(cli)
///     .skip_files()
///     .build()
///     .unwrap();
///
/// assert_eq!(resolution.config.token, "abc");
/// assert_eq!(resolution.config_file, None);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    schema: Schema,
    command_line: ConfigLayer,
    env: Option<EnvVars>,
    config_file: Option<PathBuf>,
    candidates: Option<Vec<PathBuf>>,
    platform: Platform,
    home: Option<Option<PathBuf>>,
    working_dir: Option<PathBuf>,
    skip_files: bool,
}

impl ConfigBuilder {
    /// Create a builder reading live process state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            schema: Schema::agent_start(),
            command_line: ConfigLayer::new(Source::CommandLine),
            env: None,
            config_file: None,
            candidates: None,
            platform: Platform::current(),
            home: None,
            working_dir: None,
            skip_files: false,
        }
    }

    /// Use `layer` as the command-line layer.
    #[must_use]
    pub fn with_command_line(mut self, layer: ConfigLayer) -> Self {
        self.command_line = layer;
        self
    }

    /// Use `env` instead of the process environment.
    #[must_use]
    pub fn with_env(mut self, env: EnvVars) -> Self {
        self.env = Some(env);
        self
    }

    /// Load exactly this configuration file instead of searching.
    ///
    /// `None` falls back to `BUILDKITE_AGENT_CONFIG`, then the candidates.
    #[must_use]
    pub fn with_config_file(mut self, path: Option<PathBuf>) -> Self {
        self.config_file = path;
        self
    }

    /// Search these candidates instead of the platform defaults.
    #[must_use]
    pub fn with_candidate_paths(mut self, candidates: Vec<PathBuf>) -> Self {
        self.candidates = Some(candidates);
        self
    }

    /// Resolve for `platform` instead of the host.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Home directory used for `~` expansion.
    #[must_use]
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = Some(home);
        self
    }

    /// Directory relative paths are resolved against.
    #[must_use]
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = Some(dir);
        self
    }

    /// Do not read any configuration file.
    #[must_use]
    pub fn skip_files(mut self) -> Self {
        self.skip_files = true;
        self
    }

    /// Early view of a boolean field from the command line, then the
    /// environment, before any file is read.
    ///
    /// Used to configure logging ahead of resolution. An unset or
    /// unparsable value reads as `false`; [`build`](Self::build) reports the
    /// parse error.
    #[must_use]
    pub fn preliminary_bool(&self, field: Field) -> bool {
        if let Some(Value::Bool(value)) = self.command_line.get(field) {
            return *value;
        }

        let Some(spec) = self.schema.get(field) else {
            return false;
        };
        let process;
        let env = match &self.env {
            Some(env) => env,
            None => {
                process = EnvVars::from_process();
                &process
            }
        };
        env.get_non_empty(spec.env_var)
            .and_then(|raw| parse_bool(spec.env_var, raw).ok())
            .unwrap_or(false)
    }

    /// Run the pipeline.
    ///
    /// # Errors
    ///
    /// Returns the first discovery, parse or validation error. Returns
    /// [`Error::Io`](crate::Error::Io) if the working directory is needed but
    /// cannot be read.
    pub fn build(self) -> Result<Resolution> {
        let env = self.env.unwrap_or_else(EnvVars::from_process);
        let env_layer = EnvironmentConfig::layer(&self.schema, &env)?;

        let file = if self.skip_files {
            None
        } else {
            Self::load_file(
                self.schema,
                self.platform,
                &env,
                self.config_file,
                self.candidates,
            )?
        };
        let config_file = file.as_ref().map(|f| f.path.clone());
        match &config_file {
            Some(path) => log::debug!("Using configuration file {}", path.display()),
            None => log::debug!("No configuration file found"),
        }

        let mut layers = vec![self.command_line, env_layer];
        layers.extend(file.map(|f| f.layer));
        let config = ConfigMerger::new(self.schema).merge(&layers)?;

        let working_dir = match self.working_dir {
            Some(dir) => dir,
            None => std::env::current_dir()?,
        };
        let mut normalizer = Normalizer::new(&env, working_dir);
        if let Some(home) = self.home {
            normalizer = normalizer.with_home(home);
        }
        let config = normalizer.normalize(config);

        ConfigValidator::validate_required(&config)?;
        let config = PlatformPolicy::new(self.platform).apply(config);
        ConfigValidator::validate_constraints(&config)?;

        Ok(Resolution {
            config,
            config_file,
        })
    }

    fn load_file(
        schema: Schema,
        platform: Platform,
        env: &EnvVars,
        explicit: Option<PathBuf>,
        candidates: Option<Vec<PathBuf>>,
    ) -> Result<Option<ConfigFile>> {
        let loader = ConfigLoader::new(schema);

        let explicit =
            explicit.or_else(|| env.get_non_empty(CONFIG_ENV_VAR).map(PathBuf::from));
        if let Some(path) = explicit {
            return loader.load_explicit(&path).map(Some);
        }

        let candidates = candidates
            .unwrap_or_else(|| candidate_paths(platform, executable_dir().as_deref(), env));
        loader.load_first(&candidates)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
