//! Path normalization for path-valued fields.
//!
//! Normalizing a path:
//! - expands a leading `~` to the home directory
//! - expands `$VAR` and `${VAR}` references
//! - makes relative paths absolute against the working directory
//! - resolves `.` and `..` components
//!
//! Symlinks are never resolved and the filesystem is never touched, so the
//! result is a pure function of the input and the supplied context.

use std::path::{Component, Path, PathBuf};

use crate::config::environment::EnvVars;
use crate::config::resolved::ResolvedConfig;

/// Expand `$VAR` and `${VAR}` references against `env`.
///
/// Unset variables expand to the empty string. A `$` that does not start a
/// variable reference is kept as is, as is an unterminated `${`.
///
/// # Examples
///
/// ```
/// use buildkite_agent::config::{expand_vars, EnvVars};
///
/// let env: EnvVars = [("HOME", "/home/ci")].into_iter().collect();
/// assert_eq!(expand_vars("$HOME/builds", &env), "/home/ci/builds");
/// assert_eq!(expand_vars("${HOME}/x/$NOPE", &env), "/home/ci/x/");
/// assert_eq!(expand_vars("cost: $5", &env), "cost: $5");
/// ```
#[must_use]
pub fn expand_vars(input: &str, env: &EnvVars) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(braced) = after.strip_prefix('{') {
            if let Some(end) = braced.find('}') {
                out.push_str(env.get(&braced[..end]).unwrap_or_default());
                rest = &braced[end + 1..];
                continue;
            }
            out.push('$');
            rest = after;
            continue;
        }

        let name_len = after
            .char_indices()
            .find(|(i, c)| !(c.is_ascii_alphanumeric() || *c == '_') || (*i == 0 && c.is_ascii_digit()))
            .map_or(after.len(), |(i, _)| i);

        if name_len == 0 {
            out.push('$');
        } else {
            out.push_str(env.get(&after[..name_len]).unwrap_or_default());
        }
        rest = &after[name_len..];
    }

    out.push_str(rest);
    out
}

/// Expand a leading `~` or `~/` to `home`.
///
/// `~user` forms and paths without a leading tilde are returned unchanged,
/// as is everything when the home directory is unknown.
///
/// # Examples
///
/// ```
/// use buildkite_agent::config::expand_tilde;
/// use std::path::{Path, PathBuf};
///
/// let home = Path::new("/home/ci");
/// assert_eq!(expand_tilde("~/builds", Some(home)), PathBuf::from("/home/ci/builds"));
/// assert_eq!(expand_tilde("~", Some(home)), PathBuf::from("/home/ci"));
/// assert_eq!(expand_tilde("/abs", Some(home)), PathBuf::from("/abs"));
/// ```
#[must_use]
pub fn expand_tilde(path: &str, home: Option<&Path>) -> PathBuf {
    match (path, home) {
        ("~", Some(home)) => home.to_path_buf(),
        (p, Some(home)) if p.starts_with("~/") || p.starts_with("~\\") => home.join(&p[2..]),
        (p, _) => PathBuf::from(p),
    }
}

/// Remove `.` components and resolve `..` against the preceding component.
///
/// A `..` that would climb above the root stays at the root.
///
/// # Examples
///
/// ```
/// use buildkite_agent::config::resolve_components;
/// use std::path::{Path, PathBuf};
///
/// assert_eq!(resolve_components(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
/// assert_eq!(resolve_components(Path::new("/a/../../c")), PathBuf::from("/c"));
/// ```
#[must_use]
pub fn resolve_components(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    let mut depth = 0usize;

    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => result.push(component),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth > 0 {
                    result.pop();
                    depth -= 1;
                } else if !result.has_root() {
                    result.push(component);
                }
            }
            Component::Normal(c) => {
                result.push(c);
                depth += 1;
            }
        }
    }

    result
}

/// Normalizes the path-valued fields of a [`ResolvedConfig`].
///
/// # Examples
///
/// ```
/// use buildkite_agent::config::{EnvVars, Normalizer};
/// use std::path::{Path, PathBuf};
///
/// let env: EnvVars = [("ROOT", "/srv")].into_iter().collect();
/// let normalizer = Normalizer::new(&env, PathBuf::from("/work"))
///     .with_home(Some(PathBuf::from("/home/ci")));
///
/// assert_eq!(normalizer.normalize_path(Path::new("builds")), PathBuf::from("/work/builds"));
/// assert_eq!(normalizer.normalize_path(Path::new("~/b")), PathBuf::from("/home/ci/b"));
/// assert_eq!(normalizer.normalize_path(Path::new("$ROOT/./b/..")), PathBuf::from("/srv"));
/// assert_eq!(normalizer.normalize_path(Path::new("")), PathBuf::new());
/// ```
#[derive(Debug, Clone)]
pub struct Normalizer<'a> {
    env: &'a EnvVars,
    home: Option<PathBuf>,
    working_dir: PathBuf,
}

impl<'a> Normalizer<'a> {
    /// Create a normalizer resolving relative paths against `working_dir`.
    ///
    /// The home directory defaults to the current user's.
    #[must_use]
    pub fn new(env: &'a EnvVars, working_dir: PathBuf) -> Self {
        Self {
            env,
            home: home::home_dir(),
            working_dir,
        }
    }

    /// Override the home directory used for `~` expansion.
    #[must_use]
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// Normalize a single path. Empty paths stay empty.
    ///
    /// Applying this twice gives the same result as applying it once, as
    /// long as the home directory and the expanded variable values contain
    /// no `$` or leading `~` of their own. Expansion runs a single pass, so
    /// such text survives into the result and would expand again.
    #[must_use]
    pub fn normalize_path(&self, path: &Path) -> PathBuf {
        if path.as_os_str().is_empty() {
            return PathBuf::new();
        }

        let raw = path.to_string_lossy();
        let tilde = expand_tilde(&raw, self.home.as_deref());
        let expanded = PathBuf::from(expand_vars(&tilde.to_string_lossy(), self.env));

        let absolute = if expanded.is_absolute() {
            expanded
        } else {
            self.working_dir.join(expanded)
        };

        resolve_components(&absolute)
    }

    /// Normalize every path field of `config`.
    #[must_use]
    pub fn normalize(&self, mut config: ResolvedConfig) -> ResolvedConfig {
        for path in [
            &mut config.bootstrap_script,
            &mut config.build_path,
            &mut config.hooks_path,
            &mut config.plugins_path,
        ] {
            *path = self.normalize_path(path);
        }

        log::debug!("Normalized build path to {}", config.build_path.display());
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> EnvVars {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_expand_vars_forms() {
        let vars = env(&[("A", "one"), ("B_2", "two")]);
        assert_eq!(expand_vars("$A/$B_2", &vars), "one/two");
        assert_eq!(expand_vars("${A}x", &vars), "onex");
        assert_eq!(expand_vars("$Ax", &vars), "");
        assert_eq!(expand_vars("plain", &vars), "plain");
    }

    #[test]
    fn test_expand_vars_literal_dollar() {
        let vars = EnvVars::default();
        assert_eq!(expand_vars("a$", &vars), "a$");
        assert_eq!(expand_vars("$/x", &vars), "$/x");
        assert_eq!(expand_vars("${unterminated", &vars), "${unterminated");
    }

    #[test]
    fn test_expand_tilde_user_syntax_unchanged() {
        assert_eq!(
            expand_tilde("~user/path", Some(Path::new("/home/ci"))),
            PathBuf::from("~user/path")
        );
    }

    #[test]
    fn test_expand_tilde_without_home() {
        assert_eq!(expand_tilde("~/x", None), PathBuf::from("~/x"));
    }

    #[test]
    fn test_resolve_components_root_only() {
        assert_eq!(resolve_components(Path::new("/")), PathBuf::from("/"));
        assert_eq!(resolve_components(Path::new("/..")), PathBuf::from("/"));
    }

    #[test]
    fn test_resolve_components_relative_keeps_leading_parent() {
        assert_eq!(
            resolve_components(Path::new("../a/./b/..")),
            PathBuf::from("../a")
        );
    }

    #[test]
    #[cfg(unix)]
    fn test_normalize_config_paths() {
        let vars = env(&[("BK", "/var/lib/buildkite")]);
        let normalizer =
            Normalizer::new(&vars, PathBuf::from("/work")).with_home(Some("/home/ci".into()));

        let config = ResolvedConfig {
            bootstrap_script: PathBuf::from("bin/bootstrap.sh"),
            build_path: PathBuf::from("$BK/builds"),
            hooks_path: PathBuf::from("~/hooks/../hooks"),
            plugins_path: PathBuf::new(),
            ..ResolvedConfig::default()
        };
        let config = normalizer.normalize(config);

        assert_eq!(config.bootstrap_script, PathBuf::from("/work/bin/bootstrap.sh"));
        assert_eq!(config.build_path, PathBuf::from("/var/lib/buildkite/builds"));
        assert_eq!(config.hooks_path, PathBuf::from("/home/ci/hooks"));
        assert_eq!(config.plugins_path, PathBuf::new());
    }

    #[test]
    #[cfg(unix)]
    fn test_normalize_idempotent() {
        let vars = EnvVars::default();
        let normalizer =
            Normalizer::new(&vars, PathBuf::from("/work")).with_home(Some("/home/ci".into()));
        let once = normalizer.normalize_path(Path::new("~/../a/./b"));
        assert_eq!(normalizer.normalize_path(&once), once);
    }

    #[test]
    #[cfg(unix)]
    fn test_expanded_values_are_not_expanded_again() {
        let vars: EnvVars = [("A", "$HOME"), ("HOME", "/home/ci")].into_iter().collect();
        let normalizer = Normalizer::new(&vars, PathBuf::from("/work"));
        let once = normalizer.normalize_path(Path::new("$A/x"));
        assert_eq!(once, PathBuf::from("/work/$HOME/x"));
        assert_eq!(normalizer.normalize_path(&once), PathBuf::from("/work/home/ci/x"));
    }

    #[test]
    #[cfg(unix)]
    fn test_normalize_keeps_symlink_components() {
        let vars = EnvVars::default();
        let normalizer = Normalizer::new(&vars, PathBuf::from("/"));
        // No filesystem access: a non-existent path normalizes fine.
        assert_eq!(
            normalizer.normalize_path(Path::new("/does/not/exist/../here")),
            PathBuf::from("/does/not/here")
        );
    }

    #[cfg(unix)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn path_with_dots_strategy() -> impl Strategy<Value = String> {
            prop::collection::vec(
                prop_oneof![
                    Just(".".to_string()),
                    Just("..".to_string()),
                    "[a-zA-Z0-9_-]{1,10}",
                ],
                1..=8,
            )
            .prop_map(|parts| parts.join("/"))
        }

        proptest! {
            #[test]
            fn normalize_is_absolute_and_idempotent(s in path_with_dots_strategy()) {
                let vars = EnvVars::default();
                let normalizer = Normalizer::new(&vars, PathBuf::from("/work"));
                let once = normalizer.normalize_path(Path::new(&s));
                prop_assert!(once.is_absolute());
                prop_assert_eq!(normalizer.normalize_path(&once), once.clone());
                for component in once.components() {
                    prop_assert_ne!(component, Component::CurDir);
                    prop_assert_ne!(component, Component::ParentDir);
                }
            }

            #[test]
            fn normalize_with_plain_variables_is_idempotent(
                value in "/?[a-z]{1,6}(/[a-z.]{1,6}){0,3}",
                rest in "(/[a-z]{1,6}){0,3}"
            ) {
                let vars: EnvVars = [("DIR", value.as_str())].into_iter().collect();
                let normalizer = Normalizer::new(&vars, PathBuf::from("/work"))
                    .with_home(Some(PathBuf::from("/home/ci")));
                let once = normalizer.normalize_path(Path::new(&format!("$DIR{rest}")));
                prop_assert_eq!(normalizer.normalize_path(&once), once.clone());
            }
        }
    }
}
