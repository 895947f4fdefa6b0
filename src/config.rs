//! Binder front door: options, the per-load context and the load entry points.

use crate::env::{resolve_prefix, EnvSnapshot};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{layer_sources, overlay_env};
use crate::schema::{describe, Configurable};
use crate::source::Source;
use crate::validate::{apply_defaults, unmatched_keys};
use crate::value::ConfigValue;
use std::path::Path;

/// Options controlling how a [`Configor`] binds a destination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Prefix for derived variable names; `-` disables prefixing
    pub env_prefix: Option<String>,

    /// Default prefix used when no prefix is configured
    pub app_name: Option<String>,

    /// Skip unreadable sources instead of failing
    pub silent: bool,

    /// Reject sources carrying keys the destination does not declare
    pub error_on_unmatched_keys: bool,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the prefix for derived environment variable names.
    ///
    /// Pass `-` to look variables up without any prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn error_on_unmatched_keys(mut self, strict: bool) -> Self {
        self.error_on_unmatched_keys = strict;
        self
    }
}

/// State shared by every step of a single load.
#[derive(Debug, Clone)]
pub struct BindingContext<'a> {
    /// Resolved prefix, `None` when prefixing is disabled
    pub prefix: Option<String>,
    pub env: &'a EnvSnapshot,
    pub silent: bool,
}

impl<'a> BindingContext<'a> {
    pub fn new(config: &Config, env: &'a EnvSnapshot) -> Self {
        Self {
            prefix: resolve_prefix(
                config.env_prefix.as_deref(),
                config.app_name.as_deref(),
                env,
            ),
            env,
            silent: config.silent,
        }
    }
}

/// Binds defaults, configuration sources and the environment onto a
/// destination.
///
/// Precedence, highest first: environment variables, later sources, earlier
/// sources, declared defaults, the destination's existing values.
///
/// # Example
/// ```rust
/// use configor::{Config, Configor, Field, Schema, Configurable, EnvSnapshot, JsonParser, Source};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Serialize, Deserialize)]
/// #[serde(rename_all = "PascalCase")]
/// struct AppConfig {
///     app_name: String,
///     port: u16,
/// }
///
/// impl Configurable for AppConfig {
///     fn schema() -> Schema {
///         Schema::new()
///             .field("AppName", Field::of::<String>().default("demo"))
///             .field("Port", Field::of::<u16>())
///     }
/// }
///
/// let configor = Configor::new(Config::new().with_env_prefix("DEMO"));
/// let source = Source::from_text("inline", Box::new(JsonParser), r#"{"Port": 8080}"#);
/// let env: EnvSnapshot = [("DEMO_PORT", "9090")].into_iter().collect();
///
/// let mut config = AppConfig::default();
/// configor.load_with_env(&mut config, vec![source], &env).unwrap();
///
/// assert_eq!(config.app_name, "demo");
/// assert_eq!(config.port, 9090);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Configor {
    config: Config,
}

impl Configor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Loads the files at `paths`, in order, then the live environment.
    ///
    /// # Arguments
    /// * `dest` - The destination to populate in place
    /// * `paths` - Configuration files; later files override earlier ones
    ///
    /// # Returns
    /// * `ConfigResult<()>` - Success, or the first error met. Blank required
    ///   fields are reported together once everything else was applied.
    pub fn load<T, P>(&self, dest: &mut T, paths: &[P]) -> ConfigResult<()>
    where
        T: Configurable,
        P: AsRef<Path>,
    {
        let sources = paths.iter().map(Source::from_path).collect();
        self.load_sources(dest, sources)
    }

    /// Loads `sources`, in order, then the live environment.
    pub fn load_sources<T: Configurable>(
        &self,
        dest: &mut T,
        sources: Vec<Source>,
    ) -> ConfigResult<()> {
        let env = EnvSnapshot::capture();
        self.load_with_env(dest, sources, &env)
    }

    /// Loads `sources`, in order, then the variables in `env`.
    ///
    /// On `MissingRequired` the destination already holds everything that was
    /// merged. On any other error it is left untouched.
    ///
    /// # Errors
    /// * `ConfigError::Io` - If a source cannot be read outside silent mode
    /// * `ConfigError::Parse` - If a source cannot be decoded
    /// * `ConfigError::UnmatchedKeys` - If strict key checking rejects a source
    /// * `ConfigError::Coercion` - If a variable or default does not fit its field
    /// * `ConfigError::MissingRequired` - If required fields are still blank
    pub fn load_with_env<T: Configurable>(
        &self,
        dest: &mut T,
        sources: Vec<Source>,
        env: &EnvSnapshot,
    ) -> ConfigResult<()> {
        let ctx = BindingContext::new(&self.config, env);
        let fields = describe::<T>();
        let mut tree = ConfigValue::from_serialize(&*dest)?;

        let layers = self.read_sources(&sources, &ctx)?;
        if self.config.error_on_unmatched_keys {
            for (source, layer) in sources.iter().zip(&layers) {
                let Some(layer) = layer else { continue };
                let keys = unmatched_keys(layer, &tree, &fields)?;
                if !keys.is_empty() {
                    return Err(ConfigError::UnmatchedKeys {
                        source_name: source.name().to_string(),
                        keys,
                    });
                }
            }
        }

        layer_sources(&mut tree, layers.into_iter().flatten());
        overlay_env(&mut tree, &fields, &ctx)?;
        let missing = apply_defaults(&mut tree, &fields)?;

        *dest = tree.deserialize_into()?;

        if !missing.is_empty() {
            return Err(ConfigError::MissingRequired { fields: missing });
        }
        Ok(())
    }

    /// Reads and parses every source; skipped sources yield `None`.
    fn read_sources(
        &self,
        sources: &[Source],
        ctx: &BindingContext<'_>,
    ) -> ConfigResult<Vec<Option<ConfigValue>>> {
        let mut layers = Vec::with_capacity(sources.len());

        for source in sources {
            let content = match source.read() {
                Ok(content) => content,
                Err(err) if ctx.silent => {
                    tracing::debug!(source = source.name(), error = %err, "skipping unreadable configuration source");
                    layers.push(None);
                    continue;
                }
                Err(err) => {
                    tracing::warn!(source = source.name(), error = %err, "failed to read configuration source");
                    return Err(err);
                }
            };

            let layer = source.parse(&content)?;
            tracing::debug!(source = source.name(), "loaded configuration source");
            layers.push(Some(layer));
        }

        Ok(layers)
    }
}

/// Loads the files at `paths` and the live environment onto `dest` with
/// default options.
///
/// # Example
/// ```no_run
/// # use configor::{Configurable, Field, Schema};
/// # use serde::{Deserialize, Serialize};
/// # #[derive(Default, Serialize, Deserialize)]
/// # struct AppConfig { name: String }
/// # impl Configurable for AppConfig {
/// #     fn schema() -> Schema { Schema::new().field("name", Field::of::<String>()) }
/// # }
/// let mut config = AppConfig::default();
/// configor::load(&mut config, &["config.yml"]).unwrap();
/// ```
pub fn load<T, P>(dest: &mut T, paths: &[P]) -> ConfigResult<()>
where
    T: Configurable,
    P: AsRef<Path>,
{
    Configor::default().load(dest, paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{JsonParser, YamlParser};
    use crate::schema::{Field, Schema};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "PascalCase")]
    struct Settings {
        name: String,
        port: u16,
        token: String,
    }

    impl Configurable for Settings {
        fn schema() -> Schema {
            Schema::new()
                .field("Name", Field::of::<String>().default("svc"))
                .field("Port", Field::of::<u16>())
                .field("Token", Field::of::<String>().required())
        }
    }

    fn snapshot(pairs: &[(&str, &str)]) -> EnvSnapshot {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn json(content: &str) -> Source {
        Source::from_text("inline.json", Box::new(JsonParser), content)
    }

    #[test]
    fn test_config_builders() {
        let config = Config::new()
            .with_env_prefix("APP")
            .with_app_name("demo")
            .silent(true)
            .error_on_unmatched_keys(true);

        assert_eq!(config.env_prefix.as_deref(), Some("APP"));
        assert_eq!(config.app_name.as_deref(), Some("demo"));
        assert!(config.silent);
        assert!(config.error_on_unmatched_keys);
        assert_eq!(Config::default(), Config::new());
    }

    #[test]
    fn test_binding_context_resolves_prefix() {
        let env = EnvSnapshot::default();
        let ctx = BindingContext::new(&Config::default(), &env);
        assert_eq!(ctx.prefix.as_deref(), Some("Configor"));

        let ctx = BindingContext::new(&Config::new().with_app_name("demo"), &env);
        assert_eq!(ctx.prefix.as_deref(), Some("demo"));

        let ctx = BindingContext::new(&Config::new().with_env_prefix("-"), &env);
        assert_eq!(ctx.prefix, None);
    }

    #[test]
    fn test_precedence() {
        let configor = Configor::default();
        let env = snapshot(&[("CONFIGOR_PORT", "9000")]);
        let sources = vec![
            json(r#"{"Port": 1, "Token": "t"}"#),
            json(r#"{"Port": 2, "Name": "file"}"#),
        ];

        let mut settings = Settings::default();
        configor.load_with_env(&mut settings, sources, &env).unwrap();

        assert_eq!(settings.name, "file");
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.token, "t");
    }

    #[test]
    fn test_missing_required_keeps_merged_state() {
        let configor = Configor::default();
        let mut settings = Settings::default();
        let result = configor.load_with_env(
            &mut settings,
            vec![json(r#"{"Port": 7}"#)],
            &EnvSnapshot::default(),
        );

        match result {
            Err(ConfigError::MissingRequired { fields }) => {
                assert_eq!(fields, vec!["Token".to_string()]);
            }
            other => panic!("Expected MissingRequired error, got {other:?}"),
        }
        assert_eq!(settings.port, 7);
        assert_eq!(settings.name, "svc");
    }

    #[test]
    fn test_parse_failure_leaves_destination_untouched() {
        let configor = Configor::default();
        let mut settings = Settings {
            port: 1,
            ..Settings::default()
        };
        let result = configor.load_with_env(
            &mut settings,
            vec![
                json(r#"{"Token": "t"}"#),
                Source::from_text("bad.yml", Box::new(YamlParser), "- not a mapping"),
            ],
            &EnvSnapshot::default(),
        );

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
        assert_eq!(settings.port, 1);
        assert_eq!(settings.token, "");
    }

    #[test]
    fn test_silent_mode_skips_missing_files() {
        let env = snapshot(&[("CONFIGOR_TOKEN", "t")]);
        let missing = Source::from_path("/nonexistent/configor/settings.json");

        let mut settings = Settings::default();
        Configor::new(Config::new().silent(true))
            .load_with_env(&mut settings, vec![missing], &env)
            .unwrap();
        assert_eq!(settings.token, "t");

        let missing = Source::from_path("/nonexistent/configor/settings.json");
        let result = Configor::default().load_with_env(&mut Settings::default(), vec![missing], &env);
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_unmatched_keys_rejected_in_strict_mode() {
        let env = snapshot(&[("CONFIGOR_TOKEN", "t")]);
        let strict = Configor::new(Config::new().error_on_unmatched_keys(true));

        let result = strict.load_with_env(
            &mut Settings::default(),
            vec![json(r#"{"Port": 1, "Unknown": true}"#)],
            &env,
        );
        match result {
            Err(ConfigError::UnmatchedKeys { source_name, keys }) => {
                assert_eq!(source_name, "inline.json");
                assert_eq!(keys, vec!["Unknown".to_string()]);
            }
            other => panic!("Expected UnmatchedKeys error, got {other:?}"),
        }

        let mut settings = Settings::default();
        Configor::default()
            .load_with_env(
                &mut settings,
                vec![json(r#"{"Port": 1, "Unknown": true}"#)],
                &env,
            )
            .unwrap();
        assert_eq!(settings.port, 1);
    }

    #[test]
    fn test_configor_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Configor>();
    }
}
