//! # CONFIGOR
//!
//! Binds layered configuration onto strongly-typed Rust structs.
//!
//! A destination struct is populated in one deterministic pass from:
//!
//! - Defaults declared on its fields
//! - JSON, YAML and TOML configuration files
//! - Environment variables derived from the field paths
//!
//! ## Precedence
//!
//! Highest first:
//!
//! 1. **Environment variables** - `{PREFIX}_{FIELD}_{SUBFIELD}`
//! 2. **Configuration files** - later files override earlier ones
//! 3. **Declared defaults** - applied to fields still zero
//! 4. **Existing values** - whatever the destination held before the load
//!
//! Fields marked `required` that are still zero afterwards fail the load.
//!
//! ## Quick Start
//!
//! ```rust
//! use configor::{Config, Configor, Configurable, EnvSnapshot, Field, Schema};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! #[serde(rename_all = "PascalCase")]
//! struct Database {
//!     name: String,
//!     user: String,
//!     password: String,
//!     port: u16,
//! }
//!
//! impl Configurable for Database {
//!     fn schema() -> Schema {
//!         Schema::new()
//!             .field("Name", Field::of::<String>())
//!             .field("User", Field::of::<String>().default("root"))
//!             .field("Password", Field::of::<String>().required().env("DBPassword"))
//!             .field("Port", Field::of::<u16>().default("3306"))
//!     }
//! }
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! #[serde(rename_all = "PascalCase")]
//! struct AppConfig {
//!     app_name: String,
//!     #[serde(rename = "DB")]
//!     db: Database,
//! }
//!
//! impl Configurable for AppConfig {
//!     fn schema() -> Schema {
//!         Schema::new()
//!             .field("AppName", Field::of::<String>().default("app name"))
//!             .field("DB", Field::nested::<Database>())
//!     }
//! }
//!
//! let env: EnvSnapshot = [("CONFIGOR_DB_NAME", "production"), ("DBPassword", "secret")]
//!     .into_iter()
//!     .collect();
//!
//! let mut config = AppConfig::default();
//! Configor::new(Config::default())
//!     .load_with_env(&mut config, vec![], &env)
//!     .unwrap();
//!
//! assert_eq!(config.app_name, "app name");
//! assert_eq!(config.db.name, "production");
//! assert_eq!(config.db.password, "secret");
//! assert_eq!(config.db.port, 3306);
//! ```
//!
//! Outside tests, [`load`] (or [`Configor::load`]) reads the live process
//! environment:
//!
//! ```rust,no_run
//! # use configor::{Configurable, Field, Schema};
//! # use serde::{Deserialize, Serialize};
//! # #[derive(Default, Serialize, Deserialize)]
//! # struct AppConfig { name: String }
//! # impl Configurable for AppConfig {
//! #     fn schema() -> Schema { Schema::new().field("name", Field::of::<String>()) }
//! # }
//! let mut config = AppConfig::default();
//! configor::load(&mut config, &["config/database.yml", "config/database.local.yml"]).unwrap();
//! ```
//!
//! ## Environment Variables
//!
//! Names join the prefix and the field path with `_`, upper-cased:
//!
//! ```bash
//! export CONFIGOR_APPNAME="my app"
//! export CONFIGOR_DB_NAME=production
//! export CONFIGOR_CONTACTS_0_EMAIL=ops@example.org
//! ```
//!
//! The prefix defaults to `Configor` (or the configured app name). It can be set
//! with [`Config::with_env_prefix`] or the `CONFIGOR_ENV_PREFIX` variable, and
//! `-` disables it. Lists and whole structs take YAML values such as
//! `- a\n- b` or `[a, b]`.
//!
//! ## Error Handling
//!
//! All operations return `ConfigResult<T>` which is an alias for `Result<T, ConfigError>`:
//!
//! ```rust
//! use configor::{ConfigError, Configor, Configurable, EnvSnapshot, Field, Schema};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Default, Serialize, Deserialize)]
//! struct Secrets {
//!     token: String,
//! }
//!
//! impl Configurable for Secrets {
//!     fn schema() -> Schema {
//!         Schema::new().field("token", Field::of::<String>().required())
//!     }
//! }
//!
//! let mut secrets = Secrets::default();
//! match Configor::default().load_with_env(&mut secrets, vec![], &EnvSnapshot::default()) {
//!     Err(ConfigError::MissingRequired { fields }) => assert_eq!(fields, vec!["token"]),
//!     other => panic!("unexpected result: {:?}", other.is_ok()),
//! }
//! ```

pub mod coerce;
pub mod config;
pub mod env;
pub mod error;
pub mod merge;
pub mod parser;
pub mod path;
pub mod schema;
pub mod source;
pub mod validate;
pub mod value;

// Re-export main types for convenience
pub use config::{load, BindingContext, Config, Configor};
pub use env::{EnvSnapshot, DEFAULT_ENV_PREFIX, ENV_NAME_VAR, ENV_PREFIX_VAR};
pub use error::{ConfigError, ConfigResult};
pub use parser::{ConfigParser, JsonParser, TomlParser, YamlParser};
pub use path::FieldPath;
pub use schema::{describe, Configurable, Field, FieldDescriptor, FieldKind, Schema};
pub use source::Source;
pub use value::ConfigValue;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
