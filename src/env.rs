//! Environment variable naming and lookup.
//!
//! Field paths map onto variable names as `{PREFIX}_{SEGMENT}_..._{SEGMENT}`,
//! with numeric segments addressing elements of struct slices:
//!
//! ```text
//! CONFIGOR_DB_NAME             -> DB.Name
//! CONFIGOR_CONTACTS_0_EMAIL    -> Contacts[0].Email
//! ```
//!
//! Lookups go through an [`EnvSnapshot`] taken once per load, so a load never
//! observes the process environment changing underneath it.

use crate::path::FieldPath;
use std::collections::HashMap;
use std::env;

/// Reserved variable that overrides the prefix; `-` disables prefixing.
pub const ENV_PREFIX_VAR: &str = "CONFIGOR_ENV_PREFIX";

/// Reserved variable naming the running environment (development, test, ...).
pub const ENV_NAME_VAR: &str = "CONFIGOR_ENV";

/// Prefix used when neither the options nor the environment name one.
pub const DEFAULT_ENV_PREFIX: &str = "Configor";

/// Highest struct-slice index the environment may create elements up to.
///
/// Indices inside a slice already loaded from files are always accepted.
pub const MAX_ENV_SLICE_INDEX: usize = 4096;

/// Immutable copy of environment variables consulted during one load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Captures the current process environment.
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    pub fn capture() -> Self {
        let vars = env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Returns the value of `name`, treating an empty value as unset.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    /// Iterates over variable names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Resolves the prefix applied to derived variable names.
///
/// Returns `None` when prefixing is disabled. Precedence, highest first: a `-`
/// from either the reserved variable or the options, the configured prefix,
/// any other value of [`ENV_PREFIX_VAR`], then `app_name` or
/// [`DEFAULT_ENV_PREFIX`].
pub fn resolve_prefix(
    configured: Option<&str>,
    app_name: Option<&str>,
    env: &EnvSnapshot,
) -> Option<String> {
    let configured = configured.filter(|p| !p.is_empty());
    let from_env = env.get(ENV_PREFIX_VAR);

    if from_env == Some("-") || configured == Some("-") {
        return None;
    }

    let prefix = configured
        .or(from_env)
        .or(app_name.filter(|name| !name.is_empty()))
        .unwrap_or(DEFAULT_ENV_PREFIX);
    Some(prefix.to_string())
}

/// Joins the prefix and path into a variable name, keeping the declared case.
pub fn env_name(prefix: Option<&str>, path: &FieldPath) -> String {
    let segments = path.env_segments();
    match prefix {
        Some(prefix) if segments.is_empty() => prefix.to_string(),
        Some(prefix) => format!("{prefix}_{segments}"),
        None => segments,
    }
}

/// Returns the names to try for a field, in lookup order.
///
/// The upper-cased name comes first, then the declared-case name for
/// environments that still export mixed-case variables.
pub fn candidates(prefix: Option<&str>, path: &FieldPath) -> Vec<String> {
    let name = env_name(prefix, path);
    let upper = name.to_uppercase();
    if upper == name {
        vec![upper]
    } else {
        vec![upper, name]
    }
}

/// Looks up the first candidate that is set, returning its name and value.
pub fn lookup<'a>(env: &'a EnvSnapshot, names: &[String]) -> Option<(String, &'a str)> {
    names
        .iter()
        .find_map(|name| env.get(name).map(|value| (name.clone(), value)))
}

/// Finds the highest struct-slice index referenced under `base`.
///
/// Returns the index together with the variable that names it. A variable
/// counts when its upper-cased name is `{BASE}_{digits}_...`. Names are
/// compared case-insensitively so mixed-case variables are honoured too.
/// Indices too large for `usize` saturate to `usize::MAX`.
pub fn max_index<'a>(env: &'a EnvSnapshot, base: &str) -> Option<(usize, &'a str)> {
    let needle = format!("{}_", base.to_uppercase());

    env.names()
        .filter(|name| env.get(name).is_some())
        .filter_map(|name| {
            let upper = name.to_uppercase();
            let rest = upper.strip_prefix(&needle)?;
            let (digits, tail) = rest.split_once('_')?;
            let numeric = !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit());
            if !numeric || tail.is_empty() {
                return None;
            }
            Some((digits.parse::<usize>().unwrap_or(usize::MAX), name))
        })
        .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(a.1)))
}
