//! Configuration format parsers for different file types.
//!
//! Each parser implements the [`ConfigParser`] trait and turns source text into
//! a [`ConfigValue`] tree whose root is an object.
//!
//! ## Supported Formats
//!
//! - **JSON** - `.json`
//! - **YAML** - `.yaml`, `.yml`
//! - **TOML** - `.toml`
//!
//! ## Parser Detection
//!
//! ```rust
//! use configor::parser::detect_parser_by_extension;
//!
//! let yaml_parser = detect_parser_by_extension("yml").unwrap();
//! assert_eq!(yaml_parser.name(), "YAML");
//! assert!(detect_parser_by_extension("ini").is_err());
//! ```
//!
//! Sources without a recognised extension go through [`parse_any`], which
//! tries every format in turn.

use crate::error::{ConfigError, ConfigResult};
use crate::value::ConfigValue;
use std::collections::HashMap;

/// Trait for parsing configuration text in one format.
///
/// Implementations must be `Send + Sync` so that sources can be prepared on one
/// thread and loaded on another.
pub trait ConfigParser: Send + Sync {
    /// Parses configuration content into an object tree.
    ///
    /// # Errors
    /// * `ConfigError::Parse` - If the content has syntax errors or its root is
    ///   not a mapping
    fn parse(&self, content: &str) -> ConfigResult<ConfigValue>;

    /// Returns the file extensions (without the dot) handled by this parser.
    fn supported_extensions(&self) -> &[&str];

    /// Returns a human-readable name for this parser.
    fn name(&self) -> &str;
}

/// Determines the appropriate parser based on file extension.
///
/// The extension matching is case-insensitive.
///
/// # Errors
/// * `ConfigError::UnsupportedFormat` - If the extension is not supported
pub fn detect_parser_by_extension(extension: &str) -> ConfigResult<Box<dyn ConfigParser>> {
    match extension.to_lowercase().as_str() {
        "json" => Ok(Box::new(JsonParser)),
        "yaml" | "yml" => Ok(Box::new(YamlParser)),
        "toml" => Ok(Box::new(TomlParser)),
        _ => Err(ConfigError::UnsupportedFormat),
    }
}

/// Parses content of unknown format by trying TOML, YAML and JSON in turn.
///
/// YAML accepts almost any text as a scalar document, so a result is only
/// taken from a parser that yields a mapping at the root.
pub fn parse_any(source_name: &str, content: &str) -> ConfigResult<ConfigValue> {
    let parsers: [&dyn ConfigParser; 3] = [&TomlParser, &YamlParser, &JsonParser];
    let mut failures = Vec::new();

    for parser in parsers {
        match parser.parse(content) {
            Ok(tree) => return Ok(tree),
            Err(err) => failures.push(format!("{}: {}", parser.name(), err)),
        }
    }

    Err(ConfigError::parse_error(
        source_name,
        format!("failed to decode config ({})", failures.join("; ")),
    ))
}

/// JSON configuration parser.
pub struct JsonParser;

impl ConfigParser for JsonParser {
    fn parse(&self, content: &str) -> ConfigResult<ConfigValue> {
        let value: serde_json::Value = serde_json::from_str(content)
            .map_err(|e| ConfigError::parse_error("JSON", e.to_string()))?;

        match value {
            serde_json::Value::Object(_) => Ok(ConfigValue::from(value)),
            _ => Err(ConfigError::parse_error("JSON", "Root must be an object")),
        }
    }

    fn supported_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn name(&self) -> &str {
        "JSON"
    }
}

/// YAML configuration parser.
///
/// An empty document parses as an empty object.
pub struct YamlParser;

impl ConfigParser for YamlParser {
    fn parse(&self, content: &str) -> ConfigResult<ConfigValue> {
        let value: serde_yaml::Value = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::parse_error("YAML", e.to_string()))?;

        match value {
            serde_yaml::Value::Mapping(_) => Ok(yaml_to_config_value(value)),
            serde_yaml::Value::Null => Ok(ConfigValue::Object(HashMap::new())),
            _ => Err(ConfigError::parse_error(
                "YAML",
                "Root must be a mapping/object",
            )),
        }
    }

    fn supported_extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }

    fn name(&self) -> &str {
        "YAML"
    }
}

/// TOML configuration parser.
///
/// Datetimes are carried as strings.
pub struct TomlParser;

impl ConfigParser for TomlParser {
    fn parse(&self, content: &str) -> ConfigResult<ConfigValue> {
        let table: toml::Table =
            toml::from_str(content).map_err(|e| ConfigError::parse_error("TOML", e.to_string()))?;

        Ok(toml_to_config_value(toml::Value::Table(table)))
    }

    fn supported_extensions(&self) -> &[&str] {
        &["toml"]
    }

    fn name(&self) -> &str {
        "TOML"
    }
}

pub(crate) fn yaml_to_config_value(value: serde_yaml::Value) -> ConfigValue {
    match value {
        serde_yaml::Value::String(s) => ConfigValue::String(s),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                ConfigValue::Integer(i)
            } else if let Some(u) = n.as_u64() {
                ConfigValue::UInteger(u)
            } else if let Some(f) = n.as_f64() {
                ConfigValue::Float(f)
            } else {
                ConfigValue::Null
            }
        }
        serde_yaml::Value::Bool(b) => ConfigValue::Boolean(b),
        serde_yaml::Value::Sequence(arr) => {
            ConfigValue::Array(arr.into_iter().map(yaml_to_config_value).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let mut result = HashMap::new();
            for (k, v) in map {
                let key_str = if let serde_yaml::Value::String(key) = k {
                    key
                } else {
                    yaml_value_to_string(&k)
                };
                result.insert(key_str, yaml_to_config_value(v));
            }
            ConfigValue::Object(result)
        }
        serde_yaml::Value::Null => ConfigValue::Null,
        serde_yaml::Value::Tagged(tagged) => yaml_to_config_value(tagged.value),
    }
}

fn yaml_value_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        _ => format!("{value:?}"),
    }
}

fn toml_to_config_value(value: toml::Value) -> ConfigValue {
    match value {
        toml::Value::String(s) => ConfigValue::String(s),
        toml::Value::Integer(i) => ConfigValue::Integer(i),
        toml::Value::Float(f) => ConfigValue::Float(f),
        toml::Value::Boolean(b) => ConfigValue::Boolean(b),
        toml::Value::Array(arr) => {
            ConfigValue::Array(arr.into_iter().map(toml_to_config_value).collect())
        }
        toml::Value::Table(table) => ConfigValue::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_config_value(v)))
                .collect(),
        ),
        toml::Value::Datetime(dt) => ConfigValue::String(dt.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_detection() {
        assert_eq!(detect_parser_by_extension("json").unwrap().name(), "JSON");
        assert_eq!(detect_parser_by_extension("YAML").unwrap().name(), "YAML");
        assert_eq!(detect_parser_by_extension("yml").unwrap().name(), "YAML");
        assert_eq!(detect_parser_by_extension("toml").unwrap().name(), "TOML");
        assert!(matches!(
            detect_parser_by_extension("ini"),
            Err(ConfigError::UnsupportedFormat)
        ));
    }

    #[test]
    fn test_json_parser_nested_object() {
        let content = r#"{"DB": {"Name": "app", "Port": 3306}, "Hosts": ["a", "b"]}"#;
        let tree = JsonParser.parse(content).unwrap();

        let db = tree.as_object().unwrap()["DB"].as_object().unwrap();
        assert_eq!(db["Name"], ConfigValue::from("app"));
        assert_eq!(db["Port"], ConfigValue::Integer(3306));
        assert_eq!(tree.as_object().unwrap()["Hosts"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_integers_above_i64_max_stay_integers() {
        let json = JsonParser.parse(r#"{"Id": 18446744073709551615}"#).unwrap();
        assert_eq!(json.as_object().unwrap()["Id"], ConfigValue::UInteger(u64::MAX));

        let yaml = YamlParser.parse("Id: 18446744073709551615\nSmall: 5").unwrap();
        let obj = yaml.as_object().unwrap();
        assert_eq!(obj["Id"], ConfigValue::UInteger(u64::MAX));
        assert_eq!(obj["Small"], ConfigValue::Integer(5));
    }

    #[test]
    fn test_json_parser_non_object_root() {
        let result = JsonParser.parse("[1, 2, 3]");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_json_parser_invalid_syntax() {
        let result = JsonParser.parse(r#"{"invalid": json}"#);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_yaml_parser_array_of_objects() {
        let content = r#"
Contacts:
  - Name: Jinzhu
    Email: wosmvp@gmail.com
  - Name: Other
    Email: other@example.org
"#;
        let tree = YamlParser.parse(content).unwrap();
        let contacts = tree.as_object().unwrap()["Contacts"].as_array().unwrap();
        assert_eq!(contacts.len(), 2);
        assert_eq!(
            contacts[1].as_object().unwrap()["Email"],
            ConfigValue::from("other@example.org")
        );
    }

    #[test]
    fn test_yaml_parser_empty_document() {
        let tree = YamlParser.parse("").unwrap();
        assert_eq!(tree, ConfigValue::Object(HashMap::new()));
    }

    #[test]
    fn test_yaml_parser_scalar_root() {
        let result = YamlParser.parse("just a string");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_toml_parser_tables() {
        let content = r#"
APPName = "configor"

[DB]
Port = 3306
SSL = true

[[Contacts]]
Email = "a@example.org"
"#;
        let tree = TomlParser.parse(content).unwrap();
        let obj = tree.as_object().unwrap();
        assert_eq!(obj["APPName"], ConfigValue::from("configor"));
        assert_eq!(
            obj["DB"].as_object().unwrap()["SSL"],
            ConfigValue::Boolean(true)
        );
        assert_eq!(obj["Contacts"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_any_detects_each_format() {
        let toml = parse_any("cfg", "Name = \"t\"").unwrap();
        assert_eq!(toml.as_object().unwrap()["Name"], ConfigValue::from("t"));

        let yaml = parse_any("cfg", "Name: y\nPort: 1").unwrap();
        assert_eq!(yaml.as_object().unwrap()["Port"], ConfigValue::Integer(1));

        let json = parse_any("cfg", r#"{"Name": "j"}"#).unwrap();
        assert_eq!(json.as_object().unwrap()["Name"], ConfigValue::from("j"));
    }

    #[test]
    fn test_parse_any_reports_source_name() {
        match parse_any("settings.conf", "- not\n- a mapping") {
            Err(ConfigError::Parse { source_name, message }) => {
                assert_eq!(source_name, "settings.conf");
                assert!(message.contains("failed to decode config"));
            }
            other => panic!("Expected Parse error, got {other:?}"),
        }
    }
}
