//! Conversion of environment strings and default literals into field values.
//!
//! A single environment variable cannot hold a collection, so list and struct
//! values arrive as YAML text (`- a\n- b`, `[a, b]`, `{Name: x}`). Strings are
//! always taken verbatim, line breaks included.

use crate::error::{ConfigError, ConfigResult};
use crate::parser::yaml_to_config_value;
use crate::path::FieldPath;
use crate::schema::{FieldKind, ScalarKind};
use crate::value::ConfigValue;

/// Converts `raw` into a value of the field's kind.
///
/// # Errors
/// * `ConfigError::Coercion` - If `raw` does not parse as the target type, or
///   an integer falls outside the range of the field's Rust type
pub fn coerce(raw: &str, kind: &FieldKind, path: &FieldPath) -> ConfigResult<ConfigValue> {
    let fail = || ConfigError::coercion(path.to_string(), raw, kind.target_name());

    match kind {
        FieldKind::Scalar(scalar) => coerce_scalar(raw, *scalar).ok_or_else(fail),
        FieldKind::List(scalar) => match parse_yaml(raw) {
            Some(ConfigValue::Array(items)) => items
                .into_iter()
                .map(|item| coerce_item(item, *scalar))
                .collect::<Option<Vec<_>>>()
                .map(ConfigValue::Array)
                .ok_or_else(fail),
            _ => Err(fail()),
        },
        FieldKind::Struct(_) => match parse_yaml(raw) {
            Some(value @ ConfigValue::Object(_)) => Ok(value),
            _ => Err(fail()),
        },
        FieldKind::StructList(_) => match parse_yaml(raw) {
            Some(ConfigValue::Array(items)) if items.iter().all(|i| i.as_object().is_some()) => {
                Ok(ConfigValue::Array(items))
            }
            _ => Err(fail()),
        },
    }
}

/// Parses a boolean token, case-insensitively.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Some(true),
        "false" | "0" | "no" | "off" | "f" | "n" => Some(false),
        _ => None,
    }
}

fn coerce_scalar(raw: &str, kind: ScalarKind) -> Option<ConfigValue> {
    match kind {
        ScalarKind::Bool => parse_bool(raw).map(ConfigValue::Boolean),
        ScalarKind::Integer { min, max } => raw
            .trim()
            .parse::<i128>()
            .ok()
            .filter(|value| (min..=max).contains(value))
            .and_then(integer_value),
        ScalarKind::Float => raw.trim().parse::<f64>().ok().map(ConfigValue::Float),
        ScalarKind::String => Some(ConfigValue::String(raw.to_string())),
    }
}

fn integer_value(value: i128) -> Option<ConfigValue> {
    if let Ok(i) = i64::try_from(value) {
        return Some(ConfigValue::Integer(i));
    }
    u64::try_from(value).ok().map(ConfigValue::UInteger)
}

fn coerce_item(item: ConfigValue, kind: ScalarKind) -> Option<ConfigValue> {
    let text = match item {
        ConfigValue::String(s) => s,
        ConfigValue::Integer(i) => i.to_string(),
        ConfigValue::UInteger(u) => u.to_string(),
        ConfigValue::Float(f) => f.to_string(),
        ConfigValue::Boolean(b) => b.to_string(),
        ConfigValue::Array(_) | ConfigValue::Object(_) | ConfigValue::Null => return None,
    };
    coerce_scalar(&text, kind)
}

fn parse_yaml(raw: &str) -> Option<ConfigValue> {
    serde_yaml::from_str::<serde_yaml::Value>(raw)
        .ok()
        .map(yaml_to_config_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Configurable, Field, Scalar, Schema};
    use serde::{Deserialize, Serialize};

    fn path() -> FieldPath {
        FieldPath::root().key("DB").key("Port")
    }

    fn scalar<T: Scalar>() -> FieldKind {
        FieldKind::Scalar(T::KIND)
    }

    #[test]
    fn test_bool_tokens() {
        for token in ["1", "true", "TRUE", "True", "yes", "on"] {
            assert_eq!(
                coerce(token, &scalar::<bool>(), &path()).unwrap(),
                ConfigValue::Boolean(true),
                "Failed for token: {token}"
            );
        }
        for token in ["0", "false", "FALSE", "no", "off"] {
            assert_eq!(
                coerce(token, &scalar::<bool>(), &path()).unwrap(),
                ConfigValue::Boolean(false),
                "Failed for token: {token}"
            );
        }
        assert!(coerce("maybe", &scalar::<bool>(), &path()).is_err());
    }

    #[test]
    fn test_integers_respect_type_range() {
        assert_eq!(
            coerce("3306", &scalar::<u16>(), &path()).unwrap(),
            ConfigValue::Integer(3306)
        );
        assert_eq!(
            coerce(" -5 ", &scalar::<i32>(), &path()).unwrap(),
            ConfigValue::Integer(-5)
        );
        assert!(coerce("70000", &scalar::<u16>(), &path()).is_err());
        assert!(coerce("-1", &scalar::<u32>(), &path()).is_err());
        assert!(coerce("12ab", &scalar::<i64>(), &path()).is_err());
    }

    #[test]
    fn test_full_u64_range() {
        assert_eq!(
            coerce("18446744073709551615", &scalar::<u64>(), &path()).unwrap(),
            ConfigValue::UInteger(u64::MAX)
        );
        assert_eq!(
            coerce("42", &scalar::<u64>(), &path()).unwrap(),
            ConfigValue::Integer(42)
        );
        assert!(coerce("18446744073709551616", &scalar::<u64>(), &path()).is_err());
        assert!(coerce("9223372036854775808", &scalar::<i64>(), &path()).is_err());

        let list = FieldKind::List(u64::KIND);
        assert_eq!(
            coerce("[1, 18446744073709551615]", &list, &path()).unwrap(),
            ConfigValue::Array(vec![ConfigValue::Integer(1), ConfigValue::UInteger(u64::MAX)])
        );
    }

    #[test]
    fn test_coercion_error_names_field_and_value() {
        match coerce("abc", &scalar::<u16>(), &path()) {
            Err(ConfigError::Coercion { field, value, target }) => {
                assert_eq!(field, "DB.Port");
                assert_eq!(value, "abc");
                assert_eq!(target, "integer");
            }
            other => panic!("Expected Coercion error, got {other:?}"),
        }
    }

    #[test]
    fn test_floats() {
        assert_eq!(
            coerce("2.5", &scalar::<f64>(), &path()).unwrap(),
            ConfigValue::Float(2.5)
        );
        assert!(coerce("two", &scalar::<f32>(), &path()).is_err());
    }

    #[test]
    fn test_string_with_line_breaks_is_verbatim() {
        let raw = "Line one\nLine two\n- not a list item";
        assert_eq!(
            coerce(raw, &scalar::<String>(), &path()).unwrap(),
            ConfigValue::String(raw.to_string())
        );
    }

    #[test]
    fn test_string_list_from_yaml() {
        let kind = FieldKind::List(ScalarKind::String);
        let value = coerce("- http://example.org\n- http://jinzhu.me", &kind, &path()).unwrap();
        assert_eq!(
            value,
            ConfigValue::Array(vec![
                ConfigValue::from("http://example.org"),
                ConfigValue::from("http://jinzhu.me"),
            ])
        );

        let flow = coerce("[a, 80]", &kind, &path()).unwrap();
        assert_eq!(
            flow,
            ConfigValue::Array(vec![ConfigValue::from("a"), ConfigValue::from("80")])
        );
    }

    #[test]
    fn test_integer_list_checks_items() {
        let kind = FieldKind::List(u8::KIND);
        assert_eq!(
            coerce("[1, 2]", &kind, &path()).unwrap(),
            ConfigValue::Array(vec![ConfigValue::Integer(1), ConfigValue::Integer(2)])
        );
        assert!(coerce("[1, 300]", &kind, &path()).is_err());
        assert!(coerce("just text", &kind, &path()).is_err());
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct Point {
        x: i32,
    }

    impl Configurable for Point {
        fn schema() -> Schema {
            Schema::new().field("x", Field::of::<i32>())
        }
    }

    #[test]
    fn test_struct_values_from_yaml() {
        let kind = *Field::nested::<Point>().kind();
        let value = coerce("{x: 3}", &kind, &path()).unwrap();
        assert_eq!(value.as_object().unwrap()["x"], ConfigValue::Integer(3));
        assert!(coerce("- 1", &kind, &path()).is_err());

        let list = *Field::nested_list::<Point>().kind();
        let value = coerce("- x: 1\n- x: 2", &list, &path()).unwrap();
        assert_eq!(value.as_array().unwrap().len(), 2);
        assert!(coerce("- 1", &list, &path()).is_err());
    }
}
