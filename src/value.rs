//! Dynamic value tree that carries a destination through a load.

use crate::error::{ConfigError, ConfigResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Represents a configuration value that can be of various types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// String value
    String(String),
    /// Integer value
    Integer(i64),
    /// Unsigned integer above `i64::MAX`
    UInteger(u64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Array of values
    Array(Vec<ConfigValue>),
    /// Object/map of key-value pairs
    Object(HashMap<String, ConfigValue>),
    /// Null value
    Null,
}

impl ConfigValue {
    /// Builds the value tree of any serializable value.
    pub fn from_serialize<T: Serialize>(value: &T) -> ConfigResult<Self> {
        let json = serde_json::to_value(value)
            .map_err(|e| ConfigError::serialization(e.to_string()))?;
        Ok(ConfigValue::from(json))
    }

    /// Converts the tree back into a typed value.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> ConfigResult<T> {
        let json = serde_json::to_value(self)
            .map_err(|e| ConfigError::serialization(e.to_string()))?;
        serde_json::from_value(json).map_err(|e| {
            ConfigError::deserialization(format!("Failed to unmarshal configuration: {e}"))
        })
    }

    /// Returns the value as a string reference if it's a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an i64 if it's an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a u64 if it's a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ConfigValue::Integer(i) => u64::try_from(*i).ok(),
            ConfigValue::UInteger(u) => Some(*u),
            _ => None,
        }
    }

    /// Returns the value as a bool if it's a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as an array reference if it's an array.
    pub fn as_array(&self) -> Option<&Vec<ConfigValue>> {
        match self {
            ConfigValue::Array(arr) => Some(arr),
            _ => None,
        }
    }

    /// Returns the value as an object reference if it's an object.
    pub fn as_object(&self) -> Option<&HashMap<String, ConfigValue>> {
        match self {
            ConfigValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Returns the value as a mutable object if it's an object.
    pub fn as_object_mut(&mut self) -> Option<&mut HashMap<String, ConfigValue>> {
        match self {
            ConfigValue::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Checks if the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    /// Reports whether the value equals the zero value of its type.
    ///
    /// Objects are zero when every member is zero, which matches how a
    /// `Default` struct serializes.
    pub fn is_zero(&self) -> bool {
        match self {
            ConfigValue::String(s) => s.is_empty(),
            ConfigValue::Integer(i) => *i == 0,
            ConfigValue::UInteger(u) => *u == 0,
            ConfigValue::Float(f) => *f == 0.0,
            ConfigValue::Boolean(b) => !*b,
            ConfigValue::Array(arr) => arr.is_empty(),
            ConfigValue::Object(obj) => obj.values().all(ConfigValue::is_zero),
            ConfigValue::Null => true,
        }
    }

    /// Overlays `other` onto `self`.
    ///
    /// Objects merge key by key, everything else is replaced wholesale.
    /// A null overlay leaves the existing value untouched.
    pub fn merge_from(&mut self, other: ConfigValue) {
        match (self, other) {
            (_, ConfigValue::Null) => {}
            (ConfigValue::Object(base), ConfigValue::Object(overlay)) => {
                for (key, value) in overlay {
                    match base.get_mut(&key) {
                        Some(existing) => existing.merge_from(value),
                        None => {
                            if !value.is_null() {
                                base.insert(key, value);
                            }
                        }
                    }
                }
            }
            (slot, value) => *slot = value,
        }
    }

    /// Returns a short description of the value's type.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::String(_) => "String",
            ConfigValue::Integer(_) => "Integer",
            ConfigValue::UInteger(_) => "UInteger",
            ConfigValue::Float(_) => "Float",
            ConfigValue::Boolean(_) => "Boolean",
            ConfigValue::Array(_) => "Array",
            ConfigValue::Object(_) => "Object",
            ConfigValue::Null => "Null",
        }
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => ConfigValue::String(s),
            serde_json::Value::Number(n) => {
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
            serde_json::Value::Bool(b) => ConfigValue::Boolean(b),
            serde_json::Value::Array(arr) => {
                ConfigValue::Array(arr.into_iter().map(ConfigValue::from).collect())
            }
            serde_json::Value::Object(obj) => ConfigValue::Object(
                obj.into_iter()
                    .map(|(k, v)| (k, ConfigValue::from(v)))
                    .collect(),
            ),
            serde_json::Value::Null => ConfigValue::Null,
        }
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Integer(i)
    }
}

impl From<u64> for ConfigValue {
    fn from(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => ConfigValue::Integer(i),
            Err(_) => ConfigValue::UInteger(u),
        }
    }
}

impl From<f64> for ConfigValue {
    fn from(f: f64) -> Self {
        ConfigValue::Float(f)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Boolean(b)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(arr: Vec<ConfigValue>) -> Self {
        ConfigValue::Array(arr)
    }
}

impl From<HashMap<String, ConfigValue>> for ConfigValue {
    fn from(obj: HashMap<String, ConfigValue>) -> Self {
        ConfigValue::Object(obj)
    }
}
