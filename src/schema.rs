//! Field metadata for configuration types.
//!
//! Rust has no runtime reflection, so every configuration type lists its fields
//! once in a [`Schema`]. The binder reads the schema through [`describe`] to
//! learn each field's kind and contracts (`required`, `default`, `env`,
//! `anonymous`).
//!
//! ```rust
//! use configor::schema::{Configurable, Field, Schema};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! #[serde(rename_all = "PascalCase")]
//! struct Database {
//!     name: String,
//!     port: u16,
//!     password: String,
//! }
//!
//! impl Configurable for Database {
//!     fn schema() -> Schema {
//!         Schema::new()
//!             .field("Name", Field::of::<String>())
//!             .field("Port", Field::of::<u16>().default("3306"))
//!             .field("Password", Field::of::<String>().required().env("DBPassword"))
//!     }
//! }
//!
//! let fields = configor::schema::describe::<Database>();
//! assert_eq!(fields.len(), 3);
//! assert!(fields[2].required);
//! ```

use crate::error::ConfigResult;
use crate::value::ConfigValue;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// A type that can be bound from defaults, files and the environment.
///
/// `Default` supplies the zero value used for newly created slice elements;
/// `Serialize`/`Deserialize` carry the value to and from the merge tree.
pub trait Configurable: Serialize + DeserializeOwned + Default {
    /// Lists the fields the binder manages.
    fn schema() -> Schema;
}

/// The primitive type behind a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    Bool,
    /// Integer with the inclusive range of the Rust type
    Integer { min: i128, max: i128 },
    Float,
    String,
}

impl ScalarKind {
    pub fn name(&self) -> &'static str {
        match self {
            ScalarKind::Bool => "bool",
            ScalarKind::Integer { .. } => "integer",
            ScalarKind::Float => "float",
            ScalarKind::String => "string",
        }
    }
}

/// Rust types that map onto a [`ScalarKind`].
pub trait Scalar {
    const KIND: ScalarKind;
}

impl Scalar for bool {
    const KIND: ScalarKind = ScalarKind::Bool;
}

impl Scalar for String {
    const KIND: ScalarKind = ScalarKind::String;
}

impl Scalar for f32 {
    const KIND: ScalarKind = ScalarKind::Float;
}

impl Scalar for f64 {
    const KIND: ScalarKind = ScalarKind::Float;
}

impl<T: Scalar> Scalar for Option<T> {
    const KIND: ScalarKind = T::KIND;
}

macro_rules! integer_scalar {
    ($($t:ty),*) => {
        $(
            impl Scalar for $t {
                const KIND: ScalarKind = ScalarKind::Integer {
                    min: <$t>::MIN as i128,
                    max: <$t>::MAX as i128,
                };
            }
        )*
    };
}

integer_scalar!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

/// Handle on a nested configuration type.
#[derive(Clone, Copy)]
pub struct Nested {
    type_name: &'static str,
    fields: fn() -> Vec<FieldDescriptor>,
    zero: fn() -> ConfigResult<ConfigValue>,
}

impl Nested {
    pub fn of<T: Configurable>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            fields: describe::<T>,
            zero: zero_tree::<T>,
        }
    }

    /// Descriptors of the nested type, anonymous structs already flattened.
    pub fn descriptors(&self) -> Vec<FieldDescriptor> {
        (self.fields)()
    }

    /// Value tree of the nested type's `Default`.
    pub fn zero(&self) -> ConfigResult<ConfigValue> {
        (self.zero)()
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Nested {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Nested").field(&self.type_name).finish()
    }
}

fn zero_tree<T: Configurable>() -> ConfigResult<ConfigValue> {
    ConfigValue::from_serialize(&T::default())
}

/// Shape of a field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Scalar(ScalarKind),
    /// A slice of scalars, replaced wholesale by any source
    List(ScalarKind),
    Struct(Nested),
    /// A slice of structs, addressable per index from the environment
    StructList(Nested),
}

impl FieldKind {
    /// Human readable target name used in coercion errors.
    pub fn target_name(&self) -> String {
        match self {
            FieldKind::Scalar(kind) => kind.name().to_string(),
            FieldKind::List(kind) => format!("list of {}", kind.name()),
            FieldKind::Struct(nested) => nested.type_name().to_string(),
            FieldKind::StructList(nested) => format!("list of {}", nested.type_name()),
        }
    }
}

/// Metadata for one field, as declared in a [`Schema`].
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Serialized key of the field, also its environment path segment
    pub key: String,
    pub kind: FieldKind,
    pub required: bool,
    /// Literal applied when the field is still zero after files and environment
    pub default: Option<String>,
    /// Environment variable name used verbatim instead of the derived one
    pub env: Option<String>,
    /// Set on fields inlined from an embedded struct
    pub anonymous: bool,
}

/// Builder for one field's metadata.
#[derive(Debug, Clone)]
pub struct Field {
    kind: FieldKind,
    required: bool,
    default: Option<String>,
    env: Option<String>,
    anonymous: bool,
}

impl Field {
    fn with_kind(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            default: None,
            env: None,
            anonymous: false,
        }
    }

    /// A scalar field of type `T`.
    pub fn of<T: Scalar>() -> Self {
        Self::with_kind(FieldKind::Scalar(T::KIND))
    }

    /// A `Vec<T>` field of scalars.
    pub fn list<T: Scalar>() -> Self {
        Self::with_kind(FieldKind::List(T::KIND))
    }

    /// A nested struct field.
    pub fn nested<T: Configurable>() -> Self {
        Self::with_kind(FieldKind::Struct(Nested::of::<T>()))
    }

    /// A `Vec<T>` field of nested structs.
    pub fn nested_list<T: Configurable>() -> Self {
        Self::with_kind(FieldKind::StructList(Nested::of::<T>()))
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default(mut self, literal: impl Into<String>) -> Self {
        self.default = Some(literal.into());
        self
    }

    /// Reads the field from exactly this variable instead of the derived names.
    ///
    /// On a struct slice the name covers the whole slice only. Indexed element
    /// variables keep the path-derived form `{PREFIX}_{FIELD}_{N}_{SUBFIELD}`.
    pub fn env(mut self, name: impl Into<String>) -> Self {
        self.env = Some(name.into());
        self
    }

    /// Marks a nested struct as embedded.
    ///
    /// Its fields are treated as if declared on the parent and add no path
    /// segment. The Rust field must carry `#[serde(flatten)]`.
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }
}

/// The ordered list of fields a [`Configurable`] type exposes.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<FieldDescriptor>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a field under its serialized key.
    pub fn field(mut self, key: impl Into<String>, field: Field) -> Self {
        self.fields.push(FieldDescriptor {
            key: key.into(),
            kind: field.kind,
            required: field.required,
            default: field.default,
            env: field.env,
            anonymous: field.anonymous,
        });
        self
    }

    /// Declares an anonymous embedded struct (a `#[serde(flatten)]` field).
    pub fn embed<T: Configurable>(self) -> Self {
        let key = std::any::type_name::<T>();
        self.field(key, Field::nested::<T>().anonymous())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Returns the field descriptors of `T`.
///
/// Anonymous struct fields are replaced by their own descriptors, so embedded
/// types contribute fields at the parent's depth and never a path segment.
pub fn describe<T: Configurable>() -> Vec<FieldDescriptor> {
    flatten(T::schema().fields)
}

fn flatten(fields: Vec<FieldDescriptor>) -> Vec<FieldDescriptor> {
    let mut out = Vec::with_capacity(fields.len());
    for field in fields {
        match field.kind {
            FieldKind::Struct(nested) if field.anonymous => {
                out.extend(nested.descriptors().into_iter().map(|mut inner| {
                    inner.anonymous = true;
                    inner
                }));
            }
            _ => out.push(field),
        }
    }
    out
}
