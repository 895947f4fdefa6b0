//! Final pass over the merged tree: defaults, required fields and the strict
//! key check.

use crate::coerce::coerce;
use crate::error::ConfigResult;
use crate::merge::over_zero;
use crate::path::FieldPath;
use crate::schema::{FieldDescriptor, FieldKind};
use crate::value::ConfigValue;

/// Applies `default` literals to zero fields and collects blank required ones.
///
/// Returns the display paths of every required field still zero, in visiting
/// order. Nested structs and struct-slice elements are checked too.
///
/// # Errors
/// * `ConfigError::Coercion` - If a default literal does not fit its field
pub fn apply_defaults(tree: &mut ConfigValue, fields: &[FieldDescriptor]) -> ConfigResult<Vec<String>> {
    let mut missing = Vec::new();
    apply_fields(tree, fields, &FieldPath::root(), &mut missing)?;
    Ok(missing)
}

fn apply_fields(
    tree: &mut ConfigValue,
    fields: &[FieldDescriptor],
    path: &FieldPath,
    missing: &mut Vec<String>,
) -> ConfigResult<()> {
    let Some(obj) = tree.as_object_mut() else {
        return Ok(());
    };

    for field in fields {
        let field_path = path.key(&field.key);

        if let Some(literal) = &field.default {
            let blank = obj.get(&field.key).map_or(true, ConfigValue::is_zero);
            if blank {
                let mut value = coerce(literal, &field.kind, &field_path)?;
                if let FieldKind::Struct(nested) | FieldKind::StructList(nested) = field.kind {
                    value = over_zero(&nested, value)?;
                }
                tracing::trace!(field = %field_path, "applied default");
                obj.insert(field.key.clone(), value);
            }
        }

        match field.kind {
            FieldKind::Struct(nested) => {
                let slot = obj.entry(field.key.clone()).or_insert(ConfigValue::Null);
                if slot.as_object().is_none() {
                    *slot = nested.zero()?;
                }
                apply_fields(slot, &nested.descriptors(), &field_path, missing)?;
            }
            FieldKind::StructList(nested) => {
                if let Some(ConfigValue::Array(items)) = obj.get_mut(&field.key) {
                    let descriptors = nested.descriptors();
                    for (index, item) in items.iter_mut().enumerate() {
                        apply_fields(item, &descriptors, &field_path.index(index), missing)?;
                    }
                }
            }
            FieldKind::Scalar(_) | FieldKind::List(_) => {}
        }

        if field.required && obj.get(&field.key).map_or(true, ConfigValue::is_zero) {
            missing.push(field_path.to_string());
        }
    }

    Ok(())
}

/// Lists keys of `source` that the destination does not accept.
///
/// A key is accepted when it appears in `shape`, the destination's own
/// serialized tree, or is declared in `fields`. Declared structs and struct
/// slices are checked recursively.
pub fn unmatched_keys(
    source: &ConfigValue,
    shape: &ConfigValue,
    fields: &[FieldDescriptor],
) -> ConfigResult<Vec<String>> {
    let mut unmatched = Vec::new();
    collect_unmatched(source, shape, fields, &FieldPath::root(), &mut unmatched)?;
    unmatched.sort();
    Ok(unmatched)
}

fn collect_unmatched(
    source: &ConfigValue,
    shape: &ConfigValue,
    fields: &[FieldDescriptor],
    path: &FieldPath,
    unmatched: &mut Vec<String>,
) -> ConfigResult<()> {
    let Some(obj) = source.as_object() else {
        return Ok(());
    };
    let known = shape.as_object();

    for (key, value) in obj {
        let key_path = path.key(key);
        let field = fields.iter().find(|f| &f.key == key);
        let existing = known.and_then(|k| k.get(key));

        if field.is_none() && existing.is_none() {
            unmatched.push(key_path.to_string());
            continue;
        }

        match field.map(|f| f.kind) {
            Some(FieldKind::Struct(nested)) => {
                let zero = nested.zero()?;
                let inner_shape = existing.filter(|v| v.as_object().is_some()).unwrap_or(&zero);
                collect_unmatched(value, inner_shape, &nested.descriptors(), &key_path, unmatched)?;
            }
            Some(FieldKind::StructList(nested)) => {
                if let ConfigValue::Array(items) = value {
                    let zero = nested.zero()?;
                    let descriptors = nested.descriptors();
                    for (index, item) in items.iter().enumerate() {
                        collect_unmatched(item, &zero, &descriptors, &key_path.index(index), unmatched)?;
                    }
                }
            }
            _ => {}
        }
    }

    Ok(())
}
