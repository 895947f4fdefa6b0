//! Layering of file trees and environment overrides onto a destination tree.
//!
//! Files are merged first, in load order. The environment is then overlaid by
//! walking the destination's descriptors, so only declared fields are ever
//! looked up.

use crate::coerce::coerce;
use crate::config::BindingContext;
use crate::env::{candidates, env_name, lookup, max_index, MAX_ENV_SLICE_INDEX};
use crate::error::{ConfigError, ConfigResult};
use crate::path::FieldPath;
use crate::schema::{FieldDescriptor, FieldKind, Nested};
use crate::value::ConfigValue;

/// Deep-merges each layer onto `tree`, later layers winning.
///
/// Objects merge key by key; arrays and scalars are replaced wholesale, and a
/// null in a layer leaves the existing value alone.
pub fn layer_sources<I>(tree: &mut ConfigValue, layers: I)
where
    I: IntoIterator<Item = ConfigValue>,
{
    for layer in layers {
        tree.merge_from(layer);
    }
}

/// Overlays environment variables onto every field described by `fields`.
///
/// Struct slices grow to cover the highest index found in the environment;
/// new elements start from the element type's `Default`. Indexed variables
/// are always named from the field path, even when the field has an explicit
/// `env` name; that name only addresses the whole slice.
///
/// # Errors
/// * `ConfigError::Coercion` - If a set variable does not fit its field
/// * `ConfigError::SliceIndex` - If a variable would grow a struct slice past
///   [`MAX_ENV_SLICE_INDEX`]
pub fn overlay_env(
    tree: &mut ConfigValue,
    fields: &[FieldDescriptor],
    ctx: &BindingContext<'_>,
) -> ConfigResult<()> {
    overlay_fields(tree, fields, &FieldPath::root(), ctx)
}

fn overlay_fields(
    tree: &mut ConfigValue,
    fields: &[FieldDescriptor],
    path: &FieldPath,
    ctx: &BindingContext<'_>,
) -> ConfigResult<()> {
    let Some(obj) = tree.as_object_mut() else {
        return Ok(());
    };

    for field in fields {
        let field_path = path.key(&field.key);
        let names = match &field.env {
            Some(name) => vec![name.clone()],
            None => candidates(ctx.prefix.as_deref(), &field_path),
        };
        let found = lookup(ctx.env, &names);

        match field.kind {
            FieldKind::Scalar(_) | FieldKind::List(_) => {
                if let Some((name, raw)) = found {
                    let value = coerce(raw, &field.kind, &field_path)?;
                    tracing::debug!(variable = %name, field = %field_path, "applied environment override");
                    obj.insert(field.key.clone(), value);
                }
            }
            FieldKind::Struct(nested) => {
                let slot = obj.entry(field.key.clone()).or_insert(ConfigValue::Null);
                if let Some((name, raw)) = found {
                    *slot = over_zero(&nested, coerce(raw, &field.kind, &field_path)?)?;
                    tracing::debug!(variable = %name, field = %field_path, "applied environment override");
                } else if slot.as_object().is_none() {
                    *slot = nested.zero()?;
                }
                overlay_fields(slot, &nested.descriptors(), &field_path, ctx)?;
            }
            FieldKind::StructList(nested) => {
                let slot = obj.entry(field.key.clone()).or_insert(ConfigValue::Null);
                if let Some((name, raw)) = found {
                    *slot = over_zero(&nested, coerce(raw, &field.kind, &field_path)?)?;
                    tracing::debug!(variable = %name, field = %field_path, "applied environment override");
                }
                if !matches!(slot, ConfigValue::Array(_)) {
                    *slot = ConfigValue::Array(Vec::new());
                }
                let ConfigValue::Array(items) = slot else {
                    continue;
                };

                let base = env_name(ctx.prefix.as_deref(), &field_path);
                let zero = nested.zero()?;
                if let Some((max, variable)) = max_index(ctx.env, &base) {
                    if max >= items.len() {
                        if max > MAX_ENV_SLICE_INDEX {
                            return Err(ConfigError::SliceIndex {
                                variable: variable.to_string(),
                                index: max,
                                limit: MAX_ENV_SLICE_INDEX,
                            });
                        }
                        items.resize(max + 1, zero.clone());
                    }
                }

                let descriptors = nested.descriptors();
                for (index, item) in items.iter_mut().enumerate() {
                    if item.as_object().is_none() {
                        *item = zero.clone();
                    }
                    overlay_fields(item, &descriptors, &field_path.index(index), ctx)?;
                }
            }
        }
    }

    Ok(())
}

/// Lays a whole-struct value over the nested type's zero tree, so keys the
/// value leaves out still deserialize.
pub(crate) fn over_zero(nested: &Nested, value: ConfigValue) -> ConfigResult<ConfigValue> {
    match value {
        ConfigValue::Array(items) => items
            .into_iter()
            .map(|item| over_zero(nested, item))
            .collect::<ConfigResult<Vec<_>>>()
            .map(ConfigValue::Array),
        value => {
            let mut base = nested.zero()?;
            base.merge_from(value);
            Ok(base)
        }
    }
}
