//! Structural queries over a schema tree.
//!
//! Everything here is read-only and side-effect free apart from invoking
//! default thunks.

use serde_json::{Map, Value};

use crate::schema::{ScalarKind, SchemaRef, WrapperKind};

/// Upper bound on the layers walked from one node. Lazy schemas can refer
/// back to themselves, so an unbounded walk might never reach a fixed point.
pub const MAX_LAYER_DEPTH: usize = 64;

pub fn classify(node: &SchemaRef) -> WrapperKind {
    node.wrapper_kind()
}

/// Removes one wrapper layer. Terminal nodes come back unchanged.
pub fn unwrap_once(node: &SchemaRef) -> SchemaRef {
    if node.wrapper_kind().is_wrapper() {
        node.inner().unwrap_or_else(|| node.clone())
    } else {
        node.clone()
    }
}

/// Iterator over a node and its successive unwraps.
#[derive(Debug, Clone)]
pub struct Layers {
    next: Option<SchemaRef>,
    remaining: usize,
}

impl Iterator for Layers {
    type Item = SchemaRef;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let unwrapped = unwrap_once(&current);
        if unwrapped.id() != current.id() {
            self.next = Some(unwrapped);
        }
        Some(current)
    }
}

/// Yields `node`, then each unwrapped layer, stopping at the first terminal
/// node. Calling it again restarts the walk.
pub fn iterate_layers(node: &SchemaRef) -> Layers {
    Layers {
        next: Some(node.clone()),
        remaining: MAX_LAYER_DEPTH,
    }
}

/// The innermost terminal node (or the last layer reached).
pub fn unwrap_all(node: &SchemaRef) -> SchemaRef {
    iterate_layers(node).last().unwrap_or_else(|| node.clone())
}

/// The object node under `node`'s single-child wrappers, if any. Array
/// elements are not searched.
pub fn object_layer(node: &SchemaRef) -> Option<SchemaRef> {
    for layer in iterate_layers(node) {
        if layer.shape().is_some() {
            return Some(layer);
        }
        if layer.wrapper_kind() == WrapperKind::Array {
            break;
        }
    }
    None
}

/// Own description, else the first non-empty one found through the
/// single-child wrappers. Never looks into array elements or object fields.
pub fn extract_description(node: &SchemaRef) -> Option<String> {
    for layer in iterate_layers(node) {
        if let Some(description) = layer.description() {
            if !description.is_empty() {
                return Some(description.to_string());
            }
        }
        if layer.wrapper_kind() == WrapperKind::Array {
            break;
        }
    }
    None
}

/// Human-readable name of a node's type, used to ask scalar providers for a
/// mapping and in error messages.
pub fn canonical_type_name(node: &SchemaRef) -> String {
    canonical_name_at(node, 0)
}

fn canonical_name_at(node: &SchemaRef, depth: usize) -> String {
    if depth >= MAX_LAYER_DEPTH {
        return "Unknown".to_string();
    }
    let inner = || unwrap_once(node);
    let nested = |child: &SchemaRef| canonical_name_at(child, depth + 1);

    match node.wrapper_kind() {
        WrapperKind::Array => return format!("Array<{}>", nested(&inner())),
        WrapperKind::Optional => return format!("Optional<{}>", nested(&inner())),
        WrapperKind::Nullable => return format!("Nullable<{}>", nested(&inner())),
        WrapperKind::Promise => return format!("Promise<{}>", nested(&inner())),
        WrapperKind::Default
        | WrapperKind::Transform
        | WrapperKind::Effect
        | WrapperKind::Catch
        | WrapperKind::Lazy => {
            let unwrapped = inner();
            if unwrapped.id() != node.id() {
                return nested(&unwrapped);
            }
            return "Unknown".to_string();
        }
        WrapperKind::None => {}
    }

    match node.scalar_kind() {
        ScalarKind::Enum => match described_prefix(node) {
            Some(name) => format!("Enum<{}>", name),
            None => {
                let values = node
                    .enum_members()
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(_, value)| match value {
                        Value::String(s) => s,
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(",");
                format!("Enum<{}>", values)
            }
        },
        ScalarKind::Object => described_prefix(node).unwrap_or_else(|| "Object".to_string()),
        ScalarKind::Record => match node.record_types() {
            Some((key, value)) => format!(
                "Record<{}, {}>",
                nested(&key),
                nested(&value)
            ),
            None => "Record<Unknown, Unknown>".to_string(),
        },
        ScalarKind::Literal => {
            let kind = match node.literal_value() {
                Some(Value::Null) | None => "Null",
                Some(Value::Bool(_)) => "Boolean",
                Some(Value::Number(_)) => "Number",
                Some(Value::String(_)) => "String",
                Some(Value::Array(_)) => "Array",
                Some(Value::Object(_)) => "Object",
            };
            format!("Literal<{}>", kind)
        }
        ScalarKind::Union => node
            .union_options()
            .unwrap_or_default()
            .iter()
            .map(|option| nested(option))
            .collect::<Vec<_>>()
            .join(" | "),
        ScalarKind::Boolean => "Boolean".to_string(),
        ScalarKind::String => "String".to_string(),
        ScalarKind::Number { .. } => "Number".to_string(),
        ScalarKind::BigInt => "BigInt".to_string(),
        ScalarKind::Date => "Date".to_string(),
        ScalarKind::Any => "Any".to_string(),
        ScalarKind::Null => "Null".to_string(),
        ScalarKind::Unknown => "Unknown".to_string(),
    }
}

/// `Name` out of a `Name: ...` description, when the colon is not the first
/// character.
fn described_prefix(node: &SchemaRef) -> Option<String> {
    let description = node.description()?;
    match description.find(':') {
        Some(index) if index > 0 => Some(description[..index].to_string()),
        _ => None,
    }
}

/// Default carried by the innermost `Default` layer along the wrapper chain.
/// Array elements are not searched.
pub fn default_of(node: &SchemaRef) -> Option<Value> {
    let mut found = None;
    for layer in iterate_layers(node) {
        match layer.wrapper_kind() {
            WrapperKind::Default => found = layer.default_value().or(found),
            WrapperKind::Array => break,
            _ => {}
        }
    }
    found
}

/// Default values for a whole node: a record of field defaults for objects
/// (recursively, absent entries dropped), the thunk value for `Default`
/// wrappers, nothing otherwise.
pub fn generate_defaults(node: &SchemaRef) -> Option<Value> {
    if let Some(shape) = node.shape() {
        let mut record = Map::new();
        for (key, field) in shape {
            if let Some(value) = generate_defaults(&field) {
                record.insert(key, value);
            }
        }
        return Some(Value::Object(record));
    }

    match node.wrapper_kind() {
        WrapperKind::Default => node.default_value(),
        _ => None,
    }
}
