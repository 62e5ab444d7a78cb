//! Per-field type information.
//!
//! [`resolve_field`] walks one field's schema and decides which API type the
//! field maps to and how nullable it is. Nested objects are compiled on the
//! way (through [`compile`](crate::compiler::compile)); enums are left as
//! [`TypeRef::PendingEnum`] for the enum compiler.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::compiler::{compile, GeneratedType, ModelOptions};
use crate::context::CompilationContext;
use crate::enums::EnumType;
use crate::error::{CompileError, CompileResult};
use crate::host::TypeRegistrar;
use crate::introspect::{canonical_type_name, extract_description, unwrap_once, MAX_LAYER_DEPTH};
use crate::naming::{is_graphql_name, to_title_case};
use crate::schema::{ScalarKind, SchemaRef, WrapperKind};

/// A custom scalar known to the host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScalarType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ScalarType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// What a type provider may hand back for a canonical type name.
/// Only [`ProvidedType::Scalar`] is accepted for a field.
#[derive(Debug, Clone)]
pub enum ProvidedType {
    Scalar(ScalarType),
    Object(Arc<GeneratedType>),
    Enum(Arc<EnumType>),
}

impl fmt::Display for ProvidedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(scalar) => write!(f, "Scalar({})", scalar.name),
            Self::Object(ty) => write!(f, "Object({})", ty.name()),
            Self::Enum(ty) => write!(f, "Enum({})", ty.name()),
        }
    }
}

/// Maps a canonical type name (`Date`, `Record<String, Any>`, ...) to a scalar.
pub type TypeProvider = Arc<dyn Fn(&str) -> Option<ProvidedType> + Send + Sync>;

/// Names a nested object type from `(parent_name, key)`.
pub type NestedNameProvider = Arc<dyn Fn(&str, &str) -> Option<String> + Send + Sync>;

/// Reference to an API type.
#[derive(Debug, Clone)]
pub enum TypeRef {
    String,
    Boolean,
    Int,
    Float,
    /// Enum schema not compiled yet.
    PendingEnum(SchemaRef),
    Enum(Arc<EnumType>),
    Object(Arc<GeneratedType>),
    Scalar(ScalarType),
    List(Box<TypeRef>),
}

impl TypeRef {
    pub fn list_of(item: TypeRef) -> Self {
        Self::List(Box::new(item))
    }

    /// GraphQL rendering without nullability markers (`Int`, `[UserStatusEnum_1]`).
    pub fn type_name(&self) -> String {
        match self {
            Self::String => "String".to_string(),
            Self::Boolean => "Boolean".to_string(),
            Self::Int => "Int".to_string(),
            Self::Float => "Float".to_string(),
            Self::PendingEnum(node) => canonical_type_name(node),
            Self::Enum(ty) => ty.name().to_string(),
            Self::Object(ty) => ty.name().to_string(),
            Self::Scalar(scalar) => scalar.name.clone(),
            Self::List(item) => format!("[{}]", item.type_name()),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// The item type under every list layer.
    pub fn innermost(&self) -> &TypeRef {
        match self {
            Self::List(item) => item.innermost(),
            other => other,
        }
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String, Self::String)
            | (Self::Boolean, Self::Boolean)
            | (Self::Int, Self::Int)
            | (Self::Float, Self::Float) => true,
            (Self::PendingEnum(a), Self::PendingEnum(b)) => a.id() == b.id(),
            (Self::Enum(a), Self::Enum(b)) => Arc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            (Self::Scalar(a), Self::Scalar(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            _ => false,
        }
    }
}

/// Nullability marker of a registered field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Nullability {
    NonNull,
    Nullable,
    /// Non-null list of nullable items.
    Items,
    /// Nullable list of nullable items.
    ItemsAndList,
}

impl Nullability {
    pub fn classify(info: &FieldInfo) -> Self {
        let base = info.is_nullable || info.is_optional;
        let items = info.item_is_nullable.unwrap_or(false) || info.item_is_optional.unwrap_or(false);

        match (info.is_array && items, base) {
            (true, true) => Self::ItemsAndList,
            (true, false) => Self::Items,
            (false, true) => Self::Nullable,
            (false, false) => Self::NonNull,
        }
    }

    /// Whether a default value may be registered alongside this marker.
    pub fn allows_default(&self) -> bool {
        !matches!(self, Self::Items)
    }
}

/// Result of resolving one field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub target: TypeRef,
    pub is_optional: bool,
    pub is_nullable: bool,
    pub is_enum: bool,
    pub is_generated_object: bool,
    pub is_array: bool,
    pub item_is_optional: Option<bool>,
    pub item_is_nullable: Option<bool>,
}

impl FieldInfo {
    pub fn of(target: TypeRef) -> Self {
        Self {
            target,
            is_optional: false,
            is_nullable: false,
            is_enum: false,
            is_generated_object: false,
            is_array: false,
            item_is_optional: None,
            item_is_nullable: None,
        }
    }

    fn with_flags_of(mut self, node: &SchemaRef) -> Self {
        self.is_optional = node.is_optional();
        self.is_nullable = node.is_nullable();
        self
    }
}

/// Resolves the API type of the field `key` with schema `node`.
///
/// `scope` carries the options of the type that owns the field, with its
/// resolved name.
pub fn resolve_field(
    ctx: &mut CompilationContext,
    host: &mut dyn TypeRegistrar,
    key: &str,
    node: &SchemaRef,
    scope: &ModelOptions,
) -> CompileResult<FieldInfo> {
    resolve_at(ctx, host, key, node, scope, 0)
}

fn resolve_at(
    ctx: &mut CompilationContext,
    host: &mut dyn TypeRegistrar,
    key: &str,
    node: &SchemaRef,
    scope: &ModelOptions,
    depth: usize,
) -> CompileResult<FieldInfo> {
    if depth >= MAX_LAYER_DEPTH {
        let parent = scope.name.as_deref().unwrap_or_default();
        return Err(CompileError::recursive_schema(format!("{}.{}", parent, key)));
    }
    trace!(key = %key, kind = %node.wrapper_kind(), depth = depth, "Resolving field");

    match node.wrapper_kind() {
        WrapperKind::Array => {
            let item = resolve_at(ctx, host, key, &unwrap_once(node), scope, depth + 1)?;
            return Ok(FieldInfo {
                target: TypeRef::list_of(item.target),
                is_optional: node.is_optional(),
                is_nullable: node.is_nullable(),
                is_enum: item.is_enum,
                is_generated_object: false,
                is_array: true,
                item_is_optional: Some(item.is_optional),
                item_is_nullable: Some(item.is_nullable),
            });
        }
        WrapperKind::Optional => {
            let inner = resolve_at(ctx, host, key, &unwrap_once(node), scope, depth + 1)?;
            return Ok(FieldInfo {
                is_optional: true,
                is_nullable: node.is_nullable(),
                ..inner
            });
        }
        WrapperKind::Nullable => {
            let inner = resolve_at(ctx, host, key, &unwrap_once(node), scope, depth + 1)?;
            return Ok(FieldInfo {
                is_nullable: true,
                ..inner
            });
        }
        WrapperKind::Default
        | WrapperKind::Transform
        | WrapperKind::Effect
        | WrapperKind::Catch
        | WrapperKind::Lazy => {
            return resolve_at(ctx, host, key, &unwrap_once(node), scope, depth + 1);
        }
        WrapperKind::Promise => return resolve_scalar(ctx, key, node, scope),
        WrapperKind::None => {}
    }

    match node.scalar_kind() {
        ScalarKind::Boolean => Ok(FieldInfo::of(TypeRef::Boolean).with_flags_of(node)),
        ScalarKind::String => Ok(FieldInfo::of(TypeRef::String).with_flags_of(node)),
        ScalarKind::Number { integer } => {
            let target = if integer { TypeRef::Int } else { TypeRef::Float };
            Ok(FieldInfo::of(target).with_flags_of(node))
        }
        ScalarKind::Object => resolve_object(ctx, host, key, node, scope),
        ScalarKind::Enum => Ok(FieldInfo {
            is_enum: true,
            ..FieldInfo::of(TypeRef::PendingEnum(node.clone())).with_flags_of(node)
        }),
        _ => resolve_scalar(ctx, key, node, scope),
    }
}

fn resolve_object(
    ctx: &mut CompilationContext,
    host: &mut dyn TypeRegistrar,
    key: &str,
    node: &SchemaRef,
    scope: &ModelOptions,
) -> CompileResult<FieldInfo> {
    let is_nullable = node.is_nullable();
    let is_optional = node.is_optional();
    let parent = scope.name.clone().unwrap_or_default();

    let name = scope
        .nested_name
        .as_ref()
        .and_then(|provide| provide(&parent, key))
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("{}_{}", parent, to_title_case(key)));

    let nested = scope.nested(name, extract_description(node), is_nullable || is_optional);
    let generated = compile(ctx, host, node, &nested)?;

    Ok(FieldInfo {
        is_optional,
        is_nullable,
        is_generated_object: true,
        ..FieldInfo::of(TypeRef::Object(generated))
    })
}

fn resolve_scalar(
    ctx: &mut CompilationContext,
    key: &str,
    node: &SchemaRef,
    scope: &ModelOptions,
) -> CompileResult<FieldInfo> {
    let type_name = canonical_type_name(node);
    let provider = scope
        .type_provider
        .clone()
        .or_else(|| ctx.default_type_provider());

    let Some(provider) = provider else {
        return Err(CompileError::schema_incompatibility(key, type_name));
    };

    match provider(&type_name) {
        Some(ProvidedType::Scalar(scalar)) if is_graphql_name(&scalar.name) => {
            trace!(key = %key, type_name = %type_name, scalar = %scalar.name, "Resolved custom scalar");
            Ok(FieldInfo::of(TypeRef::Scalar(scalar)).with_flags_of(node))
        }
        Some(other) => Err(CompileError::invalid_scalar_provider(
            key,
            type_name,
            other.to_string(),
        )),
        None => Err(CompileError::schema_incompatibility(key, type_name)),
    }
}
