//! Enum compilation.
//!
//! Turns an enum schema found on a field into a registered enum type. Each
//! enum schema (by identity) registers once per [`CompilationContext`]; later
//! fields using the same schema get the same [`EnumType`].

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};

use crate::compiler::ModelOptions;
use crate::context::CompilationContext;
use crate::error::{CompileError, CompileResult};
use crate::field_info::{FieldInfo, TypeRef};
use crate::host::{EnumRegistration, EnumValueRegistration, TypeRegistrar};
use crate::naming::{to_title_case, with_suffix};
use crate::schema::{SchemaId, SchemaRef};

/// A registered enum type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumType {
    name: String,
    description: Option<String>,
    members: Vec<(String, String)>,
}

impl EnumType {
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        members: Vec<(String, String)>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            members,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// `(name, value)` pairs in declaration order.
    pub fn members(&self) -> &[(String, String)] {
        &self.members
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|(_, value)| value.as_str())
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values().any(|v| v == value)
    }
}

/// What an enum provider is told about the enum being compiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumProviderData {
    /// The field key.
    pub name: String,
    pub parent_name: Option<String>,
    pub description: Option<String>,
}

/// Offers an existing enum type for a set of members, skipping registration.
pub type EnumProvider =
    Arc<dyn Fn(&[(String, Value)], &EnumProviderData) -> Option<Arc<EnumType>> + Send + Sync>;

/// Compiled enums keyed by the identity of their schema.
#[derive(Debug, Clone, Default)]
pub struct EnumRegistry {
    by_source: HashMap<SchemaId, Arc<EnumType>>,
}

impl EnumRegistry {
    pub fn get(&self, id: SchemaId) -> Option<Arc<EnumType>> {
        self.by_source.get(&id).cloned()
    }

    pub fn insert(&mut self, id: SchemaId, ty: Arc<EnumType>) {
        self.by_source.insert(id, ty);
    }

    pub fn len(&self) -> usize {
        self.by_source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }
}

static LEADING_DIGIT: OnceLock<Option<Regex>> = OnceLock::new();

fn starts_with_digit(value: &str) -> bool {
    LEADING_DIGIT
        .get_or_init(|| Regex::new(r"^\s*\d").ok())
        .as_ref()
        .map_or(false, |re| re.is_match(value))
}

/// Name of the first member whose value cannot be a GraphQL enum value.
fn first_incompatible_member(members: &[(String, Value)]) -> Option<&str> {
    members
        .iter()
        .find(|(_, value)| match value {
            Value::String(s) => starts_with_digit(s),
            _ => true,
        })
        .map(|(name, _)| name.as_str())
}

/// Replaces the pending enum in `info` (or in its list item) with a compiled
/// [`EnumType`], registering it with the host when it is new.
pub fn compile_enum(
    ctx: &mut CompilationContext,
    host: &mut dyn TypeRegistrar,
    key: &str,
    info: &FieldInfo,
    scope: &ModelOptions,
) -> CompileResult<TypeRef> {
    match &info.target {
        TypeRef::PendingEnum(node) => compile_enum_node(ctx, host, key, node, scope).map(TypeRef::Enum),
        TypeRef::Enum(_) => Ok(info.target.clone()),
        TypeRef::List(item) => {
            let item_info = FieldInfo {
                is_nullable: info.item_is_nullable.unwrap_or(false),
                is_optional: info.item_is_optional.unwrap_or(false),
                is_enum: true,
                ..FieldInfo::of((**item).clone())
            };
            Ok(TypeRef::list_of(compile_enum(ctx, host, key, &item_info, scope)?))
        }
        other => Err(CompileError::schema_incompatibility(key, other.type_name())),
    }
}

fn compile_enum_node(
    ctx: &mut CompilationContext,
    host: &mut dyn TypeRegistrar,
    key: &str,
    node: &SchemaRef,
    scope: &ModelOptions,
) -> CompileResult<Arc<EnumType>> {
    if let Some(existing) = ctx.enums().get(node.id()) {
        trace!(key = %key, name = %existing.name(), "Enum cache hit");
        return Ok(existing);
    }

    let parent = scope.name.clone().unwrap_or_default();
    let members = node.enum_members().unwrap_or_default();

    if let Some(member) = first_incompatible_member(&members) {
        return Err(CompileError::incompatible_enum_value(&parent, key, member));
    }

    let description = node
        .description()
        .map(str::to_owned)
        .unwrap_or_else(|| format!("Enum values for {}.{}", parent, key));

    let provider = scope
        .enum_provider
        .clone()
        .or_else(|| ctx.default_enum_provider());
    if let Some(provider) = provider {
        let data = EnumProviderData {
            name: key.to_string(),
            parent_name: Some(parent.clone()),
            description: Some(description.clone()),
        };
        if let Some(existing) = provider(&members, &data) {
            debug!(key = %key, name = %existing.name(), "Enum supplied by provider");
            ctx.enums_mut().insert(node.id(), existing.clone());
            return Ok(existing);
        }
    }

    let enum_name = with_suffix(&to_title_case(key), &ctx.config().enum_suffix);
    // Advances the shared anonymous-type counter, see `NameRegistry::next_count`.
    let sequence = ctx.names_mut().next_count();
    let name = to_title_case(&format!("{}_{}_{}", parent, enum_name, sequence));

    let members: Vec<(String, String)> = members
        .into_iter()
        .map(|(member, value)| match value {
            Value::String(s) => (member, s),
            other => (member, other.to_string()),
        })
        .collect();

    host.register_enum(EnumRegistration {
        name: name.clone(),
        description: Some(description.clone()),
        values: members
            .iter()
            .map(|(member, value)| EnumValueRegistration {
                name: member.clone(),
                value: value.clone(),
            })
            .collect(),
    });
    debug!(name = %name, members = members.len(), "Registered enum type");

    let ty = Arc::new(EnumType::new(name, Some(description), members));
    ctx.enums_mut().insert(node.id(), ty.clone());
    Ok(ty)
}
