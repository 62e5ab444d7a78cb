//! Object and input type compilation.
//!
//! [`compile`] turns an object schema into a named, registered
//! [`GeneratedType`]: one registration for the type, one per field, with
//! nested objects and enums compiled on the way. Results are memoized per
//! schema identity and flavor for the life of the
//! [`CompilationContext`](crate::CompilationContext).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::accessor::{FieldPolicy, ParseErrorHook, ParsingHook};
use crate::config::ValidationPolicy;
use crate::context::CompilationContext;
use crate::enums::{compile_enum, EnumProvider};
use crate::error::{CompileError, CompileResult};
use crate::field_info::{resolve_field, FieldInfo, NestedNameProvider, Nullability, TypeProvider};
use crate::host::{FieldRegistration, InputTypeRegistration, ObjectTypeRegistration, TypeRegistrar};
use crate::introspect::{canonical_type_name, default_of, extract_description, generate_defaults};
use crate::model::ModelInstance;
use crate::naming::extract_name_and_description;
use crate::schema::{ParseError, ParseParams, SchemaRef};
use crate::validation::ValidationFailure;

/// Which kind of API type a schema compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFlavor {
    /// Output object type.
    #[default]
    Object,
    /// Input object type, used for arguments.
    Input,
}

impl fmt::Display for TypeFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object => write!(f, "object"),
            Self::Input => write!(f, "input"),
        }
    }
}

/// Options for compiling one schema.
///
/// Unset policy and `keep_source` fall back to the context's
/// [`BridgeConfig`](crate::BridgeConfig). Nested object types inherit
/// everything except the name, description, abstractness and rename map.
#[derive(Clone, Default)]
pub struct ModelOptions {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_abstract: bool,
    pub flavor: TypeFlavor,
    pub policy: Option<ValidationPolicy>,
    pub keep_source: Option<bool>,
    pub on_parse_error: Option<ParseErrorHook>,
    pub on_parsing: Option<ParsingHook>,
    /// Wire key to member name.
    pub property_map: HashMap<String, String>,
    pub nested_name: Option<NestedNameProvider>,
    pub type_provider: Option<TypeProvider>,
    pub enum_provider: Option<EnumProvider>,
}

impl fmt::Debug for ModelOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelOptions")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("is_abstract", &self.is_abstract)
            .field("flavor", &self.flavor)
            .field("policy", &self.policy)
            .field("keep_source", &self.keep_source)
            .field("has_on_parse_error", &self.on_parse_error.is_some())
            .field("has_on_parsing", &self.on_parsing.is_some())
            .field("property_map", &self.property_map)
            .field("has_nested_name", &self.nested_name.is_some())
            .field("has_type_provider", &self.type_provider.is_some())
            .field("has_enum_provider", &self.enum_provider.is_some())
            .finish()
    }
}

impl ModelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::default().with_name(name)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_abstract(mut self, is_abstract: bool) -> Self {
        self.is_abstract = is_abstract;
        self
    }

    pub fn with_flavor(mut self, flavor: TypeFlavor) -> Self {
        self.flavor = flavor;
        self
    }

    pub fn input(self) -> Self {
        self.with_flavor(TypeFlavor::Input)
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    pub fn with_keep_source(mut self, keep_source: bool) -> Self {
        self.keep_source = Some(keep_source);
        self
    }

    /// Called on a failed write under the safe policy; a returned value is
    /// stored instead of the rejected one.
    pub fn with_on_parse_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, Option<&Value>, Option<&Value>, &ParseError) -> Option<Value>
            + Send
            + Sync
            + 'static,
    {
        self.on_parse_error = Some(Arc::new(hook));
        self
    }

    /// Supplies parse parameters for each write, given the key and the
    /// previous value.
    pub fn with_on_parsing<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str, Option<&Value>) -> ParseParams + Send + Sync + 'static,
    {
        self.on_parsing = Some(Arc::new(hook));
        self
    }

    pub fn rename(mut self, key: impl Into<String>, property: impl Into<String>) -> Self {
        self.property_map.insert(key.into(), property.into());
        self
    }

    pub fn with_nested_name<F>(mut self, provider: F) -> Self
    where
        F: Fn(&str, &str) -> Option<String> + Send + Sync + 'static,
    {
        self.nested_name = Some(Arc::new(provider));
        self
    }

    pub fn with_type_provider(mut self, provider: TypeProvider) -> Self {
        self.type_provider = Some(provider);
        self
    }

    pub fn with_enum_provider(mut self, provider: EnumProvider) -> Self {
        self.enum_provider = Some(provider);
        self
    }

    /// Options for a nested object type found on one of this type's fields.
    pub(crate) fn nested(&self, name: String, description: Option<String>, is_abstract: bool) -> Self {
        Self {
            name: Some(name),
            description,
            is_abstract,
            property_map: HashMap::new(),
            ..self.clone()
        }
    }
}

/// One field of a generated type.
#[derive(Debug, Clone)]
pub struct GeneratedField {
    /// Wire key.
    pub key: String,
    /// Member name on instances.
    pub property: String,
    pub info: FieldInfo,
    pub nullability: Nullability,
    /// Default registered with the host.
    pub default_value: Option<Value>,
    /// Value a fresh instance starts with.
    pub initial_value: Option<Value>,
    pub description: Option<String>,
    pub schema: SchemaRef,
}

/// A named type derived from an object schema.
#[derive(Debug)]
pub struct GeneratedType {
    name: String,
    description: Option<String>,
    flavor: TypeFlavor,
    is_abstract: bool,
    schema: SchemaRef,
    keep_source: bool,
    fields: Vec<GeneratedField>,
    policy: Arc<FieldPolicy>,
}

impl GeneratedType {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn flavor(&self) -> TypeFlavor {
        self.flavor
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn fields(&self) -> &[GeneratedField] {
        &self.fields
    }

    /// Field by wire key.
    pub fn field(&self, key: &str) -> Option<&GeneratedField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Field by member name.
    pub fn field_by_property(&self, property: &str) -> Option<&GeneratedField> {
        self.fields.iter().find(|f| f.property == property)
    }

    /// The source schema, when retained with `keep_source`.
    pub fn source(&self) -> Option<&SchemaRef> {
        self.keep_source.then_some(&self.schema)
    }

    pub(crate) fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    pub(crate) fn policy(&self) -> &Arc<FieldPolicy> {
        &self.policy
    }

    /// Default record for the whole object.
    pub fn defaults(&self) -> Value {
        generate_defaults(&self.schema).unwrap_or_else(|| Value::Object(Map::new()))
    }

    /// Validates a whole value against the source schema.
    pub fn parse(&self, value: Option<&Value>) -> Result<Option<Value>, ValidationFailure> {
        self.schema
            .parse(value, &ParseParams::default())
            .map_err(|err| ValidationFailure::from_parse_error(&self.name, value, &err))
    }

    /// A fresh instance holding the field defaults.
    pub fn instantiate(self: &Arc<Self>) -> ModelInstance {
        ModelInstance::new(self.clone())
    }

    /// An instance populated from `value` through the managed fields. A
    /// missing key is written as absent, so required fields fail and
    /// defaulted ones fill in.
    pub fn from_value(self: &Arc<Self>, value: &Value) -> Result<ModelInstance, ValidationFailure> {
        let mut instance = self.instantiate();
        instance.populate(value)?;
        Ok(instance)
    }
}

/// Compiles `node` into a registered type, or returns the memoized one.
///
/// # Errors
///
/// Fails when `node` is not an object schema, when a field has no type
/// mapping, when an enum member is not a valid GraphQL value, or when the
/// schema contains itself.
pub fn compile(
    ctx: &mut CompilationContext,
    host: &mut dyn TypeRegistrar,
    node: &SchemaRef,
    options: &ModelOptions,
) -> CompileResult<Arc<GeneratedType>> {
    let flavor = options.flavor;
    if let Some(existing) = ctx.cached_type(node.id(), flavor) {
        trace!(name = %existing.name(), flavor = %flavor, "Generated type cache hit");
        return Ok(existing);
    }

    let Some(shape) = node.shape() else {
        return Err(CompileError::schema_incompatibility(
            options.name.clone().unwrap_or_default(),
            canonical_type_name(node),
        ));
    };

    if ctx.is_compiling(node.id(), flavor) {
        let name = options
            .name
            .clone()
            .unwrap_or_else(|| canonical_type_name(node));
        return Err(CompileError::recursive_schema(name));
    }

    let prefix = ctx.config().anonymous_type_prefix.clone();
    let (base_name, extracted) =
        extract_name_and_description(node, options.name.as_deref(), &prefix, ctx.names_mut());
    let description = options.description.clone().or(extracted);
    let name = ctx.names_mut().safe_name(&base_name);

    ctx.begin(node.id(), flavor);
    let built = build(ctx, host, node, shape, options, name, description);
    ctx.end(node.id(), flavor);

    let generated = Arc::new(built?);
    ctx.memoize(node.id(), flavor, generated.clone());
    Ok(generated)
}

fn build(
    ctx: &mut CompilationContext,
    host: &mut dyn TypeRegistrar,
    node: &SchemaRef,
    shape: Vec<(String, SchemaRef)>,
    options: &ModelOptions,
    name: String,
    description: Option<String>,
) -> CompileResult<GeneratedType> {
    let flavor = options.flavor;
    let is_abstract = options.is_abstract || node.is_nullable() || node.is_optional();

    match flavor {
        TypeFlavor::Object => host.register_object_type(ObjectTypeRegistration {
            name: name.clone(),
            description: description.clone(),
            is_abstract,
        }),
        TypeFlavor::Input => host.register_input_type(InputTypeRegistration {
            name: name.clone(),
            description: description.clone(),
        }),
    }
    debug!(name = %name, flavor = %flavor, fields = shape.len(), "Registered generated type");

    let scope = ModelOptions {
        name: Some(name.clone()),
        ..options.clone()
    };

    let mut fields = Vec::with_capacity(shape.len());
    for (key, field_node) in shape {
        let mut info = resolve_field(ctx, host, &key, &field_node, &scope)?;
        if info.is_enum {
            info.target = compile_enum(ctx, host, &key, &info, &scope)?;
        }

        let nullability = Nullability::classify(&info);
        let initial_value = default_of(&field_node);
        let default_value = if info.is_generated_object || !nullability.allows_default() {
            None
        } else {
            initial_value.clone()
        };
        let field_description = extract_description(&field_node);
        let property = options
            .property_map
            .get(&key)
            .cloned()
            .unwrap_or_else(|| key.clone());
        let type_name = info.target.type_name();

        if ctx.config().debug_logging {
            debug!(owner = %name, key = %key, property = %property, type_name = %type_name, nullable = ?nullability, "Compiled field");
        } else {
            trace!(owner = %name, key = %key, type_name = %type_name, "Compiled field");
        }

        host.register_field(FieldRegistration {
            owner: name.clone(),
            name: key.clone(),
            property: property.clone(),
            type_name,
            nullable: nullability,
            default_value: default_value.clone(),
            description: field_description.clone(),
        });

        fields.push(GeneratedField {
            key,
            property,
            info,
            nullability,
            default_value,
            initial_value,
            description: field_description,
            schema: field_node,
        });
    }

    let keep_source = options.keep_source.unwrap_or(ctx.config().keep_source);
    let policy = Arc::new(ctx.field_policy(options));

    Ok(GeneratedType {
        name,
        description,
        flavor,
        is_abstract,
        schema: node.clone(),
        keep_source,
        fields,
        policy,
    })
}
