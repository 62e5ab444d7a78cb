//! Argument binding.
//!
//! [`bind_argument`] turns a schema (an object or a bare scalar) into an
//! [`ArgumentDescriptor`]: the argument's API type and nullability, already
//! registered with the host, plus a validator that runs before any
//! caller-supplied pipes.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::compiler::{compile, GeneratedType, ModelOptions, TypeFlavor};
use crate::context::CompilationContext;
use crate::enums::{compile_enum, EnumProvider};
use crate::error::CompileResult;
use crate::field_info::{resolve_field, FieldInfo, Nullability, TypeProvider, TypeRef};
use crate::host::{ArgumentRegistration, TypeRegistrar};
use crate::introspect::{extract_description, object_layer};
use crate::model::ModelInstance;
use crate::schema::{ParseParams, SchemaRef};
use crate::validation::ValidationFailure;

/// A transformation applied to an argument value after validation.
pub trait Pipe: Send + Sync {
    fn transform(&self, value: Option<Value>) -> Result<Option<Value>, ValidationFailure>;
}

impl<F> Pipe for F
where
    F: Fn(Option<Value>) -> Result<Option<Value>, ValidationFailure> + Send + Sync,
{
    fn transform(&self, value: Option<Value>) -> Result<Option<Value>, ValidationFailure> {
        self(value)
    }
}

#[derive(Clone, Default)]
pub struct ArgumentOptions {
    /// Argument name; `arg_{position}` when unset.
    pub name: Option<String>,
    pub description: Option<String>,
    pub type_provider: Option<TypeProvider>,
    pub enum_provider: Option<EnumProvider>,
    pub pipes: Vec<Arc<dyn Pipe>>,
}

impl fmt::Debug for ArgumentOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentOptions")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("has_type_provider", &self.type_provider.is_some())
            .field("has_enum_provider", &self.enum_provider.is_some())
            .field("pipes", &self.pipes.len())
            .finish()
    }
}

impl ArgumentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
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

    /// Appends a pipe; pipes run in insertion order.
    pub fn with_pipe<P: Pipe + 'static>(mut self, pipe: P) -> Self {
        self.pipes.push(Arc::new(pipe));
        self
    }
}

/// Where an argument sits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterTarget {
    pub method: Option<String>,
    pub position: usize,
}

impl ParameterTarget {
    pub fn new(position: usize) -> Self {
        Self {
            method: None,
            position,
        }
    }

    pub fn on(method: impl Into<String>, position: usize) -> Self {
        Self {
            method: Some(method.into()),
            position,
        }
    }
}

/// Validates raw argument values against the argument schema.
#[derive(Debug, Clone)]
pub struct ArgumentValidator {
    name: String,
    schema: SchemaRef,
    generated: Option<Arc<GeneratedType>>,
}

impl ArgumentValidator {
    /// Parses `value` and returns the schema's output unchanged.
    pub fn validate(&self, value: Option<&Value>) -> Result<Option<Value>, ValidationFailure> {
        self.schema
            .parse(value, &ParseParams::default())
            .map_err(|err| ValidationFailure::from_parse_error(&self.name, value, &err))
    }

    pub async fn validate_async(&self, value: Option<Value>) -> Result<Option<Value>, ValidationFailure> {
        self.schema
            .parse_async(value.clone(), ParseParams::default())
            .await
            .map_err(|err| ValidationFailure::from_parse_error(&self.name, value.as_ref(), &err))
    }

    /// Wraps an already validated object in an instance of the input type.
    /// Nothing is parsed again, so transformed field values are kept as is.
    /// `None` for scalar arguments and for non-object values such as `null`.
    pub fn to_instance(&self, parsed: &Value) -> Option<ModelInstance> {
        match &self.generated {
            Some(generated) if parsed.is_object() => {
                Some(ModelInstance::from_parsed(generated.clone(), parsed))
            }
            _ => None,
        }
    }
}

/// A bound argument, ready for the host to attach to a method.
#[derive(Clone)]
pub struct ArgumentDescriptor {
    name: String,
    target: ParameterTarget,
    type_ref: TypeRef,
    nullability: Nullability,
    description: Option<String>,
    validator: ArgumentValidator,
    pipes: Vec<Arc<dyn Pipe>>,
}

impl fmt::Debug for ArgumentDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentDescriptor")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("type_ref", &self.type_ref)
            .field("nullability", &self.nullability)
            .field("description", &self.description)
            .field("pipes", &self.pipes.len())
            .finish()
    }
}

impl ArgumentDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &ParameterTarget {
        &self.target
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    pub fn nullability(&self) -> Nullability {
        self.nullability
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn validator(&self) -> &ArgumentValidator {
        &self.validator
    }

    /// The input type, for object arguments.
    pub fn generated_type(&self) -> Option<&Arc<GeneratedType>> {
        self.validator.generated.as_ref()
    }

    /// Runs the validator, then every pipe in order.
    pub fn process(&self, value: Option<&Value>) -> Result<Option<Value>, ValidationFailure> {
        let validated = self.validator.validate(value)?;
        self.run_pipes(validated)
    }

    pub async fn process_async(&self, value: Option<Value>) -> Result<Option<Value>, ValidationFailure> {
        let validated = self.validator.validate_async(value).await?;
        self.run_pipes(validated)
    }

    fn run_pipes(&self, value: Option<Value>) -> Result<Option<Value>, ValidationFailure> {
        self.pipes
            .iter()
            .try_fold(value, |current, pipe| pipe.transform(current))
    }
}

/// Binds one argument of a method.
///
/// Object schemas compile to an input type (memoized like any other
/// compilation); anything else maps to a scalar, enum or list directly.
pub fn bind_argument(
    ctx: &mut CompilationContext,
    host: &mut dyn TypeRegistrar,
    schema: &SchemaRef,
    target: ParameterTarget,
    options: ArgumentOptions,
) -> CompileResult<ArgumentDescriptor> {
    let name = options
        .name
        .clone()
        .unwrap_or_else(|| format!("arg_{}", target.position));

    let (type_ref, nullability, generated) = if let Some(object) = object_layer(schema) {
        let model = ModelOptions {
            flavor: TypeFlavor::Input,
            type_provider: options.type_provider.clone(),
            enum_provider: options.enum_provider.clone(),
            ..ModelOptions::default()
        };
        let generated = compile(ctx, host, &object, &model)?;
        let info = FieldInfo {
            is_optional: schema.is_optional(),
            is_nullable: schema.is_nullable(),
            ..FieldInfo::of(TypeRef::Object(generated.clone()))
        };
        (info.target.clone(), Nullability::classify(&info), Some(generated))
    } else {
        let scope = ModelOptions {
            name: Some(name.clone()),
            flavor: TypeFlavor::Input,
            type_provider: options.type_provider.clone(),
            enum_provider: options.enum_provider.clone(),
            ..ModelOptions::default()
        };
        let mut info = resolve_field(ctx, host, &name, schema, &scope)?;
        if info.is_enum {
            info.target = compile_enum(ctx, host, &name, &info, &scope)?;
        }
        (info.target.clone(), Nullability::classify(&info), None)
    };

    let description = options.description.clone().or_else(|| extract_description(schema));
    let type_name = type_ref.type_name();

    host.register_argument(ArgumentRegistration {
        method: target.method.clone(),
        position: target.position,
        name: name.clone(),
        type_name: type_name.clone(),
        nullable: nullability,
        description: description.clone(),
    });
    debug!(name = %name, position = target.position, type_name = %type_name, "Registered argument");

    Ok(ArgumentDescriptor {
        validator: ArgumentValidator {
            name: name.clone(),
            schema: schema.clone(),
            generated,
        },
        name,
        target,
        type_ref,
        nullability,
        description,
        pipes: options.pipes,
    })
}
