//! Query, mutation and subscription binding.
//!
//! [`bind_method`] compiles a method's return type, registers the method,
//! and hands back a [`MethodBinding`] that validates whatever the handler
//! returns before it reaches the API layer.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::compiler::{compile, GeneratedType, ModelOptions};
use crate::context::CompilationContext;
use crate::error::CompileResult;
use crate::field_info::{FieldInfo, Nullability, TypeRef};
use crate::host::{MethodRegistration, TypeRegistrar};
use crate::introspect::object_layer;
use crate::model::ModelInstance;
use crate::schema::{ParseParams, SchemaRef};
use crate::validation::ValidationFailure;

/// Root operation a method is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodKind {
    /// Read-only operation
    #[default]
    Query,
    /// Write operation
    Mutation,
    /// Streaming subscription
    Subscription,
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query => write!(f, "query"),
            Self::Mutation => write!(f, "mutation"),
            Self::Subscription => write!(f, "subscription"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MethodOptions {
    pub name: String,
    pub kind: MethodKind,
    pub description: Option<String>,
    /// Falls back to [`BridgeConfig::parse_to_instance`](crate::BridgeConfig).
    pub parse_to_instance: Option<bool>,
    /// Options for compiling the return type.
    pub model: ModelOptions,
}

impl MethodOptions {
    pub fn new(name: impl Into<String>, kind: MethodKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            parse_to_instance: None,
            model: ModelOptions::default(),
        }
    }

    pub fn query(name: impl Into<String>) -> Self {
        Self::new(name, MethodKind::Query)
    }

    pub fn mutation(name: impl Into<String>) -> Self {
        Self::new(name, MethodKind::Mutation)
    }

    pub fn subscription(name: impl Into<String>) -> Self {
        Self::new(name, MethodKind::Subscription)
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_parse_to_instance(mut self, parse_to_instance: bool) -> Self {
        self.parse_to_instance = Some(parse_to_instance);
        self
    }

    pub fn with_model(mut self, model: ModelOptions) -> Self {
        self.model = model;
        self
    }
}

/// A validated handler result.
#[derive(Debug, Clone)]
pub enum MethodOutput {
    Instance(ModelInstance),
    Plain(Value),
}

impl MethodOutput {
    pub fn to_value(&self) -> Value {
        match self {
            Self::Instance(instance) => instance.to_value(),
            Self::Plain(value) => value.clone(),
        }
    }

    pub fn as_instance(&self) -> Option<&ModelInstance> {
        match self {
            Self::Instance(instance) => Some(instance),
            Self::Plain(_) => None,
        }
    }

    pub fn into_instance(self) -> Option<ModelInstance> {
        match self {
            Self::Instance(instance) => Some(instance),
            Self::Plain(_) => None,
        }
    }
}

impl Serialize for MethodOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Failure of a bound handler.
#[derive(Debug, Error)]
pub enum MethodError<E> {
    /// The result did not match the return schema.
    #[error(transparent)]
    Validation(#[from] ValidationFailure),
    /// The handler's own error, unchanged.
    #[error("{0}")]
    Handler(E),
}

impl<E> MethodError<E> {
    pub fn validation(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Validation(failure) => Some(failure),
            Self::Handler(_) => None,
        }
    }

    pub fn into_handler(self) -> Option<E> {
        match self {
            Self::Handler(err) => Some(err),
            Self::Validation(_) => None,
        }
    }
}

/// Post-processing for one bound method.
#[derive(Debug, Clone)]
pub struct MethodBinding {
    name: String,
    kind: MethodKind,
    schema: SchemaRef,
    generated: Arc<GeneratedType>,
    parse_to_instance: bool,
}

impl MethodBinding {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> MethodKind {
        self.kind
    }

    pub fn generated_type(&self) -> &Arc<GeneratedType> {
        &self.generated
    }

    pub fn parse_to_instance(&self) -> bool {
        self.parse_to_instance
    }

    /// Validates a synchronous handler result. Uses the same parse as
    /// [`finish_async`](Self::finish_async).
    pub fn finish(&self, result: Value) -> Result<MethodOutput, ValidationFailure> {
        let parsed = self
            .schema
            .parse(Some(&result), &ParseParams::default())
            .map_err(|err| ValidationFailure::from_parse_error(self.generated.name(), Some(&result), &err))?;
        Ok(self.output(parsed))
    }

    /// Awaits the handler, then validates its result. Handler errors pass
    /// through as [`MethodError::Handler`].
    pub async fn finish_async<F, E>(&self, result: F) -> Result<MethodOutput, MethodError<E>>
    where
        F: Future<Output = Result<Value, E>>,
    {
        let value = result.await.map_err(MethodError::Handler)?;
        let parsed = self
            .schema
            .parse_async(Some(value.clone()), ParseParams::default())
            .await
            .map_err(|err| ValidationFailure::from_parse_error(self.generated.name(), Some(&value), &err))?;
        Ok(self.output(parsed))
    }

    /// Wraps an async handler so every call is post-processed.
    pub fn wrap<A, E, H, Fut>(
        &self,
        handler: H,
    ) -> impl Fn(A) -> BoxFuture<'static, Result<MethodOutput, MethodError<E>>> + Send + Sync
    where
        H: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, E>> + Send + 'static,
        A: Send + 'static,
        E: Send + 'static,
    {
        let binding = self.clone();
        move |args| {
            let binding = binding.clone();
            let pending = handler(args);
            Box::pin(async move { binding.finish_async(pending).await })
        }
    }

    fn output(&self, parsed: Option<Value>) -> MethodOutput {
        let value = parsed.unwrap_or(Value::Null);
        if self.parse_to_instance && value.is_object() {
            MethodOutput::Instance(ModelInstance::from_parsed(self.generated.clone(), &value))
        } else {
            MethodOutput::Plain(value)
        }
    }
}

/// Compiles the return type of a method and registers the method.
pub fn bind_method(
    ctx: &mut CompilationContext,
    host: &mut dyn TypeRegistrar,
    schema: &SchemaRef,
    options: MethodOptions,
) -> CompileResult<MethodBinding> {
    let parse_to_instance = options
        .parse_to_instance
        .unwrap_or(ctx.config().parse_to_instance);
    let object = object_layer(schema).unwrap_or_else(|| schema.clone());
    let generated = compile(ctx, host, &object, &options.model)?;

    let info = FieldInfo {
        is_optional: schema.is_optional(),
        is_nullable: schema.is_nullable(),
        ..FieldInfo::of(TypeRef::Object(generated.clone()))
    };
    let nullable = Nullability::classify(&info);
    let description = options
        .description
        .clone()
        .or_else(|| generated.description().map(str::to_owned));

    host.register_method(MethodRegistration {
        name: options.name.clone(),
        kind: options.kind,
        return_type: generated.name().to_string(),
        nullable,
        description,
    });
    debug!(name = %options.name, kind = %options.kind, return_type = %generated.name(), "Registered method");

    Ok(MethodBinding {
        name: options.name,
        kind: options.kind,
        schema: schema.clone(),
        generated,
        parse_to_instance,
    })
}
