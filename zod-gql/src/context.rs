//! Compilation state.
//!
//! A [`CompilationContext`] owns everything that must stay consistent across
//! compilations feeding one host schema: the name registry, the memo of
//! generated types, the enum registry and the default providers. Compile
//! everything for one API schema through the same context.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::accessor::FieldPolicy;
use crate::args::{bind_argument, ArgumentDescriptor, ArgumentOptions, ParameterTarget};
use crate::compiler::{compile, GeneratedType, ModelOptions, TypeFlavor};
use crate::config::{BridgeConfig, ConfigValidationError};
use crate::enums::{EnumProvider, EnumProviderData, EnumRegistry, EnumType};
use crate::error::CompileResult;
use crate::field_info::{ProvidedType, TypeProvider};
use crate::host::TypeRegistrar;
use crate::method::{bind_method, MethodBinding, MethodOptions};
use crate::naming::NameRegistry;
use crate::schema::{SchemaId, SchemaRef};

pub struct CompilationContext {
    config: BridgeConfig,
    names: NameRegistry,
    types: HashMap<(SchemaId, TypeFlavor), Arc<GeneratedType>>,
    enums: EnumRegistry,
    compiling: Vec<(SchemaId, TypeFlavor)>,
    type_provider: Option<TypeProvider>,
    enum_provider: Option<EnumProvider>,
}

impl fmt::Debug for CompilationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompilationContext")
            .field("config", &self.config)
            .field("names", &self.names)
            .field("types", &self.types.len())
            .field("enums", &self.enums.len())
            .field("compiling", &self.compiling)
            .field("has_type_provider", &self.type_provider.is_some())
            .field("has_enum_provider", &self.enum_provider.is_some())
            .finish()
    }
}

impl Default for CompilationContext {
    fn default() -> Self {
        Self {
            config: BridgeConfig::default(),
            names: NameRegistry::new(),
            types: HashMap::new(),
            enums: EnumRegistry::default(),
            compiling: Vec::new(),
            type_provider: None,
            enum_provider: None,
        }
    }
}

impl CompilationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    ///
    /// Returns the validation error when `config` names are not valid
    /// GraphQL names.
    pub fn with_config(config: BridgeConfig) -> Result<Self, ConfigValidationError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn names(&self) -> &NameRegistry {
        &self.names
    }

    pub fn names_mut(&mut self) -> &mut NameRegistry {
        &mut self.names
    }

    pub fn enums(&self) -> &EnumRegistry {
        &self.enums
    }

    pub(crate) fn enums_mut(&mut self) -> &mut EnumRegistry {
        &mut self.enums
    }

    pub fn cached_type(&self, id: SchemaId, flavor: TypeFlavor) -> Option<Arc<GeneratedType>> {
        self.types.get(&(id, flavor)).cloned()
    }

    /// Number of memoized generated types.
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn generated_types(&self) -> impl Iterator<Item = &Arc<GeneratedType>> {
        self.types.values()
    }

    /// Provider consulted for non-native field types when the compile
    /// options carry none.
    pub fn set_default_type_provider<F>(&mut self, provider: F)
    where
        F: Fn(&str) -> Option<ProvidedType> + Send + Sync + 'static,
    {
        self.type_provider = Some(Arc::new(provider));
    }

    pub fn default_type_provider(&self) -> Option<TypeProvider> {
        self.type_provider.clone()
    }

    pub fn set_default_enum_provider<F>(&mut self, provider: F)
    where
        F: Fn(&[(String, serde_json::Value)], &EnumProviderData) -> Option<Arc<EnumType>>
            + Send
            + Sync
            + 'static,
    {
        self.enum_provider = Some(Arc::new(provider));
    }

    pub fn default_enum_provider(&self) -> Option<EnumProvider> {
        self.enum_provider.clone()
    }

    /// Forgets every used name and resets the counter.
    ///
    /// Memoized types and enums stay cached.
    pub fn reset(&mut self) {
        debug!(names = self.names.used_names().len(), "Resetting name registry");
        self.names.reset();
    }

    /// Alias of [`reset`](Self::reset), run once all types are registered.
    pub fn free(&mut self) {
        self.reset();
    }

    pub fn compile(
        &mut self,
        host: &mut dyn TypeRegistrar,
        schema: &SchemaRef,
        options: &ModelOptions,
    ) -> CompileResult<Arc<GeneratedType>> {
        compile(self, host, schema, options)
    }

    pub fn bind_argument(
        &mut self,
        host: &mut dyn TypeRegistrar,
        schema: &SchemaRef,
        target: ParameterTarget,
        options: ArgumentOptions,
    ) -> CompileResult<ArgumentDescriptor> {
        bind_argument(self, host, schema, target, options)
    }

    pub fn bind_method(
        &mut self,
        host: &mut dyn TypeRegistrar,
        schema: &SchemaRef,
        options: MethodOptions,
    ) -> CompileResult<MethodBinding> {
        bind_method(self, host, schema, options)
    }

    pub(crate) fn is_compiling(&self, id: SchemaId, flavor: TypeFlavor) -> bool {
        self.compiling.contains(&(id, flavor))
    }

    pub(crate) fn begin(&mut self, id: SchemaId, flavor: TypeFlavor) {
        self.compiling.push((id, flavor));
    }

    pub(crate) fn end(&mut self, id: SchemaId, flavor: TypeFlavor) {
        if let Some(pos) = self.compiling.iter().rposition(|entry| *entry == (id, flavor)) {
            self.compiling.remove(pos);
        }
    }

    pub(crate) fn memoize(&mut self, id: SchemaId, flavor: TypeFlavor, ty: Arc<GeneratedType>) {
        self.types.insert((id, flavor), ty);
    }

    /// Runtime policy for instances of a type compiled with `options`.
    pub(crate) fn field_policy(&self, options: &ModelOptions) -> FieldPolicy {
        FieldPolicy {
            policy: options.policy.unwrap_or(self.config.policy),
            on_parse_error: options.on_parse_error.clone(),
            on_parsing: options.on_parsing.clone(),
        }
    }
}
