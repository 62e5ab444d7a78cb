//! # zod-gql
//!
//! Compiles Zod-style validation schemas into GraphQL API types, and wires
//! the same schemas back in as runtime validation.
//!
//! ## Overview
//!
//! Given an object schema, `zod-gql` derives a named object (or input) type
//! with one field per schema key, nested object types for nested objects,
//! enum types for enum fields, and argument and method registrations. Every
//! derived type is announced to a host through [`TypeRegistrar`]; the crate
//! never builds an API schema itself.
//!
//! At request time the compiled [`GeneratedType`] backs [`ModelInstance`]s
//! whose fields re-validate on every write, [`ArgumentDescriptor`]s that
//! validate incoming arguments, and [`MethodBinding`]s that validate handler
//! results. Every runtime failure is a [`ValidationFailure`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use zod_gql::schema::zod::z;
//! use zod_gql::{CompilationContext, InMemoryRegistry, ModelOptions};
//!
//! let user = z::object([
//!     ("name", z::string()),
//!     ("age", z::number().int()),
//!     ("status", z::enumeration(["active", "banned"])),
//!     ("tags", z::array(z::string()).optional()),
//! ]);
//!
//! let mut ctx = CompilationContext::new();
//! let mut host = InMemoryRegistry::new();
//! let ty = ctx.compile(&mut host, &user.schema(), &ModelOptions::named("User"))?;
//!
//! println!("{}", host.to_sdl());
//! // type User {
//! //   name: String!
//! //   age: Int!
//! //   status: User_StatusEnum_1!
//! //   tags: [String!]
//! // }
//!
//! let mut instance = ty.instantiate();
//! instance.set("age", serde_json::json!(41))?;
//! ```
//!
//! ## Type Mappings
//!
//! | Schema | GraphQL |
//! |--------|---------|
//! | `z.string()` | `String` |
//! | `z.boolean()` | `Boolean` |
//! | `z.number().int()` | `Int` |
//! | `z.number()` | `Float` |
//! | `z.enum([...])` | generated enum |
//! | `z.object({...})` | generated object / input type |
//! | `z.array(T)` | `[T]` |
//! | anything else | scalar from the type provider |
//!
//! Wrappers (`optional`, `nullable`, `default`, `transform`, `refine`,
//! `catch`, `lazy`) are looked through; `optional` and `nullable` decide the
//! field's [`Nullability`].
//!
//! ## Validators
//!
//! The compiler only talks to [`SchemaNode`]. [`schema::zod`] is a bundled
//! Zod-style implementation; another validator plugs in by implementing the
//! trait.

pub mod accessor;
pub mod args;
pub mod compiler;
pub mod config;
pub mod context;
pub mod enums;
pub mod error;
pub mod field_info;
pub mod host;
pub mod introspect;
pub mod method;
pub mod model;
pub mod naming;
pub mod schema;
pub mod validation;

#[cfg(test)]
mod tests;

pub use accessor::{FieldPolicy, ManagedField, ParseErrorHook, ParsingHook};
pub use args::{
    bind_argument, ArgumentDescriptor, ArgumentOptions, ArgumentValidator, ParameterTarget, Pipe,
};
pub use compiler::{compile, GeneratedField, GeneratedType, ModelOptions, TypeFlavor};
pub use config::{BridgeConfig, ConfigValidationError, ValidationPolicy};
pub use context::CompilationContext;
pub use enums::{EnumProvider, EnumProviderData, EnumRegistry, EnumType};
pub use error::{CompileError, CompileResult, ErrorCode};
pub use field_info::{
    FieldInfo, NestedNameProvider, Nullability, ProvidedType, ScalarType, TypeProvider, TypeRef,
};
pub use host::{
    ArgumentRegistration, EnumRegistration, EnumValueRegistration, FieldRegistration,
    InMemoryRegistry, InputTypeRegistration, MethodRegistration, ObjectTypeRegistration,
    TypeRegistrar,
};
pub use method::{bind_method, MethodBinding, MethodError, MethodKind, MethodOptions, MethodOutput};
pub use model::ModelInstance;
pub use naming::NameRegistry;
pub use schema::{
    Issue, ParseError, ParseParams, PathSegment, ScalarKind, SchemaId, SchemaNode, SchemaRef,
    WrapperKind,
};
pub use validation::{FieldViolation, ValidationFailure};
