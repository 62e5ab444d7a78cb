//! Host type-registry interface.
//!
//! The bridge never builds API schemas itself. Every type, field, enum,
//! argument and method it derives is announced to a [`TypeRegistrar`] as a
//! plain registration record; the host framework turns those into its own
//! metadata. [`InMemoryRegistry`] records them for inspection and renders a
//! GraphQL SDL preview.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::field_info::Nullability;
use crate::method::MethodKind;

mod memory;

pub use memory::InMemoryRegistry;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectTypeRegistration {
    pub name: String,
    pub description: Option<String>,
    pub is_abstract: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputTypeRegistration {
    pub name: String,
    pub description: Option<String>,
}

/// A field on a previously registered object or input type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRegistration {
    /// Name of the owning type.
    pub owner: String,
    /// Wire (API-visible) name.
    pub name: String,
    /// Member name on generated instances; differs from `name` under a rename map.
    pub property: String,
    pub type_name: String,
    pub nullable: Nullability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueRegistration {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumRegistration {
    pub name: String,
    pub description: Option<String>,
    pub values: Vec<EnumValueRegistration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentRegistration {
    /// Method the argument belongs to, when known.
    pub method: Option<String>,
    pub position: usize,
    pub name: String,
    pub type_name: String,
    pub nullable: Nullability,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodRegistration {
    pub name: String,
    pub kind: MethodKind,
    pub return_type: String,
    pub nullable: Nullability,
    pub description: Option<String>,
}

/// Sink for everything the bridge derives.
///
/// Calls arrive in dependency order: a nested type is registered before the
/// field that refers to it, and an enum before the first field using it.
pub trait TypeRegistrar {
    fn register_object_type(&mut self, registration: ObjectTypeRegistration);

    fn register_input_type(&mut self, registration: InputTypeRegistration);

    fn register_field(&mut self, registration: FieldRegistration);

    fn register_enum(&mut self, registration: EnumRegistration);

    fn register_argument(&mut self, registration: ArgumentRegistration);

    fn register_method(&mut self, registration: MethodRegistration);
}
