//! Instances of generated types.

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::accessor::ManagedField;
use crate::compiler::GeneratedType;
use crate::schema::{Issue, ParseError, SchemaRef};
use crate::validation::ValidationFailure;

/// A value of a [`GeneratedType`] whose fields re-validate on every write.
#[derive(Clone)]
pub struct ModelInstance {
    generated: Arc<GeneratedType>,
    fields: Vec<(String, ManagedField)>,
}

impl fmt::Debug for ModelInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelInstance")
            .field("type", &self.generated.name())
            .field("value", &self.to_value())
            .finish()
    }
}

impl ModelInstance {
    /// Fresh instance with every field at its initial (default) value.
    pub fn new(generated: Arc<GeneratedType>) -> Self {
        let fields = generated
            .fields()
            .iter()
            .map(|field| {
                (
                    field.property.clone(),
                    ManagedField::new(
                        field.key.clone(),
                        field.schema.clone(),
                        generated.policy().clone(),
                        field.initial_value.clone(),
                    ),
                )
            })
            .collect();
        Self { generated, fields }
    }

    /// Instance holding already-parsed values, stored without re-validation.
    pub(crate) fn from_parsed(generated: Arc<GeneratedType>, value: &Value) -> Self {
        let mut instance = Self::new(generated.clone());
        let policy = generated.policy().clone();
        for (index, field) in generated.fields().iter().enumerate() {
            let stored = value.get(&field.key).cloned();
            if let Some(slot) = instance.fields.get_mut(index) {
                slot.1 = ManagedField::new(field.key.clone(), field.schema.clone(), policy.clone(), stored);
            }
        }
        instance
    }

    pub fn generated_type(&self) -> &Arc<GeneratedType> {
        &self.generated
    }

    /// The source schema, when the type retained it.
    pub fn source_schema(&self) -> Option<&SchemaRef> {
        self.generated.source()
    }

    /// Current value of a member.
    pub fn get(&self, property: &str) -> Option<&Value> {
        self.slot(property).and_then(ManagedField::read)
    }

    /// Writes a member through its managed field.
    ///
    /// # Errors
    ///
    /// Fails for an unknown member, or when the field rejects the value.
    pub fn set(&mut self, property: &str, value: impl Into<Option<Value>>) -> Result<(), ValidationFailure> {
        match self.fields.iter_mut().find(|(name, _)| name == property) {
            Some((_, field)) => field.write(value.into()),
            None => Err(ValidationFailure::unknown_property(property)),
        }
    }

    /// Writes every key of `value` that names a field (by wire key or member
    /// name). Unknown keys are ignored; every failure is collected.
    pub fn assign(&mut self, value: &Value) -> Result<(), ValidationFailure> {
        let map = self.expect_object(value)?;
        let mut failure: Option<ValidationFailure> = None;

        for (property, field) in &mut self.fields {
            let incoming = map.get(field.key()).or_else(|| map.get(property.as_str()));
            if let Some(incoming) = incoming {
                if let Err(err) = field.write(Some(incoming.clone())) {
                    failure = Some(match failure {
                        Some(existing) => existing.merge(err),
                        None => err,
                    });
                }
            }
        }

        failure.map_or(Ok(()), Err)
    }

    /// Writes every field from `value`, treating a missing key as absent.
    pub(crate) fn populate(&mut self, value: &Value) -> Result<(), ValidationFailure> {
        let map = self.expect_object(value)?;
        let mut failure: Option<ValidationFailure> = None;

        for (_, field) in &mut self.fields {
            let incoming = map.get(field.key()).cloned();
            if let Err(err) = field.write(incoming) {
                failure = Some(match failure {
                    Some(existing) => existing.merge(err),
                    None => err,
                });
            }
        }

        failure.map_or(Ok(()), Err)
    }

    /// Present fields keyed by wire name.
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .filter_map(|(_, field)| field.read().map(|v| (field.key().to_string(), v.clone())))
            .collect();
        Value::Object(map)
    }

    fn slot(&self, property: &str) -> Option<&ManagedField> {
        self.fields
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, field)| field)
    }

    fn expect_object<'v>(&self, value: &'v Value) -> Result<&'v Map<String, Value>, ValidationFailure> {
        value.as_object().ok_or_else(|| {
            let issue = Issue::new(
                "invalid_type",
                format!("Expected object, received {}", json_type(value)),
            );
            ValidationFailure::from_parse_error(self.generated.name(), Some(value), &ParseError::single(issue))
        })
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Serialize for ModelInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
