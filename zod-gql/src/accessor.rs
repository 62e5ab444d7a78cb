//! Managed fields.
//!
//! Every field of a generated type is backed by a [`ManagedField`]: reads
//! return the stored value, writes run the field schema first and store the
//! parsed output.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

use crate::config::ValidationPolicy;
use crate::schema::{ParseError, ParseParams, SchemaRef};
use crate::validation::ValidationFailure;

/// `(key, new_value, previous_value, error) -> fallback`.
pub type ParseErrorHook =
    Arc<dyn Fn(&str, Option<&Value>, Option<&Value>, &ParseError) -> Option<Value> + Send + Sync>;

/// `(key, previous_value) -> params` for the next parse.
pub type ParsingHook = Arc<dyn Fn(&str, Option<&Value>) -> ParseParams + Send + Sync>;

/// Write policy shared by every field of one generated type.
#[derive(Clone, Default)]
pub struct FieldPolicy {
    pub policy: ValidationPolicy,
    pub on_parse_error: Option<ParseErrorHook>,
    pub on_parsing: Option<ParsingHook>,
}

impl fmt::Debug for FieldPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldPolicy")
            .field("policy", &self.policy)
            .field("has_on_parse_error", &self.on_parse_error.is_some())
            .field("has_on_parsing", &self.on_parsing.is_some())
            .finish()
    }
}

/// One validated slot.
#[derive(Clone)]
pub struct ManagedField {
    key: String,
    schema: SchemaRef,
    policy: Arc<FieldPolicy>,
    value: Option<Value>,
}

impl fmt::Debug for ManagedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedField")
            .field("key", &self.key)
            .field("value", &self.value)
            .finish()
    }
}

impl ManagedField {
    /// A slot holding `initial`, which is stored without validation.
    pub fn new(
        key: impl Into<String>,
        schema: SchemaRef,
        policy: Arc<FieldPolicy>,
        initial: Option<Value>,
    ) -> Self {
        Self {
            key: key.into(),
            schema,
            policy,
            value: initial,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn read(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Validates and stores `value`.
    ///
    /// # Errors
    ///
    /// Returns the failure keyed under this field's wire name unless the
    /// policy swallows it or the `on_parse_error` hook supplies a fallback.
    pub fn write(&mut self, value: Option<Value>) -> Result<(), ValidationFailure> {
        let params = match &self.policy.on_parsing {
            Some(hook) => hook(&self.key, self.value.as_ref()),
            None => ParseParams::default(),
        };
        let policy = self.policy.policy;

        if policy.safe {
            let error = match self.schema.safe_parse(value.as_ref(), &params) {
                Ok(parsed) => {
                    self.value = parsed;
                    return Ok(());
                }
                Err(error) => error,
            };

            let fallback = self
                .policy
                .on_parse_error
                .as_ref()
                .and_then(|hook| hook(&self.key, value.as_ref(), self.value.as_ref(), &error));

            if let Some(fallback) = fallback {
                self.value = Some(fallback);
                Ok(())
            } else if policy.do_not_throw {
                warn!(key = %self.key, error = %error, "Discarding invalid value");
                self.value = None;
                Ok(())
            } else {
                Err(ValidationFailure::for_property(&self.key, value.as_ref(), &error))
            }
        } else {
            match self.schema.parse(value.as_ref(), &params) {
                Ok(parsed) => {
                    self.value = parsed;
                    Ok(())
                }
                Err(error) if policy.do_not_throw => {
                    warn!(key = %self.key, error = %error, "Discarding invalid value");
                    self.value = None;
                    Ok(())
                }
                Err(error) => Err(ValidationFailure::for_property(&self.key, value.as_ref(), &error)),
            }
        }
    }

    pub fn into_value(self) -> Option<Value> {
        self.value
    }
}
