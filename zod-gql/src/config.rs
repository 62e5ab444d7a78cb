//! Configuration for the bridge.
//!
//! [`BridgeConfig`] holds the defaults every compilation inherits unless a
//! [`ModelOptions`](crate::ModelOptions) value overrides them. Hooks and
//! providers are closures and live on the
//! [`CompilationContext`](crate::CompilationContext) instead.
//!
//! # Example
//! ```rust,ignore
//! use zod_gql::{BridgeConfig, ValidationPolicy};
//!
//! let config = BridgeConfig::new()
//!     .with_policy(ValidationPolicy::safe().with_do_not_throw(true))
//!     .with_keep_source(true);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error type for configuration validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigValidationError {
    /// anonymous_type_prefix must be a valid GraphQL name
    InvalidAnonymousPrefix(String),
    /// enum_suffix must be a valid GraphQL name fragment
    InvalidEnumSuffix(String),
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAnonymousPrefix(prefix) => {
                write!(f, "anonymous_type_prefix '{}' is not a valid GraphQL name", prefix)
            }
            Self::InvalidEnumSuffix(suffix) => {
                write!(f, "enum_suffix '{}' is not a valid GraphQL name fragment", suffix)
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// How a managed field reacts to a value that fails validation.
///
/// * `safe` - run the non-panicking parse and offer the failure to the
///   `on_parse_error` hook, which may supply a fallback value.
/// * `do_not_throw` - store "absent" instead of returning the failure.
///
/// The default is strict: parse, and return every failure to the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationPolicy {
    pub safe: bool,
    pub do_not_throw: bool,
}

impl ValidationPolicy {
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn safe() -> Self {
        Self {
            safe: true,
            do_not_throw: false,
        }
    }

    #[must_use = "This method returns a new ValidationPolicy and does not modify self"]
    pub fn with_safe(mut self, safe: bool) -> Self {
        self.safe = safe;
        self
    }

    #[must_use = "This method returns a new ValidationPolicy and does not modify self"]
    pub fn with_do_not_throw(mut self, do_not_throw: bool) -> Self {
        self.do_not_throw = do_not_throw;
        self
    }
}

/// Bridge-wide defaults.
///
/// # Fields
///
/// * `policy` - Default [`ValidationPolicy`] for managed fields. Default: strict.
///
/// * `keep_source` - Retain the source schema on every generated type.
///   Default: false.
///
/// * `parse_to_instance` - Turn validated method results into model
///   instances instead of plain values. Default: true.
///
/// * `debug_logging` - Log a summary of every compiled field. Default: false.
///
/// * `anonymous_type_prefix` - Prefix for types whose name cannot be derived
///   from an option or a description. Default: `ClassFromZod`.
///
/// * `enum_suffix` - Suffix appended to generated enum names. Default: `Enum`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub policy: ValidationPolicy,
    pub keep_source: bool,
    pub parse_to_instance: bool,
    pub debug_logging: bool,
    pub anonymous_type_prefix: String,
    pub enum_suffix: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            policy: ValidationPolicy::default(),
            keep_source: false,
            parse_to_instance: true,
            debug_logging: false,
            anonymous_type_prefix: "ClassFromZod".to_string(),
            enum_suffix: "Enum".to_string(),
        }
    }
}

impl BridgeConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration and return an error if invalid.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `anonymous_type_prefix` is not a valid GraphQL name
    /// - `enum_suffix` contains characters GraphQL names cannot hold
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !crate::naming::is_graphql_name(&self.anonymous_type_prefix) {
            return Err(ConfigValidationError::InvalidAnonymousPrefix(
                self.anonymous_type_prefix.clone(),
            ));
        }
        if !self
            .enum_suffix
            .chars()
            .all(|c| c == '_' || c.is_ascii_alphanumeric())
        {
            return Err(ConfigValidationError::InvalidEnumSuffix(
                self.enum_suffix.clone(),
            ));
        }
        Ok(())
    }

    #[must_use = "This method returns a new BridgeConfig and does not modify self"]
    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use = "This method returns a new BridgeConfig and does not modify self"]
    pub fn with_keep_source(mut self, keep_source: bool) -> Self {
        self.keep_source = keep_source;
        self
    }

    #[must_use = "This method returns a new BridgeConfig and does not modify self"]
    pub fn with_parse_to_instance(mut self, parse_to_instance: bool) -> Self {
        self.parse_to_instance = parse_to_instance;
        self
    }

    #[must_use = "This method returns a new BridgeConfig and does not modify self"]
    pub fn with_debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    #[must_use = "This method returns a new BridgeConfig and does not modify self"]
    pub fn with_anonymous_type_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.anonymous_type_prefix = prefix.into();
        self
    }

    #[must_use = "This method returns a new BridgeConfig and does not modify self"]
    pub fn with_enum_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.enum_suffix = suffix.into();
        self
    }
}
