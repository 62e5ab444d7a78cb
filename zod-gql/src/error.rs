//! Error types for schema compilation.
//!
//! Compile-time failures are fatal: they surface while types are being
//! derived at startup and are propagated to the caller with `?`. Runtime
//! validation failures use [`ValidationFailure`](crate::ValidationFailure)
//! instead.
//!
//! # Error Codes
//!
//! Every error maps to an [`ErrorCode`]. When serialized, codes are
//! converted to SCREAMING_SNAKE_CASE strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Type-safe error codes for the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorCode {
    // Compile-time errors
    /// A schema node has no type mapping and no scalar provider covers it
    SchemaIncompatibility,
    /// An enum member value cannot be a GraphQL enum value
    IncompatibleEnumValue,
    /// A scalar provider returned something that is not a usable scalar
    InvalidScalarProvider,
    /// An object schema contains itself
    RecursiveSchema,

    // Runtime errors
    /// A value failed schema validation
    ValidationError,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SchemaIncompatibility => "SCHEMA_INCOMPATIBILITY",
            Self::IncompatibleEnumValue => "INCOMPATIBLE_ENUM_VALUE",
            Self::InvalidScalarProvider => "INVALID_SCALAR_PROVIDER",
            Self::RecursiveSchema => "RECURSIVE_SCHEMA",
            Self::ValidationError => "VALIDATION_ERROR",
        }
    }

    /// Returns true if the error can only be raised while compiling types.
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Self::SchemaIncompatibility
                | Self::IncompatibleEnumValue
                | Self::InvalidScalarProvider
                | Self::RecursiveSchema
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fatal error raised while deriving types from a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompileError {
    #[error("Unsupported type info of Key(\"{key}\") of Type(\"{type_name}\")")]
    SchemaIncompatibility { key: String, type_name: String },

    #[error("The value of the Key(\"{member}\") of {parent}.{key} Enum was not valid")]
    IncompatibleEnumValue {
        parent: String,
        key: String,
        member: String,
    },

    #[error(
        "The Scalar(Value=\"{provided}\") as Key(\"{key}\") of Type(\"{type_name}\") was not a valid scalar type"
    )]
    InvalidScalarProvider {
        key: String,
        type_name: String,
        provided: String,
    },

    #[error("Schema \"{name}\" contains itself and cannot be compiled")]
    RecursiveSchema { name: String },
}

impl CompileError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::SchemaIncompatibility { .. } => ErrorCode::SchemaIncompatibility,
            Self::IncompatibleEnumValue { .. } => ErrorCode::IncompatibleEnumValue,
            Self::InvalidScalarProvider { .. } => ErrorCode::InvalidScalarProvider,
            Self::RecursiveSchema { .. } => ErrorCode::RecursiveSchema,
        }
    }

    // Convenience constructors

    pub fn schema_incompatibility(key: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::SchemaIncompatibility {
            key: key.into(),
            type_name: type_name.into(),
        }
    }

    pub fn incompatible_enum_value(
        parent: impl Into<String>,
        key: impl Into<String>,
        member: impl Into<String>,
    ) -> Self {
        Self::IncompatibleEnumValue {
            parent: parent.into(),
            key: key.into(),
            member: member.into(),
        }
    }

    pub fn invalid_scalar_provider(
        key: impl Into<String>,
        type_name: impl Into<String>,
        provided: impl Into<String>,
    ) -> Self {
        Self::InvalidScalarProvider {
            key: key.into(),
            type_name: type_name.into(),
            provided: provided.into(),
        }
    }

    pub fn recursive_schema(name: impl Into<String>) -> Self {
        Self::RecursiveSchema { name: name.into() }
    }
}

/// Result alias for compilation.
pub type CompileResult<T> = Result<T, CompileError>;
