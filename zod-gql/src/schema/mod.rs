//! Validator capability interface.
//!
//! The bridge never depends on a concrete validator. Everything it needs from
//! a schema tree goes through [`SchemaNode`]: which wrapper a node is, what sits
//! one layer inside it, its object shape or enum members, and how to parse a
//! value with it. An adapter implements the trait once per validator library;
//! [`zod`] is the adapter for the bundled Zod-style validator.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub mod zod;

/// Shared handle to a schema node.
pub type SchemaRef = Arc<dyn SchemaNode>;

/// Stable identity token of a schema node.
///
/// Two structurally identical nodes built separately carry different ids;
/// compiled artifacts are memoized by this token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaId(u64);

impl SchemaId {
    /// Allocate the next id in creation order.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw creation-order index.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "schema#{}", self.0)
    }
}

/// Wrapper category of a schema node.
///
/// Every wrapper carries exactly one inner node. `None` marks a terminal node
/// (scalar, enum, object, union, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapperKind {
    Array,
    Optional,
    Nullable,
    Default,
    Transform,
    Effect,
    Catch,
    Lazy,
    Promise,
    None,
}

impl WrapperKind {
    /// Returns true for every kind that carries an inner node.
    pub fn is_wrapper(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Array => "array",
            Self::Optional => "optional",
            Self::Nullable => "nullable",
            Self::Default => "default",
            Self::Transform => "transform",
            Self::Effect => "effect",
            Self::Catch => "catch",
            Self::Lazy => "lazy",
            Self::Promise => "promise",
            Self::None => "none",
        }
    }
}

impl fmt::Display for WrapperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal category of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScalarKind {
    String,
    /// `integer` is set when the node declares an integer refinement.
    Number {
        integer: bool,
    },
    Boolean,
    Enum,
    Object,
    BigInt,
    Date,
    Literal,
    Union,
    Record,
    Null,
    Any,
    Unknown,
}

/// One segment of an issue path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Contextual parameters for a single parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseParams {
    /// Path prepended to every reported issue.
    pub path: Vec<PathSegment>,
    /// Replaces the message of every reported issue.
    pub message: Option<String>,
}

impl ParseParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, path: impl IntoIterator<Item = impl Into<PathSegment>>) -> Self {
        self.path = path.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// A single validator complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub path: Vec<PathSegment>,
    pub code: String,
    pub message: String,
}

impl Issue {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn at(mut self, path: Vec<PathSegment>) -> Self {
        self.path = path;
        self
    }

    /// Dotted rendering of the issue path (`address.zip`, `tags.1`).
    pub fn dotted_path(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Raw validator failure: every issue found during one parse.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{}", render_issues(.issues))]
pub struct ParseError {
    pub issues: Vec<Issue>,
}

impl ParseError {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    pub fn single(issue: Issue) -> Self {
        Self {
            issues: vec![issue],
        }
    }
}

fn render_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|issue| {
            if issue.path.is_empty() {
                format!("[{}] {}", issue.code, issue.message)
            } else {
                format!("[{}] {}: {}", issue.code, issue.dotted_path(), issue.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Capability interface over one validation-schema node.
///
/// Only `id`, `wrapper_kind`, `inner`, `scalar_kind`, `description` and
/// `parse` are required. The structural accessors default to "not this kind".
/// Inputs and outputs use `None` for an absent (undefined) value and
/// `Some(Value::Null)` for an explicit null.
pub trait SchemaNode: fmt::Debug + Send + Sync {
    fn id(&self) -> SchemaId;

    fn wrapper_kind(&self) -> WrapperKind;

    /// The single inner node of a wrapper (the element for arrays).
    fn inner(&self) -> Option<SchemaRef>;

    fn scalar_kind(&self) -> ScalarKind;

    fn description(&self) -> Option<&str>;

    /// Invokes the default thunk of a `Default` wrapper.
    fn default_value(&self) -> Option<Value> {
        None
    }

    /// Ordered fields of an object node.
    fn shape(&self) -> Option<Vec<(String, SchemaRef)>> {
        None
    }

    /// Ordered `name -> value` members of an enum node.
    fn enum_members(&self) -> Option<Vec<(String, Value)>> {
        None
    }

    fn union_options(&self) -> Option<Vec<SchemaRef>> {
        None
    }

    /// Key and value schemas of a record node.
    fn record_types(&self) -> Option<(SchemaRef, SchemaRef)> {
        None
    }

    fn literal_value(&self) -> Option<Value> {
        None
    }

    fn parse(&self, input: Option<&Value>, params: &ParseParams) -> Result<Option<Value>, ParseError>;

    /// Non-panicking parse. Adapters whose `parse` can panic (user transforms,
    /// refinements) override this to turn the panic into an issue.
    fn safe_parse(&self, input: Option<&Value>, params: &ParseParams) -> Result<Option<Value>, ParseError> {
        self.parse(input, params)
    }

    fn parse_async(
        &self,
        input: Option<Value>,
        params: ParseParams,
    ) -> BoxFuture<'_, Result<Option<Value>, ParseError>> {
        Box::pin(async move { self.parse(input.as_ref(), &params) })
    }

    /// Whether the node accepts an absent value.
    fn is_optional(&self) -> bool {
        self.parse(None, &ParseParams::default()).is_ok()
    }

    /// Whether the node accepts an explicit null.
    fn is_nullable(&self) -> bool {
        self.parse(Some(&Value::Null), &ParseParams::default())
            .is_ok()
    }
}
