//! Reference Zod-style validator.
//!
//! A small, immutable schema builder with Zod's parse semantics: unknown
//! object keys are stripped, `optional` accepts an absent value, `nullable`
//! accepts null, `default` fills an absent value, and every failure is
//! reported as an [`Issue`] with a Zod issue code.
//!
//! ```ignore
//! use zod_gql::schema::zod::z;
//!
//! let user = z::object([
//!     ("name", z::string().min(1.0)),
//!     ("age", z::number().int()),
//!     ("tags", z::array(z::string()).optional()),
//! ])
//! .describe("User: A registered user");
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use serde_json::{Map, Number, Value};
use tracing::{trace, warn};

use super::{
    Issue, ParseError, ParseParams, PathSegment, ScalarKind, SchemaId, SchemaNode, SchemaRef,
    WrapperKind,
};

type DefaultFn = Arc<dyn Fn() -> Value + Send + Sync>;
type TransformFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;
type RefineFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
type LazyFn = Arc<dyn Fn() -> ZodType + Send + Sync>;

#[derive(Debug, Clone)]
enum StringCheck {
    Min(usize),
    Max(usize),
    Email,
    Pattern {
        source: String,
        compiled: Option<Regex>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum NumberCheck {
    Int,
    Min(f64),
    Max(f64),
}

#[derive(Clone)]
enum ZodDef {
    String(Vec<StringCheck>),
    Number(Vec<NumberCheck>),
    Boolean,
    BigInt,
    Date,
    Null,
    Any,
    Unknown,
    Literal(Value),
    Enum(Vec<(String, Value)>),
    Object(Vec<(String, ZodType)>),
    Array(ZodType),
    Union(Vec<ZodType>),
    Record(ZodType, ZodType),
    Optional(ZodType),
    Nullable(ZodType),
    Default(ZodType, DefaultFn),
    Transform(ZodType, TransformFn),
    Refine(ZodType, RefineFn, String),
    Catch(ZodType, Value),
    Lazy(LazyFn),
    Promise(ZodType),
}

impl ZodDef {
    fn kind_name(&self) -> &'static str {
        match self {
            Self::String(_) => "ZodString",
            Self::Number(_) => "ZodNumber",
            Self::Boolean => "ZodBoolean",
            Self::BigInt => "ZodBigInt",
            Self::Date => "ZodDate",
            Self::Null => "ZodNull",
            Self::Any => "ZodAny",
            Self::Unknown => "ZodUnknown",
            Self::Literal(_) => "ZodLiteral",
            Self::Enum(_) => "ZodEnum",
            Self::Object(_) => "ZodObject",
            Self::Array(_) => "ZodArray",
            Self::Union(_) => "ZodUnion",
            Self::Record(_, _) => "ZodRecord",
            Self::Optional(_) => "ZodOptional",
            Self::Nullable(_) => "ZodNullable",
            Self::Default(_, _) => "ZodDefault",
            Self::Transform(_, _) => "ZodTransform",
            Self::Refine(_, _, _) => "ZodEffects",
            Self::Catch(_, _) => "ZodCatch",
            Self::Lazy(_) => "ZodLazy",
            Self::Promise(_) => "ZodPromise",
        }
    }
}

struct ZodNode {
    id: SchemaId,
    description: Option<String>,
    def: ZodDef,
}

impl fmt::Debug for ZodNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.def.kind_name())
            .field("id", &self.id)
            .field("description", &self.description)
            .finish()
    }
}

/// An immutable schema node. Cloning shares the node (and its identity);
/// every modifier returns a new node.
#[derive(Clone)]
pub struct ZodType(Arc<ZodNode>);

impl fmt::Debug for ZodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<ZodType> for SchemaRef {
    fn from(ty: ZodType) -> Self {
        ty.0
    }
}

impl ZodType {
    fn new(def: ZodDef) -> Self {
        Self::described(def, None)
    }

    fn described(def: ZodDef, description: Option<String>) -> Self {
        Self(Arc::new(ZodNode {
            id: SchemaId::next(),
            description,
            def,
        }))
    }

    /// Wrappers inherit the description of the node they wrap.
    fn wrapped(&self, def: ZodDef) -> Self {
        Self::described(def, self.0.description.clone())
    }

    pub fn id(&self) -> SchemaId {
        self.0.id
    }

    /// Shared capability handle for this node.
    pub fn schema(&self) -> SchemaRef {
        self.0.clone()
    }

    pub fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    pub fn describe(&self, description: impl Into<String>) -> Self {
        Self::described(self.0.def.clone(), Some(description.into()))
    }

    pub fn optional(&self) -> Self {
        self.wrapped(ZodDef::Optional(self.clone()))
    }

    pub fn nullable(&self) -> Self {
        self.wrapped(ZodDef::Nullable(self.clone()))
    }

    pub fn nullish(&self) -> Self {
        self.nullable().optional()
    }

    pub fn array(&self) -> Self {
        ZodType::new(ZodDef::Array(self.clone()))
    }

    pub fn default(&self, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.default_with(move || value.clone())
    }

    pub fn default_with<F>(&self, thunk: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.wrapped(ZodDef::Default(self.clone(), Arc::new(thunk)))
    }

    /// Maps a successfully parsed, present value.
    pub fn transform<F>(&self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.wrapped(ZodDef::Transform(self.clone(), Arc::new(f)))
    }

    /// Adds a `custom` issue when the predicate rejects a present value.
    pub fn refine<F>(&self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.wrapped(ZodDef::Refine(self.clone(), Arc::new(predicate), message.into()))
    }

    /// Replaces any failed parse with `fallback`.
    pub fn catch(&self, fallback: impl Into<Value>) -> Self {
        self.wrapped(ZodDef::Catch(self.clone(), fallback.into()))
    }

    pub fn promise(&self) -> Self {
        ZodType::new(ZodDef::Promise(self.clone()))
    }

    /// Minimum length for strings, minimum value for numbers.
    /// Other nodes are returned unchanged.
    pub fn min(&self, bound: f64) -> Self {
        match &self.0.def {
            ZodDef::String(checks) => {
                self.with_string_check(checks, StringCheck::Min(bound.max(0.0) as usize))
            }
            ZodDef::Number(checks) => self.with_number_check(checks, NumberCheck::Min(bound)),
            _ => self.clone(),
        }
    }

    /// Maximum length for strings, maximum value for numbers.
    /// Other nodes are returned unchanged.
    pub fn max(&self, bound: f64) -> Self {
        match &self.0.def {
            ZodDef::String(checks) => {
                self.with_string_check(checks, StringCheck::Max(bound.max(0.0) as usize))
            }
            ZodDef::Number(checks) => self.with_number_check(checks, NumberCheck::Max(bound)),
            _ => self.clone(),
        }
    }

    pub fn int(&self) -> Self {
        match &self.0.def {
            ZodDef::Number(checks) => self.with_number_check(checks, NumberCheck::Int),
            _ => self.clone(),
        }
    }

    pub fn email(&self) -> Self {
        match &self.0.def {
            ZodDef::String(checks) => self.with_string_check(checks, StringCheck::Email),
            _ => self.clone(),
        }
    }

    pub fn regex(&self, pattern: &str) -> Self {
        match &self.0.def {
            ZodDef::String(checks) => {
                let compiled = match Regex::new(pattern) {
                    Ok(re) => Some(re),
                    Err(e) => {
                        warn!(pattern = %pattern, error = %e, "Invalid validation regex pattern");
                        None
                    }
                };
                self.with_string_check(
                    checks,
                    StringCheck::Pattern {
                        source: pattern.to_string(),
                        compiled,
                    },
                )
            }
            _ => self.clone(),
        }
    }

    fn with_string_check(&self, checks: &[StringCheck], check: StringCheck) -> Self {
        let mut checks = checks.to_vec();
        checks.push(check);
        Self::described(ZodDef::String(checks), self.0.description.clone())
    }

    fn with_number_check(&self, checks: &[NumberCheck], check: NumberCheck) -> Self {
        let mut checks = checks.to_vec();
        checks.push(check);
        Self::described(ZodDef::Number(checks), self.0.description.clone())
    }

    /// Parse convenience for callers holding the concrete type.
    pub fn parse(&self, input: Option<&Value>) -> Result<Option<Value>, ParseError> {
        self.0.parse(input, &ParseParams::default())
    }
}

/// Builder namespace mirroring Zod's `z` object.
pub mod z {
    use serde_json::Value;

    use super::{ZodDef, ZodType};

    pub fn string() -> ZodType {
        ZodType::new(ZodDef::String(Vec::new()))
    }

    pub fn number() -> ZodType {
        ZodType::new(ZodDef::Number(Vec::new()))
    }

    pub fn boolean() -> ZodType {
        ZodType::new(ZodDef::Boolean)
    }

    pub fn bigint() -> ZodType {
        ZodType::new(ZodDef::BigInt)
    }

    /// ISO-8601 date or date-time string.
    pub fn date() -> ZodType {
        ZodType::new(ZodDef::Date)
    }

    pub fn null() -> ZodType {
        ZodType::new(ZodDef::Null)
    }

    pub fn any() -> ZodType {
        ZodType::new(ZodDef::Any)
    }

    pub fn unknown() -> ZodType {
        ZodType::new(ZodDef::Unknown)
    }

    pub fn literal(value: impl Into<Value>) -> ZodType {
        ZodType::new(ZodDef::Literal(value.into()))
    }

    /// String enum: every member's name is its value.
    pub fn enumeration<I, S>(values: I) -> ZodType
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members = values
            .into_iter()
            .map(|value| {
                let value = value.into();
                (value.clone(), Value::String(value))
            })
            .collect();
        ZodType::new(ZodDef::Enum(members))
    }

    /// Enum with explicit `name -> value` members. Values may be any JSON
    /// value, which is how numeric enums are expressed.
    pub fn native_enum<I, K, V>(members: I) -> ZodType
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let members = members
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        ZodType::new(ZodDef::Enum(members))
    }

    pub fn object<I, K>(fields: I) -> ZodType
    where
        I: IntoIterator<Item = (K, ZodType)>,
        K: Into<String>,
    {
        let fields = fields
            .into_iter()
            .map(|(key, ty)| (key.into(), ty))
            .collect();
        ZodType::new(ZodDef::Object(fields))
    }

    pub fn array(element: ZodType) -> ZodType {
        element.array()
    }

    pub fn union<I>(options: I) -> ZodType
    where
        I: IntoIterator<Item = ZodType>,
    {
        ZodType::new(ZodDef::Union(options.into_iter().collect()))
    }

    pub fn record(key: ZodType, value: ZodType) -> ZodType {
        ZodType::new(ZodDef::Record(key, value))
    }

    /// Deferred schema. The closure should hand back the same node on every
    /// call so compiled artifacts stay memoized.
    pub fn lazy<F>(f: F) -> ZodType
    where
        F: Fn() -> ZodType + Send + Sync + 'static,
    {
        ZodType::new(ZodDef::Lazy(std::sync::Arc::new(f)))
    }
}

struct ParseCtx<'p> {
    path: Vec<PathSegment>,
    issues: Vec<Issue>,
    message: Option<&'p str>,
}

impl<'p> ParseCtx<'p> {
    fn new(params: &'p ParseParams) -> Self {
        Self {
            path: params.path.clone(),
            issues: Vec::new(),
            message: params.message.as_deref(),
        }
    }

    fn branch(&self) -> Self {
        Self {
            path: self.path.clone(),
            issues: Vec::new(),
            message: self.message,
        }
    }

    fn report(&mut self, code: &str, message: String) {
        let message = self.message.map(str::to_owned).unwrap_or(message);
        self.issues.push(Issue {
            path: self.path.clone(),
            code: code.to_string(),
            message,
        });
    }

    fn invalid_type(&mut self, expected: &str, received: Option<&Value>) {
        let message = match received {
            None => "Required".to_string(),
            Some(value) => format!("Expected {}, received {}", expected, type_of(value)),
        };
        self.report("invalid_type", message);
    }
}

fn type_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_integer(n: &Number) -> bool {
    n.is_i64() || n.is_u64() || n.as_f64().map_or(false, |f| f.fract() == 0.0)
}

fn is_email(value: &str) -> bool {
    value.contains('@')
        && value.split('@').count() == 2
        && value
            .split('@')
            .next_back()
            .map(|domain| domain.contains('.'))
            .unwrap_or(false)
        && !value.starts_with('@')
        && !value.ends_with('@')
        && !value.ends_with('.')
}

fn iso_date() -> Option<&'static Regex> {
    static ISO_DATE: OnceLock<Option<Regex>> = OnceLock::new();
    ISO_DATE
        .get_or_init(|| {
            Regex::new(
                r"^\d{4}-\d{2}-\d{2}(?:[T ]\d{2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:Z|[+-]\d{2}:?\d{2})?)?$",
            )
            .ok()
        })
        .as_ref()
}

fn check_string(value: &str, checks: &[StringCheck], ctx: &mut ParseCtx<'_>) {
    let length = value.chars().count();
    for check in checks {
        match check {
            StringCheck::Min(min) if length < *min => ctx.report(
                "too_small",
                format!("String must contain at least {} character(s)", min),
            ),
            StringCheck::Max(max) if length > *max => ctx.report(
                "too_big",
                format!("String must contain at most {} character(s)", max),
            ),
            StringCheck::Email if !is_email(value) => {
                ctx.report("invalid_string", "Invalid email".to_string())
            }
            StringCheck::Pattern { compiled, source } => match compiled {
                Some(re) if !re.is_match(value) => {
                    ctx.report("invalid_string", "Invalid".to_string())
                }
                Some(_) => {}
                None => ctx.report(
                    "invalid_string",
                    format!("Invalid validation pattern: {}", source),
                ),
            },
            _ => {}
        }
    }
}

fn check_number(value: &Number, checks: &[NumberCheck], ctx: &mut ParseCtx<'_>) {
    let as_float = value.as_f64().unwrap_or_default();
    for check in checks {
        match *check {
            NumberCheck::Int if !is_integer(value) => ctx.report(
                "invalid_type",
                "Expected integer, received float".to_string(),
            ),
            NumberCheck::Min(min) if as_float < min => ctx.report(
                "too_small",
                format!("Number must be greater than or equal to {}", min),
            ),
            NumberCheck::Max(max) if as_float > max => ctx.report(
                "too_big",
                format!("Number must be less than or equal to {}", max),
            ),
            _ => {}
        }
    }
}

fn render_members(members: &[(String, Value)]) -> String {
    members
        .iter()
        .map(|(_, value)| match value {
            Value::String(s) => format!("'{}'", s),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

impl ZodNode {
    fn run(&self, input: Option<&Value>, ctx: &mut ParseCtx<'_>) -> Option<Value> {
        match &self.def {
            ZodDef::String(checks) => match input {
                Some(Value::String(s)) => {
                    check_string(s, checks, ctx);
                    Some(Value::String(s.clone()))
                }
                other => {
                    ctx.invalid_type("string", other);
                    None
                }
            },
            ZodDef::Number(checks) => match input {
                Some(Value::Number(n)) => {
                    check_number(n, checks, ctx);
                    Some(Value::Number(n.clone()))
                }
                other => {
                    ctx.invalid_type("number", other);
                    None
                }
            },
            ZodDef::Boolean => match input {
                Some(Value::Bool(b)) => Some(Value::Bool(*b)),
                other => {
                    ctx.invalid_type("boolean", other);
                    None
                }
            },
            ZodDef::BigInt => match input {
                Some(Value::Number(n)) if is_integer(n) => Some(Value::Number(n.clone())),
                other => {
                    ctx.invalid_type("bigint", other);
                    None
                }
            },
            ZodDef::Date => match input {
                Some(Value::String(s)) => {
                    if !iso_date().map_or(false, |re| re.is_match(s)) {
                        ctx.report("invalid_date", "Invalid date".to_string());
                    }
                    Some(Value::String(s.clone()))
                }
                other => {
                    ctx.invalid_type("date", other);
                    None
                }
            },
            ZodDef::Null => match input {
                Some(Value::Null) => Some(Value::Null),
                other => {
                    ctx.invalid_type("null", other);
                    None
                }
            },
            ZodDef::Any | ZodDef::Unknown => input.cloned(),
            ZodDef::Literal(expected) => {
                if input == Some(expected) {
                    Some(expected.clone())
                } else {
                    ctx.report(
                        "invalid_literal",
                        format!("Invalid literal value, expected {}", expected),
                    );
                    None
                }
            }
            ZodDef::Enum(members) => match input {
                Some(value) if members.iter().any(|(_, member)| member == value) => {
                    Some(value.clone())
                }
                Some(value @ (Value::String(_) | Value::Number(_))) => {
                    ctx.report(
                        "invalid_enum_value",
                        format!(
                            "Invalid enum value. Expected {}, received {}",
                            render_members(members),
                            match value {
                                Value::String(s) => format!("'{}'", s),
                                other => other.to_string(),
                            }
                        ),
                    );
                    None
                }
                other => {
                    ctx.invalid_type(&render_members(members), other);
                    None
                }
            },
            ZodDef::Object(fields) => match input {
                Some(Value::Object(map)) => {
                    let mut out = Map::new();
                    for (key, field) in fields {
                        ctx.path.push(PathSegment::Key(key.clone()));
                        if let Some(value) = field.0.run(map.get(key), ctx) {
                            out.insert(key.clone(), value);
                        }
                        ctx.path.pop();
                    }
                    Some(Value::Object(out))
                }
                other => {
                    ctx.invalid_type("object", other);
                    None
                }
            },
            ZodDef::Array(element) => match input {
                Some(Value::Array(items)) => {
                    let mut out = Vec::with_capacity(items.len());
                    for (index, item) in items.iter().enumerate() {
                        ctx.path.push(PathSegment::Index(index));
                        out.push(element.0.run(Some(item), ctx).unwrap_or(Value::Null));
                        ctx.path.pop();
                    }
                    Some(Value::Array(out))
                }
                other => {
                    ctx.invalid_type("array", other);
                    None
                }
            },
            ZodDef::Union(options) => {
                for option in options {
                    let mut branch = ctx.branch();
                    let out = option.0.run(input, &mut branch);
                    if branch.issues.is_empty() {
                        return out;
                    }
                }
                ctx.report("invalid_union", "Invalid input".to_string());
                None
            }
            ZodDef::Record(key_type, value_type) => match input {
                Some(Value::Object(map)) => {
                    let mut out = Map::new();
                    for (key, value) in map {
                        ctx.path.push(PathSegment::Key(key.clone()));
                        key_type.0.run(Some(&Value::String(key.clone())), ctx);
                        if let Some(value) = value_type.0.run(Some(value), ctx) {
                            out.insert(key.clone(), value);
                        }
                        ctx.path.pop();
                    }
                    Some(Value::Object(out))
                }
                other => {
                    ctx.invalid_type("object", other);
                    None
                }
            },
            ZodDef::Optional(inner) => match input {
                None => None,
                some => inner.0.run(some, ctx),
            },
            ZodDef::Nullable(inner) => match input {
                Some(Value::Null) => Some(Value::Null),
                other => inner.0.run(other, ctx),
            },
            ZodDef::Default(inner, thunk) => match input {
                None => inner.0.run(Some(&thunk()), ctx),
                some => inner.0.run(some, ctx),
            },
            ZodDef::Transform(inner, f) => {
                let before = ctx.issues.len();
                let out = inner.0.run(input, ctx);
                if ctx.issues.len() > before {
                    return None;
                }
                out.map(|value| f(value))
            }
            ZodDef::Refine(inner, predicate, message) => {
                let before = ctx.issues.len();
                let out = inner.0.run(input, ctx);
                if ctx.issues.len() == before {
                    if let Some(value) = &out {
                        if !predicate(value) {
                            ctx.report("custom", message.clone());
                        }
                    }
                }
                out
            }
            ZodDef::Catch(inner, fallback) => {
                let mut branch = ctx.branch();
                let out = inner.0.run(input, &mut branch);
                if branch.issues.is_empty() {
                    out
                } else {
                    trace!(id = %self.id, "Parse failure replaced by catch value");
                    Some(fallback.clone())
                }
            }
            ZodDef::Lazy(f) => f().0.run(input, ctx),
            ZodDef::Promise(inner) => inner.0.run(input, ctx),
        }
    }
}

impl SchemaNode for ZodNode {
    fn id(&self) -> SchemaId {
        self.id
    }

    fn wrapper_kind(&self) -> WrapperKind {
        match &self.def {
            ZodDef::Array(_) => WrapperKind::Array,
            ZodDef::Optional(_) => WrapperKind::Optional,
            ZodDef::Nullable(_) => WrapperKind::Nullable,
            ZodDef::Default(_, _) => WrapperKind::Default,
            ZodDef::Transform(_, _) => WrapperKind::Transform,
            ZodDef::Refine(_, _, _) => WrapperKind::Effect,
            ZodDef::Catch(_, _) => WrapperKind::Catch,
            ZodDef::Lazy(_) => WrapperKind::Lazy,
            ZodDef::Promise(_) => WrapperKind::Promise,
            _ => WrapperKind::None,
        }
    }

    fn inner(&self) -> Option<SchemaRef> {
        match &self.def {
            ZodDef::Array(inner)
            | ZodDef::Optional(inner)
            | ZodDef::Nullable(inner)
            | ZodDef::Default(inner, _)
            | ZodDef::Transform(inner, _)
            | ZodDef::Refine(inner, _, _)
            | ZodDef::Catch(inner, _)
            | ZodDef::Promise(inner) => Some(inner.schema()),
            ZodDef::Lazy(f) => Some(f().schema()),
            _ => None,
        }
    }

    fn scalar_kind(&self) -> ScalarKind {
        match &self.def {
            ZodDef::String(_) => ScalarKind::String,
            ZodDef::Number(checks) => ScalarKind::Number {
                integer: checks.contains(&NumberCheck::Int),
            },
            ZodDef::Boolean => ScalarKind::Boolean,
            ZodDef::BigInt => ScalarKind::BigInt,
            ZodDef::Date => ScalarKind::Date,
            ZodDef::Null => ScalarKind::Null,
            ZodDef::Any => ScalarKind::Any,
            ZodDef::Literal(_) => ScalarKind::Literal,
            ZodDef::Enum(_) => ScalarKind::Enum,
            ZodDef::Object(_) => ScalarKind::Object,
            ZodDef::Union(_) => ScalarKind::Union,
            ZodDef::Record(_, _) => ScalarKind::Record,
            _ => ScalarKind::Unknown,
        }
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn default_value(&self) -> Option<Value> {
        match &self.def {
            ZodDef::Default(_, thunk) => Some(thunk()),
            _ => None,
        }
    }

    fn shape(&self) -> Option<Vec<(String, SchemaRef)>> {
        match &self.def {
            ZodDef::Object(fields) => Some(
                fields
                    .iter()
                    .map(|(key, ty)| (key.clone(), ty.schema()))
                    .collect(),
            ),
            _ => None,
        }
    }

    fn enum_members(&self) -> Option<Vec<(String, Value)>> {
        match &self.def {
            ZodDef::Enum(members) => Some(members.clone()),
            _ => None,
        }
    }

    fn union_options(&self) -> Option<Vec<SchemaRef>> {
        match &self.def {
            ZodDef::Union(options) => Some(options.iter().map(ZodType::schema).collect()),
            _ => None,
        }
    }

    fn record_types(&self) -> Option<(SchemaRef, SchemaRef)> {
        match &self.def {
            ZodDef::Record(key, value) => Some((key.schema(), value.schema())),
            _ => None,
        }
    }

    fn literal_value(&self) -> Option<Value> {
        match &self.def {
            ZodDef::Literal(value) => Some(value.clone()),
            _ => None,
        }
    }

    fn parse(&self, input: Option<&Value>, params: &ParseParams) -> Result<Option<Value>, ParseError> {
        let mut ctx = ParseCtx::new(params);
        let out = self.run(input, &mut ctx);
        if ctx.issues.is_empty() {
            Ok(out)
        } else {
            trace!(id = %self.id, issues = ctx.issues.len(), "Schema parse failed");
            Err(ParseError::new(ctx.issues))
        }
    }
}
