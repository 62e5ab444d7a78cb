//! Runtime validation failure shape.
//!
//! Every runtime failure (a managed field write, an argument, a method
//! result) is reported as a [`ValidationFailure`]: a list of
//! [`FieldViolation`]s keyed by the first path segment. Deeper paths become a
//! singly nested chain of `children`, with the constraints on the innermost
//! entry.
//!
//! ```json
//! [{
//!   "property": "address",
//!   "value": {"zip": 12},
//!   "constraints": {},
//!   "children": [{
//!     "property": "zip",
//!     "value": 12,
//!     "constraints": {"invalid_type": "Expected string, received number"}
//!   }]
//! }]
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::error::ErrorCode;
use crate::schema::{Issue, ParseError, PathSegment};

/// One offending property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub property: String,
    /// The offending value at this path, when one was present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Issue code to message.
    #[serde(default)]
    pub constraints: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldViolation>,
}

impl FieldViolation {
    pub fn new(property: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            property: property.into(),
            value,
            constraints: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_constraint(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.constraints.insert(code.into(), message.into());
        self
    }

    pub fn with_child(mut self, child: FieldViolation) -> Self {
        self.children.push(child);
        self
    }

    /// Dotted path to the innermost entry of this chain.
    pub fn path(&self) -> String {
        match self.children.first() {
            Some(child) => format!("{}.{}", self.property, child.path()),
            None => self.property.clone(),
        }
    }

    /// The innermost entry, which carries the constraints.
    pub fn leaf(&self) -> &FieldViolation {
        match self.children.first() {
            Some(child) => child.leaf(),
            None => self,
        }
    }
}

/// Normalized runtime validation failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{}", render_violations(.errors))]
#[serde(transparent)]
pub struct ValidationFailure {
    pub errors: Vec<FieldViolation>,
}

fn render_violations(errors: &[FieldViolation]) -> String {
    let details = errors
        .iter()
        .map(|violation| {
            let leaf = violation.leaf();
            let messages = leaf.constraints.values().cloned().collect::<Vec<_>>();
            format!("{}: {}", violation.path(), messages.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ");
    format!("Validation failed: {}", details)
}

fn lookup<'v>(value: Option<&'v Value>, segment: &PathSegment) -> Option<&'v Value> {
    match (value?, segment) {
        (Value::Object(map), PathSegment::Key(key)) => map.get(key),
        (Value::Array(items), PathSegment::Index(index)) => items.get(*index),
        _ => None,
    }
}

fn chain(property: String, value: Option<&Value>, rest: &[PathSegment], issue: &Issue) -> FieldViolation {
    match rest.split_first() {
        None => FieldViolation::new(property, value.cloned())
            .with_constraint(issue.code.clone(), issue.message.clone()),
        Some((next, tail)) => FieldViolation::new(property, value.cloned()).with_child(chain(
            next.to_string(),
            lookup(value, next),
            tail,
            issue,
        )),
    }
}

impl ValidationFailure {
    pub fn new(errors: Vec<FieldViolation>) -> Self {
        let properties: Vec<_> = errors.iter().map(|e| e.property.as_str()).collect();
        debug!(
            error_count = errors.len(),
            properties = ?properties,
            "Validation failed"
        );
        Self { errors }
    }

    /// Builds the failure for a whole input value. Issues with an empty path
    /// are reported under `root_name`.
    pub fn from_parse_error(root_name: &str, input: Option<&Value>, error: &ParseError) -> Self {
        let errors = error
            .issues
            .iter()
            .map(|issue| match issue.path.split_first() {
                None => chain(root_name.to_string(), input, &[], issue),
                Some((head, tail)) => chain(head.to_string(), lookup(input, head), tail, issue),
            })
            .collect();
        Self::new(errors)
    }

    /// Builds the failure for a single property whose value was `input`.
    pub fn for_property(key: &str, input: Option<&Value>, error: &ParseError) -> Self {
        let errors = error
            .issues
            .iter()
            .map(|issue| chain(key.to_string(), input, &issue.path, issue))
            .collect();
        Self::new(errors)
    }

    pub fn unknown_property(property: &str) -> Self {
        Self::new(vec![FieldViolation::new(property, None).with_constraint(
            "unrecognized_keys",
            format!("Unrecognized key: '{}'", property),
        )])
    }

    pub fn code(&self) -> ErrorCode {
        ErrorCode::ValidationError
    }

    pub fn errors(&self) -> &[FieldViolation] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Top-level properties in report order.
    pub fn properties(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.property.as_str()).collect()
    }

    /// Dotted path to the joined constraint messages at that path.
    pub fn messages(&self) -> BTreeMap<String, String> {
        let mut messages = BTreeMap::new();
        for violation in &self.errors {
            let leaf = violation.leaf();
            let joined = leaf.constraints.values().cloned().collect::<Vec<_>>().join(", ");
            messages
                .entry(violation.path())
                .and_modify(|existing: &mut String| {
                    existing.push_str(", ");
                    existing.push_str(&joined);
                })
                .or_insert(joined);
        }
        messages
    }

    /// Merge another failure into this one
    pub fn merge(mut self, other: ValidationFailure) -> Self {
        self.errors.extend(other.errors);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn issue(path: Vec<PathSegment>, code: &str, message: &str) -> Issue {
        Issue::new(code, message).at(path)
    }

    #[test]
    fn test_single_segment_has_no_children() {
        let error = ParseError::single(issue(vec!["age".into()], "invalid_type", "Expected number, received string"));
        let failure = ValidationFailure::from_parse_error("input", Some(&json!({"age": "x"})), &error);

        assert_eq!(failure.errors.len(), 1);
        let violation = &failure.errors[0];
        assert_eq!(violation.property, "age");
        assert_eq!(violation.value, Some(json!("x")));
        assert_eq!(
            violation.constraints.get("invalid_type").map(String::as_str),
            Some("Expected number, received string")
        );
        assert!(violation.children.is_empty());

        let json = serde_json::to_value(&failure).unwrap();
        assert!(json[0].get("children").is_none());
    }

    #[test]
    fn test_nested_path_builds_chain() {
        let error = ParseError::single(issue(
            vec!["address".into(), "zip".into()],
            "invalid_type",
            "Expected string, received number",
        ));
        let input = json!({"address": {"zip": 12}});
        let failure = ValidationFailure::from_parse_error("input", Some(&input), &error);

        let top = &failure.errors[0];
        assert_eq!(top.property, "address");
        assert_eq!(top.value, Some(json!({"zip": 12})));
        assert!(top.constraints.is_empty());
        assert_eq!(top.children.len(), 1);

        let child = &top.children[0];
        assert_eq!(child.property, "zip");
        assert_eq!(child.value, Some(json!(12)));
        assert!(child.constraints.contains_key("invalid_type"));
        assert_eq!(top.path(), "address.zip");
    }

    #[test]
    fn test_empty_path_reports_root_name() {
        let error = ParseError::single(issue(vec![], "invalid_type", "Expected object, received string"));
        let failure = ValidationFailure::from_parse_error("user", Some(&json!("x")), &error);
        assert_eq!(failure.properties(), vec!["user"]);
    }

    #[test]
    fn test_for_property_prefixes_key() {
        let error = ParseError::single(issue(vec![PathSegment::Index(1)], "invalid_type", "Expected string, received number"));
        let failure = ValidationFailure::for_property("tags", Some(&json!(["a", 2])), &error);
        let top = &failure.errors[0];
        assert_eq!(top.property, "tags");
        assert_eq!(top.children[0].property, "1");
        assert_eq!(top.children[0].value, Some(json!(2)));
        assert_eq!(failure.messages().get("tags.1").map(String::as_str), Some("Expected string, received number"));
    }

    #[test]
    fn test_display_lists_paths() {
        let failure = ValidationFailure::unknown_property("nickname");
        assert_eq!(
            failure.to_string(),
            "Validation failed: nickname: Unrecognized key: 'nickname'"
        );
        assert_eq!(failure.code(), ErrorCode::ValidationError);
    }
}
