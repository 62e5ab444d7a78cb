//! Type naming: unique-name allocation, title-casing and name extraction.

use std::sync::OnceLock;

use regex::Regex;
use tracing::trace;

use crate::introspect::extract_description;
use crate::schema::SchemaRef;

static GRAPHQL_NAME: OnceLock<Option<Regex>> = OnceLock::new();
static TITLE_WORD: OnceLock<Option<Regex>> = OnceLock::new();
static NAME_PREFIX: OnceLock<Option<Regex>> = OnceLock::new();

fn cached(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

/// Whether `name` is a valid GraphQL name.
pub fn is_graphql_name(name: &str) -> bool {
    cached(&GRAPHQL_NAME, r"^[_A-Za-z][_0-9A-Za-z]*$").map_or(false, |re| re.is_match(name))
}

/// Uppercases the first alphabetic character that starts a word.
/// Everything else is left untouched.
pub fn to_title_case(value: &str) -> String {
    let first = cached(&TITLE_WORD, r"\b(\p{Alphabetic})")
        .and_then(|re| re.captures(value))
        .and_then(|caps| caps.get(1));
    match first {
        Some(first) => {
            let mut out = String::with_capacity(value.len());
            out.push_str(&value[..first.start()]);
            out.extend(first.as_str().chars().flat_map(char::to_uppercase));
            out.push_str(&value[first.end()..]);
            out
        }
        None => value.to_string(),
    }
}

/// Appends `suffix` unless `input` already ends with it.
pub fn with_suffix(input: &str, suffix: &str) -> String {
    if input.ends_with(suffix) {
        input.to_string()
    } else {
        format!("{}{}", input, suffix)
    }
}

/// Allocates unique type names and the anonymous-type counter.
///
/// Uniqueness is checked by prefix: a candidate collides with every
/// previously allocated name that *starts with* it, so `Foo` after `FooBar`
/// becomes `Foo_2`.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    counter: u64,
    used: Vec<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_count(&self) -> u64 {
        self.counter
    }

    /// Increments the counter and returns the new value.
    ///
    /// Anonymous type names and enum sequence numbers both draw from this
    /// counter, so every enum advances it. An anonymous type compiled after
    /// `ClassFromZod_1` and its enum `ClassFromZod_1_StatusEnum_2` is
    /// named `ClassFromZod_3`, not `ClassFromZod_2`. Each enum name is
    /// therefore unique without going through [`safe_name`](Self::safe_name).
    pub fn next_count(&mut self) -> u64 {
        self.counter += 1;
        self.counter
    }

    pub fn safe_name(&mut self, base: &str) -> String {
        let total = self
            .used
            .iter()
            .filter(|used| used.starts_with(base))
            .count();

        let name = if total == 0 {
            base.to_string()
        } else {
            format!("{}_{}", base, total + 1)
        };

        trace!(base = %base, name = %name, collisions = total, "Allocated type name");
        self.used.push(name.clone());
        name
    }

    pub fn is_used(&self, name: &str) -> bool {
        self.used.iter().any(|used| used == name)
    }

    /// Names in allocation order.
    pub fn used_names(&self) -> &[String] {
        &self.used
    }

    pub fn reset(&mut self) {
        self.counter = 0;
        self.used.clear();
    }
}

/// Derives a type's base name and description.
///
/// An explicit name wins and leaves the description as is. Otherwise a
/// `Name: rest` description yields `Name` and the trimmed rest. Otherwise the
/// name is `{anonymous_prefix}_{n}` with `n` taken from the registry counter.
pub fn extract_name_and_description(
    node: &SchemaRef,
    explicit_name: Option<&str>,
    anonymous_prefix: &str,
    names: &mut NameRegistry,
) -> (String, Option<String>) {
    let description = extract_description(node);

    if let Some(name) = explicit_name {
        return (name.to_string(), description);
    }

    if let Some(text) = &description {
        if let Some(caps) = cached(&NAME_PREFIX, r"(\w+):\s*(.*)").and_then(|re| re.captures(text)) {
            let name = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let rest = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
            return (name.to_string(), Some(rest.to_string()));
        }
    }

    let name = format!("{}_{}", anonymous_prefix, names.next_count());
    (name, description)
}
