//! Recording registrar.

use std::collections::HashMap;
use std::fmt::Write as _;

use super::{
    ArgumentRegistration, EnumRegistration, FieldRegistration, InputTypeRegistration,
    MethodRegistration, ObjectTypeRegistration, TypeRegistrar,
};
use crate::field_info::Nullability;
use crate::method::MethodKind;

/// A [`TypeRegistrar`] that keeps every registration in arrival order.
///
/// Useful in tests and for previewing what a host would see; [`to_sdl`]
/// renders the recorded types as GraphQL SDL.
///
/// [`to_sdl`]: InMemoryRegistry::to_sdl
#[derive(Debug, Default, Clone)]
pub struct InMemoryRegistry {
    object_types: Vec<ObjectTypeRegistration>,
    input_types: Vec<InputTypeRegistration>,
    fields: Vec<FieldRegistration>,
    enums: Vec<EnumRegistration>,
    arguments: Vec<ArgumentRegistration>,
    methods: Vec<MethodRegistration>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn object_types(&self) -> &[ObjectTypeRegistration] {
        &self.object_types
    }

    pub fn input_types(&self) -> &[InputTypeRegistration] {
        &self.input_types
    }

    pub fn fields(&self) -> &[FieldRegistration] {
        &self.fields
    }

    /// Fields of one type, in registration order.
    pub fn fields_of<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a FieldRegistration> + 'a {
        self.fields.iter().filter(move |f| f.owner == owner)
    }

    pub fn field(&self, owner: &str, name: &str) -> Option<&FieldRegistration> {
        self.fields.iter().find(|f| f.owner == owner && f.name == name)
    }

    pub fn enums(&self) -> &[EnumRegistration] {
        &self.enums
    }

    pub fn enum_type(&self, name: &str) -> Option<&EnumRegistration> {
        self.enums.iter().find(|e| e.name == name)
    }

    pub fn arguments(&self) -> &[ArgumentRegistration] {
        &self.arguments
    }

    pub fn methods(&self) -> &[MethodRegistration] {
        &self.methods
    }

    /// Names of every object, input and enum type, in registration order.
    pub fn type_names(&self) -> Vec<&str> {
        self.object_types
            .iter()
            .map(|t| t.name.as_str())
            .chain(self.input_types.iter().map(|t| t.name.as_str()))
            .chain(self.enums.iter().map(|e| e.name.as_str()))
            .collect()
    }

    pub fn contains_type(&self, name: &str) -> bool {
        self.type_names().contains(&name)
    }

    /// Number of registered types (objects, inputs and enums).
    pub fn len(&self) -> usize {
        self.object_types.len() + self.input_types.len() + self.enums.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Type names registered more than once.
    pub fn duplicate_names(&self) -> Vec<String> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for name in self.type_names() {
            *seen.entry(name).or_default() += 1;
        }
        let mut duplicates: Vec<String> = seen
            .into_iter()
            .filter(|(_, count)| *count > 1)
            .map(|(name, _)| name.to_string())
            .collect();
        duplicates.sort();
        duplicates
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Renders every recorded registration as GraphQL SDL.
    pub fn to_sdl(&self) -> String {
        let mut out = String::new();

        for ty in &self.object_types {
            write_description(&mut out, ty.description.as_deref(), "");
            let _ = writeln!(out, "type {} {{", ty.name);
            self.write_fields(&mut out, &ty.name, false);
            out.push_str("}\n\n");
        }

        for ty in &self.input_types {
            write_description(&mut out, ty.description.as_deref(), "");
            let _ = writeln!(out, "input {} {{", ty.name);
            self.write_fields(&mut out, &ty.name, true);
            out.push_str("}\n\n");
        }

        for en in &self.enums {
            write_description(&mut out, en.description.as_deref(), "");
            let _ = writeln!(out, "enum {} {{", en.name);
            for value in &en.values {
                let _ = writeln!(out, "  {}", value.name);
            }
            out.push_str("}\n\n");
        }

        for kind in [MethodKind::Query, MethodKind::Mutation, MethodKind::Subscription] {
            let methods: Vec<_> = self.methods.iter().filter(|m| m.kind == kind).collect();
            if methods.is_empty() {
                continue;
            }
            let _ = writeln!(out, "type {} {{", root_type_name(kind));
            for method in methods {
                write_description(&mut out, method.description.as_deref(), "  ");
                let mut args: Vec<_> = self
                    .arguments
                    .iter()
                    .filter(|a| a.method.as_deref() == Some(method.name.as_str()))
                    .collect();
                args.sort_by_key(|a| a.position);
                let rendered_args = args
                    .iter()
                    .map(|a| format!("{}: {}", a.name, render_type(&a.type_name, a.nullable)))
                    .collect::<Vec<_>>()
                    .join(", ");
                if rendered_args.is_empty() {
                    let _ = writeln!(
                        out,
                        "  {}: {}",
                        method.name,
                        render_type(&method.return_type, method.nullable)
                    );
                } else {
                    let _ = writeln!(
                        out,
                        "  {}({}): {}",
                        method.name,
                        rendered_args,
                        render_type(&method.return_type, method.nullable)
                    );
                }
            }
            out.push_str("}\n\n");
        }

        out.trim_end().to_string()
    }

    fn write_fields(&self, out: &mut String, owner: &str, with_defaults: bool) {
        for field in self.fields_of(owner) {
            write_description(out, field.description.as_deref(), "  ");
            let _ = write!(out, "  {}: {}", field.name, render_type(&field.type_name, field.nullable));
            if with_defaults {
                if let Some(default) = &field.default_value {
                    let _ = write!(out, " = {}", default);
                }
            }
            out.push('\n');
        }
    }
}

impl TypeRegistrar for InMemoryRegistry {
    fn register_object_type(&mut self, registration: ObjectTypeRegistration) {
        self.object_types.push(registration);
    }

    fn register_input_type(&mut self, registration: InputTypeRegistration) {
        self.input_types.push(registration);
    }

    fn register_field(&mut self, registration: FieldRegistration) {
        self.fields.push(registration);
    }

    fn register_enum(&mut self, registration: EnumRegistration) {
        self.enums.push(registration);
    }

    fn register_argument(&mut self, registration: ArgumentRegistration) {
        self.arguments.push(registration);
    }

    fn register_method(&mut self, registration: MethodRegistration) {
        self.methods.push(registration);
    }
}

fn root_type_name(kind: MethodKind) -> &'static str {
    match kind {
        MethodKind::Query => "Query",
        MethodKind::Mutation => "Mutation",
        MethodKind::Subscription => "Subscription",
    }
}

fn write_description(out: &mut String, description: Option<&str>, indent: &str) {
    if let Some(description) = description {
        let escaped = description.replace("\"\"\"", "\\\"\"\"");
        let _ = writeln!(out, "{}\"\"\"{}\"\"\"", indent, escaped);
    }
}

/// Renders a registered type name with its markers. The item marker of a
/// list applies to every nested list level.
fn render_type(type_name: &str, nullable: Nullability) -> String {
    let items_nullable = matches!(nullable, Nullability::Items | Nullability::ItemsAndList);
    let rendered = match list_item(type_name) {
        Some(item) => format!("[{}]", render_item(item, items_nullable)),
        None => type_name.to_string(),
    };

    match nullable {
        Nullability::NonNull | Nullability::Items => format!("{}!", rendered),
        Nullability::Nullable | Nullability::ItemsAndList => rendered,
    }
}

fn render_item(type_name: &str, nullable: bool) -> String {
    let rendered = match list_item(type_name) {
        Some(item) => format!("[{}]", render_item(item, nullable)),
        None => type_name.to_string(),
    };
    if nullable {
        rendered
    } else {
        format!("{}!", rendered)
    }
}

fn list_item(type_name: &str) -> Option<&str> {
    type_name
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::EnumValueRegistration;
    use serde_json::json;

    fn field(owner: &str, name: &str, type_name: &str, nullable: Nullability) -> FieldRegistration {
        FieldRegistration {
            owner: owner.to_string(),
            name: name.to_string(),
            property: name.to_string(),
            type_name: type_name.to_string(),
            nullable,
            default_value: None,
            description: None,
        }
    }

    #[test]
    fn test_render_type_markers() {
        assert_eq!(render_type("Int", Nullability::NonNull), "Int!");
        assert_eq!(render_type("Int", Nullability::Nullable), "Int");
        assert_eq!(render_type("[Tag]", Nullability::NonNull), "[Tag!]!");
        assert_eq!(render_type("[Tag]", Nullability::Nullable), "[Tag!]");
        assert_eq!(render_type("[Tag]", Nullability::Items), "[Tag]!");
        assert_eq!(render_type("[Tag]", Nullability::ItemsAndList), "[Tag]");
    }

    #[test]
    fn test_render_nested_lists() {
        assert_eq!(render_type("[[Int]]", Nullability::NonNull), "[[Int!]!]!");
        assert_eq!(render_type("[[Int]]", Nullability::Nullable), "[[Int!]!]");
        assert_eq!(render_type("[[Int]]", Nullability::Items), "[[Int]]!");
        assert_eq!(render_type("[[[Int]]]", Nullability::ItemsAndList), "[[[Int]]]");
    }

    #[test]
    fn test_block_quotes_in_descriptions_are_escaped() {
        let mut registry = InMemoryRegistry::new();
        registry.register_object_type(ObjectTypeRegistration {
            name: "Note".to_string(),
            description: Some(r#"Wraps """quoted""" text"#.to_string()),
            is_abstract: false,
        });
        registry.register_field(field("Note", "body", "String", Nullability::NonNull));

        let sdl = registry.to_sdl();
        assert!(sdl.starts_with(r#""""Wraps \"""quoted\""" text""""#));
        assert!(sdl.contains("type Note {\n  body: String!\n}"));
    }

    #[test]
    fn test_to_sdl_renders_types_and_enums() {
        let mut registry = InMemoryRegistry::new();
        registry.register_object_type(ObjectTypeRegistration {
            name: "User".to_string(),
            description: Some("A user".to_string()),
            is_abstract: false,
        });
        registry.register_field(field("User", "name", "String", Nullability::NonNull));
        registry.register_field(field("User", "tags", "[String]", Nullability::Items));
        registry.register_enum(EnumRegistration {
            name: "UserStatusEnum_1".to_string(),
            description: None,
            values: vec![EnumValueRegistration {
                name: "Active".to_string(),
                value: "active".to_string(),
            }],
        });

        let sdl = registry.to_sdl();
        assert!(sdl.contains("\"\"\"A user\"\"\"\ntype User {"));
        assert!(sdl.contains("  name: String!"));
        assert!(sdl.contains("  tags: [String]!"));
        assert!(sdl.contains("enum UserStatusEnum_1 {\n  Active\n}"));
    }

    #[test]
    fn test_to_sdl_input_defaults_and_methods() {
        let mut registry = InMemoryRegistry::new();
        registry.register_input_type(InputTypeRegistration {
            name: "CreateUser".to_string(),
            description: None,
        });
        registry.register_field(FieldRegistration {
            default_value: Some(json!(18)),
            ..field("CreateUser", "age", "Int", Nullability::NonNull)
        });
        registry.register_argument(ArgumentRegistration {
            method: Some("createUser".to_string()),
            position: 0,
            name: "input".to_string(),
            type_name: "CreateUser".to_string(),
            nullable: Nullability::NonNull,
            description: None,
        });
        registry.register_method(MethodRegistration {
            name: "createUser".to_string(),
            kind: MethodKind::Mutation,
            return_type: "User".to_string(),
            nullable: Nullability::Nullable,
            description: None,
        });

        let sdl = registry.to_sdl();
        assert!(sdl.contains("input CreateUser {\n  age: Int! = 18\n}"));
        assert!(sdl.contains("type Mutation {\n  createUser(input: CreateUser!): User\n}"));
        assert!(!sdl.contains("type Query"));
    }

    #[test]
    fn test_duplicate_names() {
        let mut registry = InMemoryRegistry::new();
        for _ in 0..2 {
            registry.register_object_type(ObjectTypeRegistration {
                name: "Same".to_string(),
                description: None,
                is_abstract: false,
            });
        }
        assert_eq!(registry.duplicate_names(), vec!["Same".to_string()]);
        assert_eq!(registry.len(), 2);

        registry.clear();
        assert!(registry.is_empty());
    }
}
