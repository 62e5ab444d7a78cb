//! Enum compilation tests

use std::sync::Arc;

use serde_json::{json, Value};

use crate::schema::zod::z;
use crate::{
    BridgeConfig, CompilationContext, CompileError, EnumProviderData, EnumType, ErrorCode, InMemoryRegistry,
    ModelOptions, Nullability, TypeRef,
};

#[test]
fn test_enum_name_and_default_description() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let schema = z::object([("status", z::enumeration(["active", "banned"]))]);

    let ty = ctx
        .compile(&mut host, &schema.schema(), &ModelOptions::named("User"))
        .unwrap();

    assert_eq!(host.enums().len(), 1);
    let registered = &host.enums()[0];
    assert_eq!(registered.name, "User_StatusEnum_1");
    assert_eq!(registered.description.as_deref(), Some("Enum values for User.status"));
    let values: Vec<_> = registered.values.iter().map(|v| v.value.as_str()).collect();
    assert_eq!(values, vec!["active", "banned"]);

    let field = host.field("User", "status").unwrap();
    assert_eq!(field.type_name, "User_StatusEnum_1");
    assert_eq!(field.nullable, Nullability::NonNull);

    let info = &ty.field("status").unwrap().info;
    assert!(info.is_enum);
    assert!(matches!(&info.target, TypeRef::Enum(e) if e.contains("banned")));
    assert_eq!(ctx.enums().len(), 1);
}

#[test]
fn test_enum_description_from_schema() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let schema = z::object([(
        "status",
        z::enumeration(["on", "off"]).describe("Power state").optional(),
    )]);

    ctx.compile(&mut host, &schema.schema(), &ModelOptions::named("Switch"))
        .unwrap();

    assert_eq!(host.enums()[0].description.as_deref(), Some("Power state"));
    assert_eq!(
        host.field("Switch", "status").unwrap().nullable,
        Nullability::Nullable
    );
}

#[test]
fn test_enum_reused_across_fields() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let level = z::enumeration(["low", "high"]);
    let schema = z::object([("read", level.clone()), ("write", level.clone())]);

    ctx.compile(&mut host, &schema.schema(), &ModelOptions::named("Access"))
        .unwrap();

    assert_eq!(host.enums().len(), 1);
    assert_eq!(
        host.field("Access", "read").unwrap().type_name,
        host.field("Access", "write").unwrap().type_name
    );
}

#[test]
fn test_array_of_enum() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let schema = z::object([("roles", z::array(z::enumeration(["admin", "user"]).nullable()))]);

    ctx.compile(&mut host, &schema.schema(), &ModelOptions::named("Account"))
        .unwrap();

    let roles = host.field("Account", "roles").unwrap();
    assert_eq!(roles.type_name, "[Account_RolesEnum_1]");
    assert_eq!(roles.nullable, Nullability::Items);
}

#[test]
fn test_incompatible_member_registers_nothing() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let schema = z::object([("code", z::native_enum([("A", "a"), ("B", "1b")]))]);

    let err = ctx
        .compile(&mut host, &schema.schema(), &ModelOptions::named("Item"))
        .unwrap_err();

    assert_eq!(err, CompileError::incompatible_enum_value("Item", "code", "B"));
    assert_eq!(err.code(), ErrorCode::IncompatibleEnumValue);
    assert_eq!(
        err.to_string(),
        "The value of the Key(\"B\") of Item.code Enum was not valid"
    );
    assert!(host.enums().is_empty());
    assert!(ctx.enums().is_empty());
}

#[test]
fn test_numeric_member_values_are_rejected() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let schema = z::object([("level", z::native_enum([("One", json!(1))]))]);

    let err = ctx
        .compile(&mut host, &schema.schema(), &ModelOptions::named("Item"))
        .unwrap_err();
    assert!(matches!(err, CompileError::IncompatibleEnumValue { member, .. } if member == "One"));
}

#[test]
fn test_enum_provider_skips_registration() {
    let mut ctx = CompilationContext::new();
    let shared = Arc::new(EnumType::new(
        "Visibility",
        None,
        vec![("Public".to_string(), "public".to_string())],
    ));
    let provided = shared.clone();
    ctx.set_default_enum_provider(move |members, data| {
        assert_eq!(data.parent_name.as_deref(), Some("Post"));
        (data.name == "visibility" && members.len() == 1).then(|| provided.clone())
    });
    let mut host = InMemoryRegistry::new();
    let schema = z::object([
        ("visibility", z::enumeration(["public"])),
        ("kind", z::enumeration(["draft", "final"])),
    ]);

    let ty = ctx
        .compile(&mut host, &schema.schema(), &ModelOptions::named("Post"))
        .unwrap();

    assert_eq!(host.field("Post", "visibility").unwrap().type_name, "Visibility");
    assert_eq!(host.enums().len(), 1);
    let info = &ty.field("visibility").unwrap().info;
    assert!(matches!(&info.target, TypeRef::Enum(e) if Arc::ptr_eq(e, &shared)));
}

#[test]
fn test_enum_provider_from_options() {
    let mut ctx = CompilationContext::new();
    let shared = Arc::new(EnumType::new(
        "Visibility",
        None,
        vec![("Public".to_string(), "public".to_string())],
    ));
    let provided = shared.clone();
    let mut host = InMemoryRegistry::new();
    let schema = z::object([
        ("visibility", z::enumeration(["public"])),
        ("kind", z::enumeration(["draft", "final"])),
    ]);

    let options = ModelOptions::named("Post").with_enum_provider(Arc::new(
        move |members: &[(String, Value)], data: &EnumProviderData| {
            (data.name == "visibility" && members.len() == 1).then(|| provided.clone())
        },
    ));
    ctx.compile(&mut host, &schema.schema(), &options).unwrap();

    assert_eq!(host.field("Post", "visibility").unwrap().type_name, "Visibility");
    assert_eq!(host.field("Post", "kind").unwrap().type_name, "Post_KindEnum_1");
    assert_eq!(host.enums().len(), 1);
    assert_eq!(host.enums()[0].name, "Post_KindEnum_1");
}

#[test]
fn test_enum_suffix_from_config() {
    let config = BridgeConfig::new().with_enum_suffix("Kind");
    let mut ctx = CompilationContext::with_config(config).unwrap();
    let mut host = InMemoryRegistry::new();
    let schema = z::object([("status", z::enumeration(["a", "b"]))]);

    ctx.compile(&mut host, &schema.schema(), &ModelOptions::named("User"))
        .unwrap();
    assert_eq!(host.enums()[0].name, "User_StatusKind_1");
}

#[test]
fn test_enum_sequence_shares_anonymous_counter() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let schema = z::object([("status", z::enumeration(["a", "b"]))]);

    let ty = ctx
        .compile(&mut host, &schema.schema(), &ModelOptions::new())
        .unwrap();

    assert_eq!(ty.name(), "ClassFromZod_1");
    assert_eq!(host.enums()[0].name, "ClassFromZod_1_StatusEnum_2");
    assert_eq!(ctx.names().current_count(), 2);

    let next = ctx
        .compile(&mut host, &z::object([("id", z::string())]).schema(), &ModelOptions::new())
        .unwrap();
    assert_eq!(next.name(), "ClassFromZod_3");
}

#[test]
fn test_enum_field_validates_members() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let schema = z::object([("status", z::enumeration(["active", "banned"]))]);
    let ty = ctx
        .compile(&mut host, &schema.schema(), &ModelOptions::named("User"))
        .unwrap();

    let mut instance = ty.instantiate();
    let err = instance.set("status", json!("gone")).unwrap_err();
    assert_eq!(
        err.messages().get("status").map(String::as_str),
        Some("Invalid enum value. Expected 'active' | 'banned', received 'gone'")
    );
}
