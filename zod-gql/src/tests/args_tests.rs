//! Argument binding tests

use std::sync::Arc;

use serde_json::{json, Value};

use crate::schema::zod::z;
use crate::{
    ArgumentOptions, CompilationContext, InMemoryRegistry, Nullability, ParameterTarget,
    TypeFlavor, TypeRef, ValidationFailure,
};

fn doubled(value: Option<Value>) -> Result<Option<Value>, ValidationFailure> {
    Ok(value.map(|v| json!(v.as_i64().unwrap_or_default() * 2)))
}

fn incremented(value: Option<Value>) -> Result<Option<Value>, ValidationFailure> {
    Ok(value.map(|v| json!(v.as_i64().unwrap_or_default() + 1)))
}

// =============================================================================
// Scalar arguments
// =============================================================================

#[test]
fn test_scalar_argument_positional_name() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();

    let arg = ctx
        .bind_argument(
            &mut host,
            &z::number().int().schema(),
            ParameterTarget::on("user", 1),
            ArgumentOptions::new(),
        )
        .unwrap();

    assert_eq!(arg.name(), "arg_1");
    assert_eq!(arg.type_ref(), &TypeRef::Int);
    assert_eq!(arg.nullability(), Nullability::NonNull);
    assert!(arg.generated_type().is_none());

    let registered = &host.arguments()[0];
    assert_eq!(registered.method.as_deref(), Some("user"));
    assert_eq!(registered.position, 1);
    assert_eq!(registered.type_name, "Int");
    assert!(host.object_types().is_empty());
    assert!(host.input_types().is_empty());
}

#[test]
fn test_explicit_name_and_description() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();

    let arg = ctx
        .bind_argument(
            &mut host,
            &z::string().optional().describe("Search text").schema(),
            ParameterTarget::new(0),
            ArgumentOptions::named("query"),
        )
        .unwrap();

    assert_eq!(arg.name(), "query");
    assert_eq!(arg.nullability(), Nullability::Nullable);
    assert_eq!(arg.description(), Some("Search text"));
    assert_eq!(host.arguments()[0].method, None);
}

#[test]
fn test_scalar_argument_validation() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let arg = ctx
        .bind_argument(
            &mut host,
            &z::number().int().min(1.0).schema(),
            ParameterTarget::new(0),
            ArgumentOptions::named("page"),
        )
        .unwrap();

    assert_eq!(arg.process(Some(&json!(2))).unwrap(), Some(json!(2)));

    let err = arg.process(Some(&json!(0))).unwrap_err();
    assert_eq!(err.properties(), vec!["page"]);
    assert!(err.errors()[0].constraints.contains_key("too_small"));

    let err = arg.process(None).unwrap_err();
    assert_eq!(err.messages().get("page").map(String::as_str), Some("Required"));
}

#[test]
fn test_pipes_run_after_validation_in_order() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let arg = ctx
        .bind_argument(
            &mut host,
            &z::number().int().schema(),
            ParameterTarget::new(0),
            ArgumentOptions::named("n").with_pipe(doubled).with_pipe(incremented),
        )
        .unwrap();

    assert_eq!(arg.process(Some(&json!(3))).unwrap(), Some(json!(7)));
    // Validation runs first, so the pipes never see a bad value.
    assert!(arg.process(Some(&json!("3"))).is_err());
}

#[test]
fn test_enum_argument_uses_argument_name_as_parent() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let arg = ctx
        .bind_argument(
            &mut host,
            &z::enumeration(["asc", "desc"]).schema(),
            ParameterTarget::new(0),
            ArgumentOptions::named("order"),
        )
        .unwrap();

    assert_eq!(host.enums()[0].name, "Order_OrderEnum_1");
    assert_eq!(arg.type_ref().type_name(), "Order_OrderEnum_1");
    assert_eq!(host.arguments()[0].type_name, "Order_OrderEnum_1");
}

#[test]
fn test_list_argument() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let arg = ctx
        .bind_argument(
            &mut host,
            &z::array(z::string()).schema(),
            ParameterTarget::new(0),
            ArgumentOptions::named("ids"),
        )
        .unwrap();

    assert_eq!(arg.type_ref().type_name(), "[String]");
    assert_eq!(arg.nullability(), Nullability::NonNull);
}

// =============================================================================
// Object arguments
// =============================================================================

#[test]
fn test_object_argument_compiles_input_type() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let schema = z::object([("name", z::string()), ("age", z::number().int().default(18))])
        .describe("CreateUser: Fields for a new user");

    let arg = ctx
        .bind_argument(&mut host, &schema.schema(), ParameterTarget::new(0), ArgumentOptions::named("input"))
        .unwrap();

    let generated = arg.generated_type().unwrap();
    assert_eq!(generated.name(), "CreateUser");
    assert_eq!(generated.flavor(), TypeFlavor::Input);
    assert_eq!(host.input_types().len(), 1);
    assert!(host.object_types().is_empty());
    assert_eq!(host.arguments()[0].type_name, "CreateUser");
    assert_eq!(host.field("CreateUser", "age").unwrap().default_value, Some(json!(18)));

    let processed = arg.process(Some(&json!({"name": "Ada"}))).unwrap();
    assert_eq!(processed, Some(json!({"name": "Ada", "age": 18})));

    let err = arg.process(Some(&json!({"name": 5}))).unwrap_err();
    assert_eq!(err.properties(), vec!["name"]);
}

#[test]
fn test_optional_object_argument() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let filter = z::object([("q", z::string())]).describe("Filter: Search filter");

    let arg = ctx
        .bind_argument(
            &mut host,
            &filter.optional().schema(),
            ParameterTarget::new(0),
            ArgumentOptions::named("filter"),
        )
        .unwrap();

    assert_eq!(arg.nullability(), Nullability::Nullable);
    assert_eq!(arg.generated_type().unwrap().name(), "Filter");
    assert_eq!(host.input_types()[0].name, "Filter");
    assert_eq!(arg.process(None).unwrap(), None);
    assert!(arg.process(Some(&json!({}))).is_err());
}

#[test]
fn test_object_argument_reused_after_free() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let schema = z::object([("id", z::string())]);

    let first = ctx
        .bind_argument(&mut host, &schema.schema(), ParameterTarget::new(0), ArgumentOptions::new())
        .unwrap();
    ctx.free();
    let second = ctx
        .bind_argument(&mut host, &schema.schema(), ParameterTarget::new(1), ArgumentOptions::new())
        .unwrap();

    assert!(Arc::ptr_eq(
        first.generated_type().unwrap(),
        second.generated_type().unwrap()
    ));
    assert_eq!(host.input_types().len(), 1);
    assert_eq!(first.name(), "arg_0");
    assert_eq!(second.name(), "arg_1");
    assert_eq!(ctx.names().current_count(), 0);
}

#[test]
fn test_free_allows_name_reuse_for_new_schemas() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();

    let first = ctx
        .bind_argument(
            &mut host,
            &z::object([("id", z::string())]).schema(),
            ParameterTarget::new(0),
            ArgumentOptions::new(),
        )
        .unwrap();
    ctx.free();
    let second = ctx
        .bind_argument(
            &mut host,
            &z::object([("id", z::string())]).schema(),
            ParameterTarget::new(0),
            ArgumentOptions::new(),
        )
        .unwrap();

    assert_eq!(first.generated_type().unwrap().name(), "ClassFromZod_1");
    assert_eq!(second.generated_type().unwrap().name(), "ClassFromZod_1");
}

#[tokio::test]
async fn test_process_async() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let arg = ctx
        .bind_argument(
            &mut host,
            &z::string().email().schema(),
            ParameterTarget::new(0),
            ArgumentOptions::named("email"),
        )
        .unwrap();

    let ok = arg.process_async(Some(json!("ada@example.com"))).await.unwrap();
    assert_eq!(ok, Some(json!("ada@example.com")));

    let err = arg.process_async(Some(json!("nope"))).await.unwrap_err();
    assert_eq!(
        err.messages().get("email").map(String::as_str),
        Some("Invalid email")
    );
}

// =============================================================================
// Object arguments with transformed or missing values
// =============================================================================

fn name_length() -> crate::schema::zod::ZodType {
    z::object([(
        "name",
        z::string().transform(|v| json!(v.as_str().map(str::len).unwrap_or_default())),
    )])
}

#[test]
fn test_transformed_field_output_is_not_parsed_again() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let arg = ctx
        .bind_argument(
            &mut host,
            &name_length().schema(),
            ParameterTarget::new(0),
            ArgumentOptions::named("input"),
        )
        .unwrap();

    let processed = arg.process(Some(&json!({"name": "abc"}))).unwrap().unwrap();
    assert_eq!(processed, json!({"name": 3}));

    let instance = arg.validator().to_instance(&processed).unwrap();
    assert_eq!(instance.get("name"), Some(&json!(3)));
    assert_eq!(instance.generated_type().name(), "ClassFromZod_1");

    let err = arg.process(Some(&json!({"name": 3}))).unwrap_err();
    assert_eq!(err.properties(), vec!["name"]);
}

#[tokio::test]
async fn test_transformed_field_output_is_not_parsed_again_async() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let arg = ctx
        .bind_argument(
            &mut host,
            &name_length().schema(),
            ParameterTarget::new(0),
            ArgumentOptions::named("input"),
        )
        .unwrap();

    let processed = arg.process_async(Some(json!({"name": "abcd"}))).await.unwrap();
    assert_eq!(processed, Some(json!({"name": 4})));
}

#[test]
fn test_nullable_object_argument_accepts_null() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let arg = ctx
        .bind_argument(
            &mut host,
            &z::object([("id", z::string())]).nullable().schema(),
            ParameterTarget::new(0),
            ArgumentOptions::named("filter"),
        )
        .unwrap();

    assert_eq!(arg.nullability(), Nullability::Nullable);
    assert_eq!(arg.process(Some(&Value::Null)).unwrap(), Some(Value::Null));
    assert!(arg.validator().to_instance(&Value::Null).is_none());

    let err = arg.process(None).unwrap_err();
    assert_eq!(err.properties(), vec!["filter"]);
}

#[tokio::test]
async fn test_nullable_and_optional_object_arguments_async() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let object = z::object([("id", z::string())]);
    let nullable = ctx
        .bind_argument(
            &mut host,
            &object.nullable().schema(),
            ParameterTarget::new(0),
            ArgumentOptions::named("a"),
        )
        .unwrap();
    let optional = ctx
        .bind_argument(
            &mut host,
            &object.optional().schema(),
            ParameterTarget::new(1),
            ArgumentOptions::named("b"),
        )
        .unwrap();

    assert_eq!(nullable.process_async(Some(Value::Null)).await.unwrap(), Some(Value::Null));
    assert_eq!(optional.process_async(None).await.unwrap(), None);
    assert!(optional.process_async(Some(json!({"id": 1}))).await.is_err());
    // Both wrap the same object schema.
    assert!(Arc::ptr_eq(
        nullable.generated_type().unwrap(),
        optional.generated_type().unwrap()
    ));
}
