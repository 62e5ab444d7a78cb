//! Method binding tests

use serde_json::{json, Value};

use crate::schema::zod::{z, ZodType};
use crate::{
    ArgumentOptions, BridgeConfig, CompilationContext, InMemoryRegistry, MethodError, MethodKind,
    MethodOptions, MethodOutput, ModelOptions, Nullability, ParameterTarget,
};

fn user_schema() -> ZodType {
    z::object([
        ("id", z::number().int()),
        ("name", z::string().min(1.0)),
        ("email", z::string().email().optional()),
    ])
}

fn bound(options: MethodOptions) -> (CompilationContext, InMemoryRegistry, crate::MethodBinding) {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let binding = ctx
        .bind_method(&mut host, &user_schema().schema(), options)
        .unwrap();
    (ctx, host, binding)
}

// =============================================================================
// Registration
// =============================================================================

#[test]
fn test_bind_query_registers_method_and_type() {
    let options = MethodOptions::query("user")
        .with_description("Look up one user")
        .with_model(ModelOptions::named("User"));
    let (_, host, binding) = bound(options);

    assert_eq!(binding.name(), "user");
    assert_eq!(binding.kind(), MethodKind::Query);
    assert_eq!(binding.generated_type().name(), "User");
    assert!(binding.parse_to_instance());

    assert_eq!(host.object_types().len(), 1);
    let method = &host.methods()[0];
    assert_eq!(method.return_type, "User");
    assert_eq!(method.kind, MethodKind::Query);
    assert_eq!(method.nullable, Nullability::NonNull);
    assert_eq!(method.description.as_deref(), Some("Look up one user"));
}

#[test]
fn test_method_description_falls_back_to_type() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let schema = z::object([("ok", z::boolean())]).describe("Ack: Acknowledgement").nullable();

    ctx.bind_method(&mut host, &schema.schema(), MethodOptions::mutation("ping"))
        .unwrap();

    let method = &host.methods()[0];
    assert_eq!(method.return_type, "Ack");
    assert_eq!(method.kind, MethodKind::Mutation);
    assert_eq!(method.nullable, Nullability::Nullable);
    assert_eq!(method.description.as_deref(), Some("Acknowledgement"));
}

#[test]
fn test_method_kind_serde() {
    assert_eq!(serde_json::to_value(MethodKind::Subscription).unwrap(), json!("subscription"));
    assert_eq!(MethodKind::Mutation.to_string(), "mutation");
    assert_eq!(MethodKind::default(), MethodKind::Query);
}

// =============================================================================
// Result post-processing
// =============================================================================

#[test]
fn test_finish_returns_instance() {
    let (_, _, binding) = bound(MethodOptions::query("user").with_model(ModelOptions::named("User")));

    let output = binding
        .finish(json!({"id": 1, "name": "Ada", "internal": true}))
        .unwrap();

    let instance = output.as_instance().unwrap();
    assert_eq!(instance.generated_type().name(), "User");
    assert_eq!(instance.get("name"), Some(&json!("Ada")));
    assert_eq!(output.to_value(), json!({"id": 1, "name": "Ada"}));
    assert_eq!(serde_json::to_value(&output).unwrap(), output.to_value());
}

#[test]
fn test_finish_rejects_invalid_result() {
    let (_, _, binding) = bound(MethodOptions::query("user").with_model(ModelOptions::named("User")));

    let err = binding.finish(json!({"id": "1", "name": ""})).unwrap_err();
    assert_eq!(err.properties(), vec!["id", "name"]);

    let err = binding.finish(json!(null)).unwrap_err();
    assert_eq!(err.properties(), vec!["User"]);
}

#[test]
fn test_plain_output_when_disabled() {
    let (_, _, binding) = bound(
        MethodOptions::query("user")
            .with_parse_to_instance(false)
            .with_model(ModelOptions::named("User")),
    );

    let output = binding.finish(json!({"id": 1, "name": "Ada"})).unwrap();
    assert!(matches!(output, MethodOutput::Plain(ref v) if v == &json!({"id": 1, "name": "Ada"})));
    assert!(output.into_instance().is_none());
}

#[test]
fn test_parse_to_instance_from_config() {
    let config = BridgeConfig::new().with_parse_to_instance(false);
    let mut ctx = CompilationContext::with_config(config).unwrap();
    let mut host = InMemoryRegistry::new();

    let binding = ctx
        .bind_method(&mut host, &user_schema().schema(), MethodOptions::query("user"))
        .unwrap();
    assert!(!binding.parse_to_instance());

    let overridden = ctx
        .bind_method(
            &mut host,
            &user_schema().schema(),
            MethodOptions::query("other").with_parse_to_instance(true),
        )
        .unwrap();
    assert!(overridden.parse_to_instance());
}

#[tokio::test]
async fn test_finish_async_passes_handler_errors_through() {
    let (_, _, binding) = bound(MethodOptions::query("user").with_model(ModelOptions::named("User")));

    let err = binding
        .finish_async(async { Err::<Value, _>("boom".to_string()) })
        .await
        .unwrap_err();
    assert!(err.validation().is_none());
    assert_eq!(err.to_string(), "boom");
    assert_eq!(err.into_handler().as_deref(), Some("boom"));
}

#[tokio::test]
async fn test_finish_async_validates() {
    let (_, _, binding) = bound(MethodOptions::query("user").with_model(ModelOptions::named("User")));

    let ok = binding
        .finish_async(async { Ok::<_, String>(json!({"id": 2, "name": "Grace"})) })
        .await
        .unwrap();
    assert_eq!(ok.as_instance().unwrap().get("id"), Some(&json!(2)));

    let err = binding
        .finish_async(async { Ok::<_, String>(json!({"id": 2, "name": "Grace", "email": "x"})) })
        .await
        .unwrap_err();
    match err {
        MethodError::Validation(failure) => assert_eq!(failure.properties(), vec!["email"]),
        MethodError::Handler(other) => panic!("unexpected handler error: {}", other),
    }
}

#[tokio::test]
async fn test_wrapped_handler() {
    let (_, _, binding) = bound(MethodOptions::query("user").with_model(ModelOptions::named("User")));

    let handler = binding.wrap(|id: i64| async move {
        if id < 0 {
            return Err("negative id".to_string());
        }
        Ok(json!({"id": id, "name": format!("user-{}", id)}))
    });

    let output = handler(7).await.unwrap();
    assert_eq!(output.to_value(), json!({"id": 7, "name": "user-7"}));

    let err = handler(-1).await.unwrap_err();
    assert_eq!(err.into_handler().as_deref(), Some("negative id"));
}

// =============================================================================
// SDL preview
// =============================================================================

#[test]
fn test_sdl_lists_methods_with_arguments() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();

    ctx.bind_method(
        &mut host,
        &user_schema().schema(),
        MethodOptions::query("user").with_model(ModelOptions::named("User")),
    )
    .unwrap();
    ctx.bind_argument(
        &mut host,
        &z::number().int().schema(),
        ParameterTarget::on("user", 0),
        ArgumentOptions::named("id"),
    )
    .unwrap();
    ctx.bind_argument(
        &mut host,
        &z::boolean().optional().schema(),
        ParameterTarget::on("user", 1),
        ArgumentOptions::named("verbose"),
    )
    .unwrap();

    let sdl = host.to_sdl();
    assert!(sdl.contains("type User {\n  id: Int!\n  name: String!\n  email: String\n}"));
    assert!(sdl.ends_with("type Query {\n  user(id: Int!, verbose: Boolean): User!\n}"));
}

// =============================================================================
// Parse mode
// =============================================================================

/// Object node whose `safe_parse` disagrees with `parse`, so the two result
/// paths can be told apart.
#[derive(Debug)]
struct SafeParseRejects(crate::SchemaRef);

impl crate::SchemaNode for SafeParseRejects {
    fn id(&self) -> crate::SchemaId {
        self.0.id()
    }

    fn wrapper_kind(&self) -> crate::WrapperKind {
        self.0.wrapper_kind()
    }

    fn inner(&self) -> Option<crate::SchemaRef> {
        self.0.inner()
    }

    fn scalar_kind(&self) -> crate::ScalarKind {
        self.0.scalar_kind()
    }

    fn description(&self) -> Option<&str> {
        self.0.description()
    }

    fn shape(&self) -> Option<Vec<(String, crate::SchemaRef)>> {
        self.0.shape()
    }

    fn parse(
        &self,
        input: Option<&Value>,
        params: &crate::ParseParams,
    ) -> Result<Option<Value>, crate::ParseError> {
        self.0.parse(input, params)
    }

    fn safe_parse(
        &self,
        _input: Option<&Value>,
        _params: &crate::ParseParams,
    ) -> Result<Option<Value>, crate::ParseError> {
        Err(crate::ParseError::single(crate::Issue::new("custom", "safe parse")))
    }
}

#[tokio::test]
async fn test_finish_and_finish_async_agree() {
    let mut ctx = CompilationContext::new();
    let mut host = InMemoryRegistry::new();
    let schema: crate::SchemaRef = std::sync::Arc::new(SafeParseRejects(user_schema().schema()));
    let binding = ctx
        .bind_method(&mut host, &schema, MethodOptions::query("user"))
        .unwrap();
    let result = json!({"id": 1, "name": "Ada"});

    let sync = binding.finish(result.clone()).unwrap();
    let pending = async { Ok::<_, String>(result.clone()) };
    let async_output = binding.finish_async(pending).await.unwrap();

    assert_eq!(sync.to_value(), async_output.to_value());
    assert_eq!(sync.to_value(), result);
}
