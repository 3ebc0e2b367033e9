//! Integration tests for the expression language and its helper library.

use probe_matchers::expr::{CompiledExpression, Value, ValueKind, Variables};
use probe_matchers::functions::FunctionLibrary;
use probe_matchers::{default_library, CompileError, CompilerConfig, EvalError};
use serde_json::json;

fn eval(source: &str) -> Result<Value, EvalError> {
    CompiledExpression::compile(source, &default_library(), &CompilerConfig::default())
        .unwrap_or_else(|e| panic!("Failed to compile {source}: {e}"))
        .evaluate(&Variables::new())
}

#[test]
fn test_helper_scenarios() {
    assert_eq!(eval(r#"toupper("abc")"#).unwrap(), Value::from("ABC"));
    assert_eq!(eval(r#"len("hello")"#).unwrap(), Value::Number(5.0));
    assert_eq!(
        eval(r#"contains("hello world", "world")"#).unwrap(),
        Value::Bool(true)
    );
    assert_eq!(eval(r#"trimprefix("foobar", "foo")"#).unwrap(), Value::from("bar"));
    assert_eq!(
        eval(r#"md5("")"#).unwrap(),
        Value::from("d41d8cd98f00b204e9800998ecf8427e")
    );
    assert_eq!(eval(r#"regex("^a", "abc")"#).unwrap(), Value::Bool(true));
}

#[test]
fn test_base64_round_trip_in_expression() {
    for input in ["", "hello", "with spaces and symbols !@#", "ünïcödé"] {
        let source = format!(r#"base64_decode(base64("{input}")) == "{input}""#);
        assert_eq!(eval(&source).unwrap(), Value::Bool(true), "round trip of {input:?}");
    }
}

#[test]
fn test_sha256_lowercase_hex() {
    let digest = eval(r#"sha256("abc")"#).unwrap();
    assert_eq!(
        digest,
        Value::from("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
    );
}

#[test]
fn test_trim_uses_second_argument_as_cutset() {
    assert_eq!(eval(r#"trim("--abc--", "-")"#).unwrap(), Value::from("abc"));
}

#[test]
fn test_compile_time_arity_check() {
    let err = CompiledExpression::compile(
        r#"contains("a")"#,
        &default_library(),
        &CompilerConfig::default(),
    )
    .unwrap_err();

    match err {
        CompileError::InvalidExpression { expression, reason } => {
            assert_eq!(expression, r#"contains("a")"#);
            assert!(reason.contains("expects 2 arguments"), "reason: {reason}");
        }
        other => panic!("Expected InvalidExpression, got {other:?}"),
    }
}

#[test]
fn test_runtime_argument_kind_check() {
    let err = eval("len(42)").unwrap_err();
    assert_eq!(
        err,
        EvalError::ArgumentType {
            function: "len".to_string(),
            position: 0,
            expected: ValueKind::String,
            found: ValueKind::Number,
        }
    );
    assert_eq!(err.to_string(), "len: argument 0 must be string, found number");
}

#[test]
fn test_invalid_literal_regex_rejected_at_compile_time() {
    let result = CompiledExpression::compile(
        r#"body =~ "(""#,
        &default_library(),
        &CompilerConfig::default(),
    );
    assert!(matches!(result, Err(CompileError::InvalidExpression { .. })));

    let result = CompiledExpression::compile(
        r#"regex("(", body)"#,
        &default_library(),
        &CompilerConfig::default(),
    );
    assert!(matches!(result, Err(CompileError::InvalidExpression { .. })));
}

#[test]
fn test_exponent_number_literals() {
    assert_eq!(eval("1e3 == 1000").unwrap(), Value::Bool(true));
    assert_eq!(eval("2.5E-1 * 4").unwrap(), Value::Number(1.0));

    let err = CompiledExpression::compile("size > 1e", &default_library(), &CompilerConfig::default())
        .unwrap_err();
    match err {
        CompileError::InvalidExpression { reason, .. } => {
            assert_eq!(reason, "invalid number literal: 1e");
        }
        other => panic!("Expected InvalidExpression, got {other:?}"),
    }
}

#[test]
fn test_custom_library() {
    let mut library = FunctionLibrary::empty();
    library.register("double", &[ValueKind::Number], ValueKind::Number, |args| {
        Ok(Value::Number(args[0].as_number().unwrap_or_default() * 2.0))
    });

    let config = CompilerConfig::default();
    let expr = CompiledExpression::compile("double(21) == 42", &library, &config).unwrap();
    assert!(expr.evaluate_bool(&Variables::new()).unwrap());

    // Defaults are not present in an empty library
    assert!(CompiledExpression::compile(r#"len("a")"#, &library, &config).is_err());
}

#[test]
fn test_custom_helper_return_kind_enforced() {
    let mut library = FunctionLibrary::empty();
    library.register("is_admin", &[ValueKind::String], ValueKind::Bool, |args| {
        Ok(args[0].clone())
    });

    let config = CompilerConfig::default();
    let expr = CompiledExpression::compile(r#"is_admin("root")"#, &library, &config).unwrap();
    assert_eq!(
        expr.evaluate_bool(&Variables::new()).unwrap_err(),
        EvalError::ReturnType {
            function: "is_admin".to_string(),
            expected: ValueKind::Bool,
            found: ValueKind::String,
        }
    );
}

#[test]
fn test_variables_from_json() {
    let vars = Variables::from_json(&json!({
        "status_code": 403,
        "body": "Forbidden",
        "cached": false,
        "nested": {"ignored": true}
    }));

    assert!(!vars.contains("nested"));

    let expr = CompiledExpression::compile(
        r#"status_code == 403 && body == "Forbidden" && !cached"#,
        &default_library(),
        &CompilerConfig::default(),
    )
    .unwrap();
    assert!(expr.evaluate_bool(&vars).unwrap());
}

#[test]
fn test_non_boolean_result() {
    let expr = CompiledExpression::compile("1 + 1", &default_library(), &CompilerConfig::default())
        .unwrap();
    assert_eq!(
        expr.evaluate_bool(&Variables::new()).unwrap_err(),
        EvalError::NonBoolean(ValueKind::Number)
    );
}
