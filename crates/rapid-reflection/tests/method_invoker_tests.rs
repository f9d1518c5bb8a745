//! Integration tests for method invokers

mod common;

use common::{fixtures, point, read};
use rapid_meta::{RuntimeError, Value};
use rapid_reflection::{AccessorError, ErrorKind};

// ============================================================================
// Invocation Tests
// ============================================================================

#[test]
fn test_void_method_returns_null() {
    let fx = fixtures();
    let invoker = fx
        .reflector
        .method_invoker_default(fx.method(fx.inner, "Act").as_ref())
        .unwrap();

    let instance = fx.instance(fx.inner);
    let result = invoker.invoke(&instance, Some(&[Value::Int32(123)][..])).unwrap();
    assert_eq!(result, Value::Null);
    assert_eq!(read(&instance, "Value"), Value::Int32(123));
}

#[test]
fn test_trailing_arguments_are_ignored() {
    let fx = fixtures();
    let invoker = fx
        .reflector
        .method_invoker_default(fx.method(fx.inner, "Act").as_ref())
        .unwrap();

    let instance = fx.instance(fx.inner);
    let args = [Value::Int32(5), Value::from("ignored"), Value::Null];
    invoker.invoke(&instance, Some(&args[..])).unwrap();
    assert_eq!(read(&instance, "Value"), Value::Int32(5));
}

#[test]
fn test_non_public_methods_are_invocable() {
    let fx = fixtures();
    let instance = fx.instance(fx.inner);

    let int_func = fx
        .reflector
        .method_invoker_default(fx.method(fx.inner, "IntFunc").as_ref())
        .unwrap();
    assert_eq!(int_func.invoke(&instance, None).unwrap(), Value::Int32(1));

    let str_func = fx
        .reflector
        .method_invoker_default(fx.method(fx.inner, "StrFunc").as_ref())
        .unwrap();
    assert_eq!(str_func.invoke(&instance, Some(&[] as &[Value])).unwrap(), Value::from(""));
}

#[test]
fn test_virtual_dispatch_uses_runtime_type() {
    let fx = fixtures();
    let derived = fx.instance(fx.inner_derived);

    let act = fx
        .reflector
        .method_invoker_default(fx.method(fx.inner, "Act").as_ref())
        .unwrap();
    act.invoke(&derived, Some(&[Value::Int32(123)][..])).unwrap();
    assert_eq!(read(&derived, "Value"), Value::Int32(-123));

    let int_func = fx
        .reflector
        .method_invoker_default(fx.method(fx.inner, "IntFunc").as_ref())
        .unwrap();
    assert_eq!(int_func.invoke(&derived, None).unwrap(), Value::Int32(2));
}

#[test]
fn test_static_method_ignores_receiver() {
    let fx = fixtures();
    let invoker = fx
        .reflector
        .method_invoker_default(fx.method(fx.inner, "StaticFunc").as_ref())
        .unwrap();

    let args = [Value::Int32(1), Value::Int32(2)];
    assert_eq!(invoker.invoke(&Value::Null, Some(&args[..])).unwrap(), Value::Int32(3));
    assert_eq!(
        invoker.invoke(&fx.instance(fx.inner), Some(&args[..])).unwrap(),
        Value::Int32(3)
    );
}

// ============================================================================
// Value-Type Argument Tests
// ============================================================================

#[test]
fn test_boxed_struct_passes_to_object_parameter_unchanged() {
    let fx = fixtures();
    let invoker = fx
        .reflector
        .method_invoker_default(fx.method(fx.holder, "Echo").as_ref())
        .unwrap();

    let boxed = point(&fx, 4);
    let result = invoker.invoke(&Value::Null, Some(&[boxed.clone()][..])).unwrap();
    assert!(result.same_object(&boxed));
}

#[test]
fn test_struct_argument_is_copied() {
    let fx = fixtures();
    let invoker = fx
        .reflector
        .method_invoker_default(fx.method(fx.holder, "Nudge").as_ref())
        .unwrap();

    let boxed = point(&fx, 4);
    let result = invoker.invoke(&Value::Null, Some(&[boxed.clone()][..])).unwrap();
    assert_eq!(result, Value::Int32(99));
    assert_eq!(read(&boxed, "X"), Value::Int32(4));
}

// ============================================================================
// Validated Invocation Tests
// ============================================================================

#[test]
fn test_validated_null_receiver() {
    let fx = fixtures();
    let invoker = fx
        .reflector
        .method_invoker(fx.method(fx.inner, "Act").as_ref(), true)
        .unwrap();

    assert_eq!(
        invoker.invoke(&Value::Null, Some(&[Value::Int32(1)][..])).unwrap_err(),
        AccessorError::NullArgument { param: "receiver" }
    );
}

#[test]
fn test_validated_argument_array() {
    let fx = fixtures();
    let invoker = fx
        .reflector
        .method_invoker(fx.method(fx.inner, "StaticFunc").as_ref(), true)
        .unwrap();

    assert_eq!(
        invoker.invoke(&Value::Null, None).unwrap_err(),
        AccessorError::NullArgument { param: "arguments" }
    );
    assert_eq!(
        invoker.invoke(&Value::Null, Some(&[Value::Int32(1)][..])).unwrap_err(),
        AccessorError::NotEnoughArguments {
            param: "arguments",
            required: 2,
            supplied: 1
        }
    );
}

#[test]
fn test_validated_argument_cast() {
    let fx = fixtures();
    let invoker = fx
        .reflector
        .method_invoker(fx.method(fx.inner, "Act").as_ref(), true)
        .unwrap();

    let err = invoker
        .invoke(&fx.instance(fx.inner), Some(&[Value::from("123")][..]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn test_parameterless_instance_method_accepts_absent_arguments() {
    let fx = fixtures();
    let invoker = fx
        .reflector
        .method_invoker(fx.method(fx.inner, "IntFunc").as_ref(), true)
        .unwrap();
    assert_eq!(
        invoker.invoke(&fx.instance(fx.inner), None).unwrap(),
        Value::Int32(1)
    );
}

// ============================================================================
// Unvalidated Invocation Tests
// ============================================================================

#[test]
fn test_unvalidated_null_receiver_faults() {
    let fx = fixtures();
    let invoker = fx
        .reflector
        .method_invoker(fx.method(fx.inner, "Act").as_ref(), false)
        .unwrap();

    assert_eq!(
        invoker.invoke(&Value::Null, Some(&[Value::Int32(1)][..])).unwrap_err(),
        AccessorError::Runtime(RuntimeError::NullReference)
    );
}

#[test]
fn test_unvalidated_argument_faults() {
    let fx = fixtures();
    let invoker = fx
        .reflector
        .method_invoker(fx.method(fx.inner, "StaticFunc").as_ref(), false)
        .unwrap();

    assert_eq!(
        invoker.invoke(&Value::Null, None).unwrap_err(),
        AccessorError::Runtime(RuntimeError::NullReference)
    );
    assert_eq!(
        invoker.invoke(&Value::Null, Some(&[Value::Int32(1)][..])).unwrap_err(),
        AccessorError::Runtime(RuntimeError::IndexOutOfRange { index: 1, len: 1 })
    );
}

#[test]
fn test_absent_method() {
    let fx = fixtures();
    assert_eq!(
        fx.reflector.method_invoker(None, false).unwrap_err(),
        AccessorError::NullArgument { param: "method" }
    );
}
