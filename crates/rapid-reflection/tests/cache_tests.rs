//! Integration tests for accessor memoization

mod common;

use std::sync::Arc;
use std::thread;

use common::fixtures;
use rapid_meta::{TypeHandle, TypeRegistry, Value};
use rapid_reflection::{
    AccessorCache, AccessorKind, CacheKey, CacheMode, CompilationOptions, CompiledAccessor,
    ErrorKind, Reflector, ReflectorOptions, TypedView,
};

// ============================================================================
// Identity Tests
// ============================================================================

#[test]
fn test_same_request_returns_same_accessor() {
    let fx = fixtures();
    let field = fx.field(fx.class, "_intField");

    let a = fx.reflector.field_getter(field.as_ref()).unwrap();
    let b = fx.reflector.field_getter(field.as_ref()).unwrap();
    assert!(a.ptr_eq(&b));

    let invoker = fx.method(fx.inner, "Act");
    let c = fx.reflector.method_invoker(invoker.as_ref(), true).unwrap();
    let d = fx.reflector.method_invoker(invoker.as_ref(), true).unwrap();
    assert!(c.ptr_eq(&d));

    let e = fx.reflector.type_factory(Some(&fx.type_def(fx.class))).unwrap();
    let f = fx.reflector.type_factory(Some(&fx.type_def(fx.class))).unwrap();
    assert!(e.ptr_eq(&f));
}

#[test]
fn test_getter_and_setter_are_distinct_entries() {
    let fx = fixtures();
    let field = fx.field(fx.class, "_intField");
    let cache = fx.reflector.cache();
    let before = cache.len();

    fx.reflector.field_getter(field.as_ref()).unwrap();
    fx.reflector.field_setter(field.as_ref()).unwrap();
    assert_eq!(cache.len(), before + 2);

    let registry = fx.reflector.registry().id();
    let id = field.as_ref().map(|f| f.id).unwrap();
    let getter_key =
        CacheKey::member(registry, id, AccessorKind::FieldGetter, CompilationOptions::default());
    let setter_key =
        CacheKey::member(registry, id, AccessorKind::FieldSetter, CompilationOptions::default());
    assert!(matches!(cache.get(&getter_key), Some(CompiledAccessor::Getter(_))));
    assert!(matches!(cache.get(&setter_key), Some(CompiledAccessor::Setter(_))));
}

#[test]
fn test_typed_view_is_part_of_the_key() {
    let fx = fixtures();
    let field = fx.field(fx.class, "_intField");
    let id = field.as_ref().map(|f| f.id).unwrap();

    fx.reflector
        .typed_field_getter(field.as_ref(), fx.class, TypeHandle::OBJECT)
        .unwrap();

    let untyped = CacheKey::member(
        fx.reflector.registry().id(),
        id,
        AccessorKind::FieldGetter,
        CompilationOptions::default(),
    );
    let typed = untyped.with_view(TypedView::new(fx.class, TypeHandle::OBJECT));
    assert!(!fx.reflector.cache().contains(&untyped));
    assert!(fx.reflector.cache().contains(&typed));
}

#[test]
fn test_failed_requests_leave_no_entry() {
    let fx = fixtures();
    let before = fx.reflector.cache().len();

    let prop = fx.property(fx.class, "PropWithNoGetter");
    assert!(fx.reflector.property_getter(prop.as_ref(), true).is_err());
    assert!(fx.reflector.type_factory(Some(&fx.type_def(fx.iface))).is_err());
    assert!(fx
        .reflector
        .typed_field_getter(fx.field(fx.class, "_intField").as_ref(), fx.inner, TypeHandle::INT32)
        .is_err());

    assert_eq!(fx.reflector.cache().len(), before);
}

#[test]
fn test_typed_view_is_checked_on_every_miss() {
    let fx = fixtures();
    let field = fx.field(fx.class, "_intField");
    let before = fx.reflector.cache().len();

    for _ in 0..2 {
        let err = fx
            .reflector
            .typed_field_getter(field.as_ref(), fx.class, TypeHandle::STRING)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidShape);
    }
    assert_eq!(fx.reflector.cache().len(), before);

    let a = fx
        .reflector
        .typed_field_getter(field.as_ref(), fx.class, TypeHandle::INT32)
        .unwrap();
    let b = fx
        .reflector
        .typed_field_getter(field.as_ref(), fx.class, TypeHandle::INT32)
        .unwrap();
    assert!(a.get_as::<i32>(&fx.instance(fx.class)).is_ok());
    assert_eq!(fx.reflector.cache().len(), before + 1);
    assert_eq!(a.view(), b.view());
}

// ============================================================================
// Cache Mode Tests
// ============================================================================

#[test]
fn test_private_caches_are_isolated() {
    let fx = fixtures();
    let other = Reflector::with_options(
        fx.reflector.registry().clone(),
        ReflectorOptions {
            cache: CacheMode::private(),
            ..Default::default()
        },
    );
    let field = fx.field(fx.class, "_intField");

    let a = fx.reflector.field_getter(field.as_ref()).unwrap();
    let b = other.field_getter(field.as_ref()).unwrap();
    assert!(!a.ptr_eq(&b));

    let clone = fx.reflector.clone();
    let c = clone.field_getter(field.as_ref()).unwrap();
    assert!(a.ptr_eq(&c));
}

#[test]
fn test_global_cache_is_shared_between_reflectors() {
    let fx = fixtures();
    let first = Reflector::new(fx.reflector.registry().clone());
    let second = Reflector::new(fx.reflector.registry().clone());
    let method = fx.method(fx.inner, "StaticFunc");

    let a = first.method_invoker(method.as_ref(), false).unwrap();
    let b = second.method_invoker(method.as_ref(), false).unwrap();
    assert!(a.ptr_eq(&b));
    assert!(std::ptr::eq(first.cache(), AccessorCache::global()));

    let id = method.as_ref().map(|m| m.id).unwrap();
    let key = CacheKey::member(
        first.registry().id(),
        id,
        AccessorKind::MethodInvoker,
        CompilationOptions::default().validate_arguments(false),
    );
    assert!(AccessorCache::global().contains(&key));
}

#[test]
fn test_global_entries_are_scoped_to_their_registry() {
    let fx = fixtures();
    let owner = Reflector::new(fx.reflector.registry().clone());
    let stranger = Reflector::new(TypeRegistry::new());
    let field = fx.field(fx.class, "_intField");

    let getter = owner.field_getter(field.as_ref()).unwrap();
    assert!(std::ptr::eq(owner.cache(), stranger.cache()));

    let err = stranger.field_getter(field.as_ref()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidShape);
    assert!(owner.field_getter(field.as_ref()).unwrap().ptr_eq(&getter));
}

#[test]
fn test_default_options_follow_reflector_settings() {
    let fx = fixtures();
    let lax = Reflector::with_options(
        fx.reflector.registry().clone(),
        ReflectorOptions {
            cache: CacheMode::private(),
            defaults: CompilationOptions::default().validate_arguments(false),
        },
    );
    let method = fx.method(fx.inner, "StaticFunc");

    let by_default = lax.method_invoker_default(method.as_ref()).unwrap();
    let explicit = lax.method_invoker(method.as_ref(), false).unwrap();
    assert!(by_default.ptr_eq(&explicit));
}

// ============================================================================
// Concurrency Tests
// ============================================================================

#[test]
fn test_concurrent_requests_share_one_accessor() {
    let fx = Arc::new(fixtures());
    let before = fx.reflector.cache().len();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let fx = Arc::clone(&fx);
            thread::spawn(move || {
                let field = fx.field(fx.class, "_intField");
                let getter = fx.reflector.field_getter(field.as_ref()).unwrap();
                let setter = fx.reflector.field_setter(field.as_ref()).unwrap();

                let instance = fx.instance(fx.class);
                setter.set(&instance, &Value::Int32(i)).unwrap();
                assert_eq!(getter.get(&instance).unwrap(), Value::Int32(i));
                getter
            })
        })
        .collect();

    let getters: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(getters.windows(2).all(|pair| pair[0].ptr_eq(&pair[1])));
    assert_eq!(fx.reflector.cache().len(), before + 2);
}
