//! Accessors for a member of any kind

use rapid_meta::MemberDescriptor;

use crate::accessor::{Getter, Setter};
use crate::cache::CompiledAccessor;
use crate::error::{AccessorError, AccessorResult};
use crate::reflector::Reflector;

const PARAM: &str = "member";

fn not_a_value_member(member: &MemberDescriptor) -> AccessorError {
    AccessorError::shape(
        format!("The member '{}' is not a field or property.", member.name()),
        PARAM,
    )
}

impl Reflector {
    /// Compile the natural accessor for a member
    ///
    /// Fields and properties yield a getter, methods an invoker and
    /// constructors a factory, all with the reflector defaults.
    pub fn member_accessor(
        &self,
        member: Option<&MemberDescriptor>,
    ) -> AccessorResult<CompiledAccessor> {
        match member.ok_or(AccessorError::NullArgument { param: PARAM })? {
            MemberDescriptor::Field(field) => {
                self.field_getter(Some(field)).map(CompiledAccessor::Getter)
            }
            MemberDescriptor::Property(property) => self
                .property_getter_default(Some(property))
                .map(CompiledAccessor::Getter),
            MemberDescriptor::Method(method) => self
                .method_invoker_default(Some(method))
                .map(CompiledAccessor::Invoker),
            MemberDescriptor::Constructor(ctor) => self
                .ctor_factory_default(Some(ctor))
                .map(CompiledAccessor::Factory),
        }
    }

    /// Compile a getter for a field or property descriptor
    pub fn member_getter(&self, member: Option<&MemberDescriptor>) -> AccessorResult<Getter> {
        match member.ok_or(AccessorError::NullArgument { param: PARAM })? {
            MemberDescriptor::Field(field) => self.field_getter(Some(field)),
            MemberDescriptor::Property(property) => self.property_getter_default(Some(property)),
            other => Err(not_a_value_member(other)),
        }
    }

    /// Compile a setter for a field or property descriptor
    pub fn member_setter(&self, member: Option<&MemberDescriptor>) -> AccessorResult<Setter> {
        match member.ok_or(AccessorError::NullArgument { param: PARAM })? {
            MemberDescriptor::Field(field) => self.field_setter(Some(field)),
            MemberDescriptor::Property(property) => self.property_setter_default(Some(property)),
            other => Err(not_a_value_member(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::options::{CacheMode, ReflectorOptions};
    use rapid_meta::{
        FieldDefinition, MethodDefinition, Object, PropertyDefinition, TypeDefinition, TypeHandle,
        TypeRegistry, Value,
    };

    fn reflector() -> (Reflector, TypeHandle) {
        let mut builder = TypeRegistry::builder();
        let handle = builder
            .define(
                TypeDefinition::class("Gauge")
                    .field(FieldDefinition::new("level", TypeHandle::INT32))
                    .property(PropertyDefinition::auto("Label", TypeHandle::STRING))
                    .method(
                        MethodDefinition::new("Reset")
                            .returns(TypeHandle::INT32)
                            .body(|_| Ok(Value::Int32(0))),
                    ),
            )
            .unwrap();
        let options = ReflectorOptions {
            cache: CacheMode::private(),
            ..Default::default()
        };
        (Reflector::with_options(builder.build(), options), handle)
    }

    #[test]
    fn test_descriptor_dispatch_shares_cache_entries() {
        let (reflector, handle) = reflector();
        let type_def = reflector.registry().get(handle).cloned().unwrap();
        let level = type_def.member("level");

        let by_descriptor = reflector.member_getter(level.as_ref()).unwrap();
        let direct = reflector.field_getter(type_def.field("level")).unwrap();
        assert!(by_descriptor.ptr_eq(&direct));

        let setter = reflector.member_setter(type_def.member("Label").as_ref()).unwrap();
        let instance = Value::Object(Object::zeroed(&type_def));
        setter.set(&instance, &Value::from("hot")).unwrap();
        let getter = reflector.member_getter(type_def.member("Label").as_ref()).unwrap();
        assert_eq!(getter.get(&instance).unwrap(), Value::from("hot"));
    }

    #[test]
    fn test_methods_have_no_getter() {
        let (reflector, handle) = reflector();
        let reset = reflector.registry().get(handle).and_then(|t| t.member("Reset"));

        let err = reflector.member_getter(reset.as_ref()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidShape);
        assert_eq!(
            err.to_string(),
            "The member 'Reset' is not a field or property. (Parameter 'member')"
        );
        assert!(matches!(
            reflector.member_accessor(reset.as_ref()),
            Ok(CompiledAccessor::Invoker(_))
        ));
        assert_eq!(
            reflector.member_setter(None).unwrap_err(),
            AccessorError::NullArgument { param: "member" }
        );
    }
}
